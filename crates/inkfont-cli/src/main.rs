//! inkfont - Main Entry Point

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use inkfont_session::{Config, Confirm, ErrorKind, Page, Precondition, SessionError, UploadFile, UploadForm};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inkfont", version, about = "Manage handwriting fonts on an inkfont server")]
struct Cli {
    /// Server root URL
    #[arg(long, global = true, env = "INKFONT_SERVER")]
    server: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Cmd {
    /// List fonts and show which one is active
    Fonts,
    /// Make a font the active one
    Use { id: String },
    /// Create a font from a handwriting sample
    Upload {
        file: PathBuf,
        /// Display name for the new font
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the active font's glyphs and their characters
    Glyphs,
    /// Assign characters to glyphs of the active font
    Map {
        /// FILE=CHAR pairs
        #[arg(value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        /// Glyph file whose character should be removed
        #[arg(long = "clear", value_name = "FILE")]
        clear: Vec<String>,
    },
    /// Delete a font
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Render text with the active font
    Generate {
        text: String,
        /// Save the image here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::from_env();
    if let Some(server) = &cli.server {
        config = config.server(server);
    }
    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }
    tracing::info!("Using server {} (timeout {:?})", config.server, config.timeout);

    let result = config.connect()
        .with_context(|| format!("Cannot use server {}", config.server))
        .and_then(|transport| {
            let page = Page::new(transport);
            let mut stdout = io::stdout().lock();
            smol::block_on(run(cli.command, &page, &mut stdout))
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

/// Failure line with its class up front, so a local check, a server
/// rejection and a connection problem never read alike
fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<SessionError>() {
        Some(e) => match e.kind() {
            ErrorKind::Application => format!("Rejected by server: {}", e),
            ErrorKind::Precondition => format!("Cannot start: {}", e),
            // Already reads "Connection problem: ..."
            ErrorKind::Transport => e.to_string(),
            ErrorKind::Busy | ErrorKind::Detached => format!("Error: {}", e),
        },
        None => format!("Error: {:#}", error),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(command: Cmd, page: &Page, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Cmd::Fonts => {
            page.load().await?;
            writeln!(out, "{}", page.ctx.state().status_line())?;
            let selector = page.registry.selector();
            let fonts: Vec<_> = selector.options.iter()
                .filter_map(|o| o.id.as_deref().map(|id| (id, o.label.as_str())))
                .collect();
            if fonts.is_empty() {
                writeln!(out, "No fonts yet. Upload a handwriting sample to create one.")?;
            }
            for (id, label) in fonts {
                let mark = if selector.selected.as_deref() == Some(id) { '*' } else { ' ' };
                writeln!(out, "{} {}\t{}", mark, id, label)?;
            }
        }
        Cmd::Use { id } => {
            page.load().await?;
            page.registry.set_active_font(&id).await?;
            writeln!(out, "{}", page.ctx.state().status_line())?;
        }
        Cmd::Upload { file, name } => {
            let sample = UploadFile::from_path(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let mut form = UploadForm { file: Some(sample), font_name: name };
            let outcome = page.upload.upload(&mut form).await?;
            writeln!(out, "{}", outcome.message)?;
            writeln!(out, "{}", page.ctx.state().status_line())?;
        }
        Cmd::Glyphs => {
            page.mapping.open().await?;
            let view = page.mapping.view();
            if let Some(notice) = &view.notice {
                writeln!(out, "{}", notice)?;
            }
            for unit in &view.units {
                let shown = if unit.value.is_empty() { "-" } else { unit.value.as_str() };
                writeln!(out, "{}\t{}\t{}", unit.filename, shown, unit.image_url)?;
            }
        }
        Cmd::Map { assignments, clear } => {
            if assignments.is_empty() && clear.is_empty() {
                bail!("Nothing to map: pass FILE=CHAR pairs or --clear FILE");
            }
            page.mapping.open().await?;
            let view = page.mapping.view();
            if view.font_id.is_none() {
                return Err(SessionError::from(Precondition::NoActiveFont).into());
            }
            if !view.save_enabled() {
                bail!("{}", view.notice.unwrap_or_default());
            }
            for (file, value) in &assignments {
                page.mapping.set_value(file, value)?;
            }
            for file in &clear {
                page.mapping.clear_value(file)?;
            }
            let saved = page.mapping.save_mapping().await?;
            writeln!(out, "{}", saved.message)?;
        }
        Cmd::Delete { id, yes } => {
            page.load().await?;
            let confirm: &dyn Confirm = if yes { &assume_yes } else { &ask };
            let outcome = page.deletion.delete(&id, confirm).await?;
            writeln!(out, "{}", outcome.message)?;
            writeln!(out, "{}", page.ctx.state().status_line())?;
        }
        Cmd::Generate { text, out: path } => {
            page.load().await?;
            let artifact = page.generator.generate(&text).await?;
            match path {
                Some(path) => {
                    let bytes = page.generator.fetch(&artifact).await?;
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    writeln!(out, "Saved {} bytes to {}", bytes.len(), path.display())?;
                }
                None => writeln!(out, "{}", artifact.display_url)?,
            }
        }
    }
    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((file, value)) if !file.trim().is_empty() => Ok((file.trim().to_string(), value.to_string())),
        _ => Err(format!("expected FILE=CHAR, got {:?}", raw)),
    }
}

fn assume_yes(_prompt: &str) -> bool {
    true
}

fn ask(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

//! Session flows against an in-process registry
//!
//! Every page talks to the registry through a `LoopbackTransport`, so the
//! tests can count requests and inject transport faults.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use inkfont_net::api::{self, codes, MappingEdit};
use inkfont_net::NetError;
use inkfont_registry::{ExtractedGlyph, Fault, FontId, GlyphExtractor, LoopbackTransport, Registry};
use inkfont_session::*;

/// Extracts one glyph per name; each image is the sample followed by the
/// name. A sample reading "blank" has no characters.
struct Named(&'static [&'static str]);

impl GlyphExtractor for Named {
    fn extract(&self, sample: &[u8]) -> Result<Vec<ExtractedGlyph>, String> {
        if sample == b"blank" {
            return Ok(Vec::new());
        }
        Ok(self.0.iter()
            .map(|name| ExtractedGlyph {
                filename: name.to_string(),
                image: [sample, b"/", name.as_bytes()].concat(),
            })
            .collect())
    }
}

fn backend() -> (Arc<Registry>, Arc<LoopbackTransport>) {
    let registry = Arc::new(Registry::builder().extractor(Named(&["g1.png", "g2.png"])).build());
    let transport = Arc::new(LoopbackTransport::new(registry.clone()));
    (registry, transport)
}

fn page(transport: &Arc<LoopbackTransport>) -> Page {
    Page::new(transport.clone())
}

fn form(sample: &[u8], name: &str) -> UploadForm {
    UploadForm {
        file: Some(UploadFile::new("sample.png", sample.to_vec())),
        font_name: Some(name.to_string()),
    }
}

fn map_g1(registry: &Registry, font: &str, c: &str) {
    registry.set_active(&FontId::new(font), None).unwrap();
    let edits = BTreeMap::from([("g1.png".to_string(), MappingEdit::Set(c.to_string()))]);
    registry.save_mapping(&edits, None).unwrap();
}

fn active_id(page: &Page) -> Option<String> {
    page.ctx.active_font().map(|f| f.id)
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_upload_map_generate() {
    let (registry, transport) = backend();
    let page = page(&transport);

    smol::block_on(async {
        assert_eq!(page.load().await.unwrap(), None);
        assert_eq!(page.ctx.state(), ActiveFontState::NoneSelected);

        let mut upload = form(b"ink", "Mine");
        let outcome = page.upload.upload(&mut upload).await.unwrap();
        assert_eq!(outcome.font_id, "f1");
        assert_eq!(outcome.message, "Extracted 2 characters into font f1");
        assert_eq!(outcome.active().map(|f| f.name.as_str()), Some("Mine"));
        assert_eq!(upload.font_name.as_deref(), Some(""));
        assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));

        assert_eq!(page.mapping.open().await.unwrap(), 2);
        page.mapping.set_value("g1.png", "A").unwrap();
        let saved = page.mapping.save_mapping().await.unwrap();
        assert_eq!(saved.submitted, 1);
        assert_eq!(page.mapping.view().unit("g1.png").unwrap().persisted, Some('A'));

        let artifact = page.generator.generate("A").await.unwrap();
        assert!(artifact.image_url.starts_with(api::OUTPUT_PREFIX));
        assert_eq!(artifact.display_url, artifact.image_url);
        assert_eq!(page.generator.output(), Some(artifact.clone()));

        let bytes = page.generator.fetch(&artifact).await.unwrap();
        assert_eq!(Some(bytes), registry.glyph_image(&FontId::new("f1"), "g1.png"));
    });
}

#[test]
fn test_generate_uses_newly_selected_font() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    map_g1(&registry, "f2", "A");
    map_g1(&registry, "f1", "A");

    let page = page(&transport);
    smol::block_on(async {
        page.load().await.unwrap();
        assert_eq!(active_id(&page).as_deref(), Some("f1"));

        page.registry.set_active_font("f2").await.unwrap();
        let artifact = page.generator.generate("A").await.unwrap();
        let bytes = page.generator.fetch(&artifact).await.unwrap();
        assert_eq!(Some(bytes), registry.glyph_image(&FontId::new("f2"), "g1.png"));
    });
}

// ============================================================================
// ACTIVE FONT CONVERGENCE
// ============================================================================

#[test]
fn test_set_then_resolve_converges() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();

    let page = page(&transport);
    smol::block_on(async {
        page.load().await.unwrap();
        assert_eq!(active_id(&page).as_deref(), Some("f2"));

        let active = page.registry.set_active_font("f1").await.unwrap();
        assert_eq!(active.map(|f| f.id).as_deref(), Some("f1"));
    });

    assert_eq!(active_id(&page).as_deref(), Some("f1"));
    assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));
    assert_eq!(registry.active().font.map(|(id, _)| id), Some(FontId::new("f1")));
    assert_eq!(page.ctx.state().status_line(), "Active Font: One");
}

#[test]
fn test_selector_lists_sentinel_first() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();

    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let selector = page.registry.selector();
    assert_eq!(selector.options[0], FontOption::sentinel());
    assert_eq!(selector.options.len(), 2);
    assert_eq!(selector.label_of("f1"), Some("One"));
    assert_eq!(
        transport.requests(),
        vec![api::GET_FONTS.to_string(), api::GET_ACTIVE_FONT.to_string()]
    );
}

#[test]
fn test_stale_revision_adopts_other_page_choice() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();

    let first = page(&transport);
    let second = page(&transport);
    smol::block_on(async {
        first.load().await.unwrap();
        second.load().await.unwrap();

        second.registry.set_active_font("f1").await.unwrap();
        let err = first.registry.set_active_font("f2").await.unwrap_err();
        assert_eq!(err.code(), Some(codes::STALE_REVISION));
        assert_eq!(err.kind(), ErrorKind::Application);
    });

    assert_eq!(active_id(&first).as_deref(), Some("f1"));
    assert_eq!(first.registry.selector().selected.as_deref(), Some("f1"));
    assert_eq!(registry.active().font.map(|(id, _)| id), Some(FontId::new("f1")));
}

#[test]
fn test_failed_selection_reverts_selector() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    registry.set_active(&FontId::new("f1"), None).unwrap();

    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    transport.inject(Fault::Network("connection reset".into()));
    let err = smol::block_on(page.registry.set_active_font("f2")).unwrap_err();
    assert_eq!(err, SessionError::Transport(NetError::Network("connection reset".into())));
    assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));
    assert_eq!(active_id(&page).as_deref(), Some("f1"));
}

#[test]
fn test_sentinel_is_not_a_selection() {
    let (_, transport) = backend();
    let page = page(&transport);
    let err = smol::block_on(page.registry.set_active_font("")).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::NoSelection));
    assert_eq!(transport.count(api::SET_ACTIVE_FONT), 0);
}

#[test]
fn test_unknown_font_rejected() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let err = smol::block_on(page.registry.set_active_font("f9")).unwrap_err();
    assert_eq!(err.code(), Some(codes::NOT_FOUND));
    assert_eq!(err.to_string(), "Font not found: f9");
    assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));
}

#[test]
fn test_recovers_after_backend_restart() {
    let (registry, transport) = backend();
    for name in ["One", "Two", "Three"] {
        registry.upload(name.as_bytes(), Some(name)).unwrap();
    }
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();
    assert_eq!(page.ctx.revision(), Some(3));

    // Fresh server: one font, active pointer back at revision 1
    let (fresh, _) = backend();
    fresh.upload(b"again", Some("Again")).unwrap();
    transport.restart(fresh.clone());

    let active = smol::block_on(page.registry.resolve_active_font()).unwrap();
    assert_eq!(active.map(|f| f.id).as_deref(), Some("f1"));
    assert_eq!(page.ctx.state().status_line(), "Active Font: Again");
    assert_eq!(page.ctx.revision(), Some(1));
    assert_eq!(page.ctx.state().controls(), Controls { map: true, edit: true, delete: true });
    assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));

    smol::block_on(page.registry.set_active_font("f1")).unwrap();
    assert_eq!(fresh.active().revision, 2);
    assert_eq!(active_id(&page).as_deref(), Some("f1"));
}

#[test]
fn test_selection_after_restart_retries_cleanly() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let (fresh, _) = backend();
    fresh.upload(b"uno", Some("Uno")).unwrap();
    fresh.upload(b"dos", Some("Dos")).unwrap();
    fresh.set_active(&FontId::new("f1"), None).unwrap();
    fresh.set_active(&FontId::new("f2"), None).unwrap();
    fresh.set_active(&FontId::new("f1"), None).unwrap();
    transport.restart(fresh.clone());

    // The page still holds revision 2; the fresh server is at 5
    let err = smol::block_on(page.registry.set_active_font("f2")).unwrap_err();
    assert_eq!(err.code(), Some(codes::STALE_REVISION));
    assert_eq!(active_id(&page).as_deref(), Some("f1"));
    assert_eq!(page.ctx.revision(), Some(5));

    smol::block_on(page.registry.set_active_font("f2")).unwrap();
    assert_eq!(fresh.active().font.map(|(id, _)| id), Some(FontId::new("f2")));
    assert_eq!(page.ctx.state().status_line(), "Active Font: Dos");
}

// ============================================================================
// ERROR CLASSES
// ============================================================================

#[test]
fn test_resolve_failure_is_not_none() {
    let (_, transport) = backend();
    transport.inject(Fault::Network("refused".into()));
    transport.inject(Fault::Garbage);

    let page = page(&transport);
    let err = smol::block_on(page.load()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(page.ctx.state(), ActiveFontState::Error(_)));
    assert!(page.ctx.state().status_line().starts_with("Active Font: Error ("));
    assert!(page.registry.selector().list_error.is_some());
    assert_eq!(page.ctx.state().controls(), Controls::default());
}

#[test]
fn test_generate_error_classes() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    map_g1(&registry, "f1", "A");

    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    transport.inject(Fault::Network("timed out".into()));
    let err = smol::block_on(page.generator.generate("A")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);

    transport.inject(Fault::Status(500));
    let err = smol::block_on(page.generator.generate("A")).unwrap_err();
    assert_eq!(err, SessionError::Transport(NetError::HttpError { status: 500 }));

    let err = smol::block_on(page.generator.generate("Z")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Application);
    assert_eq!(err.code(), Some(codes::RENDER_FAILED));

    assert_eq!(page.generator.output(), None);
}

// ============================================================================
// PRECONDITIONS
// ============================================================================

#[test]
fn test_blank_text_sends_nothing() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let err = smol::block_on(page.generator.generate("  \n ")).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::EmptyText));
    assert_eq!(transport.count(api::GENERATE), 0);
}

#[test]
fn test_generate_without_font_sends_nothing() {
    let (_, transport) = backend();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let err = smol::block_on(page.generator.generate("Hello")).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::NoActiveFont));
    assert_eq!(transport.count(api::GENERATE), 0);
}

#[test]
fn test_upload_preconditions_send_nothing() {
    let (_, transport) = backend();
    let page = page(&transport);

    let err = smol::block_on(page.upload.upload(&mut UploadForm::default())).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::NoFile));

    let err = smol::block_on(page.upload.upload(&mut form(b"", "Mine"))).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::EmptyFile));

    let err = smol::block_on(page.upload.upload(&mut form(b"ink", "   "))).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::MissingFontName));

    assert_eq!(transport.count(api::UPLOAD_HANDWRITING), 0);
}

#[test]
fn test_upload_without_name_field_uses_id() {
    let (_, transport) = backend();
    let page = page(&transport);
    let mut upload = UploadForm {
        file: Some(UploadFile::new("sample.png", b"ink".to_vec())),
        font_name: None,
    };
    let outcome = smol::block_on(page.upload.upload(&mut upload)).unwrap();
    assert_eq!(outcome.active().map(|f| f.name.as_str()), Some("f1"));
}

#[test]
fn test_rejected_upload_leaves_page_alone() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();
    let state = page.ctx.state();
    let selector = page.registry.selector();
    let resolves = transport.count(api::GET_ACTIVE_FONT);

    let mut upload = form(b"blank", "Two");
    let err = smol::block_on(page.upload.upload(&mut upload)).unwrap_err();
    assert_eq!(err.to_string(), "Extraction failed: no characters found in the sample");
    assert_eq!(err.kind(), ErrorKind::Application);

    assert_eq!(page.ctx.state(), state);
    assert_eq!(page.registry.selector(), selector);
    assert_eq!(transport.count(api::GET_ACTIVE_FONT), resolves);
    assert_eq!(upload.font_name.as_deref(), Some("Two"));
    assert_eq!(registry.fonts().len(), 1);
    assert!(!page.upload.is_busy());
}

#[test]
fn test_upload_transport_failure_leaves_page_alone() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();
    let state = page.ctx.state();
    let resolves = transport.count(api::GET_ACTIVE_FONT);

    transport.inject(Fault::Network("connection reset".into()));
    let mut upload = form(b"ink", "Two");
    let err = smol::block_on(page.upload.upload(&mut upload)).unwrap_err();
    assert_eq!(err, SessionError::Transport(NetError::Network("connection reset".into())));

    assert_eq!(page.ctx.state(), state);
    assert_eq!(page.registry.selector().selected.as_deref(), Some("f1"));
    assert_eq!(transport.count(api::GET_ACTIVE_FONT), resolves);
    assert_eq!(upload.font_name.as_deref(), Some("Two"));
    assert_eq!(registry.fonts().len(), 1);
}

#[test]
fn test_upload_succeeds_even_if_refresh_fails() {
    let (registry, transport) = backend();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    // Upload goes through; the list and resolve after it do not
    transport.inject(Fault::Pass);
    transport.inject(Fault::Network("dropped".into()));
    transport.inject(Fault::Network("dropped".into()));
    let outcome = smol::block_on(page.upload.upload(&mut form(b"ink", "Mine"))).unwrap();

    assert_eq!(outcome.font_id, "f1");
    assert!(matches!(outcome.state, ActiveFontState::Error(_)));
    assert_eq!(outcome.state, page.ctx.state());
    assert_eq!(outcome.active(), None);
    assert_eq!(registry.fonts().len(), 1);
}

// ============================================================================
// MAPPING
// ============================================================================

#[test]
fn test_mapping_without_active_font() {
    let (_, transport) = backend();
    let page = page(&transport);

    assert_eq!(smol::block_on(page.mapping.open()).unwrap(), 0);
    let view = page.mapping.view();
    assert_eq!(view.notice.as_deref(), Some(mapping::NO_ACTIVE_FONT_NOTICE));
    assert!(!view.save_enabled());
    assert_eq!(transport.count(api::GET_EXTRACTED_CHARS), 0);

    let err = smol::block_on(page.mapping.save_mapping()).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::NoActiveFont));
    assert_eq!(transport.count(api::SAVE_MAPPING), 0);
}

#[test]
fn test_save_mapping_twice_is_stable() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    let page = page(&transport);

    smol::block_on(async {
        page.mapping.open().await.unwrap();
        page.mapping.set_value("g1.png", "A").unwrap();
        page.mapping.set_value("g2.png", "b").unwrap();

        let first = page.mapping.save_mapping().await.unwrap();
        assert_eq!(first.message, "Mapping saved (2 updated)");
        let second = page.mapping.save_mapping().await.unwrap();
        assert_eq!(second.message, "Mapping saved (0 updated)");
    });

    let font = registry.font(&FontId::new("f1")).unwrap();
    assert_eq!(font.glyph("g1.png").unwrap().mapped_char, Some('A'));
    assert_eq!(font.glyph("g2.png").unwrap().mapped_char, Some('b'));
}

#[test]
fn test_emptied_field_clears_mapping() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    map_g1(&registry, "f1", "A");
    let page = page(&transport);

    smol::block_on(async {
        page.mapping.open().await.unwrap();
        assert_eq!(page.mapping.view().unit("g1.png").unwrap().value, "A");
        page.mapping.clear_value("g1.png").unwrap();
        page.mapping.save_mapping().await.unwrap();
    });

    let font = registry.font(&FontId::new("f1")).unwrap();
    assert_eq!(font.glyph("g1.png").unwrap().mapped_char, None);
    assert_eq!(page.mapping.view().unit("g1.png").unwrap().persisted, None);
}

#[test]
fn test_invalid_value_blocks_whole_save() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    let page = page(&transport);

    smol::block_on(page.mapping.open()).unwrap();
    page.mapping.set_value("g1.png", "A").unwrap();
    page.mapping.set_value("g2.png", "xy").unwrap();

    let err = smol::block_on(page.mapping.save_mapping()).unwrap_err();
    assert!(matches!(err, SessionError::Precondition(Precondition::InvalidGlyphValue { .. })));
    assert_eq!(transport.count(api::SAVE_MAPPING), 0);
    assert_eq!(registry.font(&FontId::new("f1")).unwrap().mapped_count(), 0);

    assert!(page.mapping.set_value("nope.png", "A").is_err());
}

#[test]
fn test_save_after_font_changed_elsewhere_keeps_edits() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    registry.upload(b"two", None).unwrap();
    let page = page(&transport);

    smol::block_on(page.mapping.open()).unwrap();
    assert_eq!(page.mapping.view().font_id.as_deref(), Some("f2"));
    page.mapping.set_value("g1.png", "Q").unwrap();

    registry.set_active(&FontId::new("f1"), None).unwrap();
    let err = smol::block_on(page.mapping.save_mapping()).unwrap_err();
    assert_eq!(err.code(), Some(codes::FONT_MISMATCH));
    assert_eq!(page.mapping.view().unit("g1.png").unwrap().value, "Q");
    assert_eq!(registry.font(&FontId::new("f1")).unwrap().mapped_count(), 0);
}

// ============================================================================
// DELETION
// ============================================================================

#[test]
fn test_delete_active_font_resolves_none() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    let page = page(&transport);

    let outcome = smol::block_on(async {
        page.load().await.unwrap();
        page.deletion.delete("f2", &|_: &str| true).await
    }).unwrap();

    assert_eq!(outcome.active(), None);
    assert_eq!(outcome.state, ActiveFontState::NoneSelected);
    assert_eq!(outcome.message, "Font f2 deleted");
    assert_eq!(page.ctx.state(), ActiveFontState::NoneSelected);
    let selector = page.registry.selector();
    assert_eq!(selector.selected, None);
    assert!(!selector.contains("f2"));
    assert!(selector.contains("f1"));
}

#[test]
fn test_delete_other_font_keeps_active() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    let page = page(&transport);

    let outcome = smol::block_on(async {
        page.load().await.unwrap();
        page.deletion.delete("f1", &|_: &str| true).await
    }).unwrap();
    assert_eq!(outcome.active().map(|f| f.id.as_str()), Some("f2"));
}

#[test]
fn test_declined_delete_sends_nothing() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("Letters")).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    let prompt = RefCell::new(String::new());
    let decline = |p: &str| {
        *prompt.borrow_mut() = p.to_string();
        false
    };
    let err = smol::block_on(page.deletion.delete("f1", &decline)).unwrap_err();
    assert_eq!(err, SessionError::Precondition(Precondition::NotConfirmed));
    assert!(prompt.borrow().contains("\"Letters\""));
    assert_eq!(transport.count(api::DELETE_FONT), 0);
    assert!(registry.font(&FontId::new("f1")).is_some());
}

#[test]
fn test_delete_succeeds_even_if_refresh_fails() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    registry.upload(b"two", Some("Two")).unwrap();
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    transport.inject(Fault::Pass);
    transport.inject(Fault::Network("dropped".into()));
    transport.inject(Fault::Network("dropped".into()));
    let outcome = smol::block_on(page.deletion.delete("f1", &|_: &str| true)).unwrap();

    assert_eq!(outcome.message, "Font f1 deleted");
    assert!(matches!(outcome.state, ActiveFontState::Error(_)));
    assert_eq!(outcome.state, page.ctx.state());
    assert_eq!(outcome.active(), None);
    assert!(registry.font(&FontId::new("f1")).is_none());
}

// ============================================================================
// RE-ENTRANCY AND TEARDOWN
// ============================================================================

#[test]
fn test_second_generate_while_busy_is_refused() {
    let (registry, transport) = backend();
    registry.upload(b"one", None).unwrap();
    map_g1(&registry, "f1", "A");
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();

    transport.set_latency(Some(Duration::from_millis(50)));
    let (first, second) = smol::block_on(smol::future::zip(
        page.generator.generate("A"),
        page.generator.generate("A"),
    ));
    assert!(first.is_ok());
    assert_eq!(second, Err(SessionError::Busy(Action::Generate)));
    assert_eq!(transport.count(api::GENERATE), 1);
    assert!(!page.generator.is_busy());
}

#[test]
fn test_teardown_leaves_state_untouched() {
    let (registry, transport) = backend();
    registry.upload(b"one", Some("One")).unwrap();
    map_g1(&registry, "f1", "A");
    let page = page(&transport);
    smol::block_on(page.load()).unwrap();
    let before = page.ctx.state();

    registry.set_active(&FontId::new("f1"), None).unwrap();
    page.teardown();

    let err = smol::block_on(page.generator.generate("A")).unwrap_err();
    assert_eq!(err, SessionError::Detached);
    assert_eq!(page.generator.output(), None);

    let err = smol::block_on(page.registry.resolve_active_font()).unwrap_err();
    assert_eq!(err, SessionError::Detached);
    assert_eq!(page.ctx.state(), before);
}

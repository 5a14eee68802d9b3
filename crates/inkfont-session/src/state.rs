//! Client-local view of the active font

/// The font the server reported as active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFont {
    pub id: String,
    pub name: String,
    /// Server revision the report was taken at
    pub revision: Option<u64>,
}

/// Per-page active-font state.
///
/// `Unknown` → `Resolving` → one of `Active`, `NoneSelected`, `Error`.
/// Every later change goes back through `Resolving`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveFontState {
    #[default]
    Unknown,
    Resolving,
    Active(ActiveFont),
    NoneSelected,
    Error(String),
}

/// Controls that only make sense with an active font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub map: bool,
    pub edit: bool,
    pub delete: bool,
}

impl ActiveFontState {
    pub fn active(&self) -> Option<&ActiveFont> {
        match self {
            Self::Active(font) => Some(font),
            _ => None,
        }
    }

    /// Settled into one of the terminal states
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Active(_) | Self::NoneSelected | Self::Error(_))
    }

    pub fn controls(&self) -> Controls {
        let enabled = self.active().is_some();
        Controls { map: enabled, edit: enabled, delete: enabled }
    }

    /// Status text; "none" and "error" never read the same
    pub fn status_line(&self) -> String {
        match self {
            Self::Unknown => "Active Font: Unknown".into(),
            Self::Resolving => "Active Font: Loading...".into(),
            Self::Active(font) => format!("Active Font: {}", font.name),
            Self::NoneSelected => "Active Font: None Selected".into(),
            Self::Error(msg) => format!("Active Font: Error ({})", msg),
        }
    }
}

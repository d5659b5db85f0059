//! The unit a completion dropdown displays.

/// One dropdown row: the matched text plus display metadata.
///
/// `main` is what the engine matches and the row shows; `prefix` is an
/// optional left-gutter column (an icon, a kind marker); `id` is an opaque
/// caller handle. Disabled items render but cannot be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownItem {
    main: String,
    prefix: Option<String>,
    id: Option<String>,
    disabled: bool,
}

impl DropdownItem {
    #[must_use]
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            prefix: None,
            id: None,
            disabled: false,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The text the engine matches against.
    #[must_use]
    pub fn main(&self) -> &str {
        &self.main
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl From<&str> for DropdownItem {
    fn from(main: &str) -> Self {
        Self::new(main)
    }
}

impl From<String> for DropdownItem {
    fn from(main: String) -> Self {
        Self::new(main)
    }
}

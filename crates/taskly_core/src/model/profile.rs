//! Profile model: the single optional display name.

/// Shown in the greeting when no name has been saved.
pub const GREETING_FALLBACK: &str = "there";

/// In-memory profile state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    name: Option<String>,
}

impl Profile {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the first-run name prompt should be shown.
    pub fn needs_prompt(&self) -> bool {
        self.name.is_none()
    }

    pub fn greeting_name(&self) -> &str {
        self.name.as_deref().unwrap_or(GREETING_FALLBACK)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

/// Trims a display name; `None` when nothing remains.
pub fn normalize_display_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

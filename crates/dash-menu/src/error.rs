//! Error types for menu projection

/// Errors while registering actions or projecting panels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// A panel is reachable from itself through child panels
    #[error("context menu panel '{panel_id}' is its own ancestor: {}", .path.join(" -> "))]
    PanelCycle {
        /// Panel that was entered twice
        panel_id: String,
        /// Ancestor path from the root, ending with `panel_id`
        path: Vec<String>,
    },

    /// Action id already taken in a registry
    #[error("action already registered: '{0}'")]
    DuplicateAction(String),
}

impl MenuError {
    /// Create cycle error
    pub fn panel_cycle(panel_id: impl Into<String>, path: Vec<String>) -> Self {
        Self::PanelCycle {
            panel_id: panel_id.into(),
            path,
        }
    }

    /// Check if error is a configuration problem in the panel graph
    #[inline]
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::PanelCycle { .. })
    }
}

/// Result type alias for menu operations
pub type MenuResult<T> = Result<T, MenuError>;

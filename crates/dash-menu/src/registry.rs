//! Action registry
//!
//! Provides [`ActionRegistry`], the pluggable list of actions a projection
//! reads from. Registration order is preserved and drives item order.

use crate::action::SharedAction;
use crate::error::MenuError;
use std::fmt;

/// Ordered registry of panel actions keyed by action id
pub struct ActionRegistry<T, S> {
    actions: Vec<SharedAction<T, S>>,
}

impl<T, S> ActionRegistry<T, S> {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Register an action
    ///
    /// # Errors
    /// - `MenuError::DuplicateAction` if the id is already registered
    pub fn register(&mut self, action: SharedAction<T, S>) -> Result<(), MenuError> {
        if self.contains(action.id()) {
            return Err(MenuError::DuplicateAction(action.id().to_string()));
        }
        tracing::debug!(action = action.id(), panel = action.parent_panel_id(), "registered panel action");
        self.actions.push(action);
        Ok(())
    }

    /// Remove action by id
    pub fn unregister(&mut self, id: &str) -> Option<SharedAction<T, S>> {
        let idx = self.actions.iter().position(|a| a.id() == id)?;
        Some(self.actions.remove(idx))
    }

    /// Get action by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SharedAction<T, S>> {
        self.actions.iter().find(|a| a.id() == id)
    }

    /// Check if action exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All actions in registration order
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[SharedAction<T, S>] {
        &self.actions
    }

    /// Actions listed in a given panel
    pub fn actions_for_panel<'a>(
        &'a self,
        panel_id: &'a str,
    ) -> impl Iterator<Item = &'a SharedAction<T, S>> + 'a {
        self.actions
            .iter()
            .filter(move |a| a.parent_panel_id() == panel_id)
    }

    /// Get number of registered actions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<T, S> Default for ActionRegistry<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> fmt::Debug for ActionRegistry<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|a| a.id()))
            .finish()
    }
}

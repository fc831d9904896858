//! Panel actions and the context they are evaluated against
//!
//! An action is attached to exactly one parent panel. Whether it shows up,
//! whether it is enabled and what it does on click all depend on the
//! [`ActionContext`] the menu was opened with.

use crate::panel::ContextMenuPanel;
use std::fmt;
use std::sync::Arc;

/// Ambient context a menu is opened with
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext<T, S> {
    /// Object the menu was opened on, if any
    pub target: Option<T>,
    /// State of the container hosting the target
    pub container_state: S,
}

impl<T, S> ActionContext<T, S> {
    /// Create context with optional target
    #[inline]
    #[must_use]
    pub fn new(target: Option<T>, container_state: S) -> Self {
        Self {
            target,
            container_state,
        }
    }

    /// Create context for a concrete target
    #[inline]
    #[must_use]
    pub fn with_target(target: T, container_state: S) -> Self {
        Self::new(Some(target), container_state)
    }

    /// Create context without a target
    #[inline]
    #[must_use]
    pub fn without_target(container_state: S) -> Self {
        Self::new(None, container_state)
    }

    /// Get target, if any
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Get container state
    #[inline]
    #[must_use]
    pub fn container_state(&self) -> &S {
        &self.container_state
    }
}

/// A registered behavior attached to a menu panel
///
/// Implementations must be immutable for the duration of one projection.
pub trait PanelAction<T, S>: Send + Sync {
    /// Unique action id
    fn id(&self) -> &str;

    /// Id of the panel this action is listed in
    fn parent_panel_id(&self) -> &str;

    /// Label shown in the menu
    fn display_name(&self) -> &str;

    /// Icon name
    fn icon(&self) -> Option<&str> {
        None
    }

    /// Panel opened by this action, if it is a submenu entry
    fn child_panel(&self) -> Option<&ContextMenuPanel<T, S>> {
        None
    }

    /// Whether the action is listed at all
    fn is_visible(&self, _context: &ActionContext<T, S>) -> bool {
        true
    }

    /// Whether the listed action is greyed out
    fn is_disabled(&self, _context: &ActionContext<T, S>) -> bool {
        false
    }

    /// Execute the action
    fn on_click(&self, context: &ActionContext<T, S>);
}

/// Shared, type-erased action
pub type SharedAction<T, S> = Arc<dyn PanelAction<T, S>>;

type Predicate<T, S> = Arc<dyn Fn(&ActionContext<T, S>) -> bool + Send + Sync>;
type Handler<T, S> = Arc<dyn Fn(&ActionContext<T, S>) + Send + Sync>;

/// Action declared from plain data and closures
///
/// Visible and enabled unless told otherwise; clicking does nothing until a
/// handler is attached.
pub struct DeclaredAction<T, S> {
    id: String,
    parent_panel_id: String,
    display_name: String,
    icon: Option<String>,
    child_panel: Option<ContextMenuPanel<T, S>>,
    visible: Option<Predicate<T, S>>,
    disabled: Option<Predicate<T, S>>,
    click: Option<Handler<T, S>>,
}

impl<T, S> DeclaredAction<T, S> {
    /// Create action listed in `parent_panel_id`
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        parent_panel_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_panel_id: parent_panel_id.into(),
            display_name: display_name.into(),
            icon: None,
            child_panel: None,
            visible: None,
            disabled: None,
            click: None,
        }
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// With submenu panel
    #[inline]
    #[must_use]
    pub fn with_child_panel(mut self, panel: ContextMenuPanel<T, S>) -> Self {
        self.child_panel = Some(panel);
        self
    }

    /// With visibility predicate
    #[must_use]
    pub fn with_visibility<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext<T, S>) -> bool + Send + Sync + 'static,
    {
        self.visible = Some(Arc::new(f));
        self
    }

    /// With disabled predicate
    #[must_use]
    pub fn with_disabled<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext<T, S>) -> bool + Send + Sync + 'static,
    {
        self.disabled = Some(Arc::new(f));
        self
    }

    /// With click handler
    #[must_use]
    pub fn with_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext<T, S>) + Send + Sync + 'static,
    {
        self.click = Some(Arc::new(f));
        self
    }
}

impl<T: 'static, S: 'static> DeclaredAction<T, S> {
    /// Erase into a [`SharedAction`]
    #[inline]
    #[must_use]
    pub fn into_shared(self) -> SharedAction<T, S> {
        Arc::new(self)
    }
}

impl<T, S> PanelAction<T, S> for DeclaredAction<T, S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_panel_id(&self) -> &str {
        &self.parent_panel_id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn child_panel(&self) -> Option<&ContextMenuPanel<T, S>> {
        self.child_panel.as_ref()
    }

    fn is_visible(&self, context: &ActionContext<T, S>) -> bool {
        self.visible.as_ref().map_or(true, |f| f(context))
    }

    fn is_disabled(&self, context: &ActionContext<T, S>) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(context))
    }

    fn on_click(&self, context: &ActionContext<T, S>) {
        if let Some(click) = &self.click {
            click(context);
        }
    }
}

impl<T, S> fmt::Debug for DeclaredAction<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredAction")
            .field("id", &self.id)
            .field("parent_panel_id", &self.parent_panel_id)
            .field("display_name", &self.display_name)
            .field("icon", &self.icon)
            .field("child_panel", &self.child_panel.as_ref().map(ContextMenuPanel::id))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Ctx = ActionContext<&'static str, bool>;

    #[test]
    fn context_accessors() {
        let ctx = ActionContext::with_target("panel-1", true);
        assert_eq!(ctx.target(), Some(&"panel-1"));
        assert!(*ctx.container_state());

        let empty: ActionContext<&str, bool> = ActionContext::without_target(false);
        assert!(empty.target().is_none());
    }

    #[test]
    fn declared_action_defaults() {
        let action: DeclaredAction<&str, bool> = DeclaredAction::new("edit", "main", "Edit");
        let ctx: Ctx = ActionContext::without_target(false);

        assert_eq!(action.id(), "edit");
        assert_eq!(action.parent_panel_id(), "main");
        assert_eq!(action.display_name(), "Edit");
        assert!(action.icon().is_none());
        assert!(action.child_panel().is_none());
        assert!(action.is_visible(&ctx));
        assert!(!action.is_disabled(&ctx));
        action.on_click(&ctx);
    }

    #[test]
    fn declared_action_predicates_see_context() {
        let action = DeclaredAction::new("remove", "main", "Remove")
            .with_visibility(|ctx: &Ctx| ctx.target.is_some())
            .with_disabled(|ctx: &Ctx| !ctx.container_state);

        assert!(!action.is_visible(&ActionContext::without_target(true)));
        assert!(action.is_visible(&ActionContext::with_target("p", true)));
        assert!(action.is_disabled(&ActionContext::with_target("p", false)));
        assert!(!action.is_disabled(&ActionContext::with_target("p", true)));
    }

    #[test]
    fn declared_action_click() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        let action = DeclaredAction::new("edit", "main", "Edit")
            .with_click(move |_: &Ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        action.on_click(&ActionContext::without_target(true));
        action.on_click(&ActionContext::without_target(true));
        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn declared_action_debug_omits_closures() {
        let action: DeclaredAction<&str, bool> = DeclaredAction::new("edit", "main", "Edit")
            .with_child_panel(ContextMenuPanel::new("sub", "Sub"));
        let debug = format!("{action:?}");
        assert!(debug.contains("edit"));
        assert!(debug.contains("sub"));
    }
}

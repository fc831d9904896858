//! Projection of actions into flat menu panels
//!
//! Starting from a root panel, every visible action listed in that panel
//! becomes an item. Actions that open a child panel pull that panel (and its
//! own descendants) into the output directly after the current panel, so the
//! result is a pre-order flattening addressed by panel id.
//!
//! Child panels are not de-duplicated: two actions pointing at the same
//! panel id produce two projected copies. A panel that is its own ancestor
//! is rejected with [`MenuError::PanelCycle`].

use crate::action::{ActionContext, SharedAction};
use crate::error::MenuError;
use crate::panel::{test_subject_for, ClickHandler, ContextMenuPanel, MenuItem, MenuPanel};
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;

/// Hook run after an item's action, typically closing the menu
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// Builds renderer-ready panels from an action list
#[derive(Clone, Default)]
pub struct MenuProjector {
    close_handler: Option<CloseHandler>,
}

impl MenuProjector {
    /// Create projector without close hook
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With hook run after every item click
    #[must_use]
    pub fn with_close_handler<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.close_handler = Some(Arc::new(f));
        self
    }

    /// Project `root` and every panel reachable from it through visible actions
    ///
    /// # Returns
    /// Root panel first, then child panels in pre-order
    ///
    /// # Errors
    /// - `MenuError::PanelCycle` if a child panel is its own ancestor
    pub fn project<T, S>(
        &self,
        root: &ContextMenuPanel<T, S>,
        actions: &[SharedAction<T, S>],
        context: Arc<ActionContext<T, S>>,
    ) -> Result<Vec<MenuPanel>, MenuError>
    where
        T: Send + Sync + 'static,
        S: Send + Sync + 'static,
    {
        let mut panels = Vec::new();
        let mut ancestors = IndexSet::new();
        self.project_panel(root, actions, &context, &mut ancestors, &mut panels)?;
        tracing::debug!(root = root.id(), panels = panels.len(), "projected context menu");
        Ok(panels)
    }

    fn project_panel<T, S>(
        &self,
        panel: &ContextMenuPanel<T, S>,
        actions: &[SharedAction<T, S>],
        context: &Arc<ActionContext<T, S>>,
        ancestors: &mut IndexSet<String>,
        out: &mut Vec<MenuPanel>,
    ) -> Result<(), MenuError>
    where
        T: Send + Sync + 'static,
        S: Send + Sync + 'static,
    {
        if !ancestors.insert(panel.id().to_string()) {
            let mut path: Vec<String> = ancestors.iter().cloned().collect();
            path.push(panel.id().to_string());
            tracing::warn!(panel = panel.id(), "context menu panel cycle");
            return Err(MenuError::panel_cycle(panel.id(), path));
        }

        // Reserve the slot so descendants land after this panel.
        let slot = out.len();
        out.push(MenuPanel {
            id: panel.id().to_string(),
            title: panel.title().to_string(),
            content: panel.render_content(context),
            items: Vec::new(),
        });

        let mut items = Vec::new();
        for action in actions.iter().filter(|a| a.parent_panel_id() == panel.id()) {
            if !action.is_visible(context) {
                tracing::trace!(action = action.id(), "skipping hidden action");
                continue;
            }

            items.push(self.build_item(action, context));

            if let Some(child) = action.child_panel() {
                self.project_panel(child, actions, context, ancestors, out)?;
            }
        }

        out[slot].items = items;
        ancestors.pop();
        Ok(())
    }

    fn build_item<T, S>(
        &self,
        action: &SharedAction<T, S>,
        context: &Arc<ActionContext<T, S>>,
    ) -> MenuItem
    where
        T: Send + Sync + 'static,
        S: Send + Sync + 'static,
    {
        let handler_action = Arc::clone(action);
        let handler_context = Arc::clone(context);
        let close = self.close_handler.clone();
        let on_click: ClickHandler = Arc::new(move || {
            handler_action.on_click(&handler_context);
            if let Some(close) = &close {
                close();
            }
        });

        let mut item = MenuItem::new(action.display_name(), test_subject_for(action.id()), on_click);
        item.icon = action.icon().map(str::to_string);
        item.panel = action.child_panel().map(|p| p.id().to_string());
        item.disabled = action.is_disabled(context);
        item
    }
}

impl fmt::Debug for MenuProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuProjector")
            .field("close_handler", &self.close_handler.is_some())
            .finish()
    }
}

/// Project with a default [`MenuProjector`]
///
/// # Errors
/// - `MenuError::PanelCycle` if a child panel is its own ancestor
pub fn project<T, S>(
    root: &ContextMenuPanel<T, S>,
    actions: &[SharedAction<T, S>],
    context: Arc<ActionContext<T, S>>,
) -> Result<Vec<MenuPanel>, MenuError>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    MenuProjector::new().project(root, actions, context)
}

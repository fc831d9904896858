//! Menu panel descriptors
//!
//! [`ContextMenuPanel`] is the input side (what actions point at),
//! [`MenuPanel`] and [`MenuItem`] are what the renderer receives.

use crate::action::ActionContext;
use std::fmt;
use std::sync::Arc;

/// Prefix of the stable test identifier carried by every item
pub const TEST_SUBJECT_PREFIX: &str = "dashboardPanelAction-";

/// Stable test identifier for an action id
#[inline]
#[must_use]
pub fn test_subject_for(action_id: &str) -> String {
    format!("{TEST_SUBJECT_PREFIX}{action_id}")
}

type ContentFn<T, S> = Arc<dyn Fn(&ActionContext<T, S>) -> String + Send + Sync>;

/// Addressable menu surface declared by the host or by an action
pub struct ContextMenuPanel<T, S> {
    id: String,
    title: String,
    content: Option<ContentFn<T, S>>,
}

impl<T, S> ContextMenuPanel<T, S> {
    /// Create panel without free-form content
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: None,
        }
    }

    /// With free-form content rendered from the menu context
    #[must_use]
    pub fn with_content<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext<T, S>) -> String + Send + Sync + 'static,
    {
        self.content = Some(Arc::new(f));
        self
    }

    /// Panel id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Panel title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Render content for a context, if the panel has any
    #[must_use]
    pub fn render_content(&self, context: &ActionContext<T, S>) -> Option<String> {
        self.content.as_ref().map(|f| f(context))
    }
}

impl<T, S> Clone for ContextMenuPanel<T, S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

impl<T, S> fmt::Debug for ContextMenuPanel<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuPanel")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

/// Click handler bound to the context the menu was projected with
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// Clickable entry of a projected panel
#[derive(Clone)]
pub struct MenuItem {
    /// Label
    pub name: String,
    /// Icon name
    pub icon: Option<String>,
    /// Id of the panel this item opens
    pub panel: Option<String>,
    /// Greyed out
    pub disabled: bool,
    /// Stable test identifier derived from the action id
    pub test_subject: String,
    on_click: ClickHandler,
}

impl MenuItem {
    /// Create item with a click handler
    #[must_use]
    pub fn new(name: impl Into<String>, test_subject: impl Into<String>, on_click: ClickHandler) -> Self {
        Self {
            name: name.into(),
            icon: None,
            panel: None,
            disabled: false,
            test_subject: test_subject.into(),
            on_click,
        }
    }

    /// Run the click handler
    ///
    /// Returns `false` without running anything when the item is disabled.
    pub fn click(&self) -> bool {
        if self.disabled {
            return false;
        }
        (self.on_click)();
        true
    }

    /// Whether clicking opens a submenu
    #[inline]
    #[must_use]
    pub fn opens_panel(&self) -> bool {
        self.panel.is_some()
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("panel", &self.panel)
            .field("disabled", &self.disabled)
            .field("test_subject", &self.test_subject)
            .finish_non_exhaustive()
    }
}

/// Projected panel as handed to the renderer
#[derive(Debug, Clone)]
pub struct MenuPanel {
    /// Panel id, referenced by [`MenuItem::panel`]
    pub id: String,
    /// Title
    pub title: String,
    /// Free-form content
    pub content: Option<String>,
    /// Visible items in action order
    pub items: Vec<MenuItem>,
}

impl MenuPanel {
    /// Find item by test identifier
    #[must_use]
    pub fn item(&self, test_subject: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.test_subject == test_subject)
    }

    /// Item labels in order
    #[must_use]
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }
}

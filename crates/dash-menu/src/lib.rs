//! Dashboard panel context menus
//!
//! Turns a pluggable registry of panel actions into the flat list of menu
//! panels a context menu renderer consumes.
//!
//! # Core Operations
//!
//! - **Register**: plug [`PanelAction`]s into an [`ActionRegistry`]
//! - **Project**: evaluate visibility against an [`ActionContext`] and flatten
//!   the reachable panels into `Vec<MenuPanel>` (root first, pre-order)
//! - **Click**: each produced [`MenuItem`] carries a handler bound to the context
//!
//! # Architecture
//!
//! ```text
//! ActionRegistry ──┐
//!                  ├──> MenuProjector ──> [root, child, grandchild, child2, ...]
//! ActionContext ───┘         │
//!                            └── ancestor path (cycle guard)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dash_menu::{ActionContext, ContextMenuPanel, DeclaredAction, MenuProjector};
//!
//! let root = ContextMenuPanel::new("mainMenu", "Options");
//! let edit = DeclaredAction::new("edit", "mainMenu", "Edit visualization")
//!     .with_icon("pencil")
//!     .with_click(|ctx: &ActionContext<String, ()>| println!("edit {:?}", ctx.target));
//!
//! let panels = MenuProjector::new().project(
//!     &root,
//!     &[edit.into_shared()],
//!     ActionContext::with_target("panel-1".to_string(), ()).into(),
//! )?;
//! assert_eq!(panels.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod error;
pub mod panel;
pub mod projector;
pub mod registry;

pub use action::{ActionContext, DeclaredAction, PanelAction, SharedAction};
pub use error::{MenuError, MenuResult};
pub use panel::{test_subject_for, ContextMenuPanel, MenuItem, MenuPanel};
pub use projector::{project, MenuProjector};
pub use registry::ActionRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building context menus
    pub use crate::action::{ActionContext, DeclaredAction, PanelAction, SharedAction};
    pub use crate::error::MenuError;
    pub use crate::panel::{ContextMenuPanel, MenuItem, MenuPanel};
    pub use crate::projector::MenuProjector;
    pub use crate::registry::ActionRegistry;
}

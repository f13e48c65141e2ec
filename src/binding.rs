//! Binding model construction.
//!
//! Turns the declarative [`BindingConfig`](crate::config::BindingConfig) into runtime
//! action sets and actions, and submits one suggested-binding set per interaction
//! profile.

pub mod builder;
pub mod name;
pub mod table;

pub use builder::{ActionInfo, ActionModel, BindingModelBuilder};
pub use name::{ActionName, ActionSetName, BoundedName, LocalizedActionName, LocalizedActionSetName};
pub use table::{BindingTable, ProfileSlot};

//! Declarative configuration.
//!
//! Action sets, actions and their suggested bindings are described in a JSON document
//! (`actions.json` by default). Loop and application settings live in [`Settings`].

pub mod descriptor;
pub mod settings;

pub use descriptor::{ActionDescriptor, ActionSetDescriptor, ActionType, BindingConfig};
pub use settings::Settings;

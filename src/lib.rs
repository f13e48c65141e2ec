//! # xrbind - Declarative OpenXR Input Bindings
//!
//! Turns a declarative description of action sets, actions and suggested controller
//! bindings into live OpenXR handles, then keeps action state synchronized once the
//! session becomes active.
//!
//! ## Features
//!
//! - **Declarative Bindings**: action sets, actions and per-profile bindings from JSON
//! - **Lifecycle Driven**: attach and begin happen when the runtime reports `Ready`
//! - **Tick Loop**: sync and query every action once the session is focused
//! - **Offline Check**: validate a configuration without a headset
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - Descriptors and settings
//! - [`binding`] - Binding model builder
//! - [`runtime`] - Runtime seam, OpenXR and scripted implementations
//! - [`session`] - Session lifecycle controller
//! - [`sync`] - Synchronization and query loop
//! - [`app`] - Application core and component coordination

// Core modules
pub mod config;
pub mod error;
pub mod runtime;

// Core components
pub mod app;
pub mod binding;
pub mod session;
pub mod sync;

// Re-export commonly used types for convenience
pub use error::{Result, XrBindError};

// Public API surface for external usage
pub use app::Application;
pub use binding::{ActionInfo, ActionModel, BindingModelBuilder};
pub use config::{BindingConfig, Settings};
pub use runtime::{ScriptedRuntime, XrRuntime};
pub use session::{SessionController, SessionState};
pub use sync::{InputLoop, TickOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

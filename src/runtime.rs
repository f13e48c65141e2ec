//! XR runtime seam.
//!
//! The binding builder, lifecycle controller and sync loop only talk to the runtime
//! through [`XrRuntime`]. Handles are opaque identifiers minted by the implementation,
//! so the core never holds typed runtime objects and can be driven by a scripted
//! runtime in tests.

pub mod headless;
pub mod scripted;

use crate::binding::{ActionName, ActionSetName, LocalizedActionName, LocalizedActionSetName};
use crate::config::ActionType;
use crate::error::ResultCode;
use crate::session::SessionState;

pub use headless::{OpenXrRuntime, RuntimeOptions};
pub use scripted::{RuntimeCall, ScriptedRuntime};

/// Result of a single runtime call.
pub type RuntimeResult<T> = std::result::Result<T, ResultCode>;

/// Runtime path identifier produced by string-to-path conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(pub u64);

/// Handle to a created action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionSetHandle(pub usize);

/// Handle to a created action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(pub usize);

/// An action set marked active for synchronization.
///
/// `subaction_path: None` means the set is active for every sub-device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveActionSet {
    pub set: ActionSetHandle,
    pub subaction_path: Option<PathId>,
}

impl ActiveActionSet {
    pub fn unrestricted(set: ActionSetHandle) -> Self {
        Self {
            set,
            subaction_path: None,
        }
    }
}

/// One (action, input source) pair inside a profile's suggested bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedBinding {
    pub action: ActionHandle,
    pub binding: PathId,
}

/// Current state of a boolean action after the last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BooleanState {
    pub current_state: bool,
    pub changed_since_last_sync: bool,
    pub is_active: bool,
}

/// Notification delivered by the runtime's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    SessionStateChanged(SessionState),
    /// Any event type this crate does not consume
    Other,
}

/// Operations the input layer needs from an XR runtime.
///
/// Every call returns the runtime's [`ResultCode`] on failure; callers translate it
/// into the crate's error taxonomy together with the call context.
pub trait XrRuntime {
    /// Convert a path string such as `/user/hand/left` into a path identifier
    fn string_to_path(&mut self, path: &str) -> RuntimeResult<PathId>;

    /// Create an action set
    fn create_action_set(
        &mut self,
        name: &ActionSetName,
        localized_name: &LocalizedActionSetName,
        priority: u32,
    ) -> RuntimeResult<ActionSetHandle>;

    /// Create an action owned by `set`
    ///
    /// An empty `subaction_paths` slice means the action applies to every sub-device.
    fn create_action(
        &mut self,
        set: ActionSetHandle,
        name: &ActionName,
        localized_name: &LocalizedActionName,
        action_type: ActionType,
        subaction_paths: &[PathId],
    ) -> RuntimeResult<ActionHandle>;

    /// Submit the suggested bindings for one interaction profile
    fn suggest_bindings(
        &mut self,
        interaction_profile: PathId,
        bindings: &[SuggestedBinding],
    ) -> RuntimeResult<()>;

    /// Attach action sets to the session; the runtime allows this exactly once
    fn attach_action_sets(&mut self, sets: &[ActionSetHandle]) -> RuntimeResult<()>;

    /// Begin the session
    fn begin_session(&mut self) -> RuntimeResult<()>;

    /// Pop the next pending event without blocking
    fn poll_event(&mut self) -> RuntimeResult<Option<RuntimeEvent>>;

    /// Synchronize action state for the given active sets
    fn sync_actions(&mut self, active: &[ActiveActionSet]) -> RuntimeResult<()>;

    /// Read the current state of a boolean action
    fn boolean_state(
        &mut self,
        action: ActionHandle,
        subaction_path: Option<PathId>,
    ) -> RuntimeResult<BooleanState>;
}

//! Offline runtime that follows OpenXR's validation rules without a device.
//!
//! Used to check a configuration without a headset (`xrbind --check`) and to drive
//! the lifecycle and sync loop deterministically: events are queued by the caller,
//! boolean values are set by hand, and every mutating call is recorded.

use crate::binding::{ActionName, ActionSetName, LocalizedActionName, LocalizedActionSetName};
use crate::config::ActionType;
use crate::runtime::{
    ActionHandle, ActionSetHandle, ActiveActionSet, BooleanState, PathId, RuntimeEvent,
    RuntimeResult, SuggestedBinding, XrRuntime,
};
use crate::session::SessionState;
use std::collections::{HashMap, HashSet, VecDeque};

/// Result codes the scripted runtime can produce.
pub mod codes {
    use crate::error::ResultCode;

    pub fn runtime_failure() -> ResultCode {
        ResultCode::new(-2, "XR_ERROR_RUNTIME_FAILURE")
    }
    pub fn handle_invalid() -> ResultCode {
        ResultCode::new(-12, "XR_ERROR_HANDLE_INVALID")
    }
    pub fn session_not_running() -> ResultCode {
        ResultCode::new(-16, "XR_ERROR_SESSION_NOT_RUNNING")
    }
    pub fn session_lost() -> ResultCode {
        ResultCode::new(-17, "XR_ERROR_SESSION_LOST")
    }
    pub fn path_format_invalid() -> ResultCode {
        ResultCode::new(-21, "XR_ERROR_PATH_FORMAT_INVALID")
    }
    pub fn path_unsupported() -> ResultCode {
        ResultCode::new(-22, "XR_ERROR_PATH_UNSUPPORTED")
    }
    pub fn action_type_mismatch() -> ResultCode {
        ResultCode::new(-27, "XR_ERROR_ACTION_TYPE_MISMATCH")
    }
    pub fn name_duplicated() -> ResultCode {
        ResultCode::new(-44, "XR_ERROR_NAME_DUPLICATED")
    }
    pub fn name_invalid() -> ResultCode {
        ResultCode::new(-45, "XR_ERROR_NAME_INVALID")
    }
    pub fn action_set_not_attached() -> ResultCode {
        ResultCode::new(-46, "XR_ERROR_ACTIONSET_NOT_ATTACHED")
    }
    pub fn action_sets_already_attached() -> ResultCode {
        ResultCode::new(-47, "XR_ERROR_ACTIONSETS_ALREADY_ATTACHED")
    }
    pub fn localized_name_invalid() -> ResultCode {
        ResultCode::new(-49, "XR_ERROR_LOCALIZED_NAME_INVALID")
    }
}

/// Mutating call recorded by [`ScriptedRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    CreateActionSet {
        name: String,
        priority: u32,
    },
    CreateAction {
        set: String,
        name: String,
        action_type: ActionType,
        subaction_paths: Vec<String>,
    },
    /// Bindings as (action name, binding path) pairs
    SuggestBindings {
        profile: String,
        bindings: Vec<(String, String)>,
    },
    AttachActionSets {
        sets: Vec<String>,
    },
    BeginSession,
    SyncActions {
        sets: Vec<String>,
    },
    QueryBoolean {
        action: String,
    },
}

#[derive(Debug)]
struct ScriptedSet {
    name: String,
    action_names: HashSet<String>,
}

#[derive(Debug)]
struct ScriptedAction {
    name: String,
    set: usize,
    action_type: ActionType,
    /// Value set by the caller, picked up by the next sync
    value: bool,
    /// Value captured by the last sync
    synced: bool,
    changed: bool,
}

/// In-process [`XrRuntime`] with scripted events and values.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    paths: Vec<String>,
    path_ids: HashMap<String, u64>,
    sets: Vec<ScriptedSet>,
    actions: Vec<ScriptedAction>,
    events: VecDeque<RuntimeEvent>,
    calls: Vec<RuntimeCall>,
    attached: bool,
    running: bool,
    begin_failures: usize,
    rejected_profiles: HashSet<String>,
    fail_sync: bool,
    failing_queries: HashSet<String>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary event for the next poll
    pub fn push_event(&mut self, event: RuntimeEvent) {
        self.events.push_back(event);
    }

    /// Queue a session-state change notification
    pub fn push_state(&mut self, state: SessionState) {
        self.push_event(RuntimeEvent::SessionStateChanged(state));
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Make the next `count` begin-session calls fail
    pub fn fail_begin(&mut self, count: usize) {
        self.begin_failures = count;
    }

    /// Reject binding suggestions for `profile`
    pub fn reject_profile(&mut self, profile: &str) {
        self.rejected_profiles.insert(profile.to_string());
    }

    pub fn fail_sync(&mut self, fail: bool) {
        self.fail_sync = fail;
    }

    /// Make state queries for the named action fail
    pub fn fail_query(&mut self, action_name: &str) {
        self.failing_queries.insert(action_name.to_string());
    }

    /// Set the value a boolean action reports once the next sync has run.
    ///
    /// Returns false when no action with that name exists.
    pub fn set_boolean(&mut self, action_name: &str, value: bool) -> bool {
        let mut found = false;
        for action in self.actions.iter_mut().filter(|a| a.name == action_name) {
            action.value = value;
            found = true;
        }
        found
    }

    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    /// Number of recorded calls matching `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&RuntimeCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn path_str(&self, path: PathId) -> String {
        self.paths
            .get(path.0.wrapping_sub(1) as usize)
            .cloned()
            .unwrap_or_else(|| format!("<path {}>", path.0))
    }

    fn set_name(&self, set: ActionSetHandle) -> String {
        self.sets
            .get(set.0)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    fn action_name(&self, action: ActionHandle) -> String {
        self.actions
            .get(action.0)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }
}

/// Well-formed path per OpenXR: `/`-separated, non-empty components of
/// lowercase letters, digits, `-`, `_` and `.`, not made of dots only.
pub fn is_well_formed_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    !rest.is_empty()
        && rest.split('/').all(|component| {
            !component.is_empty()
                && !component.chars().all(|c| c == '.')
                && component.chars().all(is_path_char)
        })
}

/// Well-formed action or action-set name: non-empty, same charset as a path component
pub fn is_well_formed_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_path_char)
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')
}

impl XrRuntime for ScriptedRuntime {
    fn string_to_path(&mut self, path: &str) -> RuntimeResult<PathId> {
        if !is_well_formed_path(path) {
            return Err(codes::path_format_invalid());
        }
        if let Some(&id) = self.path_ids.get(path) {
            return Ok(PathId(id));
        }
        self.paths.push(path.to_string());
        let id = self.paths.len() as u64;
        self.path_ids.insert(path.to_string(), id);
        Ok(PathId(id))
    }

    fn create_action_set(
        &mut self,
        name: &ActionSetName,
        localized_name: &LocalizedActionSetName,
        priority: u32,
    ) -> RuntimeResult<ActionSetHandle> {
        if !is_well_formed_name(name.as_str()) {
            return Err(codes::name_invalid());
        }
        if localized_name.as_str().is_empty() {
            return Err(codes::localized_name_invalid());
        }
        if self.sets.iter().any(|s| s.name == name.as_str()) {
            return Err(codes::name_duplicated());
        }

        self.calls.push(RuntimeCall::CreateActionSet {
            name: name.to_string(),
            priority,
        });
        self.sets.push(ScriptedSet {
            name: name.to_string(),
            action_names: HashSet::new(),
        });
        Ok(ActionSetHandle(self.sets.len() - 1))
    }

    fn create_action(
        &mut self,
        set: ActionSetHandle,
        name: &ActionName,
        localized_name: &LocalizedActionName,
        action_type: ActionType,
        subaction_paths: &[PathId],
    ) -> RuntimeResult<ActionHandle> {
        if self.attached {
            return Err(codes::action_sets_already_attached());
        }
        if !is_well_formed_name(name.as_str()) {
            return Err(codes::name_invalid());
        }
        if localized_name.as_str().is_empty() {
            return Err(codes::localized_name_invalid());
        }
        let owner = self.sets.get_mut(set.0).ok_or_else(codes::handle_invalid)?;
        if !owner.action_names.insert(name.to_string()) {
            return Err(codes::name_duplicated());
        }
        let set_name = owner.name.clone();

        let subaction_paths: Vec<String> = subaction_paths
            .iter()
            .map(|p| self.path_str(*p))
            .collect();
        self.calls.push(RuntimeCall::CreateAction {
            set: set_name,
            name: name.to_string(),
            action_type,
            subaction_paths,
        });
        self.actions.push(ScriptedAction {
            name: name.to_string(),
            set: set.0,
            action_type,
            value: false,
            synced: false,
            changed: false,
        });
        Ok(ActionHandle(self.actions.len() - 1))
    }

    fn suggest_bindings(
        &mut self,
        interaction_profile: PathId,
        bindings: &[SuggestedBinding],
    ) -> RuntimeResult<()> {
        if self.attached {
            return Err(codes::action_sets_already_attached());
        }
        let profile = self.path_str(interaction_profile);
        if self.rejected_profiles.contains(&profile) {
            return Err(codes::path_unsupported());
        }
        if bindings.iter().any(|b| b.action.0 >= self.actions.len()) {
            return Err(codes::handle_invalid());
        }

        let bindings: Vec<(String, String)> = bindings
            .iter()
            .map(|b| (self.action_name(b.action), self.path_str(b.binding)))
            .collect();
        self.calls
            .push(RuntimeCall::SuggestBindings { profile, bindings });
        Ok(())
    }

    fn attach_action_sets(&mut self, sets: &[ActionSetHandle]) -> RuntimeResult<()> {
        if self.attached {
            return Err(codes::action_sets_already_attached());
        }
        if sets.iter().any(|s| s.0 >= self.sets.len()) {
            return Err(codes::handle_invalid());
        }

        let sets: Vec<String> = sets.iter().map(|s| self.set_name(*s)).collect();
        self.calls.push(RuntimeCall::AttachActionSets { sets });
        self.attached = true;
        Ok(())
    }

    fn begin_session(&mut self) -> RuntimeResult<()> {
        self.calls.push(RuntimeCall::BeginSession);
        if self.begin_failures > 0 {
            self.begin_failures -= 1;
            return Err(codes::runtime_failure());
        }
        self.running = true;
        Ok(())
    }

    fn poll_event(&mut self) -> RuntimeResult<Option<RuntimeEvent>> {
        Ok(self.events.pop_front())
    }

    fn sync_actions(&mut self, active: &[ActiveActionSet]) -> RuntimeResult<()> {
        let sets: Vec<String> = active.iter().map(|a| self.set_name(a.set)).collect();
        self.calls.push(RuntimeCall::SyncActions { sets });

        if self.fail_sync {
            return Err(codes::session_lost());
        }
        if !self.attached {
            return Err(codes::action_set_not_attached());
        }
        if !self.running {
            return Err(codes::session_not_running());
        }

        for action in &mut self.actions {
            if active.iter().any(|a| a.set.0 == action.set) {
                action.changed = action.value != action.synced;
                action.synced = action.value;
            }
        }
        Ok(())
    }

    fn boolean_state(
        &mut self,
        action: ActionHandle,
        _subaction_path: Option<PathId>,
    ) -> RuntimeResult<BooleanState> {
        let name = self.action_name(action);
        self.calls.push(RuntimeCall::QueryBoolean {
            action: name.clone(),
        });
        if self.failing_queries.contains(&name) {
            return Err(codes::runtime_failure());
        }

        let entry = self.actions.get(action.0).ok_or_else(codes::handle_invalid)?;
        if entry.action_type != ActionType::Boolean {
            return Err(codes::action_type_mismatch());
        }

        Ok(BooleanState {
            current_state: entry.synced,
            changed_since_last_sync: entry.changed,
            is_active: self.running,
        })
    }
}

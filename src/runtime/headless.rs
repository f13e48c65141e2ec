//! OpenXR-backed runtime using a headless session.
//!
//! Instance, system and session creation happen once in [`OpenXrRuntime::open`]; any
//! failure there is fatal. Afterwards the runtime only mints handles into its own
//! arenas of typed OpenXR objects.

use crate::binding::{ActionName, ActionSetName, LocalizedActionName, LocalizedActionSetName};
use crate::config::ActionType;
use crate::error::{Result, ResultCode, XrBindError};
use crate::runtime::{
    ActionHandle, ActionSetHandle, ActiveActionSet, BooleanState, PathId, RuntimeEvent,
    RuntimeResult, SuggestedBinding, XrRuntime,
};
use crate::session::SessionState;
use log::{debug, info};
use openxr as xr;

const HEADLESS_EXTENSION_NAME: &str = "XR_MND_headless";

// Only OpenXR 1.0 core entry points are called.
const OPENXR_API_VERSION: xr::Version = xr::Version::new(1, 0, 0);

/// Parameters for opening the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub application_name: String,
    /// Extensions requested by the configuration, enabled alongside the headless one
    pub extensions: Vec<String>,
}

/// Action created with its concrete OpenXR value type.
enum TypedAction {
    Boolean(xr::Action<bool>),
    Float(xr::Action<f32>),
    Vector2f(xr::Action<xr::Vector2f>),
    Pose(xr::Action<xr::Posef>),
    Vibration(xr::Action<xr::Haptic>),
}

impl TypedAction {
    fn binding(&self, path: xr::Path) -> xr::Binding<'_> {
        match self {
            TypedAction::Boolean(action) => xr::Binding::new(action, path),
            TypedAction::Float(action) => xr::Binding::new(action, path),
            TypedAction::Vector2f(action) => xr::Binding::new(action, path),
            TypedAction::Pose(action) => xr::Binding::new(action, path),
            TypedAction::Vibration(action) => xr::Binding::new(action, path),
        }
    }
}

/// [`XrRuntime`] over a live OpenXR instance and headless session.
pub struct OpenXrRuntime {
    instance: xr::Instance,
    session: xr::Session<xr::Headless>,
    // Held for the session lifetime; headless sessions never submit frames.
    _frame_waiter: xr::FrameWaiter,
    _frame_stream: xr::FrameStream<xr::Headless>,
    action_sets: Vec<xr::ActionSet>,
    actions: Vec<TypedAction>,
    event_buffer: xr::EventDataBuffer,
}

impl OpenXrRuntime {
    /// Load the OpenXR loader and create instance, system and headless session
    pub fn open(options: &RuntimeOptions) -> Result<Self> {
        // SAFETY: the loader library is trusted; its entry points are only called through
        // the instance created below and never outlive `entry`.
        let entry = unsafe { xr::Entry::load(&()) }
            .map_err(|e| XrBindError::runtime("load_loader", e.to_string()))?;

        let available = entry
            .enumerate_extensions()
            .map_err(|e| XrBindError::runtime("enumerate_extensions", e.to_string()))?;
        if !available.mnd_headless {
            return Err(XrBindError::runtime(
                "enumerate_extensions",
                format!("{HEADLESS_EXTENSION_NAME} not available"),
            ));
        }

        let mut extensions = xr::ExtensionSet::default();
        extensions.mnd_headless = true;
        extensions.other = extension_names(&options.extensions)?;

        let app_info = xr::ApplicationInfo {
            application_name: &options.application_name,
            application_version: 1,
            engine_name: "",
            engine_version: 1,
            api_version: OPENXR_API_VERSION,
        };
        let instance = entry
            .create_instance(&app_info, &extensions, &[], &())
            .map_err(|e| XrBindError::runtime("create_instance", e.to_string()))?;

        if let Ok(properties) = instance.properties() {
            info!(
                "Runtime name: {}, version: {}.{}.{}",
                properties.runtime_name,
                properties.runtime_version.major(),
                properties.runtime_version.minor(),
                properties.runtime_version.patch()
            );
        }

        let system = instance
            .system(xr::FormFactor::HEAD_MOUNTED_DISPLAY)
            .map_err(|e| XrBindError::runtime("get_system", e.to_string()))?;

        // SAFETY: headless sessions take no graphics binding, so there are no external
        // handles whose validity we would have to guarantee.
        let (session, frame_waiter, frame_stream) = unsafe {
            instance
                .create_session::<xr::Headless>(system, &xr::headless::SessionCreateInfo {})
                .map_err(|e| XrBindError::runtime("create_session", e.to_string()))?
        };

        Ok(Self {
            instance,
            session,
            _frame_waiter: frame_waiter,
            _frame_stream: frame_stream,
            action_sets: Vec::new(),
            actions: Vec::new(),
            event_buffer: xr::EventDataBuffer::new(),
        })
    }

    fn action_set(&self, handle: ActionSetHandle) -> RuntimeResult<&xr::ActionSet> {
        self.action_sets
            .get(handle.0)
            .ok_or_else(|| to_code(xr::sys::Result::ERROR_HANDLE_INVALID))
    }

    fn action(&self, handle: ActionHandle) -> RuntimeResult<&TypedAction> {
        self.actions
            .get(handle.0)
            .ok_or_else(|| to_code(xr::sys::Result::ERROR_HANDLE_INVALID))
    }
}

/// NUL-terminated names for configured extensions, minus the always-enabled headless one
fn extension_names(names: &[String]) -> Result<Vec<Vec<u8>>> {
    names
        .iter()
        .filter(|name| name.as_str() != HEADLESS_EXTENSION_NAME)
        .map(|name| {
            if name.is_empty() || name.contains('\0') {
                return Err(XrBindError::configuration(format!(
                    "invalid extension name '{}'",
                    name.escape_default()
                )));
            }
            let mut bytes = name.clone().into_bytes();
            bytes.push(0);
            Ok(bytes)
        })
        .collect()
}

/// Runtime code named the way the OpenXR headers spell it, e.g. `XR_ERROR_SESSION_LOST`
fn to_code(result: xr::sys::Result) -> ResultCode {
    ResultCode::new(result.into_raw(), format!("XR_{result:?}"))
}

fn to_session_state(state: xr::SessionState) -> SessionState {
    match state {
        xr::SessionState::UNKNOWN => SessionState::Unknown,
        xr::SessionState::IDLE => SessionState::Idle,
        xr::SessionState::READY => SessionState::Ready,
        xr::SessionState::SYNCHRONIZED => SessionState::Synchronized,
        xr::SessionState::VISIBLE => SessionState::Visible,
        xr::SessionState::FOCUSED => SessionState::Focused,
        xr::SessionState::STOPPING => SessionState::Stopping,
        xr::SessionState::LOSS_PENDING => SessionState::LossPending,
        xr::SessionState::EXITING => SessionState::Exiting,
        other => SessionState::Unrecognized(other.into_raw()),
    }
}

impl XrRuntime for OpenXrRuntime {
    fn string_to_path(&mut self, path: &str) -> RuntimeResult<PathId> {
        self.instance
            .string_to_path(path)
            .map(|p| PathId(p.into_raw()))
            .map_err(to_code)
    }

    fn create_action_set(
        &mut self,
        name: &ActionSetName,
        localized_name: &LocalizedActionSetName,
        priority: u32,
    ) -> RuntimeResult<ActionSetHandle> {
        let set = self
            .instance
            .create_action_set(name.as_str(), localized_name.as_str(), priority)
            .map_err(to_code)?;
        self.action_sets.push(set);
        Ok(ActionSetHandle(self.action_sets.len() - 1))
    }

    fn create_action(
        &mut self,
        set: ActionSetHandle,
        name: &ActionName,
        localized_name: &LocalizedActionName,
        action_type: ActionType,
        subaction_paths: &[PathId],
    ) -> RuntimeResult<ActionHandle> {
        let paths: Vec<xr::Path> = subaction_paths
            .iter()
            .map(|p| xr::Path::from_raw(p.0))
            .collect();
        let owner = self.action_set(set)?;
        let (name, localized) = (name.as_str(), localized_name.as_str());

        let action = match action_type {
            ActionType::Boolean => TypedAction::Boolean(
                owner
                    .create_action::<bool>(name, localized, &paths)
                    .map_err(to_code)?,
            ),
            ActionType::Float => TypedAction::Float(
                owner
                    .create_action::<f32>(name, localized, &paths)
                    .map_err(to_code)?,
            ),
            ActionType::Vector2f => TypedAction::Vector2f(
                owner
                    .create_action::<xr::Vector2f>(name, localized, &paths)
                    .map_err(to_code)?,
            ),
            ActionType::Pose => TypedAction::Pose(
                owner
                    .create_action::<xr::Posef>(name, localized, &paths)
                    .map_err(to_code)?,
            ),
            ActionType::Vibration => TypedAction::Vibration(
                owner
                    .create_action::<xr::Haptic>(name, localized, &paths)
                    .map_err(to_code)?,
            ),
        };

        self.actions.push(action);
        Ok(ActionHandle(self.actions.len() - 1))
    }

    fn suggest_bindings(
        &mut self,
        interaction_profile: PathId,
        bindings: &[SuggestedBinding],
    ) -> RuntimeResult<()> {
        let mut suggested = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let action = self.action(binding.action)?;
            suggested.push(action.binding(xr::Path::from_raw(binding.binding.0)));
        }

        self.instance
            .suggest_interaction_profile_bindings(
                xr::Path::from_raw(interaction_profile.0),
                &suggested,
            )
            .map_err(to_code)
    }

    fn attach_action_sets(&mut self, sets: &[ActionSetHandle]) -> RuntimeResult<()> {
        let mut attach = Vec::with_capacity(sets.len());
        for handle in sets {
            attach.push(self.action_set(*handle)?);
        }
        self.session.attach_action_sets(&attach).map_err(to_code)
    }

    fn begin_session(&mut self) -> RuntimeResult<()> {
        self.session
            .begin(xr::ViewConfigurationType::PRIMARY_MONO)
            .map(|_| ())
            .map_err(to_code)
    }

    fn poll_event(&mut self) -> RuntimeResult<Option<RuntimeEvent>> {
        let event = self
            .instance
            .poll_event(&mut self.event_buffer)
            .map_err(to_code)?;

        Ok(event.map(|event| match event {
            xr::Event::SessionStateChanged(changed) => {
                RuntimeEvent::SessionStateChanged(to_session_state(changed.state()))
            }
            _ => {
                debug!("Ignoring runtime event");
                RuntimeEvent::Other
            }
        }))
    }

    fn sync_actions(&mut self, active: &[ActiveActionSet]) -> RuntimeResult<()> {
        let mut sets = Vec::with_capacity(active.len());
        for entry in active {
            let set = self.action_set(entry.set)?;
            sets.push(match entry.subaction_path {
                Some(path) => xr::ActiveActionSet::with_subaction(set, xr::Path::from_raw(path.0)),
                None => xr::ActiveActionSet::new(set),
            });
        }
        self.session.sync_actions(&sets).map_err(to_code)
    }

    fn boolean_state(
        &mut self,
        action: ActionHandle,
        subaction_path: Option<PathId>,
    ) -> RuntimeResult<BooleanState> {
        let TypedAction::Boolean(action) = self.action(action)? else {
            return Err(to_code(xr::sys::Result::ERROR_ACTION_TYPE_MISMATCH));
        };
        let path = subaction_path.map_or(xr::Path::NULL, |p| xr::Path::from_raw(p.0));
        let state = action.state(&self.session, path).map_err(to_code)?;

        Ok(BooleanState {
            current_state: state.current_state,
            changed_since_last_sync: state.changed_since_last_sync,
            is_active: state.is_active,
        })
    }
}

//! Builds runtime action sets, actions and suggested bindings from descriptors.

use crate::binding::name::{ActionName, ActionSetName, LocalizedActionName, LocalizedActionSetName};
use crate::binding::table::BindingTable;
use crate::config::{ActionDescriptor, ActionSetDescriptor, ActionType, BindingConfig};
use crate::error::{Result, XrBindError};
use crate::runtime::{ActionHandle, ActionSetHandle, ActiveActionSet, PathId, XrRuntime};
use log::{debug, info};

/// Created action paired with what the query loop needs to read and report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    /// Display name (the action's localized name)
    pub name: String,
    pub action_type: ActionType,
    pub action_set: ActionSetHandle,
    pub action: ActionHandle,
}

/// Runtime objects produced by a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionModel {
    /// One per action-set descriptor, in configuration order
    pub action_sets: Vec<ActionSetHandle>,
    /// Parallel to `action_sets`; every set active with no sub-device restriction
    pub active_sets: Vec<ActiveActionSet>,
    pub action_infos: Vec<ActionInfo>,
    /// Number of interaction profiles whose bindings were submitted
    pub submitted_profiles: usize,
}

/// Incremental builder for an [`ActionModel`].
///
/// Action sets and actions are created as they are added; suggested bindings are
/// collected per interaction profile and submitted once by [`finish`](Self::finish).
/// Any error aborts the build and leaves already-created runtime objects in place.
pub struct BindingModelBuilder<'r, R: XrRuntime + ?Sized> {
    runtime: &'r mut R,
    table: BindingTable,
    model: ActionModel,
}

impl<'r, R: XrRuntime + ?Sized> BindingModelBuilder<'r, R> {
    pub fn new(runtime: &'r mut R) -> Self {
        Self {
            runtime,
            table: BindingTable::new(),
            model: ActionModel::default(),
        }
    }

    /// Build the full model for `config` and submit its bindings
    pub fn build(runtime: &'r mut R, config: &BindingConfig) -> Result<ActionModel> {
        let mut builder = Self::new(runtime);
        for set in &config.action_sets {
            builder.add_action_set(set)?;
        }
        builder.finish()
    }

    /// Create the action set and all of its actions
    pub fn add_action_set(&mut self, descriptor: &ActionSetDescriptor) -> Result<ActionSetHandle> {
        let name = ActionSetName::new(&descriptor.action_set_name);
        let localized = LocalizedActionSetName::new(&descriptor.localized_action_set_name);

        let set = self
            .runtime
            .create_action_set(&name, &localized, descriptor.priority)
            .map_err(|code| XrBindError::rejected("create_action_set", name.as_str(), code))?;
        debug!(
            "Created action set '{}' (priority {})",
            name, descriptor.priority
        );

        self.model.action_sets.push(set);
        self.model.active_sets.push(ActiveActionSet::unrestricted(set));

        for action in &descriptor.actions {
            self.add_action(set, action)?;
        }
        Ok(set)
    }

    fn add_action(
        &mut self,
        set: ActionSetHandle,
        descriptor: &ActionDescriptor,
    ) -> Result<ActionHandle> {
        let subaction_paths = descriptor
            .subaction_paths
            .iter()
            .map(|path| self.resolve("subaction", path))
            .collect::<Result<Vec<_>>>()?;

        let name = ActionName::new(&descriptor.action_name);
        let localized = LocalizedActionName::new(&descriptor.localized_action_name);
        let action = self
            .runtime
            .create_action(set, &name, &localized, descriptor.action_type, &subaction_paths)
            .map_err(|code| XrBindError::rejected("create_action", name.as_str(), code))?;
        debug!(
            "Created {} action '{}' with {} subaction path(s)",
            descriptor.action_type,
            name,
            subaction_paths.len()
        );

        self.model.action_infos.push(ActionInfo {
            name: descriptor.localized_action_name.clone(),
            action_type: descriptor.action_type,
            action_set: set,
            action,
        });

        for (profile, paths) in &descriptor.suggested_bindings {
            let slot = match self.table.slot(profile) {
                Some(slot) => slot,
                None => {
                    let profile_path = self.resolve("interaction profile", profile)?;
                    self.table.register(profile, profile_path)
                }
            };
            for path in paths {
                let binding = self.resolve("binding", path)?;
                self.table.push(slot, action, binding);
            }
        }
        Ok(action)
    }

    fn resolve(&mut self, role: &'static str, path: &str) -> Result<PathId> {
        self.runtime
            .string_to_path(path)
            .map_err(|code| XrBindError::path_resolution(role, path, code))
    }

    /// Submit every non-empty profile's bindings and return the finished model.
    ///
    /// Every path was resolved while adding actions, so only runtime rejections of a
    /// profile's bindings can fail here.
    pub fn finish(self) -> Result<ActionModel> {
        let Self {
            runtime,
            table,
            mut model,
        } = self;

        let pairs = table.len();
        model.submitted_profiles = table.submit(runtime)?;
        info!(
            "Built {} action set(s), {} action(s), {} binding(s) across {} profile(s)",
            model.action_sets.len(),
            model.action_infos.len(),
            pairs,
            model.submitted_profiles
        );
        Ok(model)
    }
}

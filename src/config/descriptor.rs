//! Action and action-set descriptors.
//!
//! Field names follow the on-disk JSON document:
//!
//! ```json
//! {
//!   "extensions": [],
//!   "actionSets": [{
//!     "actionSetName": "gameplay",
//!     "localizedActionSetName": "Gameplay",
//!     "priority": 0,
//!     "actions": [{
//!       "actionName": "jump",
//!       "localizedActionName": "Jump",
//!       "actionType": "boolean",
//!       "subactionPaths": [],
//!       "suggestedBindings": {
//!         "/interaction_profiles/khr/simple_controller": ["/user/hand/right/input/select/click"]
//!       }
//!     }]
//!   }]
//! }
//! ```

use crate::error::{Result, XrBindError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Value type of an action.
///
/// Deserializes from a symbolic name or from the runtime's numeric action-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawActionType")]
pub enum ActionType {
    Boolean,
    /// Scalar in `[0, 1]` or `[-1, 1]`
    Float,
    Vector2f,
    Pose,
    /// Haptic output; created and bound but never queried
    Vibration,
}

impl ActionType {
    /// Numeric code the runtime uses for this type
    pub fn code(self) -> u32 {
        match self {
            ActionType::Boolean => 1,
            ActionType::Float => 2,
            ActionType::Vector2f => 3,
            ActionType::Pose => 4,
            ActionType::Vibration => 100,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ActionType::Boolean),
            2 => Some(ActionType::Float),
            3 => Some(ActionType::Vector2f),
            4 => Some(ActionType::Pose),
            100 => Some(ActionType::Vibration),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" | "boolean_input" => Some(ActionType::Boolean),
            "float" | "scalar" | "float_input" => Some(ActionType::Float),
            "vector2f" | "vector2" | "vector2f_input" => Some(ActionType::Vector2f),
            "pose" | "pose_input" => Some(ActionType::Pose),
            "vibration" | "haptic" | "vibration_output" => Some(ActionType::Vibration),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::Boolean => "boolean",
            ActionType::Float => "float",
            ActionType::Vector2f => "vector2f",
            ActionType::Pose => "pose",
            ActionType::Vibration => "vibration",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawActionType {
    Code(u32),
    Name(String),
}

impl TryFrom<RawActionType> for ActionType {
    type Error = String;

    fn try_from(raw: RawActionType) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawActionType::Code(code) => ActionType::from_code(code)
                .ok_or_else(|| format!("unknown action type code {code}")),
            RawActionType::Name(name) => {
                ActionType::from_name(&name).ok_or_else(|| format!("unknown action type '{name}'"))
            }
        }
    }
}

/// One action inside an action set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub action_name: String,
    pub localized_action_name: String,
    pub action_type: ActionType,
    /// Empty means the action applies to every sub-device
    #[serde(default)]
    pub subaction_paths: Vec<String>,
    /// Interaction profile → binding paths, in a deterministic (sorted) order
    #[serde(default)]
    pub suggested_bindings: BTreeMap<String, Vec<String>>,
}

/// A named, prioritized group of actions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSetDescriptor {
    pub action_set_name: String,
    pub localized_action_set_name: String,
    /// Higher wins when bindings conflict
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
}

/// Complete declarative input configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingConfig {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub action_sets: Vec<ActionSetDescriptor>,
}

impl BindingConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| XrBindError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: BindingConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints the runtime does not enforce on its own.
    ///
    /// Action-set names must be unique across the configuration. Everything else
    /// (name syntax, duplicate action names within a set) is left to the runtime.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for set in &self.action_sets {
            if !seen.insert(set.action_set_name.as_str()) {
                return Err(XrBindError::configuration(format!(
                    "duplicate action set name '{}'",
                    set.action_set_name
                )));
            }
        }
        Ok(())
    }

    /// Total number of actions across all sets
    pub fn action_count(&self) -> usize {
        self.action_sets.iter().map(|set| set.actions.len()).sum()
    }
}

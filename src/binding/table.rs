//! Per-interaction-profile suggested bindings.

use crate::error::{Result, XrBindError};
use crate::runtime::{ActionHandle, PathId, SuggestedBinding, XrRuntime};
use log::debug;
use std::collections::HashMap;

/// Position of a registered profile inside a [`BindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSlot(usize);

#[derive(Debug)]
struct ProfileEntry {
    name: String,
    path: PathId,
    bindings: Vec<SuggestedBinding>,
}

/// Suggested bindings accumulated per interaction profile.
///
/// Profiles are registered with their already-resolved path and keep the order in
/// which they were first seen, so submissions are deterministic from run to run.
#[derive(Debug, Default)]
pub struct BindingTable {
    profiles: Vec<ProfileEntry>,
    index: HashMap<String, usize>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of a profile registered earlier
    pub fn slot(&self, profile: &str) -> Option<ProfileSlot> {
        self.index.get(profile).copied().map(ProfileSlot)
    }

    /// Register `profile` under `path`; an already known profile keeps its slot and path
    pub fn register(&mut self, profile: &str, path: PathId) -> ProfileSlot {
        if let Some(slot) = self.slot(profile) {
            return slot;
        }
        self.profiles.push(ProfileEntry {
            name: profile.to_string(),
            path,
            bindings: Vec::new(),
        });
        let slot = self.profiles.len() - 1;
        self.index.insert(profile.to_string(), slot);
        ProfileSlot(slot)
    }

    pub fn push(&mut self, slot: ProfileSlot, action: ActionHandle, binding: PathId) {
        self.profiles[slot.0]
            .bindings
            .push(SuggestedBinding { action, binding });
    }

    /// Profiles in first-seen order, including empty ones
    pub fn profiles(&self) -> impl Iterator<Item = (&str, &[SuggestedBinding])> {
        self.profiles
            .iter()
            .map(|entry| (entry.name.as_str(), entry.bindings.as_slice()))
    }

    pub fn bindings(&self, profile: &str) -> Option<&[SuggestedBinding]> {
        self.slot(profile)
            .map(|slot| self.profiles[slot.0].bindings.as_slice())
    }

    /// Total number of (action, path) pairs across all profiles
    pub fn len(&self) -> usize {
        self.profiles.iter().map(|entry| entry.bindings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Submit one suggestion call per non-empty profile, consuming the table.
    ///
    /// Returns the number of submissions made. The first rejection aborts; profiles
    /// already submitted stay submitted.
    pub fn submit<R: XrRuntime + ?Sized>(self, runtime: &mut R) -> Result<usize> {
        let mut submitted = 0;
        for entry in self.profiles {
            if entry.bindings.is_empty() {
                debug!("Skipping interaction profile {} with no bindings", entry.name);
                continue;
            }

            runtime
                .suggest_bindings(entry.path, &entry.bindings)
                .map_err(|code| XrBindError::BindingRejected {
                    profile: entry.name.clone(),
                    code,
                })?;

            debug!(
                "Suggested {} binding(s) for {}",
                entry.bindings.len(),
                entry.name
            );
            submitted += 1;
        }
        Ok(submitted)
    }
}

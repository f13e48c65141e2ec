//! Application orchestration layer
//!
//! Wires configuration, runtime, binding builder and sync loop together. Setup runs
//! once and any failure is fatal; afterwards the loop owns all state.

use crate::binding::BindingModelBuilder;
use crate::config::{BindingConfig, Settings};
use crate::error::Result;
use crate::runtime::{OpenXrRuntime, RuntimeCall, RuntimeOptions, ScriptedRuntime, XrRuntime};
use crate::sync::{ConsoleSink, InputLoop, LoopStatus, ReportSink};
use log::info;
use std::fmt;

/// Counts produced by an offline configuration check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub action_sets: usize,
    pub actions: usize,
    pub profiles: usize,
    pub bindings: usize,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} action set(s), {} action(s), {} binding(s) across {} interaction profile(s)",
            self.action_sets, self.actions, self.bindings, self.profiles
        )
    }
}

/// Build the binding model against `runtime` and wrap both in an input loop
pub fn build_input_loop<R: XrRuntime, S: ReportSink>(
    mut runtime: R,
    config: &BindingConfig,
    sink: S,
    settings: &Settings,
) -> Result<InputLoop<R, S>> {
    let model = BindingModelBuilder::build(&mut runtime, config)?;
    Ok(InputLoop::new(runtime, model, sink).with_interval(settings.tick_interval))
}

/// Application orchestrator
pub struct Application {
    settings: Settings,
    config: BindingConfig,
}

impl Application {
    /// Load the binding configuration named by `settings`
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let config = BindingConfig::load(&settings.config_path)?;
        info!(
            "Loaded {} action set(s) from {}",
            config.action_sets.len(),
            settings.config_path.display()
        );
        Ok(Self::with_config(settings, config))
    }

    pub fn with_config(settings: Settings, config: BindingConfig) -> Self {
        Self { settings, config }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Build the configuration against the offline runtime without touching a device
    pub fn check(&self) -> Result<CheckSummary> {
        let mut runtime = ScriptedRuntime::new();
        let model = BindingModelBuilder::build(&mut runtime, &self.config)?;

        let bindings = runtime
            .calls()
            .iter()
            .map(|call| match call {
                RuntimeCall::SuggestBindings { bindings, .. } => bindings.len(),
                _ => 0,
            })
            .sum::<usize>();

        Ok(CheckSummary {
            action_sets: model.action_sets.len(),
            actions: model.action_infos.len(),
            profiles: model.submitted_profiles,
            bindings,
        })
    }

    /// Open the OpenXR runtime and run until the session exits
    pub async fn run(&self) -> Result<LoopStatus> {
        let runtime = OpenXrRuntime::open(&RuntimeOptions {
            application_name: self.settings.application_name.clone(),
            extensions: self.config.extensions.clone(),
        })?;

        let mut input_loop =
            build_input_loop(runtime, &self.config, ConsoleSink::stdout(), &self.settings)?;
        let status = input_loop
            .run(|status| status.session_state.is_terminal())
            .await?;

        info!("Session exited after {} tick(s)", status.ticks);
        Ok(status)
    }
}

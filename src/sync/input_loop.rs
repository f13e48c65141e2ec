//! Tick-based synchronization and query loop.
//!
//! Each tick drains pending runtime events into the [`SessionController`], then, once
//! the session has been focused, synchronizes all action sets and reads every action.
//! Everything runs on one thread; the only suspension point is the sleep between
//! ticks in [`InputLoop::run`].

use crate::binding::{ActionInfo, ActionModel};
use crate::config::ActionType;
use crate::error::{Result, XrBindError};
use crate::runtime::XrRuntime;
use crate::session::{SessionController, SessionState};
use crate::sync::report::{ActionReading, ActionValue, ReportSink, TickReport};
use log::{debug, warn};
use std::time::Duration;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Input not active yet; no sync was issued
    Inactive,
    Synced(TickReport),
}

/// Snapshot handed to the termination condition after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStatus {
    pub ticks: u64,
    pub session_state: SessionState,
    pub input_active: bool,
    pub synced: bool,
}

/// Single-threaded driver for lifecycle events and action queries.
pub struct InputLoop<R: XrRuntime, S: ReportSink> {
    runtime: R,
    model: ActionModel,
    controller: SessionController,
    sink: S,
    interval: Duration,
    ticks: u64,
}

impl<R: XrRuntime, S: ReportSink> InputLoop<R, S> {
    pub fn new(runtime: R, model: ActionModel, sink: S) -> Self {
        let controller = SessionController::new(model.action_sets.clone());
        Self {
            runtime,
            model,
            controller,
            sink,
            interval: crate::config::settings::DEFAULT_TICK_INTERVAL,
            ticks: 0,
        }
    }

    /// Delay applied after every tick in [`run`](Self::run)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Feed every pending event to the controller in delivery order.
    ///
    /// Returns the number of events processed; zero pending events is a no-op.
    pub fn drain_events(&mut self) -> Result<usize> {
        let mut processed = 0;
        while let Some(event) = self
            .runtime
            .poll_event()
            .map_err(|code| XrBindError::runtime("poll_event", code.to_string()))?
        {
            self.controller.handle_event(&mut self.runtime, event)?;
            processed += 1;
        }
        if processed > 0 {
            debug!("Processed {} runtime event(s)", processed);
        }
        Ok(processed)
    }

    /// Run one tick: drain events, then sync and query if input is active
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.ticks += 1;
        self.drain_events()?;

        if !self.controller.input_active() {
            return Ok(TickOutcome::Inactive);
        }

        self.runtime
            .sync_actions(&self.model.active_sets)
            .map_err(|code| XrBindError::SyncFailed { code })?;

        let mut report = TickReport::new(self.ticks);
        for info in &self.model.action_infos {
            query_action(&mut self.runtime, info, &mut report)?;
        }

        self.sink.emit(&report)?;
        Ok(TickOutcome::Synced(report))
    }

    /// Tick until `stop` returns true, sleeping the configured interval after each tick.
    ///
    /// Any fatal error ends the loop and is returned; `stop` is the only other exit.
    pub async fn run<F>(&mut self, mut stop: F) -> Result<LoopStatus>
    where
        F: FnMut(&LoopStatus) -> bool,
    {
        loop {
            let outcome = self.tick()?;
            let status = self.status(matches!(outcome, TickOutcome::Synced(_)));
            if stop(&status) {
                return Ok(status);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    fn status(&self, synced: bool) -> LoopStatus {
        LoopStatus {
            ticks: self.ticks,
            session_state: self.controller.state(),
            input_active: self.controller.input_active(),
            synced,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn model(&self) -> &ActionModel {
        &self.model
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Mutable access to the runtime, e.g. to script events between ticks
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Consume the loop and hand back its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn query_action<R: XrRuntime>(
    runtime: &mut R,
    info: &ActionInfo,
    report: &mut TickReport,
) -> Result<()> {
    match info.action_type {
        ActionType::Boolean => {
            let state = runtime
                .boolean_state(info.action, None)
                .map_err(|code| XrBindError::QueryFailed {
                    action: info.name.clone(),
                    code,
                })?;
            report.readings.push(ActionReading {
                name: info.name.clone(),
                value: ActionValue::Boolean(state.current_state),
                changed_since_last_sync: state.changed_since_last_sync,
            });
        }
        other => {
            warn!("Unsupported action type {} for '{}'", other, info.name);
            report.skipped.push(info.name.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingModelBuilder;
    use crate::config::BindingConfig;
    use crate::runtime::scripted::{codes, RuntimeCall, ScriptedRuntime};
    use crate::sync::RecordingSink;

    const CONFIG: &str = r#"{
        "actionSets": [{
            "actionSetName": "gameplay",
            "localizedActionSetName": "Gameplay",
            "actions": [
                {
                    "actionName": "jump",
                    "localizedActionName": "Jump",
                    "actionType": "boolean",
                    "suggestedBindings": {
                        "/interaction_profiles/khr/simple_controller": ["/user/hand/right/input/select/click"]
                    }
                },
                {
                    "actionName": "aim",
                    "localizedActionName": "Aim",
                    "actionType": "pose"
                },
                {
                    "actionName": "fire",
                    "localizedActionName": "Fire",
                    "actionType": 1
                }
            ]
        }]
    }"#;

    fn input_loop() -> InputLoop<ScriptedRuntime, RecordingSink> {
        let config = BindingConfig::from_json_str(CONFIG).unwrap();
        let mut runtime = ScriptedRuntime::new();
        let model = BindingModelBuilder::build(&mut runtime, &config).unwrap();
        InputLoop::new(runtime, model, RecordingSink::new()).with_interval(Duration::ZERO)
    }

    fn focus(input_loop: &mut InputLoop<ScriptedRuntime, RecordingSink>) {
        let runtime = input_loop.runtime_mut();
        for state in [
            SessionState::Idle,
            SessionState::Ready,
            SessionState::Synchronized,
            SessionState::Visible,
            SessionState::Focused,
        ] {
            runtime.push_state(state);
        }
    }

    fn sync_count(runtime: &ScriptedRuntime) -> usize {
        runtime.count_calls(|c| matches!(c, RuntimeCall::SyncActions { .. }))
    }

    #[test]
    fn no_sync_before_focus() {
        let mut input_loop = input_loop();
        input_loop.runtime_mut().push_state(SessionState::Idle);
        input_loop.runtime_mut().push_state(SessionState::Ready);
        input_loop.runtime_mut().push_state(SessionState::Visible);

        for _ in 0..3 {
            assert_eq!(input_loop.tick().unwrap(), TickOutcome::Inactive);
        }
        assert_eq!(sync_count(input_loop.runtime()), 0);
        assert!(input_loop.sink().reports.is_empty());
        assert!(input_loop.controller().is_running());
    }

    #[test]
    fn focused_tick_syncs_and_reads_every_boolean() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);
        assert!(input_loop.runtime_mut().set_boolean("jump", true));

        let report = match input_loop.tick().unwrap() {
            TickOutcome::Synced(report) => report,
            other => panic!("expected a synced tick, got {other:?}"),
        };
        assert_eq!(report.tick, 1);
        assert_eq!(report.boolean("Jump"), Some(true));
        assert_eq!(report.boolean("Fire"), Some(false));
        assert_eq!(sync_count(input_loop.runtime()), 1);
        assert_eq!(input_loop.sink().reports.len(), 1);
    }

    #[test]
    fn value_changes_are_visible_on_following_ticks() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);

        input_loop.runtime_mut().set_boolean("jump", true);
        input_loop.tick().unwrap();
        input_loop.runtime_mut().set_boolean("jump", false);
        input_loop.tick().unwrap();
        input_loop.tick().unwrap();

        let reports = &input_loop.sink().reports;
        let jump: Vec<_> = reports
            .iter()
            .map(|r| {
                let reading = r.readings.iter().find(|x| x.name == "Jump").unwrap();
                (reading.value, reading.changed_since_last_sync)
            })
            .collect();
        assert_eq!(
            jump,
            vec![
                (ActionValue::Boolean(true), true),
                (ActionValue::Boolean(false), true),
                (ActionValue::Boolean(false), false),
            ]
        );
    }

    #[test]
    fn unsupported_types_are_skipped_every_tick() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);

        for _ in 0..3 {
            input_loop.tick().unwrap();
        }
        for report in &input_loop.sink().reports {
            assert_eq!(report.skipped, vec!["Aim".to_string()]);
            assert_eq!(report.readings.len(), 2);
        }
        // the pose action is never queried
        let aim_queries = input_loop.runtime().count_calls(|c| {
            matches!(c, RuntimeCall::QueryBoolean { action } if action == "aim")
        });
        assert_eq!(aim_queries, 0);
    }

    #[test]
    fn draining_an_empty_queue_is_a_no_op() {
        let mut input_loop = input_loop();
        assert_eq!(input_loop.drain_events().unwrap(), 0);
        assert_eq!(input_loop.drain_events().unwrap(), 0);
        assert_eq!(input_loop.controller().state(), SessionState::Unknown);

        focus(&mut input_loop);
        assert_eq!(input_loop.drain_events().unwrap(), 5);
        assert_eq!(input_loop.runtime().pending_events(), 0);
        assert_eq!(input_loop.drain_events().unwrap(), 0);
    }

    #[test]
    fn sync_failure_is_fatal() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);
        input_loop.runtime_mut().fail_sync(true);

        match input_loop.tick() {
            Err(XrBindError::SyncFailed { code }) => assert_eq!(code, codes::session_lost()),
            other => panic!("expected SyncFailed, got {other:?}"),
        }
        assert!(input_loop.sink().reports.is_empty());
    }

    #[test]
    fn query_failure_names_the_action() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);
        input_loop.runtime_mut().fail_query("fire");

        match input_loop.tick() {
            Err(XrBindError::QueryFailed { action, .. }) => assert_eq!(action, "Fire"),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_stops_when_the_condition_holds() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);
        input_loop.runtime_mut().push_state(SessionState::Stopping);
        input_loop.runtime_mut().push_state(SessionState::Exiting);

        let status = input_loop
            .run(|status| status.session_state == SessionState::Exiting)
            .await
            .unwrap();
        assert_eq!(status.ticks, 1);
        assert_eq!(status.session_state, SessionState::Exiting);
        assert!(status.input_active);
    }

    #[tokio::test]
    async fn run_counts_ticks_until_stopped() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);

        let status = input_loop.run(|status| status.ticks == 4).await.unwrap();
        assert!(status.synced);
        assert_eq!(input_loop.ticks(), 4);
        assert_eq!(input_loop.sink().reports.len(), 4);
    }

    #[tokio::test]
    async fn run_returns_fatal_errors() {
        let mut input_loop = input_loop();
        focus(&mut input_loop);
        input_loop.runtime_mut().fail_sync(true);

        let err = input_loop.run(|_| false).await.unwrap_err();
        assert!(matches!(err, XrBindError::SyncFailed { .. }));
    }
}

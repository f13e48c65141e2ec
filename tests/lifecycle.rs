use std::io::Write;
use std::time::Duration;

use xrbind::app::{build_input_loop, Application};
use xrbind::config::{BindingConfig, Settings};
use xrbind::runtime::{RuntimeCall, ScriptedRuntime};
use xrbind::sync::{ConsoleSink, RecordingSink, TickOutcome};
use xrbind::{SessionState, XrBindError};

const CONFIG: &str = r#"{
    "actionSets": [
        {
            "actionSetName": "gameplay",
            "localizedActionSetName": "Gameplay",
            "priority": 1,
            "actions": [
                {
                    "actionName": "jump",
                    "localizedActionName": "Jump",
                    "actionType": "boolean",
                    "subactionPaths": ["/user/hand/left", "/user/hand/right"],
                    "suggestedBindings": {
                        "/interaction_profiles/khr/simple_controller": [
                            "/user/hand/left/input/select/click",
                            "/user/hand/right/input/select/click"
                        ],
                        "/interaction_profiles/valve/index_controller": [
                            "/user/hand/right/input/a/click"
                        ]
                    }
                },
                {
                    "actionName": "grip",
                    "localizedActionName": "Grip",
                    "actionType": "float",
                    "suggestedBindings": {
                        "/interaction_profiles/valve/index_controller": [
                            "/user/hand/right/input/squeeze/value"
                        ]
                    }
                }
            ]
        },
        {
            "actionSetName": "menu",
            "localizedActionSetName": "Menu",
            "actions": [
                {
                    "actionName": "open_menu",
                    "localizedActionName": "Open Menu",
                    "actionType": 1,
                    "suggestedBindings": {
                        "/interaction_profiles/khr/simple_controller": [
                            "/user/hand/left/input/menu/click"
                        ]
                    }
                }
            ]
        }
    ]
}"#;

fn settings() -> Settings {
    Settings {
        tick_interval: Duration::ZERO,
        ..Settings::default()
    }
}

fn config() -> BindingConfig {
    BindingConfig::from_json_str(CONFIG).expect("sample config parses")
}

#[test]
fn full_session_reports_after_focus() {
    let mut input_loop =
        build_input_loop(ScriptedRuntime::new(), &config(), RecordingSink::new(), &settings())
            .expect("build succeeds");

    assert_eq!(input_loop.model().action_sets.len(), 2);
    assert_eq!(input_loop.model().action_infos.len(), 3);
    assert_eq!(input_loop.model().submitted_profiles, 2);

    // nothing happens until the runtime says so
    assert_eq!(input_loop.tick().unwrap(), TickOutcome::Inactive);
    assert!(!input_loop.runtime().is_attached());

    let runtime = input_loop.runtime_mut();
    runtime.push_state(SessionState::Idle);
    runtime.push_state(SessionState::Ready);
    assert_eq!(input_loop.tick().unwrap(), TickOutcome::Inactive);
    assert!(input_loop.runtime().is_attached());
    assert!(input_loop.runtime().is_running());

    let runtime = input_loop.runtime_mut();
    runtime.push_state(SessionState::Synchronized);
    runtime.push_state(SessionState::Visible);
    runtime.push_state(SessionState::Focused);
    runtime.set_boolean("open_menu", true);

    let report = match input_loop.tick().unwrap() {
        TickOutcome::Synced(report) => report,
        other => panic!("expected a synced tick, got {other:?}"),
    };
    assert_eq!(report.boolean("Jump"), Some(false));
    assert_eq!(report.boolean("Open Menu"), Some(true));
    assert_eq!(report.skipped, vec!["Grip".to_string()]);

    let syncs: Vec<_> = input_loop
        .runtime()
        .calls()
        .iter()
        .filter_map(|call| match call {
            RuntimeCall::SyncActions { sets } => Some(sets.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(syncs, vec![vec!["gameplay".to_string(), "menu".to_string()]]);
}

#[test]
fn calls_follow_the_openxr_ordering() {
    let mut input_loop =
        build_input_loop(ScriptedRuntime::new(), &config(), RecordingSink::new(), &settings())
            .unwrap();
    for state in [
        SessionState::Ready,
        SessionState::Synchronized,
        SessionState::Visible,
        SessionState::Focused,
    ] {
        input_loop.runtime_mut().push_state(state);
    }
    input_loop.tick().unwrap();

    let calls = input_loop.runtime().calls();
    let position = |pred: &dyn Fn(&RuntimeCall) -> bool| calls.iter().position(pred).unwrap();
    let last_create = calls
        .iter()
        .rposition(|c| matches!(c, RuntimeCall::CreateAction { .. }))
        .unwrap();
    let first_suggest = position(&|c| matches!(c, RuntimeCall::SuggestBindings { .. }));
    let attach = position(&|c| matches!(c, RuntimeCall::AttachActionSets { .. }));
    let begin = position(&|c| matches!(c, RuntimeCall::BeginSession));
    let sync = position(&|c| matches!(c, RuntimeCall::SyncActions { .. }));

    assert!(last_create < first_suggest);
    assert!(first_suggest < attach);
    assert!(attach < begin);
    assert!(begin < sync);
}

#[test]
fn lost_session_ends_the_loop_with_sync_failure() {
    let mut input_loop =
        build_input_loop(ScriptedRuntime::new(), &config(), RecordingSink::new(), &settings())
            .unwrap();
    for state in [SessionState::Ready, SessionState::Focused] {
        input_loop.runtime_mut().push_state(state);
    }
    input_loop.tick().unwrap();

    input_loop.runtime_mut().push_state(SessionState::LossPending);
    input_loop.runtime_mut().fail_sync(true);
    let err = input_loop.tick().unwrap_err();
    assert!(matches!(err, XrBindError::SyncFailed { .. }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn console_output_for_a_focused_session() {
    let mut input_loop = build_input_loop(
        ScriptedRuntime::new(),
        &config(),
        ConsoleSink::new(Vec::new()),
        &settings(),
    )
    .unwrap();
    for state in [
        SessionState::Ready,
        SessionState::Focused,
        SessionState::Stopping,
        SessionState::Exiting,
    ] {
        input_loop.runtime_mut().push_state(state);
    }
    input_loop.runtime_mut().set_boolean("jump", true);

    let status = input_loop
        .run(|status| status.session_state == SessionState::Exiting)
        .await
        .unwrap();
    assert_eq!(status.ticks, 1);

    let output = String::from_utf8(input_loop.into_sink().into_inner()).unwrap();
    assert_eq!(output, "Jump: true\nOpen Menu: false\n=====\n");
}

#[test]
fn application_check_reads_a_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(CONFIG.as_bytes()).expect("write config");

    let settings = Settings {
        config_path: file.path().to_path_buf(),
        ..settings()
    };
    let app = Application::new(settings).expect("config loads");
    let summary = app.check().expect("config checks out");

    assert_eq!(summary.action_sets, 2);
    assert_eq!(summary.actions, 3);
    assert_eq!(summary.profiles, 2);
    assert_eq!(summary.bindings, 5);
}

#[test]
fn application_check_reports_bad_paths() {
    let text = CONFIG.replace("/user/hand/left/input/menu/click", "user/hand/left/menu");
    let app = Application::with_config(settings(), BindingConfig::from_json_str(&text).unwrap());

    match app.check() {
        Err(XrBindError::PathResolution { path, .. }) => {
            assert_eq!(path, "user/hand/left/menu")
        }
        other => panic!("expected PathResolution, got {other:?}"),
    }
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let settings = Settings {
        config_path: dir.path().join("missing.json"),
        ..settings()
    };
    assert!(matches!(
        Application::new(settings),
        Err(XrBindError::ConfigFile { .. })
    ));
}

mod support;

use clawboot::shared::{BootLog, Env};
use clawboot::sidecar::{ensure_sidecars, plan_sidecars, BridgeKind, ReadinessState};
use serde_json::Value;
use std::fs;
use support::{temp_paths, AlwaysReady, NeverReady, RecordingProcesses};
use tempfile::tempdir;

fn google_env() -> Env {
    Env::from_pairs([
        ("GOOGLE_OAUTH_CLIENT_ID", "client-id"),
        ("GOOGLE_OAUTH_CLIENT_SECRET", "client-secret"),
        ("GOOGLE_REFRESH_TOKEN_PERSONAL", "refresh-personal"),
        ("GOOGLE_REFRESH_TOKEN_SHARED", "refresh-shared"),
        ("NOTION_API_KEY", "secret_notion"),
    ])
}

#[test]
fn notion_only_plans_one_bridge() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let env = Env::from_pairs([("NOTION_API_KEY", "secret_notion")]);

    let specs = plan_sidecars(&env, &settings, &paths).expect("plan");
    assert_eq!(specs.len(), 1);
    let notion = &specs[0];
    assert_eq!(notion.kind, BridgeKind::Notion);
    assert_eq!(notion.listen_port, 8001);
    assert_eq!(notion.required_env, &["NOTION_API_KEY"]);
    let headers: Value =
        serde_json::from_str(&notion.launch.env["OPENAPI_MCP_HEADERS"]).expect("headers json");
    assert_eq!(headers["Authorization"], "Bearer secret_notion");
    assert_eq!(headers["Notion-Version"], "2022-06-28");
}

#[test]
fn google_plan_covers_present_account_slots_only() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());

    let specs = plan_sidecars(&google_env(), &settings, &paths).expect("plan");
    let google = specs
        .iter()
        .find(|spec| spec.kind == BridgeKind::GoogleWorkspace)
        .expect("google spec");
    let names: Vec<String> = google
        .credential_files
        .iter()
        .map(|file| file.path.file_name().expect("name").to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["personal.json", "shared.json", "accounts.json"]);

    let index: Value =
        serde_json::from_slice(&google.credential_files[2].contents).expect("index json");
    assert_eq!(index["default"], "personal");
    assert_eq!(index["accounts"].as_array().expect("accounts").len(), 2);
    assert_eq!(index["accounts"][1]["name"], "shared");

    let personal: Value =
        serde_json::from_slice(&google.credential_files[0].contents).expect("credential json");
    assert_eq!(personal["refresh_token"], "refresh-personal");
    assert_eq!(personal["client_id"], "client-id");
}

#[test]
fn secrets_travel_in_env_never_in_args() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let env = google_env();

    for spec in plan_sidecars(&env, &settings, &paths).expect("plan") {
        let rendered = format!("{} {:?}", spec.launch.display_form(), spec);
        for secret in [
            "client-secret",
            "refresh-personal",
            "refresh-shared",
            "secret_notion",
        ] {
            assert!(!rendered.contains(secret), "{} leaks {secret}", spec.name);
        }
    }
}

#[test]
fn ensure_sidecars_kills_stale_bridges_and_writes_owner_only_credentials() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let mut processes =
        RecordingProcesses::new().with_running("node /usr/bin/supergateway --port 8001");

    let startup = ensure_sidecars(
        &google_env(),
        &settings,
        &paths,
        &mut processes,
        &AlwaysReady,
        &BootLog::disabled(),
    )
    .expect("sidecars");

    assert_eq!(startup.stale_killed, 1);
    assert_eq!(processes.events[0], "kill:supergateway");
    assert_eq!(startup.launched.len(), 2);
    assert_eq!(startup.ready_count(), 2);
    assert_eq!(startup.launched[0].name, "google-workspace");
    assert_eq!(startup.launched[1].port, 8001);

    let credential = paths
        .sidecar_dir("google-workspace")
        .join("credentials/personal.json");
    assert!(credential.is_file());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&credential).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
    assert_eq!(
        processes.spawned[0].log_file.as_deref(),
        Some(paths.sidecar_log_file("google-workspace").as_path())
    );
}

#[test]
fn launch_failures_and_dead_bridges_are_not_fatal() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let env = Env::from_pairs([("NOTION_API_KEY", "n")]);

    let mut failing = RecordingProcesses::new();
    failing.spawn_fails = true;
    let startup = ensure_sidecars(
        &env,
        &settings,
        &paths,
        &mut failing,
        &AlwaysReady,
        &BootLog::disabled(),
    )
    .expect("launch failure absorbed");
    assert!(startup.launched.is_empty());
    assert!(startup.readiness.is_empty());

    let mut dead = RecordingProcesses::new();
    dead.dead_pids.insert(4_001);
    let startup = ensure_sidecars(
        &env,
        &settings,
        &paths,
        &mut dead,
        &NeverReady,
        &BootLog::disabled(),
    )
    .expect("dead bridge absorbed");
    assert_eq!(startup.readiness[0].state, ReadinessState::Exited);
}

#[test]
fn unready_bridge_times_out_with_last_error() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let mut processes = RecordingProcesses::new();

    let startup = ensure_sidecars(
        &Env::from_pairs([("NOTION_API_KEY", "n")]),
        &settings,
        &paths,
        &mut processes,
        &NeverReady,
        &BootLog::disabled(),
    )
    .expect("sidecars");
    assert_eq!(
        startup.readiness[0].state,
        ReadinessState::TimedOut {
            last_error: "connection refused".to_string()
        }
    );
}

#[test]
fn no_prerequisites_means_no_launches() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let mut processes = RecordingProcesses::new();

    let startup = ensure_sidecars(
        &Env::from_pairs([("GOOGLE_OAUTH_CLIENT_ID", "only-id")]),
        &settings,
        &paths,
        &mut processes,
        &AlwaysReady,
        &BootLog::disabled(),
    )
    .expect("sidecars");
    assert!(startup.launched.is_empty());
    assert!(processes.spawned.is_empty());
    assert_eq!(processes.killed, vec!["supergateway".to_string()]);
}

#[test]
fn dropped_account_slot_loses_its_credential_file() {
    let dir = tempdir().expect("tempdir");
    let (settings, paths) = temp_paths(dir.path());
    let credentials = paths.sidecar_dir("google-workspace").join("credentials");

    let mut processes = RecordingProcesses::new();
    ensure_sidecars(
        &google_env(),
        &settings,
        &paths,
        &mut processes,
        &AlwaysReady,
        &BootLog::disabled(),
    )
    .expect("first run");
    assert!(credentials.join("shared.json").is_file());

    let without_shared = Env::from_pairs([
        ("GOOGLE_OAUTH_CLIENT_ID", "client-id"),
        ("GOOGLE_OAUTH_CLIENT_SECRET", "client-secret"),
        ("GOOGLE_REFRESH_TOKEN_PERSONAL", "refresh-personal"),
    ]);
    let mut processes = RecordingProcesses::new();
    ensure_sidecars(
        &without_shared,
        &settings,
        &paths,
        &mut processes,
        &AlwaysReady,
        &BootLog::disabled(),
    )
    .expect("second run");

    assert!(credentials.join("personal.json").is_file());
    assert!(!credentials.join("shared.json").exists());
    let index: Value = serde_json::from_str(
        &fs::read_to_string(paths.sidecar_dir("google-workspace").join("accounts.json"))
            .expect("index"),
    )
    .expect("parse index");
    assert_eq!(index["accounts"].as_array().map(Vec::len), Some(1));
}

// ABOUTME: End-to-end deployments through the bundle factory and executor.
// ABOUTME: Real files and zip archives; service control and hooks are faked.

mod support;

use hoppla_deployer::bundle::{BundleFactory, execute};
use hoppla_deployer::config::GlobalPaths;
use hoppla_deployer::control::RunState;
use hoppla_deployer::hooks::ProcessHost;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use support::{FakeControl, FixedClock, ScriptedHost, package, write_zip};
use tempfile::TempDir;

const SERVICE_YAML: &str = r#"
deployment_type: WindowsService
target_environment: Staging
target_path: TARGET
settings:
  WindowsServiceName: Worker
"#;

fn service_yaml(target: &std::path::Path) -> String {
    SERVICE_YAML.replace("TARGET", &format!("'{}'", target.display()))
}

/// Answers every connection with `status` until the listener is dropped.
fn serve_status(status: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response =
                format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/")
}

#[test]
fn windows_service_is_deployed_end_to_end() {
    support::init_tracing();
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();

    let target = root.path().join("worker");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("old.dll"), "old").unwrap();

    let archive = paths.monitored_delivery.join("Release.Worker.20240115.zip");
    write_zip(
        &archive,
        &[
            ("Worker.exe", "binary"),
            ("Staging.config", "staging"),
            ("Production.config", "production"),
        ],
    );

    let config = package(root.path(), &archive, &service_yaml(&target));
    let control = FakeControl::with(&["Worker"]);
    let hooks = Arc::new(
        ScriptedHost::returning("After", "Warmed cache")
            .and("ReleaseNotes", "+ Faster startup\n* Fixed crash on empty queue"),
    );

    let bundle = BundleFactory::new(control.clone(), hooks.clone())
        .clock(FixedClock::arc())
        .build(&config)
        .unwrap();
    let result = execute(bundle);

    assert!(result.success(), "{:?}", result.failure());
    assert_eq!(result.results.len(), 9);
    assert_eq!(control.calls(), vec!["stop Worker", "start Worker"]);
    assert_eq!(control.state_of("Worker"), Some(RunState::Started));

    // Target holds exactly the new release with its promoted config.
    assert!(!target.join("old.dll").exists());
    assert!(target.join("Worker.exe").exists());
    assert_eq!(
        fs::read_to_string(target.join("Worker.exe.config")).unwrap(),
        "staging"
    );
    assert!(!target.join("Staging.config").exists());
    assert!(!target.join("Production.config").exists());

    // Previous release backed up, delivered archive moved to history.
    assert!(
        paths
            .release_backup
            .join("Worker before deploy 2024-01-15 09_30_05.zip")
            .exists()
    );
    assert!(!archive.exists());
    assert!(
        paths
            .release_history
            .join("Release.Worker.20240115_093005.zip")
            .exists()
    );

    // Hooks ran against the dated hook type and reported back.
    assert_eq!(
        hooks.calls(),
        vec![
            "Worker.Deployments.Deployment_20240115.After",
            "Worker.Deployments.Deployment_20240115.ReleaseNotes",
        ]
    );
    let after = &result.results[7];
    assert_eq!(after.action_name, "After deployment hook");
    assert_eq!(after.information.as_deref(), Some("Warmed cache"));

    let notes: Vec<_> = result.release_notes().collect();
    assert_eq!(notes.len(), 1);
    let html = notes[0].information.as_deref().unwrap();
    assert!(html.contains("<li>Faster startup</li>"));
    assert!(html.contains("<li>Fixed crash on empty queue</li>"));
}

#[test]
fn service_that_does_not_start_stops_the_bundle() {
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();
    let target = root.path().join("worker");

    let archive = paths.monitored_delivery.join("Release.Worker.20240115.zip");
    write_zip(&archive, &[("Worker.exe", "binary"), ("Staging.config", "s")]);

    let config = package(root.path(), &archive, &service_yaml(&target));
    let control = FakeControl::with(&["Worker"]);
    control.never_starts("Worker");
    let hooks = Arc::new(ScriptedHost::default());

    let bundle = BundleFactory::new(control.clone(), hooks.clone())
        .build(&config)
        .unwrap();
    let result = execute(bundle);

    assert!(!result.success());
    let failure = result.failure().unwrap();
    assert_eq!(failure.action_name, "Start windows service");
    assert_eq!(result.results.len(), 7);
    assert!(result.results[..6].iter().all(|r| r.success));
    assert!(hooks.calls().is_empty(), "hooks must not run after a failure");
}

#[test]
fn site_is_deployed_and_verified() {
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();
    let target = root.path().join("shop");

    let archive = paths.monitored_delivery.join("Release.Shop.20240115.zip");
    write_zip(
        &archive,
        &[
            ("index.html", "<html/>"),
            ("bin/Shop.dll", "binary"),
            ("Production.config", "<configuration/>"),
        ],
    );

    let uri = serve_status("401 Unauthorized");
    let yaml = format!(
        "deployment_type: IISSite\ntarget_environment: Production\ntarget_path: '{}'\nsettings:\n  IISSiteName: Shop\n  VerifyHttpResponseUri: '{}'\n",
        target.display(),
        uri
    );
    let config = package(root.path(), &archive, &yaml);
    let control = FakeControl::with(&["Shop"]);

    let bundle = BundleFactory::new(control.clone(), Arc::new(ScriptedHost::default()))
        .http_timeout(Duration::from_secs(5))
        .build(&config)
        .unwrap();
    let result = execute(bundle);

    assert!(result.success(), "{:?}", result.failure());
    assert_eq!(
        fs::read_to_string(target.join("Web.config")).unwrap(),
        "<configuration/>"
    );
    assert!(target.join("bin").join("Shop.dll").exists());

    let hook = result.results.last().unwrap();
    assert_eq!(hook.action_name, "Release notes");
    assert_eq!(hook.information.as_deref(), Some("No actions to run."));
    assert!(!hook.is_release_note);
}

#[test]
fn site_library_without_hooks_deploys_through_process_host() {
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();
    let target = root.path().join("shop");

    let archive = paths.monitored_delivery.join("Release.Shop.20240115.zip");
    write_zip(
        &archive,
        &[
            ("bin/Shop.dll", "MZ\u{90}library-without-hooks"),
            ("Production.config", "<configuration/>"),
        ],
    );

    let uri = serve_status("401 Unauthorized");
    let yaml = format!(
        "deployment_type: IISSite\ntarget_environment: Production\ntarget_path: '{}'\nsettings:\n  IISSiteName: Shop\n  VerifyHttpResponseUri: '{}'\n",
        target.display(),
        uri
    );
    let config = package(root.path(), &archive, &yaml);

    let bundle = BundleFactory::new(
        FakeControl::with(&["Shop"]),
        Arc::new(ProcessHost::new(Duration::from_secs(10))),
    )
    .http_timeout(Duration::from_secs(5))
    .build(&config)
    .unwrap();
    let result = execute(bundle);

    assert!(result.success(), "{:?}", result.failure());
    for hook in &result.results[8..] {
        assert_eq!(hook.information.as_deref(), Some("No actions to run."));
    }
}

#[test]
fn unexpected_status_fails_verification() {
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();
    let target = root.path().join("shop");

    let archive = paths.monitored_delivery.join("Release.Shop.20240115.zip");
    write_zip(&archive, &[("Production.config", "<configuration/>")]);

    let uri = serve_status("500 Internal Server Error");
    let yaml = format!(
        "deployment_type: IISSite\ntarget_environment: Production\ntarget_path: '{}'\nsettings:\n  IISSiteName: Shop\n  VerifyHttpResponseUri: '{}'\n",
        target.display(),
        uri
    );
    let config = package(root.path(), &archive, &yaml);

    let bundle = BundleFactory::new(
        FakeControl::with(&["Shop"]),
        Arc::new(ScriptedHost::default()),
    )
    .http_timeout(Duration::from_secs(5))
    .build(&config)
    .unwrap();
    let result = execute(bundle);

    let failure = result.failure().unwrap();
    assert_eq!(failure.action_name, "Verify http response");
    let message = failure.fault.as_ref().unwrap().to_string();
    assert!(
        message.contains("expected status code 401, received 500"),
        "{message}"
    );
    assert_eq!(result.results.len(), 8);
}

#[test]
fn dry_run_reports_without_touching_the_host() {
    let root = TempDir::new().unwrap();
    let paths = GlobalPaths::under(root.path());
    paths.bootstrap().unwrap();
    let target = root.path().join("worker");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("old.dll"), "old").unwrap();

    let archive = paths.monitored_delivery.join("Release.Worker.20240115.zip");
    write_zip(&archive, &[("Worker.exe", "binary")]);

    let config = package(root.path(), &archive, &service_yaml(&target));
    let control = FakeControl::with(&["Worker"]);
    let hooks = Arc::new(ScriptedHost::default());

    let bundle = BundleFactory::new(control.clone(), hooks.clone())
        .dry_run(true)
        .build(&config)
        .unwrap();
    let names = bundle.action_names();
    let result = execute(bundle);

    assert!(result.success());
    assert_eq!(result.results.len(), names.len());
    assert_eq!(result.results[0].action_name, "Stop windows service");
    assert!(control.calls().is_empty());
    assert!(hooks.calls().is_empty());
    assert!(target.join("old.dll").exists());
    assert!(archive.exists());
}

#![cfg(unix)]

use std::fs;
use std::time::{Duration, Instant};

use exlaunch_config::{EnvKey, LaunchConfig};
use exlaunch_process::{SpawnError, spawn_detached};
use exlaunch_test_support::fixtures::StubServer;
use exlaunch_test_support::wait::wait_for_contents;
use serial_test::serial;

const LOG_TIMEOUT: Duration = Duration::from_secs(10);

fn config_for(stub: &StubServer) -> LaunchConfig {
    let mut config = LaunchConfig::default();
    config.launcher.executable = stub.executable().to_path_buf();
    config.launcher.log_file = stub.log_file().to_path_buf();
    config
}

#[test]
#[serial]
fn child_sees_every_configured_key_and_inherited_path() -> anyhow::Result<()> {
    let stub = StubServer::env_dumper()?;
    let mut config = config_for(&stub);
    config.server.set(EnvKey::Coin, "Qtum");
    config.server.set(EnvKey::ReportHost, "electrum.example.org");
    config
        .extra
        .insert("MAX_SESSIONS".to_string(), "1000".to_string());

    let launched = spawn_detached(&config)?;
    assert!(launched.pid() > 0);
    let mut child = launched.into_child();
    child.wait()?;

    let log = wait_for_contents(stub.log_file(), LOG_TIMEOUT, |text| {
        text.contains("stub-finished")
    })?;
    let lines: Vec<&str> = log.lines().collect();
    for (name, value) in config.child_env() {
        let expected = format!("{name}={value}");
        assert!(lines.contains(&expected.as_str()), "missing {expected}");
    }
    assert!(lines.contains(&"COIN=Qtum"));
    assert!(lines.contains(&"HOST="));
    assert!(lines.contains(&"MAX_SESSIONS=1000"));

    if let Ok(path) = std::env::var("PATH") {
        let expected = format!("PATH={path}");
        assert!(lines.contains(&expected.as_str()), "PATH was not inherited");
    }
    Ok(())
}

#[test]
#[serial]
fn output_is_appended_after_existing_log_content() -> anyhow::Result<()> {
    let stub = StubServer::echo("second run")?;
    let config = config_for(&stub);
    let parent = stub
        .log_file()
        .parent()
        .ok_or_else(|| anyhow::anyhow!("log file has no parent"))?;
    fs::create_dir_all(parent)?;
    fs::write(stub.log_file(), "first run\npartial line without newline")?;

    let mut child = spawn_detached(&config)?.into_child();
    child.wait()?;

    let log = wait_for_contents(stub.log_file(), LOG_TIMEOUT, |text| {
        text.contains("second run") && text.contains("err:second run")
    })?;
    assert!(log.starts_with("first run\npartial line without newline"));
    Ok(())
}

#[test]
#[serial]
fn spawn_returns_without_waiting_for_the_child() -> anyhow::Result<()> {
    let stub = StubServer::sleeper(30)?;
    let config = config_for(&stub);

    let started = Instant::now();
    let launched = spawn_detached(&config)?;
    let elapsed = started.elapsed();

    let mut child = launched.into_child();
    assert!(child.try_wait()?.is_none(), "stand-in exited early");
    child.kill()?;
    child.wait()?;
    assert!(elapsed < Duration::from_secs(1), "spawn took {elapsed:?}");
    Ok(())
}

#[test]
#[serial]
fn child_runs_in_its_own_process_group_with_null_stdin() -> anyhow::Result<()> {
    use nix::unistd::{Pid, getpgid, getpgrp};

    let stub = StubServer::sleeper(30)?;
    let config = config_for(&stub);

    let launched = spawn_detached(&config)?;
    let pid = Pid::from_raw(i32::try_from(launched.pid())?);
    let child_group = getpgid(Some(pid));
    #[cfg(target_os = "linux")]
    let stdin = fs::read_link(format!("/proc/{pid}/fd/0"));

    let mut child = launched.into_child();
    child.kill()?;
    child.wait()?;

    let child_group = child_group?;
    assert_eq!(child_group, pid, "child should lead a new process group");
    assert_ne!(child_group, getpgrp());
    #[cfg(target_os = "linux")]
    assert_eq!(stdin?, std::path::PathBuf::from("/dev/null"));
    Ok(())
}

#[test]
#[serial]
fn missing_executable_is_reported() -> anyhow::Result<()> {
    let stub = StubServer::new("true")?;
    let mut config = config_for(&stub);
    config.launcher.executable = stub.missing_path();

    let started = Instant::now();
    let err = spawn_detached(&config).unwrap_err();
    assert!(matches!(err, SpawnError::NotFound { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[test]
#[serial]
fn non_executable_file_is_reported() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let stub = StubServer::new("true")?;
    fs::set_permissions(stub.executable(), fs::Permissions::from_mode(0o644))?;
    let config = config_for(&stub);

    let err = spawn_detached(&config).unwrap_err();
    assert!(matches!(err, SpawnError::PermissionDenied { .. }), "{err:?}");
    Ok(())
}

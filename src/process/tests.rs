use super::handoff::wrapper_command;
use super::*;
use crate::event::{EventChannel, Notification};
use crate::ipc::IpcEndpoint;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "vilark_process_{name}_{}_{}",
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn args_of(command: &std::process::Command) -> Vec<String> {
    command
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn wrapper_resets_tty_then_execs_editor_with_target() {
    let command = wrapper_command(
        Path::new("/bin/sh"),
        "stty sane",
        Path::new("/usr/bin/vim"),
        &["-p".to_string()],
        "/work/src/main.rs",
    );
    assert_eq!(command.get_program(), OsStr::new("/bin/sh"));
    assert_eq!(
        args_of(&command),
        vec![
            "-c",
            "stty sane ; exec \"$@\"",
            "vilark-exec",
            "/usr/bin/vim",
            "-p",
            "/work/src/main.rs",
        ]
    );
}

#[test]
fn wrapper_strips_ipc_url_from_environment() {
    let command = wrapper_command(
        Path::new("/bin/sh"),
        "stty sane",
        Path::new("/usr/bin/vim"),
        &[],
        "x",
    );
    let removed: Vec<_> = command
        .get_envs()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key.to_os_string())
        .collect();
    assert_eq!(removed, vec![OsString::from("VILARK_IPC_URL")]);
}

#[test]
fn find_in_path_skips_non_executables() {
    let dir = scratch_dir("path");
    let plain = dir.join("plain");
    fs::write(&plain, "x").unwrap();
    assert_eq!(find_in_path("plain", dir.as_os_str()), None);
    assert!(find_in_path("sh", OsStr::new("/nonexistent:/bin:/usr/bin")).is_some());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn replace_without_editor_reports_no_editor() {
    let mut handoff = ProcessHandoff::new(None, "stty sane".into(), None);
    assert!(matches!(handoff.replace("x"), HandoffError::NoEditor));
}

#[test]
fn replace_with_missing_program_fails_before_exec() {
    let mut handoff = ProcessHandoff::new(
        Some(vec!["/nonexistent/editor".to_string()]),
        "stty sane".into(),
        None,
    );
    match handoff.replace("x") {
        HandoffError::NotFound(program) => assert_eq!(program, "/nonexistent/editor"),
        other => panic!("unexpected {other:?}"),
    }

    let mut handoff = ProcessHandoff::new(Some(vec!["vim".to_string()]), "stty sane".into(), None)
        .with_path_var(Some(OsString::from("/nonexistent")));
    let err = handoff.replace("x");
    assert_eq!(err.to_string(), "can't find vim in $PATH");
}

#[test]
fn replace_command_resolves_program_through_path() {
    let handoff = ProcessHandoff::new(
        Some(vec!["sh".to_string(), "-e".to_string()]),
        "true".into(),
        None,
    )
    .with_path_var(Some(OsString::from("/bin:/usr/bin")));
    let command = handoff.replace_command("/tmp/file").unwrap();
    let args = args_of(&command);
    assert_eq!(args[1], "true ; exec \"$@\"");
    assert!(args[3].ends_with("/sh"));
    assert_eq!(&args[4..], ["-e", "/tmp/file"]);
}

#[test]
fn spawned_child_sees_ipc_url_and_exit_is_posted() {
    let dir = scratch_dir("spawn");
    let out = dir.join("url.txt");
    let endpoint = IpcEndpoint::new("/tmp/vilark.sock.test");
    let mut handoff = ProcessHandoff::new(
        Some(vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf %s \"$VILARK_IPC_URL\" > \"$0\"".to_string(),
        ]),
        "stty sane".into(),
        Some(endpoint),
    );
    let notes: EventChannel<Notification> = EventChannel::new();
    handoff
        .spawn_and_wait(out.to_str().unwrap(), notes.sender())
        .unwrap();

    let note = notes
        .wait_handle()
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    assert_eq!(note, Notification::ChildExited);
    assert_eq!(fs::read_to_string(&out).unwrap(), "/tmp/vilark.sock.test");
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn spawn_of_missing_program_is_an_error() {
    let mut handoff = ProcessHandoff::new(
        Some(vec!["/nonexistent/editor".to_string()]),
        "stty sane".into(),
        None,
    );
    let notes: EventChannel<Notification> = EventChannel::new();
    assert!(matches!(
        handoff.spawn_and_wait("x", notes.sender()),
        Err(HandoffError::Spawn { .. })
    ));
    assert!(notes.is_empty());
}

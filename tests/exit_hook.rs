// ==============================================
// TEARDOWN FROM THE C RUNTIME'S EXIT HOOK (integration, no harness)
//
// Re-runs this binary as a child that uses singletons on its main thread
// and returns from main, so every teardown runs inside `atexit` after the
// main thread's thread-locals are gone. Drops append to a log file because
// nothing else survives the child.
// ==============================================
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

use policy_singleton::creation::CreateUsingBox;
use policy_singleton::lifetime::{DefaultLifetime, Phoenix};
use policy_singleton::threading::ClassLevelLockable;
use policy_singleton::{Singleton, singleton};

const CHILD: &str = "POLICY_SINGLETON_EXIT_LOG";

static LOG: OnceLock<PathBuf> = OnceLock::new();

fn record(line: &str) {
    let Some(path) = LOG.get() else { return };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    writeln!(file, "{line}").unwrap();
}

#[derive(Default)]
struct Settings;

impl Drop for Settings {
    fn drop(&mut self) {
        record("settings");
    }
}

#[derive(Default)]
struct Journal;

impl Drop for Journal {
    fn drop(&mut self) {
        record("journal");
    }
}

/// Recreates the journal after it was torn down.
#[derive(Default)]
struct Flusher;

impl Drop for Flusher {
    fn drop(&mut self) {
        Ledger::instance();
        record("flusher");
    }
}

singleton! {
    struct AppSettings: Settings;
    struct Flush: Flusher = (CreateUsingBox, DefaultLifetime, ClassLevelLockable);
    struct Ledger: Journal = (CreateUsingBox, Phoenix, ClassLevelLockable);
}

fn child(path: PathBuf) {
    LOG.set(path).unwrap();
    AppSettings::instance();
    Flush::instance();
    // newest first at exit: the journal goes, then the flusher brings it back
    Ledger::instance();
}

fn main() {
    if let Some(path) = std::env::var_os(CHILD) {
        child(PathBuf::from(path));
        return;
    }

    let log = std::env::temp_dir().join(format!("policy_singleton_exit_{}.log", std::process::id()));
    let _ = std::fs::remove_file(&log);
    let output = Command::new(std::env::current_exe().unwrap())
        .env(CHILD, &log)
        .output()
        .unwrap();
    let recorded = std::fs::read_to_string(&log).unwrap_or_default();
    let _ = std::fs::remove_file(&log);

    assert!(
        output.status.success(),
        "child exited with {:?}\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let lines: Vec<&str> = recorded.lines().collect();
    assert_eq!(lines, ["journal", "flusher", "journal", "settings"]);
}

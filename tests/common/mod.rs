#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use nofomo_dashboard::prelude::*;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_nofomo") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "nofomo.exe" } else { "nofomo" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve nofomo binary path for integration test"),
    }
}

/// Run the binary with an isolated HOME and logging disabled.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_input(case_name, args, "")
}

/// Like [`run_cli_case`], feeding `input` on stdin.
pub fn run_cli_case_with_input(case_name: &str, args: &[&str], input: &str) -> CmdResult {
    run_cli_case_with_bytes(case_name, args, input.as_bytes())
}

/// Like [`run_cli_case_with_input`] for raw, possibly non-UTF-8, stdin.
pub fn run_cli_case_with_bytes(case_name: &str, args: &[&str], input: &[u8]) -> CmdResult {
    let root = std::env::temp_dir().join("nofomo-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");
    let home = tempfile::tempdir().expect("create isolated home");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut child = Command::new(&bin_path)
        .args(args)
        .env("HOME", home.path())
        .env("NOFOMO_LOGGING_ENABLED", "false")
        .env("NOFOMO_TIMING_FETCH_LATENCY_MS", "20")
        .env("NOFOMO_TIMING_REPLY_DELAY_MS", "40")
        .env("RUST_BACKTRACE", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("execute nofomo command");
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input).expect("write stdin");
    }
    let output = child.wait_with_output().expect("wait for nofomo");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Fresh unmounted runtime over the built-in fixtures.
pub fn runtime() -> DashboardRuntime {
    DashboardRuntime::new(DashboardModel::new(MockDataService::default()))
}

/// Runtime over a custom fixture source.
pub fn runtime_with_source(source: Box<dyn FixtureSource>) -> DashboardRuntime {
    DashboardRuntime::new(DashboardModel::new(MockDataService::new(source)))
}

/// Mounted runtime with every fixture resolved.
pub fn ready_runtime() -> DashboardRuntime {
    let mut rt = runtime();
    rt.mount();
    rt.run_until_idle();
    assert_eq!(rt.model().load_state(), LoadState::Ready);
    rt
}

/// Render the current view without color.
pub fn render_text(rt: &DashboardRuntime) -> String {
    let mut surface = TextSurface::new();
    rt.render(&mut surface);
    surface.into_string()
}

/// Source that fails one key and serves the rest from the static fixtures.
#[derive(Debug)]
pub struct FailingKey(pub &'static str);

impl FixtureSource for FailingKey {
    fn produce(&self, key: &str, params: &QueryParams) -> Result<Payload> {
        if key == self.0 {
            return Err(NofomoError::Fixture {
                key: key.to_string(),
                details: "simulated outage".to_string(),
            });
        }
        StaticFixtures.produce(key, params)
    }
}

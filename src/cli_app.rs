//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use serde_json::json;
use thiserror::Error;

use nofomo_dashboard::core::config::Config;
use nofomo_dashboard::core::errors::NofomoError;
use nofomo_dashboard::dashboard::sentiment::TierColor;
use nofomo_dashboard::dashboard::surface::{Surface, TextSurface};
use nofomo_dashboard::dashboard::{DashboardMsg, DashboardRuntime, LoadState, Tab, UserType};
use nofomo_dashboard::data::records::ChatRole;
use nofomo_dashboard::data::service::MockDataService;
use nofomo_dashboard::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
use nofomo_dashboard::logger::jsonl::JsonlConfig;

/// NOFOMO: financial dashboard with sentiment, opportunities, and an advisor.
#[derive(Debug, Parser)]
#[command(
    name = "nofomo",
    author,
    version,
    about = "NOFOMO - financial dashboard in the terminal",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Write the activity log to this file (enables logging).
    #[arg(long, global = true, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Interactive dashboard session reading commands from stdin.
    Session(ViewArgs),
    /// Load the dashboard once and print a tab.
    Show(ShowArgs),
    /// Ask the advisor a single question.
    Ask(AskArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ViewArgs {
    /// Starting tab (name or 1-5).
    #[arg(long, value_name = "TAB")]
    tab: Option<Tab>,
    /// Audience: individual, advisor, investor-relations.
    #[arg(long, value_name = "TYPE")]
    user_type: Option<UserType>,
}

#[derive(Debug, Clone, Args, Default)]
struct ShowArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Select an opportunity by symbol before rendering.
    #[arg(long, value_name = "SYMBOL")]
    search: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct AskArgs {
    /// Question text.
    #[arg(required = true, num_args = 1.., value_name = "TEXT")]
    text: Vec<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Emit JSON instead of TOML.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Library error with a stable code.
    #[error(transparent)]
    Core(#[from] NofomoError),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) | Self::Core(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Session(args) => run_session(cli, args),
        Command::Show(args) => run_show(cli, args),
        Command::Ask(args) => run_ask(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── shared setup ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.log {
        config.paths.jsonl_log.clone_from(path);
        config.logging.enabled = true;
    }
    Ok(config)
}

fn start_logger(config: &Config) -> Result<Option<ActivityLoggerHandle>, CliError> {
    if !config.logging.enabled {
        return Ok(None);
    }
    Ok(Some(spawn_logger(JsonlConfig::from_config(config))?))
}

/// Build an unmounted runtime with CLI view overrides applied.
fn build_runtime(
    config: &Config,
    view: &ViewArgs,
    logger: Option<&ActivityLoggerHandle>,
) -> DashboardRuntime {
    let mut config = config.clone();
    if let Some(tab) = view.tab {
        config.view.start_tab = tab;
    }
    if let Some(user_type) = view.user_type {
        config.view.user_type = user_type;
    }
    let runtime = DashboardRuntime::from_config(&config, MockDataService::default());
    match logger {
        Some(handle) => runtime.with_logger(handle.clone()),
        None => runtime,
    }
}

fn record_start(runtime: &mut DashboardRuntime, config: &Config) -> Result<(), CliError> {
    runtime.record(ActivityEvent::SessionStarted {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: config.stable_hash()?,
    });
    Ok(())
}

fn finish(
    mut runtime: DashboardRuntime,
    logger: Option<ActivityLoggerHandle>,
    reason: &str,
    started: Instant,
) {
    runtime.unmount();
    runtime.record(ActivityEvent::SessionStopped {
        reason: reason.to_string(),
        uptime_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    });
    if let Some(logger) = logger {
        logger.shutdown();
    }
}

fn paint_badge(label: &str, color: TierColor) -> String {
    match color {
        TierColor::Green => label.green().bold().to_string(),
        TierColor::Lime => label.bright_green().to_string(),
        TierColor::Gray => label.bright_black().to_string(),
        TierColor::Orange => label.yellow().to_string(),
        TierColor::Red => label.red().bold().to_string(),
    }
}

fn new_surface() -> TextSurface {
    TextSurface::with_painter(Box::new(paint_badge))
}

fn print_view(runtime: &DashboardRuntime) -> Result<(), CliError> {
    let mut surface = new_surface();
    runtime.render(&mut surface);
    let mut stdout = io::stdout().lock();
    stdout.write_all(surface.as_str().as_bytes())?;
    stdout.flush()?;
    Ok(())
}

// ──────────────────── one-shot commands ────────────────────

fn run_show(cli: &Cli, args: &ShowArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let logger = start_logger(&config)?;
    let started = Instant::now();
    let mut runtime = build_runtime(&config, &args.view, logger.as_ref());
    record_start(&mut runtime, &config)?;

    runtime.mount();
    runtime.run_until_idle();
    if let Some(symbol) = &args.search {
        runtime.dispatch(DashboardMsg::EditSearch(symbol.clone()));
        runtime.dispatch(DashboardMsg::SubmitSearch);
        runtime.run_until_idle();
    }
    let result = print_view(&runtime);
    finish(runtime, logger, "show", started);
    result
}

fn run_ask(cli: &Cli, args: &AskArgs) -> Result<(), CliError> {
    let prompt = args.text.join(" ");
    if prompt.trim().is_empty() {
        return Err(CliError::User("question is empty".to_string()));
    }

    let config = load_config(cli)?;
    let logger = start_logger(&config)?;
    let started = Instant::now();
    let mut runtime = build_runtime(&config, &ViewArgs::default(), logger.as_ref());
    record_start(&mut runtime, &config)?;

    runtime.mount();
    runtime.run_until_idle();
    runtime.dispatch(DashboardMsg::EditChat(prompt));
    runtime.dispatch(DashboardMsg::SendChat);
    runtime.run_until_idle();

    let reply = runtime
        .model()
        .messages()
        .last()
        .filter(|m| m.role == ChatRole::Assistant)
        .map(|m| m.content.clone());
    finish(runtime, logger, "ask", started);

    let reply = reply.ok_or_else(|| CliError::Runtime("advisor did not reply".to_string()))?;
    println!("{reply}");
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let hash = config.stable_hash()?;

    if args.json {
        let payload = json!({
            "command": "config",
            "path": config.paths.config_file.to_string_lossy(),
            "hash": hash,
            "config": serde_json::to_value(&config)?,
        });
        let mut stdout = io::stdout().lock();
        serde_json::to_writer(&mut stdout, &payload)?;
        writeln!(stdout)?;
    } else {
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
        println!("# source: {}", config.paths.config_file.display());
        println!("# hash: {hash}");
        println!("{toml_str}");
    }
    Ok(())
}

// ──────────────────── interactive session ────────────────────

/// One line typed at the session prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Tab(Tab),
    Next,
    Prev,
    User(UserType),
    Search(String),
    Say(String),
    Refresh,
    Show,
    Help,
    Quit,
}

const SESSION_HELP: &str = "\
commands:
  tab <name|1-5>     switch tab (overview, opportunities, sentiment, portfolio, advisor)
  next | prev        cycle tabs
  user <type>        individual, advisor, investor-relations
  search <symbol>    select an opportunity
  say <text>         message the advisor
  refresh            re-fetch sentiment data
  show               redraw the current tab
  help               this text
  quit               leave the session";

/// Parse one session line. Blank lines yield `None`.
fn parse_session_command(line: &str) -> Result<Option<SessionCommand>, NofomoError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));
    let unknown = || NofomoError::UnknownCommand {
        input: line.to_string(),
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "tab" => SessionCommand::Tab(rest.parse().map_err(|_| unknown())?),
        "next" => SessionCommand::Next,
        "prev" => SessionCommand::Prev,
        "user" => SessionCommand::User(rest.parse().map_err(|_| unknown())?),
        "search" if !rest.is_empty() => SessionCommand::Search(rest.to_string()),
        // Blank text is passed through; the model ignores it.
        "say" => SessionCommand::Say(rest.to_string()),
        "refresh" => SessionCommand::Refresh,
        "show" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        _ => return Err(unknown()),
    };
    Ok(Some(cmd))
}

/// Forward stdin lines to the session loop. A read error is forwarded once,
/// then the channel closes.
fn spawn_stdin_reader() -> Result<Receiver<io::Result<String>>, CliError> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("nofomo-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })
        .map_err(|e| CliError::Runtime(format!("failed to spawn stdin reader: {e}")))?;
    Ok(rx)
}

/// What the session has already shown, so only changes get printed.
#[derive(Debug, Default)]
struct SessionView {
    load_state: Option<LoadState>,
    fetches_seen: u64,
    messages_seen: usize,
}

impl SessionView {
    /// Print whatever changed since the last call.
    fn refresh(&mut self, runtime: &DashboardRuntime) -> Result<(), CliError> {
        let model = runtime.model();
        let state = model.load_state();
        let fetches = model.fetches_resolved + model.fetch_failures;

        if self.load_state.as_ref() != Some(&state) || fetches != self.fetches_seen {
            let settled = state != LoadState::Loading;
            if settled || self.load_state.is_none() {
                self.redraw(runtime)?;
            }
            self.load_state = Some(state);
            self.fetches_seen = fetches;
        }

        let messages = model.messages();
        if messages.len() < self.messages_seen {
            self.messages_seen = messages.len();
        }
        if messages.len() > self.messages_seen {
            let mut surface = new_surface();
            surface.transcript(&messages[self.messages_seen..]);
            print!("{}", surface.as_str());
            self.messages_seen = messages.len();
        }
        io::stdout().flush()?;
        Ok(())
    }

    fn redraw(&mut self, runtime: &DashboardRuntime) -> Result<(), CliError> {
        print_view(runtime)?;
        self.messages_seen = runtime.model().messages().len();
        Ok(())
    }
}

fn run_session(cli: &Cli, args: &ViewArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let logger = start_logger(&config)?;
    let started = Instant::now();
    let mut runtime = build_runtime(&config, args, logger.as_ref());
    record_start(&mut runtime, &config)?;

    let lines = spawn_stdin_reader()?;
    let interactive = io::stdin().is_terminal();
    let mut view = SessionView::default();

    println!("Type `help` for commands.");
    runtime.mount();
    view.refresh(&runtime)?;

    let mut clock = Instant::now();
    let mut input_open = true;
    let reason = loop {
        if interactive {
            print!("nofomo> ");
            io::stdout().flush()?;
        }

        let received = if input_open {
            match runtime.time_until_next() {
                Some(wait) => lines.recv_timeout(wait),
                None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
            }
        } else {
            // Input is gone: let outstanding timers play out, then stop.
            match runtime.time_until_next() {
                Some(wait) => {
                    thread::sleep(wait);
                    Err(RecvTimeoutError::Timeout)
                }
                None => break "eof",
            }
        };

        let now = Instant::now();
        runtime.advance(now.duration_since(clock));
        clock = now;

        match received {
            Ok(Ok(line)) => match parse_session_command(&line) {
                Ok(None) => {}
                Ok(Some(SessionCommand::Quit)) => break "quit",
                Ok(Some(cmd)) => apply_session_command(&mut runtime, &mut view, cmd)?,
                Err(e) => eprintln!("{e} (type `help`)"),
            },
            Ok(Err(source)) => {
                let err = NofomoError::io("<stdin>", source);
                eprintln!("{err}");
                runtime.record(ActivityEvent::from(&err));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => input_open = false,
        }
        view.refresh(&runtime)?;
    };

    finish(runtime, logger, reason, started);
    Ok(())
}

fn apply_session_command(
    runtime: &mut DashboardRuntime,
    view: &mut SessionView,
    cmd: SessionCommand,
) -> Result<(), CliError> {
    match cmd {
        SessionCommand::Tab(tab) => {
            runtime.dispatch(DashboardMsg::SwitchTab(tab));
            view.redraw(runtime)?;
        }
        SessionCommand::Next => {
            runtime.dispatch(DashboardMsg::NextTab);
            view.redraw(runtime)?;
        }
        SessionCommand::Prev => {
            runtime.dispatch(DashboardMsg::PrevTab);
            view.redraw(runtime)?;
        }
        SessionCommand::User(user_type) => {
            runtime.dispatch(DashboardMsg::SetUserType(user_type));
            view.redraw(runtime)?;
        }
        SessionCommand::Search(symbol) => {
            runtime.dispatch(DashboardMsg::EditSearch(symbol));
            runtime.dispatch(DashboardMsg::SubmitSearch);
            if runtime.model().tab != Tab::Opportunities {
                runtime.dispatch(DashboardMsg::SwitchTab(Tab::Opportunities));
            }
            view.redraw(runtime)?;
        }
        SessionCommand::Say(text) => {
            let blank = text.trim().is_empty();
            runtime.dispatch(DashboardMsg::EditChat(text));
            runtime.dispatch(DashboardMsg::SendChat);
            // Input is handed back when the transcript has not loaded yet.
            if !runtime.model().chat_input.is_empty() {
                runtime.dispatch(DashboardMsg::EditChat(String::new()));
                if !blank {
                    println!("advisor is still loading; try again shortly");
                }
            }
        }
        SessionCommand::Refresh => {
            runtime.dispatch(DashboardMsg::RefreshSentiments);
            println!("refreshing sentiment data...");
        }
        SessionCommand::Show => view.redraw(runtime)?,
        SessionCommand::Help => println!("{SESSION_HELP}"),
        SessionCommand::Quit => {}
    }
    Ok(())
}

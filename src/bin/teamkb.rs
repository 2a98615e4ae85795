//!
//! teamkb CLI binary
//! -----------------
//! Terminal client for the team knowledge base. With a command on the command
//! line it runs that one command and exits; otherwise it starts an interactive
//! interpreter that keeps the session between commands.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use teamkb::app::App;
use teamkb::cli::{parse_command, run_command, usage, Command};
use teamkb::config::ClientConfig;
use teamkb::identity::{AuthState, FileSessionStore, SessionStore};
use teamkb::system_paths::history_path;

/// Entry point. Parses flags, builds the app around the file-backed session
/// store, then runs either a single command or the interpreter.
fn main() -> Result<()> {
    // Quiet by default so log lines do not interleave with command output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut api_url: Option<String> = None;
    let mut session_dir: Option<String> = None;
    let mut rest: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { eprintln!("--api requires a URL"); eprintln!("{}", usage(&program)); std::process::exit(2); }
                api_url = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--session-dir" => {
                if i + 1 >= args.len() { eprintln!("--session-dir requires a value"); eprintln!("{}", usage(&program)); std::process::exit(2); }
                session_dir = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-h" | "--help" => {
                println!("{}", usage(&program));
                return Ok(());
            }
            _ => {
                // everything from the first non-flag on is the command
                rest.extend(args[i..].iter().cloned());
                break;
            }
        }
    }

    let mut cfg = ClientConfig::from_env()?;
    if let Some(url) = api_url.as_deref() {
        cfg = cfg.with_base_url(url)?;
    }
    if let Some(dir) = session_dir {
        cfg = cfg.with_session_dir(PathBuf::from(dir));
    }
    debug!(api = %cfg.base_url, session_dir = %cfg.session_dir.display(), "configuration");

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(cfg.session_dir.clone()));
    let mut app = App::new(&cfg, store)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;
    rt.block_on(app.mount());

    if !rest.is_empty() {
        let line = rest.join(" ");
        let cmd = match parse_command(&line) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        };
        let out = rt.block_on(run_command(&mut app, cmd));
        println!("{}", out);
        return Ok(());
    }

    run_repl(&rt, &mut app, &cfg)
}

fn run_repl(rt: &tokio::runtime::Runtime, app: &mut App, cfg: &ClientConfig) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let history = history_path(&cfg.session_dir);
    let _ = editor.load_history(&history);

    println!("teamkb interpreter ({}). Type 'help' for commands.", cfg.base_url);
    println!("{}", app.render());
    loop {
        let prompt = match app.auth().state() {
            AuthState::Authenticated(u) => format!("{}> ", u.email),
            _ => "> ".to_string(),
        };
        let line = match editor.readline(&prompt) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("readline error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() { continue; }
        // keep passwords out of the history file
        let lower = line.trim_start().to_ascii_lowercase();
        if !lower.starts_with("login") && !lower.starts_with("register") {
            let _ = editor.add_history_entry(line.as_str());
        }
        let cmd = match parse_command(&line) {
            Ok(c) => c,
            Err(e) => {
                if !e.is_empty() { println!("{}", e); }
                continue;
            }
        };
        if cmd == Command::Quit { break; }
        let was_logged_in = app.auth().user().is_some();
        let out = rt.block_on(run_command(app, cmd));
        if !out.is_empty() { println!("{}", out); }
        if was_logged_in && app.auth().user().is_none() {
            println!("\n{}", app.render());
        }
    }

    if std::fs::create_dir_all(&cfg.session_dir).is_ok() {
        if let Err(e) = editor.save_history(&history) {
            debug!("could not save history: {}", e);
        }
    }
    Ok(())
}

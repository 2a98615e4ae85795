//! Command language shared by the one-shot CLI and the interactive interpreter.

pub mod outputformatter;

use std::path::PathBuf;

use crate::app::App;
use crate::identity::{AuthOutcome, AuthState};
use crate::views::{format_uploaded_at, AuthMode, UploadOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Register { email: String, name: String, password: String },
    /// Bare `login` / `register`: show the auth page in that mode.
    ShowAuth(AuthMode),
    Logout,
    Whoami,
    Upload(PathBuf),
    Docs,
    Doc(i64),
    Ask(String),
    Search(String),
    Status,
    Help,
    Quit,
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [--api <url>] [--session-dir <dir>]              # start interactive interpreter\n  {program} [--api <url>] [--session-dir <dir>] <command> [args]  # run one command and exit\n\nFlags:\n  --api <url>              Knowledge-base server (default: $TEAMKB_API_URL or http://127.0.0.1:8000)\n  --session-dir <dir>      Where the session token is kept (default: $TEAMKB_SESSION_DIR or ~/.teamkb)\n  -h, --help               Show this help\n\nCommands:\n  login [<email> <password>]             log in and store the session (bare: show the login page)\n  register [<email> <name> <password>]   create an account, then log in (bare: show the form)\n  logout                                 forget the stored session\n  whoami                                 show the logged-in user\n  upload <path>                          upload a document\n  docs                                   list uploaded documents\n  doc <id>                               show one document\n  ask <question>                         ask a question about your documents\n  search <query>                         show matching passages with scores\n  status                                 show server and session info\n  help                                   show this help\n  quit | exit                            leave the interpreter"
    )
}

/// Parse one command line. Errors are short user-facing hints.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();
    match head.to_ascii_lowercase().as_str() {
        "login" if args.is_empty() => Ok(Command::ShowAuth(AuthMode::Login)),
        "register" if args.is_empty() => Ok(Command::ShowAuth(AuthMode::Register)),
        "login" => match args.as_slice() {
            [email, password] => Ok(Command::Login { email: email.to_string(), password: password.to_string() }),
            _ => Err("usage: login <email> <password>".into()),
        },
        "register" => match args.as_slice() {
            [email, name, password] => Ok(Command::Register {
                email: email.to_string(),
                name: name.to_string(),
                password: password.to_string(),
            }),
            _ => Err("usage: register <email> <name> <password>".into()),
        },
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "upload" if !rest.is_empty() => Ok(Command::Upload(PathBuf::from(rest))),
        "upload" => Err("usage: upload <path>".into()),
        "docs" | "documents" | "ls" => Ok(Command::Docs),
        "doc" => match args.as_slice() {
            [id] => id.parse().map(Command::Doc).map_err(|_| format!("not a document id: {id}")),
            _ => Err("usage: doc <id>".into()),
        },
        "ask" if !rest.is_empty() => Ok(Command::Ask(rest.to_string())),
        "ask" => Err("usage: ask <question>".into()),
        "search" if !rest.is_empty() => Ok(Command::Search(rest.to_string())),
        "search" => Err("usage: search <query>".into()),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command: {other} (type 'help')")),
    }
}

/// Run a command against the app and return the text to show.
pub async fn run_command(app: &mut App, cmd: Command) -> String {
    let out = match cmd {
        Command::Help => usage("teamkb"),
        Command::Quit => String::new(),
        Command::Status => status_line(app),
        Command::Whoami => match app.auth().user() {
            Some(u) => u.email,
            None => "not logged in".to_string(),
        },
        Command::Login { email, password } => match app.login(&email, &password).await {
            AuthOutcome::Success => app.render(),
            AuthOutcome::Failure(msg) => format!("login failed: {msg}"),
        },
        Command::Register { email, name, password } => match app.register(&email, &name, &password).await {
            AuthOutcome::Success => app.render(),
            AuthOutcome::Failure(msg) => format!("registration failed: {msg}"),
        },
        Command::ShowAuth(mode) => match app.auth().user() {
            Some(u) => format!("already logged in as {} (logout first)", u.email),
            None => app.show_auth(mode),
        },
        Command::Logout => {
            app.logout();
            "logged out".to_string()
        }
        Command::Upload(path) => match app.upload(path).await {
            None => not_logged_in(app),
            Some(UploadOutcome::Uploaded) => {
                let mut parts = Vec::new();
                if let Some(u) = app.upload_view() { parts.push(u.render()); }
                if let Some(d) = app.documents() { parts.push(d.render()); }
                parts.join("\n\n")
            }
            Some(_) => app.upload_view().map(|u| u.render()).unwrap_or_else(|| not_logged_in(app)),
        },
        Command::Docs => {
            if app.refresh_documents().await {
                app.documents().map(|d| d.render()).unwrap_or_else(|| not_logged_in(app))
            } else {
                not_logged_in(app)
            }
        }
        Command::Ask(q) => match app.ask(&q).await {
            None => not_logged_in(app),
            Some(_) => app.ask_view().map(|a| a.render()).unwrap_or_else(|| not_logged_in(app)),
        },
        Command::Doc(id) => {
            if app.auth().user().is_none() {
                not_logged_in(app)
            } else {
                let res = app.client().get_document(id).await;
                app.handle_navigation();
                match res {
                    Ok(d) => {
                        let status = if d.processed { "Processed" } else { "Pending" };
                        let mut s = format!(
                            "Document {}\n  filename:    {}\n  uploaded at: {}\n  status:      {}",
                            d.id, d.filename, format_uploaded_at(&d.uploaded_at), status
                        );
                        if let Some(p) = d.file_path { s.push_str(&format!("\n  stored at:   {}", p)); }
                        s
                    }
                    Err(e) => format!("Failed to load document {}: {}", id, e.message()),
                }
            }
        }
        Command::Search(q) => {
            if app.auth().user().is_none() {
                not_logged_in(app)
            } else {
                let res = app.client().search(&q).await;
                app.handle_navigation();
                match res {
                    Ok(r) if r.results.is_empty() => format!("no matches for '{}'", r.query),
                    Ok(r) => {
                        let rows: Vec<Vec<String>> = r
                            .results
                            .iter()
                            .map(|h| {
                                vec![
                                    h.document_id.to_string(),
                                    h.chunk_index.to_string(),
                                    format!("{}%", (h.score * 100.0).round() as i64),
                                    h.text.replace('\n', " "),
                                ]
                            })
                            .collect();
                        outputformatter::render_table(&["Document", "Chunk", "Score", "Text"], &rows)
                    }
                    Err(e) => format!("Search failed: {}", e.message()),
                }
            }
        }
    };
    if app.navigation().has_pending_redirect() {
        app.handle_navigation();
    }
    out
}

fn not_logged_in(app: &App) -> String {
    format!("not logged in\n\n{}", app.auth_page().render())
}

fn status_line(app: &App) -> String {
    let who = match app.auth().state() {
        AuthState::Authenticated(u) => format!("logged in as {}", u.email),
        AuthState::Anonymous => "not logged in".to_string(),
        AuthState::Loading => "loading".to_string(),
    };
    format!("server: {}\nsession: {}", app.client().base(), who)
}

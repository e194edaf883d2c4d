//! oxop entrypoint: apply one operator to a file.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::load_from;
use core_events::{EventHooks, OperatorEvent};
use core_operators::{OperatorRequest, Outcome, ScriptedInput, Session};
use core_state::EditorState;
use core_text::{Buffer, Position};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxop", version, about = "Apply a Vim-style operator to a file")]
struct Args {
    /// File to edit (UTF-8 text).
    pub path: PathBuf,
    /// Operator name (`Delete`, `SurroundWord`, a configured external command, ...).
    #[arg(long = "op")]
    pub op: String,
    /// Motion or text object the operator acts on.
    #[arg(long)]
    pub target: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub count: usize,
    /// Cursor as `LINE:COL`, zero based, columns in chars.
    #[arg(long, value_parser = parse_position, default_value = "0:0")]
    pub cursor: Position,
    /// Answer for the next prompt; repeat for operators that ask twice.
    #[arg(long = "input")]
    pub input: Vec<String>,
    /// Text typed while an insert operator is active.
    #[arg(long = "type")]
    pub typed: Option<String>,
    /// Register the operator reads or writes.
    #[arg(long)]
    pub register: Option<char>,
    /// Configuration file (overrides discovery of `oxop.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the result back instead of printing it.
    #[arg(long = "in-place")]
    pub in_place: bool,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (line, col) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got `{s}`"))?;
    let line = line.trim().parse().map_err(|e| format!("line: {e}"))?;
    let col = col.trim().parse().map_err(|e| format!("column: {e}"))?;
    Ok(Position::new(line, col))
}

/// Operator events go to the log file.
struct LogHooks;

impl EventHooks for LogHooks {
    fn on_event(&self, event: &OperatorEvent) {
        debug!(target: "oxop.events", kind = event.kind(), ?event, "operator_event");
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("oxop.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "oxop.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

async fn apply(args: &Args) -> Result<String> {
    let config = load_from(args.config.clone())?;
    let content = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let buffer = Buffer::from_str(args.path.display().to_string(), &content)?;
    let mut editor = EditorState::new(buffer);
    editor.set_cursor(args.cursor);

    let mut session =
        Session::new(editor, config).with_input(ScriptedInput::new(args.input.iter().cloned()));
    session.register_hooks(LogHooks);
    if let Some(register) = args.register {
        session.select_register(register);
    }
    let mut request = OperatorRequest::new(args.op.as_str()).count(args.count);
    if let Some(target) = &args.target {
        request = request.target(target.as_str());
    }
    let outcome = session
        .run_async(request)
        .await
        .with_context(|| format!("running {}", args.op))?;
    info!(target: "oxop", op = %args.op, ?outcome, "operator_run");
    match outcome {
        Outcome::InsertPending => {
            if let Some(text) = &args.typed {
                session.editor.type_text(text);
            }
            session.leave_insert_mode();
        }
        Outcome::Cancelled | Outcome::Aborted => {
            warn!(target: "oxop", op = %args.op, ?outcome, "operator_did_not_apply");
        }
        _ => {}
    }
    Ok(session.editor.text())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    let text = apply(&args).await?;
    if args.in_place {
        std::fs::write(&args.path, &text)
            .with_context(|| format!("writing {}", args.path.display()))?;
    } else {
        print!("{text}");
    }
    Ok(())
}

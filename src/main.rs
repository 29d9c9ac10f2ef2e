//! JSON-lines host bridge.
//!
//! Mounts a page fixture, then reads one host request per stdin line and writes one JSON object
//! per stdout line: `{"id": .., "result": ..}` replies, and agent events as they are published.

use agent::template::{ActionElement, build_element};
use agent::{Agent, AgentConfig, ConfigError, HostRequest, dispatch};
use bus::{AgentEvent, Bus, drain};
use clap::Parser;
use html::{Document, DomError};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const TICK: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "livedit", version, about = "In-page editing agent over stdin/stdout")]
struct Cli {
    /// Agent configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page fixture: an element tree (JSON) mounted into <body>
    #[arg(short, long)]
    page: Option<PathBuf>,

    /// Frame id to assign at startup
    #[arg(long)]
    frame_id: Option<String>,
}

#[derive(Debug, Error)]
enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read page fixture: {0}")]
    Io(#[from] io::Error),
    #[error("invalid page fixture: {0}")]
    Page(#[from] serde_json::Error),
    #[error("cannot mount page fixture: {0}")]
    Mount(#[from] DomError),
}

#[derive(Serialize)]
struct Reply {
    id: Value,
    result: Value,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn load_page(path: Option<&Path>) -> Result<Document, BridgeError> {
    let mut doc = Document::new();
    let Some(path) = path else {
        return Ok(doc);
    };
    let text = std::fs::read_to_string(path)?;
    let fixture: ActionElement = serde_json::from_str(&text)?;
    let node = build_element(&mut doc, &fixture)?;
    if let Some(body) = doc.body() {
        doc.append_child(body, node)?;
    }
    // the fixture is the initial page, not an observed change
    doc.take_records();
    Ok(doc)
}

fn emit(out: &mut impl Write, value: &impl Serialize) {
    let written = serde_json::to_writer(&mut *out, value)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush());
    if let Err(err) = written {
        log::warn!("cannot write to stdout: {err}");
    }
}

fn emit_events(out: &mut impl Write, events: Vec<AgentEvent>) {
    for event in events {
        emit(out, &event);
    }
}

/// One request line: a `HostRequest` object with an optional `id` echoed back in the reply.
fn handle_line(agent: &mut Agent, line: &str) -> Option<Reply> {
    let mut value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("malformed request line: {err}");
            return None;
        }
    };
    let id = value
        .as_object_mut()
        .and_then(|obj| obj.remove("id"))
        .unwrap_or(Value::Null);
    match serde_json::from_value::<HostRequest>(value) {
        Ok(request) => Some(Reply {
            id,
            result: dispatch(agent, request),
        }),
        Err(err) => {
            log::warn!("unsupported request: {err}");
            Some(Reply {
                id,
                result: Value::Null,
            })
        }
    }
}

fn run(cli: Cli) -> Result<(), BridgeError> {
    let config = match &cli.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    let doc = load_page(cli.page.as_deref())?;
    let bus = Bus::bounded(config.event_capacity);
    let mut agent = Agent::new(doc, config, bus.evt_tx.clone());
    if let Some(frame_id) = cli.frame_id {
        agent.set_frame_id(frame_id);
    }
    agent.start(Instant::now());

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    log::info!("livedit bridge ready");
    loop {
        match line_rx.recv_timeout(TICK) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => {
                if let Some(reply) = handle_line(&mut agent, &line) {
                    emit(&mut out, &reply);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        agent.tick(Instant::now());
        emit_events(&mut out, drain(&bus.evt_rx));
    }
    log::info!("stdin closed, shutting down");
    Ok(())
}

fn main() {
    init_logging();
    if let Err(err) = run(Cli::parse()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

//! Line-oriented terminal front end.
//!
//! Reads commands from stdin and prints session, engine and health changes
//! as they are published. Engine requests run as background tasks so the
//! prompt stays responsive while one is in flight.

use std::sync::Arc;

use chess::{DisplayBoard, MoveInput};
use chess_client::{BackendResult, ChessBackend, EnginesResponse, HttpBackend};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::engines::{EngineSelector, SelectStart};
use crate::health::{spawn_health_monitor, HealthDisplay, HealthStatus, Visibility};
use crate::session::{spawn_session, SessionMode, SessionSnapshot, SessionState};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(MoveInput),
    Reset,
    ListEngines,
    SelectEngine(String),
    Show,
    Visibility(Visibility),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Usage: engine <id>")]
    MissingEngine,
}

pub fn parse_input(line: &str) -> Result<Option<Command>, InputError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "reset" | "new" => Command::Reset,
        "engines" => Command::ListEngines,
        "engine" => Command::SelectEngine(words.next().ok_or(InputError::MissingEngine)?.to_string()),
        "show" | "board" => Command::Show,
        "visible" => Command::Visibility(Visibility::Visible),
        "hidden" => Command::Visibility(Visibility::Hidden),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => MoveInput::parse_uci(other)
            .map(Command::Move)
            .map_err(|_| InputError::Unknown(head.to_string()))?,
    };
    Ok(Some(command))
}

pub const HELP: &str = "\
commands:
  e2e4, e7e8n     make a move (promotion defaults to queen)
  reset           start a new game
  engines         list engines
  engine <id>     switch engine
  show            redraw the board
  visible/hidden  simulate window visibility
  quit            exit";

/// Status line for a snapshot.
pub fn render_status(snap: &SessionSnapshot) -> String {
    let mut line = format!("[{}] ", snap.mode);
    match &snap.state {
        SessionState::Idle => line.push_str("ready"),
        SessionState::AwaitingResponse => match snap.mode {
            SessionMode::Play => line.push_str("engine thinking..."),
            SessionMode::Analysis => line.push_str("analyzing..."),
        },
        SessionState::Error(message) => line.push_str(&format!("error: {message}")),
        SessionState::GameOver => match &snap.outcome {
            Some(outcome) => line.push_str(&format!("game over: {outcome}")),
            None => line.push_str("game over"),
        },
    }

    if let Some(eval) = &snap.evaluation {
        line.push_str(&format!("  eval {}", eval.score.display()));
        if let Some(best) = &eval.best_move {
            line.push_str(&format!(" best {best}"));
        }
    }
    if let Some(mv) = &snap.engine_move {
        line.push_str(&format!("  engine played {mv}"));
    }
    line
}

/// Board diagram followed by the status line.
pub fn render_snapshot(snap: &SessionSnapshot) -> String {
    let board = match DisplayBoard::from_fen(&snap.fen) {
        Ok(board) => board.render_ascii(),
        Err(e) => format!("<unrenderable position: {e}>\n"),
    };
    let moves = if snap.history.is_empty() {
        String::from("-")
    } else {
        snap.history.join(" ")
    };
    format!("{board}moves: {moves}\n{}", render_status(snap))
}

/// Banner text, `None` when no banner is showing.
pub fn render_banner(display: &HealthDisplay) -> Option<&'static str> {
    if !display.banner_visible {
        return None;
    }
    match display.status {
        HealthStatus::Up => Some("** Backend is running **"),
        HealthStatus::Down => Some("** Backend is not running **"),
        HealthStatus::Unknown => None,
    }
}

enum EngineOp {
    Loaded(BackendResult<EnginesResponse>),
    Selected(BackendResult<()>),
}

/// Run the interactive client until `quit` or end of input.
pub async fn run(config: ClientConfig, mode: SessionMode) -> anyhow::Result<()> {
    let backend: Arc<dyn ChessBackend> =
        Arc::new(HttpBackend::new(&config.backend_url, config.request_timeout)?);
    tracing::info!(url = %config.backend_url, %mode, "Client starting");

    let session = spawn_session(mode, backend.clone(), config.request_timeout);
    let mut health = spawn_health_monitor(
        backend.clone(),
        config.health_interval,
        config.banner_hide_delay,
    );
    let mut selector = EngineSelector::new();
    let (op_tx, mut op_rx) = mpsc::unbounded_channel::<EngineOp>();

    let mut snapshots = session.subscribe();
    let mut health_rx = health.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render_snapshot(&session.current()));
    println!("type 'help' for commands");

    selector.begin_load();
    spawn_engine_op(&backend, &op_tx, None);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        handle_command(command, &session, &health, &mut selector, &backend, &op_tx).await;
                    }
                    Err(e) => println!("{e}"),
                }
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                println!("{}", render_snapshot(&snap));
            }

            Ok(()) = health_rx.changed() => {
                let display = *health_rx.borrow_and_update();
                if let Some(banner) = render_banner(&display) {
                    println!("{banner}");
                }
            }

            Some(op) = op_rx.recv() => match op {
                EngineOp::Loaded(result) => match selector.finish_load(result) {
                    Ok(info) => println!(
                        "engine: {} (available: {})",
                        info.current_engine,
                        info.available_engines.join(", ")
                    ),
                    Err(e) => println!("engines unavailable: {e}"),
                },
                EngineOp::Selected(result) => {
                    // A rejection is logged by the selector; the user just sees the
                    // engine it kept.
                    selector.finish_select(result).ok();
                    println!("engine: {}", selector.current_engine().unwrap_or("-"));
                }
            },
        }
    }

    health.shutdown();
    session.shutdown().await;
    tracing::info!("Client exiting");
    Ok(())
}

async fn handle_command(
    command: Command,
    session: &crate::session::SessionHandle,
    health: &crate::health::HealthHandle,
    selector: &mut EngineSelector,
    backend: &Arc<dyn ChessBackend>,
    op_tx: &mpsc::UnboundedSender<EngineOp>,
) {
    match command {
        Command::Move(input) => {
            if let Err(e) = session.make_move(input).await {
                println!("{e}");
            }
        }
        Command::Reset => {
            if let Err(e) = session.reset().await {
                println!("{e}");
            }
        }
        Command::Show => println!("{}", render_snapshot(&session.current())),
        Command::ListEngines => {
            if selector.is_loading() {
                println!("loading engines...");
            } else if let Some(info) = selector.info() {
                for id in &info.available_engines {
                    let marker = if *id == info.current_engine { "*" } else { " " };
                    println!("{marker} {id}");
                }
            } else {
                selector.begin_load();
                spawn_engine_op(backend, op_tx, None);
                println!("loading engines...");
            }
        }
        Command::SelectEngine(engine) => match selector.begin_select(&engine) {
            Ok(SelectStart::Started) => spawn_engine_op(backend, op_tx, Some(engine)),
            Ok(SelectStart::AlreadyCurrent) => println!("engine: {engine}"),
            Err(e) => println!("{e}"),
        },
        Command::Visibility(visibility) => health.set_visibility(visibility),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

/// Load the engine list, or select `engine` when given.
fn spawn_engine_op(
    backend: &Arc<dyn ChessBackend>,
    op_tx: &mpsc::UnboundedSender<EngineOp>,
    engine: Option<String>,
) {
    let backend = backend.clone();
    let op_tx = op_tx.clone();
    tokio::spawn(async move {
        let op = match engine {
            Some(engine) => EngineOp::Selected(backend.select_engine(&engine).await),
            None => EngineOp::Loaded(backend.engines().await),
        };
        let _ = op_tx.send(op);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{AnalysisScore, PieceKind, STARTING_FEN};
    use crate::session::EvaluationResult;

    fn snapshot(mode: SessionMode, state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            mode,
            state,
            fen: STARTING_FEN.to_string(),
            history: vec![],
            evaluation: None,
            engine_move: None,
            interactive: true,
            outcome: None,
        }
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_input("e2e4"),
            Ok(Some(Command::Move(MoveInput::parse_uci("e2e4").unwrap())))
        );
        let Ok(Some(Command::Move(input))) = parse_input("  e7e8n ") else {
            panic!("expected a move");
        };
        assert_eq!(input.promotion, PieceKind::Knight);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(""), Ok(None));
        assert_eq!(parse_input("RESET"), Ok(Some(Command::Reset)));
        assert_eq!(
            parse_input("engine minimax"),
            Ok(Some(Command::SelectEngine("minimax".into())))
        );
        assert_eq!(parse_input("engine"), Err(InputError::MissingEngine));
        assert_eq!(
            parse_input("hidden"),
            Ok(Some(Command::Visibility(Visibility::Hidden)))
        );
        assert_eq!(parse_input("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_input("castle"), Err(InputError::Unknown("castle".into())));
    }

    #[test]
    fn test_render_status_states() {
        let snap = snapshot(SessionMode::Play, SessionState::AwaitingResponse);
        assert_eq!(render_status(&snap), "[play] engine thinking...");

        let snap = snapshot(
            SessionMode::Analysis,
            SessionState::Error("Backend is not running".into()),
        );
        assert_eq!(render_status(&snap), "[analysis] error: Backend is not running");
    }

    #[test]
    fn test_render_snapshot_includes_evaluation() {
        let mut snap = snapshot(SessionMode::Analysis, SessionState::Idle);
        snap.history = vec!["e2e4".into()];
        snap.evaluation = Some(EvaluationResult {
            score: AnalysisScore::Centipawns(35),
            best_move: Some("e7e5".into()),
            top_moves: vec![],
        });

        let text = render_snapshot(&snap);
        assert!(text.contains("moves: e2e4"));
        assert!(text.ends_with("[analysis] ready  eval +0.35 best e7e5"));
    }

    #[test]
    fn test_render_banner() {
        let hidden = HealthDisplay {
            status: HealthStatus::Down,
            banner_visible: false,
        };
        assert_eq!(render_banner(&hidden), None);

        let down = HealthDisplay {
            status: HealthStatus::Down,
            banner_visible: true,
        };
        assert_eq!(render_banner(&down), Some("** Backend is not running **"));
    }
}

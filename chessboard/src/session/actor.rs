use std::sync::Arc;
use std::time::Duration;

use chess_client::{BackendError, ChessBackend};
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use super::commands::*;
use super::controller::*;
use super::snapshot::SessionSnapshot;

type Completion = (u64, Result<BackendReply, BackendError>);

/// The main session actor loop.
/// Owns the controller. Processes commands and backend completions sequentially.
pub(crate) async fn run_session_actor(
    controller: SessionController,
    backend: Arc<dyn ChessBackend>,
    request_timeout: Duration,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
) {
    let mode = controller.mode();
    run_session_actor_inner(controller, backend, request_timeout, cmd_rx, snapshot_tx)
        .instrument(tracing::info_span!("session", %mode))
        .await;
}

async fn run_session_actor_inner(
    mut controller: SessionController,
    backend: Arc<dyn ChessBackend>,
    request_timeout: Duration,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
) {
    tracing::info!("Session actor started");

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => {
                        if let Some(request) = handle_command(&mut controller, cmd) {
                            dispatch(request, &backend, request_timeout, &done_tx);
                        }
                    }
                }
            }

            Some((epoch, result)) = done_rx.recv() => {
                let disposition = controller.on_response(epoch, result);
                tracing::debug!(epoch, ?disposition, "Backend response handled");
            }
        }

        publish(&snapshot_tx, controller.snapshot());
    }

    tracing::info!("Session actor exited");
}

fn handle_command(
    controller: &mut SessionController,
    cmd: SessionCommand,
) -> Option<BackendRequest> {
    match cmd {
        SessionCommand::UserMove { input, reply } => match controller.user_move(input) {
            Ok(request) => {
                let _ = reply.send(Ok(controller.snapshot()));
                request
            }
            Err(e) => {
                tracing::debug!(mv = %input, error = %e, "Move rejected");
                let _ = reply.send(Err(e));
                None
            }
        },
        SessionCommand::Reset { reply } => {
            controller.reset();
            tracing::info!("Session reset");
            let _ = reply.send(controller.snapshot());
            None
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(controller.snapshot());
            None
        }
        SessionCommand::Shutdown => None,
    }
}

/// Run one backend request on its own task. The answer comes back tagged
/// with the request's epoch whether or not it is still wanted.
fn dispatch(
    request: BackendRequest,
    backend: &Arc<dyn ChessBackend>,
    request_timeout: Duration,
    done_tx: &mpsc::UnboundedSender<Completion>,
) {
    let backend = Arc::clone(backend);
    let done_tx = done_tx.clone();

    tokio::spawn(async move {
        let call = async {
            match request.kind {
                RequestKind::Analyze => backend
                    .analyze(&request.fen)
                    .await
                    .map(|r| BackendReply::Evaluation(r.into())),
                RequestKind::BestMove => backend
                    .best_move(&request.fen)
                    .await
                    .map(|r| BackendReply::EngineMove(r.into())),
            }
        };

        let result = match tokio::time::timeout(request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(request_timeout)),
        };
        // The actor may have exited; nothing left to tell.
        let _ = done_tx.send((request.epoch, result));
    });
}

fn publish(snapshot_tx: &watch::Sender<SessionSnapshot>, snapshot: SessionSnapshot) {
    snapshot_tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}

//! Session Controller: one per active screen.
//!
//! [`SessionController`] is the pure state machine; [`spawn_session`] runs
//! it inside a tokio actor that dispatches backend requests and publishes
//! snapshots through a [`SessionHandle`].

mod actor;
mod commands;
mod controller;
mod handle;
mod snapshot;

use std::sync::Arc;
use std::time::Duration;

use chess_client::ChessBackend;
use tokio::sync::{mpsc, watch};

pub use commands::SessionError;
pub use controller::{
    BackendReply, BackendRequest, RequestKind, ResponseDisposition, SessionController,
    BACKEND_DOWN_MESSAGE,
};
pub use handle::SessionHandle;
pub use snapshot::{
    EngineMoveResult, EvaluationResult, SessionMode, SessionSnapshot, SessionState,
};

/// Start a session actor for `mode`. The actor stops when every handle
/// is dropped or [`SessionHandle::shutdown`] is called.
pub fn spawn_session(
    mode: SessionMode,
    backend: Arc<dyn ChessBackend>,
    request_timeout: Duration,
) -> SessionHandle {
    let controller = SessionController::new(mode);
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    tokio::spawn(actor::run_session_actor(
        controller,
        backend,
        request_timeout,
        cmd_rx,
        snapshot_tx,
    ));

    SessionHandle::new(mode, cmd_tx, snapshot_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{AnalysisScore, MoveInput, STARTING_FEN};
    use chess_client::{
        AnalysisResponse, BackendError, Evaluation, MockBackend, MockCall, MoveResponse,
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn mv(s: &str) -> MoveInput {
        MoveInput::parse_uci(s).unwrap()
    }

    /// Wait until the published snapshot satisfies `pred`.
    async fn wait_for(
        handle: &SessionHandle,
        pred: impl Fn(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        let mut rx = handle.subscribe();
        let snap = rx
            .wait_for(|s| pred(s))
            .await
            .expect("session actor exited")
            .clone();
        snap
    }

    fn engine_replies(uci: &'static str) -> MockBackend {
        MockBackend::new().with_best_move_response(move |_| {
            Ok(MoveResponse {
                best_move: Some(uci.to_string()),
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_mode_end_to_end() {
        let mock = engine_replies("e7e5").with_delay(|_| Duration::from_millis(200));
        let handle = spawn_session(SessionMode::Play, Arc::new(mock.clone()), TIMEOUT);
        assert_eq!(handle.current().fen, STARTING_FEN);

        let after_user = handle.make_move(mv("e2e4")).await.unwrap();
        assert!(after_user.fen.contains("4P3"));
        assert!(!after_user.interactive);
        assert_eq!(after_user.state, SessionState::AwaitingResponse);

        let settled = wait_for(&handle, |s| s.history.len() == 2).await;
        assert_eq!(settled.state, SessionState::Idle);
        assert!(settled.interactive);
        assert_eq!(settled.history, ["e2e4", "e7e5"]);
        assert_eq!(settled.engine_move.as_deref(), Some("e7e5"));

        assert_eq!(
            mock.get_calls(),
            vec![MockCall::BestMove {
                fen: after_user.fen.clone()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkmate_makes_no_backend_call() {
        let mock = MockBackend::new();
        let handle = spawn_session(SessionMode::Analysis, Arc::new(mock.clone()), TIMEOUT);

        // Fool's mate played entirely by the user; analysis replies never configured,
        // so every earlier request fails, but the last move must not issue one.
        for m in ["f2f3", "e7e5", "g2g4"] {
            handle.make_move(mv(m)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        mock.clear_calls();
        let snap = handle.make_move(mv("d8h4")).await.unwrap();

        assert_eq!(snap.state, SessionState::GameOver);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(mock.get_calls().is_empty());
        assert_eq!(handle.current().state, SessionState::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_analysis_reply_is_discarded() {
        // First request answers slowly, second quickly.
        let mock = MockBackend::new()
            .with_analyze_response(|fen| {
                let value = if fen.contains("4p3") { 20 } else { 10 };
                Ok(AnalysisResponse {
                    evaluation: Evaluation::centipawns(value),
                    best_move: None,
                    top_moves: vec![],
                })
            })
            .with_delay(|call| match call {
                MockCall::Analyze { fen } if fen.contains("4p3") => Duration::from_millis(100),
                _ => Duration::from_millis(500),
            });
        let handle = spawn_session(SessionMode::Analysis, Arc::new(mock), TIMEOUT);

        handle.make_move(mv("e2e4")).await.unwrap();
        handle.make_move(mv("e7e5")).await.unwrap();

        let snap = wait_for(&handle, |s| s.evaluation.is_some()).await;
        assert_eq!(snap.state, SessionState::Idle);
        assert_eq!(
            snap.evaluation.unwrap().score,
            AnalysisScore::Centipawns(20)
        );

        // Let the slow reply land; it must not replace the newer evaluation.
        tokio::time::sleep(Duration::from_secs(1)).await;
        let snap = handle.get_snapshot().await.unwrap();
        assert_eq!(
            snap.evaluation.unwrap().score,
            AnalysisScore::Centipawns(20)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_surfaces_as_error() {
        let mock = MockBackend::new()
            .with_analyze_response(|_| Err(BackendError::Network("connection refused".into())));
        let handle = spawn_session(SessionMode::Analysis, Arc::new(mock), TIMEOUT);

        handle.make_move(mv("d2d4")).await.unwrap();
        let snap = wait_for(&handle, |s| matches!(s.state, SessionState::Error(_))).await;
        assert_eq!(
            snap.state,
            SessionState::Error(BACKEND_DOWN_MESSAGE.to_string())
        );
        assert!(snap.interactive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_backend_times_out() {
        let mock = engine_replies("e7e5").with_delay(|_| Duration::from_secs(3600));
        let handle = spawn_session(SessionMode::Play, Arc::new(mock), Duration::from_secs(5));

        handle.make_move(mv("e2e4")).await.unwrap();
        let snap = wait_for(&handle, |s| matches!(s.state, SessionState::Error(_))).await;
        assert!(snap.interactive);
        assert_eq!(snap.history, ["e2e4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_ignores_in_flight_engine_move() {
        let mock = engine_replies("e7e5").with_delay(|_| Duration::from_millis(500));
        let handle = spawn_session(SessionMode::Play, Arc::new(mock), TIMEOUT);

        handle.make_move(mv("e2e4")).await.unwrap();
        let snap = handle.reset().await.unwrap();
        assert_eq!(snap.fen, STARTING_FEN);
        assert!(snap.interactive);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let snap = handle.get_snapshot().await.unwrap();
        assert_eq!(snap.fen, STARTING_FEN);
        assert!(snap.history.is_empty());
        assert_eq!(snap.state, SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_moves_rejected_while_engine_thinks() {
        let mock = engine_replies("e7e5").with_delay(|_| Duration::from_millis(500));
        let handle = spawn_session(SessionMode::Play, Arc::new(mock), TIMEOUT);

        handle.make_move(mv("e2e4")).await.unwrap();
        assert_eq!(
            handle.make_move(mv("d2d4")).await,
            Err(SessionError::NotInteractive)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_actor() {
        let handle = spawn_session(SessionMode::Analysis, Arc::new(MockBackend::new()), TIMEOUT);
        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(
            handle.get_snapshot().await,
            Err(SessionError::Internal(_))
        ));
    }
}

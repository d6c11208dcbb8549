//! Session state machine, free of I/O.
//!
//! The controller decides *what* to ask the backend and how to fold the
//! answer back in; the actor in `actor.rs` does the asking. Requests are
//! tagged with an epoch and only an answer carrying the latest epoch is
//! ever applied, so overlapping requests resolve to "most recent wins"
//! without any transport-level cancellation.

use chess::MoveInput;
use chess_client::BackendError;

use crate::position_store::{MoveEvent, PositionStore, StoreError};

use super::commands::SessionError;
use super::snapshot::*;

/// Message shown when the backend cannot serve a request.
pub const BACKEND_DOWN_MESSAGE: &str = "Backend is not running";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Analyze,
    BestMove,
}

/// A request the caller must send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub epoch: u64,
    pub kind: RequestKind,
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    Evaluation(EvaluationResult),
    EngineMove(EngineMoveResult),
}

/// What happened to a backend answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    Applied,
    /// Superseded by a later request or a reset; dropped silently.
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SessionController {
    mode: SessionMode,
    store: PositionStore,
    state: SessionState,
    epoch: u64,
    evaluation: Option<EvaluationResult>,
    engine_move: Option<String>,
}

impl SessionController {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            store: PositionStore::new(),
            state: SessionState::Idle,
            epoch: 0,
            evaluation: None,
            engine_move: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    /// Epoch of the most recent request (or reset).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the board accepts moves. Play mode locks while the engine
    /// thinks; analysis mode never locks.
    pub fn interactive(&self) -> bool {
        match self.state {
            SessionState::GameOver => false,
            SessionState::AwaitingResponse => self.mode == SessionMode::Analysis,
            SessionState::Idle | SessionState::Error(_) => true,
        }
    }

    /// Apply a user move. Returns the backend request to dispatch, if any.
    ///
    /// Rejected moves leave both the position and the session state as
    /// they were.
    pub fn user_move(&mut self, input: MoveInput) -> Result<Option<BackendRequest>, SessionError> {
        if self.state == SessionState::GameOver {
            return Err(SessionError::GameOver);
        }
        if !self.interactive() {
            return Err(SessionError::NotInteractive);
        }

        let event = self.store.apply(&input).map_err(|e| match e {
            StoreError::IllegalMove(mv) => SessionError::IllegalMove(mv),
            StoreError::GameOver(_) => SessionError::GameOver,
        })?;
        Ok(self.on_move_event(event))
    }

    fn on_move_event(&mut self, event: MoveEvent) -> Option<BackendRequest> {
        self.engine_move = None;
        self.evaluation = None;

        if event.is_terminal() {
            // Invalidate anything still in flight from earlier analysis moves.
            self.epoch += 1;
            self.state = SessionState::GameOver;
            tracing::info!(mv = %event.uci, outcome = ?event.outcome, "Game over");
            return None;
        }

        self.epoch += 1;
        self.state = SessionState::AwaitingResponse;
        let kind = match self.mode {
            SessionMode::Analysis => RequestKind::Analyze,
            SessionMode::Play => RequestKind::BestMove,
        };
        tracing::debug!(mv = %event.uci, epoch = self.epoch, ?kind, "Issuing backend request");

        Some(BackendRequest {
            epoch: self.epoch,
            kind,
            fen: event.fen(),
        })
    }

    /// Fold a backend answer for the request tagged `epoch` into the session.
    pub fn on_response(
        &mut self,
        epoch: u64,
        result: Result<BackendReply, BackendError>,
    ) -> ResponseDisposition {
        if epoch != self.epoch || self.state != SessionState::AwaitingResponse {
            tracing::debug!(epoch, current = self.epoch, "Discarding stale response");
            return ResponseDisposition::Stale;
        }

        match result {
            Err(e) => {
                tracing::warn!(epoch, error = %e, "Backend request failed");
                self.state = SessionState::Error(BACKEND_DOWN_MESSAGE.to_string());
                ResponseDisposition::Failed
            }
            Ok(BackendReply::Evaluation(evaluation)) if self.mode == SessionMode::Analysis => {
                self.evaluation = Some(evaluation);
                self.state = SessionState::Idle;
                ResponseDisposition::Applied
            }
            Ok(BackendReply::EngineMove(reply)) if self.mode == SessionMode::Play => {
                self.apply_engine_move(reply);
                ResponseDisposition::Applied
            }
            Ok(other) => {
                tracing::warn!(epoch, reply = ?other, mode = %self.mode, "Reply does not match session mode");
                self.state = SessionState::Error(BACKEND_DOWN_MESSAGE.to_string());
                ResponseDisposition::Failed
            }
        }
    }

    /// The engine's move goes through the same legality path as the user's.
    /// A missing or rejected move leaves the position where it was.
    fn apply_engine_move(&mut self, reply: EngineMoveResult) {
        let Some(text) = reply.chosen_move else {
            tracing::warn!("Engine returned no move");
            self.state = SessionState::Idle;
            return;
        };

        let applied = MoveInput::parse_uci(&text)
            .map_err(|e| e.to_string())
            .and_then(|input| self.store.apply(&input).map_err(|e| e.to_string()));

        match applied {
            Ok(event) => {
                self.engine_move = Some(event.uci.clone());
                if event.is_terminal() {
                    tracing::info!(mv = %event.uci, outcome = ?event.outcome, "Game over");
                    self.state = SessionState::GameOver;
                } else {
                    self.state = SessionState::Idle;
                }
            }
            Err(e) => {
                tracing::warn!(mv = %text, error = %e, "Engine move rejected");
                self.state = SessionState::Idle;
            }
        }
    }

    /// Back to the starting position. Bumps the epoch so every request
    /// still in flight is ignored when it lands.
    pub fn reset(&mut self) {
        self.store.reset();
        self.evaluation = None;
        self.engine_move = None;
        self.epoch += 1;
        self.state = SessionState::Idle;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            state: self.state.clone(),
            fen: self.store.fen(),
            history: self.store.history().to_vec(),
            evaluation: self.evaluation.clone(),
            engine_move: self.engine_move.clone(),
            interactive: self.interactive(),
            outcome: self.store.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{AnalysisScore, STARTING_FEN};

    fn mv(s: &str) -> MoveInput {
        MoveInput::parse_uci(s).unwrap()
    }

    fn eval(cp: i32) -> Result<BackendReply, BackendError> {
        Ok(BackendReply::Evaluation(EvaluationResult {
            score: AnalysisScore::Centipawns(cp),
            best_move: None,
            top_moves: vec![],
        }))
    }

    fn engine(uci: &str) -> Result<BackendReply, BackendError> {
        Ok(BackendReply::EngineMove(EngineMoveResult {
            chosen_move: Some(uci.to_string()),
        }))
    }

    #[test]
    fn test_analysis_move_issues_request() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        assert_eq!(req.kind, RequestKind::Analyze);
        assert_eq!(req.fen, ctl.store().fen());
        assert_eq!(ctl.state(), &SessionState::AwaitingResponse);
        assert!(ctl.interactive());

        assert_eq!(ctl.on_response(req.epoch, eval(30)), ResponseDisposition::Applied);
        assert_eq!(ctl.state(), &SessionState::Idle);
        assert_eq!(
            ctl.evaluation().unwrap().score,
            AnalysisScore::Centipawns(30)
        );
    }

    #[test]
    fn test_overlapping_analysis_in_order() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let first = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let second = ctl.user_move(mv("e7e5")).unwrap().unwrap();
        assert!(second.epoch > first.epoch);

        assert_eq!(ctl.on_response(first.epoch, eval(10)), ResponseDisposition::Stale);
        assert_eq!(ctl.state(), &SessionState::AwaitingResponse);
        assert_eq!(ctl.on_response(second.epoch, eval(20)), ResponseDisposition::Applied);

        assert_eq!(ctl.state(), &SessionState::Idle);
        assert_eq!(ctl.evaluation().unwrap().score, AnalysisScore::Centipawns(20));
    }

    #[test]
    fn test_overlapping_analysis_out_of_order() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let first = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let second = ctl.user_move(mv("e7e5")).unwrap().unwrap();

        assert_eq!(ctl.on_response(second.epoch, eval(20)), ResponseDisposition::Applied);
        assert_eq!(ctl.on_response(first.epoch, eval(10)), ResponseDisposition::Stale);

        assert_eq!(ctl.state(), &SessionState::Idle);
        assert_eq!(ctl.evaluation().unwrap().score, AnalysisScore::Centipawns(20));
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let first = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let second = ctl.user_move(mv("e7e5")).unwrap().unwrap();

        let disposition = ctl.on_response(first.epoch, Err(BackendError::Status(500)));
        assert_eq!(disposition, ResponseDisposition::Stale);
        assert_eq!(ctl.state(), &SessionState::AwaitingResponse);
        ctl.on_response(second.epoch, eval(5));
        assert_eq!(ctl.state(), &SessionState::Idle);
    }

    #[test]
    fn test_failure_sets_error_and_next_move_clears_it() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let disposition = ctl.on_response(req.epoch, Err(BackendError::Network("refused".into())));

        assert_eq!(disposition, ResponseDisposition::Failed);
        assert_eq!(
            ctl.state(),
            &SessionState::Error(BACKEND_DOWN_MESSAGE.to_string())
        );
        assert!(ctl.interactive());

        let req = ctl.user_move(mv("e7e5")).unwrap().unwrap();
        assert_eq!(ctl.state(), &SessionState::AwaitingResponse);
        ctl.on_response(req.epoch, eval(0));
        assert_eq!(ctl.state(), &SessionState::Idle);
    }

    #[test]
    fn test_play_mode_round_trip() {
        let mut ctl = SessionController::new(SessionMode::Play);
        assert_eq!(ctl.store().fen(), STARTING_FEN);

        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        assert_eq!(req.kind, RequestKind::BestMove);
        assert!(req.fen.starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
        assert!(!ctl.interactive());

        assert_eq!(ctl.on_response(req.epoch, engine("e7e5")), ResponseDisposition::Applied);
        let snap = ctl.snapshot();
        assert_eq!(snap.state, SessionState::Idle);
        assert!(snap.interactive);
        assert_eq!(snap.history, ["e2e4", "e7e5"]);
        assert_eq!(snap.engine_move.as_deref(), Some("e7e5"));
        assert!(snap.fen.starts_with("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w"));
    }

    #[test]
    fn test_play_mode_blocks_moves_while_waiting() {
        let mut ctl = SessionController::new(SessionMode::Play);
        ctl.user_move(mv("e2e4")).unwrap();
        let fen = ctl.store().fen();

        assert_eq!(ctl.user_move(mv("d2d4")), Err(SessionError::NotInteractive));
        assert_eq!(ctl.store().fen(), fen);
    }

    #[test]
    fn test_illegal_engine_move_is_no_op() {
        let mut ctl = SessionController::new(SessionMode::Play);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let fen = ctl.store().fen();

        assert_eq!(ctl.on_response(req.epoch, engine("e2e4")), ResponseDisposition::Applied);
        assert_eq!(ctl.store().fen(), fen);
        assert_eq!(ctl.state(), &SessionState::Idle);
        assert!(ctl.interactive());
    }

    #[test]
    fn test_garbled_or_missing_engine_move_is_no_op() {
        let mut ctl = SessionController::new(SessionMode::Play);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let fen = ctl.store().fen();
        ctl.on_response(req.epoch, engine("zz"));
        assert_eq!(ctl.store().fen(), fen);

        let req = ctl.user_move(mv("d2d4")).unwrap_err();
        assert_eq!(req, SessionError::IllegalMove("d2d4".to_string()));

        let mut ctl = SessionController::new(SessionMode::Play);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        let reply = Ok(BackendReply::EngineMove(EngineMoveResult { chosen_move: None }));
        ctl.on_response(req.epoch, reply);
        assert_eq!(ctl.state(), &SessionState::Idle);
    }

    #[test]
    fn test_engine_mates_user() {
        let mut ctl = SessionController::new(SessionMode::Play);
        let req = ctl.user_move(mv("f2f3")).unwrap().unwrap();
        ctl.on_response(req.epoch, engine("e7e5"));
        let req = ctl.user_move(mv("g2g4")).unwrap().unwrap();
        ctl.on_response(req.epoch, engine("d8h4"));

        assert_eq!(ctl.state(), &SessionState::GameOver);
        assert!(!ctl.interactive());
        assert_eq!(ctl.user_move(mv("a2a3")), Err(SessionError::GameOver));
    }

    #[test]
    fn test_user_checkmate_skips_backend() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        for m in ["e2e4", "f7f6", "d2d4", "g7g5"] {
            ctl.user_move(mv(m)).unwrap();
        }
        let before = ctl.epoch();
        let request = ctl.user_move(mv("d1h5")).unwrap();

        assert_eq!(request, None);
        assert_eq!(ctl.state(), &SessionState::GameOver);
        // Earlier analysis still in flight must not land after mate.
        assert_eq!(ctl.on_response(before, eval(0)), ResponseDisposition::Stale);
        assert_eq!(ctl.state(), &SessionState::GameOver);
    }

    #[test]
    fn test_illegal_user_move_changes_nothing() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        let before = ctl.snapshot();
        let epoch = ctl.epoch();
        assert!(matches!(
            ctl.user_move(mv("e2e5")),
            Err(SessionError::IllegalMove(_))
        ));
        assert_eq!(ctl.snapshot(), before);
        assert_eq!(ctl.epoch(), epoch);
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let mut ctl = SessionController::new(SessionMode::Play);
        let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
        ctl.reset();

        assert_eq!(ctl.on_response(req.epoch, engine("e7e5")), ResponseDisposition::Stale);
        assert_eq!(ctl.store().fen(), STARTING_FEN);
        assert_eq!(ctl.state(), &SessionState::Idle);
        assert!(ctl.interactive());
    }

    #[test]
    fn test_reset_twice_equals_once() {
        let mut once = SessionController::new(SessionMode::Analysis);
        let mut twice = SessionController::new(SessionMode::Analysis);
        for ctl in [&mut once, &mut twice] {
            let req = ctl.user_move(mv("e2e4")).unwrap().unwrap();
            ctl.on_response(req.epoch, eval(15));
        }

        once.reset();
        twice.reset();
        twice.reset();
        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_reset_leaves_game_over() {
        let mut ctl = SessionController::new(SessionMode::Analysis);
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            ctl.user_move(mv(m)).unwrap();
        }
        assert_eq!(ctl.state(), &SessionState::GameOver);
        ctl.reset();
        assert_eq!(ctl.state(), &SessionState::Idle);
        assert_eq!(ctl.snapshot().outcome, None);
    }
}

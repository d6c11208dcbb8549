use chess::{AnalysisScore, GameOutcome};
use chess_client::{AnalysisResponse, MoveResponse, TopMove};

/// Which screen the session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Every move is evaluated; the board never locks.
    Analysis,
    /// The engine answers every move; the board locks while it thinks.
    Play,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analysis => f.write_str("analysis"),
            Self::Play => f.write_str("play"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
    /// Display-only; replaced by the next transition.
    Error(String),
    GameOver,
}

/// Evaluation of one position, display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub score: AnalysisScore,
    pub best_move: Option<String>,
    pub top_moves: Vec<TopMove>,
}

impl From<AnalysisResponse> for EvaluationResult {
    fn from(resp: AnalysisResponse) -> Self {
        Self {
            score: resp.evaluation.score(),
            best_move: resp.best_move,
            top_moves: resp.top_moves,
        }
    }
}

/// The engine's reply in play mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMoveResult {
    pub chosen_move: Option<String>,
}

impl From<MoveResponse> for EngineMoveResult {
    fn from(resp: MoveResponse) -> Self {
        Self {
            chosen_move: resp.best_move,
        }
    }
}

/// Everything a view needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub state: SessionState,
    pub fen: String,
    pub history: Vec<String>,
    pub evaluation: Option<EvaluationResult>,
    /// Last move the engine played, UCI.
    pub engine_move: Option<String>,
    pub interactive: bool,
    pub outcome: Option<GameOutcome>,
}

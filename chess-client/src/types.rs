//! JSON bodies exchanged with the backend.

use chess::AnalysisScore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct PositionRequest<'a> {
    pub fen: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectEngineRequest<'a> {
    pub engine: &'a str,
}

/// `POST /api/move`. `best_move` is UCI text, absent when the engine has
/// nothing to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub best_move: Option<String>,
}

/// `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub evaluation: Evaluation,
    #[serde(default)]
    pub best_move: Option<String>,
    #[serde(default)]
    pub top_moves: Vec<TopMove>,
}

/// Raw evaluation; `kind` is `"cp"` or `"mate"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i32,
}

impl Evaluation {
    pub fn centipawns(value: i32) -> Self {
        Self {
            kind: "cp".to_string(),
            value,
        }
    }

    pub fn score(&self) -> AnalysisScore {
        match self.kind.as_str() {
            "mate" => AnalysisScore::Mate(self.value),
            _ => AnalysisScore::Centipawns(self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopMove {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub notation: Option<String>,
}

/// `GET /api/engines`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnginesResponse {
    pub available_engines: Vec<String>,
    pub current_engine: String,
}

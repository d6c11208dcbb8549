//! ChessBackend trait abstraction for backend implementations

use crate::error::BackendResult;
use crate::types::{AnalysisResponse, EnginesResponse, MoveResponse};
use async_trait::async_trait;

/// Evaluation backend interface.
/// Implemented by both the real HttpBackend and MockBackend.
///
/// Methods take `&self` so requests can overlap; none of them are
/// cancellable once issued.
#[async_trait]
pub trait ChessBackend: Send + Sync {
    /// Liveness probe; `Ok` only on a 2xx answer.
    async fn health(&self) -> BackendResult<()>;

    /// Ask the active engine to pick a move for `fen`.
    async fn best_move(&self, fen: &str) -> BackendResult<MoveResponse>;

    /// Evaluate `fen` without playing anything.
    async fn analyze(&self, fen: &str) -> BackendResult<AnalysisResponse>;

    /// List available engines and the active one.
    async fn engines(&self) -> BackendResult<EnginesResponse>;

    /// Switch the active engine. Any non-2xx answer is a rejection.
    async fn select_engine(&self, engine: &str) -> BackendResult<()>;
}

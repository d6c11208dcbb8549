//! Mock ChessBackend implementation for testing

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BackendError, BackendResult};
use crate::traits::ChessBackend;
use crate::types::*;

type Responder<T> = Box<dyn Fn(&str) -> BackendResult<T> + Send>;
type DelayFn = Box<dyn Fn(&MockCall) -> Duration + Send>;

/// Mock backend for tests - only compiled in test mode or with the mock feature.
///
/// Clones share configuration and the call log, so a test can keep one
/// clone for assertions while another is handed to the code under test.
#[derive(Clone)]
pub struct MockBackend {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Default)]
struct MockResponses {
    health: Option<Responder<()>>,
    best_move: Option<Responder<MoveResponse>>,
    analyze: Option<Responder<AnalysisResponse>>,
    engines: Option<Responder<EnginesResponse>>,
    select_engine: Option<Responder<()>>,
    delay: Option<DelayFn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Health,
    BestMove { fen: String },
    Analyze { fen: String },
    Engines,
    SelectEngine { engine: String },
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the health probe response
    pub fn with_health_response<F>(self, f: F) -> Self
    where
        F: Fn() -> BackendResult<()> + Send + 'static,
    {
        self.responses.lock().unwrap().health = Some(Box::new(move |_| f()));
        self
    }

    /// Configure best_move response; the closure receives the FEN
    pub fn with_best_move_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> BackendResult<MoveResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().best_move = Some(Box::new(f));
        self
    }

    /// Configure analyze response; the closure receives the FEN
    pub fn with_analyze_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> BackendResult<AnalysisResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().analyze = Some(Box::new(f));
        self
    }

    /// Configure engines listing response
    pub fn with_engines_response<F>(self, f: F) -> Self
    where
        F: Fn() -> BackendResult<EnginesResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().engines = Some(Box::new(move |_| f()));
        self
    }

    /// Configure select_engine response; the closure receives the engine id
    pub fn with_select_engine_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> BackendResult<()> + Send + 'static,
    {
        self.responses.lock().unwrap().select_engine = Some(Box::new(f));
        self
    }

    /// Delay each answer by the returned duration (use with a paused clock)
    pub fn with_delay<F>(self, f: F) -> Self
    where
        F: Fn(&MockCall) -> Duration + Send + 'static,
    {
        self.responses.lock().unwrap().delay = Some(Box::new(f));
        self
    }

    /// Pre-configure a backend with two engines, stockfish active
    pub fn with_standard_engines(self) -> Self {
        self.with_engines_response(|| {
            Ok(EnginesResponse {
                available_engines: vec!["stockfish".to_string(), "minimax".to_string()],
                current_engine: "stockfish".to_string(),
            })
        })
        .with_select_engine_response(|engine| match engine {
            "stockfish" | "minimax" => Ok(()),
            _ => Err(BackendError::Status(400)),
        })
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    async fn respond<T>(
        &self,
        call: MockCall,
        arg: &str,
        pick: impl Fn(&MockResponses) -> Option<&Responder<T>>,
        name: &str,
    ) -> BackendResult<T> {
        self.call_log.lock().unwrap().push(call.clone());

        let delay = {
            let responses = self.responses.lock().unwrap();
            responses.delay.as_ref().map(|f| f(&call))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let responses = self.responses.lock().unwrap();
        match pick(&responses) {
            Some(f) => f(arg),
            None => Err(BackendError::NotConfigured(name.to_string())),
        }
    }
}

#[async_trait]
impl ChessBackend for MockBackend {
    async fn health(&self) -> BackendResult<()> {
        self.respond(MockCall::Health, "", |r| r.health.as_ref(), "health")
            .await
    }

    async fn best_move(&self, fen: &str) -> BackendResult<MoveResponse> {
        self.respond(
            MockCall::BestMove {
                fen: fen.to_string(),
            },
            fen,
            |r| r.best_move.as_ref(),
            "best_move",
        )
        .await
    }

    async fn analyze(&self, fen: &str) -> BackendResult<AnalysisResponse> {
        self.respond(
            MockCall::Analyze {
                fen: fen.to_string(),
            },
            fen,
            |r| r.analyze.as_ref(),
            "analyze",
        )
        .await
    }

    async fn engines(&self) -> BackendResult<EnginesResponse> {
        self.respond(MockCall::Engines, "", |r| r.engines.as_ref(), "engines")
            .await
    }

    async fn select_engine(&self, engine: &str) -> BackendResult<()> {
        self.respond(
            MockCall::SelectEngine {
                engine: engine.to_string(),
            },
            engine,
            |r| r.select_engine.as_ref(),
            "select_engine",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_calls_fail_and_are_logged() {
        let mock = MockBackend::new();
        let result = tokio_test::block_on(mock.analyze("fen"));
        assert_eq!(
            result,
            Err(BackendError::NotConfigured("analyze".to_string()))
        );
        assert_eq!(
            mock.get_calls(),
            vec![MockCall::Analyze {
                fen: "fen".to_string()
            }]
        );
    }

    #[test]
    fn clones_share_call_log() {
        let mock = MockBackend::new().with_health_response(|| Ok(()));
        let clone = mock.clone();
        tokio_test::block_on(clone.health()).unwrap();
        assert_eq!(mock.get_calls(), vec![MockCall::Health]);
        mock.clear_calls();
        assert!(clone.get_calls().is_empty());
    }

    #[test]
    fn standard_engines_reject_unknown_ids() {
        let mock = MockBackend::new().with_standard_engines();
        assert!(tokio_test::block_on(mock.select_engine("minimax")).is_ok());
        assert_eq!(
            tokio_test::block_on(mock.select_engine("leela")),
            Err(BackendError::Status(400))
        );
    }
}

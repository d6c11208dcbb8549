//! HTTP client library for the chess evaluation backend
//!
//! Provides the [`ChessBackend`] contract used by the board client and an
//! implementation over HTTP/JSON. Every failure, whether the service is
//! down, answers non-2xx or sends a malformed body, surfaces as a
//! [`BackendError`] that callers treat as "backend unreachable".
//!
//! # Example
//!
//! ```no_run
//! use chess_client::{ChessBackend, HttpBackend};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new("http://localhost:8000", Duration::from_secs(10))?;
//!     let reply = backend.best_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").await?;
//!     println!("Engine plays: {:?}", reply.best_move);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;
pub mod types;

pub use client::HttpBackend;
pub use error::{BackendError, BackendResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBackend, MockCall};
pub use traits::ChessBackend;
pub use types::{AnalysisResponse, EnginesResponse, Evaluation, MoveResponse, TopMove};

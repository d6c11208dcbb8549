//! Engine Selection Manager.
//!
//! `current_engine` only ever holds a value the backend confirmed. A
//! selection is kept as a pending candidate until the backend answers,
//! and a rejection simply drops the candidate.

use chess_client::{BackendError, BackendResult, ChessBackend, EnginesResponse};

/// Engines the backend offers and the one it is using.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub available_engines: Vec<String>,
    pub current_engine: String,
}

impl From<EnginesResponse> for EngineInfo {
    fn from(resp: EnginesResponse) -> Self {
        Self {
            available_engines: resp.available_engines,
            current_engine: resp.current_engine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Engine selection is disabled while a request is pending")]
    Busy,
    #[error("Engine list has not been loaded")]
    NotLoaded,
    #[error("No engine selection is pending")]
    NothingPending,
    #[error("Backend rejected engine {engine}: {source}")]
    Rejected {
        engine: String,
        #[source]
        source: BackendError,
    },
}

/// Outcome of starting a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStart {
    /// A request must be sent; finish with [`EngineSelector::finish_select`].
    Started,
    /// Already the confirmed engine, nothing to send.
    AlreadyCurrent,
}

#[derive(Debug, Clone, Default)]
pub struct EngineSelector {
    confirmed: Option<EngineInfo>,
    loading: bool,
    pending: Option<String>,
}

impl EngineSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last backend-confirmed info, `None` until the first load succeeds.
    pub fn info(&self) -> Option<&EngineInfo> {
        self.confirmed.as_ref()
    }

    pub fn current_engine(&self) -> Option<&str> {
        self.confirmed.as_ref().map(|i| i.current_engine.as_str())
    }

    pub fn available_engines(&self) -> &[String] {
        self.confirmed
            .as_ref()
            .map(|i| i.available_engines.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Whether the selection control should accept input.
    pub fn control_enabled(&self) -> bool {
        !self.loading && self.pending.is_none()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, result: BackendResult<EnginesResponse>) -> BackendResult<&EngineInfo> {
        self.loading = false;
        match result {
            Ok(resp) => {
                let info = EngineInfo::from(resp);
                tracing::info!(
                    current = %info.current_engine,
                    available = ?info.available_engines,
                    "Engines loaded"
                );
                Ok(&*self.confirmed.insert(info))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load engines");
                Err(e)
            }
        }
    }

    pub async fn load(&mut self, backend: &dyn ChessBackend) -> BackendResult<&EngineInfo> {
        self.begin_load();
        let result = backend.engines().await;
        self.finish_load(result)
    }

    pub fn begin_select(&mut self, engine: &str) -> Result<SelectStart, SelectionError> {
        if !self.control_enabled() {
            return Err(SelectionError::Busy);
        }
        let current = self.current_engine().ok_or(SelectionError::NotLoaded)?;
        if current == engine {
            return Ok(SelectStart::AlreadyCurrent);
        }

        tracing::debug!(engine, "Requesting engine selection");
        self.pending = Some(engine.to_string());
        Ok(SelectStart::Started)
    }

    pub fn finish_select(&mut self, result: BackendResult<()>) -> Result<(), SelectionError> {
        let engine = self.pending.take().ok_or(SelectionError::NothingPending)?;

        match result {
            Ok(()) => {
                if let Some(info) = self.confirmed.as_mut() {
                    tracing::info!(from = %info.current_engine, to = %engine, "Engine selected");
                    info.current_engine = engine;
                }
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    %engine,
                    error = %source,
                    kept = ?self.current_engine(),
                    "Engine selection rejected"
                );
                Err(SelectionError::Rejected { engine, source })
            }
        }
    }

    /// Ask the backend to switch engines; only a confirmed switch changes
    /// [`current_engine`](Self::current_engine).
    pub async fn select(
        &mut self,
        backend: &dyn ChessBackend,
        engine: &str,
    ) -> Result<(), SelectionError> {
        match self.begin_select(engine)? {
            SelectStart::AlreadyCurrent => Ok(()),
            SelectStart::Started => {
                let result = backend.select_engine(engine).await;
                self.finish_select(result)
            }
        }
    }
}

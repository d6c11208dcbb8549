use chess::MoveInput;
use tokio::sync::oneshot;

use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Board is waiting for the engine")]
    NotInteractive,
    #[error("Game is over")]
    GameOver,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    UserMove {
        input: MoveInput,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

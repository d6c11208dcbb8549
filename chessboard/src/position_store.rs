//! The authoritative board position for one screen.
//!
//! Every stored position is either the standard start or the result of a
//! move the rules accepted; a rejected move leaves the store untouched.

use std::collections::HashMap;

use chess::{GameOutcome, MoveInput, Position};

/// Emitted synchronously by [`PositionStore::apply`] for every accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    /// The accepted move as UCI text.
    pub uci: String,
    pub san: String,
    /// Position after the move.
    pub position: Position,
    pub outcome: Option<GameOutcome>,
}

impl MoveEvent {
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Game is over: {0}")]
    GameOver(GameOutcome),
}

#[derive(Debug, Clone)]
pub struct PositionStore {
    position: Position,
    history: Vec<String>,
    repetitions: HashMap<u64, u8>,
    outcome: Option<GameOutcome>,
}

impl PositionStore {
    pub fn new() -> Self {
        let position = Position::starting();
        let mut repetitions = HashMap::new();
        repetitions.insert(position.repetition_key(), 1);
        Self {
            position,
            history: Vec::new(),
            repetitions,
            outcome: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// UCI moves played since the last reset.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Back to the standard starting position with no history.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validate `input` against the rules and advance on success.
    pub fn apply(&mut self, input: &MoveInput) -> Result<MoveEvent, StoreError> {
        if let Some(outcome) = self.outcome {
            return Err(StoreError::GameOver(outcome));
        }

        let played = self
            .position
            .play(input)
            .map_err(|_| StoreError::IllegalMove(input.to_string()))?;

        let seen = self
            .repetitions
            .entry(played.position.repetition_key())
            .or_insert(0);
        *seen += 1;
        let outcome = played.outcome.or_else(|| {
            if *seen >= 3 {
                Some(GameOutcome::ThreefoldRepetition)
            } else {
                None
            }
        });

        self.position = played.position.clone();
        self.history.push(played.uci.clone());
        self.outcome = outcome;

        Ok(MoveEvent {
            uci: played.uci,
            san: played.san,
            position: played.position,
            outcome,
        })
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

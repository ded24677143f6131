use crate::Chips;

/// A rejected player action.
///
/// These are recoverable: the game state is untouched and the caller may
/// retry with a corrected payload. Every variant carries enough context to
/// render a useful message to the offending player.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error("it is not your turn to act")]
    NotPlayersTurn,
    #[error("action is not available: {0}")]
    InvalidAction(String),
    #[error("bet of {bet} is below the minimum of {min}")]
    BelowMinBet { bet: Chips, min: Chips },
    #[error("raise to {bet} is below the minimum raise to {min}")]
    BelowMinRaise { bet: Chips, min: Chips },
    #[error("bet of {bet} exceeds the maximum of {max}")]
    AboveMaxBet { bet: Chips, max: Chips },
    #[error("bet of {bet} exceeds remaining stack of {stack}")]
    InsufficientChips { bet: Chips, stack: Chips },
    #[error("selected card is not in your hand: {0}")]
    UnknownCardSelection(String),
    #[error("subset sizes do not match the required partition: {0}")]
    BadSubsetSizes(String),
    #[error("declaration is not permitted here: {0}")]
    IllegalDeclaration(String),
}

impl PlayError {
    /// Stable identifier for transport-level translation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotPlayersTurn => "not_players_turn",
            Self::InvalidAction(_) => "invalid_action",
            Self::BelowMinBet { .. } => "below_min_bet",
            Self::BelowMinRaise { .. } => "below_min_raise",
            Self::AboveMaxBet { .. } => "above_max_bet",
            Self::InsufficientChips { .. } => "insufficient_chips",
            Self::UnknownCardSelection(_) => "unknown_card_selection",
            Self::BadSubsetSizes(_) => "bad_subset_sizes",
            Self::IllegalDeclaration(_) => "illegal_declaration",
        }
    }
}

/// A defect in the rule document itself.
///
/// Fatal for the `Game` instance: the variant cannot be played as written.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("unknown evaluation type: {0}")]
    UnknownEvaluation(String),
    #[error("unknown subset: {0}")]
    UnknownSubset(String),
}

/// A broken internal invariant.
///
/// The caller should log and terminate the hand.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("deck exhausted: requested {requested}, remaining {remaining}")]
    DeckExhausted { requested: usize, remaining: usize },
    #[error("chip conservation violated: expected {expected}, found {found}")]
    ChipConservationViolated { expected: Chips, found: Chips },
    #[error("turn order underflow: no eligible actor")]
    TurnOrderUnderflow,
}

/// Any failure surfaced by the engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Error {
    /// True if the caller may retry the same operation with a fixed payload.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Play(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_errors_recoverable() {
        let error = Error::from(PlayError::NotPlayersTurn);
        assert!(error.is_recoverable());
        let error = Error::from(EngineError::TurnOrderUnderflow);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(PlayError::NotPlayersTurn.code(), "not_players_turn");
        assert_eq!(
            PlayError::BelowMinRaise { bet: 4, min: 8 }.code(),
            "below_min_raise"
        );
    }
}

use super::event::GameEvent;
use crate::cards::Card;
use crate::errors::PlayError;
use crate::rules::Declaration;
use crate::rules::SeparateSubset;
use crate::Chips;
use std::collections::BTreeMap;

/// A player's move, payload included.
///
/// Bets carry the cumulative round total, not the delta; card payloads
/// name the exact cards so the engine can validate ownership.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    /// open or raise to a cumulative round total
    Bet { to: Chips },
    Discard { cards: Vec<Card> },
    Expose { cards: Vec<Card> },
    Pass { cards: Vec<Card> },
    Separate { assignments: BTreeMap<String, Vec<Card>> },
    Declare { declaration: Declaration },
    Choose { value: String },
}

impl PlayerAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet { .. } => "bet",
            Self::Discard { .. } => "discard",
            Self::Expose { .. } => "expose",
            Self::Pass { .. } => "pass",
            Self::Separate { .. } => "separate",
            Self::Declare { .. } => "declare",
            Self::Choose { .. } => "choose",
        }
    }
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Bet { to } => write!(f, "BET {}", to),
            Self::Choose { value } => write!(f, "CHOOSE {}", value),
            Self::Declare { declaration } => write!(f, "DECLARE {}", declaration),
            other => write!(f, "{}", other.label().to_uppercase()),
        }
    }
}

/// One legal action, annotated with its legal ranges.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ActionOption {
    Fold,
    Check,
    /// chips owed beyond the current round commitment, stack-capped
    Call { amount: Chips },
    /// legal cumulative totals
    Bet { min: Chips, max: Chips },
    Discard {
        subset: String,
        min: usize,
        max: usize,
        /// all selected cards must share a rank
        matching_ranks: bool,
        /// the whole subset goes, selection is forced
        entire_subset: bool,
    },
    Expose {
        subset: String,
        number: usize,
        /// face-down cards eligible for flipping
        eligible: Vec<Card>,
    },
    Pass { subset: String, number: usize },
    Separate { subsets: Vec<SeparateSubset> },
    Declare { options: Vec<Declaration> },
    Choose { name: String, values: Vec<String> },
}

/// The outcome of `player_action`.
///
/// A rejected action leaves state untouched; the caller fixes the payload
/// and retries. `advance_step` signals that the step or round finished
/// and `advance` should be called.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<PlayError>,
    pub advance_step: bool,
    pub events: Vec<GameEvent>,
}

impl ActionResult {
    pub fn rejected(error: PlayError) -> Self {
        Self {
            success: false,
            error: Some(error),
            advance_step: false,
            events: Vec::new(),
        }
    }
    pub fn applied(advance_step: bool, events: Vec<GameEvent>) -> Self {
        Self {
            success: true,
            error: None,
            advance_step,
            events,
        }
    }
}

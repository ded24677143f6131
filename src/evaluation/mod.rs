//! Hand evaluation across every ordering a rule document can name.
//!
//! ## Orderings
//!
//! - [`Evaluation`] — the closed taxonomy: high ladders, lowball families,
//!   badugi, pip counts, wild-card high
//! - [`HandStrength`] — `(rank, ordered_rank)` plus description and cards
//! - [`Qualifier`] — minimum strength gates for split-pot shares
//!
//! ## Machinery
//!
//! - [`Ranking`] / [`Kickers`] — five-card shapes and tiebreaks
//! - [`Evaluator`] — the bitmask scan over exactly five cards
//! - `tables` — process-wide precomputed class tables, built once
//! - [`WildRule`] / [`WildSet`] — wild and bug substitution
//! - [`Selector`] — how `find_best` assembles candidate hands

mod evaluation;
mod evaluator;
mod kickers;
mod ranking;
mod selector;
mod strength;
mod tables;
mod wilds;

pub use evaluation::*;
pub use evaluator::*;
pub use kickers::*;
pub use ranking::*;
pub use selector::*;
pub use strength::*;
pub use wilds::*;

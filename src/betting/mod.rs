//! Bet accounting for a single hand.
//!
//! - [`BettingManager`] — round state, structure bounds, forced posts
//! - [`RoundPots`] / [`Pot`] — the side-pot waterfall over commitment levels
//! - [`Structure`] / [`Stakes`] — Limit, No-Limit, Pot-Limit and their sizes

mod betting;
mod pot;
mod structure;

pub use betting::*;
pub use pot::*;
pub use structure::*;

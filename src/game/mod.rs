//! The step interpreter that drives a hand.
//!
//! ## Lifecycle
//!
//! - [`Game`] — one table, one variant; `start_hand`, `player_action`,
//!   `advance`, `hand_results`
//! - [`GameState`] — waiting, dealing, betting, drawing, showdown, complete
//!
//! ## Surfaces
//!
//! - [`PlayerAction`] / [`ActionOption`] / [`ActionResult`] — the action API
//! - [`GameEvent`] — the totally ordered log the caller drains
//! - [`GameStateView`] — per-observer redacted snapshots
//! - [`HandResults`] — per-pot winners, amounts, and shown hands

mod action;
mod event;
mod game;
mod results;
mod showdown;
mod view;

pub use action::*;
pub use event::*;
pub use game::*;
pub use results::*;
pub use view::*;

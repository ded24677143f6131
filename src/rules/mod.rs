//! Declarative variant descriptions and their step graph.
//!
//! A rule document is parsed once into an immutable [`Rules`]: player
//! bounds, deck composition, forced bets, betting orders, the ordered
//! [`Step`] list the interpreter walks, and the showdown configurations.
//! Validation happens here in full; step execution assumes a well-formed
//! document.

mod condition;
mod forced;
mod rules;
mod showdown;
mod step;

pub use condition::*;
pub use forced::*;
pub use rules::*;
pub use showdown::*;
pub use step::*;

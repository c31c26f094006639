//! The Ideaboard bot: event handling services, the daily leaderboard and the
//! HTTP listener.
//!
//! Every service is generic over the three collaborator traits from
//! `ideaboard-core` (store, chat platform, language model) and receives them
//! through [`AppState`]. The `ideaboard` binary wires in the concrete
//! implementations.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod http;
pub mod leaderboard;
pub mod payments;
pub mod polling;
pub mod publish;
pub mod state;
pub mod tally;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use state::{AppState, BotSettings};

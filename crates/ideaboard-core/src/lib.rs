//! Core types and trait definitions for the Ideaboard bot.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! datastore, the chat platform and the language model are reached through
//! the traits in [`store`], [`platform`] and [`model`]; every other crate in
//! the workspace depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod callback;
pub mod conversation;
pub mod draft;
pub mod error;
pub mod event;
pub mod idea;
pub mod keyed;
pub mod markup;
pub mod model;
pub mod payment;
pub mod platform;
pub mod render;
pub mod store;
pub mod tally;

pub use error::{Error, Result};

//! PostgREST backend for the Ideaboard store.
//!
//! Talks to a hosted Postgres through its PostgREST endpoint (`/rest/v1`),
//! authenticating with a service key. The expected tables are created by
//! `schema.sql` in this crate.

mod rows;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RestConfig, RestStore};

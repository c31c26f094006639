//! The `IdeaStore` trait and the pinned-post record.
//!
//! The trait is implemented by storage backends (`ideaboard-store-sqlite`,
//! `ideaboard-store-rest`). The bot services depend on this abstraction, not
//! on any concrete backend.

use std::{fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  conversation::ConversationLogEntry,
  idea::{Idea, IdeaId, MessageRef, NewIdea, UserId},
  payment::{NewPayment, Payment},
  tally::Vote,
};

// ─── Pinned posts ────────────────────────────────────────────────────────────

/// Kinds of bot-maintained posts tracked in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinnedKind {
  Leaderboard,
}

impl PinnedKind {
  pub fn as_str(self) -> &'static str {
    match self {
      PinnedKind::Leaderboard => "leaderboard",
    }
  }
}

impl fmt::Display for PinnedKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PinnedKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "leaderboard" => Ok(PinnedKind::Leaderboard),
      other => Err(Error::UnknownPinnedKind(other.to_owned())),
    }
  }
}

/// At most one exists per [`PinnedKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedPost {
  pub kind:    PinnedKind,
  pub message: MessageRef,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the Ideaboard datastore.
///
/// Each method is a single read or a single write; the store linearises
/// individual writes but no method spans a multi-step read-modify-write.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait IdeaStore: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ideas ─────────────────────────────────────────────────────────────

  /// Persist a new idea and return it with its assigned id.
  fn create_idea(
    &self,
    input: NewIdea,
  ) -> impl Future<Output = Result<Idea, Self::Error>> + Send + '_;

  fn get_idea(
    &self,
    id: IdeaId,
  ) -> impl Future<Output = Result<Option<Idea>, Self::Error>> + Send + '_;

  /// Record where the idea's channel post lives.
  fn set_channel_post(
    &self,
    id: IdeaId,
    post: MessageRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_vote_count(
    &self,
    id: IdeaId,
    vote_count: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Set `has_priority = true` together with the new vote count.
  fn grant_priority(
    &self,
    id: IdeaId,
    vote_count: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The `limit` ideas with the highest `vote_count`, highest first.
  fn top_ideas(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Idea>, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  fn get_vote(
    &self,
    voter_id: UserId,
    idea_id: IdeaId,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Insert the vote, or overwrite the direction of the existing vote for
  /// the same `(voter_id, idea_id)` pair.
  fn upsert_vote(
    &self,
    vote: Vote,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every vote row for `idea_id`.
  fn list_votes(
    &self,
    idea_id: IdeaId,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;

  // ── Payments ──────────────────────────────────────────────────────────

  fn record_payment(
    &self,
    input: NewPayment,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + '_;

  /// Backfill the idea a pre-publication payment paid for.
  fn link_payment(
    &self,
    payment_id: i64,
    idea_id: IdeaId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn payments_by(
    &self,
    payer_id: UserId,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  // ── Conversation log ──────────────────────────────────────────────────

  fn log_turn(
    &self,
    entry: ConversationLogEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flag every logged turn of `session_id` as published.
  fn mark_session_published<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Pinned posts ──────────────────────────────────────────────────────

  fn get_pinned(
    &self,
    kind: PinnedKind,
  ) -> impl Future<Output = Result<Option<PinnedPost>, Self::Error>> + Send + '_;

  /// Insert or replace the pinned post of `post.kind`.
  fn put_pinned(
    &self,
    post: PinnedPost,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}


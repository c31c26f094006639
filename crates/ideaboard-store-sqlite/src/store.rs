//! [`SqliteStore`]: the SQLite implementation of [`IdeaStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use ideaboard_core::{
  conversation::ConversationLogEntry,
  idea::{Idea, IdeaId, MessageRef, NewIdea, UserId},
  payment::{NewPayment, Payment},
  store::{IdeaStore, PinnedKind, PinnedPost},
  tally::Vote,
};

use crate::{
  Error, Result,
  encode::{
    IDEA_COLUMNS, RawIdea, RawPayment, RawPinned, RawVote, encode_dt, encode_payment_kind,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Ideaboard store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `UPDATE ideas …` and fail if the idea does not exist.
  async fn update_idea(
    &self,
    id: IdeaId,
    sql: &'static str,
    value: i64,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![value, id])?))
      .await?;

    if changed == 0 {
      return Err(Error::IdeaNotFound(id));
    }
    Ok(())
  }
}

#[cfg(test)]
impl SqliteStore {
  /// `(turn_number, ready, published)` of each logged turn of `session_id`, in order.
  pub(crate) async fn logged_turns(&self, session_id: &str) -> Result<Vec<(u32, bool, bool)>> {
    let session_id = session_id.to_owned();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT turn_number, ready, published FROM conversation_log
           WHERE session_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![session_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── IdeaStore impl ──────────────────────────────────────────────────────────

impl IdeaStore for SqliteStore {
  type Error = Error;

  // ── Ideas ─────────────────────────────────────────────────────────────────

  async fn create_idea(&self, input: NewIdea) -> Result<Idea> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let row        = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ideas (
             owner_id, display_name, short_text, full_text,
             vote_count, has_priority, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.owner_id,
            row.display_name,
            row.short_text,
            row.full_text,
            row.vote_count,
            row.has_priority,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Idea {
      id,
      owner_id:     input.owner_id,
      display_name: input.display_name,
      short_text:   input.short_text,
      full_text:    input.full_text,
      vote_count:   input.vote_count,
      has_priority: input.has_priority,
      channel_post: None,
      created_at,
    })
  }

  async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>> {
    let raw: Option<RawIdea> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = ?1"),
            rusqlite::params![id],
            RawIdea::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawIdea::into_idea).transpose()
  }

  async fn set_channel_post(&self, id: IdeaId, post: MessageRef) -> Result<()> {
    let chat_str = post.chat.to_string();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE ideas SET channel_chat_id = ?1, channel_message_id = ?2 WHERE id = ?3",
          rusqlite::params![chat_str, post.message_id, id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::IdeaNotFound(id));
    }
    Ok(())
  }

  async fn set_vote_count(&self, id: IdeaId, vote_count: i64) -> Result<()> {
    self
      .update_idea(id, "UPDATE ideas SET vote_count = ?1 WHERE id = ?2", vote_count)
      .await
  }

  async fn grant_priority(&self, id: IdeaId, vote_count: i64) -> Result<()> {
    self
      .update_idea(
        id,
        "UPDATE ideas SET vote_count = ?1, has_priority = 1 WHERE id = ?2",
        vote_count,
      )
      .await
  }

  async fn top_ideas(&self, limit: usize) -> Result<Vec<Idea>> {
    let limit_val = limit as i64;

    let raws: Vec<RawIdea> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {IDEA_COLUMNS} FROM ideas ORDER BY vote_count DESC, id ASC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawIdea::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdea::into_idea).collect()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn get_vote(&self, voter_id: UserId, idea_id: IdeaId) -> Result<Option<Vote>> {
    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT voter_id, voter_name, idea_id, direction
             FROM votes WHERE voter_id = ?1 AND idea_id = ?2",
            rusqlite::params![voter_id, idea_id],
            RawVote::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn upsert_vote(&self, vote: Vote) -> Result<()> {
    let direction = vote.direction.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (voter_id, voter_name, idea_id, direction)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (voter_id, idea_id) DO UPDATE SET direction = excluded.direction",
          rusqlite::params![vote.voter_id, vote.voter_name, vote.idea_id, direction],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_votes(&self, idea_id: IdeaId) -> Result<Vec<Vote>> {
    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT voter_id, voter_name, idea_id, direction FROM votes WHERE idea_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![idea_id], RawVote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  async fn record_payment(&self, input: NewPayment) -> Result<Payment> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let kind_str   = encode_payment_kind(input.kind);
    let charge_id  = input.charge_id.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO payments (payer_id, idea_id, kind, amount_stars, charge_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.payer_id,
            input.idea_id,
            kind_str,
            input.amount_stars,
            charge_id,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Payment {
      id,
      payer_id:     input.payer_id,
      idea_id:      input.idea_id,
      kind:         input.kind,
      amount_stars: input.amount_stars,
      charge_id:    input.charge_id,
      created_at,
    })
  }

  async fn link_payment(&self, payment_id: i64, idea_id: IdeaId) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE payments SET idea_id = ?1 WHERE id = ?2",
          rusqlite::params![idea_id, payment_id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::PaymentNotFound(payment_id));
    }
    Ok(())
  }

  async fn payments_by(&self, payer_id: UserId) -> Result<Vec<Payment>> {
    let raws: Vec<RawPayment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, payer_id, idea_id, kind, amount_stars, charge_id, created_at
           FROM payments WHERE payer_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![payer_id], RawPayment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPayment::into_payment).collect()
  }

  // ── Conversation log ──────────────────────────────────────────────────────

  async fn log_turn(&self, entry: ConversationLogEntry) -> Result<()> {
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO conversation_log (
             session_id, user_id, user_name, turn_number,
             user_message, model_reply, ready, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            entry.session_id,
            entry.user_id,
            entry.user_name,
            entry.turn_number,
            entry.user_message,
            entry.model_reply,
            entry.ready,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn mark_session_published(&self, session_id: &str) -> Result<()> {
    let session_id = session_id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE conversation_log SET published = 1 WHERE session_id = ?1",
          rusqlite::params![session_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Pinned posts ──────────────────────────────────────────────────────────

  async fn get_pinned(&self, kind: PinnedKind) -> Result<Option<PinnedPost>> {
    let kind_str = kind.as_str();

    let raw: Option<RawPinned> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT kind, chat_id, message_id FROM pinned_posts WHERE kind = ?1",
            rusqlite::params![kind_str],
            |row| {
              Ok(RawPinned {
                kind:       row.get(0)?,
                chat_id:    row.get(1)?,
                message_id: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPinned::into_pinned).transpose()
  }

  async fn put_pinned(&self, post: PinnedPost) -> Result<()> {
    let kind_str = post.kind.as_str();
    let chat_str = post.message.chat.to_string();
    let message_id = post.message.message_id;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pinned_posts (kind, chat_id, message_id) VALUES (?1, ?2, ?3)
           ON CONFLICT (kind) DO UPDATE SET
             chat_id    = excluded.chat_id,
             message_id = excluded.message_id",
          rusqlite::params![kind_str, chat_str, message_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

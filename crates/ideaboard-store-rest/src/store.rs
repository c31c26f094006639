//! [`RestStore`]: the PostgREST implementation of [`IdeaStore`].

use std::time::Duration;

use ideaboard_core::{
  conversation::ConversationLogEntry,
  idea::{Idea, IdeaId, MessageRef, NewIdea, UserId},
  payment::{NewPayment, Payment},
  store::{IdeaStore, PinnedKind, PinnedPost},
  tally::Vote,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
  Error, Result,
  rows::{IdeaRow, NewIdeaRow, NewPaymentRow, PaymentRow, PinnedRow, VoteRow},
};

const REST_PATH: &str = "/rest/v1";

const RETURN_ROWS: &str = "return=representation";
const RETURN_NONE: &str = "return=minimal";
const UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Connection settings for a PostgREST endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
  /// Project URL, e.g. `https://example.supabase.co`.
  pub base_url:    String,
  /// Service key sent both as `apikey` and as bearer token.
  pub service_key: String,
}

/// An Ideaboard store backed by PostgREST.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RestStore {
  client: Client,
  config: RestConfig,
}

fn eq(value: impl std::fmt::Display) -> String { format!("eq.{value}") }

async fn check(method: &'static str, table: &'static str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { method, table, status: status.as_u16(), body })
}

impl RestStore {
  pub fn new(config: RestConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    tracing::debug!(base_url = %config.base_url, "using rest store");
    Ok(Self { client, config })
  }

  fn url(&self, table: &str) -> String {
    format!("{}{REST_PATH}/{table}", self.config.base_url.trim_end_matches('/'))
  }

  fn request(&self, method: Method, table: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(table))
      .header("apikey", &self.config.service_key)
      .bearer_auth(&self.config.service_key)
  }

  /// Send `req` and decode the returned rows.
  async fn rows<T: DeserializeOwned>(
    &self,
    method: &'static str,
    table: &'static str,
    req: RequestBuilder,
  ) -> Result<Vec<T>> {
    let resp = check(method, table, req.send().await?).await?;
    Ok(resp.json().await?)
  }

  /// Send `req`, discarding any body.
  async fn execute(
    &self,
    method: &'static str,
    table: &'static str,
    req: RequestBuilder,
  ) -> Result<()> {
    check(method, table, req.send().await?).await?;
    Ok(())
  }

  /// `PATCH ideas?id=eq.<id>`; fails with `IdeaNotFound` if no row matched.
  async fn patch_idea(&self, id: IdeaId, body: serde_json::Value) -> Result<()> {
    let req = self
      .request(Method::PATCH, "ideas")
      .query(&[("id", eq(id)), ("select", "id".to_owned())])
      .header("Prefer", RETURN_ROWS)
      .json(&body);

    let touched: Vec<serde_json::Value> = self.rows("PATCH", "ideas", req).await?;
    if touched.is_empty() {
      return Err(Error::IdeaNotFound(id));
    }
    Ok(())
  }
}

// ─── IdeaStore impl ──────────────────────────────────────────────────────────

impl IdeaStore for RestStore {
  type Error = Error;

  // ── Ideas ─────────────────────────────────────────────────────────────────

  async fn create_idea(&self, input: NewIdea) -> Result<Idea> {
    let req = self
      .request(Method::POST, "ideas")
      .header("Prefer", RETURN_ROWS)
      .json(&NewIdeaRow::from(&input));

    let rows: Vec<IdeaRow> = self.rows("POST", "ideas", req).await?;
    rows
      .into_iter()
      .next()
      .ok_or(Error::EmptyResponse("insert into ideas"))?
      .into_idea()
  }

  async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>> {
    let req = self
      .request(Method::GET, "ideas")
      .query(&[("id", eq(id)), ("select", "*".to_owned())]);

    let rows: Vec<IdeaRow> = self.rows("GET", "ideas", req).await?;
    rows.into_iter().next().map(IdeaRow::into_idea).transpose()
  }

  async fn set_channel_post(&self, id: IdeaId, post: MessageRef) -> Result<()> {
    self
      .patch_idea(
        id,
        json!({
          "channel_chat_id":    post.chat.to_string(),
          "channel_message_id": post.message_id,
        }),
      )
      .await
  }

  async fn set_vote_count(&self, id: IdeaId, vote_count: i64) -> Result<()> {
    self.patch_idea(id, json!({ "vote_count": vote_count })).await
  }

  async fn grant_priority(&self, id: IdeaId, vote_count: i64) -> Result<()> {
    self
      .patch_idea(id, json!({ "vote_count": vote_count, "has_priority": true }))
      .await
  }

  async fn top_ideas(&self, limit: usize) -> Result<Vec<Idea>> {
    let req = self.request(Method::GET, "ideas").query(&[
      ("select", "*".to_owned()),
      ("order", "vote_count.desc,id.asc".to_owned()),
      ("limit", limit.to_string()),
    ]);

    let rows: Vec<IdeaRow> = self.rows("GET", "ideas", req).await?;
    rows.into_iter().map(IdeaRow::into_idea).collect()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn get_vote(&self, voter_id: UserId, idea_id: IdeaId) -> Result<Option<Vote>> {
    let req = self.request(Method::GET, "votes").query(&[
      ("voter_id", eq(voter_id)),
      ("idea_id", eq(idea_id)),
      ("select", "*".to_owned()),
    ]);

    let rows: Vec<VoteRow> = self.rows("GET", "votes", req).await?;
    Ok(rows.into_iter().next().map(Vote::from))
  }

  async fn upsert_vote(&self, vote: Vote) -> Result<()> {
    let req = self
      .request(Method::POST, "votes")
      .query(&[("on_conflict", "voter_id,idea_id")])
      .header("Prefer", UPSERT)
      .json(&VoteRow::from(vote));

    self.execute("POST", "votes", req).await
  }

  async fn list_votes(&self, idea_id: IdeaId) -> Result<Vec<Vote>> {
    let req = self
      .request(Method::GET, "votes")
      .query(&[("idea_id", eq(idea_id)), ("select", "*".to_owned())]);

    let rows: Vec<VoteRow> = self.rows("GET", "votes", req).await?;
    Ok(rows.into_iter().map(Vote::from).collect())
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  async fn record_payment(&self, input: NewPayment) -> Result<Payment> {
    let req = self
      .request(Method::POST, "payments")
      .header("Prefer", RETURN_ROWS)
      .json(&NewPaymentRow::from(&input));

    let rows: Vec<PaymentRow> = self.rows("POST", "payments", req).await?;
    rows
      .into_iter()
      .next()
      .map(Payment::from)
      .ok_or(Error::EmptyResponse("insert into payments"))
  }

  async fn link_payment(&self, payment_id: i64, idea_id: IdeaId) -> Result<()> {
    let req = self
      .request(Method::PATCH, "payments")
      .query(&[("id", eq(payment_id)), ("select", "id".to_owned())])
      .header("Prefer", RETURN_ROWS)
      .json(&json!({ "idea_id": idea_id }));

    let touched: Vec<serde_json::Value> = self.rows("PATCH", "payments", req).await?;
    if touched.is_empty() {
      return Err(Error::PaymentNotFound(payment_id));
    }
    Ok(())
  }

  async fn payments_by(&self, payer_id: UserId) -> Result<Vec<Payment>> {
    let req = self.request(Method::GET, "payments").query(&[
      ("payer_id", eq(payer_id)),
      ("select", "*".to_owned()),
      ("order", "id.asc".to_owned()),
    ]);

    let rows: Vec<PaymentRow> = self.rows("GET", "payments", req).await?;
    Ok(rows.into_iter().map(Payment::from).collect())
  }

  // ── Conversation log ──────────────────────────────────────────────────────

  async fn log_turn(&self, entry: ConversationLogEntry) -> Result<()> {
    let req = self
      .request(Method::POST, "conversation_log")
      .header("Prefer", RETURN_NONE)
      .json(&json!({
        "session_id":   entry.session_id,
        "user_id":      entry.user_id,
        "user_name":    entry.user_name,
        "turn_number":  entry.turn_number,
        "user_message": entry.user_message,
        "model_reply":  entry.model_reply,
        "ready":        entry.ready,
      }));

    self.execute("POST", "conversation_log", req).await
  }

  async fn mark_session_published(&self, session_id: &str) -> Result<()> {
    let req = self
      .request(Method::PATCH, "conversation_log")
      .query(&[("session_id", eq(session_id))])
      .header("Prefer", RETURN_NONE)
      .json(&json!({ "published": true }));

    self.execute("PATCH", "conversation_log", req).await
  }

  // ── Pinned posts ──────────────────────────────────────────────────────────

  async fn get_pinned(&self, kind: PinnedKind) -> Result<Option<PinnedPost>> {
    let req = self
      .request(Method::GET, "pinned_posts")
      .query(&[("kind", eq(kind)), ("select", "*".to_owned())]);

    let rows: Vec<PinnedRow> = self.rows("GET", "pinned_posts", req).await?;
    rows.into_iter().next().map(PinnedRow::into_pinned).transpose()
  }

  async fn put_pinned(&self, post: PinnedPost) -> Result<()> {
    let req = self
      .request(Method::POST, "pinned_posts")
      .query(&[("on_conflict", "kind")])
      .header("Prefer", UPSERT)
      .json(&PinnedRow::from(&post));

    self.execute("POST", "pinned_posts", req).await
  }
}

//! Test doubles: a recording store wrapper, a recording chat platform and a
//! scripted language model.

use std::{
  collections::VecDeque,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
  },
};

use chrono::FixedOffset;
use ideaboard_core::{
  conversation::{ConversationLogEntry, Turn},
  draft::Author,
  idea::{ChatId, Idea, IdeaId, MessageRef, NewIdea, UserId},
  markup::{InlineKeyboard, Invoice, OutgoingMessage},
  model::{ChatModel, ModelError},
  payment::{NewPayment, Payment},
  platform::{ChatPlatform, PlatformError},
  render::ChannelLinks,
  store::{IdeaStore, PinnedKind, PinnedPost},
  tally::Vote,
};
use ideaboard_store_sqlite::SqliteStore;

use crate::{AppState, BotSettings};

pub const CHANNEL: ChatId = ChatId::Id(-1001234);

pub type TestState = AppState<RecordingStore, FakePlatform, ScriptedModel>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An in-memory [`SqliteStore`] that also records conversation-log writes.
/// Log writes can be told to fail.
pub struct RecordingStore {
  inner:         SqliteStore,
  logged:        Mutex<Vec<ConversationLogEntry>>,
  published:     Mutex<Vec<String>>,
  pub fail_logs: AtomicBool,
}

impl RecordingStore {
  pub async fn new() -> Self {
    Self {
      inner:     SqliteStore::open_in_memory().await.unwrap(),
      logged:    Mutex::new(Vec::new()),
      published: Mutex::new(Vec::new()),
      fail_logs: AtomicBool::new(false),
    }
  }

  /// Successfully logged turns, in order.
  pub fn logged(&self) -> Vec<ConversationLogEntry> { self.logged.lock().unwrap().clone() }

  /// Session ids marked as published, in order.
  pub fn published(&self) -> Vec<String> { self.published.lock().unwrap().clone() }

  fn log_failure() -> ideaboard_store_sqlite::Error {
    ideaboard_store_sqlite::Error::Decode("conversation log unavailable".into())
  }
}

impl IdeaStore for RecordingStore {
  type Error = ideaboard_store_sqlite::Error;

  async fn create_idea(&self, input: NewIdea) -> Result<Idea, Self::Error> {
    self.inner.create_idea(input).await
  }

  async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>, Self::Error> {
    self.inner.get_idea(id).await
  }

  async fn set_channel_post(&self, id: IdeaId, post: MessageRef) -> Result<(), Self::Error> {
    self.inner.set_channel_post(id, post).await
  }

  async fn set_vote_count(&self, id: IdeaId, vote_count: i64) -> Result<(), Self::Error> {
    self.inner.set_vote_count(id, vote_count).await
  }

  async fn grant_priority(&self, id: IdeaId, vote_count: i64) -> Result<(), Self::Error> {
    self.inner.grant_priority(id, vote_count).await
  }

  async fn top_ideas(&self, limit: usize) -> Result<Vec<Idea>, Self::Error> {
    self.inner.top_ideas(limit).await
  }

  async fn get_vote(&self, voter_id: UserId, idea_id: IdeaId) -> Result<Option<Vote>, Self::Error> {
    self.inner.get_vote(voter_id, idea_id).await
  }

  async fn upsert_vote(&self, vote: Vote) -> Result<(), Self::Error> {
    self.inner.upsert_vote(vote).await
  }

  async fn list_votes(&self, idea_id: IdeaId) -> Result<Vec<Vote>, Self::Error> {
    self.inner.list_votes(idea_id).await
  }

  async fn record_payment(&self, input: NewPayment) -> Result<Payment, Self::Error> {
    self.inner.record_payment(input).await
  }

  async fn link_payment(&self, payment_id: i64, idea_id: IdeaId) -> Result<(), Self::Error> {
    self.inner.link_payment(payment_id, idea_id).await
  }

  async fn payments_by(&self, payer_id: UserId) -> Result<Vec<Payment>, Self::Error> {
    self.inner.payments_by(payer_id).await
  }

  async fn log_turn(&self, entry: ConversationLogEntry) -> Result<(), Self::Error> {
    if self.fail_logs.load(Ordering::SeqCst) {
      return Err(Self::log_failure());
    }
    self.inner.log_turn(entry.clone()).await?;
    self.logged.lock().unwrap().push(entry);
    Ok(())
  }

  async fn mark_session_published(&self, session_id: &str) -> Result<(), Self::Error> {
    if self.fail_logs.load(Ordering::SeqCst) {
      return Err(Self::log_failure());
    }
    self.inner.mark_session_published(session_id).await?;
    self.published.lock().unwrap().push(session_id.to_owned());
    Ok(())
  }

  async fn get_pinned(&self, kind: PinnedKind) -> Result<Option<PinnedPost>, Self::Error> {
    self.inner.get_pinned(kind).await
  }

  async fn put_pinned(&self, post: PinnedPost) -> Result<(), Self::Error> {
    self.inner.put_pinned(post).await
  }
}

// ─── Platform ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Send { chat: ChatId, message: OutgoingMessage },
  EditText { target: MessageRef, message: OutgoingMessage },
  EditKeyboard { target: MessageRef, keyboard: InlineKeyboard },
  Pin(MessageRef),
  AnswerCallback { id: String, text: Option<String> },
  AnswerPreCheckout { id: String, error: Option<String> },
  Invoice { user: UserId, invoice: Invoice },
}

/// Records every call; individual operations can be told to fail.
#[derive(Default)]
pub struct FakePlatform {
  calls:             Mutex<Vec<Call>>,
  next_message_id:   AtomicI64,
  pub fail_edits:    AtomicBool,
  pub not_modified:  AtomicBool,
  pub fail_invoices: AtomicBool,
  pub fail_sends:    AtomicBool,
}

fn rejected(description: &str) -> PlatformError {
  PlatformError::Api { code: 400, description: description.to_owned() }
}

impl FakePlatform {
  fn record(&self, call: Call) { self.calls.lock().unwrap().push(call); }

  pub fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  pub fn clear(&self) { self.calls.lock().unwrap().clear(); }

  /// Messages sent, in order.
  pub fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::Send { chat, message } => Some((chat, message)),
        _ => None,
      })
      .collect()
  }

  pub fn sent_to(&self, chat: &ChatId) -> Vec<OutgoingMessage> {
    self.sent().into_iter().filter(|(c, _)| c == chat).map(|(_, m)| m).collect()
  }

  /// Texts of callback answers, in order.
  pub fn answers(&self) -> Vec<Option<String>> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::AnswerCallback { text, .. } => Some(text),
        _ => None,
      })
      .collect()
  }

  pub fn keyboard_edits(&self) -> Vec<(MessageRef, InlineKeyboard)> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::EditKeyboard { target, keyboard } => Some((target, keyboard)),
        _ => None,
      })
      .collect()
  }

  pub fn invoices(&self) -> Vec<(UserId, Invoice)> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::Invoice { user, invoice } => Some((user, invoice)),
        _ => None,
      })
      .collect()
  }

  fn edit_result(&self) -> Result<(), PlatformError> {
    if self.not_modified.load(Ordering::SeqCst) {
      return Err(PlatformError::NotModified);
    }
    if self.fail_edits.load(Ordering::SeqCst) {
      return Err(PlatformError::NotFound("message to edit not found".into()));
    }
    Ok(())
  }
}

impl ChatPlatform for FakePlatform {
  async fn send_message(
    &self,
    chat: &ChatId,
    message: &OutgoingMessage,
  ) -> Result<MessageRef, PlatformError> {
    if self.fail_sends.load(Ordering::SeqCst) {
      return Err(rejected("Forbidden: bot is not a member of the channel chat"));
    }
    self.record(Call::Send { chat: chat.clone(), message: message.clone() });
    let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 100;
    Ok(MessageRef { chat: chat.clone(), message_id })
  }

  async fn edit_message_text(
    &self,
    target: &MessageRef,
    message: &OutgoingMessage,
  ) -> Result<(), PlatformError> {
    self.record(Call::EditText { target: target.clone(), message: message.clone() });
    self.edit_result()
  }

  async fn edit_keyboard(
    &self,
    target: &MessageRef,
    keyboard: &InlineKeyboard,
  ) -> Result<(), PlatformError> {
    self.record(Call::EditKeyboard { target: target.clone(), keyboard: keyboard.clone() });
    self.edit_result()
  }

  async fn pin_message(&self, target: &MessageRef) -> Result<(), PlatformError> {
    self.record(Call::Pin(target.clone()));
    Ok(())
  }

  async fn answer_callback(
    &self,
    callback_id: &str,
    text: Option<&str>,
  ) -> Result<(), PlatformError> {
    self.record(Call::AnswerCallback {
      id:   callback_id.to_owned(),
      text: text.map(str::to_owned),
    });
    Ok(())
  }

  async fn answer_pre_checkout(
    &self,
    query_id: &str,
    error: Option<&str>,
  ) -> Result<(), PlatformError> {
    self.record(Call::AnswerPreCheckout {
      id:    query_id.to_owned(),
      error: error.map(str::to_owned),
    });
    Ok(())
  }

  async fn send_invoice(&self, user: UserId, invoice: &Invoice) -> Result<(), PlatformError> {
    if self.fail_invoices.load(Ordering::SeqCst) {
      return Err(rejected("Forbidden: bot can't initiate conversation with a user"));
    }
    self.record(Call::Invoice { user, invoice: invoice.clone() });
    Ok(())
  }
}

// ─── Model ───────────────────────────────────────────────────────────────────

/// Replies from a fixed script; `None` entries and an exhausted script fail.
#[derive(Default)]
pub struct ScriptedModel {
  replies: Mutex<VecDeque<Option<String>>>,
  prompts: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedModel {
  pub fn new<I, T>(replies: I) -> Self
  where
    I: IntoIterator<Item = Option<T>>,
    T: Into<String>,
  {
    Self {
      replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
      prompts: Mutex::new(Vec::new()),
    }
  }

  pub fn prompts(&self) -> Vec<Vec<Turn>> { self.prompts.lock().unwrap().clone() }
}

impl ChatModel for ScriptedModel {
  async fn complete(&self, turns: &[Turn]) -> Result<String, ModelError> {
    self.prompts.lock().unwrap().push(turns.to_vec());
    match self.replies.lock().unwrap().pop_front().flatten() {
      Some(reply) => Ok(reply),
      None => Err(ModelError::Rejected { status: 503, body: "scripted failure".into() }),
    }
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn settings() -> BotSettings {
  BotSettings {
    channel:        ChannelLinks { username: Some("ideas_test".into()), chat: CHANNEL },
    display_offset: FixedOffset::east_opt(3 * 3600).unwrap(),
    stars_url:      Some("https://example.com/stars".into()),
  }
}

pub async fn state_with(model: Option<ScriptedModel>) -> TestState {
  AppState::new(RecordingStore::new().await, FakePlatform::default(), model, settings())
}

pub async fn state() -> TestState { state_with(None).await }

pub fn author(user_id: UserId, name: &str) -> Author {
  Author { user_id, display_name: name.to_owned(), handle: None }
}

//! Shared state threaded through every handler.

use std::{sync::Arc, time::Instant};

use chrono::FixedOffset;
use ideaboard_core::{
  conversation::Session,
  draft::Draft,
  keyed::{KeyedStore, MemoryStore},
  model::ChatModel,
  platform::ChatPlatform,
  render::ChannelLinks,
  store::IdeaStore,
};

/// Runtime settings the services need.
#[derive(Debug, Clone)]
pub struct BotSettings {
  /// Where ideas and the leaderboard are posted.
  pub channel:        ChannelLinks,
  /// Offset used for human-readable timestamps.
  pub display_offset: FixedOffset,
  /// "Buy stars" link offered next to the publish choice.
  pub stars_url:      Option<String>,
}

pub struct AppState<S, P, M> {
  pub store:    Arc<S>,
  pub platform: Arc<P>,
  /// `None` when no language model is configured.
  pub model:    Option<Arc<M>>,
  pub sessions: Arc<dyn KeyedStore<Session>>,
  pub drafts:   Arc<dyn KeyedStore<Draft>>,
  pub settings: Arc<BotSettings>,
  pub started:  Instant,
}

impl<S, P, M> Clone for AppState<S, P, M> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      platform: Arc::clone(&self.platform),
      model:    self.model.clone(),
      sessions: Arc::clone(&self.sessions),
      drafts:   Arc::clone(&self.drafts),
      settings: Arc::clone(&self.settings),
      started:  self.started,
    }
  }
}

impl<S, P, M> AppState<S, P, M>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  /// State with fresh in-memory session and draft maps.
  pub fn new(store: S, platform: P, model: Option<M>, settings: BotSettings) -> Self {
    Self {
      store:    Arc::new(store),
      platform: Arc::new(platform),
      model:    model.map(Arc::new),
      sessions: Arc::new(MemoryStore::<Session>::new()),
      drafts:   Arc::new(MemoryStore::<Draft>::new()),
      settings: Arc::new(settings),
      started:  Instant::now(),
    }
  }
}

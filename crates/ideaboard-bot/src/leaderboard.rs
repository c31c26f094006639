//! The pinned leaderboard post and its daily refresh.

use chrono::{DateTime, Days, NaiveTime, Utc};
use ideaboard_core::{
  idea::MessageRef,
  markup::OutgoingMessage,
  model::ChatModel,
  platform::ChatPlatform,
  render,
  store::{IdeaStore, PinnedKind, PinnedPost},
};

use crate::{AppState, Error, Result};

/// Ideas shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardOutcome {
  /// No ideas yet; nothing was posted.
  Skipped,
  /// The pinned post was edited in place.
  Edited,
  /// The pinned post could not be edited; a new one replaced it.
  Recreated(MessageRef),
  /// There was no pinned post; one was created.
  Created(MessageRef),
}

pub async fn publish_leaderboard<S, P, M>(state: &AppState<S, P, M>) -> Result<LeaderboardOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let ideas = state
    .store
    .top_ideas(LEADERBOARD_SIZE)
    .await
    .map_err(Error::store)?;
  if ideas.is_empty() {
    tracing::info!("no ideas yet, leaderboard skipped");
    return Ok(LeaderboardOutcome::Skipped);
  }

  let settings = &state.settings;
  let now = Utc::now().with_timezone(&settings.display_offset);
  let message = render::leaderboard(&ideas, &settings.channel, now);

  let pinned = state
    .store
    .get_pinned(PinnedKind::Leaderboard)
    .await
    .map_err(Error::store)?;

  let Some(pinned) = pinned else {
    let posted = post_and_pin(state, &message).await?;
    tracing::info!(message_id = posted.message_id, "leaderboard created");
    return Ok(LeaderboardOutcome::Created(posted));
  };

  match state.platform.edit_message_text(&pinned.message, &message).await {
    Ok(()) => {}
    Err(e) if e.is_not_modified() => {}
    Err(e) => {
      tracing::warn!(error = %e, "leaderboard edit failed, posting a new one");
      let posted = post_and_pin(state, &message).await?;
      tracing::info!(message_id = posted.message_id, "leaderboard recreated");
      return Ok(LeaderboardOutcome::Recreated(posted));
    }
  }
  tracing::info!(message_id = pinned.message.message_id, "leaderboard updated");
  Ok(LeaderboardOutcome::Edited)
}

/// Send the leaderboard, pin it, and remember where it is.
async fn post_and_pin<S, P, M>(
  state: &AppState<S, P, M>,
  message: &OutgoingMessage,
) -> Result<MessageRef>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let posted = state.platform.send_message(&state.settings.channel.chat, message).await?;
  if let Err(e) = state.platform.pin_message(&posted).await {
    tracing::warn!(error = %e, "failed to pin leaderboard");
  }
  state
    .store
    .put_pinned(PinnedPost { kind: PinnedKind::Leaderboard, message: posted.clone() })
    .await
    .map_err(Error::store)?;
  Ok(posted)
}

/// The first `hour:00 UTC` strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
  let at = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
  let today = now.date_naive().and_time(at).and_utc();
  if today > now {
    today
  } else {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
  }
}

/// Refresh the leaderboard every day at `hour` UTC. Never returns.
pub async fn run_schedule<S, P, M>(state: AppState<S, P, M>, hour: u32)
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  loop {
    let now = Utc::now();
    let next = next_run_after(now, hour);
    tracing::debug!(%next, "next leaderboard refresh scheduled");
    let wait = (next - now).to_std().unwrap_or_default();
    tokio::time::sleep(wait).await;

    if let Err(e) = publish_leaderboard(&state).await {
      tracing::error!(error = %e, "leaderboard refresh failed");
    }
  }
}

//! Publication: draft → idea record → channel post.

use ideaboard_core::{
  draft::Draft,
  idea::{Idea, NewIdea},
  model::ChatModel,
  platform::ChatPlatform,
  render,
  store::IdeaStore,
  tally::PRIORITY_BONUS,
};

use crate::{AppState, Error, Result};

#[derive(Debug, Clone)]
pub enum PublishOutcome {
  /// The idea was stored and posted; the record carries its channel post.
  Published(Idea),
  /// The short text is below the minimum length. Nothing was written.
  TooShort,
}

/// Persist `draft` as an idea with `initial_bonus` votes and post it to the
/// channel. The caller owns the draft and removes it only on success.
pub async fn publish<S, P, M>(
  state: &AppState<S, P, M>,
  draft: &Draft,
  initial_bonus: i64,
) -> Result<PublishOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  if !draft.is_long_enough() {
    return Ok(PublishOutcome::TooShort);
  }

  let mut idea = state
    .store
    .create_idea(NewIdea {
      owner_id:     draft.author.user_id,
      display_name: draft.author.display_name.clone(),
      short_text:   draft.short_text.clone(),
      full_text:    draft.full_text.clone(),
      vote_count:   initial_bonus,
      has_priority: initial_bonus >= PRIORITY_BONUS,
    })
    .await
    .map_err(Error::store)?;

  let post = render::idea_post(&idea, &draft.author, &state.settings.display_offset);
  let posted = state.platform.send_message(&state.settings.channel.chat, &post).await?;
  state
    .store
    .set_channel_post(idea.id, posted.clone())
    .await
    .map_err(Error::store)?;
  idea.channel_post = Some(posted);

  tracing::info!(
    idea_id = idea.id,
    owner_id = idea.owner_id,
    priority = idea.has_priority,
    "idea published"
  );

  if let Some(session_id) = &draft.session_id
    && let Err(e) = state.store.mark_session_published(session_id).await
  {
    tracing::warn!(session_id, error = %e, "failed to mark session published");
  }

  Ok(PublishOutcome::Published(idea))
}

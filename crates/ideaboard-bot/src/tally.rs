//! Vote handling: one active vote per user per idea, totals recomputed from
//! the vote rows every time.

use ideaboard_core::{
  draft::Author,
  idea::{IdeaId, MessageRef},
  model::ChatModel,
  platform::ChatPlatform,
  render,
  store::IdeaStore,
  tally::{Vote, VoteCounts, VoteDirection},
};

use crate::{AppState, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
  /// The user already voted this way; nothing changed.
  AlreadyVoted,
  Counted { counts: VoteCounts, total: i64 },
}

pub async fn cast_vote<S, P, M>(
  state: &AppState<S, P, M>,
  voter: &Author,
  idea_id: IdeaId,
  direction: VoteDirection,
  fallback_post: Option<&MessageRef>,
) -> Result<VoteOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let store = &state.store;

  let existing = store
    .get_vote(voter.user_id, idea_id)
    .await
    .map_err(Error::store)?;
  if existing.is_some_and(|v| v.direction == direction) {
    return Ok(VoteOutcome::AlreadyVoted);
  }

  // Checked before the upsert so a vote for a missing idea leaves no row.
  let idea = store
    .get_idea(idea_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::IdeaNotFound(idea_id))?;

  store
    .upsert_vote(Vote {
      voter_id: voter.user_id,
      voter_name: voter.display_name.clone(),
      idea_id,
      direction,
    })
    .await
    .map_err(Error::store)?;

  let votes = store.list_votes(idea_id).await.map_err(Error::store)?;
  let counts = VoteCounts::from_votes(&votes);
  let total = counts.total(idea.has_priority);
  store.set_vote_count(idea_id, total).await.map_err(Error::store)?;

  tracing::debug!(idea_id, voter = voter.user_id, %direction, total, "vote counted");

  let target = idea.channel_post.as_ref().or(fallback_post);
  if let Some(target) = target {
    refresh_keyboard(state, target, idea_id, total, counts.down).await;
  }

  Ok(VoteOutcome::Counted { counts, total })
}

/// Re-render the vote buttons of an idea post. Failures are logged only.
pub(crate) async fn refresh_keyboard<S, P, M>(
  state: &AppState<S, P, M>,
  target: &MessageRef,
  idea_id: IdeaId,
  total: i64,
  downvotes: i64,
) where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let keyboard = render::idea_keyboard(idea_id, total, downvotes);
  match state.platform.edit_keyboard(target, &keyboard).await {
    Ok(()) => {}
    Err(e) if e.is_not_modified() => {}
    Err(e) => tracing::warn!(idea_id, error = %e, "failed to update vote buttons"),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use ideaboard_core::{draft::Draft, idea::Idea};

  use super::*;
  use crate::{
    publish::{PublishOutcome, publish},
    testing::{CHANNEL, TestState, author, state},
  };

  async fn published(s: &TestState, bonus: i64) -> Idea {
    let draft = Draft::from_message(author(1, "Owner"), "AI meme generator");
    match publish(s, &draft, bonus).await.unwrap() {
      PublishOutcome::Published(idea) => idea,
      PublishOutcome::TooShort => unreachable!(),
    }
  }

  async fn stored_count(s: &TestState, id: IdeaId) -> i64 {
    s.store.get_idea(id).await.unwrap().unwrap().vote_count
  }

  #[tokio::test]
  async fn upvote_counts_and_rerenders() {
    let s = state().await;
    let idea = published(&s, 0).await;

    let out = cast_vote(&s, &author(2, "Bo"), idea.id, VoteDirection::Up, None).await.unwrap();
    assert_eq!(out, VoteOutcome::Counted { counts: VoteCounts { up: 1, down: 0 }, total: 1 });
    assert_eq!(stored_count(&s, idea.id).await, 1);

    let edits = s.platform.keyboard_edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(Some(&edits[0].0), idea.channel_post.as_ref());
    assert_eq!(edits[0].1.rows[0][0].text, "👍 За (1)");
    assert_eq!(edits[0].1.rows[0][1].text, "👎 Против (0)");
  }

  #[tokio::test]
  async fn repeated_direction_is_a_no_op() {
    let s = state().await;
    let idea = published(&s, 0).await;
    let bo = author(2, "Bo");

    cast_vote(&s, &bo, idea.id, VoteDirection::Up, None).await.unwrap();
    s.platform.clear();
    let out = cast_vote(&s, &bo, idea.id, VoteDirection::Up, None).await.unwrap();

    assert_eq!(out, VoteOutcome::AlreadyVoted);
    assert_eq!(stored_count(&s, idea.id).await, 1);
    assert!(s.platform.calls().is_empty());
  }

  #[tokio::test]
  async fn opposite_direction_flips_the_single_row() {
    let s = state().await;
    let idea = published(&s, 0).await;
    let bo = author(2, "Bo");

    cast_vote(&s, &bo, idea.id, VoteDirection::Up, None).await.unwrap();
    let out = cast_vote(&s, &bo, idea.id, VoteDirection::Down, None).await.unwrap();

    assert_eq!(out, VoteOutcome::Counted { counts: VoteCounts { up: 0, down: 1 }, total: -1 });
    assert_eq!(s.store.list_votes(idea.id).await.unwrap().len(), 1);
    assert_eq!(stored_count(&s, idea.id).await, -1);
  }

  #[tokio::test]
  async fn total_tracks_votes_plus_bonus() {
    let s = state().await;
    let idea = published(&s, 10).await;

    for (voter, dir) in [
      (2, VoteDirection::Up),
      (3, VoteDirection::Up),
      (4, VoteDirection::Down),
      (3, VoteDirection::Down),
      (5, VoteDirection::Up),
    ] {
      cast_vote(&s, &author(voter, "v"), idea.id, dir, None).await.unwrap();
    }

    let counts = VoteCounts::from_votes(&s.store.list_votes(idea.id).await.unwrap());
    assert_eq!(counts, VoteCounts { up: 2, down: 2 });
    assert_eq!(stored_count(&s, idea.id).await, 10);
  }

  #[tokio::test]
  async fn missing_idea_is_an_error() {
    let s = state().await;
    let err = cast_vote(&s, &author(2, "Bo"), 404, VoteDirection::Up, None).await.unwrap_err();
    assert!(matches!(err, Error::IdeaNotFound(404)));
    assert!(s.store.get_vote(2, 404).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn edit_failures_are_swallowed() {
    let s = state().await;
    let idea = published(&s, 0).await;

    s.platform.not_modified.store(true, Ordering::SeqCst);
    cast_vote(&s, &author(2, "Bo"), idea.id, VoteDirection::Up, None).await.unwrap();

    s.platform.not_modified.store(false, Ordering::SeqCst);
    s.platform.fail_edits.store(true, Ordering::SeqCst);
    let out = cast_vote(&s, &author(3, "Cy"), idea.id, VoteDirection::Up, None).await.unwrap();
    assert!(matches!(out, VoteOutcome::Counted { total: 2, .. }));
  }

  #[tokio::test]
  async fn fallback_post_is_used_without_a_stored_reference() {
    let s = state().await;
    let idea = s
      .store
      .create_idea(ideaboard_core::idea::NewIdea {
        owner_id:     1,
        display_name: "Owner".into(),
        short_text:   "legacy idea".into(),
        full_text:    "legacy idea".into(),
        vote_count:   0,
        has_priority: false,
      })
      .await
      .unwrap();
    let message = MessageRef { chat: CHANNEL, message_id: 77 };

    cast_vote(&s, &author(2, "Bo"), idea.id, VoteDirection::Up, Some(&message)).await.unwrap();
    assert_eq!(s.platform.keyboard_edits()[0].0, message);
  }
}

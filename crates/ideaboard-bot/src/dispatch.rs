//! Routes each inbound event to its handler and reports handler failures.

use ideaboard_core::{
  callback::Callback,
  draft::{Author, Draft},
  event::{CallbackEvent, Event, PaymentConfirmation},
  idea::{ChatId, UserId},
  markup::OutgoingMessage,
  model::ChatModel,
  platform::{ChatPlatform, PlatformError},
  render,
  store::IdeaStore,
};

use crate::{
  AppState, Result,
  engine::{Exchange, converse},
  payments::{self, BoostRequest, BoostTarget, PaymentOutcome},
  publish::{PublishOutcome, publish},
  tally::{VoteOutcome, cast_vote},
};

/// Handle `event` on its own task.
pub fn spawn<S, P, M>(state: AppState<S, P, M>, event: Event)
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  tokio::spawn(async move { dispatch(&state, event).await });
}

/// Handle one event. Errors are logged and answered in-band, never returned.
pub async fn dispatch<S, P, M>(state: &AppState<S, P, M>, event: Event)
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let user_id = event.user_id();
  let result = match &event {
    Event::Start { from } => on_start(state, from).await,
    Event::Text { from, text } => on_text(state, from, text).await,
    Event::Callback(cb) => on_callback(state, cb).await,
    Event::PreCheckout(query) => payments::pre_checkout(state, query).await,
    Event::PaymentConfirmed(payment) => on_payment(state, payment).await,
  };

  let Err(e) = result else { return };
  tracing::error!(user_id, error = %e, "event handler failed");

  let reported = match &event {
    Event::Callback(cb) => {
      state
        .platform
        .answer_callback(&cb.id, Some(render::CALLBACK_FAILED))
        .await
    }
    Event::PreCheckout(_) => Ok(()),
    _ => reply(state, user_id, OutgoingMessage::text(render::GENERIC_ERROR)).await,
  };
  if let Err(e) = reported {
    tracing::warn!(user_id, error = %e, "failed to report handler error");
  }
}

/// Send `message` to the user's private chat.
async fn reply<S, P, M>(
  state: &AppState<S, P, M>,
  user_id: UserId,
  message: OutgoingMessage,
) -> Result<(), PlatformError>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  state.platform.send_message(&ChatId::Id(user_id), &message).await?;
  Ok(())
}

async fn on_start<S, P, M>(state: &AppState<S, P, M>, from: &Author) -> Result<()>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  if state.sessions.remove(from.user_id).is_some() {
    tracing::debug!(user_id = from.user_id, "session reset by /start");
  }
  let welcome = render::welcome(&from.display_name, &state.settings.channel);
  reply(state, from.user_id, welcome).await?;
  Ok(())
}

async fn on_text<S, P, M>(state: &AppState<S, P, M>, from: &Author, text: &str) -> Result<()>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let stars_url = state.settings.stars_url.as_deref();

  match converse(state, from, text).await {
    Exchange::Question { reply: question } => {
      reply(state, from.user_id, OutgoingMessage::text(question)).await?;
    }
    Exchange::Finalized { reply: summary, answer, session_id } => {
      reply(state, from.user_id, OutgoingMessage::text(summary)).await?;
      state
        .drafts
        .set(from.user_id, Draft::from_answer(from.clone(), answer, session_id));
      reply(state, from.user_id, render::publish_offer(render::READY_INTRO, stars_url)).await?;
    }
    Exchange::Unavailable => {
      state.drafts.set(from.user_id, Draft::from_message(from.clone(), text));
      reply(state, from.user_id, render::publish_offer(render::FALLBACK_INTRO, stars_url)).await?;
    }
  }
  Ok(())
}

async fn on_callback<S, P, M>(state: &AppState<S, P, M>, cb: &CallbackEvent) -> Result<()>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let callback = match cb.data.parse::<Callback>() {
    Ok(callback) => callback,
    Err(e) => {
      tracing::warn!(user_id = cb.from.user_id, error = %e, "ignoring callback");
      state
        .platform
        .answer_callback(&cb.id, Some(render::CALLBACK_FAILED))
        .await?;
      return Ok(());
    }
  };

  let user_id = cb.from.user_id;
  let answer = match callback {
    Callback::PublishFree => publish_free(state, cb).await?,
    Callback::PublishPriority => {
      match payments::request_boost(state, user_id, BoostTarget::PendingDraft).await {
        Ok(BoostRequest::Sent) => render::OPENING_INVOICE,
        Ok(BoostRequest::NoDraft) => render::SEND_IDEA_FIRST,
        Err(e) => {
          tracing::warn!(user_id, error = %e, "draft invoice failed");
          render::START_DIALOG_FIRST
        }
      }
    }
    Callback::Vote { direction, idea_id } => {
      match cast_vote(state, &cb.from, idea_id, direction, cb.message.as_ref()).await? {
        VoteOutcome::AlreadyVoted => {
          state
            .platform
            .answer_callback(&cb.id, Some(render::ALREADY_VOTED))
            .await?;
        }
        VoteOutcome::Counted { counts, .. } => {
          let toast = render::vote_counted(direction, counts);
          state.platform.answer_callback(&cb.id, Some(toast.as_str())).await?;
        }
      }
      return Ok(());
    }
    Callback::Boost { idea_id } => {
      match payments::request_boost(state, user_id, BoostTarget::Idea(idea_id)).await {
        Ok(_) => render::INVOICE_SENT,
        // The platform refuses to message users who never opened the bot.
        Err(e) => {
          tracing::warn!(user_id, idea_id, error = %e, "boost invoice failed");
          render::START_DIALOG_FIRST
        }
      }
    }
  };

  state.platform.answer_callback(&cb.id, Some(answer)).await?;
  Ok(())
}

/// Publish the caller's draft without a bonus and return the toast to show.
async fn publish_free<S, P, M>(state: &AppState<S, P, M>, cb: &CallbackEvent) -> Result<&'static str>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let user_id = cb.from.user_id;
  let Some(draft) = state.drafts.get(user_id) else {
    return Ok(render::SEND_IDEA_FIRST);
  };

  let idea = match publish(state, &draft, 0).await {
    Ok(PublishOutcome::Published(idea)) => idea,
    Ok(PublishOutcome::TooShort) => return Ok(render::TOO_SHORT),
    Err(e) => {
      tracing::error!(user_id, error = %e, "free publication failed");
      return Ok(render::PUBLISH_FAILED);
    }
  };
  state.drafts.remove(user_id);

  let confirmation = render::published_free(idea.id);
  let edited = match &cb.message {
    Some(offer) => state.platform.edit_message_text(offer, &confirmation).await.is_ok(),
    None => false,
  };
  if !edited {
    reply(state, user_id, confirmation).await?;
  }
  Ok(render::PUBLISHED_TOAST)
}

async fn on_payment<S, P, M>(state: &AppState<S, P, M>, payment: &PaymentConfirmation) -> Result<()>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let notice = match payments::on_payment_confirmed(state, payment).await? {
    PaymentOutcome::Published(idea) => render::published_priority(idea.id, idea.vote_count),
    PaymentOutcome::DraftMissing => OutgoingMessage::text(render::DRAFT_MISSING),
    PaymentOutcome::DraftTooShort => OutgoingMessage::text(render::TOO_SHORT),
    PaymentOutcome::Boosted { already_priority: true, .. } => {
      OutgoingMessage::text(render::ALREADY_PRIORITY)
    }
    PaymentOutcome::Boosted { .. } => OutgoingMessage::text(render::BOOSTED),
    PaymentOutcome::Unapplied => OutgoingMessage::text(render::PAYMENT_UNAPPLIED),
  };
  reply(state, payment.payer.user_id, notice).await?;
  Ok(())
}

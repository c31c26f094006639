//! Priority boosts: invoices, checkout approval and applying the bonus once
//! the payment is confirmed.

use ideaboard_core::{
  draft::Author,
  event::{PaymentConfirmation, PreCheckout},
  idea::{Idea, IdeaId, UserId},
  model::ChatModel,
  payment::{BoostPayload, NewPayment, Payment, PaymentKind},
  platform::ChatPlatform,
  render,
  store::IdeaStore,
  tally::{PRIORITY_BONUS, VoteCounts},
};

use crate::{
  AppState, Error, Result,
  publish::{PublishOutcome, publish},
  tally::refresh_keyboard,
};

/// What a boost pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostTarget {
  /// The payer's unpublished draft.
  PendingDraft,
  Idea(IdeaId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostRequest {
  Sent,
  /// `PendingDraft` was requested but the user has no draft.
  NoDraft,
}

#[derive(Debug, Clone)]
pub enum PaymentOutcome {
  /// The pending draft was published with the bonus applied.
  Published(Idea),
  DraftMissing,
  DraftTooShort,
  Boosted {
    idea_id:          IdeaId,
    vote_count:       i64,
    already_priority: bool,
  },
  /// The payload named nothing this bot can apply the payment to.
  Unapplied,
}

/// Send the payer an invoice for `target`.
pub async fn request_boost<S, P, M>(
  state: &AppState<S, P, M>,
  payer: UserId,
  target: BoostTarget,
) -> Result<BoostRequest>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let invoice = match target {
    BoostTarget::PendingDraft => {
      let Some(draft) = state.drafts.get(payer) else {
        return Ok(BoostRequest::NoDraft);
      };
      render::draft_invoice(&draft.short_text, BoostPayload::pending_draft(payer).encode()?)
    }
    BoostTarget::Idea(idea_id) => {
      render::idea_invoice(idea_id, BoostPayload::Idea { idea_id }.encode()?)
    }
  };

  state.platform.send_invoice(payer, &invoice).await?;
  tracing::info!(payer, ?target, "boost invoice sent");
  Ok(BoostRequest::Sent)
}

/// Approve a checkout whose payload this bot issued; reject anything else.
pub async fn pre_checkout<S, P, M>(state: &AppState<S, P, M>, query: &PreCheckout) -> Result<()>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let error = match BoostPayload::decode(&query.payload) {
    Ok(_) => None,
    Err(e) => {
      tracing::warn!(payer = query.from, error = %e, "rejecting checkout with unknown payload");
      Some(render::PAYLOAD_REJECTED)
    }
  };
  state.platform.answer_pre_checkout(&query.id, error).await?;
  Ok(())
}

/// Record a confirmed payment and apply it.
///
/// The payment row is written before anything else so that no charge is
/// lost, even when the payload turns out to be unusable.
pub async fn on_payment_confirmed<S, P, M>(
  state: &AppState<S, P, M>,
  confirmation: &PaymentConfirmation,
) -> Result<PaymentOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let payer = &confirmation.payer;
  let payload = BoostPayload::decode(&confirmation.payload);

  let payment = state
    .store
    .record_payment(NewPayment {
      payer_id:     payer.user_id,
      idea_id:      payload.as_ref().ok().and_then(BoostPayload::idea_id),
      kind:         PaymentKind::Priority,
      amount_stars: confirmation.total_amount,
      charge_id:    confirmation.charge_id.clone(),
    })
    .await
    .map_err(Error::store)?;
  tracing::info!(
    payment_id = payment.id,
    payer = payer.user_id,
    amount = payment.amount_stars,
    "payment recorded"
  );

  match payload {
    Ok(BoostPayload::PendingDraft { user_id, .. }) => {
      publish_paid_draft(state, payer, user_id, &payment).await
    }
    Ok(BoostPayload::Idea { idea_id }) => apply_boost(state, idea_id).await,
    Err(e) => {
      tracing::warn!(payment_id = payment.id, error = %e, "payment payload not understood");
      Ok(PaymentOutcome::Unapplied)
    }
  }
}

async fn publish_paid_draft<S, P, M>(
  state: &AppState<S, P, M>,
  payer: &Author,
  draft_owner: UserId,
  payment: &Payment,
) -> Result<PaymentOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  if draft_owner != payer.user_id {
    tracing::warn!(payer = payer.user_id, draft_owner, "payment names another user's draft");
  }
  let Some(draft) = state.drafts.get(draft_owner) else {
    return Ok(PaymentOutcome::DraftMissing);
  };

  let idea = match publish(state, &draft, PRIORITY_BONUS).await? {
    PublishOutcome::Published(idea) => idea,
    PublishOutcome::TooShort => return Ok(PaymentOutcome::DraftTooShort),
  };
  state.drafts.remove(draft_owner);

  if let Err(e) = state.store.link_payment(payment.id, idea.id).await {
    tracing::warn!(payment_id = payment.id, idea_id = idea.id, error = %e, "failed to link payment");
  }
  Ok(PaymentOutcome::Published(idea))
}

/// Grant priority to a published idea.
///
/// An idea that already has priority keeps its count: the bonus is applied at
/// most once.
pub async fn apply_boost<S, P, M>(state: &AppState<S, P, M>, idea_id: IdeaId) -> Result<PaymentOutcome>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let idea = state
    .store
    .get_idea(idea_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::IdeaNotFound(idea_id))?;

  if idea.has_priority {
    tracing::info!(idea_id, "idea already has priority");
    return Ok(PaymentOutcome::Boosted {
      idea_id,
      vote_count: idea.vote_count,
      already_priority: true,
    });
  }

  let vote_count = idea.vote_count + PRIORITY_BONUS;
  state
    .store
    .grant_priority(idea_id, vote_count)
    .await
    .map_err(Error::store)?;
  tracing::info!(idea_id, vote_count, "priority granted");

  if let Some(post) = &idea.channel_post {
    let votes = state.store.list_votes(idea_id).await.map_err(Error::store)?;
    let downvotes = VoteCounts::from_votes(&votes).down;
    refresh_keyboard(state, post, idea_id, vote_count, downvotes).await;
  }

  Ok(PaymentOutcome::Boosted { idea_id, vote_count, already_priority: false })
}

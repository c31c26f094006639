//! The refinement conversation: one model call per user message.

use chrono::Utc;
use ideaboard_core::{
  conversation::{ConversationLogEntry, FinalAnswer, Session, SessionPhase},
  draft::Author,
  model::ChatModel,
  platform::ChatPlatform,
  store::IdeaStore,
};

use crate::AppState;

/// Result of feeding one user message to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
  /// No model configured, or the call failed. The session is untouched.
  Unavailable,
  /// The model asked another question.
  Question { reply: String },
  /// The model produced a structured final answer; the session is closed.
  Finalized {
    reply:      String,
    answer:     FinalAnswer,
    session_id: String,
  },
}

pub async fn converse<S, P, M>(state: &AppState<S, P, M>, author: &Author, text: &str) -> Exchange
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let Some(model) = &state.model else {
    return Exchange::Unavailable;
  };
  let user_id = author.user_id;

  let mut session = state.sessions.get(user_id).unwrap_or_else(|| {
    tracing::info!(user_id, "starting refinement session");
    Session::new(user_id, Utc::now())
  });

  let reply = match model.complete(&session.prompt_with(text)).await {
    Ok(reply) => reply,
    Err(e) => {
      tracing::warn!(user_id, error = %e, "model call failed");
      return Exchange::Unavailable;
    }
  };

  session.record_exchange(text, &reply);
  let ready = session.is_ready();

  let store = state.store.clone();
  let entry = ConversationLogEntry {
    session_id: session.session_id.clone(),
    user_id,
    user_name: author.display_name.clone(),
    turn_number: session.question_count,
    user_message: text.to_owned(),
    model_reply: reply.clone(),
    ready,
  };
  tokio::spawn(async move {
    if let Err(e) = store.log_turn(entry).await {
      tracing::warn!(error = %e, "failed to log conversation turn");
    }
  });

  match session.assess(&reply) {
    SessionPhase::Finalized(answer) => {
      tracing::info!(user_id, session_id = %session.session_id, "refinement finished");
      state.sessions.remove(user_id);
      Exchange::Finalized { reply, answer, session_id: session.session_id }
    }
    SessionPhase::Gathering => {
      if ready {
        tracing::debug!(user_id, "reply lacks final structure; continuing");
      }
      state.sessions.set(user_id, session);
      Exchange::Question { reply }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::atomic::Ordering, time::Duration};

  use ideaboard_core::conversation::{READINESS_FLOOR, Role};

  use super::*;
  use crate::testing::{ScriptedModel, TestState, author, state, state_with};

  const FINAL: &str = "Итог.\nFULL DESCRIPTION:\nГенератор мемов для стримеров.\nSHORT DRAFT:\nИИ делает мемы из клипов";

  fn questions(n: u32) -> Vec<Option<String>> {
    (1..=n).map(|i| Some(format!("Вопрос {i}?"))).collect()
  }

  /// Log rows are written on detached tasks; wait for `n` of them.
  async fn logged_turns(s: &TestState, n: usize) -> Vec<ConversationLogEntry> {
    for _ in 0..100 {
      let mut logged = s.store.logged();
      if logged.len() >= n {
        logged.sort_by_key(|e| e.turn_number);
        return logged;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {n} logged turns, got {}", s.store.logged().len());
  }

  #[tokio::test]
  async fn unconfigured_model_is_unavailable() {
    let s = state().await;
    let out = converse(&s, &author(1, "Ann"), "идея").await;
    assert_eq!(out, Exchange::Unavailable);
    assert!(s.sessions.get(1).is_none());
  }

  #[tokio::test]
  async fn first_message_opens_session_and_asks() {
    let s = state_with(Some(ScriptedModel::new(questions(1)))).await;
    let out = converse(&s, &author(1, "Ann"), "генератор мемов").await;
    assert_eq!(out, Exchange::Question { reply: "Вопрос 1?".into() });

    let session = s.sessions.get(1).unwrap();
    assert_eq!(session.question_count, 1);
    assert_eq!(session.turns.len(), 2);

    let prompt = &s.model.as_ref().unwrap().prompts()[0];
    assert_eq!(prompt[0].role, Role::System);
    assert_eq!(prompt.last().unwrap().content, "генератор мемов");
  }

  #[tokio::test]
  async fn model_failure_leaves_session_unchanged() {
    let mut script = questions(1);
    script.push(None);
    let s = state_with(Some(ScriptedModel::new(script))).await;
    let ann = author(1, "Ann");

    converse(&s, &ann, "идея").await;
    assert_eq!(converse(&s, &ann, "ответ").await, Exchange::Unavailable);
    assert_eq!(s.sessions.get(1).unwrap().question_count, 1);
  }

  #[tokio::test]
  async fn structured_reply_before_floor_keeps_gathering() {
    let s = state_with(Some(ScriptedModel::new([Some(FINAL)]))).await;
    let out = converse(&s, &author(1, "Ann"), "идея").await;
    assert!(matches!(out, Exchange::Question { .. }));
    assert!(s.sessions.get(1).is_some());
  }

  #[tokio::test]
  async fn finalizes_only_with_structure_after_floor() {
    let mut script = questions(READINESS_FLOOR);
    // The reply at the floor is unstructured, so one more round is needed.
    script.push(Some(FINAL.to_owned()));
    let s = state_with(Some(ScriptedModel::new(script))).await;
    let ann = author(1, "Ann");

    for i in 0..READINESS_FLOOR {
      let out = converse(&s, &ann, &format!("ответ {i}")).await;
      assert!(matches!(out, Exchange::Question { .. }), "turn {i}");
    }

    let Exchange::Finalized { answer, session_id, .. } = converse(&s, &ann, "последний").await else {
      panic!("expected final answer");
    };
    assert_eq!(answer.full_text, "Генератор мемов для стримеров.");
    assert_eq!(answer.short_text, "ИИ делает мемы из клипов");
    assert!(session_id.starts_with("1_"));
    assert!(s.sessions.get(1).is_none());
  }

  #[tokio::test]
  async fn sessions_are_per_user() {
    let s = state_with(Some(ScriptedModel::new(questions(2)))).await;
    converse(&s, &author(1, "Ann"), "a").await;
    converse(&s, &author(2, "Bo"), "b").await;
    assert_eq!(s.sessions.get(1).unwrap().question_count, 1);
    assert_eq!(s.sessions.get(2).unwrap().question_count, 1);
  }

  #[tokio::test]
  async fn each_turn_is_logged_with_number_and_readiness() {
    let mut script = questions(READINESS_FLOOR);
    script.push(Some(FINAL.to_owned()));
    let s = state_with(Some(ScriptedModel::new(script))).await;
    let ann = author(1, "Ann");

    for i in 0..=READINESS_FLOOR {
      converse(&s, &ann, &format!("ответ {i}")).await;
    }

    let logged = logged_turns(&s, READINESS_FLOOR as usize + 1).await;
    let turns: Vec<(u32, bool)> = logged.iter().map(|e| (e.turn_number, e.ready)).collect();
    let expected: Vec<(u32, bool)> =
      (1..=READINESS_FLOOR + 1).map(|n| (n, n >= READINESS_FLOOR)).collect();
    assert_eq!(turns, expected);

    assert!(logged.iter().all(|e| e.session_id == logged[0].session_id && e.user_name == "Ann"));
    assert_eq!(logged[0].user_message, "ответ 0");
    assert_eq!(logged[0].model_reply, "Вопрос 1?");
    assert_eq!(logged.last().unwrap().model_reply, FINAL);
  }

  #[tokio::test]
  async fn failed_log_write_does_not_interrupt_the_conversation() {
    let s = state_with(Some(ScriptedModel::new(questions(2)))).await;
    s.store.fail_logs.store(true, Ordering::SeqCst);
    let ann = author(1, "Ann");

    assert_eq!(converse(&s, &ann, "идея").await, Exchange::Question { reply: "Вопрос 1?".into() });
    assert_eq!(converse(&s, &ann, "ответ").await, Exchange::Question { reply: "Вопрос 2?".into() });
    assert_eq!(s.sessions.get(1).unwrap().question_count, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(s.store.logged().is_empty());
  }
}

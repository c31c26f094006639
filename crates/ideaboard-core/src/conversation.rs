//! Refinement sessions and the final-answer protocol.
//!
//! A session moves from [`SessionPhase::Gathering`] to
//! [`SessionPhase::Finalized`] only when two conditions hold: at least
//! [`READINESS_FLOOR`] questions have been exchanged, and the model's latest
//! reply contains both structured sections (see [`parse_final_answer`]).
//! A reply that misses the structure keeps the session gathering no matter how
//! many turns have passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::idea::UserId;

/// Number of exchanged messages after which a final answer is accepted.
pub const READINESS_FLOOR: u32 = 7;

/// Heading that opens the full product description in a final answer.
pub const FULL_HEADING: &str = "FULL DESCRIPTION:";

/// Heading that opens the short channel-post text in a final answer.
pub const SHORT_HEADING: &str = "SHORT DRAFT:";

/// Instructions sent ahead of every session's history.
pub const SYSTEM_PROMPT: &str = "\
Ты ИИ-CTO сообщества, которое разрабатывает ИИ-продукты для геймеров и продаёт их \
на бирже цифровых товаров. Проведи с автором идеи короткое Customer Development \
интервью: задавай ровно один вопрос за сообщение, коротко и дружелюбно. Выясни \
целевую аудиторию, боль пользователя, как её решают сейчас, ключевую функцию, \
формат результата, готовность платить и чем продукт лучше альтернатив.

После седьмого ответа автора подведи итог строго в таком формате, каждый \
заголовок на отдельной строке:

FULL DESCRIPTION:
<подробное техническое задание для ИИ-разработки: аудитория, проблема, \
функции, формат результата, монетизация>

SHORT DRAFT:
<одно-два предложения для поста в канале, до 200 символов>

Не используй эти заголовки до финального ответа.";

// ─── Turns ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
  pub role:    Role,
  pub content: String,
}

impl Turn {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: Role::Assistant, content: content.into() }
  }
}

// ─── Final answer ────────────────────────────────────────────────────────────

/// The structured result of a finished refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
  pub full_text:  String,
  pub short_text: String,
}

fn is_heading(line: &str, heading: &str) -> bool {
  line
    .trim()
    .trim_matches(|c: char| c == '#' || c == '*' || c == '_')
    .trim()
    .eq_ignore_ascii_case(heading)
}

/// Extract a [`FinalAnswer`] from a model reply.
///
/// Both headings must appear on lines of their own, full before short, and
/// both sections must be non-empty. Anything else yields `None`.
pub fn parse_final_answer(reply: &str) -> Option<FinalAnswer> {
  let lines: Vec<&str> = reply.lines().collect();
  let full_at = lines.iter().position(|l| is_heading(l, FULL_HEADING))?;
  let short_at = full_at
    + 1
    + lines[full_at + 1..]
      .iter()
      .position(|l| is_heading(l, SHORT_HEADING))?;

  let full_text = lines[full_at + 1..short_at].join("\n").trim().to_owned();
  let short_text = lines[short_at + 1..].join("\n").trim().to_owned();

  if full_text.is_empty() || short_text.is_empty() {
    return None;
  }
  Some(FinalAnswer { full_text, short_text })
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
  Gathering,
  Finalized(FinalAnswer),
}

/// Per-user refinement state, held in memory only.
#[derive(Debug, Clone)]
pub struct Session {
  pub session_id:     String,
  pub owner_id:       UserId,
  pub turns:          Vec<Turn>,
  pub question_count: u32,
}

impl Session {
  pub fn new(owner_id: UserId, started_at: DateTime<Utc>) -> Self {
    Self {
      session_id: format!("{owner_id}_{}", started_at.timestamp_millis()),
      owner_id,
      turns: Vec::new(),
      question_count: 0,
    }
  }

  /// The prompt for the next model call: system prompt, history, new message.
  pub fn prompt_with(&self, message: &str) -> Vec<Turn> {
    let mut prompt = Vec::with_capacity(self.turns.len() + 2);
    prompt.push(Turn::system(SYSTEM_PROMPT));
    prompt.extend(self.turns.iter().cloned());
    prompt.push(Turn::user(message));
    prompt
  }

  /// Append a completed user/model exchange.
  pub fn record_exchange(&mut self, message: &str, reply: &str) {
    self.turns.push(Turn::user(message));
    self.turns.push(Turn::assistant(reply));
    self.question_count += 1;
  }

  pub fn is_ready(&self) -> bool { self.question_count >= READINESS_FLOOR }

  /// Decide the phase after the latest reply.
  pub fn assess(&self, reply: &str) -> SessionPhase {
    if !self.is_ready() {
      return SessionPhase::Gathering;
    }
    match parse_final_answer(reply) {
      Some(answer) => SessionPhase::Finalized(answer),
      None => SessionPhase::Gathering,
    }
  }
}

// ─── Analytics ───────────────────────────────────────────────────────────────

/// One exchange, as written to the conversation log.
#[derive(Debug, Clone)]
pub struct ConversationLogEntry {
  pub session_id:    String,
  pub user_id:       UserId,
  pub user_name:     String,
  pub turn_number:   u32,
  pub user_message:  String,
  pub model_reply:   String,
  pub ready:         bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  const FINAL: &str = "Отлично, вот итог.\n\n**FULL DESCRIPTION:**\nГенератор мемов.\nДля стримеров.\n\n### SHORT DRAFT:\nИИ делает мемы из клипов\n";

  #[test]
  fn parses_structured_reply() {
    let answer = parse_final_answer(FINAL).unwrap();
    assert_eq!(answer.full_text, "Генератор мемов.\nДля стримеров.");
    assert_eq!(answer.short_text, "ИИ делает мемы из клипов");
  }

  #[test]
  fn rejects_missing_or_reordered_sections() {
    assert!(parse_final_answer("Какая у тебя аудитория?").is_none());
    assert!(parse_final_answer("FULL DESCRIPTION:\nтекст").is_none());
    assert!(parse_final_answer("SHORT DRAFT:\na\nFULL DESCRIPTION:\nb").is_none());
    assert!(parse_final_answer("FULL DESCRIPTION:\n\nSHORT DRAFT:\nкратко").is_none());
  }

  #[test]
  fn heading_must_stand_alone() {
    assert!(parse_final_answer("FULL DESCRIPTION: всё сразу\nSHORT DRAFT: тоже").is_none());
  }

  #[test]
  fn session_id_combines_owner_and_start() {
    let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
    assert_eq!(Session::new(42, at).session_id, "42_1700000000123");
  }

  #[test]
  fn turn_count_is_only_a_floor() {
    let mut s = Session::new(1, Utc::now());
    for _ in 0..READINESS_FLOOR - 1 {
      s.record_exchange("ответ", "вопрос");
    }
    assert_eq!(s.assess(FINAL), SessionPhase::Gathering);

    s.record_exchange("ответ", "вопрос");
    assert!(s.is_ready());
    assert_eq!(s.assess("ещё вопрос?"), SessionPhase::Gathering);
    assert!(matches!(s.assess(FINAL), SessionPhase::Finalized(_)));
  }

  #[test]
  fn prompt_starts_with_system_and_ends_with_message() {
    let mut s = Session::new(1, Utc::now());
    s.record_exchange("идея", "вопрос 1");
    let prompt = s.prompt_with("ответ 1");
    assert_eq!(prompt.len(), 4);
    assert_eq!(prompt[0].role, Role::System);
    assert_eq!(prompt[3], Turn::user("ответ 1"));
  }
}

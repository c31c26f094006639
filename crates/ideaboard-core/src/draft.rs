//! Drafts: finalized ideas waiting for the owner's publish choice.

use crate::{conversation::FinalAnswer, idea::UserId};

/// Minimum length, in characters, of a publishable short text.
pub const MIN_SHORT_TEXT_CHARS: usize = 3;

/// Who is submitting an idea, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
  pub user_id:      UserId,
  pub display_name: String,
  /// Public `@handle` without the `@`, when the user has one.
  pub handle:       Option<String>,
}

impl Author {
  /// `@handle` when available, otherwise the display name.
  pub fn mention(&self) -> String {
    match &self.handle {
      Some(handle) => format!("@{handle}"),
      None => self.display_name.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
  pub author:     Author,
  pub short_text: String,
  pub full_text:  String,
  /// Refinement session that produced this draft, if any.
  pub session_id: Option<String>,
}

impl Draft {
  /// Draft built from the raw user message when no refinement took place.
  pub fn from_message(author: Author, text: &str) -> Self {
    Self {
      author,
      short_text: text.to_owned(),
      full_text:  text.to_owned(),
      session_id: None,
    }
  }

  pub fn from_answer(author: Author, answer: FinalAnswer, session_id: String) -> Self {
    Self {
      author,
      short_text: answer.short_text,
      full_text:  answer.full_text,
      session_id: Some(session_id),
    }
  }

  pub fn is_long_enough(&self) -> bool {
    self.short_text.trim().chars().count() >= MIN_SHORT_TEXT_CHARS
  }
}

//! The `ChatModel` trait: chat completion by an external language model.

use std::future::Future;

use thiserror::Error;

use crate::conversation::Turn;

#[derive(Debug, Error)]
pub enum ModelError {
  #[error("model returned an empty reply")]
  EmptyReply,

  #[error("model rejected request ({status}): {body}")]
  Rejected { status: u16, body: String },

  #[error("transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait ChatModel: Send + Sync + 'static {
  /// Produce the assistant's next reply for `turns`.
  fn complete<'a>(
    &'a self,
    turns: &'a [Turn],
  ) -> impl Future<Output = Result<String, ModelError>> + Send + 'a;
}

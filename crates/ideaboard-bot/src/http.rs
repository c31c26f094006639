//! HTTP listener: liveness endpoints and, in webhook mode, update delivery.

use axum::{
  Json, Router,
  extract::State,
  http::StatusCode,
  routing::{get, post},
};
use ideaboard_core::{model::ChatModel, platform::ChatPlatform, store::IdeaStore};
use ideaboard_telegram::{to_event, types::Update};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{AppState, dispatch};

/// Path the platform posts updates to in webhook mode.
pub const WEBHOOK_PATH: &str = "/telegram-webhook";

#[derive(Debug, Serialize)]
struct Health {
  status: &'static str,
  /// Seconds since the process started.
  uptime: u64,
}

/// Build the router. The webhook route exists only when `webhook` is set.
pub fn router<S, P, M>(state: AppState<S, P, M>, webhook: bool) -> Router
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let mut router = Router::new()
    .route("/", get(index))
    .route("/health", get(health::<S, P, M>));
  if webhook {
    router = router.route(WEBHOOK_PATH, post(telegram_webhook::<S, P, M>));
  }
  router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn index() -> &'static str { "Ideaboard bot is running" }

async fn health<S, P, M>(State(state): State<AppState<S, P, M>>) -> Json<Health>
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  Json(Health { status: "ok", uptime: state.started.elapsed().as_secs() })
}

/// Acknowledge immediately; the event is handled on its own task.
async fn telegram_webhook<S, P, M>(
  State(state): State<AppState<S, P, M>>,
  Json(update): Json<Update>,
) -> StatusCode
where
  S: IdeaStore,
  P: ChatPlatform,
  M: ChatModel,
{
  let update_id = update.update_id;
  match to_event(update) {
    Some(event) => dispatch::spawn(state, event),
    None => tracing::debug!(update_id, "ignoring update"),
  }
  StatusCode::OK
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, header},
  };
  use ideaboard_core::idea::ChatId;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;
  use crate::testing::{TestState, state};

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn post_update(body: &str) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(WEBHOOK_PATH)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_owned()))
      .unwrap()
  }

  const START: &str = r#"{"update_id": 1, "message": {
    "message_id": 1,
    "from": {"id": 42, "is_bot": false, "first_name": "Ann"},
    "chat": {"id": 42, "type": "private"},
    "text": "/start"
  }}"#;

  async fn wait_for_send(s: &TestState) {
    for _ in 0..100 {
      if !s.platform.sent().is_empty() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no message was sent");
  }

  #[tokio::test]
  async fn health_reports_ok() {
    let resp = router(state().await, false)
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].is_u64());
  }

  #[tokio::test]
  async fn root_answers_with_text() {
    let resp = router(state().await, false)
      .oneshot(Request::get("/").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn webhook_route_is_absent_in_polling_mode() {
    let resp = router(state().await, false).oneshot(post_update(START)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn webhook_dispatches_updates() {
    let s = state().await;
    let resp = router(s.clone(), true).oneshot(post_update(START)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    wait_for_send(&s).await;
    let welcome = s.platform.sent_to(&ChatId::Id(42));
    assert!(welcome[0].text.starts_with("Привет, Ann!"));
  }

  #[tokio::test]
  async fn unsupported_updates_are_acknowledged() {
    let s = state().await;
    let resp = router(s.clone(), true)
      .oneshot(post_update(r#"{"update_id": 2, "channel_post": {}}"#))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(s.platform.calls().is_empty());
  }
}

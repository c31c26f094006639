//! Translation of Bot API updates into platform-neutral events.

use ideaboard_core::{
  draft::Author,
  event::{CallbackEvent, Event, PaymentConfirmation, PreCheckout},
  idea::{ChatId, MessageRef},
};

use crate::types::{Message, Update, User};

fn author(user: &User) -> Author {
  let display_name = if !user.first_name.is_empty() {
    user.first_name.clone()
  } else {
    user.username.clone().unwrap_or_else(|| "Anonymous".to_owned())
  };
  Author { user_id: user.id, display_name, handle: user.username.clone() }
}

/// `/start`, `/start payload` or `/start@SomeBot`.
fn is_start_command(text: &str) -> bool {
  let command = text.split_whitespace().next().unwrap_or_default();
  command == "/start" || command.starts_with("/start@")
}

fn message_event(message: Message) -> Option<Event> {
  let from = author(message.from.as_ref()?);

  if let Some(payment) = message.successful_payment {
    return Some(Event::PaymentConfirmed(PaymentConfirmation {
      payer:        from,
      payload:      payment.invoice_payload,
      total_amount: payment.total_amount,
      charge_id:    payment.telegram_payment_charge_id,
    }));
  }

  let text = message.text?;
  if is_start_command(&text) {
    Some(Event::Start { from })
  } else {
    Some(Event::Text { from, text })
  }
}

/// Convert an update to an [`Event`]; kinds the bot does not handle (and
/// messages without a sender) yield `None`.
pub fn to_event(update: Update) -> Option<Event> {
  if let Some(query) = update.callback_query {
    return Some(Event::Callback(CallbackEvent {
      from:    author(&query.from),
      message: query.message.map(|m| MessageRef {
        chat:       ChatId::Id(m.chat.id),
        message_id: m.message_id,
      }),
      data:    query.data.unwrap_or_default(),
      id:      query.id,
    }));
  }

  if let Some(query) = update.pre_checkout_query {
    return Some(Event::PreCheckout(PreCheckout {
      id:      query.id,
      from:    query.from.id,
      payload: query.invoice_payload,
    }));
  }

  update.message.and_then(message_event)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn update(json: &str) -> Update { serde_json::from_str(json).unwrap() }

  #[test]
  fn start_command_variants() {
    for text in ["/start", "/start ref42", "/start@IdeaBot"] {
      let u = update(&format!(
        r#"{{"update_id":1,"message":{{"message_id":5,"date":0,
            "from":{{"id":10,"is_bot":false,"first_name":"Ann"}},
            "chat":{{"id":10,"type":"private"}},"text":"{text}"}}}}"#
      ));
      assert!(matches!(to_event(u), Some(Event::Start { .. })), "{text}");
    }
  }

  #[test]
  fn text_message_carries_author() {
    let u = update(
      r#"{"update_id":1,"message":{"message_id":5,"date":0,
          "from":{"id":10,"is_bot":false,"first_name":"Ann","username":"ann_dev"},
          "chat":{"id":10,"type":"private"},"text":"AI meme generator"}}"#,
    );
    let Some(Event::Text { from, text }) = to_event(u) else { panic!("expected text") };
    assert_eq!(text, "AI meme generator");
    assert_eq!(from.user_id, 10);
    assert_eq!(from.handle.as_deref(), Some("ann_dev"));
  }

  #[test]
  fn callback_query_with_message() {
    let u = update(
      r#"{"update_id":2,"callback_query":{"id":"cb1",
          "from":{"id":11,"is_bot":false,"first_name":"Bo"},
          "message":{"message_id":77,"date":0,"chat":{"id":-1001234,"type":"channel"}},
          "data":"vote_up_3"}}"#,
    );
    let Some(Event::Callback(cb)) = to_event(u) else { panic!("expected callback") };
    assert_eq!(cb.id, "cb1");
    assert_eq!(cb.data, "vote_up_3");
    assert_eq!(cb.message, Some(MessageRef { chat: ChatId::Id(-1001234), message_id: 77 }));
  }

  #[test]
  fn payment_updates() {
    let u = update(
      r#"{"update_id":3,"pre_checkout_query":{"id":"pc1",
          "from":{"id":12,"is_bot":false,"first_name":"Cy"},
          "currency":"XTR","total_amount":1,"invoice_payload":"{\"idea_id\":7}"}}"#,
    );
    let Some(Event::PreCheckout(q)) = to_event(u) else { panic!("expected pre-checkout") };
    assert_eq!(q.payload, r#"{"idea_id":7}"#);

    let u = update(
      r#"{"update_id":4,"message":{"message_id":9,"date":0,
          "from":{"id":12,"is_bot":false,"first_name":"Cy"},
          "chat":{"id":12,"type":"private"},
          "successful_payment":{"currency":"XTR","total_amount":1,
            "invoice_payload":"{\"idea_id\":7}","telegram_payment_charge_id":"ch_1",
            "provider_payment_charge_id":""}}}"#,
    );
    let Some(Event::PaymentConfirmed(p)) = to_event(u) else { panic!("expected payment") };
    assert_eq!(p.charge_id, "ch_1");
    assert_eq!(p.total_amount, 1);
  }

  #[test]
  fn unsupported_updates_are_ignored() {
    let sticker = update(
      r#"{"update_id":5,"message":{"message_id":1,"date":0,
          "from":{"id":1,"is_bot":false,"first_name":"A"},
          "chat":{"id":1,"type":"private"}}}"#,
    );
    assert!(to_event(sticker).is_none());
    assert!(to_event(update(r#"{"update_id":6}"#)).is_none());
  }
}

//! Rendering of every user-visible message and keyboard.
//!
//! Channel posts and the leaderboard use the platform's HTML parse mode, so
//! all user-supplied text goes through [`escape_html`] first.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};

use crate::{
  callback::Callback,
  draft::Author,
  idea::{ChatId, Idea, IdeaId},
  markup::{InlineButton, InlineKeyboard, Invoice, LabeledPrice, OutgoingMessage},
  payment::{BOOST_CURRENCY, BOOST_PRICE_STARS},
  tally::{PRIORITY_BONUS, VoteCounts, VoteDirection},
};

/// Characters of an idea's short text shown on the leaderboard.
pub const LEADERBOARD_EXCERPT_CHARS: usize = 80;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

pub const BOOST_BUTTON: &str = "🔥 ПОДНЯТЬ В ТОП за 1⭐ (+10 голосов)";

/// Escape `&`, `<` and `>` for the platform's HTML parse mode.
pub fn escape_html(text: &str) -> Cow<'_, str> { quick_xml::escape::partial_escape(text) }

fn excerpt(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}

// ─── Channel links ───────────────────────────────────────────────────────────

/// Builds public links to posts in the idea channel.
#[derive(Debug, Clone)]
pub struct ChannelLinks {
  /// Public username without the `@`, if the channel has one.
  pub username: Option<String>,
  pub chat:     ChatId,
}

impl ChannelLinks {
  pub fn channel_url(&self) -> Option<String> {
    match (&self.username, &self.chat) {
      (Some(name), _) => Some(format!("https://t.me/{name}")),
      (None, ChatId::Username(name)) => Some(format!("https://t.me/{}", name.trim_start_matches('@'))),
      (None, ChatId::Id(_)) => None,
    }
  }

  pub fn post_url(&self, message_id: i64) -> Option<String> {
    if let Some(base) = self.channel_url() {
      return Some(format!("{base}/{message_id}"));
    }
    // Private channels: `-100<internal id>` maps to `t.me/c/<internal id>`.
    match &self.chat {
      ChatId::Id(id) => id
        .to_string()
        .strip_prefix("-100")
        .map(|internal| format!("https://t.me/c/{internal}/{message_id}")),
      ChatId::Username(_) => None,
    }
  }
}

// ─── Idea posts ──────────────────────────────────────────────────────────────

/// Vote and boost buttons for an idea post.
pub fn idea_keyboard(idea_id: IdeaId, vote_count: i64, downvotes: i64) -> InlineKeyboard {
  InlineKeyboard::new()
    .row(vec![
      InlineButton::callback(
        format!("👍 За ({vote_count})"),
        Callback::Vote { direction: VoteDirection::Up, idea_id }.to_string(),
      ),
      InlineButton::callback(
        format!("👎 Против ({downvotes})"),
        Callback::Vote { direction: VoteDirection::Down, idea_id }.to_string(),
      ),
    ])
    .row(vec![InlineButton::callback(
      BOOST_BUTTON,
      Callback::Boost { idea_id }.to_string(),
    )])
}

/// The public channel post for a freshly created idea.
pub fn idea_post(idea: &Idea, author: &Author, offset: &FixedOffset) -> OutgoingMessage {
  let badge = if idea.has_priority { "🏆 " } else { "" };
  let posted_at = idea.created_at.with_timezone(offset).format(TIMESTAMP_FORMAT);
  let text = format!(
    "{badge}🤖 <b>НОВЫЙ ИИ-ПРОДУКТ</b>\n\n\
     💡 {short}\n\n\
     👤 Автор-солопренер: {mention}\n\
     💎 Доход: 25% от каждой продажи на Gaming Goods\n\n\
     📊 Голосуй ЗА чтобы ИИ-команда разработала этот продукт!\n\
     🏆 ТОП НЕДЕЛИ → разработка БЕСПЛАТНО → листинг на бирже\n\n\
     <i>🆔 {id} • {posted_at}</i>",
    short = escape_html(&idea.short_text),
    mention = escape_html(&author.mention()),
    id = idea.id,
  );
  OutgoingMessage::html(text).with_keyboard(idea_keyboard(idea.id, idea.vote_count, 0))
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

fn rank_marker(index: usize) -> String {
  match index {
    0 => "🥇".to_owned(),
    1 => "🥈".to_owned(),
    2 => "🥉".to_owned(),
    n => format!("{}.", n + 1),
  }
}

/// The pinned ranking of `ideas`, which must already be sorted.
pub fn leaderboard(ideas: &[Idea], links: &ChannelLinks, now: DateTime<FixedOffset>) -> OutgoingMessage {
  let mut text = String::from("🏆 <b>ТОП ИДЕЙ ПО ГОЛОСАМ</b>\n\n");

  for (index, idea) in ideas.iter().enumerate() {
    let summary = match idea.short_text.trim() {
      "" => "Без описания",
      s => excerpt(s, LEADERBOARD_EXCERPT_CHARS),
    };
    text.push_str(&format!(
      "{} <b>{} голосов</b>\n   {}...\n",
      rank_marker(index),
      idea.vote_count,
      escape_html(summary)
    ));
    let url = idea
      .channel_post
      .as_ref()
      .and_then(|post| links.post_url(post.message_id));
    if let Some(url) = url {
      text.push_str(&format!("   <a href=\"{url}\">Перейти →</a>\n"));
    }
    text.push('\n');
  }

  text.push_str(&format!("\n<i>Обновлено: {}</i>", now.format(TIMESTAMP_FORMAT)));
  OutgoingMessage::html(text).without_previews()
}

// ─── Conversation ────────────────────────────────────────────────────────────

pub fn welcome(first_name: &str, links: &ChannelLinks) -> OutgoingMessage {
  let text = format!(
    "Привет, {first_name}! 🤖\n\n\
     🚀 Я помогу тебе стать солопренером с ИИ-продуктом!\n\n\
     ⚡ Как это работает:\n\
     • ИИ CTO задаст 7 вопросов Customer Development\n\
     • Подготовим ТЗ для ИИ-разработки\n\
     • Опубликую идею в канале — сообщество голосует\n\
     • 🏆 ТОП недели → команда ИИ разработает БЕСПЛАТНО!\n\n\
     💎 ТЫ ПОЛУЧИШЬ:\n\
     ✅ Готовый ИИ-продукт для продажи\n\
     ✅ 25% от каждой продажи НАВСЕГДА\n\n\
     ⚡ Попасть в ТОП быстрее?\n\
     → 1⭐ = +{PRIORITY_BONUS} голосов = ПРИОРИТЕТ разработки!\n\n\
     🚀 Напиши идею ИИ-продукта:"
  );
  let message = OutgoingMessage::text(text);
  match links.channel_url() {
    Some(url) => message.with_keyboard(
      InlineKeyboard::new().row(vec![InlineButton::url("📢 Посмотреть все идеи в канале", url)]),
    ),
    None => message,
  }
}

/// Intro used when the refinement produced a final answer.
pub const READY_INTRO: &str = "🎉 Отлично! Идея твоего товара готова к публикации!";

/// Intro used when the idea was taken verbatim.
pub const FALLBACK_INTRO: &str = "💡 Отлично! Твоя идея готова к публикации.";

/// Publish choice offered once a draft exists.
pub fn publish_offer(intro: &str, stars_url: Option<&str>) -> OutgoingMessage {
  let text = format!(
    "{intro}\n\n\
     Выбери стратегию:\n\n\
     💡 Фишка: ТОП-10 идей попадают в закреплённый пост → больше видимость → быстрее в разработку!"
  );
  let mut keyboard = InlineKeyboard::new()
    .row(vec![InlineButton::callback(
      "📢 Бесплатно (с 0 голосов, медленный рост)",
      Callback::PublishFree.to_string(),
    )])
    .row(vec![InlineButton::callback(
      "🔥 ПРИОРИТЕТ за 1⭐ (+10 голосов = ТОП!)",
      Callback::PublishPriority.to_string(),
    )]);
  if let Some(url) = stars_url {
    keyboard = keyboard.row(vec![InlineButton::url("⭐ Купить звёзды (если нет)", url)]);
  }
  OutgoingMessage::text(text).with_keyboard(keyboard)
}

pub fn published_free(idea_id: IdeaId) -> OutgoingMessage {
  OutgoingMessage::text(format!(
    "✅ Опубликовано!\n\n\
     📊 ID: {idea_id} | 👍 Голосов: 0\n\n\
     ⚡ СОВЕТ: Набери 10+ голосов чтобы попасть в ТОП-лист!\n\
     Или ускорь процесс за 1⭐ (+{PRIORITY_BONUS} голосов) прямо в канале.\n\n\
     💰 Когда разработают → ты получишь 25% от выручки!"
  ))
}

pub fn published_priority(idea_id: IdeaId, vote_count: i64) -> OutgoingMessage {
  OutgoingMessage::text(format!(
    "🎉 КРАСАВЧИК! Твоя идея в ТОПе!\n\n\
     🔥 Статус: ПРИОРИТЕТ (+{PRIORITY_BONUS} голосов)\n\
     📊 ID: {idea_id} | 👍 Голосов: {vote_count}\n\n\
     🚀 Что дальше:\n\
     ✅ Следи за голосами в канале\n\
     ✅ ТОП-идеи разрабатываем ПЕРВЫМИ\n\
     ✅ Получишь прототип + 25% выручки\n\n\
     💬 Поделись постом с друзьями → больше голосов → быстрее в разработку!"
  ))
}

// ─── Payments ────────────────────────────────────────────────────────────────

const PRICE_LABEL: &str = "Приоритет";

fn boost_invoice(title: &str, description: String, payload: String) -> Invoice {
  Invoice {
    title: title.to_owned(),
    description,
    payload,
    currency: BOOST_CURRENCY.to_owned(),
    prices: vec![LabeledPrice { label: PRICE_LABEL.to_owned(), amount: BOOST_PRICE_STARS }],
  }
}

/// Invoice for publishing the pending draft with priority.
pub fn draft_invoice(short_text: &str, payload: String) -> Invoice {
  boost_invoice(
    "🔥 ТОП-приоритет для твоей идеи",
    format!(
      "✅ +{PRIORITY_BONUS} голосов СРАЗУ\n\
       ✅ Попадание в ТОП-10 (закреплённый пост)\n\
       ✅ Шанс разработки\n\
       💰 Ты заработаешь 25% от выручки!\n\n\
       \"{}...\"",
      excerpt(short_text, LEADERBOARD_EXCERPT_CHARS)
    ),
    payload,
  )
}

/// Invoice for boosting an already published idea.
pub fn idea_invoice(idea_id: IdeaId, payload: String) -> Invoice {
  boost_invoice(
    "🔥 ТОП-приоритет",
    format!("Поднять товар #{idea_id} в ТОП (+{PRIORITY_BONUS} голосов)"),
    payload,
  )
}

pub const PAYLOAD_REJECTED: &str = "Платёж не распознан. Попробуй ещё раз из меню бота.";
pub const BOOSTED: &str = "🎉 Спасибо! Твоя идея поднята в приоритет (+10 голосов)!";
pub const ALREADY_PRIORITY: &str = "🏆 Эта идея уже в приоритете. Спасибо за поддержку!";
pub const DRAFT_MISSING: &str = "❌ Черновик не найден. Попробуй отправить идею заново.";
pub const PAYMENT_UNAPPLIED: &str =
  "⚠️ Платёж получен, но не удалось понять, к какой идее его применить. Напиши нам, мы разберёмся.";

// ─── Callback toasts ─────────────────────────────────────────────────────────

pub const SEND_IDEA_FIRST: &str = "Сначала отправь свою идею";
pub const TOO_SHORT: &str = "Идея слишком короткая (минимум 3 символа)";
pub const PUBLISHED_TOAST: &str = "✅ Опубликовано!";
pub const PUBLISH_FAILED: &str = "Ошибка публикации";
pub const OPENING_INVOICE: &str = "Открываю оплату...";
pub const INVOICE_SENT: &str = "💳 Инвойс отправлен!";
pub const START_DIALOG_FIRST: &str = "⚠️ Начни диалог с ботом: /start";
pub const ALREADY_VOTED: &str = "✋ Ты уже проголосовал так!";
pub const CALLBACK_FAILED: &str = "Произошла ошибка";
pub const GENERIC_ERROR: &str = "Произошла ошибка. Попробуйте позже.";

pub fn vote_counted(direction: VoteDirection, counts: VoteCounts) -> String {
  let emoji = match direction {
    VoteDirection::Up => "👍",
    VoteDirection::Down => "👎",
  };
  format!("{emoji} Голос учтен! ({}↑ {}↓)", counts.up, counts.down)
}

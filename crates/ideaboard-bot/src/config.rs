//! Settings: an optional TOML file layered under `IDEABOARD_*` environment
//! variables, validated into [`Settings`].

use std::{collections::HashMap, path::{Path, PathBuf}};

use chrono::FixedOffset;
use ideaboard_core::{idea::ChatId, render::ChannelLinks};
use ideaboard_llm::OpenAiConfig;
use ideaboard_store_rest::RestConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::BotSettings;

const ENV_PREFIX: &str = "IDEABOARD";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LEADERBOARD_HOUR_UTC: u32 = 9;
pub const DEFAULT_DISPLAY_OFFSET_HOURS: i32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("missing required settings: {}", .0.join(", "))]
  Missing(Vec<&'static str>),

  #[error("invalid {name}: {reason}")]
  Invalid { name: &'static str, reason: String },

  #[error("failed to read configuration: {0}")]
  Source(#[from] config::ConfigError),
}

/// Settings as read, before validation. Every field is optional so that all
/// missing values can be reported at once.
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
  pub bot_token:                 Option<String>,
  pub store_url:                 Option<String>,
  pub store_key:                 Option<String>,
  pub channel_id:                Option<String>,
  pub channel_username:          Option<String>,
  pub openai_api_key:            Option<String>,
  pub openai_model:              Option<String>,
  pub webhook_domain:            Option<String>,
  pub port:                      Option<u16>,
  pub leaderboard_hour_utc:      Option<u32>,
  pub display_utc_offset_hours:  Option<i32>,
  pub stars_url:                 Option<String>,
}

/// Where ideas are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreSettings {
  Sqlite(PathBuf),
  Rest(RestConfig),
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
  pub bot_token:            String,
  pub store:                StoreSettings,
  pub bot:                  BotSettings,
  /// `None` disables refinement; ideas are then taken verbatim.
  pub openai:               Option<OpenAiConfig>,
  /// Public base URL; webhook mode when set, long polling otherwise.
  pub webhook_domain:       Option<String>,
  pub port:                 u16,
  pub leaderboard_hour_utc: u32,
}

impl Settings {
  pub fn webhook_url(&self) -> Option<String> {
    self
      .webhook_domain
      .as_deref()
      .map(|domain| format!("{}{}", domain.trim_end_matches('/'), crate::http::WEBHOOK_PATH))
  }
}

/// Read the file at `path` (if any) and the given environment.
///
/// `env` is normally `std::env::vars().collect()`; passing it explicitly
/// keeps the loader testable.
pub fn load_raw(path: Option<&Path>, env: HashMap<String, String>) -> Result<RawSettings, ConfigError> {
  // A bare PORT, as set by most hosting platforms, when ours is absent.
  let bare_port = env.get("PORT").cloned();
  let has_port = env.contains_key(&format!("{ENV_PREFIX}_PORT"));

  let mut builder = config::Config::builder();
  if let Some(path) = path {
    builder = builder.add_source(config::File::from(path));
  }
  let mut raw: RawSettings = builder
    .add_source(
      config::Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .source(Some(env.into_iter().collect())),
    )
    .build()?
    .try_deserialize()?;

  if raw.port.is_none() && !has_port
    && let Some(port) = bare_port
  {
    raw.port = Some(port.trim().parse().map_err(|e| ConfigError::Invalid {
      name:   "PORT",
      reason: format!("{e}"),
    })?);
  }
  Ok(raw)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RawSettings {
  /// The bot token alone, for helper modes that need nothing else.
  pub fn bot_token(&self) -> Result<&str, ConfigError> {
    non_empty(&self.bot_token).ok_or(ConfigError::Missing(vec!["IDEABOARD_BOT_TOKEN"]))
  }

  pub fn validate(self) -> Result<Settings, ConfigError> {
    let bot_token = non_empty(&self.bot_token);
    let store_url = non_empty(&self.store_url);
    let store_key = non_empty(&self.store_key);
    let channel_id = non_empty(&self.channel_id);

    let rest = store_url.is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"));

    let mut missing = Vec::new();
    if bot_token.is_none() {
      missing.push("IDEABOARD_BOT_TOKEN");
    }
    if store_url.is_none() {
      missing.push("IDEABOARD_STORE_URL");
    }
    if rest && store_key.is_none() {
      missing.push("IDEABOARD_STORE_KEY");
    }
    if channel_id.is_none() {
      missing.push("IDEABOARD_CHANNEL_ID");
    }
    let (Some(bot_token), Some(store_url), Some(channel_id)) = (bot_token, store_url, channel_id)
    else {
      return Err(ConfigError::Missing(missing));
    };
    if !missing.is_empty() {
      return Err(ConfigError::Missing(missing));
    }

    let store = if rest {
      StoreSettings::Rest(RestConfig {
        base_url:    store_url.to_owned(),
        service_key: store_key.unwrap_or_default().to_owned(),
      })
    } else {
      let path = store_url.strip_prefix("sqlite://").unwrap_or(store_url);
      StoreSettings::Sqlite(PathBuf::from(path))
    };

    let chat: ChatId = channel_id.parse().map_err(|e: ideaboard_core::Error| ConfigError::Invalid {
      name:   "IDEABOARD_CHANNEL_ID",
      reason: e.to_string(),
    })?;

    let offset_hours = self.display_utc_offset_hours.unwrap_or(DEFAULT_DISPLAY_OFFSET_HOURS);
    let display_offset = (-12..=14)
      .contains(&offset_hours)
      .then(|| FixedOffset::east_opt(offset_hours * 3600))
      .flatten()
      .ok_or_else(|| ConfigError::Invalid {
        name:   "IDEABOARD_DISPLAY_UTC_OFFSET_HOURS",
        reason: format!("{offset_hours} is outside -12..=14"),
      })?;

    let leaderboard_hour_utc = self.leaderboard_hour_utc.unwrap_or(DEFAULT_LEADERBOARD_HOUR_UTC);
    if leaderboard_hour_utc > 23 {
      return Err(ConfigError::Invalid {
        name:   "IDEABOARD_LEADERBOARD_HOUR_UTC",
        reason: format!("{leaderboard_hour_utc} is not an hour of the day"),
      });
    }

    let openai = non_empty(&self.openai_api_key).map(|key| {
      let mut config = OpenAiConfig::new(key);
      if let Some(model) = non_empty(&self.openai_model) {
        config.model = model.to_owned();
      }
      config
    });

    let bot = BotSettings {
      channel: ChannelLinks {
        username: non_empty(&self.channel_username).map(|u| u.trim_start_matches('@').to_owned()),
        chat,
      },
      display_offset,
      stars_url: non_empty(&self.stars_url).map(str::to_owned),
    };

    Ok(Settings {
      bot_token: bot_token.to_owned(),
      store,
      bot,
      openai,
      webhook_domain: non_empty(&self.webhook_domain).map(str::to_owned),
      port: self.port.unwrap_or(DEFAULT_PORT),
      leaderboard_hour_utc,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn minimal() -> Vec<(&'static str, &'static str)> {
    vec![
      ("IDEABOARD_BOT_TOKEN", "123:abc"),
      ("IDEABOARD_STORE_URL", "ideas.db"),
      ("IDEABOARD_CHANNEL_ID", "-1001234"),
    ]
  }

  fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
    load_raw(None, env(pairs))?.validate()
  }

  #[test]
  fn minimal_environment_uses_defaults() {
    let s = load(&minimal()).unwrap();
    assert_eq!(s.bot_token, "123:abc");
    assert_eq!(s.store, StoreSettings::Sqlite("ideas.db".into()));
    assert_eq!(s.bot.channel.chat, ChatId::Id(-1001234));
    assert_eq!(s.port, DEFAULT_PORT);
    assert_eq!(s.leaderboard_hour_utc, 9);
    assert_eq!(s.bot.display_offset.local_minus_utc(), 3 * 3600);
    assert!(s.openai.is_none());
    assert!(s.webhook_url().is_none());
  }

  #[test]
  fn every_missing_setting_is_named() {
    let err = load(&[]).unwrap_err();
    let ConfigError::Missing(names) = &err else { panic!("unexpected {err}") };
    assert_eq!(names, &["IDEABOARD_BOT_TOKEN", "IDEABOARD_STORE_URL", "IDEABOARD_CHANNEL_ID"]);
    assert!(err.to_string().contains("IDEABOARD_STORE_URL"));
  }

  #[test]
  fn rest_store_requires_key() {
    let mut pairs = minimal();
    pairs[1] = ("IDEABOARD_STORE_URL", "https://db.example.com");
    let err = load(&pairs).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(ref n) if n == &["IDEABOARD_STORE_KEY"]));

    pairs.push(("IDEABOARD_STORE_KEY", "secret"));
    let s = load(&pairs).unwrap();
    assert_eq!(
      s.store,
      StoreSettings::Rest(RestConfig {
        base_url:    "https://db.example.com".into(),
        service_key: "secret".into(),
      })
    );
  }

  #[test]
  fn sqlite_scheme_is_stripped() {
    let mut pairs = minimal();
    pairs[1] = ("IDEABOARD_STORE_URL", "sqlite:///var/lib/ideas.db");
    assert_eq!(load(&pairs).unwrap().store, StoreSettings::Sqlite("/var/lib/ideas.db".into()));
  }

  #[test]
  fn optional_settings_are_applied() {
    let mut pairs = minimal();
    pairs.extend([
      ("IDEABOARD_CHANNEL_USERNAME", "@ideas"),
      ("IDEABOARD_OPENAI_API_KEY", "sk-test"),
      ("IDEABOARD_OPENAI_MODEL", "gpt-4o"),
      ("IDEABOARD_WEBHOOK_DOMAIN", "https://bot.example.com/"),
      ("IDEABOARD_PORT", "8080"),
      ("IDEABOARD_LEADERBOARD_HOUR_UTC", "18"),
      ("IDEABOARD_DISPLAY_UTC_OFFSET_HOURS", "-5"),
      ("IDEABOARD_STARS_URL", "https://example.com/stars"),
    ]);
    let s = load(&pairs).unwrap();
    assert_eq!(s.bot.channel.username.as_deref(), Some("ideas"));
    let openai = s.openai.as_ref().unwrap();
    assert_eq!(openai.api_key, "sk-test");
    assert_eq!(openai.model, "gpt-4o");
    assert_eq!(s.webhook_url().as_deref(), Some("https://bot.example.com/telegram-webhook"));
    assert_eq!(s.port, 8080);
    assert_eq!(s.leaderboard_hour_utc, 18);
    assert_eq!(s.bot.display_offset.local_minus_utc(), -5 * 3600);
    assert_eq!(s.bot.stars_url.as_deref(), Some("https://example.com/stars"));
  }

  #[test]
  fn bare_port_is_a_fallback() {
    let mut pairs = minimal();
    pairs.push(("PORT", "9000"));
    assert_eq!(load(&pairs).unwrap().port, 9000);

    pairs.push(("IDEABOARD_PORT", "8080"));
    assert_eq!(load(&pairs).unwrap().port, 8080);
  }

  #[test]
  fn out_of_range_values_are_rejected() {
    let mut pairs = minimal();
    pairs.push(("IDEABOARD_LEADERBOARD_HOUR_UTC", "24"));
    assert!(matches!(load(&pairs), Err(ConfigError::Invalid { .. })));

    let mut pairs = minimal();
    pairs.push(("IDEABOARD_DISPLAY_UTC_OFFSET_HOURS", "15"));
    assert!(matches!(load(&pairs), Err(ConfigError::Invalid { .. })));

    let mut pairs = minimal();
    pairs[2] = ("IDEABOARD_CHANNEL_ID", "ideas");
    assert!(matches!(load(&pairs), Err(ConfigError::Invalid { .. })));
  }

  #[test]
  fn environment_overrides_file() {
    let mut file = temp_config("override.toml");
    writeln!(file.1, "bot_token = \"from-file\"\nstore_url = \"file.db\"\nchannel_id = \"@ideas\"").unwrap();

    let raw = load_raw(Some(&file.0), env(&[("IDEABOARD_BOT_TOKEN", "from-env")])).unwrap();
    let s = raw.validate().unwrap();
    assert_eq!(s.bot_token, "from-env");
    assert_eq!(s.store, StoreSettings::Sqlite("file.db".into()));
    assert_eq!(s.bot.channel.chat, ChatId::Username("@ideas".into()));
    std::fs::remove_file(&file.0).ok();
  }

  #[test]
  fn missing_file_is_an_error() {
    let path = Path::new("/nonexistent/ideaboard.toml");
    assert!(matches!(load_raw(Some(path), HashMap::new()), Err(ConfigError::Source(_))));
  }

  fn temp_config(name: &str) -> (PathBuf, std::fs::File) {
    let path = std::env::temp_dir().join(format!("ideaboard-{}-{name}", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    (path, file)
  }
}

//! ideaboard bot binary.
//!
//! Reads settings from `IDEABOARD_*` environment variables (optionally layered
//! over a TOML file given with `--config`), opens the configured store, and
//! serves the bot in webhook or long-polling mode next to the health
//! endpoints.
//!
//! # Finding the channel id
//!
//! ```
//! IDEABOARD_BOT_TOKEN=… ideaboard --resolve-channel @mychannel
//! ```

use std::{collections::HashMap, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use ideaboard_bot::{
  AppState,
  config::{self, Settings, StoreSettings},
  dispatch, http, leaderboard, polling,
};
use ideaboard_core::{idea::ChatId, store::IdeaStore};
use ideaboard_llm::OpenAiClient;
use ideaboard_store_rest::RestStore;
use ideaboard_store_sqlite::SqliteStore;
use ideaboard_telegram::TelegramClient;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Idea submission and voting bot")]
struct Cli {
  /// Optional TOML file with settings; environment variables take precedence.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Print the numeric id of a channel (`@name`) and exit.
  #[arg(long, value_name = "CHANNEL")]
  resolve_channel: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let env: HashMap<String, String> = std::env::vars().collect();
  let raw = config::load_raw(cli.config.as_deref(), env).context("failed to load configuration")?;

  // Helper mode: look up a channel id and exit.
  if let Some(channel) = cli.resolve_channel {
    let client = TelegramClient::new(raw.bot_token()?)?;
    return resolve_channel(&client, &channel).await;
  }

  let settings = raw.validate()?;
  let platform = TelegramClient::new(&settings.bot_token)?;
  let model = settings
    .openai
    .clone()
    .map(OpenAiClient::new)
    .transpose()
    .context("failed to build model client")?;
  if model.is_none() {
    tracing::info!("no language model configured, ideas are taken verbatim");
  }

  match settings.store.clone() {
    StoreSettings::Sqlite(path) => {
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!(?path, "using sqlite store");
      serve(store, platform, model, settings).await
    }
    StoreSettings::Rest(rest) => {
      let store = RestStore::new(rest).context("failed to build rest store client")?;
      serve(store, platform, model, settings).await
    }
  }
}

async fn serve<S: IdeaStore>(
  store: S,
  platform: TelegramClient,
  model: Option<OpenAiClient>,
  settings: Settings,
) -> anyhow::Result<()> {
  let state = AppState::new(store, platform.clone(), model, settings.bot.clone());

  tokio::spawn(leaderboard::run_schedule(state.clone(), settings.leaderboard_hour_utc));
  tracing::info!(hour_utc = settings.leaderboard_hour_utc, "leaderboard scheduled");

  let webhook_url = settings.webhook_url();
  match &webhook_url {
    Some(url) => platform.set_webhook(url).await.context("failed to register webhook")?,
    None => {
      let poll_state = state.clone();
      tokio::spawn(async move {
        let result = polling::run(&platform, |event| dispatch::spawn(poll_state.clone(), event)).await;
        if let Err(e) = result {
          tracing::error!(error = %e, "polling stopped");
        }
      });
    }
  }

  let app = http::router(state, webhook_url.is_some());
  let address = format!("0.0.0.0:{}", settings.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    tracing::info!("shutting down");
  }
}

/// Accepts `@name`, bare `name`, or a numeric id.
async fn resolve_channel(client: &TelegramClient, channel: &str) -> anyhow::Result<()> {
  let channel = channel.trim();
  let chat: ChatId = match channel.parse() {
    Ok(chat) => chat,
    Err(_) => format!("@{channel}").parse().context("invalid channel name")?,
  };
  let found = client
    .get_chat(&chat)
    .await
    .with_context(|| format!("failed to look up {chat}; is the bot an admin there?"))?;
  tracing::info!(title = ?found.title, kind = %found.kind, "channel found");
  println!("{}", found.id);
  Ok(())
}

use std::{env, fmt};

use crate::prelude::*;

pub const DEFAULT_BASE_URL: &str = "https://swapi.physm.org";
pub const DEFAULT_BOT: &str = "stupidwallet_bot";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(330);

/// Connection settings for [`WalletClient`](crate::WalletClient).
#[derive(Clone)]
pub struct Config {
  pub api_key: String,
  pub base_url: String,
  /// Pause after every answered request, a self-imposed rate limit.
  pub request_delay: Duration,
  /// Per-request transport timeout, `None` leaves it to reqwest.
  pub timeout: Option<Duration>,
  /// Telegram bot used for invoice and cheque links.
  pub bot_username: String,
}

impl Config {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key: api_key.into(),
      base_url: DEFAULT_BASE_URL.to_string(),
      request_delay: DEFAULT_REQUEST_DELAY,
      timeout: None,
      bot_username: DEFAULT_BOT.to_string(),
    }
  }

  /// Reads `STUPIDWALLET_*` variables, loading `.env` first if present.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();

    let api_key = env::var("STUPIDWALLET_API_KEY")
      .map_err(|_| Error::Config("STUPIDWALLET_API_KEY not set".into()))?;

    let mut config = Self::new(api_key);

    if let Ok(url) = env::var("STUPIDWALLET_BASE_URL") {
      config.base_url = url;
    }
    if let Ok(bot) = env::var("STUPIDWALLET_BOT") {
      config.bot_username = bot;
    }
    if let Some(delay) = duration_var("STUPIDWALLET_REQUEST_DELAY")? {
      config.request_delay = delay;
    }
    config.timeout = duration_var("STUPIDWALLET_TIMEOUT")?;

    Ok(config)
  }

  pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  pub fn request_delay(mut self, delay: Duration) -> Self {
    self.request_delay = delay;
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn bot_username(mut self, bot: impl Into<String>) -> Self {
    self.bot_username = bot.into();
    self
  }

  pub(crate) fn endpoint(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("api_key", &"<redacted>")
      .field("base_url", &self.base_url)
      .field("request_delay", &self.request_delay)
      .field("timeout", &self.timeout)
      .field("bot_username", &self.bot_username)
      .finish()
  }
}

fn duration_var(name: &str) -> Result<Option<Duration>> {
  match env::var(name) {
    Ok(raw) => humantime::parse_duration(raw.trim())
      .map(Some)
      .map_err(|e| Error::Config(format!("{name}: {e}"))),
    Err(_) => Ok(None),
  }
}

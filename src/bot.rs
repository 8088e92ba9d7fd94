use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use reqwest::Url;
use teloxide::dispatching::{DefaultKey, Dispatcher};
use teloxide::prelude::*;
use teloxide::types::Chat;
use teloxide::update_listeners::webhooks;
use teloxide::RequestError;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatch::{default_commands, CommandDispatcher};
use crate::handlers::ReplyContext;
use crate::sender::{ChatInfo, MessageSender};
use crate::strings::StringTable;

/// Shared read-only state handed to the update handler
pub struct AppState {
    dispatcher: CommandDispatcher,
    sender: MessageSender,
}

/// Owns the bot lifecycle: construction, mode selection, run, cleanup.
pub struct BotService {
    bot: Bot,
    config: Config,
    state: Arc<AppState>,
}

impl BotService {
    /// Build the client and wire up handlers. Fails only on a missing token;
    /// a bad timezone falls back to UTC with a warning.
    pub fn new(config: Config) -> Result<Self> {
        if config.telegram.bot_token.trim().is_empty() {
            bail!("telegram.bot_token is missing");
        }
        let bot = Bot::new(&config.telegram.bot_token);

        let tz = resolve_timezone(&config.general.timezone);
        let strings = StringTable::new(config.general.locale);
        let dispatcher =
            CommandDispatcher::new(default_commands(), ReplyContext { tz, strings });
        let sender = MessageSender::telegram(bot.clone());

        if let Some(storage) = &config.storage {
            info!("Storage configured (db: {}), not used by this bot", storage.db_name);
        }

        Ok(Self {
            bot,
            config,
            state: Arc::new(AppState { dispatcher, sender }),
        })
    }

    /// Long-poll until Ctrl-C. Any leftover webhook registration is removed
    /// first so the platform switches back to polling delivery.
    pub async fn run_polling(self) -> Result<()> {
        self.disable_webhook().await;

        info!("Starting bot in polling mode...");
        let mut dispatcher = self.build_dispatcher();
        dispatcher.dispatch().await;

        self.cleanup();
        Ok(())
    }

    /// Register the webhook and serve updates over HTTP until Ctrl-C.
    pub async fn run_webhook(self) -> Result<()> {
        let base = self
            .config
            .webhook
            .url
            .as_deref()
            .context("webhook.url must be set for webhook mode")?;
        let url: Url = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.config.telegram.bot_token
        )
        .parse()
        .with_context(|| format!("Invalid webhook url: {}", base))?;

        let ip: std::net::IpAddr = self
            .config
            .webhook
            .bind_address
            .parse()
            .with_context(|| {
                format!("Invalid bind address: {}", self.config.webhook.bind_address)
            })?;
        let addr = SocketAddr::new(ip, self.config.webhook.port);

        // Registration failure is logged but does not stop the listener; the
        // registration can be repeated out of band while the service runs.
        self.enable_webhook(url.clone()).await;

        let (listener, stop_flag, app) = webhooks::axum_no_setup(webhooks::Options::new(addr, url));
        tokio::spawn(async move {
            let tcp = match tokio::net::TcpListener::bind(addr).await {
                Ok(tcp) => tcp,
                Err(err) => {
                    error!("Failed to bind webhook listener on {}: {}", addr, err);
                    return;
                }
            };
            if let Err(err) = axum::serve(tcp, app)
                .with_graceful_shutdown(stop_flag)
                .await
            {
                error!("Webhook listener error: {}", err);
            }
        });

        info!("Starting bot in webhook mode on {}...", addr);
        let mut dispatcher = self.build_dispatcher();
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("webhook listener"),
            )
            .await;

        self.cleanup();
        Ok(())
    }

    fn build_dispatcher(&self) -> Dispatcher<Bot, RequestError, DefaultKey> {
        Dispatcher::builder(
            self.bot.clone(),
            Update::filter_message().endpoint(handle_message),
        )
        .dependencies(dptree::deps![self.state.clone()])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
    }

    /// Tell the platform to push updates to `url`. Outcome is logged; failure
    /// is non-fatal.
    async fn enable_webhook(&self, url: Url) -> bool {
        match self.bot.set_webhook(url).await {
            Ok(_) => {
                info!("Webhook registered");
                true
            }
            Err(err) => {
                warn!("Webhook registration failed: {}", err);
                false
            }
        }
    }

    /// Clear any webhook registration. Outcome is logged; failure is non-fatal.
    async fn disable_webhook(&self) -> bool {
        match self.bot.delete_webhook().await {
            Ok(_) => {
                info!("Webhook disabled");
                true
            }
            Err(err) => {
                warn!("Webhook could not be disabled: {}", err);
                false
            }
        }
    }

    fn cleanup(&self) {
        info!("Finished.");
    }
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    let chat = chat_info(&msg.chat);
    info!("Message from {} [{}]: {}", chat.label, chat.id.0, text);

    if let Some(reply) = state.dispatcher.dispatch(text) {
        state.sender.send(&chat, &reply).await;
    }

    Ok(())
}

fn chat_info(chat: &Chat) -> ChatInfo {
    let label = chat
        .title()
        .or_else(|| chat.username())
        .or_else(|| chat.first_name())
        .unwrap_or("-")
        .to_string();
    ChatInfo {
        id: chat.id,
        label,
        kind: chat_kind(chat),
    }
}

fn chat_kind(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Unknown timezone '{}', falling back to UTC", name);
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneralConfig, TelegramConfig, WebhookConfig};

    fn make_config(token: &str, timezone: &str) -> Config {
        Config {
            telegram: TelegramConfig {
                bot_token: token.to_string(),
            },
            webhook: WebhookConfig::default(),
            general: GeneralConfig {
                timezone: timezone.to_string(),
                locale: Default::default(),
            },
            storage: None,
        }
    }

    #[test]
    fn named_timezone_resolves() {
        assert_eq!(resolve_timezone("Europe/Madrid"), chrono_tz::Europe::Madrid);
    }

    #[test]
    fn bad_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Not/AZone"), Tz::UTC);
        assert_eq!(resolve_timezone(""), Tz::UTC);
    }

    #[test]
    fn missing_token_fails_construction() {
        assert!(BotService::new(make_config("", "UTC")).is_err());
        assert!(BotService::new(make_config("   ", "UTC")).is_err());
    }

    #[test]
    fn bad_timezone_does_not_fail_construction() {
        let service = BotService::new(make_config("123:abc", "Mars/Olympus"));
        assert!(service.is_ok());
    }
}

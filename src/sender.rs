use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use teloxide::RequestError;
use tracing::warn;

/// Outcome of a failed delivery, split by how much the platform told us.
#[derive(Debug, PartialEq, Eq)]
pub enum SendError {
    /// The platform rejected the message and said why.
    Api(String),
    /// Anything else (network, serialization, ...); no detail worth relaying.
    Other,
}

#[async_trait]
pub trait ReplyTransport: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), SendError>;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplyTransport for TelegramTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), SendError> {
        match self.bot.send_message(chat, text).await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(err)) => Err(SendError::Api(err.to_string())),
            Err(_) => Err(SendError::Other),
        }
    }
}

/// Addressing and log context for one chat.
#[derive(Debug, Clone)]
pub struct ChatInfo {
    pub id: ChatId,
    pub label: String,
    pub kind: &'static str,
}

/// The single place replies leave the process. A failed send is logged and
/// reported as `false`; it never propagates into the run loop.
pub struct MessageSender {
    transport: Box<dyn ReplyTransport>,
}

impl MessageSender {
    pub fn new(transport: Box<dyn ReplyTransport>) -> Self {
        Self { transport }
    }

    pub fn telegram(bot: Bot) -> Self {
        Self::new(Box::new(TelegramTransport::new(bot)))
    }

    pub async fn send(&self, chat: &ChatInfo, text: &str) -> bool {
        match self.transport.send_text(chat.id, text).await {
            Ok(()) => true,
            Err(SendError::Api(detail)) => {
                warn!(
                    "Message sending error to {} [{}] [{}] (api error: {})",
                    chat.label, chat.id.0, chat.kind, detail
                );
                false
            }
            Err(SendError::Other) => {
                warn!(
                    "Message sending error to {} [{}] [{}]",
                    chat.label, chat.id.0, chat.kind
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OkTransport;

    #[async_trait]
    impl ReplyTransport for OkTransport {
        async fn send_text(&self, _chat: ChatId, _text: &str) -> Result<(), SendError> {
            Ok(())
        }
    }

    struct ApiFailTransport;

    #[async_trait]
    impl ReplyTransport for ApiFailTransport {
        async fn send_text(&self, _chat: ChatId, _text: &str) -> Result<(), SendError> {
            Err(SendError::Api("chat not found".to_string()))
        }
    }

    struct OtherFailTransport;

    #[async_trait]
    impl ReplyTransport for OtherFailTransport {
        async fn send_text(&self, _chat: ChatId, _text: &str) -> Result<(), SendError> {
            Err(SendError::Other)
        }
    }

    fn make_chat() -> ChatInfo {
        ChatInfo {
            id: ChatId(42),
            label: "testers".to_string(),
            kind: "group",
        }
    }

    #[tokio::test]
    async fn successful_send_reports_true() {
        let sender = MessageSender::new(Box::new(OkTransport));
        assert!(sender.send(&make_chat(), "hi").await);
    }

    #[tokio::test]
    async fn api_error_reports_false_without_raising() {
        let sender = MessageSender::new(Box::new(ApiFailTransport));
        assert!(!sender.send(&make_chat(), "hi").await);
    }

    #[tokio::test]
    async fn unexpected_error_reports_false_without_raising() {
        let sender = MessageSender::new(Box::new(OtherFailTransport));
        assert!(!sender.send(&make_chat(), "hi").await);
    }
}

use std::collections::HashMap;

use crate::handlers::{self, ReplyContext};

pub type CommandHandler = fn(&ReplyContext, &str) -> String;

/// The default command set: /start, /help and /time.
pub fn default_commands() -> HashMap<&'static str, CommandHandler> {
    HashMap::from([
        ("/start", handlers::start as CommandHandler),
        ("/help", handlers::help as CommandHandler),
        ("/time", handlers::time as CommandHandler),
    ])
}

/// Routes each inbound message to exactly one handler.
///
/// The command map is injected at construction and never mutated; routing is
/// stateless, so registration order cannot affect the outcome.
pub struct CommandDispatcher {
    commands: HashMap<&'static str, CommandHandler>,
    ctx: ReplyContext,
}

impl CommandDispatcher {
    pub fn new(commands: HashMap<&'static str, CommandHandler>, ctx: ReplyContext) -> Self {
        Self { commands, ctx }
    }

    /// Produce the reply for a message, or `None` when the message is a
    /// command token with no registered handler.
    pub fn dispatch(&self, text: &str) -> Option<String> {
        let token = text.split_whitespace().next().unwrap_or("");
        // Group chats may address commands as /cmd@botname
        let token = token.split('@').next().unwrap_or(token);

        if token.starts_with('/') {
            return self.commands.get(token).map(|handler| handler(&self.ctx, text));
        }

        Some(handlers::echo(&self.ctx, text))
    }
}

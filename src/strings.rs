use serde::Deserialize;

/// Reply language, picked once at startup from `[general] locale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Identifier for a canned user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    Welcome,
    Help,
}

/// Static lookup table for user-facing strings, keyed by locale and message id.
#[derive(Debug, Clone, Copy)]
pub struct StringTable {
    locale: Locale,
}

impl StringTable {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn get(&self, id: MessageId) -> &'static str {
        match (self.locale, id) {
            (Locale::En, MessageId::Welcome) => "Welcome to Minibot.",
            (Locale::En, MessageId::Help) => {
                "Available commands:\n\
                 /start - Start or restart the bot\n\
                 /help - Show the command list\n\
                 /time - Show the bot's local time"
            }
            (Locale::Es, MessageId::Welcome) => "Bienvenido a Minibot.",
            (Locale::Es, MessageId::Help) => {
                "Comandos disponibles:\n\
                 /start - Inicia o reinicia el bot\n\
                 /help - Muestra la lista de comandos\n\
                 /time - Muestra la hora local del bot"
            }
        }
    }
}

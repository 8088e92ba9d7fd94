use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::strings::{MessageId, StringTable};

/// Read-only context shared by every handler; resolved once at startup.
pub struct ReplyContext {
    pub tz: Tz,
    pub strings: StringTable,
}

pub fn start(ctx: &ReplyContext, _text: &str) -> String {
    ctx.strings.get(MessageId::Welcome).to_string()
}

pub fn help(ctx: &ReplyContext, _text: &str) -> String {
    ctx.strings.get(MessageId::Help).to_string()
}

pub fn time(ctx: &ReplyContext, _text: &str) -> String {
    format_time(Utc::now(), ctx.tz)
}

/// Echo replies carry the message text back unmodified.
pub fn echo(_ctx: &ReplyContext, text: &str) -> String {
    text.to_string()
}

/// Fixed-pattern formatting, independent of the OS locale.
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%d/%m/%y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::Locale;
    use chrono::TimeZone;

    fn make_ctx() -> ReplyContext {
        ReplyContext {
            tz: Tz::UTC,
            strings: StringTable::new(Locale::En),
        }
    }

    #[test]
    fn start_returns_fixed_welcome() {
        let ctx = make_ctx();
        assert_eq!(start(&ctx, "/start"), "Welcome to Minibot.");
        // Arguments after the command do not change the reply
        assert_eq!(start(&ctx, "/start please"), "Welcome to Minibot.");
    }

    #[test]
    fn help_returns_fixed_command_list() {
        let ctx = make_ctx();
        let first = help(&ctx, "/help");
        let second = help(&ctx, "/help");
        assert_eq!(first, second);
        assert!(first.contains("/time"));
    }

    #[test]
    fn echo_preserves_text_exactly() {
        let ctx = make_ctx();
        let text = "  hello   world \n with whitespace ";
        assert_eq!(echo(&ctx, text), text);
    }

    #[test]
    fn time_shifts_into_configured_zone() {
        // Etc/GMT-2 is UTC+2 under POSIX sign conventions
        let tz: Tz = "Etc/GMT-2".parse().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(format_time(instant, tz), "01/01/24 12:00");
    }

    #[test]
    fn time_in_utc_is_unshifted() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 23, 45, 0).unwrap();
        assert_eq!(format_time(instant, Tz::UTC), "15/06/24 23:45");
    }
}

//! Command structs

use teloxide::utils::command::BotCommands;

/// A slash command found at the start of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command<'a> {
    /// `/add <text>`; the argument is trimmed and may be empty.
    Add(&'a str),
    Stats,
    Unknown(&'a str),
}

/// Splits `text` into a command and its argument.
///
/// Returns `None` for plain text. A `@botname` suffix on the command token is
/// ignored, so `/stats@my_bot` is `/stats`.
pub(crate) fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.strip_prefix('/')?;
    let (token, args) = match rest.split_once(char::is_whitespace) {
        Some((token, args)) => (token, args.trim()),
        None => (rest, ""),
    };
    let name = token.split_once('@').map_or(token, |(name, _)| name);
    if name.is_empty() {
        return None;
    }

    Some(match name {
        "add" => Command::Add(args),
        "stats" => Command::Stats,
        other => Command::Unknown(other),
    })
}

/// Menu shown by Telegram clients.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Expense commands:")]
pub(crate) enum MenuCommands {
    #[command(description = "record an expense, e.g. /add Coffee $3.50")]
    Add,
    #[command(description = "totals for the last 7 days")]
    Stats,
}

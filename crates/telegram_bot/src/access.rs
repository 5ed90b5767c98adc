//! Who may talk to the bot.

use std::collections::BTreeSet;

/// Identity allowed when no allow-list is configured.
pub const DEFAULT_ALLOWED_USER: &str = "iamoxyrus";

/// Decides whether a sender identity may use the bot.
pub trait AccessPolicy: Send + Sync {
    fn is_allowed(&self, sender: &str) -> bool;
}

/// Fixed set of Telegram usernames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowList {
    users: BTreeSet<String>,
}

impl AllowList {
    /// Builds the list from `users`, trimming entries and dropping a leading
    /// `@`. Falls back to [`DEFAULT_ALLOWED_USER`] when nothing remains.
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let users: BTreeSet<String> = users
            .into_iter()
            .filter_map(|user| {
                let user = user.as_ref().trim();
                let user = user.strip_prefix('@').unwrap_or(user).trim();
                (!user.is_empty()).then(|| user.to_string())
            })
            .collect();

        if users.is_empty() {
            return Self::default();
        }
        Self { users }
    }

    /// Parses a comma-separated list, e.g. `"alice, @bob"`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            users: BTreeSet::from([DEFAULT_ALLOWED_USER.to_string()]),
        }
    }
}

impl AccessPolicy for AllowList {
    fn is_allowed(&self, sender: &str) -> bool {
        !sender.is_empty() && self.users.contains(sender)
    }
}

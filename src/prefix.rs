//! IRC message prefix (source) types.
//!
//! A prefix identifies the entity a message came from, in the shape
//! `nickname!username@host`. Servers usually send only their name, so
//! `!username` and `@host` are optional; user messages carry all three.

use crate::casemap::irc_eq;

/// The parsed source of a message.
///
/// `raw` retains the prefix text exactly as received, including the
/// leading `:`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    /// Nickname (or server name) portion.
    pub nickname: Option<String>,
    /// Username (ident) portion, if present.
    pub username: Option<String>,
    /// Host portion, if present.
    pub host: Option<String>,
    /// The prefix token as it appeared on the wire.
    pub raw: String,
}

impl Prefix {
    /// Parse a prefix token (without the leading `:`).
    ///
    /// Any of the three sub-parts may be absent. `@host` is split off
    /// first so that a `!` inside a hostname cannot confuse the split.
    pub fn parse(token: &str) -> Self {
        let raw = format!(":{}", token);

        let (front, host) = match token.split_once('@') {
            Some((front, host)) if !host.is_empty() => (front, Some(host.to_string())),
            _ => (token, None),
        };

        let (nickname, username) = match front.split_once('!') {
            Some((nick, user)) if !user.is_empty() => {
                (non_empty(nick), Some(user.to_string()))
            }
            _ => (non_empty(front), None),
        };

        Prefix {
            nickname,
            username,
            host,
            raw,
        }
    }

    /// Whether this prefix names the given nickname, compared under the
    /// IRC case fold.
    #[must_use]
    pub fn is_nick(&self, nickname: &str) -> bool {
        self.nickname
            .as_deref()
            .is_some_and(|n| irc_eq(n, nickname))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

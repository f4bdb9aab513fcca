//! CTCP (Client-To-Client Protocol) codec.
//!
//! CTCP rides inside `PRIVMSG`/`NOTICE` payloads, delimited by a single
//! 0x01 byte at each end. The payload splits on the first space into a
//! verb and the remainder. Queries like `VERSION`, `TIME`, and `PING`
//! have built-in replies; anything else falls through to the
//! caller-supplied reply table on [`crate::Config`].

use chrono::Local;

/// The CTCP envelope delimiter.
pub const DELIMITER: char = '\u{1}';

/// Identification string sent in reply to `CTCP VERSION`.
pub const VERSION_REPLY: &str = concat!("slirc-client ", env!("CARGO_PKG_VERSION"));

/// A decoded CTCP payload, borrowed from the carrying message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The query verb, as received (case preserved).
    pub verb: &'a str,
    /// Everything after the first space; empty if the payload was only a
    /// verb.
    pub body: &'a str,
}

/// Wrap a verb and body in a CTCP envelope.
pub fn encode(verb: &str, body: &str) -> String {
    if body.is_empty() {
        format!("{DELIMITER}{verb}{DELIMITER}")
    } else {
        format!("{DELIMITER}{verb} {body}{DELIMITER}")
    }
}

/// Wrap an already-joined query string in a CTCP envelope.
pub fn wrap(text: &str) -> String {
    format!("{DELIMITER}{text}{DELIMITER}")
}

/// Decode a `PRIVMSG`/`NOTICE` payload as a CTCP envelope.
///
/// Returns `None` if the payload is not delimited by 0x01 on both ends.
pub fn decode(payload: &str) -> Option<Ctcp<'_>> {
    let inner = payload
        .strip_prefix(DELIMITER)
        .and_then(|s| s.strip_suffix(DELIMITER))?;

    match inner.split_once(' ') {
        Some((verb, body)) => Some(Ctcp { verb, body }),
        None => Some(Ctcp {
            verb: inner,
            body: "",
        }),
    }
}

/// Reply for the verbs the engine answers itself.
///
/// `VERSION` identifies the engine, `TIME` reports the locale-formatted
/// local time, `PING` echoes its argument back verbatim.
pub(crate) fn builtin_reply(verb: &str, body: &str) -> Option<String> {
    if verb.eq_ignore_ascii_case("VERSION") {
        Some(format!("VERSION {}", VERSION_REPLY))
    } else if verb.eq_ignore_ascii_case("TIME") {
        Some(format!("TIME {}", Local::now().format("%c")))
    } else if verb.eq_ignore_ascii_case("PING") {
        if body.is_empty() {
            Some("PING".to_string())
        } else {
            Some(format!("PING {}", body))
        }
    } else {
        None
    }
}

//! IRC message parsing.
//!
//! One received line becomes a [`Message`]: optional prefix, a canonical
//! lower-cased command, and the argument list. The grammar is the classic
//! line-oriented one:
//!
//! ```text
//! [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! The first parameter beginning with `:` consumes the remainder of the
//! line as a single trailing argument. Numeric commands are renamed via
//! [`crate::aliases`] before the dispatch key is formed, so listeners
//! match on `"rpl_welcome"` rather than `"001"`.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use crate::aliases;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// A parsed inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Source of the message, if the line carried a prefix.
    pub prefix: Option<Prefix>,
    /// Canonical lower-cased command; the dispatch key.
    pub command: String,
    /// Positional arguments, trailing included.
    pub args: Vec<String>,
}

/// Parse the prefix token (after `:`, up to the first space).
fn prefix_token(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command word.
fn command_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c != ' ')(input)
}

impl Message {
    /// Parse one line, already stripped of (or tolerating) trailing CR/LF.
    ///
    /// The parser is deliberately forgiving: any line with a command word
    /// parses, unknown commands included. Only empty input is rejected.
    pub fn parse(line: &str) -> Result<Message, MessageParseError> {
        let line = line.trim_end_matches(['\r', '\n']);

        let (rest, prefix) = opt(prefix_token)(line).unwrap_or((line, None));
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest).unwrap_or((rest, ""));

        let (rest, command) = match command_token(rest) {
            Ok((rest, cmd)) => (rest, cmd),
            Err(_) => return Err(MessageParseError::EmptyMessage),
        };

        let mut args = Vec::new();
        let mut rest = rest;
        while let Some(tail) = rest.strip_prefix(' ') {
            if let Some(trailing) = tail.strip_prefix(':') {
                args.push(trailing.to_string());
                break;
            }
            let end = tail.find(' ').unwrap_or(tail.len());
            let param = &tail[..end];
            if param.is_empty() {
                break;
            }
            args.push(param.to_string());
            rest = &tail[end..];
        }

        Ok(Message {
            prefix: prefix.map(Prefix::parse),
            command: aliases::canonical(command).to_lowercase(),
            args,
        })
    }

    /// Positional argument by index.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Nickname of the message source, if the prefix carried one.
    #[must_use]
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref()?.nickname.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_privmsg_with_prefix() {
        let msg = Message::parse(":nick!user@host PRIVMSG #chan :hello world").unwrap();
        let prefix = msg.prefix.as_ref().unwrap();
        assert_eq!(prefix.nickname.as_deref(), Some("nick"));
        assert_eq!(prefix.username.as_deref(), Some("user"));
        assert_eq!(prefix.host.as_deref(), Some("host"));
        assert_eq!(msg.command, "privmsg");
        assert_eq!(msg.args, vec!["#chan", "hello world"]);
    }

    #[test]
    fn test_parse_without_prefix() {
        let msg = Message::parse("PING :irc.example.com").unwrap();
        assert!(msg.prefix.is_none());
        assert_eq!(msg.command, "ping");
        assert_eq!(msg.args, vec!["irc.example.com"]);
    }

    #[test]
    fn test_parse_numeric_gets_alias() {
        let msg = Message::parse(":serv 001 me :Welcome").unwrap();
        assert_eq!(msg.command, "rpl_welcome");
        assert_eq!(msg.args, vec!["me", "Welcome"]);
    }

    #[test]
    fn test_parse_middle_params() {
        let msg = Message::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.command, "user");
        assert_eq!(msg.args, vec!["guest", "0", "*", "Real Name"]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = Message::parse("PRIVMSG #chan :").unwrap();
        assert_eq!(msg.args, vec!["#chan", ""]);
    }

    #[test]
    fn test_parse_trailing_keeps_colons() {
        let msg = Message::parse(":serv 372 me :- :: motd line").unwrap();
        assert_eq!(msg.command, "rpl_motd");
        assert_eq!(msg.args, vec!["me", "- :: motd line"]);
    }

    #[test]
    fn test_parse_bare_command() {
        let msg = Message::parse("AWAY").unwrap();
        assert_eq!(msg.command, "away");
        assert!(msg.args.is_empty());
    }

    #[test]
    fn test_parse_tolerates_crlf() {
        let msg = Message::parse(":a!u@h JOIN #x\r\n").unwrap();
        assert_eq!(msg.command, "join");
        assert_eq!(msg.args, vec!["#x"]);
    }

    #[test]
    fn test_parse_empty_line_is_error() {
        assert_eq!(Message::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(Message::parse("\r\n"), Err(MessageParseError::EmptyMessage));
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(s in "\\PC*") {
            let _ = Message::parse(&s);
        }
    }
}

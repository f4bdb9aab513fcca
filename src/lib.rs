//! # slirc-client
//!
//! An IRC client engine: the protocol core of a chat client, without any
//! UI attached. It owns the connection, frames and parses the
//! line-oriented protocol, tracks session state (identity, joined
//! channels, per-member operator/voice flags), negotiates nickname
//! collisions during registration, speaks CTCP, and dispatches parsed
//! events to registered listeners.
//!
//! ## Features
//!
//! - Forgiving message parsing with prefix decomposition and the
//!   trailing-parameter rule
//! - RFC 1459 style case folding for nicknames and channel names
//! - Automatic `PONG`, names-list tracking, and `MODE o/v` bookkeeping
//! - Automatic nickname negotiation on registration collisions
//! - CTCP `VERSION`/`TIME`/`PING` responders plus a caller-supplied
//!   reply table
//! - UTF-8 line decoding with a WINDOWS-1252 fallback
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use slirc_client::{Client, Config, Listener, Message, Outcome, Session};
//!
//! struct Echo;
//!
//! impl Listener for Echo {
//!     fn event(&mut self, _session: &mut Session, message: &Message) -> Outcome {
//!         if message.command == "privmsg" {
//!             println!("<{}> {}",
//!                 message.source_nick().unwrap_or("?"),
//!                 message.arg(1).unwrap_or(""));
//!         }
//!         Outcome::Pass
//!     }
//! }
//!
//! # async fn run() -> Result<(), slirc_client::ClientError> {
//! let mut client = Client::new(Config::new("irc.libera.chat:6667", "kae"));
//! client.add_listener(Echo);
//! client.connect(Duration::from_secs(30)).await?;
//! client.session_mut().join("#rust");
//!
//! while client.connected() {
//!     client.poll().await?;
//!     tokio::time::sleep(Duration::from_millis(20)).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The engine performs no internal threading: one poll loop owns one
//! [`Client`], and concurrent sessions each run their own loop over
//! their own instance.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod aliases;
pub mod casemap;
pub mod client;
pub mod ctcp;
pub mod encode;
pub mod error;
pub mod line;
pub mod listener;
pub mod message;
pub mod nick;
pub mod prefix;
pub mod state;

pub use self::casemap::{irc_eq, irc_to_lower, CaseFoldMap};
pub use self::client::{Client, Config};
pub use self::ctcp::Ctcp;
pub use self::error::{ClientError, MessageParseError, Result};
pub use self::line::LineCodec;
pub use self::listener::{Listener, ListenerId, Outcome};
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::state::{
    is_channel_name, is_valid_channel, is_valid_nickname, Channel, MemberFlags, Membership,
    Session, CHANNEL_PREFIXES,
};

//! Session state: identity, connection flags, and the channel graph.
//!
//! A [`Session`] is mutated only by the built-in handlers in this module
//! and by its own outbound command API. The channel map tracks exactly
//! the channels the session's own nickname is currently in; memberships
//! inside a channel carry the operator/voice flags this engine
//! interprets from `MODE` and the names-list reply.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::casemap::{irc_eq, CaseFoldMap};
use crate::ctcp;
use crate::encode;
use crate::error::Result;
use crate::listener::Outcome;
use crate::message::Message;
use crate::nick;

/// Channel name prefixes, ordered for display sorting.
pub const CHANNEL_PREFIXES: &str = "#&+!";

/// Whether a target names a channel rather than a nickname.
#[must_use]
pub fn is_channel_name(target: &str) -> bool {
    target
        .chars()
        .next()
        .is_some_and(|c| CHANNEL_PREFIXES.contains(c))
}

/// Whether a nickname contains only letters, numbers, `_`, `[`, `]`,
/// `{`, `}`, `\`, `|`, `` ` ``, or `^`.
#[must_use]
pub fn is_valid_nickname(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_[]{}\\|`^".contains(c))
}

/// Whether a channel name is well formed: a prefix character followed
/// by anything except NUL, BEL, CR, LF, space, comma, or colon.
#[must_use]
pub fn is_valid_channel(name: &str) -> bool {
    is_channel_name(name) && !name.contains(['\0', '\x07', '\r', '\n', ' ', ',', ':'])
}

/// Per-member mode flags tracked by the engine.
///
/// Only operator and voice are persisted; other channel modes are left
/// for listeners to interpret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberFlags {
    /// Channel operator (`+o`).
    pub operator: bool,
    /// Voiced (`+v`).
    pub voice: bool,
}

/// One nickname's presence in one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    /// Nickname in the casing last observed on the wire.
    pub nickname: String,
    /// Operator/voice flags.
    pub flags: MemberFlags,
}

impl Membership {
    fn new(nickname: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            flags: MemberFlags::default(),
        }
    }
}

/// A joined channel and its members.
#[derive(Clone, Debug, Default)]
pub struct Channel {
    name: String,
    members: CaseFoldMap<Membership>,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: CaseFoldMap::new(),
        }
    }

    /// Channel name as first observed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members, keyed by folded nickname.
    #[must_use]
    pub fn members(&self) -> &CaseFoldMap<Membership> {
        &self.members
    }
}

/// Connection identity, flags, channel state, and the outbound queue.
///
/// Created by [`Client`](crate::Client) at construction and handed to
/// listeners during dispatch. The command methods only queue lines; the
/// owning client flushes the queue in FIFO order on each poll cycle.
#[derive(Debug)]
pub struct Session {
    username: String,
    nickname: String,
    realname: String,
    address: String,
    connected: bool,
    authenticated: bool,
    quitting: bool,
    send_queue: VecDeque<String>,
    channels: CaseFoldMap<Channel>,
    ctcp_replies: HashMap<String, String>,
}

impl Session {
    pub(crate) fn new(
        username: &str,
        address: &str,
        nickname: Option<&str>,
        realname: Option<&str>,
        ctcp_replies: HashMap<String, String>,
    ) -> Self {
        Self {
            username: username.to_string(),
            nickname: nickname.unwrap_or(username).to_string(),
            realname: realname.unwrap_or(username).to_string(),
            address: address.to_string(),
            connected: false,
            authenticated: false,
            quitting: false,
            send_queue: VecDeque::new(),
            channels: CaseFoldMap::new(),
            ctcp_replies,
        }
    }

    /// Username passed at construction.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current nickname. Updated by the welcome reply and by `NICK`
    /// messages for this client.
    #[must_use]
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Real name passed at construction.
    #[must_use]
    pub fn realname(&self) -> &str {
        &self.realname
    }

    /// Remote address this session talks to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the transport is (believed) open.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Whether the welcome reply has been processed.
    #[must_use]
    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    /// Channels the own nickname is currently in, keyed by folded name.
    #[must_use]
    pub fn channels(&self) -> &CaseFoldMap<Channel> {
        &self.channels
    }

    // ------------------------------------------------------------------
    // Outbound command API
    // ------------------------------------------------------------------

    /// Queue a raw protocol line.
    pub fn send(&mut self, line: impl Into<String>) {
        self.send_queue.push_back(line.into());
    }

    /// Issue a `NICK` command.
    pub fn nick(&mut self, nickname: &str) {
        self.send(encode::nick(nickname));
    }

    /// Issue a `JOIN` command.
    pub fn join(&mut self, channel: &str) {
        self.send(encode::join(channel));
    }

    /// Issue a `PART` command, optionally with a reason.
    pub fn part(&mut self, channel: &str, reason: Option<&str>) {
        self.send(encode::part(channel, reason));
    }

    /// Issue a `PRIVMSG`. Each line of `text` is sent as a separate
    /// command, in order.
    pub fn privmsg(&mut self, target: &str, text: &str) {
        for line in text.lines() {
            self.send(encode::privmsg(target, line));
        }
    }

    /// Issue a CTCP-wrapped `PRIVMSG` (e.g. `ACTION`, `VERSION`).
    pub fn privmsg_ctcp(&mut self, target: &str, text: &str) {
        for line in text.lines() {
            self.send(encode::privmsg(target, &ctcp::wrap(line)));
        }
    }

    /// Issue a `NOTICE`. Each line of `text` is sent as a separate
    /// command, in order.
    pub fn notice(&mut self, target: &str, text: &str) {
        for line in text.lines() {
            self.send(encode::notice(target, line));
        }
    }

    /// Issue a CTCP-wrapped `NOTICE`, the reply form of a CTCP query.
    pub fn notice_ctcp(&mut self, target: &str, text: &str) {
        for line in text.lines() {
            self.send(encode::notice(target, &ctcp::wrap(line)));
        }
    }

    /// Issue a `WHOIS` command.
    pub fn whois(&mut self, nickname: &str) {
        self.send(encode::whois(nickname));
    }

    /// Issue a `TOPIC` command: query with `None`, set with `Some`.
    pub fn topic(&mut self, channel: &str, new_topic: Option<&str>) {
        self.send(encode::topic(channel, new_topic));
    }

    /// Issue a `KICK` command. The reason defaults to the kicked
    /// nickname.
    pub fn kick(&mut self, channel: &str, nickname: &str, reason: Option<&str>) {
        self.send(encode::kick(channel, nickname, reason));
    }

    /// Issue a `MODE` command with up to two arguments.
    pub fn mode(&mut self, channel: &str, modes: &str, arg1: Option<&str>, arg2: Option<&str>) {
        self.send(encode::mode(channel, modes, arg1, arg2));
    }

    /// Issue an `AWAY` command: a reason marks you away, `None` marks
    /// you back.
    pub fn away(&mut self, reason: Option<&str>) {
        self.send(encode::away(reason));
    }

    /// Request disconnection: queues a `QUIT` and marks the session as
    /// quitting. The transport closes on a later poll cycle, once the
    /// `QUIT` has been flushed.
    pub fn disconnect(&mut self, reason: Option<&str>) {
        self.send(encode::quit(reason));
        self.connected = false;
        self.quitting = true;
    }

    /// Alias for [`Session::disconnect`].
    pub fn quit(&mut self, reason: Option<&str>) {
        self.disconnect(reason);
    }

    // ------------------------------------------------------------------
    // Plumbing for the owning client
    // ------------------------------------------------------------------

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub(crate) fn pop_outbound(&mut self) -> Option<String> {
        self.send_queue.pop_front()
    }

    /// Clear everything that does not survive a closed transport.
    pub(crate) fn reset_transient(&mut self) {
        self.send_queue.clear();
        self.authenticated = false;
        self.quitting = false;
    }

    // ------------------------------------------------------------------
    // Built-in handlers
    // ------------------------------------------------------------------

    /// Engine pre-handler, tried after listener pre-handlers.
    ///
    /// Recovers from a nickname collision during registration by
    /// re-issuing `NICK` with the next candidate; exhaustion of the
    /// candidate space is fatal to the handshake.
    pub(crate) fn handle_before(&mut self, message: &Message) -> Result<Outcome> {
        if message.command == "err_nicknameinuse" && !self.authenticated {
            // 433 args: <me> <rejected nickname> <text>
            let rejected = message.arg(1).unwrap_or(self.nickname.as_str());
            let candidate = nick::next_candidate(rejected)?;
            debug!(rejected, candidate = candidate.as_str(), "nickname in use, retrying");
            self.nick(&candidate);
            return Ok(Outcome::Handled);
        }
        Ok(Outcome::Pass)
    }

    /// The single built-in state handler for a command, if any.
    pub(crate) fn handle(&mut self, message: &Message) {
        match message.command.as_str() {
            "rpl_welcome" => self.on_welcome(message),
            "join" => self.on_join(message),
            "part" => self.on_part(message),
            "kick" => self.on_kick(message),
            "quit" => self.on_quit(message),
            "nick" => self.on_nick(message),
            "mode" => self.on_mode(message),
            "rpl_namreply" => self.on_namreply(message),
            "ping" => self.on_ping(message),
            "privmsg" => self.on_privmsg(message),
            _ => {}
        }
    }

    fn on_welcome(&mut self, message: &Message) {
        if let Some(confirmed) = message.arg(0) {
            self.nickname = confirmed.to_string();
        }
        self.authenticated = true;
        debug!(nickname = self.nickname.as_str(), "registration complete");
    }

    fn on_join(&mut self, message: &Message) {
        let (who, channel) = match (message.source_nick(), message.arg(0)) {
            (Some(who), Some(channel)) => (who, channel),
            _ => return,
        };

        if irc_eq(who, &self.nickname) {
            if !self.channels.contains_key(channel) {
                let mut chan = Channel::new(channel);
                chan.members
                    .insert(&self.nickname, Membership::new(&self.nickname));
                self.channels.insert(channel, chan);
            }
        } else if let Some(chan) = self.channels.get_mut(channel) {
            chan.members.insert(who, Membership::new(who));
        }
    }

    fn on_part(&mut self, message: &Message) {
        let (who, channel) = match (message.source_nick(), message.arg(0)) {
            (Some(who), Some(channel)) => (who, channel),
            _ => return,
        };

        if irc_eq(who, &self.nickname) {
            self.channels.remove(channel);
        } else if let Some(chan) = self.channels.get_mut(channel) {
            if chan.members.remove(who).is_none() {
                debug!(who, channel, "part for untracked member");
            }
        }
    }

    fn on_kick(&mut self, message: &Message) {
        let (channel, kicked) = match (message.arg(0), message.arg(1)) {
            (Some(channel), Some(kicked)) => (channel, kicked),
            _ => return,
        };
        if !self.channels.contains_key(channel) {
            return;
        }

        if irc_eq(kicked, &self.nickname) {
            self.channels.remove(channel);
        } else if let Some(chan) = self.channels.get_mut(channel) {
            if chan.members.remove(kicked).is_none() {
                debug!(kicked, channel, "kick for untracked member");
            }
        }
    }

    fn on_quit(&mut self, message: &Message) {
        let who = match message.source_nick() {
            Some(who) => who,
            None => return,
        };

        if irc_eq(who, &self.nickname) {
            if !self.quitting {
                self.disconnect(None);
            }
        } else {
            for chan in self.channels.values_mut() {
                chan.members.remove(who);
            }
        }
    }

    fn on_nick(&mut self, message: &Message) {
        let (who, new_nick) = match (message.source_nick(), message.arg(0)) {
            (Some(who), Some(new_nick)) => (who, new_nick),
            _ => return,
        };

        if irc_eq(who, &self.nickname) {
            self.nickname = new_nick.to_string();
        }
        for chan in self.channels.values_mut() {
            if let Some(mut member) = chan.members.remove(who) {
                member.nickname = new_nick.to_string();
                chan.members.insert(new_nick, member);
            }
        }
    }

    fn on_mode(&mut self, message: &Message) {
        let (target, modes) = match (message.arg(0), message.arg(1)) {
            (Some(target), Some(modes)) => (target, modes),
            _ => return,
        };
        let chan = match self.channels.get_mut(target) {
            Some(chan) => chan,
            None => return,
        };

        let mut give = true;
        let mut args = message.args.iter().skip(2);
        for letter in modes.chars() {
            match letter {
                '+' => give = true,
                '-' => give = false,
                'o' | 'v' => {
                    if let Some(nickname) = args.next() {
                        if let Some(member) = chan.members.get_mut(nickname) {
                            if letter == 'o' {
                                member.flags.operator = give;
                            } else {
                                member.flags.voice = give;
                            }
                        }
                    }
                }
                // Other letters are listener territory; they consume no
                // argument here.
                _ => {}
            }
        }
    }

    fn on_namreply(&mut self, message: &Message) {
        // <me> [<symbol>] <channel> :<names>; index from the end since
        // the symbol is not always present.
        if message.args.len() < 2 {
            return;
        }
        let channel = &message.args[message.args.len() - 2];
        let names = &message.args[message.args.len() - 1];

        let chan = match self.channels.get_mut(channel) {
            Some(chan) => chan,
            None => return,
        };

        for name in names.split_whitespace() {
            let mut flags = MemberFlags::default();
            let mut rest = name;
            loop {
                if let Some(stripped) = rest.strip_prefix('@') {
                    flags.operator = true;
                    rest = stripped;
                } else if let Some(stripped) = rest.strip_prefix('+') {
                    flags.voice = true;
                    rest = stripped;
                } else {
                    break;
                }
            }
            if rest.is_empty() {
                continue;
            }
            chan.members.insert(
                rest,
                Membership {
                    nickname: rest.to_string(),
                    flags,
                },
            );
        }
    }

    fn on_ping(&mut self, message: &Message) {
        let payload = message.arg(0).unwrap_or("");
        self.send(encode::pong(payload));
    }

    /// CTCP auto-reply. Queries carried in `PRIVMSG` get at most one
    /// reply: a built-in responder first, then the caller-supplied reply
    /// table, else silence. Replies go back to the originator as a
    /// CTCP-wrapped `NOTICE`.
    fn on_privmsg(&mut self, message: &Message) {
        let (who, text) = match (message.source_nick(), message.arg(1)) {
            (Some(who), Some(text)) => (who, text),
            _ => return,
        };
        let query = match ctcp::decode(text) {
            Some(query) => query,
            None => return,
        };
        // ACTION is display text, not a query.
        if query.verb.eq_ignore_ascii_case("ACTION") {
            return;
        }

        let reply = ctcp::builtin_reply(query.verb, query.body)
            .or_else(|| self.ctcp_replies.get(&query.verb.to_lowercase()).cloned());

        match reply {
            Some(reply) if !reply.is_empty() => self.notice_ctcp(who, &reply),
            _ => {}
        }
    }
}

//! The client engine: connection management and event dispatch.
//!
//! [`Client`] owns the socket, the [`Session`], and the listener
//! registry. The caller drives it cooperatively: `connect` performs the
//! registration handshake (blocking up to a timeout), then `poll` is
//! invoked repeatedly for as long as the session is connected. Each poll
//! cycle drains whatever inbound lines are already available, dispatches
//! them, and flushes the outbound queue in FIFO order. Nothing here
//! spawns a task or blocks waiting for data.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{FutureExt, SinkExt, StreamExt};
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use crate::encode;
use crate::error::{ClientError, Result};
use crate::line::LineCodec;
use crate::listener::{Listener, ListenerId};
use crate::message::Message;
use crate::state::Session;

/// Delay between poll attempts while waiting for the welcome reply.
const REGISTRATION_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capability requested at registration so names-list replies carry all
/// member sigils.
const REQUESTED_CAP: &str = "multi-prefix";

/// Connection parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Remote address, `host:port`.
    pub address: String,
    /// Username for the `USER` registration line.
    pub username: String,
    /// Nickname for the initial `NICK`; defaults to the username.
    pub nickname: Option<String>,
    /// Real name for the `USER` line; defaults to the username.
    pub realname: Option<String>,
    /// CTCP reply table: lower-cased verb to the reply payload sent when
    /// no built-in responder matches. Empty payloads suppress the reply.
    pub ctcp_replies: HashMap<String, String>,
}

impl Config {
    /// Minimal configuration for the given address and username.
    #[must_use]
    pub fn new(address: &str, username: &str) -> Self {
        Self {
            address: address.to_string(),
            username: username.to_string(),
            nickname: None,
            realname: None,
            ctcp_replies: HashMap::new(),
        }
    }
}

/// A connection to one IRC network.
///
/// Commands and state live on the [`Session`], reachable through
/// [`Client::session`] / [`Client::session_mut`]; the client adds the
/// transport, the registration handshake, and dispatch on top.
pub struct Client {
    session: Session,
    transport: Option<Framed<TcpStream, LineCodec>>,
    listeners: Vec<(ListenerId, Box<dyn Listener>)>,
    next_listener_id: u64,
}

impl Client {
    /// Create an unconnected client from a configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            session: Session::new(
                &config.username,
                &config.address,
                config.nickname.as_deref(),
                config.realname.as_deref(),
                config.ctcp_replies,
            ),
            transport: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Session state and the outbound command API.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access, for issuing commands.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Whether the transport is open.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.session.connected()
    }

    /// Whether the welcome reply has been processed.
    #[must_use]
    pub fn authenticated(&self) -> bool {
        self.session.authenticated()
    }

    /// Register a listener. Listeners are notified in registration
    /// order; the returned id removes it again.
    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: Listener + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a previously registered listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Open the connection and complete registration.
    ///
    /// Queues `CAP`/`NICK`/`USER`, then polls (sleeping briefly between
    /// attempts) until the session is authenticated or `timeout`
    /// elapses. Nickname collisions are negotiated along the way; an
    /// exhausted candidate space aborts the handshake. On success, any
    /// channels still present in session state are re-joined.
    pub async fn connect(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let address = self.session.address().to_string();
        let stream = tokio::time::timeout(timeout, TcpStream::connect(address.as_str()))
            .await
            .map_err(|_| ClientError::ConnectTimeout(timeout))??;
        if let Err(err) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", err);
        }
        self.transport = Some(Framed::new(stream, LineCodec::new()));
        self.session.set_connected(true);
        debug!(address = address.as_str(), "connected, registering");

        self.session.send(encode::cap_req(REQUESTED_CAP));
        self.session.send(encode::cap_end());
        let nickname = self.session.nickname().to_string();
        self.session.nick(&nickname);
        let user_line = encode::user(self.session.username(), self.session.realname());
        self.session.send(user_line);

        loop {
            self.poll().await?;
            if self.session.authenticated() {
                break;
            }
            if !self.session.connected() {
                return Err(ClientError::NotConnected);
            }
            if Instant::now() >= deadline {
                return Err(ClientError::ConnectTimeout(timeout));
            }
            tokio::time::sleep(REGISTRATION_POLL_INTERVAL).await;
        }

        // Channels surviving from an earlier connection get re-joined.
        let channels: Vec<String> = self
            .session
            .channels()
            .values()
            .map(|chan| chan.name().to_string())
            .collect();
        for channel in channels {
            self.session.join(&channel);
        }
        Ok(())
    }

    /// Request disconnection; see [`Session::disconnect`].
    pub fn disconnect(&mut self, reason: Option<&str>) {
        self.session.disconnect(reason);
    }

    /// One poll cycle: dispatch available inbound lines, flush the
    /// outbound queue, complete a requested disconnect.
    ///
    /// Never waits for data. Transport failures tear the connection
    /// down and are logged rather than raised; the only error out of a
    /// poll is a fatal registration condition (nickname exhaustion).
    pub async fn poll(&mut self) -> Result<()> {
        loop {
            let next = match self.transport.as_mut() {
                Some(transport) => transport.next().now_or_never(),
                None => break,
            };
            match next {
                Some(Some(Ok(line))) => self.dispatch(&line)?,
                Some(Some(Err(err))) => {
                    warn!("transport read error: {}", err);
                    self.teardown();
                    break;
                }
                Some(None) => {
                    debug!("server closed the connection");
                    self.teardown();
                    break;
                }
                // Nothing ready right now; do not wait for more.
                None => break,
            }
        }

        while let Some(line) = self.session.pop_outbound() {
            for (_, listener) in &mut self.listeners {
                listener.raw_sent(&mut self.session, &line);
            }
            trace!(line = line.as_str(), "send");
            if let Some(transport) = self.transport.as_mut() {
                if let Err(err) = transport.send(line).await {
                    warn!("transport write error: {}", err);
                    self.teardown();
                    return Ok(());
                }
            }
        }

        if self.session.is_quitting() && self.transport.is_some() {
            debug!("disconnect requested, closing transport");
            if let Some(mut transport) = self.transport.take() {
                let _ = transport.close().await;
            }
            self.session.set_connected(false);
            self.session.reset_transient();
        }
        Ok(())
    }

    /// Parse one line and run the dispatch pipeline:
    /// raw notification, listener pre-handlers, the engine pre-handler,
    /// the built-in state handler, then the listener chain.
    fn dispatch(&mut self, line: &str) -> Result<()> {
        trace!(line, "recv");
        for (_, listener) in &mut self.listeners {
            listener.raw_received(&mut self.session, line);
        }

        let message = match Message::parse(line) {
            Ok(message) => message,
            // Empty line; nothing to dispatch.
            Err(_) => return Ok(()),
        };

        for (_, listener) in &mut self.listeners {
            if listener.before(&mut self.session, &message).is_handled() {
                trace!(command = message.command.as_str(), "short-circuited by pre-handler");
                return Ok(());
            }
        }
        if self.session.handle_before(&message)?.is_handled() {
            return Ok(());
        }

        self.session.handle(&message);

        for (_, listener) in &mut self.listeners {
            if listener.event(&mut self.session, &message).is_handled() {
                break;
            }
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.transport = None;
        self.session.set_connected(false);
        self.session.reset_transient();
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::Outcome;
    use std::sync::{Arc, Mutex};

    /// Records which hooks fired; optionally claims events or
    /// pre-handles a command.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        claim_events: bool,
        before_command: Option<&'static str>,
    }

    impl Recorder {
        fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                log,
                claim_events: false,
                before_command: None,
            }
        }
    }

    impl Listener for Recorder {
        fn raw_received(&mut self, _session: &mut Session, line: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:raw:{}", self.name, line));
        }

        fn before(&mut self, _session: &mut Session, message: &Message) -> Outcome {
            if self.before_command == Some(message.command.as_str()) {
                self.log
                    .lock()
                    .unwrap()
                    .push(format!("{}:before:{}", self.name, message.command));
                return Outcome::Handled;
            }
            Outcome::Pass
        }

        fn event(&mut self, _session: &mut Session, message: &Message) -> Outcome {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:event:{}", self.name, message.command));
            if self.claim_events {
                Outcome::Handled
            } else {
                Outcome::Pass
            }
        }
    }

    fn client() -> Client {
        Client::new(Config::new("127.0.0.1:6667", "kae"))
    }

    #[test]
    fn test_first_responder_wins_but_raw_reaches_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = client();
        let mut first = Recorder::new("first", log.clone());
        first.claim_events = true;
        c.add_listener(first);
        c.add_listener(Recorder::new("second", log.clone()));

        c.dispatch(":a!u@h PRIVMSG #x :hi").unwrap();

        let log = log.lock().unwrap();
        assert!(log.contains(&"first:raw::a!u@h PRIVMSG #x :hi".to_string()));
        assert!(log.contains(&"second:raw::a!u@h PRIVMSG #x :hi".to_string()));
        assert!(log.contains(&"first:event:privmsg".to_string()));
        assert!(!log.iter().any(|entry| entry == "second:event:privmsg"));
    }

    #[test]
    fn test_pre_handler_short_circuits_everything() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = client();
        let mut gate = Recorder::new("gate", log.clone());
        gate.before_command = Some("join");
        c.add_listener(gate);
        c.add_listener(Recorder::new("tail", log.clone()));

        c.dispatch(":serv 001 kae :Welcome").unwrap();
        c.dispatch(":kae!u@h JOIN #x").unwrap();

        // The pre-handler suppressed the built-in handler and the chain.
        assert!(c.session().channels().get("#x").is_none());
        let log = log.lock().unwrap();
        assert!(log.contains(&"gate:before:join".to_string()));
        assert!(!log.iter().any(|entry| entry == "tail:event:join"));
    }

    #[test]
    fn test_end_to_end_channel_state() {
        let mut c = client();
        c.dispatch(":serv 001 me :Welcome").unwrap();
        assert!(c.authenticated());
        assert_eq!(c.session().nickname(), "me");

        c.dispatch(":me!u@h JOIN #x").unwrap();
        assert_eq!(c.session().channels().get("#x").unwrap().members().len(), 1);

        c.dispatch(":b!u@h JOIN #x").unwrap();
        assert_eq!(c.session().channels().get("#x").unwrap().members().len(), 2);

        c.dispatch(":b!u@h PART #x :bye").unwrap();
        let chan = c.session().channels().get("#x").unwrap();
        assert!(chan.members().get("b").is_none());

        c.dispatch(":me!u@h PART #x").unwrap();
        assert!(c.session().channels().get("#x").is_none());
    }

    #[test]
    fn test_collision_retry_via_dispatch() {
        let mut c = client();
        c.dispatch(":serv 433 * kae :Nickname is already in use")
            .unwrap();
        assert_eq!(
            c.session_mut().pop_outbound().as_deref(),
            Some("NICK kae1")
        );
    }

    #[test]
    fn test_listener_pre_handler_overrides_nick_negotiation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = client();
        let mut strategy = Recorder::new("strategy", log.clone());
        strategy.before_command = Some("err_nicknameinuse");
        c.add_listener(strategy);

        c.dispatch(":serv 433 * kae :Nickname is already in use")
            .unwrap();
        // The listener claimed the collision; the engine queued nothing.
        assert!(c.session_mut().pop_outbound().is_none());
    }

    #[test]
    fn test_unknown_command_is_not_an_error() {
        let mut c = client();
        c.dispatch(":serv WIBBLE a b :c").unwrap();
        c.dispatch("WALLOPS :text").unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connect_handshake_negotiates_collision() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Keeps the server end open until the client-side assertions ran.
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                seen.push(line.clone());
                if line == "NICK kae" {
                    write
                        .write_all(b":serv 433 * kae :Nickname is already in use\r\n")
                        .await
                        .unwrap();
                } else if line == "NICK kae1" {
                    write
                        .write_all(b":serv 001 kae1 :Welcome\r\n")
                        .await
                        .unwrap();
                    break;
                }
            }
            let _ = done_rx.await;
            seen
        });

        let mut c = Client::new(Config::new(&addr.to_string(), "kae"));
        c.connect(Duration::from_secs(10)).await.unwrap();
        assert!(c.authenticated());
        assert_eq!(c.session().nickname(), "kae1");

        done_tx.send(()).unwrap();
        let seen = server.await.unwrap();
        assert!(seen.contains(&"CAP REQ multi-prefix".to_string()));
        assert!(seen.contains(&"CAP END".to_string()));
        assert!(seen.contains(&"USER kae 0 * :kae".to_string()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disconnect_flushes_quit_then_closes() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                seen.push(line.clone());
                if line.starts_with("NICK") {
                    write
                        .write_all(b":serv 001 kae :Welcome\r\n")
                        .await
                        .unwrap();
                }
                if line.starts_with("QUIT") {
                    break;
                }
            }
            seen
        });

        let mut c = Client::new(Config::new(&addr.to_string(), "kae"));
        c.connect(Duration::from_secs(10)).await.unwrap();

        c.disconnect(Some("goodbye"));
        assert!(!c.connected());
        c.poll().await.unwrap();
        assert!(!c.authenticated());

        let seen = server.await.unwrap();
        assert!(seen.contains(&"QUIT :goodbye".to_string()));
    }
}

//! Listener interface for protocol events.
//!
//! Listeners observe the dispatch pipeline at four points, in order:
//!
//! 1. [`Listener::raw_received`]: every inbound line, before parsing.
//!    Always fanned out to all listeners, whatever happens next.
//! 2. [`Listener::before`]: the pre-handler. Tried in registration order;
//!    the first listener returning [`Outcome::Handled`] short-circuits
//!    the message entirely: no built-in state handler runs and no other
//!    listener is notified. The engine's own nickname-collision retry
//!    sits at the end of this chain, so a listener can override it.
//! 3. The built-in state handler (not a listener; see
//!    [`Session`](crate::Session)).
//! 4. [`Listener::event`]: per-command notification. Tried in
//!    registration order; the first `Handled` stops the chain. This lets
//!    exactly one listener claim a message (e.g. pick the single reply to
//!    a CTCP query) while the rest stay quiet.
//!
//! Match on [`Message::command`](crate::Message) to react to specific
//! commands; dispatch keys are canonical lower-cased names such as
//! `"privmsg"` or `"rpl_welcome"`.

use crate::message::Message;
use crate::state::Session;

/// What a hook did with a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not interested; keep going.
    Pass,
    /// Claimed. Later handlers in the chain are skipped.
    Handled,
}

impl Outcome {
    /// Whether this outcome stops the chain.
    #[must_use]
    pub fn is_handled(self) -> bool {
        matches!(self, Outcome::Handled)
    }
}

/// Handle returned by listener registration, used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A protocol event observer.
///
/// All hooks default to no-ops; implement only what you need. Hooks
/// receive the [`Session`] mutably so they can queue outbound commands
/// and inspect channel state.
pub trait Listener {
    /// An inbound line, exactly as decoded from the wire.
    fn raw_received(&mut self, session: &mut Session, line: &str) {
        let _ = (session, line);
    }

    /// An outbound line, at the moment it is written to the transport.
    fn raw_sent(&mut self, session: &mut Session, line: &str) {
        let _ = (session, line);
    }

    /// Pre-handler hook. Returning [`Outcome::Handled`] suppresses all
    /// further processing of this message.
    fn before(&mut self, session: &mut Session, message: &Message) -> Outcome {
        let _ = (session, message);
        Outcome::Pass
    }

    /// Per-command notification, after built-in state handling.
    fn event(&mut self, session: &mut Session, message: &Message) -> Outcome {
        let _ = (session, message);
        Outcome::Pass
    }
}

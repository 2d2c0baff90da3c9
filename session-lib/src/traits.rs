//! The seam between the session core and whatever carries the frames.
//!
//! ```text
//! ┌──────────────┐   frames   ┌───────────────────┐   ServerEvent   ┌─────────────┐
//! │  Transport   │ ─────────► │ SessionConnection │ ──────────────► │ GameSession │
//! │ (ewebsock /  │ ◄───────── │  (decode/encode)  │ ◄────────────── │ (store,     │
//! │  scripted)   │            └───────────────────┘  ClientCommand  │  sequencer) │
//! └──────────────┘                                                  └─────────────┘
//! ```
//!
//! The production transport lives in [`crate::web_socket_interface`]. Tests plug in scripted
//! transports that replay frames and record what was sent.

/// What a transport reports when polled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open and frames may be sent.
    Opened,
    /// One text frame arrived.
    Text(String),
    /// The remote side closed the connection, with the reason if one was given.
    Closed(String),
    /// The connection failed.
    Error(String),
}

/// One open duplex link. Dropping the link closes it.
pub trait Transport {
    /// Sends a text frame. Fire and forget, failures show up as events on [`Transport::poll`].
    fn send(&mut self, frame: String);

    /// Returns the next pending event without blocking.
    fn poll(&mut self) -> Option<TransportEvent>;
}

/// Opens links against an endpoint.
pub trait TransportFactory {
    type Link: Transport;

    /// Starts opening a link. The link reports [`TransportEvent::Opened`] once it is usable.
    fn open(&mut self, endpoint: &str) -> Result<Self::Link, String>;
}

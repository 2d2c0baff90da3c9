//! The connection to the authority: opens the link, sends the board setup first, decodes inbound
//! frames and encodes outbound commands.
//!
//! ```text
//! Disconnected ──connect──► Opening ──opened + setup sent──► Connected
//!      ▲                       │                                 │
//!      └──── (error, close, missing setup, disconnect) ──────────┘
//! ```
//!
//! A connection never reconnects on its own. Leaving the connected state through an error keeps the
//! error in [`ConnectionState::Disconnected`] until the next connect or an explicit disconnect.

use crate::error::{CommandError, DecodeError, SessionError};
use crate::setup::{BoardSetup, SetupStorage};
use crate::traits::{Transport, TransportEvent, TransportFactory};
use duck_protocol::{ClientCommand, ServerEvent, decode_event, encode_command};

/// Connection lifecycle states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link. The error is present if we got here through a failure.
    Disconnected { error: Option<SessionError> },
    /// The link is being opened, nothing is sent yet.
    Opening,
    /// The setup is sent, events flow.
    Connected,
}

/// What polling the connection produced, in arrival order.
#[derive(Debug, PartialEq)]
pub enum ConnectionUpdate {
    Event(ServerEvent),
    /// The link is gone. The connection is disconnected now.
    Lost(SessionError),
}

pub struct SessionConnection<F: TransportFactory> {
    factory: F,
    endpoint: String,
    setup_storage: Box<dyn SetupStorage>,
    link: Option<F::Link>,
    state: ConnectionState,
    /// The authority announces our identity once per link.
    identity_received: bool,
}

impl<F: TransportFactory> SessionConnection<F> {
    pub fn new(factory: F, endpoint: String, setup_storage: Box<dyn SetupStorage>) -> Self {
        SessionConnection {
            factory,
            endpoint,
            setup_storage,
            link: None,
            state: ConnectionState::Disconnected { error: None },
            identity_received: false,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The error that ended the last link, if any.
    pub fn error(&self) -> Option<&SessionError> {
        match &self.state {
            ConnectionState::Disconnected { error } => error.as_ref(),
            _ => None,
        }
    }

    /// Starts opening a link. Does nothing while a link is opening or open.
    pub fn connect(&mut self) {
        if !matches!(self.state, ConnectionState::Disconnected { .. }) {
            tracing::debug!(state = ?self.state, "Already connecting.");
            return;
        }
        tracing::info!(endpoint = %self.endpoint, "Connecting to authority.");
        self.identity_received = false;
        match self.factory.open(&self.endpoint) {
            Ok(link) => {
                self.link = Some(link);
                self.state = ConnectionState::Opening;
            }
            Err(e) => self.mark_error(SessionError::Transport(e)),
        }
    }

    /// Closes the link without leaving an error behind.
    pub fn disconnect(&mut self) {
        if self.link.is_some() {
            tracing::info!("Disconnecting from authority.");
        }
        self.link = None;
        self.state = ConnectionState::Disconnected { error: None };
    }

    /// Encodes and sends a command over the open link.
    pub fn send(&mut self, command: &ClientCommand) -> Result<(), CommandError> {
        let (ConnectionState::Connected, Some(link)) = (&self.state, self.link.as_mut()) else {
            return Err(CommandError::NotConnected);
        };
        write_frame(link, encode_command(command))
    }

    /// Drains everything the link has to report.
    pub fn poll(&mut self) -> Vec<ConnectionUpdate> {
        let mut updates = Vec::new();
        while let Some(event) = self.link.as_mut().and_then(|link| link.poll()) {
            match event {
                TransportEvent::Opened => {
                    if let Err(e) = self.handle_opened() {
                        self.mark_error(e.clone());
                        updates.push(ConnectionUpdate::Lost(e));
                    }
                }
                TransportEvent::Text(frame) => {
                    if let Some(event) = self.handle_frame(&frame) {
                        updates.push(ConnectionUpdate::Event(event));
                    }
                }
                TransportEvent::Closed(reason) | TransportEvent::Error(reason) => {
                    tracing::warn!(%reason, "Lost connection to authority.");
                    let error = SessionError::Transport(reason);
                    self.mark_error(error.clone());
                    updates.push(ConnectionUpdate::Lost(error));
                }
            }
        }
        updates
    }

    /// The first frame on every link is the stored board setup.
    fn handle_opened(&mut self) -> Result<(), SessionError> {
        let setup = BoardSetup::from_storage(&*self.setup_storage)?;
        if !setup.is_valid() {
            tracing::warn!(
                value = setup.total_value(),
                kings = setup.king_count(),
                "Stored setup breaks the editor rules, sending it anyway."
            );
        }
        self.state = ConnectionState::Connected;
        tracing::info!("Connected, sending board setup.");
        self.send(&ClientCommand::BoardSetup {
            setup: setup.into_grid(),
        })
        .map_err(|e| SessionError::Transport(e.to_string()))
    }

    fn handle_frame(&mut self, frame: &str) -> Option<ServerEvent> {
        let event = match decode_event(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %DecodeError::from(e), "Dropping frame.");
                return None;
            }
        };
        match event {
            ServerEvent::Unknown => {
                tracing::warn!(frame, "Dropping frame with unknown type.");
                None
            }
            ServerEvent::SelfInfo { .. } if self.identity_received => {
                tracing::warn!("Dropping repeated identity announcement.");
                None
            }
            ServerEvent::SelfInfo { .. } => {
                self.identity_received = true;
                Some(event)
            }
            event => Some(event),
        }
    }

    /// Marks the error and drops the link, which closes it.
    fn mark_error(&mut self, error: SessionError) {
        self.state = ConnectionState::Disconnected { error: Some(error) };
        self.link = None;
    }
}

/// Hands an encoded frame to the link. Nothing is written if encoding failed.
fn write_frame(
    link: &mut impl Transport,
    encoded: Result<String, serde_json::Error>,
) -> Result<(), CommandError> {
    match encoded {
        Ok(frame) => {
            link.send(frame);
            Ok(())
        }
        Err(e) => {
            tracing::error!(?e, "Could not encode command.");
            Err(CommandError::EncodingFailed)
        }
    }
}

//! Client side session core for duck chess. It mirrors the authoritative game over a web socket,
//! keeps it in the frame of the viewing player, and replays remote moves one at a time.
//!
//! # Architecture Overview
//!
//! ```text
//! Presentation ──► GameSession ──► SessionConnection ──► Transport ──► Authority
//!                   │       │
//!               GameStore  MoveSequencer
//! ```
//!
//! - **Presentation**: heartbeat driven, calls [`GameSession::update`] once per frame and renders
//!   the [`SessionView`].
//! - **GameSession**: routes events into the store and moves into the sequencer.
//! - **SessionConnection**: lifecycle, board setup handshake, frame coding.
//! - **Transport**: ewebsock in production, scripted in tests.

pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod game_store;
pub mod perspective;
pub mod sequencer;
pub mod session;
pub mod setup;
pub mod traits;
pub mod web_socket_interface;

pub use config::SessionConfig;
pub use connection::ConnectionState;
pub use error::{CommandError, SessionError};
pub use game_store::{Outcome, SessionView};
pub use sequencer::{AnimationTicket, SequencerState};
pub use session::GameSession;
pub use setup::{BoardSetup, FileSetupStorage, MemorySetupStorage, SetupStorage};
pub use traits::{Transport, TransportEvent, TransportFactory};
pub use web_socket_interface::{WebSocketFactory, WebSocketTransport};

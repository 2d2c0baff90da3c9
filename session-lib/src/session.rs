//! The command surface the presentation layer talks to.
//!
//! # Frontend Integration
//!
//! Create the session before entering the frame loop and call [`GameSession::update`] at the
//! beginning of each frame. Afterwards:
//!
//! - Render [`GameSession::view`]. While disconnected show [`SessionView::error`] and offer
//!   [`GameSession::connect`] again, unless the error is a configuration error.
//! - Fetch the next move to animate with [`GameSession::next_animation`] and hand the ticket back
//!   through [`GameSession::animation_complete`] once the animation is done. The move is applied to
//!   the board at that point.
//! - Forward user input through [`GameSession::send_turn`], [`GameSession::send_chat_message`] and
//!   [`GameSession::surrender`].
//!
//! ```text
//! let mut session = GameSession::create(&config, WebSocketFactory::default(), Box::new(storage));
//! session.connect();
//! loop {
//!     session.update();
//!     if let Some((ticket, mv)) = session.next_animation() {
//!         // Start animating mv, keep the ticket.
//!     }
//!     // Animation done:
//!     session.animation_complete(ticket);
//!     draw(&session.view());
//!     next_frame().await
//! }
//! ```

use crate::config::SessionConfig;
use crate::connection::{ConnectionState, ConnectionUpdate, SessionConnection};
use crate::error::CommandError;
use crate::game_store::{GameStore, SessionView, StoreEffect};
use crate::sequencer::{AnimationTicket, MoveSequencer, SequencerState};
use crate::setup::SetupStorage;
use crate::traits::TransportFactory;
use duck_protocol::{ClientCommand, Move};

/// One client session against the authority. Owns the connection, the mirrored game, and the
/// move replay queue.
pub struct GameSession<F: TransportFactory> {
    connection: SessionConnection<F>,
    store: GameStore,
    sequencer: MoveSequencer,
}

impl<F: TransportFactory> GameSession<F> {
    /// Creates a disconnected session.
    pub fn create(config: &SessionConfig, factory: F, setup_storage: Box<dyn SetupStorage>) -> Self {
        GameSession {
            connection: SessionConnection::new(factory, config.endpoint.clone(), setup_storage),
            store: GameStore::new(),
            sequencer: MoveSequencer::new(),
        }
    }

    /// Opens the connection if there is none. Calling it again while connecting changes nothing.
    pub fn connect(&mut self) {
        self.connection.connect();
        if let Some(error) = self.connection.error() {
            tracing::info!(%error, "Session could not open a connection.");
            if self.store.connection_lost() {
                self.sequencer.cancel();
            }
        }
    }

    /// Closes the connection quietly. The mirrored state is kept.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// Toggles between [`GameSession::connect`] and [`GameSession::disconnect`].
    pub fn set_should_connect(&mut self, should_connect: bool) {
        if should_connect {
            self.connect();
        } else {
            self.disconnect();
        }
    }

    /// Tears the session down, closing the connection.
    pub fn dispose(mut self) {
        self.connection.disconnect();
    }

    /// Processes everything that arrived since the last call. Call it once per frame.
    pub fn update(&mut self) {
        let mut ended = false;
        for update in self.connection.poll() {
            match update {
                ConnectionUpdate::Event(event) => match self.store.reduce(event) {
                    StoreEffect::None => {}
                    StoreEffect::Superseded => self.sequencer.cancel(),
                    StoreEffect::QueueMoves(moves) => self.sequencer.enqueue(moves),
                    StoreEffect::Ended => ended = true,
                },
                ConnectionUpdate::Lost(error) => {
                    tracing::info!(%error, "Session lost its connection.");
                    if self.store.connection_lost() {
                        self.sequencer.cancel();
                    }
                }
            }
        }
        if ended {
            tracing::info!(won = ?self.store.local_player_won(), "Game over.");
            self.connection.disconnect();
        }
    }

    /// Snapshot of everything the presentation layer renders.
    pub fn view(&self) -> SessionView {
        let mut view = self.store.view();
        view.error = self.connection.error().cloned();
        view
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn animation_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// Moves announced but not yet applied, including the one being animated.
    pub fn pending_animations(&self) -> usize {
        self.sequencer.pending()
    }

    /// The move to animate next and the ticket to complete it with. Each move is handed out once.
    pub fn next_animation(&mut self) -> Option<(AnimationTicket, Move)> {
        self.sequencer.start_animation()
    }

    /// Applies the animated move to the board and advances to the next one. Returns false for
    /// tickets that were invalidated by a newer game state.
    pub fn animation_complete(&mut self, ticket: AnimationTicket) -> bool {
        match self.sequencer.complete(ticket) {
            Some(mv) => {
                self.store.apply_move(&mv);
                true
            }
            None => false,
        }
    }

    /// Plays `moves[move_idx]` of the piece `pieces[piece_idx]`. The offered moves are withdrawn
    /// until the authority starts the next turn.
    pub fn send_turn(&mut self, piece_idx: usize, move_idx: usize) -> Result<(), CommandError> {
        if !self.connection.is_connected() {
            return Err(CommandError::NotConnected);
        }
        let moves = self
            .store
            .moves_for_active_player()
            .ok_or(CommandError::NotYourTurn)?;
        let piece_moves = moves
            .moves
            .get(piece_idx)
            .filter(|_| piece_idx < moves.pieces.len())
            .ok_or(CommandError::PieceIndexOutOfRange(piece_idx))?;
        if move_idx >= piece_moves.len() {
            return Err(CommandError::MoveIndexOutOfRange(move_idx));
        }
        self.connection.send(&ClientCommand::Turn {
            piece_idx,
            move_idx,
        })?;
        self.store.turn_submitted();
        Ok(())
    }

    /// Sends a chat line. It shows up in the chat once the authority echoes it.
    pub fn send_chat_message(&mut self, message: impl Into<String>) -> Result<(), CommandError> {
        self.connection.send(&ClientCommand::ChatMessage {
            message: message.into(),
        })
    }

    /// Gives up. The loss is recorded right away, a later decision of the authority wins.
    pub fn surrender(&mut self) -> Result<(), CommandError> {
        self.connection.send(&ClientCommand::Surrender)?;
        self.store.surrendered();
        Ok(())
    }

    /// Disconnects and forgets everything, including chat, outcome and errors.
    pub fn reset_session(&mut self) {
        self.connection.disconnect();
        self.sequencer.cancel();
        self.store.reset();
    }
}

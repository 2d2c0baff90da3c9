//! The tagged unions that travel over the event stream.
//!
//! | Direction | Tags |
//! |-----------|------|
//! | Authority -> Client | `selfInfo`, `gameState`, `turnStart`, `move`, `chatMessage`, `fullChat`, `end` |
//! | Client -> Authority | `boardSetup`, `turn`, `chatMessage`, `surrender` |
//!
//! Inbound tags we do not know decode into [`ServerEvent::Unknown`] so newer authorities do not
//! break older clients.

use crate::board::{BoardSnapshot, ChatMessage, Clock, Coord, Move, Player, SetupGrid, UserId};
use serde::{Deserialize, Serialize};

/// Everything the authority may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The identity of the local viewer, sent once per connection.
    SelfInfo { id: UserId },
    /// Complete game state, replaces everything but the chat.
    GameState { board: BoardSnapshot, clock: Clock },
    /// A new turn begins with fresh legal moves and clock.
    TurnStart {
        turn: Player,
        #[serde(rename = "movePieces")]
        move_pieces: Vec<Coord>,
        moves: Vec<Vec<Move>>,
        clock: Clock,
    },
    /// Moves that have been played, to be animated in order. May contain null moves.
    Move { moves: Vec<Move> },
    /// A single new chat line.
    ChatMessage { message: ChatMessage },
    /// The complete chat history.
    FullChat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        chat: Vec<ChatMessage>,
    },
    /// The game is over.
    End { winner: UserId },
    /// Any tag this client does not understand.
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Short name of the event kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::SelfInfo { .. } => "selfInfo",
            ServerEvent::GameState { .. } => "gameState",
            ServerEvent::TurnStart { .. } => "turnStart",
            ServerEvent::Move { .. } => "move",
            ServerEvent::ChatMessage { .. } => "chatMessage",
            ServerEvent::FullChat { .. } => "fullChat",
            ServerEvent::End { .. } => "end",
            ServerEvent::Unknown => "unknown",
        }
    }
}

/// Everything the client may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    /// The locally stored piece placement, always the first frame after opening.
    BoardSetup { setup: SetupGrid },
    /// Picks `moves[move_idx]` of the piece `pieces[piece_idx]` from the last offered moves.
    Turn {
        #[serde(rename = "pieceIdx")]
        piece_idx: usize,
        #[serde(rename = "moveIdx")]
        move_idx: usize,
    },
    /// Sends a chat line.
    ChatMessage { message: String },
    /// Gives up the game.
    Surrender,
}

/// Decodes a single inbound text frame.
pub fn decode_event(frame: &str) -> Result<ServerEvent, serde_json::Error> {
    serde_json::from_str(frame)
}

/// Encodes a single outbound text frame.
pub fn encode_command(command: &ClientCommand) -> Result<String, serde_json::Error> {
    serde_json::to_string(command)
}

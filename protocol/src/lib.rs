//! The wire vocabulary shared between the session core and every client built on top of it.
//! All frames are JSON tagged unions keyed by a `type` field, in both directions.
//!
//! * [`board`] contains the board, pieces, moves, clock and chat entries as the authority sends them.
//! * [`message`] contains the inbound [`ServerEvent`] and the outbound [`ClientCommand`] enums.

pub mod board;
pub mod message;

pub use board::{
    Board, BoardSnapshot, ChatMessage, Clock, Coord, FloorType, Move, MoveType, MovesForTurn,
    Piece, PieceKind, Player, SetupGrid, Tile, Timer, UserId,
};
pub use message::{ClientCommand, ServerEvent, decode_event, encode_command};

/// The extension of the board in every dimension.
pub const BOARD_DIM: usize = 8;

/// The largest coordinate value on the board.
pub const MAX_COORD: i8 = BOARD_DIM as i8 - 1;

/// The number of rows a player sets up pieces on.
pub const SETUP_ROWS: usize = 2;

/// The storage key under which the setup editor persists the piece placement grid.
pub const BOARD_SETUP_KEY: &str = "boardSetup";

/// The public endpoint of the authority.
pub const DEFAULT_ENDPOINT: &str = "wss://api.alarabread.fun:80/duckchess";

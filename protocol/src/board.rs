//! Board, piece, move and clock representation in the authoritative (white relative) frame.
//! Coordinates are `[x, y]` pairs and rows are addressed as `board[y][x]`.

use crate::BOARD_DIM;
use serde::{Deserialize, Serialize};

/// Opaque participant identifier handed out by the authority.
pub type UserId = String;

/// The piece placement grid the setup editor produces: [`crate::SETUP_ROWS`] rows of
/// [`BOARD_DIM`] optional pieces.
pub type SetupGrid = Vec<Vec<Option<PieceKind>>>;

/// One of the two sides. `White` is the first player, `Black` the second one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// The other side.
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

/// The floor color of a tile, alternating by coordinate parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorType {
    Light,
    Dark,
}

impl FloorType {
    /// The floor color for the tile at the indicated position.
    pub fn for_position(x: usize, y: usize) -> FloorType {
        if (x + y) % 2 == 0 {
            FloorType::Light
        } else {
            FloorType::Dark
        }
    }
}

/// The six piece kinds. Kings and pawns carry extra state the authority needs for its rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PieceKind {
    Queen,
    King {
        #[serde(rename = "hasCastled", default)]
        has_castled: bool,
    },
    Castle,
    Bishop,
    Knight,
    Pawn {
        #[serde(rename = "hasMoved", default)]
        has_moved: bool,
    },
}

/// A piece on the board together with its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "pieceType")]
    pub piece_type: PieceKind,
    pub owner: Player,
}

/// A single board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub floor: FloorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<Piece>,
}

/// A zero based `[x, y]` board coordinate. Negative values only appear in the null move sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord(pub i8, pub i8);

impl Coord {
    /// Returns the `(column, row)` indices if the coordinate lies on the board.
    pub fn to_index(self) -> Option<(usize, usize)> {
        let dim = BOARD_DIM as i8;
        if (0..dim).contains(&self.0) && (0..dim).contains(&self.1) {
            Some((self.0 as usize, self.1 as usize))
        } else {
            None
        }
    }
}

/// How a piece travels, only relevant for visualization. A promotion names the resulting piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MoveType {
    JumpingMove,
    SlidingMove,
    Promotion { into: PieceKind },
}

/// A move from one tile to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    #[serde(rename = "moveType")]
    pub move_type: MoveType,
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    /// The authority pads move lists with entries that have a negative source, these are no-ops.
    pub fn is_null(&self) -> bool {
        self.from.0 < 0
    }
}

/// The legal moves offered for a turn. `moves[i]` belongs to the piece standing on `pieces[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovesForTurn {
    pub turn: Player,
    pub pieces: Vec<Coord>,
    pub moves: Vec<Vec<Move>>,
}

impl MovesForTurn {
    /// Checks the positional correlation between pieces and move lists.
    pub fn is_consistent(&self) -> bool {
        self.pieces.len() == self.moves.len()
    }
}

/// The board itself, whose turn it is, and the two participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub turn: Player,
    #[serde(rename = "whitePlayer")]
    pub white_player: UserId,
    #[serde(rename = "blackPlayer")]
    pub black_player: UserId,
    /// Dimensions are [`BOARD_DIM`] × [`BOARD_DIM`], enforced on decode.
    #[serde(rename = "board")]
    pub tiles: [[Tile; BOARD_DIM]; BOARD_DIM],
}

impl Board {
    /// Creates a board without pieces, white to move.
    pub fn empty(white_player: UserId, black_player: UserId) -> Board {
        let tiles = std::array::from_fn(|y| {
            std::array::from_fn(|x| Tile {
                floor: FloorType::for_position(x, y),
                piece: None,
            })
        });
        Board {
            turn: Player::White,
            white_player,
            black_player,
            tiles,
        }
    }

    /// The tile at the indicated position or `None` when it is off the board.
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        let (x, y) = coord.to_index()?;
        Some(&self.tiles[y][x])
    }

    /// Mutable access to the tile at the indicated position.
    pub fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        let (x, y) = coord.to_index()?;
        Some(&mut self.tiles[y][x])
    }

    /// The identity playing the indicated side.
    pub fn identity_of(&self, player: Player) -> &UserId {
        match player {
            Player::White => &self.white_player,
            Player::Black => &self.black_player,
        }
    }

    /// Executes a move: the piece on the source goes to the destination, the source is cleared
    /// unless it is the destination, and a promotion rewrites the piece kind.
    ///
    /// Returns false and leaves the board untouched if a coordinate is off the board.
    pub fn apply_move(&mut self, mv: &Move) -> bool {
        let (Some((from_x, from_y)), Some((to_x, to_y))) = (mv.from.to_index(), mv.to.to_index())
        else {
            return false;
        };
        let mut piece = self.tiles[from_y][from_x].piece;
        if let (Some(piece), MoveType::Promotion { into }) = (piece.as_mut(), mv.move_type) {
            piece.piece_type = into;
        }
        self.tiles[to_y][to_x].piece = piece;
        if (from_x, from_y) != (to_x, to_y) {
            self.tiles[from_y][from_x].piece = None;
        }
        true
    }
}

/// The board as carried by a full state event, bundled with the moves of the active player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(flatten)]
    pub board: Board,
    pub moves: Vec<Vec<Move>>,
    #[serde(rename = "movePieces")]
    pub move_pieces: Vec<Coord>,
}

impl BoardSnapshot {
    /// Splits the snapshot into the board and the moves for the current turn.
    pub fn into_parts(self) -> (Board, MovesForTurn) {
        let moves = MovesForTurn {
            turn: self.board.turn,
            pieces: self.move_pieces,
            moves: self.moves,
        };
        (self.board, moves)
    }
}

/// A player timer. Times are milliseconds; `end_time` is a unix epoch timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Timer {
    Paused {
        #[serde(rename = "timeRemaining")]
        time_remaining: f64,
    },
    Running {
        #[serde(rename = "endTime")]
        end_time: f64,
    },
}

impl Timer {
    pub fn is_running(&self) -> bool {
        matches!(self, Timer::Running { .. })
    }
}

/// One timer per player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub white: Timer,
    pub black: Timer,
}

impl Clock {
    pub fn timer(&self, player: Player) -> &Timer {
        match player {
            Player::White => &self.white,
            Player::Black => &self.black,
        }
    }
}

/// A single chat line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: UserId,
    pub message: String,
}

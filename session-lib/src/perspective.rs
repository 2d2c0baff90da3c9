//! Maps the authoritative, white relative frame into the frame of the viewing player and back.
//!
//! White sees the board as sent. Black sees it rotated by 180°, so each player has their own pieces
//! at the bottom. The rotation is its own inverse, the same functions convert in both directions.
//!
//! All functions take their input by value and return the rotated value. Whether that replaces the
//! original or produces a copy is the caller's decision.

use duck_protocol::{Board, Coord, MAX_COORD, Move, MovesForTurn, Player};

/// Rotates a single coordinate for the indicated viewer.
pub fn transform_coord(viewer: Player, coord: Coord) -> Coord {
    match viewer {
        Player::White => coord,
        // Wire coordinates are unchecked, wrap instead of overflowing.
        Player::Black => Coord(
            MAX_COORD.wrapping_sub(coord.0),
            MAX_COORD.wrapping_sub(coord.1),
        ),
    }
}

/// Rotates both ends of a move. The move kind stays as it is.
pub fn transform_move(viewer: Player, mv: Move) -> Move {
    Move {
        from: transform_coord(viewer, mv.from),
        to: transform_coord(viewer, mv.to),
        ..mv
    }
}

/// Rotates the movable pieces and all of their destination lists, keeping the positional pairing.
pub fn transform_moves(viewer: Player, moves: MovesForTurn) -> MovesForTurn {
    if viewer == Player::White {
        return moves;
    }
    MovesForTurn {
        turn: moves.turn,
        pieces: moves
            .pieces
            .into_iter()
            .map(|coord| transform_coord(viewer, coord))
            .collect(),
        moves: moves
            .moves
            .into_iter()
            .map(|list| list.into_iter().map(|mv| transform_move(viewer, mv)).collect())
            .collect(),
    }
}

/// Rotates every tile of the board. Reversing the rows and reversing every row is the same as
/// applying [`transform_coord`] to each tile.
pub fn transform_board(viewer: Player, mut board: Board) -> Board {
    if viewer == Player::Black {
        board.tiles.reverse();
        for row in board.tiles.iter_mut() {
            row.reverse();
        }
    }
    board
}

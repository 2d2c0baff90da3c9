//! Plain text rendering of the session view for the terminal.

use duck_protocol::{Board, PieceKind, Player};
use session_lib::SessionView;
use session_lib::clock::{now_millis, remaining_at, running_player};

fn piece_letter(kind: &PieceKind) -> char {
    match kind {
        PieceKind::Queen => 'q',
        PieceKind::King { .. } => 'k',
        PieceKind::Castle => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::Pawn { .. } => 'p',
    }
}

/// One line per row, white pieces in upper case.
pub fn render_board(board: &Board) -> String {
    let mut result = String::new();
    for row in &board.tiles {
        for tile in row {
            let symbol = match tile.piece {
                Some(piece) if piece.owner == Player::White => {
                    piece_letter(&piece.piece_type).to_ascii_uppercase()
                }
                Some(piece) => piece_letter(&piece.piece_type),
                None => '.',
            };
            result.push(symbol);
        }
        result.push('\n');
    }
    result
}

/// A one line summary of the clock, turn and outcome.
pub fn render_status(view: &SessionView) -> String {
    let mut status = format!("role {:?}, turn {:?}", view.role, view.turn);
    if let Some(clock) = &view.clock {
        let now = now_millis();
        status.push_str(&format!(
            ", white {:.0}s, black {:.0}s, running {:?}",
            remaining_at(clock.timer(Player::White), now) / 1000.0,
            remaining_at(clock.timer(Player::Black), now) / 1000.0,
            running_player(clock)
        ));
    }
    if let Some(won) = view.outcome {
        status.push_str(if won { ", won" } else { ", lost" });
    }
    status
}

//! The local mirror of the authoritative game, kept in the frame of the viewing player.
//!
//! Every inbound event is reduced by [`GameStore::reduce`]. The store holds its parts behind [`Arc`]s
//! and replaces or copies them on change, so a [`SessionView`] handed to the presentation layer is an
//! immutable snapshot that never changes under its reader.
//!
//! Moves announced by the authority are not applied here directly. The reduction returns them as a
//! [`StoreEffect::QueueMoves`] and they come back through [`GameStore::apply_move`] once their
//! animation finished.

use crate::error::SessionError;
use crate::perspective::{transform_board, transform_move, transform_moves};
use duck_protocol::{Board, ChatMessage, Clock, Move, MovesForTurn, Player, ServerEvent, UserId};
use std::sync::Arc;

/// How the game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// We gave up, the opponent is presumed to be the winner. The authority may still override this.
    Surrendered { presumed_winner: Option<UserId> },
    /// The authority declared the winner.
    Decided { winner: UserId },
}

/// What the caller has to do with the move pipeline after a reduction.
#[derive(Debug, PartialEq)]
pub enum StoreEffect {
    /// Nothing.
    None,
    /// A fresh snapshot arrived, queued and running animations are obsolete.
    Superseded,
    /// Already rotated moves to replay in order.
    QueueMoves(Vec<Move>),
    /// The game is over.
    Ended,
}

/// The read model for the presentation layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
    pub board: Option<Arc<Board>>,
    pub clock: Option<Arc<Clock>>,
    pub chat: Arc<Vec<ChatMessage>>,
    /// Only present while it is the local player's turn.
    pub moves_for_active_player: Option<Arc<MovesForTurn>>,
    /// Unknown until the first snapshot arrived.
    pub role: Option<Player>,
    pub turn: Option<Player>,
    /// `Some(true)` if the local player won.
    pub outcome: Option<bool>,
    pub identity: Option<UserId>,
    pub error: Option<SessionError>,
}

#[derive(Debug, Default)]
pub struct GameStore {
    identity: Option<UserId>,
    role: Option<Player>,
    board: Option<Arc<Board>>,
    clock: Option<Arc<Clock>>,
    chat: Arc<Vec<ChatMessage>>,
    moves: Option<Arc<MovesForTurn>>,
    outcome: Option<Outcome>,
    /// A snapshot in the authoritative frame, held back until we know which side we are on.
    held_snapshot: Option<(Board, MovesForTurn)>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces one inbound event into the state.
    pub fn reduce(&mut self, event: ServerEvent) -> StoreEffect {
        tracing::debug!(kind = event.kind(), "Reducing event.");
        match event {
            ServerEvent::SelfInfo { id } => {
                self.identity = Some(id);
                match self.held_snapshot.take() {
                    Some((board, moves)) => {
                        self.install_snapshot(board, moves);
                        StoreEffect::Superseded
                    }
                    None => StoreEffect::None,
                }
            }
            ServerEvent::GameState { board, clock } => {
                let (board, moves) = board.into_parts();
                warn_if_inconsistent(&moves);
                self.clock = Some(Arc::new(clock));
                if self.identity.is_some() {
                    self.install_snapshot(board, moves);
                } else {
                    tracing::warn!("Game state before own identity, holding it back.");
                    self.role = None;
                    self.board = None;
                    self.moves = None;
                    self.held_snapshot = Some((board, moves));
                }
                StoreEffect::Superseded
            }
            ServerEvent::TurnStart {
                turn,
                move_pieces,
                moves,
                clock,
            } => {
                let moves = MovesForTurn {
                    turn,
                    pieces: move_pieces,
                    moves,
                };
                if let Some((_, held_moves)) = self.held_snapshot.as_mut() {
                    warn_if_inconsistent(&moves);
                    self.clock = Some(Arc::new(clock));
                    *held_moves = moves;
                    return StoreEffect::None;
                }
                let (Some(role), true) = (self.role, self.board.is_some()) else {
                    tracing::warn!("Turn start before any game state, ignored.");
                    return StoreEffect::None;
                };
                warn_if_inconsistent(&moves);
                self.clock = Some(Arc::new(clock));
                self.moves = Some(Arc::new(transform_moves(role, moves)));
                StoreEffect::None
            }
            ServerEvent::Move { moves } => {
                if let Some((held_board, _)) = self.held_snapshot.as_mut() {
                    // Nothing is shown yet, so there is nothing to animate.
                    for mv in moves.iter().filter(|mv| !mv.is_null()) {
                        held_board.apply_move(mv);
                    }
                    return StoreEffect::None;
                }
                let (Some(role), true) = (self.role, self.board.is_some()) else {
                    tracing::warn!("Moves before any game state, ignored.");
                    return StoreEffect::None;
                };
                let moves: Vec<Move> = moves
                    .into_iter()
                    .filter(|mv| !mv.is_null())
                    .map(|mv| transform_move(role, mv))
                    .collect();
                if moves.is_empty() {
                    StoreEffect::None
                } else {
                    StoreEffect::QueueMoves(moves)
                }
            }
            ServerEvent::ChatMessage { message } => {
                if self.board.is_some() || self.held_snapshot.is_some() {
                    Arc::make_mut(&mut self.chat).push(message);
                } else {
                    tracing::debug!("Chat message without a game, dropped.");
                }
                StoreEffect::None
            }
            ServerEvent::FullChat { chat, .. } => {
                self.chat = Arc::new(chat);
                StoreEffect::None
            }
            ServerEvent::End { winner } => {
                self.outcome = Some(Outcome::Decided { winner });
                self.moves = None;
                StoreEffect::Ended
            }
            ServerEvent::Unknown => StoreEffect::None,
        }
    }

    /// Executes a move whose animation completed.
    pub fn apply_move(&mut self, mv: &Move) {
        let Some(board) = self.board.as_mut() else {
            tracing::warn!(?mv, "Move finished without a board, dropped.");
            return;
        };
        if !Arc::make_mut(board).apply_move(mv) {
            tracing::warn!(?mv, "Move leaves the board, dropped.");
        }
    }

    /// The connection went away. Unless the game is over the state can not be trusted anymore and
    /// gets cleared, chat survives. Returns whether something was cleared.
    pub fn connection_lost(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.board = None;
        self.clock = None;
        self.moves = None;
        self.held_snapshot = None;
        true
    }

    /// Our turn is submitted, no more move affordances until the authority answers.
    pub fn turn_submitted(&mut self) {
        self.moves = None;
    }

    /// Optimistic loss. Does not override a decision of the authority.
    pub fn surrendered(&mut self) {
        if matches!(self.outcome, Some(Outcome::Decided { .. })) {
            return;
        }
        let presumed_winner = match (&self.board, self.role) {
            (Some(board), Some(role)) => Some(board.identity_of(role.opponent()).clone()),
            _ => None,
        };
        self.outcome = Some(Outcome::Surrendered { presumed_winner });
    }

    /// Back to the state of a fresh session.
    pub fn reset(&mut self) {
        *self = GameStore::default();
    }

    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Player> {
        self.role
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_deref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Whether the local player won, once the game is over.
    pub fn local_player_won(&self) -> Option<bool> {
        match self.outcome.as_ref()? {
            Outcome::Surrendered { .. } => Some(false),
            Outcome::Decided { winner } => Some(self.identity.as_ref() == Some(winner)),
        }
    }

    /// The offered moves, but only if it is our turn.
    pub fn moves_for_active_player(&self) -> Option<&Arc<MovesForTurn>> {
        self.moves
            .as_ref()
            .filter(|moves| self.role == Some(moves.turn))
    }

    /// Builds the immutable read model.
    pub fn view(&self) -> SessionView {
        SessionView {
            board: self.board.clone(),
            clock: self.clock.clone(),
            chat: self.chat.clone(),
            moves_for_active_player: self.moves_for_active_player().cloned(),
            role: self.role,
            turn: self.moves.as_ref().map(|moves| moves.turn),
            outcome: self.local_player_won(),
            identity: self.identity.clone(),
            error: None,
        }
    }

    /// Rotates an authoritative snapshot into our frame. Needs the identity to be known.
    fn install_snapshot(&mut self, board: Board, moves: MovesForTurn) {
        let role = if self.identity.as_ref() == Some(&board.white_player) {
            Player::White
        } else {
            Player::Black
        };
        self.held_snapshot = None;
        self.role = Some(role);
        self.board = Some(Arc::new(transform_board(role, board)));
        self.moves = Some(Arc::new(transform_moves(role, moves)));
    }
}

fn warn_if_inconsistent(moves: &MovesForTurn) {
    if !moves.is_consistent() {
        tracing::warn!(
            pieces = moves.pieces.len(),
            lists = moves.moves.len(),
            "Move lists do not pair up with the movable pieces."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duck_protocol::{BoardSnapshot, Coord, MoveType, Piece, PieceKind, Timer};

    fn clock() -> Clock {
        Clock {
            white: Timer::Running { end_time: 10.0 },
            black: Timer::Paused {
                time_remaining: 10.0,
            },
        }
    }

    fn slide(from: (i8, i8), to: (i8, i8)) -> Move {
        Move {
            move_type: MoveType::SlidingMove,
            from: Coord(from.0, from.1),
            to: Coord(to.0, to.1),
        }
    }

    fn snapshot(white: &str, black: &str, turn: Player) -> ServerEvent {
        let mut board = Board::empty(white.into(), black.into());
        board.turn = turn;
        board.tile_mut(Coord(0, 0)).unwrap().piece = Some(Piece {
            piece_type: PieceKind::Castle,
            owner: Player::Black,
        });
        board.tile_mut(Coord(4, 6)).unwrap().piece = Some(Piece {
            piece_type: PieceKind::Pawn { has_moved: false },
            owner: Player::White,
        });
        ServerEvent::GameState {
            board: BoardSnapshot {
                board,
                moves: vec![vec![slide((4, 6), (4, 5))]],
                move_pieces: vec![Coord(4, 6)],
            },
            clock: clock(),
        }
    }

    fn store_for(identity: &str) -> GameStore {
        let mut store = GameStore::new();
        store.reduce(ServerEvent::SelfInfo {
            id: identity.into(),
        });
        store
    }

    #[test]
    fn white_role_keeps_board() {
        let mut store = store_for("u1");
        assert_eq!(
            store.reduce(snapshot("u1", "u2", Player::White)),
            StoreEffect::Superseded
        );
        assert_eq!(store.role(), Some(Player::White));
        let board = store.board().unwrap();
        assert!(board.tile(Coord(0, 0)).unwrap().piece.is_some());
        let moves = store.moves_for_active_player().unwrap();
        assert_eq!(moves.pieces, vec![Coord(4, 6)]);
    }

    #[test]
    fn black_role_rotates_board_and_moves() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u2", "u1", Player::Black));
        assert_eq!(store.role(), Some(Player::Black));
        let board = store.board().unwrap();
        assert!(board.tile(Coord(0, 0)).unwrap().piece.is_none());
        assert_eq!(
            board.tile(Coord(7, 7)).unwrap().piece.unwrap().piece_type,
            PieceKind::Castle
        );
        let moves = store.moves_for_active_player().unwrap();
        assert_eq!(moves.pieces, vec![Coord(3, 1)]);
        assert_eq!(moves.moves[0][0].to, Coord(3, 2));
    }

    #[test]
    fn snapshot_before_identity_waits_for_it() {
        let mut store = GameStore::new();
        assert_eq!(
            store.reduce(snapshot("u1", "u2", Player::White)),
            StoreEffect::Superseded
        );
        assert_eq!(store.role(), None);
        assert!(store.board().is_none());
        assert!(store.moves_for_active_player().is_none());
        assert!(store.view().clock.is_some());

        assert_eq!(
            store.reduce(ServerEvent::SelfInfo { id: "u1".into() }),
            StoreEffect::Superseded
        );
        assert_eq!(store.role(), Some(Player::White));
        assert!(store.board().unwrap().tile(Coord(0, 0)).unwrap().piece.is_some());
        assert_eq!(
            store.moves_for_active_player().unwrap().pieces,
            vec![Coord(4, 6)]
        );
    }

    #[test]
    fn held_snapshot_follows_later_events() {
        let mut store = GameStore::new();
        store.reduce(snapshot("u2", "u1", Player::White));
        assert_eq!(
            store.reduce(ServerEvent::Move {
                moves: vec![slide((4, 6), (4, 4))],
            }),
            StoreEffect::None
        );
        store.reduce(ServerEvent::TurnStart {
            turn: Player::Black,
            move_pieces: vec![Coord(0, 0)],
            moves: vec![vec![slide((0, 0), (0, 3))]],
            clock: clock(),
        });
        assert!(store.moves_for_active_player().is_none());

        store.reduce(ServerEvent::SelfInfo { id: "u1".into() });
        assert_eq!(store.role(), Some(Player::Black));
        let board = store.board().unwrap();
        assert!(board.tile(Coord(3, 1)).unwrap().piece.is_none());
        assert!(board.tile(Coord(3, 3)).unwrap().piece.is_some());
        let moves = store.moves_for_active_player().unwrap();
        assert_eq!(moves.pieces, vec![Coord(7, 7)]);
        assert_eq!(moves.moves[0][0].to, Coord(7, 4));
    }

    #[test]
    fn moves_hidden_when_not_our_turn() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::Black));
        assert!(store.moves_for_active_player().is_none());
        assert_eq!(store.view().turn, Some(Player::Black));
    }

    #[test]
    fn turn_start_needs_a_board() {
        let mut store = store_for("u1");
        let turn_start = ServerEvent::TurnStart {
            turn: Player::White,
            move_pieces: vec![Coord(1, 1)],
            moves: vec![vec![slide((1, 1), (1, 2))]],
            clock: clock(),
        };
        assert_eq!(store.reduce(turn_start.clone()), StoreEffect::None);
        assert!(store.view().clock.is_none());

        store.reduce(snapshot("u2", "u1", Player::White));
        store.reduce(turn_start);
        assert!(store.moves_for_active_player().is_none());
        assert_eq!(store.view().turn, Some(Player::White));
    }

    #[test]
    fn turn_start_rotates_with_current_role() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u2", "u1", Player::White));
        store.reduce(ServerEvent::TurnStart {
            turn: Player::Black,
            move_pieces: vec![Coord(0, 0)],
            moves: vec![vec![slide((0, 0), (0, 4))]],
            clock: clock(),
        });
        let moves = store.moves_for_active_player().unwrap();
        assert_eq!(moves.pieces, vec![Coord(7, 7)]);
        assert_eq!(moves.moves[0][0].to, Coord(7, 3));
    }

    #[test]
    fn move_event_filters_and_rotates() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u2", "u1", Player::White));
        let null = slide((-1, -1), (-1, -1));
        let effect = store.reduce(ServerEvent::Move {
            moves: vec![null, slide((4, 6), (4, 4))],
        });
        assert_eq!(effect, StoreEffect::QueueMoves(vec![slide((3, 1), (3, 3))]));
        // The board is not touched before the animation completes.
        assert!(store.board().unwrap().tile(Coord(3, 1)).unwrap().piece.is_some());

        assert_eq!(
            store.reduce(ServerEvent::Move { moves: vec![null] }),
            StoreEffect::None
        );
    }

    #[test]
    fn chat_needs_a_board_and_survives_snapshots() {
        let line = |text: &str| ChatMessage {
            id: "u2".into(),
            message: text.into(),
        };
        let mut store = store_for("u1");
        store.reduce(ServerEvent::ChatMessage {
            message: line("early"),
        });
        assert!(store.view().chat.is_empty());

        store.reduce(snapshot("u1", "u2", Player::White));
        store.reduce(ServerEvent::ChatMessage {
            message: line("hello"),
        });
        let before = store.view();
        store.reduce(snapshot("u1", "u2", Player::White));
        assert_eq!(store.view().chat.as_slice(), &[line("hello")]);

        store.reduce(ServerEvent::FullChat {
            id: None,
            chat: vec![line("a"), line("b")],
        });
        assert_eq!(store.view().chat.len(), 2);
        // Snapshots taken earlier are not affected by later reductions.
        assert_eq!(before.chat.as_slice(), &[line("hello")]);
    }

    #[test]
    fn end_decides_outcome() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        assert_eq!(
            store.reduce(ServerEvent::End {
                winner: "u1".into()
            }),
            StoreEffect::Ended
        );
        assert_eq!(store.local_player_won(), Some(true));
        assert!(store.moves_for_active_player().is_none());

        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        store.reduce(ServerEvent::End {
            winner: "u2".into(),
        });
        assert_eq!(store.local_player_won(), Some(false));
    }

    #[test]
    fn authority_overrides_surrender() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        store.surrendered();
        assert_eq!(
            store.outcome(),
            Some(&Outcome::Surrendered {
                presumed_winner: Some("u2".into())
            })
        );
        assert_eq!(store.local_player_won(), Some(false));
        store.reduce(ServerEvent::End {
            winner: "u1".into(),
        });
        assert_eq!(store.local_player_won(), Some(true));
        store.surrendered();
        assert_eq!(store.local_player_won(), Some(true));
    }

    #[test]
    fn connection_loss_keeps_finished_games() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        assert!(store.connection_lost());
        assert!(store.board().is_none());
        assert!(store.view().clock.is_none());

        store.reduce(snapshot("u1", "u2", Player::White));
        store.reduce(ServerEvent::End {
            winner: "u2".into(),
        });
        assert!(!store.connection_lost());
        assert!(store.board().is_some());
    }

    #[test]
    fn applied_moves_copy_on_write() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        let before = store.view();
        store.apply_move(&slide((4, 6), (4, 4)));
        let after = store.view();
        let before_board = before.board.unwrap();
        let after_board = after.board.unwrap();
        assert!(before_board.tile(Coord(4, 6)).unwrap().piece.is_some());
        assert!(after_board.tile(Coord(4, 6)).unwrap().piece.is_none());
        assert!(after_board.tile(Coord(4, 4)).unwrap().piece.is_some());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut store = store_for("u1");
        store.reduce(snapshot("u1", "u2", Player::White));
        store.reduce(ServerEvent::End {
            winner: "u1".into(),
        });
        store.reset();
        assert_eq!(store.view(), SessionView::default());
    }
}

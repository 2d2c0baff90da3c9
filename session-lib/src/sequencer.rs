//! Replays remote moves one at a time so the visible board never shows more than one transition.
//!
//! ```text
//!            enqueue (idle)                  complete (queue empty)
//!   Idle ───────────────────► Animating ─────────────────────────► Idle
//!    ▲                         │     ▲
//!    │ cancel                  │     │ complete (queue not empty): next move becomes current
//!    └─────────────────────────┘     └──┘
//! ```
//!
//! The presentation layer fetches an [`AnimationTicket`] for the current move, animates it, and hands
//! the ticket back. The ticket can not be copied, so each move completes at most once, and a ticket
//! from before a cancellation no longer matches anything.

use duck_protocol::Move;
use std::collections::VecDeque;

/// Proof that the animation of one particular move was started.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the move is only applied once the ticket is handed back"]
pub struct AnimationTicket {
    sequence: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    /// Nothing queued, nothing in flight.
    Idle,
    /// A move is current and waits for its animation to finish.
    Animating,
}

/// The move currently being animated.
#[derive(Debug)]
struct CurrentMove {
    sequence: u64,
    mv: Move,
    ticket_issued: bool,
}

/// FIFO of remote moves with exactly one current move while animating.
#[derive(Debug, Default)]
pub struct MoveSequencer {
    queue: VecDeque<Move>,
    current: Option<CurrentMove>,
    next_sequence: u64,
}

impl MoveSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends moves to the back of the queue. If we were idle the first one becomes current right away.
    pub fn enqueue(&mut self, moves: impl IntoIterator<Item = Move>) {
        self.queue.extend(moves);
        if self.current.is_none() {
            self.promote_next();
        }
    }

    pub fn state(&self) -> SequencerState {
        if self.current.is_some() {
            SequencerState::Animating
        } else {
            SequencerState::Idle
        }
    }

    /// The move being animated right now.
    pub fn current(&self) -> Option<&Move> {
        self.current.as_ref().map(|current| &current.mv)
    }

    /// All moves not yet applied, including the current one.
    pub fn pending(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// Hands out the ticket for the current move. Only the first call per move returns one.
    pub fn start_animation(&mut self) -> Option<(AnimationTicket, Move)> {
        let current = self.current.as_mut()?;
        if current.ticket_issued {
            return None;
        }
        current.ticket_issued = true;
        Some((
            AnimationTicket {
                sequence: current.sequence,
            },
            current.mv,
        ))
    }

    /// Finishes the current move and promotes the next one. Returns the finished move, which the caller
    /// applies to the board. Stale tickets return `None` and change nothing.
    pub fn complete(&mut self, ticket: AnimationTicket) -> Option<Move> {
        match &self.current {
            Some(current) if current.sequence == ticket.sequence => {}
            _ => {
                tracing::debug!(sequence = ticket.sequence, "Ignoring stale animation ticket.");
                return None;
            }
        }
        let finished = self.current.take().map(|current| current.mv);
        self.promote_next();
        finished
    }

    /// Drops everything queued and in flight.
    pub fn cancel(&mut self) {
        if self.pending() > 0 {
            tracing::debug!(dropped = self.pending(), "Cancelling move animations.");
        }
        self.queue.clear();
        self.current = None;
    }

    fn promote_next(&mut self) {
        self.current = self.queue.pop_front().map(|mv| {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            CurrentMove {
                sequence,
                mv,
                ticket_issued: false,
            }
        });
    }
}

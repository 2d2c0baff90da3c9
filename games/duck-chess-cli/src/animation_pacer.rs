//! Stands in for a real animation: holds the ticket of the move being shown until its time ran out.

use duck_protocol::Move;
use session_lib::AnimationTicket;

struct RunningAnimation {
    ticket: AnimationTicket,
    mv: Move,
    remaining_time: f32,
}

pub struct AnimationPacer {
    duration: f32,
    running: Option<RunningAnimation>,
}

impl AnimationPacer {
    pub fn new(duration: f32) -> AnimationPacer {
        AnimationPacer {
            duration,
            running: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Starts showing a move. A move still running gets replaced, its ticket is dropped.
    pub fn start(&mut self, ticket: AnimationTicket, mv: Move) {
        tracing::info!(from = ?mv.from, to = ?mv.to, "Animating move.");
        self.running = Some(RunningAnimation {
            ticket,
            mv,
            remaining_time: self.duration,
        });
    }

    /// Advances the clock and returns the ticket once the animation is over.
    pub fn update_and_take_finished(&mut self, delta_time: f32) -> Option<AnimationTicket> {
        let running = self.running.as_mut()?;
        running.remaining_time -= delta_time;
        if running.remaining_time > 0.0 {
            return None;
        }
        self.running.take().map(|finished| {
            tracing::debug!(mv = ?finished.mv, "Animation done.");
            finished.ticket
        })
    }
}

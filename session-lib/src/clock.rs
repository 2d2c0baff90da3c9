//! Helpers for reading the mirrored chess clock. The clock is displayed as the authority sent it,
//! nothing here corrects it.

use duck_protocol::{Clock, Player, Timer};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, the time base of running timers.
pub fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Remaining milliseconds of a timer at the indicated point in time.
pub fn remaining_at(timer: &Timer, now_ms: f64) -> f64 {
    match *timer {
        Timer::Paused { time_remaining } => time_remaining.max(0.0),
        Timer::Running { end_time } => (end_time - now_ms).max(0.0),
    }
}

/// The player whose timer runs, if exactly one does. Snapshots with both or none running happen
/// in between turns.
pub fn running_player(clock: &Clock) -> Option<Player> {
    match (clock.white.is_running(), clock.black.is_running()) {
        (true, false) => Some(Player::White),
        (false, true) => Some(Player::Black),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time() {
        let paused = Timer::Paused {
            time_remaining: 5000.0,
        };
        assert_eq!(remaining_at(&paused, 1.0e12), 5000.0);
        let running = Timer::Running { end_time: 10_000.0 };
        assert_eq!(remaining_at(&running, 4_000.0), 6_000.0);
        assert_eq!(remaining_at(&running, 20_000.0), 0.0);
    }

    #[test]
    fn running_player_only_when_unambiguous() {
        let paused = Timer::Paused {
            time_remaining: 1.0,
        };
        let running = Timer::Running { end_time: 1.0 };
        let clock = Clock {
            white: paused,
            black: running,
        };
        assert_eq!(running_player(&clock), Some(Player::Black));
        let clock = Clock {
            white: running,
            black: running,
        };
        assert_eq!(running_player(&clock), None);
    }
}

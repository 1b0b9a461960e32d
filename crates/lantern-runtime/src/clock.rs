//! Frame timing

use std::time::Instant;

/// Tracks total and per-frame time for the frame loop.
pub struct GameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since the last frame in seconds
    pub delta_time: f64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Clamp long stalls (debugger, window drag) to 250ms
        self.delta_time = elapsed.min(0.25);
        self.total_time += self.delta_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.total_time, 0.0);
    }

    #[test]
    fn test_time_accumulates() {
        let mut clock = GameClock::new();
        clock.tick();
        std::thread::sleep(std::time::Duration::from_millis(5));
        clock.tick();

        assert!(clock.delta_time > 0.0);
        assert!((clock.total_time - clock.delta_time).abs() < f64::EPSILON);
    }
}

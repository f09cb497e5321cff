//! Cancellable one-second countdown.
//!
//! The countdown never schedules anything itself: the host calls
//! [`Countdown::tick`] once per elapsed second and reacts to the returned
//! [`TimerEvent`]. Completion is reported exactly once per activation.

/// Default seconds-remaining marks that produce [`TimerEvent::Warning`]
pub const DEFAULT_WARNING_THRESHOLDS: [u32; 4] = [5, 3, 2, 1];

/// What happened on a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Ordinary second elapsed
    Tick { remaining: u32 },
    /// Second elapsed and `remaining` hit a warning threshold
    Warning { remaining: u32 },
    /// Count reached zero; the countdown is now stopped
    Completed,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
    warnings: Vec<u32>,
}

impl Countdown {
    /// Idle countdown displaying `duration`
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
            warnings: DEFAULT_WARNING_THRESHOLDS.to_vec(),
        }
    }

    /// Replace the warning thresholds
    pub fn with_warnings(mut self, thresholds: &[u32]) -> Self {
        self.warnings = thresholds.to_vec();
        self
    }

    /// Arm a new activation, discarding any in-flight one
    pub fn start(&mut self, duration: u32) {
        self.duration = duration;
        self.remaining = duration;
        self.running = true;
    }

    /// Advance by one second
    ///
    /// Returns `None` when the countdown is not running, including every
    /// tick after completion.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.running = false;
            return Some(TimerEvent::Completed);
        }

        if self.warnings.contains(&self.remaining) {
            Some(TimerEvent::Warning {
                remaining: self.remaining,
            })
        } else {
            Some(TimerEvent::Tick {
                remaining: self.remaining,
            })
        }
    }

    /// Stop without completing and show `duration` again
    pub fn reset(&mut self, duration: u32) {
        self.running = false;
        self.duration = duration;
        self.remaining = duration;
    }

    /// Stop without completing, keeping the displayed time
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Format seconds as `mm:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_exactly_once() {
        let mut timer = Countdown::new(30);
        timer.start(30);

        let completions = (0..30)
            .filter_map(|_| timer.tick())
            .filter(|e| *e == TimerEvent::Completed)
            .count();
        assert_eq!(completions, 1);
        assert!(!timer.is_running());

        // Further ticks are silent
        for _ in 0..5 {
            assert_eq!(timer.tick(), None);
        }
    }

    #[test]
    fn test_completion_on_last_tick_only() {
        let mut timer = Countdown::new(3);
        timer.start(3);
        assert_eq!(timer.tick(), Some(TimerEvent::Warning { remaining: 2 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Warning { remaining: 1 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Completed));
    }

    #[test]
    fn test_reset_suppresses_completion() {
        let mut timer = Countdown::new(10);
        timer.start(10);
        for _ in 0..9 {
            assert_ne!(timer.tick(), Some(TimerEvent::Completed));
        }
        timer.reset(10);
        assert_eq!(timer.remaining(), 10);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_restart_after_reset_gets_new_completion() {
        let mut timer = Countdown::new(2);
        timer.start(2);
        timer.tick();
        timer.reset(2);
        timer.start(2);
        assert_eq!(timer.tick(), Some(TimerEvent::Warning { remaining: 1 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Completed));
    }

    #[test]
    fn test_warning_thresholds() {
        let mut timer = Countdown::new(7);
        timer.start(7);
        let events: Vec<_> = std::iter::from_fn(|| timer.tick()).collect();
        assert_eq!(
            events,
            vec![
                TimerEvent::Tick { remaining: 6 },
                TimerEvent::Warning { remaining: 5 },
                TimerEvent::Tick { remaining: 4 },
                TimerEvent::Warning { remaining: 3 },
                TimerEvent::Warning { remaining: 2 },
                TimerEvent::Warning { remaining: 1 },
                TimerEvent::Completed,
            ]
        );
    }

    #[test]
    fn test_custom_warnings() {
        let mut timer = Countdown::new(4).with_warnings(&[3]);
        timer.start(4);
        assert_eq!(timer.tick(), Some(TimerEvent::Warning { remaining: 3 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Tick { remaining: 2 }));
    }

    #[test]
    fn test_cancel_keeps_display() {
        let mut timer = Countdown::new(10);
        timer.start(10);
        timer.tick();
        timer.cancel();
        assert_eq!(timer.remaining(), 9);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_idle_timer_does_not_tick() {
        let mut timer = Countdown::new(5);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(2700), "45:00");
    }
}

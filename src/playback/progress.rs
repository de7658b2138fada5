//! Progress polling and the drag-seek gesture.

use std::time::{Duration, Instant};

/// A single repeating deadline, polled by the controlling loop.
///
/// There is never more than one pending deadline: starting a running timer
/// does nothing, and a delayed restart replaces the current deadline.
#[derive(Debug, Clone)]
pub struct ProgressTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start ticking one interval from `now`. Returns false if the timer was
    /// already running (its deadline is left untouched).
    pub fn start(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Run again after `delay` instead of a full interval.
    pub fn restart_after(&mut self, now: Instant, delay: Duration) {
        self.next_due = Some(now + delay);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| due <= now)
    }

    /// Re-arm for the next tick after one fired.
    pub fn rearm(&mut self, now: Instant) {
        if self.next_due.is_some() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due
    }
}

/// State of an in-progress drag on the seek control.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SeekGesture {
    active: bool,
    target_ns: u64,
    was_playing: bool,
}

impl SeekGesture {
    pub fn begin(&mut self, was_playing: bool, current_ns: u64) {
        self.active = true;
        self.was_playing = was_playing;
        self.target_ns = current_ns;
    }

    /// Map the pointer's horizontal travel onto `[0, duration_ns]`.
    ///
    /// The position is `start_x + offset_x` over `width`, clamped to the
    /// control, so dragging past either edge lands exactly on 0 or the
    /// duration. Returns `None` (and changes nothing) when no drag is
    /// active or the control has no width.
    pub fn update(
        &mut self,
        start_x: f64,
        offset_x: f64,
        width: f64,
        duration_ns: u64,
    ) -> Option<u64> {
        if !self.active || width.is_nan() || width <= 0.0 {
            return None;
        }
        let fraction = ((start_x + offset_x) / width).clamp(0.0, 1.0);
        let target = if fraction.is_nan() {
            0
        } else {
            ((duration_ns as f64) * fraction).round() as u64
        };
        self.target_ns = target.min(duration_ns);
        Some(self.target_ns)
    }

    /// Set the target directly, clamped to the duration when it is known.
    pub fn set_target(&mut self, target_ns: u64, duration_ns: u64) {
        self.target_ns = if duration_ns > 0 {
            target_ns.min(duration_ns)
        } else {
            target_ns
        };
    }

    /// Finish the drag and return the final target. `None` if no drag was
    /// in progress.
    pub fn end(&mut self) -> Option<u64> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.target_ns)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn was_playing(&self) -> bool {
        self.was_playing
    }
}

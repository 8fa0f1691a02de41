// ABOUTME: Slide navigation state machine for the bitacora carousel
// ABOUTME: Gates next/previous/go-to behind a time-boxed transition lock

use log::{debug, warn};
use std::time::{Duration, Instant};

/// Which way the outgoing slide animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// Snapshot of the navigator for rendering and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current_index: usize,
    pub transition_lock: bool,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    target: usize,
    direction: Direction,
    deadline: Instant,
}

/// Idle while `pending` is empty, Transitioning otherwise.
#[derive(Debug, Clone)]
pub struct SlideNavigator {
    count: usize,
    current: usize,
    window: Duration,
    pending: Option<Transition>,
}

impl SlideNavigator {
    /// `count` is clamped to at least one slide.
    pub fn new(count: usize, window: Duration) -> Self {
        if count == 0 {
            warn!("Navigator created with no slides, assuming one");
        }
        Self {
            count: count.max(1),
            current: 0,
            window,
            pending: None,
        }
    }

    pub fn next(&mut self, now: Instant) -> bool {
        let target = (self.current + 1) % self.count;
        self.begin(target, Direction::Forward, now)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        let target = (self.current + self.count - 1) % self.count;
        self.begin(target, Direction::Backward, now)
    }

    pub fn go_to(&mut self, index: usize, now: Instant) -> bool {
        if index == self.current {
            return false;
        }
        if index >= self.count {
            warn!(
                "Ignoring request for slide {} of {}",
                index + 1,
                self.count
            );
            return false;
        }
        let direction = if index > self.current {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.begin(index, direction, now)
    }

    fn begin(&mut self, target: usize, direction: Direction, now: Instant) -> bool {
        if self.pending.is_some() {
            debug!("Navigation ignored, transition in progress");
            return false;
        }
        debug!(
            "Transition {} from slide {} to {}",
            direction.as_str(),
            self.current + 1,
            target + 1
        );
        self.pending = Some(Transition {
            target,
            direction,
            deadline: now + self.window,
        });
        true
    }

    /// Commit a finished transition. Returns the new index when one was committed.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let transition = self.pending?;
        if now < transition.deadline {
            return None;
        }
        self.pending = None;
        self.current = transition.target;
        Some(self.current)
    }

    pub fn state(&self) -> NavigationState {
        NavigationState {
            current_index: self.current,
            transition_lock: self.pending.is_some(),
            direction: self.pending.map(|t| t.direction),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_locked(&self) -> bool {
        self.pending.is_some()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|t| t.deadline)
    }
}

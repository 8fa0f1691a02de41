// ABOUTME: Automatic image rotation for the bitacora carousel
// ABOUTME: Cycles the displayed image of the current talk on a fixed interval

use log::debug;
use std::time::{Duration, Instant};

/// Cycles through one talk's image set.
///
/// The timer is an owned deadline: it only exists while there is more than one
/// image to show, and installing a new set always replaces it.
#[derive(Debug, Clone)]
pub struct ImageRotator {
    images: Vec<String>,
    index: usize,
    interval: Duration,
    next_advance: Option<Instant>,
}

impl ImageRotator {
    pub fn new(interval: Duration) -> Self {
        Self {
            images: Vec::new(),
            index: 0,
            interval,
            next_advance: None,
        }
    }

    /// Install a new image set, restarting from the first image.
    pub fn set_images(&mut self, images: Vec<String>, now: Instant) {
        self.images = images;
        self.index = 0;
        self.next_advance = if self.images.len() > 1 {
            Some(now + self.interval)
        } else {
            None
        };
        debug!(
            "Rotating {} images, timer {}",
            self.images.len(),
            if self.next_advance.is_some() { "armed" } else { "off" }
        );
    }

    /// Drop the current set and stop the timer.
    pub fn clear(&mut self) {
        self.images.clear();
        self.index = 0;
        self.next_advance = None;
    }

    /// Advance once per elapsed interval. Returns true if the index moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut moved = false;
        while let Some(deadline) = self.next_advance {
            if now < deadline {
                break;
            }
            self.index = (self.index + 1) % self.images.len();
            self.next_advance = Some(deadline + self.interval);
            moved = true;
        }
        moved
    }

    /// Show a specific image. The automatic timer keeps its schedule.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.images.len() || index == self.index {
            return false;
        }
        self.index = index;
        true
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    pub fn is_running(&self) -> bool {
        self.next_advance.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_advance
    }
}

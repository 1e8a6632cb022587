//! Load cells for driving the firmware from tests and demos.

use std::collections::VecDeque;
use std::time::Duration;

use weigh_traits::{BoxError, LoadCell};

/// Plays back a fixed sequence, then repeats the last value forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoadCell {
    queue: VecDeque<i32>,
    last: i32,
}

impl ScriptedLoadCell {
    pub fn new(samples: impl IntoIterator<Item = i32>) -> Self {
        Self {
            queue: samples.into_iter().collect(),
            last: 0,
        }
    }
}

impl LoadCell for ScriptedLoadCell {
    fn read_raw(&mut self, _timeout: Duration) -> Result<i32, BoxError> {
        if let Some(v) = self.queue.pop_front() {
            self.last = v;
        }
        Ok(self.last)
    }
}

/// A load cell that always errors on read.
pub struct FailingLoadCell;

impl LoadCell for FailingLoadCell {
    fn read_raw(&mut self, _timeout: Duration) -> Result<i32, BoxError> {
        Err(Box::new(std::io::Error::other("load cell not responding")))
    }
}

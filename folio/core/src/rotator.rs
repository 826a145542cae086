//! Content Rotator
//!
//! Cycles through a fixed list of labels on a fixed cadence. Index and
//! label travel together in one [`RotationState`] so a reader never sees a
//! label that does not belong to the index.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::RotationConfig;
use crate::subscription::TaskGuard;

/// Rotator construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotatorError {
    /// Rotation needs at least one label
    #[error("rotation label list is empty")]
    Empty,
}

/// Label currently shown by the rotator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Position in the label list
    pub index: usize,
    /// Label at `index`
    pub label: Arc<str>,
}

/// Fixed-cadence label rotation
#[derive(Clone, Debug)]
pub struct ContentRotator {
    labels: Arc<[Arc<str>]>,
    interval: Duration,
}

impl ContentRotator {
    /// Rotator over `labels`, advancing every `interval`
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::Empty`] if `labels` yields nothing.
    pub fn new<I, S>(labels: I, interval: Duration) -> Result<Self, RotatorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Arc<[Arc<str>]> = labels.into_iter().map(|l| Arc::from(l.as_ref())).collect();
        if labels.is_empty() {
            return Err(RotatorError::Empty);
        }
        Ok(Self { labels, interval })
    }

    /// Rotator built from the rotation section of the engine config
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::Empty`] if the label list is empty.
    pub fn from_config(config: &RotationConfig) -> Result<Self, RotatorError> {
        Self::new(&config.labels, config.interval)
    }

    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; construction rejects empty lists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// State at `index`, wrapped into range
    #[must_use]
    pub fn state_at(&self, index: usize) -> RotationState {
        let index = index % self.labels.len();
        RotationState {
            index,
            label: Arc::clone(&self.labels[index]),
        }
    }

    /// State before the first advance
    #[must_use]
    pub fn initial(&self) -> RotationState {
        self.state_at(0)
    }

    /// Labels in rotation order, forever, starting at index 0
    #[must_use]
    pub fn cycle(&self) -> LabelCycle {
        LabelCycle {
            labels: Arc::clone(&self.labels),
            next: 0,
        }
    }

    /// Spawn the rotation task.
    ///
    /// Resets `state` to index 0 and holds it for one full interval before
    /// the first advance. Spawning again restarts from 0.
    pub fn spawn(&self, state: Arc<watch::Sender<RotationState>>) -> TaskGuard {
        let rotator = self.clone();
        let interval = self.interval;
        state.send_replace(rotator.initial());

        tracing::debug!(
            interval_ms = interval.as_millis() as u64,
            labels = rotator.len(),
            "Starting rotator"
        );

        let first = Instant::now() + interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut index = 0usize;

            loop {
                ticker.tick().await;
                index = (index + 1) % rotator.len();
                let next = rotator.state_at(index);
                tracing::trace!(index, label = %next.label, "Rotated label");
                state.send_replace(next);
            }
        });

        TaskGuard::new("rotator", handle)
    }
}

/// Infinite iterator over a rotator's labels
#[derive(Clone, Debug)]
pub struct LabelCycle {
    labels: Arc<[Arc<str>]>,
    next: usize,
}

impl Iterator for LabelCycle {
    type Item = RotationState;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        self.next = (self.next + 1) % self.labels.len();
        Some(RotationState {
            index,
            label: Arc::clone(&self.labels[index]),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

//! Per-recipient delivery outcomes for fan-out operations.

use crate::error::DeliveryError;

/// Result of delivering one message to one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(DeliveryError),
}

impl From<Result<(), DeliveryError>> for Delivery {
    fn from(result: Result<(), DeliveryError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Outcomes of a fan-out, keyed by recipient.
///
/// A failure for one recipient never prevents delivery to the others; the
/// report is how the caller learns which ones failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport<K> {
    outcomes: Vec<(K, Delivery)>,
}

impl<K> Default for DeliveryReport<K> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<K> DeliveryReport<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, recipient: K, outcome: impl Into<Delivery>) {
        self.outcomes.push((recipient, outcome.into()));
    }

    pub fn outcomes(&self) -> &[(K, Delivery)] {
        &self.outcomes
    }

    pub fn delivered(&self) -> impl Iterator<Item = &K> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Delivery::Delivered))
            .map(|(k, _)| k)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&K, DeliveryError)> {
        self.outcomes.iter().filter_map(|(k, o)| match o {
            Delivery::Failed(e) => Some((k, *e)),
            Delivery::Delivered => None,
        })
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every recipient was reached.
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}

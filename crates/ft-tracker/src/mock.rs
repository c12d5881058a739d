//! In-memory source and sink for tests.
//!
//! `MockSensorSource` replays scripted samples (or errors) in FIFO order;
//! `MemorySink` records everything it is handed.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use ft_protocol::{Alert, TelemetryReading};

use crate::sink::AlertSink;
use crate::source::{RawSample, SensorSource, SourceError, SourceResult};

/// Sensor source with a scripted queue of results.
pub struct MockSensorSource {
    queue: Mutex<VecDeque<SourceResult<RawSample>>>,
}

impl MockSensorSource {
    /// Create a mock with nothing queued.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a mock pre-loaded with samples.
    pub fn with_samples(samples: Vec<RawSample>) -> Self {
        Self {
            queue: Mutex::new(samples.into_iter().map(Ok).collect()),
        }
    }

    /// Queue an additional sample.
    pub fn queue_sample(&self, sample: RawSample) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).push_back(Ok(sample));
    }

    /// Queue an error for the next read.
    pub fn queue_error(&self, error: SourceError) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).push_back(Err(error));
    }

    /// Results still queued.
    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for MockSensorSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorSource for MockSensorSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn next_sample(&self) -> SourceResult<RawSample> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(SourceError::Exhausted))
    }
}

/// Sink that keeps every published cycle.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<(TelemetryReading, Vec<Alert>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reading published so far.
    pub fn readings(&self) -> Vec<TelemetryReading> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(r, _)| r.clone())
            .collect()
    }

    /// Every alert published so far, in order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flat_map(|(_, a)| a.iter().cloned())
            .collect()
    }

    /// Number of published cycles.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AlertSink for MemorySink {
    async fn publish(&self, reading: &TelemetryReading, alerts: &[Alert]) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((reading.clone(), alerts.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn mock_source_fifo_then_exhausted() {
        let source = MockSensorSource::with_samples(vec![RawSample::default()]);
        source.queue_error(SourceError::Parse {
            line: 3,
            reason: "bad".into(),
        });
        assert_eq!(source.remaining(), 2);
        assert!(source.next_sample().await.is_ok());
        assert!(matches!(
            source.next_sample().await,
            Err(SourceError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            source.next_sample().await,
            Err(SourceError::Exhausted)
        ));
    }

    #[tokio::test]
    async fn memory_sink_records() {
        let sink = MemorySink::new();
        let reading = TelemetryReading::new(3, Utc::now());
        sink.publish(&reading, &[]).await;
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.readings()[0].vehicle_id, 3);
        assert!(sink.alerts().is_empty());
    }
}

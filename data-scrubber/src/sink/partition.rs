//! Per-instrument partitioning of the merged stream

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::error::{ScrubError, ScrubResult};
use crate::schema::CanonicalEvent;

/// Default capacity of the queue between merge and partitioner
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Groups events by instrument id, keeping arrival order within each group
#[derive(Debug)]
pub struct Partitioner<E> {
    groups: BTreeMap<String, Vec<E>>,
    events: usize,
}

impl<E: CanonicalEvent> Default for Partitioner<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CanonicalEvent> Partitioner<E> {
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
            events: 0,
        }
    }

    pub fn push(&mut self, event: E) {
        self.events += 1;
        if let Some(group) = self.groups.get_mut(event.instrument_id()) {
            group.push(event);
        } else {
            self.groups.insert(event.instrument_id().to_string(), vec![event]);
        }
    }

    /// Number of events pushed so far
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Partitions keyed by instrument id, ordered by id
    pub fn into_partitions(self) -> BTreeMap<String, Vec<E>> {
        self.groups
    }
}

/// Feed a merged stream through a bounded queue into a partitioner running
/// on its own thread. The producer blocks while the queue is full.
pub fn partition_stream<E, I>(merged: I, capacity: usize) -> ScrubResult<BTreeMap<String, Vec<E>>>
where
    E: CanonicalEvent,
    I: Iterator<Item = E>,
{
    let (tx, rx) = mpsc::sync_channel::<E>(capacity.max(1));

    thread::scope(|scope| {
        let consumer = thread::Builder::new()
            .name("partitioner".to_string())
            .spawn_scoped(scope, move || {
                let mut partitioner = Partitioner::new();
                for event in rx {
                    partitioner.push(event);
                }
                debug!("Partitioned {} events", partitioner.len());
                partitioner.into_partitions()
            })?;

        for event in merged {
            if tx.send(event).is_err() {
                // Consumer is gone; its join below reports why
                break;
            }
        }
        drop(tx);

        consumer.join().map_err(|_| ScrubError::Worker {
            index: 0,
            message: "partitioner panicked".to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ev {
        id: &'static str,
        ts: i64,
    }

    impl CanonicalEvent for Ev {
        fn instrument_id(&self) -> &str {
            self.id
        }

        fn local_timestamp_ns(&self) -> i64 {
            self.ts
        }
    }

    fn sample() -> Vec<Ev> {
        vec![
            Ev { id: "600000.SH", ts: 1 },
            Ev { id: "000001.SZ", ts: 2 },
            Ev { id: "600000.SH", ts: 3 },
            Ev { id: "000001.SZ", ts: 3 },
            Ev { id: "600000.SH", ts: 4 },
        ]
    }

    #[test]
    fn test_partitioner_groups_in_order() {
        let mut p = Partitioner::new();
        for e in sample() {
            p.push(e);
        }
        assert_eq!(p.len(), 5);
        let parts = p.into_partitions();
        assert_eq!(parts.len(), 2);
        let sh: Vec<i64> = parts["600000.SH"].iter().map(|e| e.ts).collect();
        assert_eq!(sh, vec![1, 3, 4]);
        let keys: Vec<&String> = parts.keys().collect();
        assert_eq!(keys, vec!["000001.SZ", "600000.SH"]);
    }

    #[test]
    fn test_partition_stream_tiny_queue() {
        let parts = partition_stream(sample().into_iter(), 1).unwrap();
        let sz: Vec<i64> = parts["000001.SZ"].iter().map(|e| e.ts).collect();
        assert_eq!(sz, vec![2, 3]);
        assert_eq!(parts["600000.SH"].len(), 3);
    }

    #[test]
    fn test_partition_stream_empty() {
        let parts = partition_stream(Vec::<Ev>::new().into_iter(), DEFAULT_QUEUE_CAPACITY).unwrap();
        assert!(parts.is_empty());
    }
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::event::{Event, EventEnvelope, EventId, EventKind};

/// Journal length used by [`EventBus::new`].
pub const DEFAULT_JOURNAL_CAPACITY: usize = 1_024;

/// Identifier counter and replay ring, guarded together so that stamping,
/// journaling and broadcasting happen in one critical section.
struct Journal {
    last_id: EventId,
    entries: VecDeque<EventEnvelope>,
    capacity: usize,
}

impl Journal {
    fn record(&mut self, event: Event) -> EventEnvelope {
        self.last_id += 1;
        let envelope = EventEnvelope {
            id: self.last_id,
            timestamp: Utc::now(),
            event,
        };
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(envelope.clone());
        envelope
    }

    fn after(&self, since: EventId) -> VecDeque<EventEnvelope> {
        self.entries
            .iter()
            .skip_while(|envelope| envelope.id <= since)
            .cloned()
            .collect()
    }
}

/// Cloneable handle to a shared journal and its live broadcast channel.
///
/// Once the channel overflows, slow subscribers skip the oldest events; the journal
/// keeps the newest `capacity` entries regardless of subscribers.
#[derive(Clone)]
pub struct EventBus {
    journal: Arc<Mutex<Journal>>,
    live: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Bus whose journal and channel hold `capacity` events (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let journal = Journal {
            last_id: 0,
            entries: VecDeque::with_capacity(capacity),
            capacity,
        };
        Self {
            journal: Arc::new(Mutex::new(journal)),
            live: broadcast::channel(capacity).0,
        }
    }

    /// Bus holding [`DEFAULT_JOURNAL_CAPACITY`] events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }

    /// Stamp, journal and broadcast `event`, returning its identifier.
    pub fn publish(&self, event: Event) -> EventId {
        let mut journal = self.lock();
        let envelope = journal.record(event);
        let id = envelope.id;
        // No receivers is not an error; the journal still holds the event.
        let _ = self.live.send(envelope);
        id
    }

    /// Follow the live feed. With `since_id`, journaled events newer than it are
    /// yielded first; the hand-off to the live feed neither repeats nor skips events.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let journal = self.lock();
        let replay = since_id.map_or_else(VecDeque::new, |since| journal.after(since));
        EventStream {
            replay,
            live: self.live.subscribe(),
        }
    }

    /// Journaled events, oldest first.
    #[must_use]
    pub fn recent(&self) -> Vec<EventEnvelope> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Journaled events of one kind, oldest first.
    #[must_use]
    pub fn recent_of(&self, kind: EventKind) -> Vec<EventEnvelope> {
        self.lock()
            .entries
            .iter()
            .filter(|envelope| envelope.event.kind() == kind)
            .cloned()
            .collect()
    }

    /// Journaled events concerning `item_id`, oldest first.
    #[must_use]
    pub fn history_of(&self, item_id: Uuid) -> Vec<EventEnvelope> {
        self.lock()
            .entries
            .iter()
            .filter(|envelope| envelope.event.item_id() == Some(item_id))
            .cloned()
            .collect()
    }

    /// Identifier of the latest published event.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let last = self.lock().last_id;
        (last > 0).then_some(last)
    }

    fn lock(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription returned by [`EventBus::subscribe`].
pub struct EventStream {
    replay: VecDeque<EventEnvelope>,
    live: broadcast::Receiver<EventEnvelope>,
}

impl EventStream {
    /// Next event, or `None` once every bus handle is dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(envelope) = self.replay.pop_front() {
            return Some(envelope);
        }
        loop {
            match self.live.recv().await {
                Ok(envelope) => break Some(envelope),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break None,
            }
        }
    }
}

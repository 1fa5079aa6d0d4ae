//! Domain event bus for resolution passes.
//!
//! Every published [`Event`] is stamped into an [`EventEnvelope`] with a sequential
//! identifier and kept in a bounded journal, so late subscribers such as dashboards or
//! audit sinks can catch up on recent renames before following the live feed.
//! Publishing never blocks and works from synchronous code.

mod bus;
mod event;

pub use bus::{DEFAULT_JOURNAL_CAPACITY, EventBus, EventStream};
pub use event::{Event, EventEnvelope, EventId, EventKind};

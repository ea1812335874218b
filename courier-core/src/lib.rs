//! Courier core: delivery records, id sequences, stores, transactional outbox, relay.

pub mod bus;
pub mod model;
pub mod outbox;
pub mod relay;
pub mod sequence;
pub mod store;

pub use bus::{BusError, ChannelBus, EventBus};
pub use model::{DeliveryId, DeliveryRecord, DeliveryStatus, OrderId};
pub use outbox::{OutboxEvent, OutboxMessage, OutboxStorage};
pub use relay::{OutboxRelay, RelayError, RelayTrigger};
pub use sequence::{AllocationError, AtomicSequence, IdSource};
pub use store::{DeliveryStore, InMemoryStore, InsertOutcome, SqliteStore, StoreError};

pub mod aw_client;
pub mod event_store;

pub use aw_client::ActivityWatchClient;
pub use event_store::{EventStore, StoreError};

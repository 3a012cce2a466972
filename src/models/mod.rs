pub mod activity;
pub mod event;

pub use activity::ActivityRecord;
pub use event::{NewEvent, StoredEvent};

//! # relief-events
//!
//! Vocabulary shared by the coordinator and its clients.
//!
//! - Status enums for inventory items, volunteers and tasks, plus task
//!   priority and alert severity. Wire names are snake_case; the legacy
//!   display names (`On-Mission`, `In Progress`, ...) are accepted on input.
//! - Ephemeral push payloads: [`AlertEvent`] for operator broadcasts and
//!   [`InventoryNotice`] for field-reported inventory changes.
//! - [`PushFrame`], the envelope written to every push-channel listener,
//!   and [`ClientFrame`], what a listener may send back.
//!
//! Nothing in here is persisted.

mod envelope;
mod error;
mod types;

pub use envelope::*;
pub use error::EventError;
pub use types::*;

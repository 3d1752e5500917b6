//! In-memory record stores for the coordination engine.
//!
//! This module provides:
//! - [`CampStore`]: camps, inventory and derived priority
//! - [`VolunteerRegistry`]: volunteers and their spatial index
//! - [`TaskLifecycleManager`]: tasks and the volunteer status coupling
//!
//! Every record sits behind its own lock. A mutation and the derived state
//! it triggers are computed inside that lock; stores reference each other
//! by id only.

pub mod camps;
mod error;
pub mod tasks;
pub mod volunteers;

pub use camps::{Camp, CampStore, NewCamp, PrioritizedCamp};
pub use error::CoordinationError;
pub use tasks::{NewTask, Task, TaskLifecycleManager, TaskSettings, TransitionPolicy};
pub use volunteers::{NewVolunteer, Volunteer, VolunteerFilter, VolunteerRegistry};

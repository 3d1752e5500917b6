//! # relief-id
//!
//! Typed identifiers for camps, volunteers, tasks and push-channel
//! listeners.
//!
//! Every id renders as `{prefix}_{ulid}`:
//! - `camp_01HV4Z2WQXKJNM8GPQY6VBKC3D`
//! - `vol_01HV4Z3MXNKPQR9HSTZ7WCLD4E`
//! - `task_01HV4Z4NYPLTRS0JTUA8XDME5F`
//!
//! The prefix keeps a volunteer id from being accepted where a camp id is
//! expected. ULID bodies come from one process-wide monotonic generator,
//! so ids sort in allocation order even within a single millisecond; the
//! stores rely on this for listing order.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-exported so the `define_id!` expansion resolves in downstream crates.
pub use ulid::Ulid;

use std::sync::{LazyLock, Mutex};

static GENERATOR: LazyLock<Mutex<ulid::Generator>> =
    LazyLock::new(|| Mutex::new(ulid::Generator::new()));

/// Next ULID from the shared monotonic generator.
///
/// Falls back to a plain ULID if the random part would overflow within
/// one millisecond.
#[doc(hidden)]
pub fn next_ulid() -> Ulid {
    let mut generator = GENERATOR.lock().unwrap_or_else(|e| e.into_inner());
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

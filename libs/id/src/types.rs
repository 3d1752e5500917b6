//! Id types for every record the coordinator owns or references.

use crate::define_id;

// =============================================================================
// Records
// =============================================================================

define_id!(CampId, "camp", "camp");
define_id!(VolunteerId, "vol", "volunteer");
define_id!(TaskId, "task", "task");

// =============================================================================
// Connections and Requests
// =============================================================================

define_id!(ListenerId, "lsn", "alert listener");
define_id!(RequestId, "req", "request");

// =============================================================================
// Tests
// =============================================================================

//! Application state shared across request handlers.

use std::sync::Arc;

use crate::alerts::AlertBroadcaster;
use crate::dispatch::DispatchMatcher;
use crate::store::{CampStore, TaskLifecycleManager, TaskSettings, VolunteerRegistry};

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    camps: Arc<CampStore>,
    volunteers: Arc<VolunteerRegistry>,
    matcher: DispatchMatcher,
    tasks: TaskLifecycleManager,
    alerts: AlertBroadcaster,
}

impl AppState {
    /// Wires the stores together around one alert broadcaster.
    pub fn new(settings: TaskSettings, alerts: AlertBroadcaster) -> Self {
        let camps = Arc::new(CampStore::new());
        let volunteers = Arc::new(VolunteerRegistry::new());
        let matcher = DispatchMatcher::new(volunteers.clone());
        let tasks = TaskLifecycleManager::new(camps.clone(), volunteers.clone(), settings);
        Self {
            inner: Arc::new(AppStateInner {
                camps,
                volunteers,
                matcher,
                tasks,
                alerts,
            }),
        }
    }

    pub fn camps(&self) -> &CampStore {
        &self.inner.camps
    }

    pub fn volunteers(&self) -> &VolunteerRegistry {
        &self.inner.volunteers
    }

    pub fn matcher(&self) -> &DispatchMatcher {
        &self.inner.matcher
    }

    pub fn tasks(&self) -> &TaskLifecycleManager {
        &self.inner.tasks
    }

    pub fn alerts(&self) -> &AlertBroadcaster {
        &self.inner.alerts
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TaskSettings::default(), AlertBroadcaster::default())
    }
}

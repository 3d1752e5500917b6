//! API v1 routes.

mod alerts;
mod camps;
mod coordination;
mod dispatch;
mod stats;
mod tasks;
mod volunteers;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Create API v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/camps", camps::routes())
        .nest("/coordination", coordination::routes())
        .nest("/volunteers", volunteers::routes())
        .nest("/dispatch", dispatch::routes())
        .nest("/tasks", tasks::routes())
        .nest("/alerts", alerts::routes())
        .nest("/stats", stats::routes())
}

/// Envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

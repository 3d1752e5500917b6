//! Read-side summary.

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use relief_events::{TaskStatus, VolunteerStatus};
use serde::Serialize;

use crate::state::AppState;
use crate::store::{Camp, Task, Volunteer, VolunteerFilter};

/// Stored score above which a camp counts as critical.
const CRITICAL_CAMP_SCORE: u32 = 50;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(stats))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatsResponse {
    pub camps: CampStats,
    pub volunteers: VolunteerStats,
    pub tasks: TaskStats,
    /// Quantity per item name across all camps.
    pub supplies: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CampStats {
    pub total: usize,
    pub critical: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct VolunteerStats {
    pub total: usize,
    pub available: usize,
    pub on_mission: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

fn summarize(camps: &[Camp], volunteers: &[Volunteer], tasks: &[Task]) -> StatsResponse {
    let mut supplies = BTreeMap::new();
    for line in camps.iter().flat_map(|c| &c.inventory) {
        *supplies.entry(line.item.clone()).or_insert(0u64) += line.quantity;
    }

    let volunteers_in = |s: VolunteerStatus| volunteers.iter().filter(|v| v.status == s).count();
    let tasks_in = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();

    StatsResponse {
        camps: CampStats {
            total: camps.len(),
            critical: camps
                .iter()
                .filter(|c| c.inventory_priority_score > CRITICAL_CAMP_SCORE)
                .count(),
        },
        volunteers: VolunteerStats {
            total: volunteers.len(),
            available: volunteers_in(VolunteerStatus::Available),
            on_mission: volunteers_in(VolunteerStatus::OnMission),
        },
        tasks: TaskStats {
            total: tasks.len(),
            pending: tasks_in(TaskStatus::Pending),
            completed: tasks_in(TaskStatus::Completed),
        },
        supplies,
    }
}

/// GET /v1/stats
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let camps = state.camps().list().await;
    let volunteers = state.volunteers().list(&VolunteerFilter::default()).await;
    let tasks = state.tasks().list().await;
    Json(summarize(&camps, &volunteers, &tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::camps::{CampLocation, Capacity, NewInventoryItem};
    use crate::store::NewCamp;

    fn camp(inventory: &[(&str, u64)]) -> NewCamp {
        NewCamp {
            name: "Camp".to_string(),
            location: CampLocation {
                lat: 26.2,
                lng: 92.9,
                address: String::new(),
            },
            capacity: Capacity::default(),
            inventory: inventory
                .iter()
                .map(|(item, quantity)| NewInventoryItem {
                    item: item.to_string(),
                    quantity: *quantity,
                    unit: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_summarize_totals() {
        let state = AppState::default();
        state
            .camps()
            .create(camp(&[("Water", 5), ("Blankets", 2), ("Flashlights", 1)]))
            .await
            .unwrap();
        state
            .camps()
            .create(camp(&[("Water", 100), ("Blankets", 40)]))
            .await
            .unwrap();

        let Json(stats) = stats(State(state)).await;
        assert_eq!(stats.camps.total, 2);
        assert_eq!(stats.camps.critical, 1);
        assert_eq!(stats.supplies["Water"], 105);
        assert_eq!(stats.supplies["Blankets"], 42);
        assert_eq!(stats.volunteers.total, 0);
        assert_eq!(stats.tasks.total, 0);
    }
}

//! Coordination API integration tests.
//!
//! Drives the router over real HTTP: camp inventory and priority, dispatch
//! matching, and the task lifecycle with its volunteer side effects.

use relief_coordinator::{
    alerts::AlertBroadcaster,
    api,
    state::AppState,
    store::{TaskSettings, TransitionPolicy},
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Test harness for the coordination API.
struct Harness {
    base_url: String,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        Self::with_state(AppState::default()).await
    }

    async fn with_state(state: AppState) -> Self {
        let app = api::create_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn patch(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.client.patch(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn create_camp(&self, name: &str, water: u64) -> String {
        let (status, body) = self
            .post(
                "/v1/camps",
                json!({
                    "name": name,
                    "location": { "lat": 26.2, "lng": 92.9, "address": "100 Crisis Ave" },
                    "capacity": { "total": 500, "current_occupancy": 100 },
                    "inventory": [
                        { "item": "Water", "quantity": water, "unit": "liters" },
                        { "item": "Blankets", "quantity": 200 }
                    ]
                }),
            )
            .await;
        assert_eq!(status, 201, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn register(&self, name: &str, skill: &str, at: [f64; 2]) -> String {
        let (status, body) = self
            .post(
                "/v1/volunteers",
                json!({ "name": name, "skills": [skill], "current_location": at }),
            )
            .await;
        assert_eq!(status, 201, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_endpoints_respond() {
    let h = Harness::start().await;
    let (status, body) = h.get("/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let (status, body) = h.get("/readyz").await;
    assert_eq!(status, 200);
    assert_eq!(body["components"]["alerts"]["status"], "ok");
}

#[tokio::test]
async fn inventory_edit_recomputes_status_and_score() {
    let h = Harness::start().await;
    let camp_id = h.create_camp("Relief Camp A", 100).await;

    let (status, camp) = h
        .patch(
            &format!("/v1/camps/{camp_id}/inventory"),
            json!({ "item": "water", "quantity": 5 }),
        )
        .await;
    assert_eq!(status, 200, "{camp}");
    let water = camp["inventory"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["item"] == "Water")
        .unwrap();
    assert_eq!(water["status"], "critical");
    assert_eq!(water["unit"], "liters");
    assert_eq!(camp["inventory_priority_score"], 25);

    let (status, camp) = h
        .patch(
            &format!("/v1/camps/{camp_id}/inventory"),
            json!({ "item": "Water", "quantity": 20 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(camp["inventory_priority_score"], 0);
}

#[tokio::test]
async fn negative_quantity_is_a_validation_problem() {
    let h = Harness::start().await;
    let camp_id = h.create_camp("Relief Camp A", 100).await;

    let resp = h
        .client
        .patch(h.url(&format!("/v1/camps/{camp_id}/inventory")))
        .header("x-request-id", "req_itest")
        .json(&json!({ "item": "Water", "quantity": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/problem+json"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "invalid_quantity");
    assert_eq!(body["request_id"], "req_itest");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let h = Harness::start().await;
    let (status, body) = h.get("/v1/camps/not-an-id").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_camp_id");

    let missing = relief_id::CampId::new();
    let (status, body) = h.get(&format!("/v1/camps/{missing}")).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "camp_not_found");

    let missing = relief_id::TaskId::new();
    let (status, body) = h
        .patch(&format!("/v1/tasks/{missing}/status"), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "task_not_found");
}

#[tokio::test]
async fn priority_view_ranks_crowded_short_camps_first() {
    let h = Harness::start().await;
    let calm = h.create_camp("Calm", 100).await;
    let short = h.create_camp("Short", 5).await;
    let crowded = h.create_camp("Crowded", 5).await;
    h.patch(
        &format!("/v1/camps/{crowded}/capacity"),
        json!({ "current_occupancy": 480 }),
    )
    .await;

    let (status, body) = h.get("/v1/coordination/priority-camps").await;
    assert_eq!(status, 200);
    let ranked: Vec<(&str, u64)> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["id"].as_str().unwrap(),
                c["presentation_priority_score"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ranked,
        vec![
            (crowded.as_str(), 100),
            (short.as_str(), 50),
            (calm.as_str(), 0)
        ]
    );
}

#[tokio::test]
async fn find_match_by_skill_and_radius() {
    let h = Harness::start().await;
    let medic = h.register("Medic", "Medical", [92.90, 26.20]).await;
    h.register("Cook", "Cooking", [92.90, 26.20]).await;

    let (status, body) = h
        .post(
            "/v1/dispatch/find-match",
            json!({ "required_skill": "Medical", "camp_location": [92.91, 26.21], "max_distance_km": 5 }),
        )
        .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], medic.as_str());
    assert!(body["items"][0]["distance_km"].as_f64().unwrap() < 5.0);

    let (status, body) = h
        .post(
            "/v1/dispatch/find-match",
            json!({ "required_skill": "Medical", "camp_location": [92.91, 26.21], "max_distance_km": 0.001 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 0);

    let (status, body) = h
        .post(
            "/v1/dispatch/find-match",
            json!({ "camp_location": [92.91, 26.21], "max_distance_km": 5 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_required_skill");
}

#[tokio::test]
async fn task_lifecycle_flips_volunteer_status() {
    let h = Harness::start().await;
    let camp_id = h.create_camp("Relief Camp A", 100).await;
    let volunteer_id = h.register("Ravi", "Medical", [92.9, 26.2]).await;

    let (status, task) = h
        .post(
            "/v1/tasks",
            json!({
                "description": "Deliver first aid kits",
                "camp_id": camp_id,
                "volunteer_id": volunteer_id,
                "priority": "high"
            }),
        )
        .await;
    assert_eq!(status, 201, "{task}");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["camp_name"], "Relief Camp A");
    assert_eq!(task["volunteer_name"], "Ravi");
    let task_id = task["id"].as_str().unwrap().to_string();

    let (_, volunteer) = h.get(&format!("/v1/volunteers/{volunteer_id}")).await;
    assert_eq!(volunteer["status"], "available");

    let (status, _) = h
        .patch(&format!("/v1/tasks/{task_id}/status"), json!({ "status": "in_progress" }))
        .await;
    assert_eq!(status, 200);
    let (_, volunteer) = h.get(&format!("/v1/volunteers/{volunteer_id}")).await;
    assert_eq!(volunteer["status"], "on_mission");

    // Busy volunteers drop out of matching.
    let (_, matches) = h
        .post(
            "/v1/dispatch/find-match",
            json!({ "required_skill": "Medical", "camp_location": [92.9, 26.2], "max_distance_km": 5 }),
        )
        .await;
    assert_eq!(matches["total"], 0);

    let (status, task) = h
        .patch(&format!("/v1/tasks/{task_id}/status"), json!({ "status": "Completed" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(task["status"], "completed");
    let (_, volunteer) = h.get(&format!("/v1/volunteers/{volunteer_id}")).await;
    assert_eq!(volunteer["status"], "available");

    let (_, tasks) = h.get(&format!("/v1/volunteers/{volunteer_id}/tasks")).await;
    assert_eq!(tasks["total"], 1);
}

#[tokio::test]
async fn double_booking_is_a_conflict() {
    let h = Harness::start().await;
    let volunteer_id = h.register("Ravi", "Driving", [92.9, 26.2]).await;

    let mut ids = Vec::new();
    for description in ["Run A", "Run B"] {
        let (_, task) = h
            .post(
                "/v1/tasks",
                json!({ "description": description, "volunteer_id": volunteer_id }),
            )
            .await;
        ids.push(task["id"].as_str().unwrap().to_string());
    }

    let (status, _) = h
        .patch(&format!("/v1/tasks/{}/status", ids[0]), json!({ "status": "in_progress" }))
        .await;
    assert_eq!(status, 200);
    let (status, body) = h
        .patch(&format!("/v1/tasks/{}/status", ids[1]), json!({ "status": "in_progress" }))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "volunteer_busy");
}

#[tokio::test]
async fn strict_policy_rejects_backwards_moves() {
    let settings = TaskSettings {
        policy: TransitionPolicy::Strict,
        reject_double_booking: true,
    };
    let h = Harness::with_state(AppState::new(settings, AlertBroadcaster::default())).await;
    let volunteer_id = h.register("Ravi", "Driving", [92.9, 26.2]).await;
    let (_, task) = h
        .post(
            "/v1/tasks",
            json!({ "description": "Run", "volunteer_id": volunteer_id }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    let (status, _) = h
        .patch(&format!("/v1/tasks/{task_id}/status"), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, 200);
    let (status, body) = h
        .patch(&format!("/v1/tasks/{task_id}/status"), json!({ "status": "pending" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_status");
}

#[tokio::test]
async fn stats_summarize_state() {
    let h = Harness::start().await;
    h.create_camp("Relief Camp A", 5).await;
    h.create_camp("Relief Camp B", 50).await;
    h.register("Ravi", "Medical", [92.9, 26.2]).await;

    let (status, stats) = h.get("/v1/stats").await;
    assert_eq!(status, 200);
    assert_eq!(stats["camps"]["total"], 2);
    assert_eq!(stats["volunteers"]["available"], 1);
    assert_eq!(stats["supplies"]["Water"], 55);
    assert_eq!(stats["supplies"]["Blankets"], 400);
}

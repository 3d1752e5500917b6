//! Task lifecycle and its coupling to volunteer availability.
//!
//! Status flows Pending -> InProgress -> Completed. Entering InProgress puts
//! the bound volunteer On-Mission; entering Completed makes them Available.
//! With the double-booking guard on, only the task holding a volunteer can
//! free them, and moving that task back to Pending frees them too.
//! The task write and the volunteer write happen while both records are
//! locked, so no reader sees one without the other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relief_events::{TaskPriority, TaskStatus, VolunteerStatus};
use relief_id::{CampId, TaskId, VolunteerId};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{CampStore, CoordinationError, VolunteerRegistry};

/// Which status changes [`TaskLifecycleManager::advance`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any change is applied, including moves out of Completed.
    #[default]
    Permissive,
    /// Only the forward table; anything else is rejected.
    Strict,
}

impl TransitionPolicy {
    pub fn permits(&self, from: TaskStatus, to: TaskStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => from == to || is_forward_transition(from, to),
        }
    }
}

/// The forward transition table. Skipping InProgress is allowed.
pub fn is_forward_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress) | (InProgress, Completed) | (Pending, Completed)
    )
}

/// What a task's new status does to its volunteer.
///
/// `held_elsewhere` is set when the double-booking guard is on and another
/// task holds the volunteer; leaving this task then never frees them.
/// `released` is set when the guard is on and this task held them.
fn volunteer_status_for(
    status: TaskStatus,
    held_elsewhere: bool,
    released: bool,
) -> Option<VolunteerStatus> {
    match status {
        TaskStatus::InProgress => Some(VolunteerStatus::OnMission),
        TaskStatus::Completed if held_elsewhere => None,
        TaskStatus::Completed => Some(VolunteerStatus::Available),
        TaskStatus::Pending if released => Some(VolunteerStatus::Available),
        TaskStatus::Pending => None,
    }
}

/// Lifecycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSettings {
    pub policy: TransitionPolicy,
    /// Refuse to start a task for a volunteer already running another.
    pub reject_double_booking: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            policy: TransitionPolicy::Permissive,
            reject_double_booking: true,
        }
    }
}

/// A unit of assigned work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub camp_id: Option<CampId>,
    pub volunteer_id: VolunteerId,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`TaskLifecycleManager::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub description: String,
    #[serde(default)]
    pub camp_id: Option<CampId>,
    pub volunteer_id: VolunteerId,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

/// Owns task records; reaches camps and volunteers by id only.
#[derive(Debug)]
pub struct TaskLifecycleManager {
    tasks: RwLock<HashMap<TaskId, Arc<Mutex<Task>>>>,
    /// Volunteer -> the task currently holding them On-Mission.
    active: Mutex<HashMap<VolunteerId, TaskId>>,
    camps: Arc<CampStore>,
    volunteers: Arc<VolunteerRegistry>,
    settings: TaskSettings,
}

impl TaskLifecycleManager {
    pub fn new(
        camps: Arc<CampStore>,
        volunteers: Arc<VolunteerRegistry>,
        settings: TaskSettings,
    ) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
            camps,
            volunteers,
            settings,
        }
    }

    pub fn settings(&self) -> TaskSettings {
        self.settings
    }

    async fn entry(&self, id: TaskId) -> Result<Arc<Mutex<Task>>, CoordinationError> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoordinationError::not_found(TaskId::KIND, id))
    }

    /// Creates a Pending task. The volunteer's status is not touched.
    pub async fn create(&self, new: NewTask) -> Result<Task, CoordinationError> {
        let description = new.description.trim().to_string();
        if description.is_empty() {
            return Err(CoordinationError::validation(
                "description",
                "description cannot be empty",
            ));
        }
        if let Some(camp_id) = new.camp_id {
            if !self.camps.contains(camp_id).await {
                return Err(CoordinationError::not_found(CampId::KIND, camp_id));
            }
        }
        self.volunteers.get(new.volunteer_id).await?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            description,
            camp_id: new.camp_id,
            volunteer_id: new.volunteer_id,
            status: TaskStatus::Pending,
            priority: new.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.tasks
            .write()
            .await
            .insert(task.id, Arc::new(Mutex::new(task.clone())));

        info!(
            task_id = %task.id,
            volunteer_id = %task.volunteer_id,
            priority = %task.priority,
            "Task created"
        );
        Ok(task)
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, CoordinationError> {
        let entry = self.entry(id).await?;
        let task = entry.lock().await;
        Ok(task.clone())
    }

    async fn snapshot(&self) -> Vec<Task> {
        let entries: Vec<_> = self.tasks.read().await.values().cloned().collect();
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            out.push(entry.lock().await.clone());
        }
        out
    }

    /// All tasks in creation order.
    pub async fn list(&self) -> Vec<Task> {
        let mut tasks = self.snapshot().await;
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// A volunteer's tasks, newest first.
    pub async fn list_for_volunteer(&self, volunteer_id: VolunteerId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|t| t.volunteer_id == volunteer_id)
            .collect();
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
        tasks
    }

    /// Moves a task to `status` and applies the volunteer side effect.
    ///
    /// Lock order: task record, volunteer record, active-assignment map.
    pub async fn advance(&self, id: TaskId, status: TaskStatus) -> Result<Task, CoordinationError> {
        let entry = self.entry(id).await?;
        let mut task = entry.lock().await;
        let mut volunteer = self.volunteers.lock(task.volunteer_id).await?;

        let from = task.status;
        if !self.settings.policy.permits(from, status) {
            debug!(task_id = %id, from = %from, to = %status, "Rejected task transition");
            return Err(CoordinationError::validation(
                "status",
                format!("cannot move task from {from} to {status}"),
            ));
        }

        let guarded = self.settings.reject_double_booking;
        let (held_elsewhere, released) = {
            let mut active = self.active.lock().await;
            let holder = active.get(&task.volunteer_id).copied();
            if status == TaskStatus::InProgress {
                if let Some(other) = holder.filter(|other| *other != id) {
                    if guarded {
                        warn!(
                            task_id = %id,
                            volunteer_id = %task.volunteer_id,
                            active_task_id = %other,
                            "Volunteer already on another mission"
                        );
                        return Err(CoordinationError::conflict(
                            "volunteer_busy",
                            format!(
                                "volunteer {} is already on task {other}",
                                task.volunteer_id
                            ),
                        ));
                    }
                }
                active.insert(task.volunteer_id, id);
            } else if holder == Some(id) {
                active.remove(&task.volunteer_id);
            }
            (
                guarded && holder.is_some_and(|other| other != id),
                guarded && holder == Some(id) && status != TaskStatus::InProgress,
            )
        };

        task.status = status;
        task.updated_at = Utc::now();
        if let Some(next) = volunteer_status_for(status, held_elsewhere, released) {
            volunteer.set_status(next);
        }

        info!(
            task_id = %id,
            volunteer_id = %task.volunteer_id,
            from = %from,
            to = %status,
            volunteer_status = %volunteer.record().status,
            "Task advanced"
        );
        Ok(task.clone())
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::store::volunteers::NewVolunteer;
    use rstest::rstest;

    struct Fixture {
        volunteers: Arc<VolunteerRegistry>,
        manager: TaskLifecycleManager,
    }

    fn fixture(settings: TaskSettings) -> Fixture {
        let camps = Arc::new(CampStore::new());
        let volunteers = Arc::new(VolunteerRegistry::new());
        let manager = TaskLifecycleManager::new(camps, volunteers.clone(), settings);
        Fixture {
            volunteers,
            manager,
        }
    }

    async fn volunteer(f: &Fixture) -> VolunteerId {
        f.volunteers
            .register(NewVolunteer {
                name: "Ravi".to_string(),
                skills: vec!["Medical".to_string()],
                current_location: Some(GeoPoint::new(92.9, 26.2)),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn task(f: &Fixture, volunteer_id: VolunteerId) -> TaskId {
        f.manager
            .create(NewTask {
                description: "Deliver water".to_string(),
                camp_id: None,
                volunteer_id,
                priority: None,
            })
            .await
            .unwrap()
            .id
    }

    #[rstest]
    #[case(TaskStatus::Pending, TaskStatus::InProgress, true)]
    #[case(TaskStatus::InProgress, TaskStatus::Completed, true)]
    #[case(TaskStatus::Pending, TaskStatus::Completed, true)]
    #[case(TaskStatus::Completed, TaskStatus::Pending, false)]
    #[case(TaskStatus::Completed, TaskStatus::InProgress, false)]
    #[case(TaskStatus::InProgress, TaskStatus::Pending, false)]
    fn test_forward_table(#[case] from: TaskStatus, #[case] to: TaskStatus, #[case] ok: bool) {
        assert_eq!(is_forward_transition(from, to), ok);
        assert_eq!(TransitionPolicy::Strict.permits(from, to), ok);
        assert!(TransitionPolicy::Permissive.permits(from, to));
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let t = f.manager.get(task(&f, v).await).await.unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.priority, TaskPriority::Medium);
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );
    }

    #[tokio::test]
    async fn test_create_checks_references() {
        let f = fixture(TaskSettings::default());
        let err = f
            .manager
            .create(NewTask {
                description: "x".to_string(),
                camp_id: None,
                volunteer_id: VolunteerId::new(),
                priority: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "volunteer_not_found");

        let v = volunteer(&f).await;
        let err = f
            .manager
            .create(NewTask {
                description: "x".to_string(),
                camp_id: Some(CampId::new()),
                volunteer_id: v,
                priority: Some(TaskPriority::High),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "camp_not_found");

        let err = f
            .manager
            .create(NewTask {
                description: "  ".to_string(),
                camp_id: None,
                volunteer_id: v,
                priority: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_description");
    }

    #[tokio::test]
    async fn test_start_then_complete_flips_volunteer() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let t = task(&f, v).await;

        let started = f.manager.advance(t, TaskStatus::InProgress).await.unwrap();
        assert_eq!(started.status, TaskStatus::InProgress);
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::OnMission
        );

        let done = f.manager.advance(t, TaskStatus::Completed).await.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );
    }

    #[tokio::test]
    async fn test_skip_to_completed() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        f.volunteers
            .set_status(v, VolunteerStatus::Resting, None)
            .await
            .unwrap();
        let t = task(&f, v).await;

        f.manager.advance(t, TaskStatus::Completed).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );
    }

    #[tokio::test]
    async fn test_permissive_allows_backwards() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let t = task(&f, v).await;
        f.manager.advance(t, TaskStatus::Completed).await.unwrap();

        let reopened = f.manager.advance(t, TaskStatus::Pending).await.unwrap();
        assert_eq!(reopened.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_strict_rejects_backwards() {
        let f = fixture(TaskSettings {
            policy: TransitionPolicy::Strict,
            reject_double_booking: true,
        });
        let v = volunteer(&f).await;
        let t = task(&f, v).await;
        f.manager.advance(t, TaskStatus::Completed).await.unwrap();

        let err = f.manager.advance(t, TaskStatus::InProgress).await.unwrap_err();
        assert_eq!(err.code(), "invalid_status");
        assert_eq!(f.manager.get(t).await.unwrap().status, TaskStatus::Completed);
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let f = fixture(TaskSettings::default());
        let err = f
            .manager
            .advance(TaskId::new(), TaskStatus::InProgress)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "task_not_found");
    }

    #[tokio::test]
    async fn test_double_booking_rejected() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let first = task(&f, v).await;
        let second = task(&f, v).await;

        f.manager.advance(first, TaskStatus::InProgress).await.unwrap();
        let err = f
            .manager
            .advance(second, TaskStatus::InProgress)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "volunteer_busy");
        assert_eq!(f.manager.get(second).await.unwrap().status, TaskStatus::Pending);

        // Once the first finishes the second can start.
        f.manager.advance(first, TaskStatus::Completed).await.unwrap();
        f.manager.advance(second, TaskStatus::InProgress).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::OnMission
        );
    }

    #[tokio::test]
    async fn test_completing_idle_task_keeps_busy_volunteer_on_mission() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let running = task(&f, v).await;
        let idle = task(&f, v).await;

        f.manager.advance(running, TaskStatus::InProgress).await.unwrap();
        f.manager.advance(idle, TaskStatus::Completed).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::OnMission
        );

        // The running task still holds them; finishing it frees them.
        f.manager.advance(running, TaskStatus::Completed).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );
        let next = task(&f, v).await;
        f.manager.advance(next, TaskStatus::InProgress).await.unwrap();
    }

    #[tokio::test]
    async fn test_reopening_running_task_frees_volunteer() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let t = task(&f, v).await;

        f.manager.advance(t, TaskStatus::InProgress).await.unwrap();
        f.manager.advance(t, TaskStatus::Pending).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::Available
        );

        let other = task(&f, v).await;
        f.manager.advance(other, TaskStatus::InProgress).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::OnMission
        );
    }

    #[tokio::test]
    async fn test_double_booking_allowed_when_disabled() {
        let f = fixture(TaskSettings {
            policy: TransitionPolicy::Permissive,
            reject_double_booking: false,
        });
        let v = volunteer(&f).await;
        let first = task(&f, v).await;
        let second = task(&f, v).await;

        f.manager.advance(first, TaskStatus::InProgress).await.unwrap();
        f.manager.advance(second, TaskStatus::InProgress).await.unwrap();
        assert_eq!(
            f.volunteers.get(v).await.unwrap().status,
            VolunteerStatus::OnMission
        );
    }

    #[tokio::test]
    async fn test_concurrent_starts_admit_one() {
        let f = Arc::new(fixture(TaskSettings::default()));
        let v = volunteer(&f).await;
        let mut ids = Vec::new();
        for _ in 0..8 {
            ids.push(task(&f, v).await);
        }

        let mut handles = Vec::new();
        for id in ids {
            let f = f.clone();
            handles.push(tokio::spawn(async move {
                f.manager.advance(id, TaskStatus::InProgress).await
            }));
        }

        let mut started = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn test_list_for_volunteer_newest_first() {
        let f = fixture(TaskSettings::default());
        let v = volunteer(&f).await;
        let older = task(&f, v).await;
        let newer = task(&f, v).await;

        let other = volunteer(&f).await;
        task(&f, other).await;

        let mine: Vec<_> = f
            .manager
            .list_for_volunteer(v)
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(mine, vec![newer, older]);

        let all: Vec<_> = f.manager.list().await.into_iter().map(|t| t.id).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(&all[..2], &[older, newer]);
    }
}

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jobboard::board::{
    Category, EmployerNotifier, InMemoryJobBoard, Job, JobId, JobNotification, JobType,
    NotificationError, RepositoryError, User, UserId, PUBLISHED,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn demo_employer() -> User {
    User {
        id: UserId(1),
        name: "Acme Hiring".to_string(),
        email: "hiring@acme.example".to_string(),
    }
}

pub(crate) fn demo_applicant() -> User {
    User {
        id: UserId(2),
        name: "Dana Candidate".to_string(),
        email: "dana@candidate.example".to_string(),
    }
}

/// Keeps every notification in memory so the demo can show what would have been mailed.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<JobNotification>>>,
}

#[async_trait]
impl EmployerNotifier for InMemoryNotifier {
    async fn notify_employer(
        &self,
        notification: JobNotification,
    ) -> Result<(), NotificationError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("notifier mutex poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<JobNotification> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Board used when no database is configured: two users, the usual lookups and a few jobs.
pub(crate) fn demo_board() -> Result<InMemoryJobBoard, RepositoryError> {
    let board = InMemoryJobBoard::default();
    let employer = demo_employer();
    let employer_id = employer.id;
    board.add_user(employer)?;
    board.add_user(demo_applicant())?;

    for (id, name) in [(1, "Engineering"), (2, "Design"), (3, "Operations")] {
        board.add_category(Category {
            id,
            name: name.to_string(),
            status: PUBLISHED,
        })?;
    }
    for (id, name) in [(1, "Full Time"), (2, "Part Time"), (3, "Freelance")] {
        board.add_job_type(JobType {
            id,
            name: name.to_string(),
            status: PUBLISHED,
        })?;
    }

    let now = Utc::now();
    let jobs = [
        (1, "Rust Backend Engineer", Some("rust, tokio, postgres"), "Berlin", 1, 1, "3", 1),
        (2, "Product Designer", Some("figma, research"), "Lisbon", 2, 2, "2", 2),
        (3, "Site Reliability Engineer", Some("kubernetes, rust"), "Remote", 1, 1, "5", 3),
        (4, "Warehouse Coordinator", None, "Berlin", 3, 3, "1", 4),
    ];
    for (id, title, keywords, location, category_id, job_type_id, experience, age_days) in jobs {
        board.add_job(Job {
            id: JobId(id),
            title: title.to_string(),
            keywords: keywords.map(str::to_string),
            location: location.to_string(),
            category_id,
            job_type_id,
            experience: experience.to_string(),
            status: PUBLISHED,
            user_id: employer_id,
            created_at: now - Duration::days(age_days),
        })?;
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_board_seeds_published_jobs() {
        let board = demo_board().expect("demo board seeds");
        assert!(board.applications().expect("readable").is_empty());
        assert!(board.saved_jobs().expect("readable").is_empty());
    }
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::board::domain::{
    ApplicationWithApplicant, Category, Job, JobApplication, JobId, JobListing, JobType,
    NewJobApplication, NewSavedJob, SavedJob, User, UserId, PUBLISHED,
};
use crate::board::memory::InMemoryJobBoard;
use crate::board::pagination::{Page, PageRequest};
use crate::board::repository::{
    EmployerNotifier, JobBoardRepository, JobNotification, NotificationError, RepositoryError,
};
use crate::board::search::JobFilter;
use crate::board::service::JobBoardService;

pub(super) const EMPLOYER: UserId = UserId(7);
pub(super) const APPLICANT: UserId = UserId(9);
pub(super) const OTHER_APPLICANT: UserId = UserId(11);
pub(super) const RUST_JOB: JobId = JobId(5);
pub(super) const DRAFT_JOB: JobId = JobId(6);

pub(super) struct JobSeed {
    pub id: i64,
    pub title: &'static str,
    pub keywords: Option<&'static str>,
    pub location: &'static str,
    pub category_id: i64,
    pub job_type_id: i64,
    pub experience: &'static str,
    pub status: i32,
    pub day: u32,
}

pub(super) fn job(seed: JobSeed) -> Job {
    Job {
        id: JobId(seed.id),
        title: seed.title.to_string(),
        keywords: seed.keywords.map(str::to_string),
        location: seed.location.to_string(),
        category_id: seed.category_id,
        job_type_id: seed.job_type_id,
        experience: seed.experience.to_string(),
        status: seed.status,
        user_id: EMPLOYER,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, seed.day, 9, 0, 0)
            .single()
            .expect("valid fixture date"),
    }
}

pub(super) fn user(id: UserId, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.test", name.to_lowercase()),
    }
}

/// Board with three users, lookup rows (one of each inactive) and five jobs, one unpublished.
pub(super) fn seeded_board() -> InMemoryJobBoard {
    let board = InMemoryJobBoard::default();
    board.add_user(user(EMPLOYER, "Employer")).expect("seed user");
    board.add_user(user(APPLICANT, "Applicant")).expect("seed user");
    board
        .add_user(user(OTHER_APPLICANT, "Other"))
        .expect("seed user");

    for (id, name, status) in [
        (1, "Engineering", PUBLISHED),
        (2, "Design", PUBLISHED),
        (3, "Archived", 0),
    ] {
        board
            .add_category(Category {
                id,
                name: name.to_string(),
                status,
            })
            .expect("seed category");
    }
    for (id, name, status) in [
        (1, "Full Time", PUBLISHED),
        (2, "Part Time", PUBLISHED),
        (3, "Internship", 0),
    ] {
        board
            .add_job_type(JobType {
                id,
                name: name.to_string(),
                status,
            })
            .expect("seed job type");
    }

    let jobs = [
        JobSeed {
            id: RUST_JOB.0,
            title: "Senior Rust Engineer",
            keywords: Some("backend, tokio"),
            location: "Berlin",
            category_id: 1,
            job_type_id: 1,
            experience: "5",
            status: PUBLISHED,
            day: 5,
        },
        JobSeed {
            id: DRAFT_JOB.0,
            title: "Rust Intern",
            keywords: Some("rust"),
            location: "Berlin",
            category_id: 1,
            job_type_id: 3,
            experience: "1",
            status: 0,
            day: 6,
        },
        JobSeed {
            id: 7,
            title: "Product Designer",
            keywords: Some("figma, RUST-adjacent tooling"),
            location: "Lisbon",
            category_id: 2,
            job_type_id: 2,
            experience: "3",
            status: PUBLISHED,
            day: 7,
        },
        JobSeed {
            id: 8,
            title: "Platform Engineer",
            keywords: None,
            location: "Berlin",
            category_id: 1,
            job_type_id: 2,
            experience: "3",
            status: PUBLISHED,
            day: 3,
        },
        JobSeed {
            id: 9,
            title: "Support Specialist",
            keywords: Some("customer"),
            location: "Remote",
            category_id: 2,
            job_type_id: 1,
            experience: "1",
            status: PUBLISHED,
            day: 9,
        },
    ];
    for seed in jobs {
        board.add_job(job(seed)).expect("seed job");
    }

    board
}

/// Adds `count` extra published jobs with ids starting at 100.
pub(super) fn add_bulk_jobs(board: &InMemoryJobBoard, count: u32) {
    for offset in 0..count {
        board
            .add_job(job(JobSeed {
                id: 100 + i64::from(offset),
                title: "Bulk Listing",
                keywords: None,
                location: "Remote",
                category_id: 1,
                job_type_id: 1,
                experience: "2",
                status: PUBLISHED,
                day: 10 + offset % 18,
            }))
            .expect("seed bulk job");
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<JobNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<JobNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl EmployerNotifier for MemoryNotifier {
    async fn notify_employer(
        &self,
        notification: JobNotification,
    ) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

#[async_trait]
impl EmployerNotifier for FailingNotifier {
    async fn notify_employer(&self, _: JobNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("connection refused".to_string()))
    }
}

/// Reports no prior applications or saves, as two concurrent requests would both observe, so
/// the store's uniqueness guard is what rejects the duplicate.
#[derive(Clone)]
pub(super) struct StaleCountRepository {
    pub inner: InMemoryJobBoard,
}

#[async_trait]
impl JobBoardRepository for StaleCountRepository {
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.inner.active_categories().await
    }

    async fn active_job_types(&self) -> Result<Vec<JobType>, RepositoryError> {
        self.inner.active_job_types().await
    }

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Page<JobListing>, RepositoryError> {
        self.inner.search_jobs(filter, page).await
    }

    async fn published_job(&self, id: JobId) -> Result<Option<JobListing>, RepositoryError> {
        self.inner.published_job(id).await
    }

    async fn find_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.find_job(id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user(id).await
    }

    async fn count_saved_jobs(&self, _: UserId, _: JobId) -> Result<u64, RepositoryError> {
        Ok(0)
    }

    async fn count_applications(&self, _: UserId, _: JobId) -> Result<u64, RepositoryError> {
        Ok(0)
    }

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationWithApplicant>, RepositoryError> {
        self.inner.applications_for_job(job).await
    }

    async fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        self.inner.insert_application(application).await
    }

    async fn insert_saved_job(&self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError> {
        self.inner.insert_saved_job(saved).await
    }
}

pub(super) type MemoryService = JobBoardService<InMemoryJobBoard, MemoryNotifier>;

pub(super) fn build_service() -> (Arc<MemoryService>, InMemoryJobBoard, MemoryNotifier) {
    let board = seeded_board();
    let notifier = MemoryNotifier::default();
    let service = Arc::new(JobBoardService::new(
        Arc::new(board.clone()),
        Arc::new(notifier.clone()),
    ));
    (service, board, notifier)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

use async_trait::async_trait;
use serde::Serialize;

use super::domain::{
    ApplicationWithApplicant, Category, Job, JobApplication, JobId, JobListing, JobType,
    NewJobApplication, NewSavedJob, SavedJob, User, UserId,
};
use super::pagination::{Page, PageRequest};
use super::search::JobFilter;

/// Storage abstraction so the board service can run against Postgres or in memory.
#[async_trait]
pub trait JobBoardRepository: Send + Sync {
    /// Categories with published status, for the listing filter options.
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn active_job_types(&self) -> Result<Vec<JobType>, RepositoryError>;

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Page<JobListing>, RepositoryError>;

    /// Published job with relations, `None` when missing or unpublished.
    async fn published_job(&self, id: JobId) -> Result<Option<JobListing>, RepositoryError>;

    /// Any job by id regardless of status.
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn count_saved_jobs(&self, user: UserId, job: JobId) -> Result<u64, RepositoryError>;
    async fn count_applications(&self, user: UserId, job: JobId)
        -> Result<u64, RepositoryError>;

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationWithApplicant>, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the (job, user) pair already exists.
    async fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the (user, job) pair already exists.
    async fn insert_saved_job(&self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            sqlx::Error::RowNotFound => Self::NotFound,
            _ => Self::Database(value),
        }
    }
}

/// Outbound hook notifying an employer about a new application.
#[async_trait]
pub trait EmployerNotifier: Send + Sync {
    async fn notify_employer(&self, notification: JobNotification)
        -> Result<(), NotificationError>;
}

/// Data handed to the employer notification: who owns the job, who applied, and the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobNotification {
    pub employer: User,
    pub applicant: User,
    pub job: Job,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid message: {0}")]
    Message(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status value marking a job, category, or job type as published.
pub const PUBLISHED: i32 = 1;

/// Identifier wrapper for job listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

/// Identifier wrapper for users, employers and applicants alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl JobId {
    /// Parses a raw path or form value; anything non-numeric yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl UserId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A posted job. `user_id` is the employer who owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub keywords: Option<String>,
    pub location: String,
    pub category_id: i64,
    pub job_type_id: i64,
    pub experience: String,
    pub status: i32,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_published(&self) -> bool {
        self.status == PUBLISHED
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user_id == user
    }
}

/// Lookup row for job kinds such as full-time or freelance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobType {
    pub id: i64,
    pub name: String,
    pub status: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub status: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A job with its type and category relations loaded.
///
/// Relations are optional because a job may reference a lookup row that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub job_type: Option<JobType>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub job_id: JobId,
    pub user_id: UserId,
    pub employer_id: UserId,
    pub applied_data: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an application; ids and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobApplication {
    pub job_id: JobId,
    pub user_id: UserId,
    pub employer_id: UserId,
    pub applied_data: DateTime<Utc>,
}

/// An application together with the applicant's user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWithApplicant {
    #[serde(flatten)]
    pub application: JobApplication,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: i64,
    pub user_id: UserId,
    pub job_id: JobId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSavedJob {
    pub user_id: UserId,
    pub job_id: JobId,
}

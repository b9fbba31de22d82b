//! Postgres-backed job board store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::domain::{
    ApplicationWithApplicant, Category, Job, JobApplication, JobId, JobListing, JobType,
    NewJobApplication, NewSavedJob, SavedJob, User, UserId, PUBLISHED,
};
use super::pagination::{Page, PageRequest};
use super::repository::{JobBoardRepository, RepositoryError};
use super::search::JobFilter;
use crate::config::DatabaseConfig;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const LISTING_COLUMNS: &str = "SELECT j.id, j.title, j.keywords, j.location, j.category_id, \
     j.job_type_id, j.experience, j.status, j.user_id, j.created_at, \
     jt.id AS job_type_ref, jt.name AS job_type_name, jt.status AS job_type_status, \
     c.id AS category_ref, c.name AS category_name, c.status AS category_status \
     FROM jobs j \
     LEFT JOIN job_types jt ON jt.id = j.job_type_id \
     LEFT JOIN categories c ON c.id = j.category_id";

const JOB_COLUMNS: &str = "id, title, keywords, location, category_id, job_type_id, experience, \
     status, user_id, created_at";

pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    title: String,
    keywords: Option<String>,
    location: String,
    category_id: i64,
    job_type_id: i64,
    experience: String,
    status: i32,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: JobId(row.id),
            title: row.title,
            keywords: row.keywords,
            location: row.location,
            category_id: row.category_id,
            job_type_id: row.job_type_id,
            experience: row.experience,
            status: row.status,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct JobListingRow {
    #[sqlx(flatten)]
    job: JobRow,
    job_type_ref: Option<i64>,
    job_type_name: Option<String>,
    job_type_status: Option<i32>,
    category_ref: Option<i64>,
    category_name: Option<String>,
    category_status: Option<i32>,
}

impl From<JobListingRow> for JobListing {
    fn from(row: JobListingRow) -> Self {
        let job_type = match (row.job_type_ref, row.job_type_name, row.job_type_status) {
            (Some(id), Some(name), Some(status)) => Some(JobType { id, name, status }),
            _ => None,
        };
        let category = match (row.category_ref, row.category_name, row.category_status) {
            (Some(id), Some(name), Some(status)) => Some(Category { id, name, status }),
            _ => None,
        };
        JobListing {
            job: row.job.into(),
            job_type,
            category,
        }
    }
}

#[derive(Debug, FromRow)]
struct LookupRow {
    id: i64,
    name: String,
    status: i32,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i64,
    job_id: i64,
    user_id: i64,
    employer_id: i64,
    applied_data: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for JobApplication {
    fn from(row: ApplicationRow) -> Self {
        JobApplication {
            id: row.id,
            job_id: JobId(row.job_id),
            user_id: UserId(row.user_id),
            employer_id: UserId(row.employer_id),
            applied_data: row.applied_data,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationWithUserRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    applicant_ref: Option<i64>,
    applicant_name: Option<String>,
    applicant_email: Option<String>,
}

#[derive(Debug, FromRow)]
struct SavedJobRow {
    id: i64,
    user_id: i64,
    job_id: i64,
    created_at: DateTime<Utc>,
}

/// Appends the published-status predicate and every supplied filter to `builder`.
fn push_filter_conditions(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    builder.push(" WHERE j.status = ");
    builder.push_bind(PUBLISHED);

    if let Some(keyword) = &filter.keyword {
        let pattern = format!("%{}%", escape_like(keyword));
        builder.push(" AND (j.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR j.keywords ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(location) = &filter.location {
        builder.push(" AND j.location = ");
        builder.push_bind(location.clone());
    }

    match &filter.category {
        Some(Some(category)) => {
            builder.push(" AND j.category_id = ");
            builder.push_bind(*category);
        }
        Some(None) => {
            builder.push(" AND FALSE");
        }
        None => {}
    }

    if let Some(ids) = &filter.job_type_ids {
        builder.push(" AND j.job_type_id = ANY(");
        builder.push_bind(ids.clone());
        builder.push(")");
    }

    if let Some(experience) = &filter.experience {
        builder.push(" AND j.experience = ");
        builder.push_bind(experience.clone());
    }
}

/// Page query for the listing: filters, creation-time ordering, limit and offset.
pub fn listing_query(filter: &JobFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(LISTING_COLUMNS);
    push_filter_conditions(&mut builder, filter);
    let direction = filter.sort.as_sql();
    builder.push(format!(
        " ORDER BY j.created_at {direction}, j.id {direction}"
    ));
    builder.push(" LIMIT ");
    builder.push_bind(i64::try_from(page.per_page).unwrap_or(i64::MAX));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    builder
}

/// Total row count for the same filter, used by the paginator.
pub fn listing_count_query(filter: &JobFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM jobs j");
    push_filter_conditions(&mut builder, filter);
    builder
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Job board store on a shared Postgres pool.
#[derive(Debug, Clone)]
pub struct PgJobBoard {
    pool: PgPool,
}

impl PgJobBoard {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobBoardRepository for PgJobBoard {
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, LookupRow>(
            "SELECT id, name, status FROM categories WHERE status = $1 ORDER BY id",
        )
        .bind(PUBLISHED)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
                status: row.status,
            })
            .collect())
    }

    async fn active_job_types(&self) -> Result<Vec<JobType>, RepositoryError> {
        let rows = sqlx::query_as::<_, LookupRow>(
            "SELECT id, name, status FROM job_types WHERE status = $1 ORDER BY id",
        )
        .bind(PUBLISHED)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| JobType {
                id: row.id,
                name: row.name,
                status: row.status,
            })
            .collect())
    }

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Page<JobListing>, RepositoryError> {
        let total: i64 = listing_count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        let rows: Vec<JobListingRow> = listing_query(filter, page)
            .build_query_as::<JobListingRow>()
            .fetch_all(&self.pool)
            .await?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok(Page::new(rows, page, total).map(JobListing::from))
    }

    async fn published_job(&self, id: JobId) -> Result<Option<JobListing>, RepositoryError> {
        let row = sqlx::query_as::<_, JobListingRow>(&format!(
            "{LISTING_COLUMNS} WHERE j.id = $1 AND j.status = $2"
        ))
        .bind(id.0)
        .bind(PUBLISHED)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobListing::from))
    }

    async fn find_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Job::from))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn count_saved_jobs(&self, user: UserId, job: JobId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM saved_jobs WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user.0)
        .bind(job.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn count_applications(
        &self,
        user: UserId,
        job: JobId,
    ) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM job_applications WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user.0)
        .bind(job.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationWithApplicant>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApplicationWithUserRow>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.employer_id, a.applied_data, a.created_at,
                   u.id AS applicant_ref, u.name AS applicant_name, u.email AS applicant_email
            FROM job_applications a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.job_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(job.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let user = match (row.applicant_ref, row.applicant_name, row.applicant_email) {
                    (Some(id), Some(name), Some(email)) => Some(User {
                        id: UserId(id),
                        name,
                        email,
                    }),
                    _ => None,
                };
                ApplicationWithApplicant {
                    application: row.application.into(),
                    user,
                }
            })
            .collect())
    }

    async fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO job_applications (job_id, user_id, employer_id, applied_data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, user_id, employer_id, applied_data, created_at
            "#,
        )
        .bind(application.job_id.0)
        .bind(application.user_id.0)
        .bind(application.employer_id.0)
        .bind(application.applied_data)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn insert_saved_job(&self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError> {
        let row = sqlx::query_as::<_, SavedJobRow>(
            r#"
            INSERT INTO saved_jobs (user_id, job_id)
            VALUES ($1, $2)
            RETURNING id, user_id, job_id, created_at
            "#,
        )
        .bind(saved.user_id.0)
        .bind(saved.job_id.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(SavedJob {
            id: row.id,
            user_id: UserId(row.user_id),
            job_id: JobId(row.job_id),
            created_at: row.created_at,
        })
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{
    ApplicationWithApplicant, Category, Job, JobApplication, JobId, JobListing, JobType,
    NewJobApplication, NewSavedJob, SavedJob, User, UserId, PUBLISHED,
};
use super::pagination::{Page, PageRequest};
use super::repository::{JobBoardRepository, RepositoryError};
use super::search::{JobFilter, SortOrder};

#[derive(Debug, Default)]
struct BoardTables {
    users: Vec<User>,
    categories: Vec<Category>,
    job_types: Vec<JobType>,
    jobs: Vec<Job>,
    applications: Vec<JobApplication>,
    saved_jobs: Vec<SavedJob>,
    next_application_id: i64,
    next_saved_job_id: i64,
}

/// Mutex-guarded store with the same semantics as the Postgres schema, including the
/// uniqueness of applications and saved jobs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryJobBoard {
    tables: Arc<Mutex<BoardTables>>,
}

impl InMemoryJobBoard {
    fn lock(&self) -> Result<MutexGuard<'_, BoardTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("board mutex poisoned".to_string()))
    }

    pub fn add_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.users.retain(|existing| existing.id != user.id);
        tables.users.push(user);
        Ok(())
    }

    pub fn add_category(&self, category: Category) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.categories.retain(|existing| existing.id != category.id);
        tables.categories.push(category);
        Ok(())
    }

    pub fn add_job_type(&self, job_type: JobType) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.job_types.retain(|existing| existing.id != job_type.id);
        tables.job_types.push(job_type);
        Ok(())
    }

    pub fn add_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.jobs.retain(|existing| existing.id != job.id);
        tables.jobs.push(job);
        Ok(())
    }

    pub fn applications(&self) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self.lock()?.applications.clone())
    }

    pub fn saved_jobs(&self) -> Result<Vec<SavedJob>, RepositoryError> {
        Ok(self.lock()?.saved_jobs.clone())
    }
}

impl BoardTables {
    fn listing(&self, job: &Job) -> JobListing {
        JobListing {
            job: job.clone(),
            job_type: self
                .job_types
                .iter()
                .find(|job_type| job_type.id == job.job_type_id)
                .cloned(),
            category: self
                .categories
                .iter()
                .find(|category| category.id == job.category_id)
                .cloned(),
        }
    }
}

#[async_trait]
impl JobBoardRepository for InMemoryJobBoard {
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .categories
            .iter()
            .filter(|category| category.status == PUBLISHED)
            .cloned()
            .collect())
    }

    async fn active_job_types(&self) -> Result<Vec<JobType>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .job_types
            .iter()
            .filter(|job_type| job_type.status == PUBLISHED)
            .cloned()
            .collect())
    }

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Page<JobListing>, RepositoryError> {
        let tables = self.lock()?;
        let mut matched: Vec<&Job> = tables.jobs.iter().filter(|job| filter.matches(job)).collect();
        matched.sort_by(|a, b| {
            let order = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
            match filter.sort {
                SortOrder::Ascending => order,
                SortOrder::Descending => order.reverse(),
            }
        });

        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.per_page).unwrap_or(usize::MAX);
        let data = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|job| tables.listing(job))
            .collect();

        Ok(Page::new(data, page, total))
    }

    async fn published_job(&self, id: JobId) -> Result<Option<JobListing>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .jobs
            .iter()
            .find(|job| job.id == id && job.is_published())
            .map(|job| tables.listing(job)))
    }

    async fn find_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn count_saved_jobs(&self, user: UserId, job: JobId) -> Result<u64, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .saved_jobs
            .iter()
            .filter(|saved| saved.user_id == user && saved.job_id == job)
            .count() as u64)
    }

    async fn count_applications(
        &self,
        user: UserId,
        job: JobId,
    ) -> Result<u64, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .iter()
            .filter(|application| application.user_id == user && application.job_id == job)
            .count() as u64)
    }

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationWithApplicant>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .iter()
            .filter(|application| application.job_id == job)
            .map(|application| ApplicationWithApplicant {
                application: application.clone(),
                user: tables
                    .users
                    .iter()
                    .find(|user| user.id == application.user_id)
                    .cloned(),
            })
            .collect())
    }

    async fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables.applications.iter().any(|existing| {
            existing.job_id == application.job_id && existing.user_id == application.user_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        tables.next_application_id += 1;
        let record = JobApplication {
            id: tables.next_application_id,
            job_id: application.job_id,
            user_id: application.user_id,
            employer_id: application.employer_id,
            applied_data: application.applied_data,
            created_at: Utc::now(),
        };
        tables.applications.push(record.clone());
        Ok(record)
    }

    async fn insert_saved_job(&self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables
            .saved_jobs
            .iter()
            .any(|existing| existing.user_id == saved.user_id && existing.job_id == saved.job_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        tables.next_saved_job_id += 1;
        let record = SavedJob {
            id: tables.next_saved_job_id,
            user_id: saved.user_id,
            job_id: saved.job_id,
            created_at: Utc::now(),
        };
        tables.saved_jobs.push(record.clone());
        Ok(record)
    }
}

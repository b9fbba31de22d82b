use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{
    ApplicationWithApplicant, Category, JobId, JobListing, JobType, NewJobApplication,
    NewSavedJob, User, UserId,
};
use super::pagination::{Page, PageRequest, JOBS_PER_PAGE};
use super::repository::{
    EmployerNotifier, JobBoardRepository, JobNotification, NotificationError, RepositoryError,
};
use super::search::{JobFilter, JobSearchParams};

/// Everything the listing page renders: filter options, the current page of jobs, and the
/// job type ids currently selected.
#[derive(Debug, Clone, Serialize)]
pub struct JobListingPage {
    pub categories: Vec<Category>,
    pub job_types: Vec<JobType>,
    pub jobs: Page<JobListing>,
    pub job_type_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub job: JobListing,
    /// Whether the viewing user has saved this job; always false for anonymous viewers.
    pub saved: bool,
    /// All applications with applicants. Visible to any viewer, owner or not.
    pub applications: Vec<ApplicationWithApplicant>,
}

/// Business rule violations on apply/save. Reported to the client, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejection {
    #[error("Job does not exist")]
    JobDoesNotExist,
    #[error("You can not apply on own job")]
    OwnJob,
    #[error("You have already applied on this job")]
    AlreadyApplied,
    #[error("Job not found")]
    JobNotFound,
    #[error("You have already saved this job")]
    AlreadySaved,
}

pub const APPLIED_MESSAGE: &str = "You have applied successfully";
pub const SAVED_MESSAGE: &str = "Job saved successfully";

/// `{status, message}` reply shared by apply and save, success or rejection alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub status: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }

    /// One-shot message for the next rendered page; surfacing it is the caller's choice.
    pub fn flash(&self) -> FlashMessage {
        FlashMessage {
            level: if self.status {
                FlashLevel::Success
            } else {
                FlashLevel::Error
            },
            message: self.message.clone(),
        }
    }
}

impl From<ActionRejection> for ActionOutcome {
    fn from(rejection: ActionRejection) -> Self {
        Self {
            status: false,
            message: rejection.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Service composing the store and the employer notifier behind the four board operations.
pub struct JobBoardService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> JobBoardService<R, N>
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Published categories and job types plus the filtered, paginated jobs.
    pub async fn list_jobs(
        &self,
        params: &JobSearchParams,
    ) -> Result<JobListingPage, BoardServiceError> {
        let categories = self.repository.active_categories().await?;
        let job_types = self.repository.active_job_types().await?;

        let filter = JobFilter::from_params(params);
        let page = PageRequest::from_param(params.page.as_deref(), JOBS_PER_PAGE);
        let jobs = self.repository.search_jobs(&filter, page).await?;

        tracing::debug!(
            page = jobs.current_page,
            returned = jobs.data.len(),
            total = jobs.total,
            "job listing built"
        );

        Ok(JobListingPage {
            categories,
            job_types,
            jobs,
            job_type_ids: filter.selected_job_types(),
        })
    }

    /// A published job with relations, the viewer's saved flag and the applications list.
    pub async fn job_detail(
        &self,
        job_id: JobId,
        viewer: Option<&User>,
    ) -> Result<JobDetail, BoardServiceError> {
        let job = self
            .repository
            .published_job(job_id)
            .await?
            .ok_or(BoardServiceError::NotFound(job_id))?;

        let saved = match viewer {
            Some(user) => self.repository.count_saved_jobs(user.id, job_id).await? > 0,
            None => false,
        };

        let applications = self.repository.applications_for_job(job_id).await?;
        tracing::debug!(
            job = %job_id,
            saved,
            applications = applications.len(),
            "job detail loaded"
        );

        Ok(JobDetail {
            job,
            saved,
            applications,
        })
    }

    /// Records an application and notifies the employer.
    ///
    /// Rejections come back as a failed [`ActionOutcome`]; only storage and mail failures are
    /// errors. `job_id` is `None` when the request carried no usable id.
    pub async fn apply(
        &self,
        applicant: &User,
        job_id: Option<JobId>,
    ) -> Result<ActionOutcome, BoardServiceError> {
        let outcome = match self.try_apply(applicant, job_id).await? {
            Ok(()) => ActionOutcome::success(APPLIED_MESSAGE),
            Err(rejection) => rejection.into(),
        };
        tracing::info!(
            user = %applicant.id,
            job = ?job_id.map(|id| id.0),
            accepted = outcome.status,
            message = %outcome.message,
            "job application handled"
        );
        Ok(outcome)
    }

    async fn try_apply(
        &self,
        applicant: &User,
        job_id: Option<JobId>,
    ) -> Result<Result<(), ActionRejection>, BoardServiceError> {
        let job = match job_id {
            Some(id) => self.repository.find_job(id).await?,
            None => None,
        };
        let Some(job) = job else {
            return Ok(Err(ActionRejection::JobDoesNotExist));
        };

        let employer_id = job.user_id;
        if employer_id == applicant.id {
            return Ok(Err(ActionRejection::OwnJob));
        }

        if self.repository.count_applications(applicant.id, job.id).await? > 0 {
            return Ok(Err(ActionRejection::AlreadyApplied));
        }

        let inserted = self
            .repository
            .insert_application(NewJobApplication {
                job_id: job.id,
                user_id: applicant.id,
                employer_id,
                applied_data: Utc::now(),
            })
            .await;
        match inserted {
            Ok(_) => {}
            Err(RepositoryError::Conflict) => return Ok(Err(ActionRejection::AlreadyApplied)),
            Err(err) => return Err(err.into()),
        }

        let employer = self
            .repository
            .find_user(employer_id)
            .await?
            .ok_or(BoardServiceError::MissingEmployer(employer_id))?;

        self.notifier
            .notify_employer(JobNotification {
                employer,
                applicant: applicant.clone(),
                job,
            })
            .await?;

        Ok(Ok(()))
    }

    /// Bookmarks a job for the user.
    pub async fn save(
        &self,
        user: &User,
        job_id: Option<JobId>,
    ) -> Result<ActionOutcome, BoardServiceError> {
        let outcome = match self.try_save(user, job_id).await? {
            Ok(()) => ActionOutcome::success(SAVED_MESSAGE),
            Err(rejection) => rejection.into(),
        };
        tracing::info!(
            user = %user.id,
            job = ?job_id.map(|id| id.0),
            accepted = outcome.status,
            message = %outcome.message,
            "save job handled"
        );
        Ok(outcome)
    }

    async fn try_save(
        &self,
        user: &User,
        job_id: Option<JobId>,
    ) -> Result<Result<(), ActionRejection>, BoardServiceError> {
        let job = match job_id {
            Some(id) => self.repository.find_job(id).await?,
            None => None,
        };
        let Some(job) = job else {
            return Ok(Err(ActionRejection::JobNotFound));
        };

        if self.repository.count_saved_jobs(user.id, job.id).await? > 0 {
            return Ok(Err(ActionRejection::AlreadySaved));
        }

        match self
            .repository
            .insert_saved_job(NewSavedJob {
                user_id: user.id,
                job_id: job.id,
            })
            .await
        {
            Ok(_) => Ok(Ok(())),
            Err(RepositoryError::Conflict) => Ok(Err(ActionRejection::AlreadySaved)),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves the authenticated identity handed over by the auth layer.
    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, BoardServiceError> {
        Ok(self.repository.find_user(id).await?)
    }
}

/// Error raised by the board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardServiceError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("employer {0} not found")]
    MissingEmployer(UserId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

//! Job board: filtered listing, job detail, applications and saved jobs.

pub mod domain;
pub(crate) mod identity;
pub mod mail;
pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationWithApplicant, Category, Job, JobApplication, JobId, JobListing, JobType,
    NewJobApplication, NewSavedJob, SavedJob, User, UserId, PUBLISHED,
};
pub use identity::{AuthenticatedUser, CurrentUser, USER_ID_HEADER};
pub use mail::EmployerMailer;
pub use memory::InMemoryJobBoard;
pub use pagination::{Page, PageRequest, JOBS_PER_PAGE};
pub use postgres::PgJobBoard;
pub use repository::{
    EmployerNotifier, JobBoardRepository, JobNotification, NotificationError, RepositoryError,
};
pub use router::{board_router, FLASH_LEVEL_HEADER};
pub use search::{JobFilter, JobSearchParams, SortOrder};
pub use service::{
    ActionOutcome, ActionRejection, BoardServiceError, FlashLevel, FlashMessage, JobBoardService,
    JobDetail, JobListingPage,
};

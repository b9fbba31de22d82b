use crate::infra::{demo_applicant, demo_board, demo_employer, InMemoryNotifier};
use clap::Args;
use jobboard::board::{ActionOutcome, BoardServiceError, JobBoardService, JobId, JobSearchParams};
use jobboard::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Keyword to search titles and keywords for
    #[arg(long)]
    pub(crate) keyword: Option<String>,
    /// Exact location filter
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Comma separated job type ids, e.g. "1,2"
    #[arg(long)]
    pub(crate) job_type: Option<String>,
    /// Pass 0 to list oldest jobs first
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Skip the apply and save portion of the demo.
    #[arg(long)]
    pub(crate) skip_actions: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        keyword,
        location,
        job_type,
        sort,
        skip_actions,
    } = args;

    let board = Arc::new(demo_board().map_err(BoardServiceError::from)?);
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = JobBoardService::new(board, notifier.clone());

    println!("Job board demo");
    let params = JobSearchParams {
        keyword,
        location,
        job_type,
        sort,
        ..JobSearchParams::default()
    };
    let listing = service.list_jobs(&params).await?;
    println!(
        "Listing page {}/{} ({} matching jobs)",
        listing.jobs.current_page, listing.jobs.last_page, listing.jobs.total
    );
    for entry in &listing.jobs.data {
        println!(
            "- #{} {} | {} | {} | {} yrs",
            entry.job.id,
            entry.job.title,
            entry.job.location,
            entry
                .job_type
                .as_ref()
                .map(|job_type| job_type.name.as_str())
                .unwrap_or("-"),
            entry.job.experience
        );
    }

    if skip_actions {
        return Ok(());
    }

    let Some(target) = listing.jobs.data.first().map(|entry| entry.job.id) else {
        println!("No jobs matched, skipping apply and save");
        return Ok(());
    };

    let employer = demo_employer();
    let applicant = demo_applicant();

    println!("\nActions on job #{target}");
    print_outcome("employer applies", &service.apply(&employer, Some(target)).await?);
    print_outcome("candidate applies", &service.apply(&applicant, Some(target)).await?);
    print_outcome("candidate applies again", &service.apply(&applicant, Some(target)).await?);
    print_outcome("candidate applies to #999", &service.apply(&applicant, Some(JobId(999))).await?);
    print_outcome("candidate saves", &service.save(&applicant, Some(target)).await?);
    print_outcome("candidate saves again", &service.save(&applicant, Some(target)).await?);

    let detail = service.job_detail(target, Some(&applicant)).await?;
    println!(
        "\nDetail for #{}: saved={} applications={}",
        detail.job.job.id,
        detail.saved,
        detail.applications.len()
    );

    let events = notifier.events();
    if events.is_empty() {
        println!("Employer notifications: none");
    } else {
        println!("Employer notifications:");
        for event in events {
            println!(
                "  - to {} <{}>: {} applied to {}",
                event.employer.name, event.employer.email, event.applicant.name, event.job.title
            );
        }
    }

    Ok(())
}

fn print_outcome(label: &str, outcome: &ActionOutcome) {
    let flash = outcome.flash();
    println!("- {label}: [{}] {}", flash.level.label(), flash.message);
}

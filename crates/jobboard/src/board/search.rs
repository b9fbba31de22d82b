//! Listing filters.
//!
//! Raw query parameters arrive as [`JobSearchParams`] and are normalized once into a
//! [`JobFilter`]. Every store consumes the same filter value: the Postgres store turns it into
//! SQL, the in-memory store evaluates [`JobFilter::matches`] directly.

use super::domain::Job;

/// Query string accepted by the listing endpoint. Every field is optional and blank values are
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSearchParams {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    /// `jobType` on the wire; comma separated job type ids, e.g. `1,3`.
    pub job_type: Option<String>,
    pub experience: Option<String>,
    /// `"0"` sorts oldest first; anything else sorts newest first.
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl JobSearchParams {
    /// Builds the params from decoded query pairs. A repeated key keeps its last value and
    /// unknown keys are ignored, so no query string is ever rejected.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "keyword" => &mut params.keyword,
                "location" => &mut params.location,
                "category" => &mut params.category,
                "jobType" => &mut params.job_type,
                "experience" => &mut params.experience,
                "sort" => &mut params.sort,
                "page" => &mut params.page,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("0") => Self::Ascending,
            _ => Self::Descending,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Normalized, fully specified listing filter. Only published jobs are ever matched.
///
/// `category` and `job_type_ids` keep the "supplied but unusable" case distinct from "absent":
/// `Some(None)` / `Some(vec![])` match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub category: Option<Option<i64>>,
    pub job_type_ids: Option<Vec<i64>>,
    pub experience: Option<String>,
    pub sort: SortOrder,
}

impl JobFilter {
    pub fn from_params(params: &JobSearchParams) -> Self {
        Self {
            keyword: present(&params.keyword),
            location: present(&params.location),
            category: present(&params.category).map(|raw| raw.parse::<i64>().ok()),
            job_type_ids: present(&params.job_type).map(|raw| parse_job_type_ids(&raw)),
            experience: present(&params.experience),
            sort: SortOrder::from_param(params.sort.as_deref()),
        }
    }

    /// Job type ids to echo back to the listing page; empty when the filter is not applied.
    pub fn selected_job_types(&self) -> Vec<i64> {
        self.job_type_ids.clone().unwrap_or_default()
    }

    pub fn matches(&self, job: &Job) -> bool {
        if !job.is_published() {
            return false;
        }

        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let in_title = job.title.to_lowercase().contains(&needle);
            let in_keywords = job
                .keywords
                .as_deref()
                .is_some_and(|keywords| keywords.to_lowercase().contains(&needle));
            if !(in_title || in_keywords) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if job.location != *location {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if *category != Some(job.category_id) {
                return false;
            }
        }

        if let Some(ids) = &self.job_type_ids {
            if !ids.contains(&job.job_type_id) {
                return false;
            }
        }

        if let Some(experience) = &self.experience {
            if job.experience != *experience {
                return false;
            }
        }

        true
    }
}

/// Splits a `jobType` parameter into ids, dropping blank and non-numeric tokens.
pub fn parse_job_type_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<i64>().ok())
        .collect()
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use diesel::dsl::{count_star, exists};
use diesel::pg::Pg;
use diesel::{prelude::*, select, PgConnection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::authz;
use crate::error::{AppError, AppResult};
use crate::models::{
    is_valid_job_type, job_type_label, EmployerProfile, Job, NewJob, ROLE_APPLICANT,
    ROLE_EMPLOYER, JOB_STATUS_APPROVED, JOB_STATUS_PENDING,
};
use crate::pagination::{paginate, PageMeta, PUBLIC_PAGE_SIZE};
use crate::schema::{applications, employer_profiles, jobs};
use crate::state::AppState;
use crate::validate::{self, JobForm};

use super::to_iso;

const LANDING_JOB_COUNT: i64 = 8;
const LANDING_CATEGORY_COUNT: i64 = 8;
const LOGO_URL_EXPIRY_SECONDS: u64 = 300;

type JobsWithEmployer = diesel::dsl::InnerJoin<jobs::table, employer_profiles::table>;
type BoxedJobsQuery = diesel::dsl::IntoBoxed<'static, JobsWithEmployer, Pg>;

#[derive(Deserialize)]
pub struct JobListQuery {
    pub q: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub category: String,
    pub location: String,
    pub job_type: String,
    pub job_type_label: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub application_deadline: NaiveDate,
    pub created_at: String,
}

impl JobSummary {
    fn from_row(job: Job, employer: &EmployerProfile) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company_name: employer.company_name.clone(),
            category: job.category,
            location: job.location,
            job_type_label: job_type_label(&job.job_type).to_string(),
            job_type: job.job_type,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            application_deadline: job.application_deadline,
            created_at: to_iso(job.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub latest_jobs: Vec<JobSummary>,
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct EmployerCard {
    pub company_name: String,
    pub industry: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub location: String,
    pub job_type: String,
    pub job_type_label: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub application_deadline: NaiveDate,
    pub status: String,
    pub is_active: bool,
    pub employer: EmployerCard,
    pub has_applied: bool,
    pub created_at: String,
}

/// Base query for everything a non-owning, non-staff caller may see. Both
/// visibility predicates are always applied together.
fn visible_jobs() -> BoxedJobsQuery {
    jobs::table
        .inner_join(employer_profiles::table)
        .into_boxed()
        .filter(jobs::status.eq(JOB_STATUS_APPROVED))
        .filter(jobs::is_active.eq(true))
}

/// Free-text search ORs across the advertised fields; structured filters AND
/// on top. Unknown job types filter nothing, matching the behavior of a
/// choice widget with no selection.
fn filtered_jobs(params: &JobListQuery) -> BoxedJobsQuery {
    let mut query = visible_jobs();

    if let Some(q) = trimmed(&params.q) {
        let pattern = format!("%{q}%");
        query = query.filter(
            jobs::title
                .ilike(pattern.clone())
                .or(jobs::description.ilike(pattern.clone()))
                .or(employer_profiles::company_name.ilike(pattern.clone()))
                .or(jobs::location.ilike(pattern.clone()))
                .or(jobs::category.ilike(pattern)),
        );
    }

    if let Some(title) = trimmed(&params.title) {
        query = query.filter(jobs::title.ilike(format!("%{title}%")));
    }
    if let Some(location) = trimmed(&params.location) {
        query = query.filter(jobs::location.ilike(format!("%{location}%")));
    }
    if let Some(category) = trimmed(&params.category) {
        query = query.filter(jobs::category.ilike(format!("%{category}%")));
    }
    if let Some(job_type) = trimmed(&params.job_type) {
        if is_valid_job_type(&job_type) {
            query = query.filter(jobs::job_type.eq(job_type));
        }
    }
    if let Some(salary_min) = params.salary_min {
        query = query.filter(jobs::salary_min.ge(salary_min));
    }
    if let Some(salary_max) = params.salary_max {
        query = query.filter(jobs::salary_max.le(salary_max));
    }

    query
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn visible_categories(
    conn: &mut PgConnection,
    limit: Option<i64>,
) -> AppResult<Vec<String>> {
    let query = jobs::table
        .filter(jobs::status.eq(JOB_STATUS_APPROVED))
        .filter(jobs::is_active.eq(true))
        .select(jobs::category)
        .distinct()
        .order(jobs::category.asc());

    let categories = match limit {
        Some(limit) => query.limit(limit).load(conn)?,
        None => query.load(conn)?,
    };
    Ok(categories)
}

pub async fn home(State(state): State<AppState>) -> AppResult<Json<HomeResponse>> {
    let mut conn = state.db()?;

    let rows: Vec<(Job, EmployerProfile)> = visible_jobs()
        .order((jobs::created_at.desc(), jobs::id.desc()))
        .limit(LANDING_JOB_COUNT)
        .load(&mut conn)?;

    let categories = visible_categories(&mut conn, Some(LANDING_CATEGORY_COUNT))?;

    Ok(Json(HomeResponse {
        latest_jobs: rows
            .into_iter()
            .map(|(job, employer)| JobSummary::from_row(job, &employer))
            .collect(),
        categories,
    }))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<Json<JobListResponse>> {
    let mut conn = state.db()?;

    let total: i64 = filtered_jobs(&params).count().get_result(&mut conn)?;
    let (meta, offset) = paginate(params.page, total, PUBLIC_PAGE_SIZE);

    let rows: Vec<(Job, EmployerProfile)> = filtered_jobs(&params)
        .order((jobs::created_at.desc(), jobs::id.desc()))
        .limit(meta.page_size)
        .offset(offset)
        .load(&mut conn)?;

    let categories = visible_categories(&mut conn, None)?;

    Ok(Json(JobListResponse {
        jobs: rows
            .into_iter()
            .map(|(job, employer)| JobSummary::from_row(job, &employer))
            .collect(),
        meta,
        categories,
    }))
}

pub async fn job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<JobDetailResponse>> {
    let mut conn = state.db()?;

    let (job, employer): (Job, EmployerProfile) = jobs::table
        .inner_join(employer_profiles::table)
        .filter(jobs::id.eq(job_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let mut has_applied = false;
    let mut may_view_hidden = false;

    if let Some(user) = user.as_ref() {
        if let Ok(account) = authz::current_account(&mut conn, user) {
            if account.is_staff {
                may_view_hidden = true;
            }
            match account.role.as_str() {
                ROLE_EMPLOYER => {
                    if let Some(profile) = authz::employer_profile_for(&mut conn, &account)? {
                        if profile.id == job.employer_id {
                            may_view_hidden = true;
                        }
                    }
                }
                ROLE_APPLICANT => {
                    if let Some(profile) = authz::applicant_profile_for(&mut conn, &account)? {
                        has_applied = select(exists(
                            applications::table
                                .filter(applications::job_id.eq(job.id))
                                .filter(applications::applicant_id.eq(profile.id)),
                        ))
                        .get_result(&mut conn)?;
                    }
                }
                _ => {}
            }
        }
    }

    if !job.is_publicly_visible() && !may_view_hidden {
        return Err(AppError::not_found());
    }

    let logo_key = employer.logo_key.clone();
    drop(conn);

    let logo_url = match logo_key {
        Some(key) => match state
            .storage
            .presign_get_object(&key, Duration::from_secs(LOGO_URL_EXPIRY_SECONDS))
            .await
        {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(error = %err, key = %key, "failed to presign logo URL");
                None
            }
        },
        None => None,
    };

    Ok(Json(JobDetailResponse {
        id: job.id,
        title: job.title.clone(),
        category: job.category.clone(),
        location: job.location.clone(),
        job_type_label: job_type_label(&job.job_type).to_string(),
        job_type: job.job_type.clone(),
        salary_min: job.salary_min,
        salary_max: job.salary_max,
        description: job.description.clone(),
        requirements: job.requirements.clone(),
        responsibilities: job.responsibilities.clone(),
        application_deadline: job.application_deadline,
        status: job.status.clone(),
        is_active: job.is_active,
        employer: EmployerCard {
            company_name: employer.company_name,
            industry: employer.industry,
            website: employer.website,
            logo_url,
        },
        has_applied,
        created_at: to_iso(job.created_at),
    }))
}

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub category: String,
    pub location: String,
    pub job_type: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub application_deadline: NaiveDate,
}

#[derive(Serialize)]
pub struct EmployerJobResponse {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub location: String,
    pub job_type: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub application_deadline: NaiveDate,
    pub status: String,
    pub is_active: bool,
    pub application_count: i64,
    pub created_at: String,
}

impl EmployerJobResponse {
    fn from_job(job: Job, application_count: i64) -> Self {
        Self {
            id: job.id,
            title: job.title,
            category: job.category,
            location: job.location,
            job_type: job.job_type,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            application_deadline: job.application_deadline,
            status: job.status,
            is_active: job.is_active,
            application_count,
            created_at: to_iso(job.created_at),
        }
    }
}

/// Employers submit jobs for moderation; every job starts `pending` and stays
/// out of the public listing until approved.
pub async fn post_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateJobRequest>,
) -> AppResult<(StatusCode, Json<EmployerJobResponse>)> {
    let today = Utc::now().date_naive();
    validate::validate_job_form(
        &JobForm {
            title: &payload.title,
            category: &payload.category,
            location: &payload.location,
            job_type: &payload.job_type,
            salary_min: payload.salary_min,
            salary_max: payload.salary_max,
            description: &payload.description,
            requirements: &payload.requirements,
            responsibilities: &payload.responsibilities,
            application_deadline: payload.application_deadline,
        },
        today,
    )
    .map_err(AppError::validation)?;

    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_EMPLOYER)?;
    let employer = authz::require_employer_profile(&mut conn, &account)?;

    let new_job = NewJob {
        id: Uuid::new_v4(),
        employer_id: employer.id,
        title: payload.title.trim().to_string(),
        category: payload.category.trim().to_string(),
        location: payload.location.trim().to_string(),
        job_type: payload.job_type,
        salary_min: payload.salary_min,
        salary_max: payload.salary_max,
        description: payload.description,
        requirements: payload.requirements,
        responsibilities: payload.responsibilities,
        application_deadline: payload.application_deadline,
    };

    diesel::insert_into(jobs::table)
        .values(&new_job)
        .execute(&mut conn)?;

    let job: Job = jobs::table.find(new_job.id).first(&mut conn)?;
    info!(
        job_id = %job.id,
        employer_id = %employer.id,
        status = JOB_STATUS_PENDING,
        "job submitted for moderation"
    );

    Ok((
        StatusCode::CREATED,
        Json(EmployerJobResponse::from_job(job, 0)),
    ))
}

pub async fn manage_jobs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<EmployerJobResponse>>> {
    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_EMPLOYER)?;
    let employer = authz::require_employer_profile(&mut conn, &account)?;

    let owned: Vec<Job> = jobs::table
        .filter(jobs::employer_id.eq(employer.id))
        .order((jobs::created_at.desc(), jobs::id.desc()))
        .load(&mut conn)?;

    let job_ids: Vec<Uuid> = owned.iter().map(|job| job.id).collect();
    let counts: HashMap<Uuid, i64> = if job_ids.is_empty() {
        HashMap::new()
    } else {
        applications::table
            .filter(applications::job_id.eq_any(&job_ids))
            .group_by(applications::job_id)
            .select((applications::job_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?
            .into_iter()
            .collect()
    };

    Ok(Json(
        owned
            .into_iter()
            .map(|job| {
                let count = counts.get(&job.id).copied().unwrap_or(0);
                EmployerJobResponse::from_job(job, count)
            })
            .collect(),
    ))
}

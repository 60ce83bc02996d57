use axum::extract::{Json, Path, Query, State};
use chrono::{NaiveDateTime, NaiveTime, Utc};
use diesel::pg::Pg;
use diesel::{prelude::*, result::DatabaseErrorKind};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::authz;
use crate::error::{AppError, AppResult};
use crate::models::{
    is_valid_moderation_decision, ApplicantProfile, Application, EmployerProfile, Job, User,
    JOB_STATUS_APPROVED, JOB_STATUS_PENDING, JOB_STATUS_REJECTED, ROLE_APPLICANT, ROLE_EMPLOYER,
};
use crate::notify::{compose_job_alert, dispatch_alerts};
use crate::pagination::{paginate, PageMeta, ADMIN_PAGE_SIZE};
use crate::schema::{applicant_profiles, applications, employer_profiles, jobs, users};
use crate::state::AppState;

use super::to_iso;

const RECENT_COUNT: i64 = 5;

type UsersWithProfile = diesel::dsl::LeftJoin<users::table, applicant_profiles::table>;
type BoxedUsersQuery = diesel::dsl::IntoBoxed<'static, UsersWithProfile, Pg>;

type JobsWithEmployer = diesel::dsl::InnerJoin<jobs::table, employer_profiles::table>;
type BoxedAdminJobsQuery = diesel::dsl::IntoBoxed<'static, JobsWithEmployer, Pg>;

type ApplicationsJoined = diesel::dsl::InnerJoin<
    diesel::dsl::InnerJoin<applications::table, JobsWithEmployer>,
    applicant_profiles::table,
>;
type BoxedApplicationsQuery = diesel::dsl::IntoBoxed<'static, ApplicationsJoined, Pg>;

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

// ---------------------------------------------------------------------------
// Dashboard

#[derive(Serialize)]
pub struct RecentJob {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct RecentUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AdminDashboardResponse {
    pub total_users: i64,
    pub total_applicants: i64,
    pub total_employers: i64,
    pub total_jobs: i64,
    pub pending_jobs: i64,
    pub total_applications: i64,
    pub recent_jobs: Vec<RecentJob>,
    pub recent_users: Vec<RecentUser>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<AdminDashboardResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let total_users: i64 = users::table.count().get_result(&mut conn)?;
    let total_applicants: i64 = users::table
        .filter(users::role.eq(ROLE_APPLICANT))
        .count()
        .get_result(&mut conn)?;
    let total_employers: i64 = users::table
        .filter(users::role.eq(ROLE_EMPLOYER))
        .count()
        .get_result(&mut conn)?;
    let total_jobs: i64 = jobs::table.count().get_result(&mut conn)?;
    let pending_jobs: i64 = jobs::table
        .filter(jobs::status.eq(JOB_STATUS_PENDING))
        .count()
        .get_result(&mut conn)?;
    let total_applications: i64 = applications::table.count().get_result(&mut conn)?;

    let recent_jobs: Vec<(Job, EmployerProfile)> = jobs::table
        .inner_join(employer_profiles::table)
        .order(jobs::created_at.desc())
        .limit(RECENT_COUNT)
        .load(&mut conn)?;

    let recent_users: Vec<User> = users::table
        .order(users::created_at.desc())
        .limit(RECENT_COUNT)
        .load(&mut conn)?;

    Ok(Json(AdminDashboardResponse {
        total_users,
        total_applicants,
        total_employers,
        total_jobs,
        pending_jobs,
        total_applications,
        recent_jobs: recent_jobs
            .into_iter()
            .map(|(job, employer)| RecentJob {
                id: job.id,
                title: job.title,
                company_name: employer.company_name,
                status: job.status,
                created_at: to_iso(job.created_at),
            })
            .collect(),
        recent_users: recent_users
            .into_iter()
            .map(|user| RecentUser {
                id: user.id,
                username: user.username,
                role: user.role,
                created_at: to_iso(user.created_at),
            })
            .collect(),
    }))
}

// ---------------------------------------------------------------------------
// User management

#[derive(Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<User> for AdminUserRow {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            phone: user.phone,
            is_active: user.is_active,
            is_staff: user.is_staff,
            last_login: user.last_login.map(to_iso),
            created_at: to_iso(user.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct AdminUserListResponse {
    pub users: Vec<AdminUserRow>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

fn filtered_users(params: &AdminListQuery) -> BoxedUsersQuery {
    let mut query = users::table
        .left_join(applicant_profiles::table)
        .into_boxed();

    if let Some(role) = trimmed(&params.role) {
        query = query.filter(users::role.eq(role));
    }
    if let Some(search) = trimmed(&params.search) {
        let pattern = format!("%{search}%");
        query = query.filter(
            users::username
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern.clone()))
                .or(applicant_profiles::full_name.ilike(pattern)),
        );
    }

    query
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<AdminUserListResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let total: i64 = filtered_users(&params).count().get_result(&mut conn)?;
    let (meta, offset) = paginate(params.page, total, ADMIN_PAGE_SIZE);

    let rows: Vec<(User, Option<ApplicantProfile>)> = filtered_users(&params)
        .order((users::created_at.desc(), users::id.desc()))
        .limit(meta.page_size)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(AdminUserListResponse {
        users: rows.into_iter().map(|(user, _)| user.into()).collect(),
        meta,
    }))
}

#[derive(Serialize)]
pub struct AdminUserJobRow {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AdminUserApplicationRow {
    pub id: Uuid,
    pub job_title: String,
    pub status: String,
    pub applied_at: String,
}

#[derive(Serialize)]
pub struct AdminUserDetailResponse {
    pub user: AdminUserRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<AdminUserJobRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<AdminUserApplicationRow>,
}

pub async fn user_detail(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<AdminUserDetailResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let target: User = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let mut full_name = None;
    let mut company_name = None;
    let mut job_rows = Vec::new();
    let mut application_rows = Vec::new();

    match target.role.as_str() {
        ROLE_APPLICANT => {
            if let Some(profile) = authz::applicant_profile_for(&mut conn, &target)? {
                full_name = Some(profile.full_name.clone());
                let rows: Vec<(Application, Job)> = applications::table
                    .inner_join(jobs::table)
                    .filter(applications::applicant_id.eq(profile.id))
                    .order(applications::applied_at.desc())
                    .load(&mut conn)?;
                application_rows = rows
                    .into_iter()
                    .map(|(application, job)| AdminUserApplicationRow {
                        id: application.id,
                        job_title: job.title,
                        status: application.status,
                        applied_at: to_iso(application.applied_at),
                    })
                    .collect();
            }
        }
        ROLE_EMPLOYER => {
            if let Some(profile) = authz::employer_profile_for(&mut conn, &target)? {
                company_name = Some(profile.company_name.clone());
                let rows: Vec<Job> = jobs::table
                    .filter(jobs::employer_id.eq(profile.id))
                    .order(jobs::created_at.desc())
                    .load(&mut conn)?;
                job_rows = rows
                    .into_iter()
                    .map(|job| AdminUserJobRow {
                        id: job.id,
                        title: job.title,
                        status: job.status,
                        is_active: job.is_active,
                        created_at: to_iso(job.created_at),
                    })
                    .collect();
            }
        }
        _ => {}
    }

    Ok(Json(AdminUserDetailResponse {
        user: target.into(),
        full_name,
        company_name,
        jobs: job_rows,
        applications: application_rows,
    }))
}

#[derive(Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
struct UpdateUserChangeset<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    is_active: Option<bool>,
    is_staff: Option<bool>,
    updated_at: Option<NaiveDateTime>,
}

/// Admin edit of an account record. Role is fixed at registration and stays
/// out of reach here.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> AppResult<Json<AdminUserRow>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let target: User = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let username = payload.username.as_ref().map(|v| v.trim());
    let email = payload.email.as_ref().map(|v| v.trim());
    if username.is_some_and(|v| v.is_empty()) {
        return Err(AppError::field("username", "username must not be empty"));
    }
    if email.is_some_and(|v| v.is_empty()) {
        return Err(AppError::field("email", "email must not be empty"));
    }

    let changeset = UpdateUserChangeset {
        username,
        email,
        phone: payload.phone.as_deref(),
        is_active: payload.is_active,
        is_staff: payload.is_staff,
        updated_at: Some(Utc::now().naive_utc()),
    };

    match diesel::update(users::table.find(target.id))
        .set(&changeset)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
            let field = if info.constraint_name().is_some_and(|name| name.contains("email")) {
                ("email", "This email is already registered.")
            } else {
                ("username", "This username is already taken.")
            };
            return Err(AppError::field(field.0, field.1));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let updated: User = users::table.find(target.id).first(&mut conn)?;
    info!(user_id = %updated.id, "user record updated by admin");
    Ok(Json(updated.into()))
}

#[derive(Serialize)]
pub struct ToggleUserResponse {
    pub id: Uuid,
    pub is_active: bool,
}

pub async fn toggle_user_active(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<ToggleUserResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let target: User = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let next = !target.is_active;
    diesel::update(users::table.find(target.id))
        .set((
            users::is_active.eq(next),
            users::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    info!(user_id = %target.id, is_active = next, "user account toggled");
    Ok(Json(ToggleUserResponse {
        id: target.id,
        is_active: next,
    }))
}

// ---------------------------------------------------------------------------
// Job moderation

#[derive(Serialize)]
pub struct AdminJobRow {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub job_type: String,
    pub status: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AdminJobListResponse {
    pub jobs: Vec<AdminJobRow>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
}

fn filtered_admin_jobs(params: &AdminListQuery) -> BoxedAdminJobsQuery {
    let mut query = jobs::table.inner_join(employer_profiles::table).into_boxed();

    if let Some(status) = trimmed(&params.status) {
        query = query.filter(jobs::status.eq(status));
    }
    if let Some(search) = trimmed(&params.search) {
        let pattern = format!("%{search}%");
        query = query.filter(
            jobs::title
                .ilike(pattern.clone())
                .or(employer_profiles::company_name.ilike(pattern.clone()))
                .or(jobs::location.ilike(pattern)),
        );
    }

    query
}

pub async fn list_jobs_admin(
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<AdminJobListResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let total: i64 = filtered_admin_jobs(&params).count().get_result(&mut conn)?;
    let (meta, offset) = paginate(params.page, total, ADMIN_PAGE_SIZE);

    let rows: Vec<(Job, EmployerProfile)> = filtered_admin_jobs(&params)
        .order((jobs::created_at.desc(), jobs::id.desc()))
        .limit(meta.page_size)
        .offset(offset)
        .load(&mut conn)?;

    let pending_count: i64 = jobs::table
        .filter(jobs::status.eq(JOB_STATUS_PENDING))
        .count()
        .get_result(&mut conn)?;
    let approved_count: i64 = jobs::table
        .filter(jobs::status.eq(JOB_STATUS_APPROVED))
        .count()
        .get_result(&mut conn)?;
    let rejected_count: i64 = jobs::table
        .filter(jobs::status.eq(JOB_STATUS_REJECTED))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(AdminJobListResponse {
        jobs: rows
            .into_iter()
            .map(|(job, employer)| AdminJobRow {
                id: job.id,
                title: job.title,
                company_name: employer.company_name,
                location: job.location,
                job_type: job.job_type,
                status: job.status,
                is_active: job.is_active,
                created_at: to_iso(job.created_at),
            })
            .collect(),
        meta,
        pending_count,
        approved_count,
        rejected_count,
    }))
}

#[derive(Deserialize)]
pub struct SetJobStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct SetJobStatusResponse {
    pub id: Uuid,
    pub status: String,
    pub notified_applicants: usize,
}

/// Moderation decision. Entering `approved` from any other status fires the
/// alert batch; re-approving an already-approved job does not.
pub async fn set_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
    Json(payload): Json<SetJobStatusRequest>,
) -> AppResult<Json<SetJobStatusResponse>> {
    if !is_valid_moderation_decision(&payload.status) {
        return Err(AppError::field("status", "invalid status"));
    }

    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let (job, employer): (Job, EmployerProfile) = jobs::table
        .inner_join(employer_profiles::table)
        .filter(jobs::id.eq(job_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let entered_approved =
        job.status != JOB_STATUS_APPROVED && payload.status == JOB_STATUS_APPROVED;

    diesel::update(jobs::table.find(job.id))
        .set((
            jobs::status.eq(&payload.status),
            jobs::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    info!(
        job_id = %job.id,
        from = %job.status,
        to = %payload.status,
        "job moderation status updated"
    );

    let mut notified_applicants = 0;
    if entered_approved {
        let recipients: Vec<String> = users::table
            .filter(users::role.eq(ROLE_APPLICANT))
            .filter(users::is_active.eq(true))
            .select(users::email)
            .load(&mut conn)?;
        drop(conn);

        let detail_url = state.config.job_detail_url(job.id);
        let messages: Vec<_> = recipients
            .iter()
            .map(|email| compose_job_alert(email, &job, &employer.company_name, &detail_url))
            .collect();
        notified_applicants = messages.len();

        dispatch_alerts(state.notifier.as_ref(), messages).await;
    }

    Ok(Json(SetJobStatusResponse {
        id: job.id,
        status: payload.status,
        notified_applicants,
    }))
}

#[derive(Serialize)]
pub struct ToggleJobResponse {
    pub id: Uuid,
    pub is_active: bool,
}

pub async fn toggle_job_active(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<ToggleJobResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let job: Job = jobs::table
        .find(job_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let next = !job.is_active;
    diesel::update(jobs::table.find(job.id))
        .set((
            jobs::is_active.eq(next),
            jobs::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    info!(job_id = %job.id, is_active = next, "job visibility toggled");
    Ok(Json(ToggleJobResponse {
        id: job.id,
        is_active: next,
    }))
}

// ---------------------------------------------------------------------------
// Application oversight

#[derive(Serialize)]
pub struct AdminApplicationRow {
    pub id: Uuid,
    pub applicant_name: String,
    pub job_title: String,
    pub company_name: String,
    pub status: String,
    pub applied_at: String,
}

#[derive(Serialize)]
pub struct AdminApplicationListResponse {
    pub applications: Vec<AdminApplicationRow>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

fn filtered_admin_applications(params: &AdminListQuery) -> BoxedApplicationsQuery {
    let mut query = applications::table
        .inner_join(jobs::table.inner_join(employer_profiles::table))
        .inner_join(applicant_profiles::table)
        .into_boxed();

    if let Some(status) = trimmed(&params.status) {
        query = query.filter(applications::status.eq(status));
    }
    if let Some(search) = trimmed(&params.search) {
        let pattern = format!("%{search}%");
        query = query.filter(
            applicant_profiles::full_name
                .ilike(pattern.clone())
                .or(jobs::title.ilike(pattern.clone()))
                .or(employer_profiles::company_name.ilike(pattern)),
        );
    }

    query
}

pub async fn list_applications_admin(
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<AdminApplicationListResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let total: i64 = filtered_admin_applications(&params)
        .count()
        .get_result(&mut conn)?;
    let (meta, offset) = paginate(params.page, total, ADMIN_PAGE_SIZE);

    let rows: Vec<(Application, (Job, EmployerProfile), ApplicantProfile)> =
        filtered_admin_applications(&params)
            .order((applications::applied_at.desc(), applications::id.desc()))
            .limit(meta.page_size)
            .offset(offset)
            .load(&mut conn)?;

    Ok(Json(AdminApplicationListResponse {
        applications: rows
            .into_iter()
            .map(|(application, (job, employer), applicant)| AdminApplicationRow {
                id: application.id,
                applicant_name: applicant.full_name,
                job_title: job.title,
                company_name: employer.company_name,
                status: application.status,
                applied_at: to_iso(application.applied_at),
            })
            .collect(),
        meta,
    }))
}

// ---------------------------------------------------------------------------
// System statistics

#[derive(Serialize)]
pub struct UserStats {
    pub total: i64,
    pub applicants: i64,
    pub employers: i64,
    pub admins: i64,
    pub active_today: i64,
    pub new_this_week: i64,
}

#[derive(Serialize)]
pub struct JobStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub active: i64,
    pub new_today: i64,
}

#[derive(Serialize)]
pub struct ApplicationStats {
    pub total: i64,
    pub applied: i64,
    pub under_review: i64,
    pub shortlisted: i64,
    pub rejected: i64,
    pub hired: i64,
}

#[derive(Serialize)]
pub struct SystemStatsResponse {
    pub user_stats: UserStats,
    pub job_stats: JobStats,
    pub application_stats: ApplicationStats,
}

pub async fn system_stats(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<SystemStatsResponse>> {
    let mut conn = state.db()?;
    authz::require_staff(&mut conn, user.as_ref())?;

    let now = Utc::now();
    let today_start = now.date_naive().and_time(NaiveTime::MIN);
    let week_ago = (now - chrono::Duration::days(7)).naive_utc();

    let user_stats = UserStats {
        total: users::table.count().get_result(&mut conn)?,
        applicants: users::table
            .filter(users::role.eq(ROLE_APPLICANT))
            .count()
            .get_result(&mut conn)?,
        employers: users::table
            .filter(users::role.eq(ROLE_EMPLOYER))
            .count()
            .get_result(&mut conn)?,
        admins: users::table
            .filter(users::is_staff.eq(true))
            .count()
            .get_result(&mut conn)?,
        active_today: users::table
            .filter(users::last_login.ge(today_start))
            .count()
            .get_result(&mut conn)?,
        new_this_week: users::table
            .filter(users::created_at.ge(week_ago))
            .count()
            .get_result(&mut conn)?,
    };

    let job_stats = JobStats {
        total: jobs::table.count().get_result(&mut conn)?,
        pending: jobs::table
            .filter(jobs::status.eq(JOB_STATUS_PENDING))
            .count()
            .get_result(&mut conn)?,
        approved: jobs::table
            .filter(jobs::status.eq(JOB_STATUS_APPROVED))
            .count()
            .get_result(&mut conn)?,
        rejected: jobs::table
            .filter(jobs::status.eq(JOB_STATUS_REJECTED))
            .count()
            .get_result(&mut conn)?,
        active: jobs::table
            .filter(jobs::is_active.eq(true))
            .count()
            .get_result(&mut conn)?,
        new_today: jobs::table
            .filter(jobs::created_at.ge(today_start))
            .count()
            .get_result(&mut conn)?,
    };

    let mut application_stats = ApplicationStats {
        total: applications::table.count().get_result(&mut conn)?,
        applied: 0,
        under_review: 0,
        shortlisted: 0,
        rejected: 0,
        hired: 0,
    };
    let status_counts: Vec<(String, i64)> = applications::table
        .group_by(applications::status)
        .select((applications::status, diesel::dsl::count_star()))
        .load(&mut conn)?;
    for (status, count) in status_counts {
        match status.as_str() {
            "applied" => application_stats.applied = count,
            "under_review" => application_stats.under_review = count,
            "shortlisted" => application_stats.shortlisted = count,
            "rejected" => application_stats.rejected = count,
            "hired" => application_stats.hired = count,
            _ => {}
        }
    }

    Ok(Json(SystemStatsResponse {
        user_stats,
        job_stats,
        application_stats,
    }))
}

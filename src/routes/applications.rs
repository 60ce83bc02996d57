use std::time::Duration;

use axum::extract::{Json, Multipart, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::{prelude::*, result::DatabaseErrorKind, select, PgConnection};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::authz;
use crate::error::{AppError, AppResult};
use crate::models::{
    is_valid_application_status, ApplicantProfile, Application, EmployerProfile, Job,
    NewApplication, APPLICATION_STATUS_HIRED, APPLICATION_STATUS_REJECTED, ROLE_APPLICANT,
    ROLE_EMPLOYER,
};
use crate::schema::{applicant_profiles, applications, employer_profiles, jobs};
use crate::state::AppState;
use crate::validate;

use super::profiles::{attachment_disposition, collect_multipart, ApplicantProfileResponse};
use super::to_iso;

const CV_URL_EXPIRY_SECONDS: u64 = 300;
const ALREADY_APPLIED_WARNING: &str = "You have already applied for this job.";

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub status: String,
    pub cover_letter: String,
    pub cv_filename: String,
    pub applied_at: String,
    pub updated_at: String,
}

impl ApplicationResponse {
    fn from_row(application: Application, job: &Job, company_name: &str) -> Self {
        Self {
            id: application.id,
            job_id: job.id,
            job_title: job.title.clone(),
            company_name: company_name.to_string(),
            status: application.status,
            cover_letter: application.cover_letter,
            cv_filename: application.cv_filename,
            applied_at: to_iso(application.applied_at),
            updated_at: to_iso(application.updated_at),
        }
    }
}

/// One application per (job, applicant): the pre-check keeps the common case
/// friendly, the unique constraint settles concurrent submissions.
pub async fn apply_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApplicationResponse>)> {
    let (texts, cv) = collect_multipart(&mut multipart, "cv").await?;
    let cover_letter = texts
        .get("cover_letter")
        .map(|v| v.trim())
        .unwrap_or_default()
        .to_string();

    if let Some(cv) = cv.as_ref() {
        validate::validate_cv_upload(&cv.filename, cv.bytes.len())
            .map_err(AppError::validation)?;
    }

    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_APPLICANT)?;
    let profile = authz::require_applicant_profile(&mut conn, &account)?;

    // A job that is not approved and active is indistinguishable from one
    // that does not exist.
    let (job, employer): (Job, EmployerProfile) = jobs::table
        .inner_join(employer_profiles::table)
        .filter(jobs::id.eq(job_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;
    if !job.is_publicly_visible() {
        return Err(AppError::not_found());
    }

    let already_applied: bool = select(exists(
        applications::table
            .filter(applications::job_id.eq(job.id))
            .filter(applications::applicant_id.eq(profile.id)),
    ))
    .get_result(&mut conn)?;
    if already_applied {
        return Err(AppError::duplicate(ALREADY_APPLIED_WARNING));
    }
    drop(conn);

    let application_id = Uuid::new_v4();
    let (cv_key, cv_filename) = match cv {
        Some(cv) => {
            let key = format!("application_cvs/{}/{}", application_id, Uuid::new_v4());
            let disposition = attachment_disposition(&cv.filename);
            let content_type = cv.resolved_content_type();
            state
                .storage
                .put_object(&key, cv.bytes, content_type, Some(disposition))
                .await
                .map_err(|err| {
                    error!(error = %err, key = %key, "failed to store application CV");
                    AppError::internal(format!("failed to store application CV: {err}"))
                })?;
            (key, cv.filename)
        }
        // Fall back to the CV on file with the applicant's profile.
        None => match (profile.cv_key.clone(), profile.cv_filename.clone()) {
            (Some(key), Some(filename)) => (key, filename),
            _ => {
                return Err(AppError::field(
                    "cv",
                    "attach a CV or upload one to your profile first",
                ));
            }
        },
    };

    let new_application = NewApplication {
        id: application_id,
        job_id: job.id,
        applicant_id: profile.id,
        cv_key,
        cv_filename,
        cover_letter,
    };

    let mut conn = state.db()?;
    match diesel::insert_into(applications::table)
        .values(&new_application)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::duplicate(ALREADY_APPLIED_WARNING));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let application: Application = applications::table.find(application_id).first(&mut conn)?;
    info!(
        application_id = %application.id,
        job_id = %job.id,
        applicant_id = %profile.id,
        "application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from_row(
            application,
            &job,
            &employer.company_name,
        )),
    ))
}

#[derive(Serialize)]
pub struct ApplicantRow {
    pub id: Uuid,
    pub applicant_name: String,
    pub phone: String,
    pub skills: String,
    pub education: String,
    pub status: String,
    pub cover_letter: String,
    pub cv_filename: String,
    pub applied_at: String,
}

/// Applications for one of the caller's own jobs; ownership resolves through
/// the job, not the application ids.
pub async fn view_applicants(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ApplicantRow>>> {
    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_EMPLOYER)?;
    let employer = authz::require_employer_profile(&mut conn, &account)?;
    let job = authz::owned_job(&mut conn, job_id, &employer)?;

    let rows: Vec<(Application, ApplicantProfile)> = applications::table
        .inner_join(applicant_profiles::table)
        .filter(applications::job_id.eq(job.id))
        .order(applications::applied_at.desc())
        .load(&mut conn)?;

    Ok(Json(
        rows.into_iter()
            .map(|(application, applicant)| ApplicantRow {
                id: application.id,
                applicant_name: applicant.full_name,
                phone: applicant.phone,
                skills: applicant.skills,
                education: applicant.education,
                status: application.status,
                cover_letter: application.cover_letter,
                cv_filename: application.cv_filename,
                applied_at: to_iso(application.applied_at),
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: String,
}

pub async fn update_application_status(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateApplicationStatusRequest>,
) -> AppResult<Json<ApplicationResponse>> {
    if !is_valid_application_status(&payload.status) {
        return Err(AppError::field("status", "invalid application status"));
    }

    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_EMPLOYER)?;
    let employer = authz::require_employer_profile(&mut conn, &account)?;
    let (application, job) = authz::owned_application(&mut conn, application_id, &employer)?;

    diesel::update(applications::table.find(application.id))
        .set((
            applications::status.eq(&payload.status),
            applications::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    let updated: Application = applications::table.find(application.id).first(&mut conn)?;
    info!(
        application_id = %updated.id,
        job_id = %job.id,
        status = %updated.status,
        "application status updated"
    );

    Ok(Json(ApplicationResponse::from_row(
        updated,
        &job,
        &employer.company_name,
    )))
}

#[derive(Serialize)]
pub struct ApplicantDashboardResponse {
    pub profile: ApplicantProfileResponse,
    pub applications: Vec<ApplicationResponse>,
    pub total_applications: i64,
    pub active_applications: i64,
}

fn load_history(
    conn: &mut PgConnection,
    applicant_id: Uuid,
) -> AppResult<Vec<ApplicationResponse>> {
    let rows: Vec<(Application, (Job, EmployerProfile))> = applications::table
        .inner_join(jobs::table.inner_join(employer_profiles::table))
        .filter(applications::applicant_id.eq(applicant_id))
        .order(applications::applied_at.desc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(application, (job, employer))| {
            ApplicationResponse::from_row(application, &job, &employer.company_name)
        })
        .collect())
}

pub async fn applicant_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<ApplicantDashboardResponse>> {
    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_APPLICANT)?;
    let profile = authz::require_applicant_profile(&mut conn, &account)?;

    let applications = load_history(&mut conn, profile.id)?;
    let total_applications = applications.len() as i64;
    let active_applications = applications
        .iter()
        .filter(|application| {
            application.status != APPLICATION_STATUS_REJECTED
                && application.status != APPLICATION_STATUS_HIRED
        })
        .count() as i64;

    Ok(Json(ApplicantDashboardResponse {
        profile: profile.into(),
        applications,
        total_applications,
        active_applications,
    }))
}

pub async fn application_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ApplicationResponse>>> {
    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_APPLICANT)?;
    let profile = authz::require_applicant_profile(&mut conn, &account)?;

    Ok(Json(load_history(&mut conn, profile.id)?))
}

#[derive(Serialize)]
pub struct CvDownloadResponse {
    pub url: String,
    pub expires_in: u64,
    pub filename: String,
}

/// Presigned CV download for the three parties entitled to it: the owning
/// employer, the applicant who submitted it, and staff.
pub async fn download_application_cv(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<CvDownloadResponse>> {
    let mut conn = state.db()?;
    let account = authz::current_account(&mut conn, &user)?;

    let (application, job): (Application, Job) = applications::table
        .inner_join(jobs::table)
        .filter(applications::id.eq(application_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;

    let mut entitled = account.is_staff;
    if !entitled && account.role == ROLE_EMPLOYER {
        if let Some(profile) = authz::employer_profile_for(&mut conn, &account)? {
            entitled = profile.id == job.employer_id;
        }
    }
    if !entitled && account.role == ROLE_APPLICANT {
        if let Some(profile) = authz::applicant_profile_for(&mut conn, &account)? {
            entitled = profile.id == application.applicant_id;
        }
    }
    if !entitled {
        return Err(AppError::not_found());
    }

    drop(conn);

    let url = state
        .storage
        .presign_get_object(
            &application.cv_key,
            Duration::from_secs(CV_URL_EXPIRY_SECONDS),
        )
        .await
        .map_err(|err| AppError::internal(format!("failed to generate CV URL: {err}")))?;

    Ok(Json(CvDownloadResponse {
        url,
        expires_in: CV_URL_EXPIRY_SECONDS,
        filename: application.cv_filename,
    }))
}

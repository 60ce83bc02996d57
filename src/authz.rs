use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::models::{Application, ApplicantProfile, EmployerProfile, Job, User};
use crate::schema::{applicant_profiles, applications, employer_profiles, jobs, users};

/// Re-reads the caller's account row. Tokens outlive account deletion and
/// deactivation, so the row is always loaded fresh.
pub fn current_account(conn: &mut PgConnection, user: &AuthenticatedUser) -> AppResult<User> {
    let account = users::table
        .find(user.user_id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(AppError::unauthorized)?;

    if !account.is_active {
        return Err(AppError::unauthorized());
    }

    Ok(account)
}

/// Admin surface gate. Any failure resolves to the soft access-denied
/// redirect, never a hard status code, which is why the identity arrives as
/// an `Option`.
pub fn require_staff(
    conn: &mut PgConnection,
    user: Option<&AuthenticatedUser>,
) -> AppResult<User> {
    let user = user.ok_or_else(AppError::access_denied)?;

    let account = users::table
        .find(user.user_id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(AppError::access_denied)?;

    if !account.is_active || !account.is_staff {
        return Err(AppError::access_denied());
    }

    Ok(account)
}

/// Role gate for the applicant/employer surfaces. A role mismatch is the same
/// soft redirect as the admin gate.
pub fn require_role(
    conn: &mut PgConnection,
    user: &AuthenticatedUser,
    role: &str,
) -> AppResult<User> {
    let account = current_account(conn, user)?;
    if account.role != role {
        return Err(AppError::access_denied());
    }
    Ok(account)
}

pub fn applicant_profile_for(
    conn: &mut PgConnection,
    account: &User,
) -> AppResult<Option<ApplicantProfile>> {
    Ok(applicant_profiles::table
        .filter(applicant_profiles::user_id.eq(account.id))
        .first::<ApplicantProfile>(conn)
        .optional()?)
}

pub fn employer_profile_for(
    conn: &mut PgConnection,
    account: &User,
) -> AppResult<Option<EmployerProfile>> {
    Ok(employer_profiles::table
        .filter(employer_profiles::user_id.eq(account.id))
        .first::<EmployerProfile>(conn)
        .optional()?)
}

pub fn require_applicant_profile(
    conn: &mut PgConnection,
    account: &User,
) -> AppResult<ApplicantProfile> {
    applicant_profile_for(conn, account)?.ok_or_else(|| {
        AppError::field("profile", "complete your applicant profile before continuing")
    })
}

pub fn require_employer_profile(
    conn: &mut PgConnection,
    account: &User,
) -> AppResult<EmployerProfile> {
    employer_profile_for(conn, account)?.ok_or_else(|| {
        AppError::field("profile", "complete your company profile before continuing")
    })
}

/// Resolves a job only when the employer owns it. A job that exists but
/// belongs to someone else is indistinguishable from one that does not exist.
pub fn owned_job(
    conn: &mut PgConnection,
    job_id: Uuid,
    employer: &EmployerProfile,
) -> AppResult<Job> {
    jobs::table
        .find(job_id)
        .filter(jobs::employer_id.eq(employer.id))
        .first::<Job>(conn)
        .optional()?
        .ok_or_else(AppError::not_found)
}

/// Resolves an application through the ownership chain
/// application → job → employer profile.
pub fn owned_application(
    conn: &mut PgConnection,
    application_id: Uuid,
    employer: &EmployerProfile,
) -> AppResult<(Application, Job)> {
    applications::table
        .inner_join(jobs::table)
        .filter(applications::id.eq(application_id))
        .filter(jobs::employer_id.eq(employer.id))
        .first::<(Application, Job)>(conn)
        .optional()?
        .ok_or_else(AppError::not_found)
}

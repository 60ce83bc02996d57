use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

pub const ROLE_APPLICANT: &str = "applicant";
pub const ROLE_EMPLOYER: &str = "employer";
pub const ROLE_ADMIN: &str = "admin";

/// Roles selectable at registration. `admin` accounts are provisioned out of
/// band and carry the staff flag.
pub const REGISTRATION_ROLES: &[&str] = &[ROLE_APPLICANT, ROLE_EMPLOYER];

pub const JOB_STATUS_PENDING: &str = "pending";
pub const JOB_STATUS_APPROVED: &str = "approved";
pub const JOB_STATUS_REJECTED: &str = "rejected";

/// Statuses an admin may move a job to. `pending` is only ever the initial
/// state.
pub const MODERATION_DECISIONS: &[&str] = &[JOB_STATUS_APPROVED, JOB_STATUS_REJECTED];

pub const JOB_TYPES: &[&str] = &["full_time", "part_time", "contract", "internship", "remote"];

pub const APPLICATION_STATUS_APPLIED: &str = "applied";
pub const APPLICATION_STATUS_REJECTED: &str = "rejected";
pub const APPLICATION_STATUS_HIRED: &str = "hired";

pub const APPLICATION_STATUSES: &[&str] = &[
    APPLICATION_STATUS_APPLIED,
    "under_review",
    "shortlisted",
    APPLICATION_STATUS_REJECTED,
    APPLICATION_STATUS_HIRED,
];

pub fn is_valid_registration_role(role: &str) -> bool {
    REGISTRATION_ROLES.iter().any(|allowed| *allowed == role)
}

pub fn is_valid_job_type(job_type: &str) -> bool {
    JOB_TYPES.iter().any(|allowed| *allowed == job_type)
}

pub fn is_valid_moderation_decision(status: &str) -> bool {
    MODERATION_DECISIONS.iter().any(|allowed| *allowed == status)
}

pub fn is_valid_application_status(status: &str) -> bool {
    APPLICATION_STATUSES.iter().any(|allowed| *allowed == status)
}

/// Human label for a job type, used in listings and alert messages.
pub fn job_type_label(job_type: &str) -> &str {
    match job_type {
        "full_time" => "Full Time",
        "part_time" => "Part Time",
        "contract" => "Contract",
        "internship" => "Internship",
        "remote" => "Remote",
        other => other,
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = applicant_profiles)]
#[diesel(belongs_to(User))]
pub struct ApplicantProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub skills: String,
    pub education: String,
    pub cv_key: Option<String>,
    pub cv_filename: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applicant_profiles)]
pub struct NewApplicantProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub skills: String,
    pub education: String,
    pub cv_key: Option<String>,
    pub cv_filename: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = employer_profiles)]
#[diesel(belongs_to(User))]
pub struct EmployerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: String,
    pub address: String,
    pub description: String,
    pub website: String,
    pub logo_key: Option<String>,
    pub logo_filename: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = employer_profiles)]
pub struct NewEmployerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: String,
    pub address: String,
    pub description: String,
    pub website: String,
    pub logo_key: Option<String>,
    pub logo_filename: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = jobs)]
#[diesel(belongs_to(EmployerProfile, foreign_key = employer_id))]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
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
    pub is_active: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Job {
    /// Whether the job is served to non-owning, non-staff callers. Both
    /// predicates are required everywhere a public listing or detail view is
    /// built.
    pub fn is_publicly_visible(&self) -> bool {
        self.status == JOB_STATUS_APPROVED && self.is_active
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub id: Uuid,
    pub employer_id: Uuid,
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

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = applications)]
#[diesel(belongs_to(Job))]
#[diesel(belongs_to(ApplicantProfile, foreign_key = applicant_id))]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cv_key: String,
    pub cv_filename: String,
    pub cover_letter: String,
    pub status: String,
    pub applied_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cv_key: String,
    pub cv_filename: String,
    pub cover_letter: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

use axum::extract::{Json, Multipart, State};
use diesel::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::authz;
use crate::error::{AppError, AppResult, FieldError};
use crate::models::{
    ApplicantProfile, EmployerProfile, NewApplicantProfile, NewEmployerProfile, ROLE_APPLICANT,
    ROLE_EMPLOYER,
};
use crate::schema::{applicant_profiles, employer_profiles};
use crate::state::AppState;
use crate::validate;

use super::to_iso;

/// A file picked out of a multipart submission.
pub(crate) struct UploadedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl UploadedFile {
    /// Content type as submitted, falling back to a guess from the filename.
    pub fn resolved_content_type(&self) -> Option<String> {
        self.content_type.clone().or_else(|| {
            mime_guess::from_path(&self.filename)
                .first()
                .map(|mime| mime.to_string())
        })
    }
}

pub(crate) fn attachment_disposition(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            _ => ch,
        })
        .collect();
    format!("attachment; filename=\"{}\"", sanitized)
}

/// Drains a multipart stream into named text fields plus at most one file
/// under `file_field`.
pub(crate) async fn collect_multipart(
    multipart: &mut Multipart,
    file_field: &str,
) -> AppResult<(std::collections::HashMap<String, String>, Option<UploadedFile>)> {
    let mut texts = std::collections::HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(format!("invalid multipart data: {err}"))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some(field_name) if field_name == file_field => {
                let filename = field.file_name().map(|n| n.to_string());
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = field.bytes().await.map_err(|err| {
                    error!(error = %err, "failed to read file bytes");
                    AppError::bad_request(format!("failed to read file bytes: {err}"))
                })?;
                // An empty file part with no name is how browsers submit an
                // untouched file input.
                if let Some(filename) = filename.filter(|name| !name.is_empty()) {
                    file = Some(UploadedFile {
                        bytes: data.to_vec(),
                        filename,
                        content_type,
                    });
                }
            }
            Some(field_name) => {
                let field_name = field_name.to_string();
                let value = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("invalid value for {field_name}: {err}"))
                })?;
                texts.insert(field_name, value);
            }
            None => {}
        }
    }

    Ok((texts, file))
}

fn required_text(
    texts: &std::collections::HashMap<String, String>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    let value = texts.get(field).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{field} must not be empty")));
    }
    value.to_string()
}

#[derive(Serialize)]
pub struct ApplicantProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub skills: String,
    pub education: String,
    pub cv_filename: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ApplicantProfile> for ApplicantProfileResponse {
    fn from(profile: ApplicantProfile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            phone: profile.phone,
            skills: profile.skills,
            education: profile.education,
            cv_filename: profile.cv_filename,
            created_at: to_iso(profile.created_at),
            updated_at: to_iso(profile.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct EmployerProfileResponse {
    pub id: Uuid,
    pub company_name: String,
    pub industry: String,
    pub address: String,
    pub description: String,
    pub website: String,
    pub logo_filename: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EmployerProfile> for EmployerProfileResponse {
    fn from(profile: EmployerProfile) -> Self {
        Self {
            id: profile.id,
            company_name: profile.company_name,
            industry: profile.industry,
            address: profile.address,
            description: profile.description,
            website: profile.website,
            logo_filename: profile.logo_filename,
            created_at: to_iso(profile.created_at),
            updated_at: to_iso(profile.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct ProfileOverviewResponse {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantProfileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<EmployerProfileResponse>,
}

pub async fn profile_overview(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<ProfileOverviewResponse>> {
    let mut conn = state.db()?;
    let account = authz::current_account(&mut conn, &user)?;

    let (applicant, employer) = match account.role.as_str() {
        ROLE_APPLICANT => (
            authz::applicant_profile_for(&mut conn, &account)?.map(Into::into),
            None,
        ),
        ROLE_EMPLOYER => (
            None,
            authz::employer_profile_for(&mut conn, &account)?.map(Into::into),
        ),
        _ => (None, None),
    };

    Ok(Json(ProfileOverviewResponse {
        role: account.role,
        applicant,
        employer,
    }))
}

/// Create-or-update of the caller's applicant profile, keyed by account.
pub async fn upsert_applicant_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApplicantProfileResponse>> {
    let (texts, cv) = collect_multipart(&mut multipart, "cv").await?;

    let mut errors = Vec::new();
    let full_name = required_text(&texts, "full_name", &mut errors);
    let phone = required_text(&texts, "phone", &mut errors);
    let skills = required_text(&texts, "skills", &mut errors);
    let education = required_text(&texts, "education", &mut errors);
    if let Some(cv) = cv.as_ref() {
        if let Err(file_errors) = validate::validate_cv_upload(&cv.filename, cv.bytes.len()) {
            errors.extend(file_errors);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_APPLICANT)?;
    let existing = authz::applicant_profile_for(&mut conn, &account)?;
    drop(conn);

    let stored_cv = match cv {
        Some(cv) => {
            let key = format!("cvs/{}/{}", account.id, Uuid::new_v4());
            let disposition = attachment_disposition(&cv.filename);
            let content_type = cv.resolved_content_type();
            state
                .storage
                .put_object(&key, cv.bytes, content_type, Some(disposition))
                .await
                .map_err(|err| {
                    error!(error = %err, key = %key, "failed to store CV");
                    AppError::internal(format!("failed to store CV: {err}"))
                })?;
            Some((key, cv.filename))
        }
        None => None,
    };

    if let (Some(_), Some(profile)) = (&stored_cv, &existing) {
        if let Some(old_key) = profile.cv_key.as_deref() {
            if let Err(err) = state.storage.delete_object(old_key).await {
                warn!(error = %err, key = %old_key, "failed to delete replaced CV");
            }
        }
    }

    let mut conn = state.db()?;
    let now = chrono::Utc::now().naive_utc();
    let profile: ApplicantProfile = match existing {
        Some(profile) => {
            if let Some((key, filename)) = &stored_cv {
                diesel::update(applicant_profiles::table.find(profile.id))
                    .set((
                        applicant_profiles::full_name.eq(&full_name),
                        applicant_profiles::phone.eq(&phone),
                        applicant_profiles::skills.eq(&skills),
                        applicant_profiles::education.eq(&education),
                        applicant_profiles::cv_key.eq(Some(key.as_str())),
                        applicant_profiles::cv_filename.eq(Some(filename.as_str())),
                        applicant_profiles::updated_at.eq(now),
                    ))
                    .execute(&mut conn)?;
            } else {
                diesel::update(applicant_profiles::table.find(profile.id))
                    .set((
                        applicant_profiles::full_name.eq(&full_name),
                        applicant_profiles::phone.eq(&phone),
                        applicant_profiles::skills.eq(&skills),
                        applicant_profiles::education.eq(&education),
                        applicant_profiles::updated_at.eq(now),
                    ))
                    .execute(&mut conn)?;
            }
            applicant_profiles::table.find(profile.id).first(&mut conn)?
        }
        None => {
            let (cv_key, cv_filename) = match &stored_cv {
                Some((key, filename)) => (Some(key.clone()), Some(filename.clone())),
                None => (None, None),
            };
            let new_profile = NewApplicantProfile {
                id: Uuid::new_v4(),
                user_id: account.id,
                full_name,
                phone,
                skills,
                education,
                cv_key,
                cv_filename,
            };
            diesel::insert_into(applicant_profiles::table)
                .values(&new_profile)
                .execute(&mut conn)?;
            applicant_profiles::table.find(new_profile.id).first(&mut conn)?
        }
    };

    info!(user_id = %account.id, profile_id = %profile.id, "applicant profile saved");
    Ok(Json(profile.into()))
}

/// Create-or-update of the caller's company profile, keyed by account.
pub async fn upsert_employer_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<EmployerProfileResponse>> {
    let (texts, logo) = collect_multipart(&mut multipart, "logo").await?;

    let mut errors = Vec::new();
    let company_name = required_text(&texts, "company_name", &mut errors);
    let industry = required_text(&texts, "industry", &mut errors);
    let address = required_text(&texts, "address", &mut errors);
    let description = required_text(&texts, "description", &mut errors);
    let website = texts.get("website").map(|v| v.trim()).unwrap_or_default();
    if let Some(logo) = logo.as_ref() {
        if let Err(file_errors) = validate::validate_logo_upload(&logo.filename, logo.bytes.len())
        {
            errors.extend(file_errors);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let account = authz::require_role(&mut conn, &user, ROLE_EMPLOYER)?;
    let existing = authz::employer_profile_for(&mut conn, &account)?;
    drop(conn);

    let stored_logo = match logo {
        Some(logo) => {
            let key = format!("company_logos/{}/{}", account.id, Uuid::new_v4());
            let content_type = logo.resolved_content_type();
            state
                .storage
                .put_object(&key, logo.bytes, content_type, None)
                .await
                .map_err(|err| {
                    error!(error = %err, key = %key, "failed to store logo");
                    AppError::internal(format!("failed to store logo: {err}"))
                })?;
            Some((key, logo.filename))
        }
        None => None,
    };

    if let (Some(_), Some(profile)) = (&stored_logo, &existing) {
        if let Some(old_key) = profile.logo_key.as_deref() {
            if let Err(err) = state.storage.delete_object(old_key).await {
                warn!(error = %err, key = %old_key, "failed to delete replaced logo");
            }
        }
    }

    let mut conn = state.db()?;
    let now = chrono::Utc::now().naive_utc();
    let profile: EmployerProfile = match existing {
        Some(profile) => {
            if let Some((key, filename)) = &stored_logo {
                diesel::update(employer_profiles::table.find(profile.id))
                    .set((
                        employer_profiles::company_name.eq(&company_name),
                        employer_profiles::industry.eq(&industry),
                        employer_profiles::address.eq(&address),
                        employer_profiles::description.eq(&description),
                        employer_profiles::website.eq(website),
                        employer_profiles::logo_key.eq(Some(key.as_str())),
                        employer_profiles::logo_filename.eq(Some(filename.as_str())),
                        employer_profiles::updated_at.eq(now),
                    ))
                    .execute(&mut conn)?;
            } else {
                diesel::update(employer_profiles::table.find(profile.id))
                    .set((
                        employer_profiles::company_name.eq(&company_name),
                        employer_profiles::industry.eq(&industry),
                        employer_profiles::address.eq(&address),
                        employer_profiles::description.eq(&description),
                        employer_profiles::website.eq(website),
                        employer_profiles::updated_at.eq(now),
                    ))
                    .execute(&mut conn)?;
            }
            employer_profiles::table.find(profile.id).first(&mut conn)?
        }
        None => {
            let (logo_key, logo_filename) = match &stored_logo {
                Some((key, filename)) => (Some(key.clone()), Some(filename.clone())),
                None => (None, None),
            };
            let new_profile = NewEmployerProfile {
                id: Uuid::new_v4(),
                user_id: account.id,
                company_name,
                industry,
                address,
                description,
                website: website.to_string(),
                logo_key,
                logo_filename,
            };
            diesel::insert_into(employer_profiles::table)
                .values(&new_profile)
                .execute(&mut conn)?;
            employer_profiles::table.find(new_profile.id).first(&mut conn)?
        }
    };

    info!(user_id = %account.id, profile_id = %profile.id, "company profile saved");
    Ok(Json(profile.into()))
}

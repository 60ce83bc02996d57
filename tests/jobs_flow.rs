mod common;

use anyhow::{ensure, Result};
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

fn tomorrow() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(1)).to_string()
}

async fn post_job(
    app: &TestApp,
    token: &str,
    title: &str,
    category: &str,
    location: &str,
    job_type: &str,
    salary_min: i64,
    salary_max: i64,
) -> Result<Uuid> {
    let response = app
        .post_json(
            "/api/employer/jobs",
            &json!({
                "title": title,
                "category": category,
                "location": location,
                "job_type": job_type,
                "salary_min": salary_min,
                "salary_max": salary_max,
                "description": "Build and run the product.",
                "requirements": "Experience with the stack.",
                "responsibilities": "Ship features.",
                "application_deadline": tomorrow(),
            }),
            Some(token),
        )
        .await?;
    let status = response.status();
    let body = body_to_vec(response.into_body()).await?;
    ensure!(
        status == StatusCode::CREATED,
        "job post failed with {status}: {}",
        String::from_utf8_lossy(&body)
    );
    let parsed: Value = serde_json::from_slice(&body)?;
    ensure!(parsed["status"] == "pending", "new jobs must start pending");
    Ok(Uuid::parse_str(parsed["id"].as_str().unwrap())?)
}

async fn set_job_status(app: &TestApp, admin_token: &str, job_id: Uuid, status: &str) -> Result<Value> {
    let response = app
        .patch_json(
            &format!("/api/admin/jobs/{job_id}/status"),
            &json!({ "status": status }),
            Some(admin_token),
        )
        .await?;
    let http_status = response.status();
    let body = body_to_vec(response.into_body()).await?;
    ensure!(
        http_status == StatusCode::OK,
        "status update failed with {http_status}: {}",
        String::from_utf8_lossy(&body)
    );
    Ok(serde_json::from_slice(&body)?)
}

async fn listed_job_titles(app: &TestApp, query: &str) -> Result<Vec<String>> {
    let response = app.get(&format!("/api/jobs{query}"), None).await?;
    ensure!(response.status() == StatusCode::OK, "listing failed");
    let body = body_to_vec(response.into_body()).await?;
    let parsed: Value = serde_json::from_slice(&body)?;
    Ok(parsed["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap().to_string())
        .collect())
}

#[tokio::test]
async fn job_is_listed_only_when_approved_and_active() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let employer = app
        .register("acme", "acme@example.com", "s3cretpass", "employer")
        .await?;
    app.complete_employer_profile(&employer, "Acme Inc").await?;
    let job_id = post_job(
        &app,
        &employer,
        "Backend Engineer",
        "Software Development",
        "Berlin",
        "full_time",
        50_000,
        80_000,
    )
    .await?;

    // Pending jobs are invisible to the public.
    assert!(listed_job_titles(&app, "").await?.is_empty());
    let detail = app.get(&format!("/api/jobs/{job_id}"), None).await?;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    // The owner still sees the pending job's detail.
    let detail = app.get(&format!("/api/jobs/{job_id}"), Some(&employer)).await?;
    assert_eq!(detail.status(), StatusCode::OK);

    app.insert_admin("root", "adminpass").await?;
    let admin = app.login_token("root", "adminpass").await?;
    set_job_status(&app, &admin, job_id, "approved").await?;

    assert_eq!(listed_job_titles(&app, "").await?, vec!["Backend Engineer"]);
    let detail = app.get(&format!("/api/jobs/{job_id}"), None).await?;
    assert_eq!(detail.status(), StatusCode::OK);

    // Deactivating hides the job regardless of approval.
    let toggled = app
        .post_empty(&format!("/api/admin/jobs/{job_id}/toggle-active"), Some(&admin))
        .await?;
    assert_eq!(toggled.status(), StatusCode::OK);
    assert!(listed_job_titles(&app, "").await?.is_empty());
    let detail = app.get(&format!("/api/jobs/{job_id}"), None).await?;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    // Reactivating restores it immediately.
    app.post_empty(&format!("/api/admin/jobs/{job_id}/toggle-active"), Some(&admin))
        .await?;
    assert_eq!(listed_job_titles(&app, "").await?, vec!["Backend Engineer"]);

    // Rejection hides it again.
    set_job_status(&app, &admin, job_id, "rejected").await?;
    assert!(listed_job_titles(&app, "").await?.is_empty());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn approval_notifies_each_active_applicant_once() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.register("seeker1", "seeker1@example.com", "s3cretpass", "applicant")
        .await?;
    app.register("seeker2", "seeker2@example.com", "s3cretpass", "applicant")
        .await?;
    let employer = app
        .register("acme", "acme@example.com", "s3cretpass", "employer")
        .await?;
    app.complete_employer_profile(&employer, "Acme Inc").await?;
    let job_id = post_job(
        &app,
        &employer,
        "Backend Engineer",
        "Software Development",
        "Berlin",
        "full_time",
        50_000,
        80_000,
    )
    .await?;

    app.insert_admin("root", "adminpass").await?;
    let admin = app.login_token("root", "adminpass").await?;

    let outcome = set_job_status(&app, &admin, job_id, "approved").await?;
    assert_eq!(outcome["notified_applicants"], 2);

    let batches = app.notifier().batches().await;
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 2);
    let recipients: Vec<&str> = batch.iter().map(|m| m.recipient.as_str()).collect();
    assert!(recipients.contains(&"seeker1@example.com"));
    assert!(recipients.contains(&"seeker2@example.com"));
    assert_eq!(batch[0].subject, "New Job Alert: Backend Engineer");
    assert!(batch[0].body.contains("Acme Inc"));
    assert!(batch[0].body.contains(&format!("/jobs/{job_id}")));

    // Saving the approved status again is not a fresh approval.
    let outcome = set_job_status(&app, &admin, job_id, "approved").await?;
    assert_eq!(outcome["notified_applicants"], 0);
    assert_eq!(app.notifier().batches().await.len(), 1);

    // A genuine re-transition through rejected fires again.
    set_job_status(&app, &admin, job_id, "rejected").await?;
    let outcome = set_job_status(&app, &admin, job_id, "approved").await?;
    assert_eq!(outcome["notified_applicants"], 2);
    assert_eq!(app.notifier().batches().await.len(), 2);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn job_form_validation_rejects_bad_salaries_and_deadlines() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let employer = app
        .register("acme", "acme@example.com", "s3cretpass", "employer")
        .await?;
    app.complete_employer_profile(&employer, "Acme Inc").await?;

    let base = json!({
        "title": "Backend Engineer",
        "category": "Software Development",
        "location": "Berlin",
        "job_type": "full_time",
        "description": "d",
        "requirements": "r",
        "responsibilities": "r",
    });

    let mut inverted = base.clone();
    inverted["salary_min"] = json!(90_000);
    inverted["salary_max"] = json!(50_000);
    inverted["application_deadline"] = json!(tomorrow());
    let response = app.post_json("/api/employer/jobs", &inverted, Some(&employer)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert!(body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["field"] == "salary_max"));

    let mut stale = base;
    stale["salary_min"] = json!(50_000);
    stale["salary_max"] = json!(80_000);
    stale["application_deadline"] =
        json!((chrono::Utc::now().date_naive() - chrono::Duration::days(1)).to_string());
    let response = app.post_json("/api/employer/jobs", &stale, Some(&employer)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert!(body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["field"] == "application_deadline"));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn search_and_filters_compose_over_the_visible_set() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let employer = app
        .register("acme", "acme@example.com", "s3cretpass", "employer")
        .await?;
    app.complete_employer_profile(&employer, "Acme Inc").await?;
    let backend = post_job(
        &app,
        &employer,
        "Backend Engineer",
        "Software Development",
        "Berlin",
        "full_time",
        50_000,
        80_000,
    )
    .await?;
    let design = post_job(
        &app,
        &employer,
        "Product Designer",
        "Design",
        "Lisbon",
        "part_time",
        30_000,
        40_000,
    )
    .await?;

    app.insert_admin("root", "adminpass").await?;
    let admin = app.login_token("root", "adminpass").await?;
    set_job_status(&app, &admin, backend, "approved").await?;
    set_job_status(&app, &admin, design, "approved").await?;

    // Free-text search ORs across title, company, location and category.
    assert_eq!(listed_job_titles(&app, "?q=backend").await?, vec!["Backend Engineer"]);
    assert_eq!(listed_job_titles(&app, "?q=acme").await?.len(), 2);
    assert_eq!(listed_job_titles(&app, "?q=lisbon").await?, vec!["Product Designer"]);
    assert!(listed_job_titles(&app, "?q=nothing-matches").await?.is_empty());

    // Structured filters AND together.
    assert_eq!(
        listed_job_titles(&app, "?job_type=part_time").await?,
        vec!["Product Designer"]
    );
    assert_eq!(
        listed_job_titles(&app, "?salary_min=40000").await?,
        vec!["Backend Engineer"]
    );
    assert_eq!(
        listed_job_titles(&app, "?salary_max=50000").await?,
        vec!["Product Designer"]
    );
    assert_eq!(
        listed_job_titles(&app, "?category=design").await?,
        vec!["Product Designer"]
    );
    assert!(listed_job_titles(&app, "?q=acme&job_type=full_time&location=lisbon")
        .await?
        .is_empty());

    // Category suggestions reflect the visible set.
    let response = app.get("/api/jobs", None).await?;
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    let categories: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Design", "Software Development"]);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn listing_paginates_newest_first() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let employer = app
        .register("acme", "acme@example.com", "s3cretpass", "employer")
        .await?;
    app.complete_employer_profile(&employer, "Acme Inc").await?;

    app.insert_admin("root", "adminpass").await?;
    let admin = app.login_token("root", "adminpass").await?;

    for n in 0..12 {
        let job_id = post_job(
            &app,
            &employer,
            &format!("Role {n}"),
            "Engineering",
            "Berlin",
            "full_time",
            40_000,
            60_000,
        )
        .await?;
        set_job_status(&app, &admin, job_id, "approved").await?;
    }

    let response = app.get("/api/jobs", None).await?;
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert_eq!(body["total"], 12);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 10);

    let response = app.get("/api/jobs?page=2", None).await?;
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert_eq!(body["page"], 2);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);

    // Out-of-range pages clamp to the last page instead of failing.
    let response = app.get("/api/jobs?page=99", None).await?;
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert_eq!(body["page"], 2);

    let response = app.get("/api/home", None).await?;
    let body: Value = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert_eq!(body["latest_jobs"].as_array().unwrap().len(), 8);

    app.cleanup().await?;
    Ok(())
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{NewProfile, Profile};
use crate::models::records::{CvRecord, NewRecord, WorkExperience};
use crate::models::section::{Section, SectionToggles};
use crate::profile::completeness::{compute_completeness_report, CompletenessReport};
use crate::profile::dates::{age_on, whole_years_between};
use crate::profile::validation::{validate_profile, validate_record};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    /// Absent for legacy rows without a birth date.
    pub age: Option<i32>,
    pub years_of_experience: i32,
}

#[derive(Debug, Serialize)]
pub struct RecordCreatedResponse {
    pub id: Uuid,
    pub section: Section,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityUpdate {
    pub visible: bool,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sum of whole years over visible experience; open-ended records count to `today`.
pub fn years_of_experience(records: &[WorkExperience], today: NaiveDate) -> i32 {
    records
        .iter()
        .filter(|r| r.is_visible())
        .map(|r| whole_years_between(r.start_date, r.end_date.unwrap_or(today)))
        .sum()
}

fn parse_section(raw: &str) -> Result<Section, AppError> {
    raw.parse::<Section>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn require_profile(state: &AppState, profile_id: Uuid) -> Result<Profile, AppError> {
    state
        .repo
        .find_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(req): Json<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    validate_profile(&req, today(), &state.config.upload_limits())?;
    let profile = state.repo.create_profile(req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = require_profile(&state, profile_id).await?;
    let records = state
        .repo
        .load_records(profile_id, &[Section::Experience])
        .await?;

    let today = today();
    Ok(Json(ProfileResponse {
        age: profile.birth_date.map(|b| age_on(b, today)),
        years_of_experience: years_of_experience(&records.experience, today),
        profile,
    }))
}

/// DELETE /api/v1/profiles/:id
///
/// Child records go with the profile.
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.repo.delete_profile(profile_id).await? {
        return Err(AppError::NotFound(format!("Profile {profile_id} not found")));
    }
    info!("Deleted profile {profile_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/profiles/:id/sections
pub async fn handle_update_sections(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(toggles): Json<SectionToggles>,
) -> Result<Json<SectionToggles>, AppError> {
    if !state.repo.update_sections(profile_id, toggles).await? {
        return Err(AppError::NotFound(format!("Profile {profile_id} not found")));
    }
    Ok(Json(toggles))
}

/// GET /api/v1/profiles/:id/completeness
pub async fn handle_completeness(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<CompletenessReport>, AppError> {
    let profile = require_profile(&state, profile_id).await?;
    let records = state.repo.load_records(profile_id, &Section::ALL).await?;
    Ok(Json(compute_completeness_report(&profile, &records)))
}

/// POST /api/v1/profiles/:id/records
///
/// Body is tagged by `"section"`. Every failing field is reported at once.
pub async fn handle_add_record(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(record): Json<NewRecord>,
) -> Result<(StatusCode, Json<RecordCreatedResponse>), AppError> {
    require_profile(&state, profile_id).await?;

    let today = today();
    validate_record(&record, today, &state.config.upload_limits())?;
    let id = state.repo.insert_record(profile_id, &record, today).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordCreatedResponse {
            id,
            section: record.section(),
        }),
    ))
}

/// PATCH /api/v1/profiles/:id/records/:section/:record_id/visibility
pub async fn handle_set_visibility(
    State(state): State<AppState>,
    Path((profile_id, section, record_id)): Path<(Uuid, String, Uuid)>,
    Json(update): Json<VisibilityUpdate>,
) -> Result<StatusCode, AppError> {
    let section = parse_section(&section)?;
    let found = state
        .repo
        .set_record_visibility(profile_id, section, record_id, update.visible)
        .await?;
    if !found {
        return Err(AppError::NotFound(format!("Record {record_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/profiles/:id/records/:section/:record_id
pub async fn handle_delete_record(
    State(state): State<AppState>,
    Path((profile_id, section, record_id)): Path<(Uuid, String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let section = parse_section(&section)?;
    if !state
        .repo
        .delete_record(profile_id, section, record_id)
        .await?
    {
        return Err(AppError::NotFound(format!("Record {record_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::memory::InMemoryProfileRepository;
    use crate::routes::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<InMemoryProfileRepository>) {
        let repo = Arc::new(InMemoryProfileRepository::new());
        (build_router(AppState::for_tests(repo.clone())), repo)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn profile_body(national_id: &str) -> Value {
        json!({
            "user_id": Uuid::new_v4(),
            "first_names": "Ana María",
            "last_names": "Pérez",
            "nationality": "Ecuadorian",
            "birth_date": "1990-08-20",
            "national_id": national_id,
            "sex": "female",
            "civil_status": "married",
            "driving_license": "B",
            "mobile_phone": "0991234567",
            "home_address": "Av. Amazonas 123"
        })
    }

    fn field_names(body: &Value) -> Vec<String> {
        body["error"]["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f["field"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn create_profile(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/profiles", Some(profile_body("1712345678"))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    fn experience_body(start: &str, end: Option<&str>, visible: bool) -> Value {
        json!({
            "section": "experience",
            "position": "Engineer",
            "company": "Acme",
            "location": "Quito",
            "start_date": start,
            "end_date": end,
            "description": "Built things",
            "visible": visible
        })
    }

    #[tokio::test]
    async fn test_create_profile_assigns_slug_and_defaults() {
        let (app, _) = app();
        let (status, body) = send(&app, "POST", "/api/v1/profiles", Some(profile_body("1712345678"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["headline"], "My Professional Profile");
        assert!(body["slug"].as_str().unwrap().starts_with("ana-maria-perez-"));
        assert_eq!(body["sections"]["experience"], true);
    }

    #[tokio::test]
    async fn test_create_profile_reports_every_invalid_field() {
        let (app, _) = app();
        let mut body = profile_body("17123");
        body["birth_date"] = json!("2099-01-01");
        body["home_address"] = json!("   ");
        body["website"] = json!("ftp://example.com");

        let (status, response) = send(&app, "POST", "/api/v1/profiles", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
        let fields = field_names(&response);
        for expected in ["birth_date", "national_id", "home_address", "website"] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected} in {fields:?}");
        }
    }

    #[tokio::test]
    async fn test_duplicate_national_id_is_a_field_error() {
        let (app, _) = app();
        create_profile(&app).await;
        let (status, response) =
            send(&app, "POST", "/api/v1/profiles", Some(profile_body("1712345678"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(field_names(&response), vec!["national_id"]);
    }

    #[tokio::test]
    async fn test_get_profile_includes_age_and_visible_experience_years() {
        let (app, _) = app();
        let id = create_profile(&app).await;
        let uri = format!("/api/v1/profiles/{id}/records");
        for body in [
            experience_body("2010-01-01", Some("2015-01-01"), true),
            experience_body("2015-02-01", Some("2017-02-01"), true),
            experience_body("2017-03-01", Some("2020-03-01"), false),
        ] {
            let (status, _) = send(&app, "POST", &uri, Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, "GET", &format!("/api/v1/profiles/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["years_of_experience"], 7);
        assert!(body["age"].as_i64().unwrap() >= 34);
        assert_eq!(body["profile"]["first_names"], "Ana María");
    }

    #[tokio::test]
    async fn test_unknown_profile_is_404() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", &format!("/api/v1/profiles/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_record_with_end_before_start_is_rejected() {
        let (app, repo) = app();
        let id = create_profile(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/profiles/{id}/records"),
            Some(experience_body("2020-05-01", Some("2019-05-01"), true)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(field_names(&body), vec!["end_date"]);
        assert_eq!(repo.record_count(id.parse().unwrap()), 0);
    }

    #[tokio::test]
    async fn test_record_for_missing_profile_is_404() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/profiles/{}/records", Uuid::new_v4()),
            Some(experience_body("2020-05-01", None, true)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_visibility_and_delete_record_flow() {
        let (app, repo) = app();
        let id = create_profile(&app).await;
        let (status, created) = send(
            &app,
            "POST",
            &format!("/api/v1/profiles/{id}/records"),
            Some(experience_body("2020-05-01", None, true)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["section"], "experience");
        let record_id = created["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/v1/profiles/{id}/records/experience/{record_id}/visibility"),
            Some(json!({ "visible": false })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", &format!("/api/v1/profiles/{id}"), None).await;
        assert_eq!(body["years_of_experience"], 0);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/api/v1/profiles/{id}/records/hobbies/{record_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let uri = format!("/api/v1/profiles/{id}/records/experience/{record_id}");
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(repo.record_count(id.parse().unwrap()), 0);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_sections_and_completeness() {
        let (app, _) = app();
        let id = create_profile(&app).await;

        let toggles = json!({
            "experience": true,
            "awards": false,
            "courses": true,
            "academic_products": true,
            "work_products": false,
            "misc_listings": true
        });
        let (status, body) = send(&app, "PUT", &format!("/api/v1/profiles/{id}/sections"), Some(toggles)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["awards"], false);

        send(
            &app,
            "POST",
            &format!("/api/v1/profiles/{id}/records"),
            Some(experience_body("2020-05-01", None, true)),
        )
        .await;

        let (status, report) = send(&app, "GET", &format!("/api/v1/profiles/{id}/completeness"), None).await;
        assert_eq!(status, StatusCode::OK);
        // Only the experience check (25) is satisfied.
        assert_eq!(report["score"], 25);
        assert!(!report["recommendations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_profile_removes_records() {
        let (app, repo) = app();
        let id = create_profile(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/v1/profiles/{id}/records"),
            Some(experience_body("2020-05-01", None, true)),
        )
        .await;

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/profiles/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(repo.record_count(id.parse().unwrap()), 0);

        let (status, _) = send(&app, "GET", &format!("/api/v1/profiles/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_years_of_experience_counts_open_records_to_today() {
        use crate::document::assembler::tests::{d, experience, records_from};
        let records = records_from(vec![
            experience("A", d(2018, 6, 1), None, true),
            experience("B", d(2010, 1, 1), Some(d(2012, 12, 31)), true),
            experience("C", d(2000, 1, 1), Some(d(2009, 1, 1)), false),
        ]);
        // 2018-06-01 → 2024-06-15 = 6, 2010 → end of 2012 = 2, hidden ignored.
        assert_eq!(years_of_experience(&records.experience, d(2024, 6, 15)), 8);
    }
}

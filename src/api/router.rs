//! Clinic API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Session validator → 3. Request logger

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the clinic API router.
///
/// Everything except login, registration, and password reset requires a
/// session token.
pub fn clinic_api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);

    // Protected routes — session required.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Session → Logger (innermost) → Handler
    //
    // Extension must be outermost so the session middleware can access
    // ApiContext. Routes use State; .with_state() converts
    // Router<ApiContext> → Router<()> so the from_fn layers compose.
    let protected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/users", get(endpoints::users::list))
        .route("/users/export", get(endpoints::users::export_csv))
        .route("/users/:id/role", put(endpoints::users::update_role))
        .route("/users/:id", delete(endpoints::users::delete))
        .route(
            "/patients",
            post(endpoints::patients::create).get(endpoints::patients::list),
        )
        .route(
            "/patients/:chart",
            get(endpoints::patients::get).delete(endpoints::patients::delete),
        )
        .route(
            "/prenatal",
            post(endpoints::prenatal::create).get(endpoints::prenatal::list),
        )
        .route(
            "/appointments",
            post(endpoints::appointments::create).get(endpoints::appointments::list),
        )
        .route("/appointments/today", get(endpoints::appointments::today))
        .route(
            "/appointments/:id/confirmation",
            get(endpoints::appointments::confirmation),
        )
        .route(
            "/appointments/:id/notes",
            put(endpoints::appointments::update_notes),
        )
        .route("/appointments/:id", delete(endpoints::appointments::delete))
        .route("/messages", post(endpoints::messages::send))
        .route("/messages/inbox", get(endpoints::messages::inbox))
        .route("/messages/threads/:id", get(endpoints::messages::thread))
        .route(
            "/messages/unseen-count",
            get(endpoints::messages::unseen_count),
        )
        .route("/messages/mark-seen", post(endpoints::messages::mark_seen))
        .route("/messages/stats", get(endpoints::messages::stats))
        .route("/notifications", get(endpoints::messages::notifications))
        .route(
            "/notifications/mark-seen",
            post(endpoints::messages::notifications_mark_seen),
        )
        .route(
            "/births",
            post(endpoints::postnatal::create_birth).get(endpoints::postnatal::list_births),
        )
        .route(
            "/postpartum",
            post(endpoints::postnatal::create_postpartum)
                .get(endpoints::postnatal::list_postpartum),
        )
        .route(
            "/vaccinations",
            post(endpoints::postnatal::create_vaccination)
                .get(endpoints::postnatal::list_vaccinations),
        )
        .route("/reports/workbook", get(endpoints::reports::workbook))
        .route("/reports/:dataset/summary", get(endpoints::reports::summary))
        .route("/reports/:dataset/csv", get(endpoints::reports::csv))
        .route("/reports/:dataset/pdf", get(endpoints::reports::pdf))
        .route("/wizard", get(endpoints::wizard::current))
        .route("/wizard/next", post(endpoints::wizard::next))
        .route("/wizard/prev", post(endpoints::wizard::prev))
        .route("/wizard/goto", post(endpoints::wizard::goto))
        .route("/wizard/reset", post(endpoints::wizard::reset))
        .route(
            "/wizard/draft",
            put(endpoints::wizard::save_draft).get(endpoints::wizard::load_draft),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::log::log_request))
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes — the pages you can reach before logging in.
    let unprotected = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/reset-password", post(endpoints::auth::reset_password))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::log::log_request))
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", protected).nest("/api", unprotected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth;

    /// Fresh state backed by a temp database. Keep the tempdir guard
    /// alive for the duration of the test.
    fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::with_db_path(tmp.path().join("matrona.db")));
        (state, tmp)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(state: &Arc<AppState>, req: Request<Body>) -> axum::response::Response {
        clinic_api_router(state.clone()).oneshot(req).await.unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn register(state: &Arc<AppState>, username: &str, password: &str, role: &str) {
        let response = send(
            state,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "password": password,
                    "password_confirm": password,
                    "role": role,
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn login(state: &Arc<AppState>, username: &str, password: &str) -> String {
        let response = send(
            state,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"username": username, "password": password})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        json["token"].as_str().unwrap().to_string()
    }

    async fn midwife_token(state: &Arc<AppState>) -> String {
        register(state, "klessard", "s3cret-pw", "midwife").await;
        login(state, "klessard", "s3cret-pw").await
    }

    async fn create_patient(state: &Arc<AppState>, token: &str, chart: &str) {
        let response = send(
            state,
            request(
                "POST",
                "/api/patients",
                Some(token),
                Some(json!({
                    "chart_number": chart,
                    "dob": "1998-06-14",
                    "community_of_residence": "Chisasibi",
                    "successful_first_contact": true,
                    "eligible_to_midwifery_care": "Eligible",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // ── Auth ─────────────────────────────────────────────────

    #[tokio::test]
    async fn health_requires_session() {
        let (state, _tmp) = test_state();
        let response = send(&state, request("GET", "/api/health", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_health_flow() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(&state, request("GET", "/api/health", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tables"], 10);
    }

    #[tokio::test]
    async fn register_accepts_legacy_role_spelling() {
        let (state, _tmp) = test_state();
        register(&state, "aduval", "mot-de-passe", "Sage-femme").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"username": "aduval", "password": "mot-de-passe"})),
            ),
        )
        .await;
        let json = response_json(response).await;
        assert_eq!(json["role"], "Midwife");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (state, _tmp) = test_state();
        register(&state, "klessard", "pw-one-11", "midwife").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": "klessard",
                    "password": "pw-two-22",
                    "password_confirm": "pw-two-22",
                    "role": "nurse",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_bad_request() {
        let (state, _tmp) = test_state();
        let response = send(
            &state,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": "klessard",
                    "password": "pw-one-11",
                    "password_confirm": "different",
                    "role": "midwife",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_password_rejected() {
        let (state, _tmp) = test_state();
        register(&state, "klessard", "s3cret-pw", "midwife").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"username": "klessard", "password": "guess"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_CREDENTIALS");
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(&state, request("POST", "/api/auth/logout", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, request("GET", "/api/health", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reset_password_then_login_with_new_one() {
        let (state, _tmp) = test_state();
        register(&state, "klessard", "old-pw-123", "midwife").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/auth/reset-password",
                None,
                Some(json!({
                    "username": "klessard",
                    "new_password": "new-pw-456",
                    "new_password_confirm": "new-pw-456",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        login(&state, "klessard", "new-pw-456").await;
    }

    // ── Patients & prenatal ──────────────────────────────────

    #[tokio::test]
    async fn patient_submit_then_read_back_unchanged() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request("GET", "/api/patients/CH-0042", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["chart_number"], "CH-0042");
        assert_eq!(json["dob"], "1998-06-14");
        assert_eq!(json["community_of_residence"], "Chisasibi");
        assert_eq!(json["eligible_to_midwifery_care"], "Eligible");
    }

    #[tokio::test]
    async fn duplicate_chart_number_conflicts() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/patients",
                Some(&token),
                Some(json!({
                    "chart_number": "CH-0042",
                    "eligible_to_midwifery_care": "Pending",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn clerk_cannot_open_clinical_pages() {
        let (state, _tmp) = test_state();
        register(&state, "frontdesk", "clerk-pw-1", "clerk").await;
        let token = login(&state, "frontdesk", "clerk-pw-1").await;

        let response = send(&state, request("GET", "/api/patients", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deleting_a_chart_removes_it_from_listings() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request("DELETE", "/api/patients/CH-0042", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, request("GET", "/api/patients", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["patients"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn prenatal_form_requires_existing_chart() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/prenatal",
                Some(&token),
                Some(json!({
                    "chart_number": "CH-MISSING",
                    "date_collection": "2026-02-10",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prenatal_submit_and_latest() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        for (date, note) in [("2026-02-10", "first"), ("2026-04-01", "second")] {
            let response = send(
                &state,
                request(
                    "POST",
                    "/api/prenatal",
                    Some(&token),
                    Some(json!({
                        "chart_number": "CH-0042",
                        "date_collection": date,
                        "gpa": "G2P1A0",
                        "notes": note,
                    })),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &state,
            request(
                "GET",
                "/api/prenatal?chart_number=CH-0042&latest=true",
                Some(&token),
                None,
            ),
        )
        .await;
        let json = response_json(response).await;
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["notes"], "second");
    }

    // ── Appointments ─────────────────────────────────────────

    #[tokio::test]
    async fn appointment_booking_flow() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/appointments",
                Some(&token),
                Some(json!({
                    "chart_number": "CH-0042",
                    "date": "2026-03-14",
                    "time": "10:30",
                    "appointment_type": "PrenatalVisit",
                    "detail": "Routine visit",
                    "duration_minutes": 45,
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let appointment = response_json(response).await;
        let id = appointment["id"].as_str().unwrap().to_string();
        assert_eq!(appointment["attended"], "Pending");

        // Printable confirmation
        let response = send(
            &state,
            request(
                "GET",
                &format!("/api/appointments/{id}/confirmation"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/pdf"
        );
        let body = to_bytes(response.into_body(), 10 * 1024 * 1024).await.unwrap();
        assert!(body.starts_with(b"%PDF"));

        // Search by date
        let response = send(
            &state,
            request("GET", "/api/appointments?date=2026-03-14", Some(&token), None),
        )
        .await;
        let json = response_json(response).await;
        assert_eq!(json["appointments"].as_array().unwrap().len(), 1);

        // Update notes stamps the modification
        let response = send(
            &state,
            request(
                "PUT",
                &format!("/api/appointments/{id}/notes"),
                Some(&token),
                Some(json!({"notes": "Rescheduled by phone"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["notes"], "Rescheduled by phone");
        assert!(!json["modified_at"].is_null());

        // Delete
        let response = send(
            &state,
            request("DELETE", &format!("/api/appointments/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn appointment_rejects_bad_time() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/appointments",
                Some(&token),
                Some(json!({
                    "chart_number": "CH-0042",
                    "date": "2026-03-14",
                    "time": "half past ten",
                    "appointment_type": "PrenatalVisit",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nurse_cannot_book_appointments() {
        let (state, _tmp) = test_state();
        register(&state, "jsmith", "nurse-pw-1", "nurse").await;
        let token = login(&state, "jsmith", "nurse-pw-1").await;

        let response = send(&state, request("GET", "/api/appointments", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // ── Messaging ────────────────────────────────────────────

    #[tokio::test]
    async fn message_send_reply_and_inbox() {
        let (state, _tmp) = test_state();
        register(&state, "klessard", "s3cret-pw", "midwife").await;
        register(&state, "jsmith", "nurse-pw-1", "nurse").await;
        let alice = login(&state, "klessard", "s3cret-pw").await;
        let bob = login(&state, "jsmith", "nurse-pw-1").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/messages",
                Some(&alice),
                Some(json!({
                    "recipient": "jsmith",
                    "body": "On-call handover at 17:00",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let message = response_json(response).await;
        let first_id = message["id"].as_str().unwrap().to_string();

        // Recipient sees it unseen, plus a notification
        let response = send(
            &state,
            request("GET", "/api/messages/unseen-count", Some(&bob), None),
        )
        .await;
        assert_eq!(response_json(response).await["count"], 1);

        let response = send(&state, request("GET", "/api/notifications", Some(&bob), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["notifications"].as_array().unwrap().len(), 1);

        // Reply into the thread
        let response = send(
            &state,
            request(
                "POST",
                "/api/messages",
                Some(&bob),
                Some(json!({
                    "recipient": "klessard",
                    "body": "Got it",
                    "thread_id": first_id,
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            request(
                "GET",
                &format!("/api/messages/threads/{first_id}"),
                Some(&alice),
                None,
            ),
        )
        .await;
        let json = response_json(response).await;
        let thread = json["messages"].as_array().unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1]["body"], "Got it");

        // Mark seen clears the badge
        let response = send(
            &state,
            request("POST", "/api/messages/mark-seen", Some(&bob), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(
            &state,
            request("GET", "/api/messages/unseen-count", Some(&bob), None),
        )
        .await;
        assert_eq!(response_json(response).await["count"], 0);
    }

    #[tokio::test]
    async fn message_to_unknown_user_404s() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/messages",
                Some(&token),
                Some(json!({"recipient": "nobody", "body": "hello"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn outsider_cannot_read_a_thread() {
        let (state, _tmp) = test_state();
        register(&state, "klessard", "s3cret-pw", "midwife").await;
        register(&state, "jsmith", "nurse-pw-1", "nurse").await;
        register(&state, "evil", "outsider-1", "doctor").await;
        let alice = login(&state, "klessard", "s3cret-pw").await;
        let outsider = login(&state, "evil", "outsider-1").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/messages",
                Some(&alice),
                Some(json!({"recipient": "jsmith", "body": "private"})),
            ),
        )
        .await;
        let id = response_json(response).await["id"].as_str().unwrap().to_string();

        let response = send(
            &state,
            request("GET", &format!("/api/messages/threads/{id}"), Some(&outsider), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // ── Postnatal records ────────────────────────────────────

    #[tokio::test]
    async fn birth_and_postpartum_and_vaccination_forms() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/births",
                Some(&token),
                Some(json!({
                    "id": "00000000-0000-0000-0000-000000000000",
                    "chart_number": "CH-0042",
                    "birth_date": "2026-09-10",
                    "delivery_mode": "SpontaneousVaginal",
                    "birth_weight_grams": 3420.0,
                    "apgar_1min": 8,
                    "apgar_5min": 9,
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            request(
                "POST",
                "/api/postpartum",
                Some(&token),
                Some(json!({
                    "id": "00000000-0000-0000-0000-000000000000",
                    "chart_number": "CH-0042",
                    "visit_date": "2026-09-17",
                    "breastfeeding": "Exclusive",
                    "psychological_state": "Good",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            request(
                "POST",
                "/api/vaccinations",
                Some(&token),
                Some(json!({
                    "id": "00000000-0000-0000-0000-000000000000",
                    "chart_number": "CH-0042",
                    "date": "2026-10-01",
                    "vaccine_type": "Tdap",
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            request("GET", "/api/births?chart_number=CH-0042", Some(&token), None),
        )
        .await;
        let json = response_json(response).await;
        assert_eq!(json["records"].as_array().unwrap().len(), 1);
        assert_eq!(json["records"][0]["apgar_5min"], 9);
    }

    // ── Reports ──────────────────────────────────────────────

    #[tokio::test]
    async fn csv_export_contains_the_submitted_chart() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request("GET", "/api/reports/patients/csv", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Content-Type").unwrap(), "text/csv");
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("chart_number,"));
        assert!(text.contains("CH-0042"));
    }

    #[tokio::test]
    async fn pdf_export_is_a_pdf() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request("GET", "/api/reports/appointments/pdf", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 10 * 1024 * 1024).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn workbook_is_a_gzip_archive() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request("GET", "/api/reports/workbook", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/gzip"
        );
        let body = to_bytes(response.into_body(), 10 * 1024 * 1024).await.unwrap();
        assert_eq!(&body[..2], &[0x1f, 0x8b], "gzip magic");
    }

    #[tokio::test]
    async fn summary_reports_missing_counts() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;
        create_patient(&state, &token, "CH-0042").await;

        let response = send(
            &state,
            request("GET", "/api/reports/patients/summary", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["row_count"], 1);
        let columns = json["columns"].as_array().unwrap();
        let chart = columns
            .iter()
            .find(|c| c["column"] == "chart_number")
            .unwrap();
        assert_eq!(chart["count"], 1);
        assert_eq!(chart["missing"], 0);
    }

    #[tokio::test]
    async fn unknown_dataset_is_bad_request() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request("GET", "/api/reports/payroll/csv", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nurse_cannot_pull_reports() {
        let (state, _tmp) = test_state();
        register(&state, "jsmith", "nurse-pw-1", "nurse").await;
        let token = login(&state, "jsmith", "nurse-pw-1").await;

        let response = send(
            &state,
            request("GET", "/api/reports/patients/csv", Some(&token), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // ── User management ──────────────────────────────────────

    #[tokio::test]
    async fn admin_manages_accounts() {
        let (state, _tmp) = test_state();
        {
            let conn = state.open_db().unwrap();
            auth::ensure_default_admin(&conn, chrono::Local::now().naive_local()).unwrap();
        }
        register(&state, "jsmith", "nurse-pw-1", "nurse").await;
        let admin = login(&state, "admin", "change-me").await;

        // Filtered listing
        let response = send(
            &state,
            request("GET", "/api/users?role=nurse", Some(&admin), None),
        )
        .await;
        let json = response_json(response).await;
        let users = json["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        let id = users[0]["id"].as_str().unwrap().to_string();
        assert!(users[0].get("password_hash").is_none(), "hash never serialized");

        // Promote
        let response = send(
            &state,
            request(
                "PUT",
                &format!("/api/users/{id}/role"),
                Some(&admin),
                Some(json!({"role": "midwife"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // Export
        let response = send(&state, request("GET", "/api/users/export", Some(&admin), None)).await;
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("jsmith"));
        assert!(text.contains("midwife"));

        // Delete ends the account's sessions too
        let victim = login(&state, "jsmith", "nurse-pw-1").await;
        let response = send(
            &state,
            request("DELETE", &format!("/api/users/{id}"), Some(&admin), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&state, request("GET", "/api/health", Some(&victim), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_management_is_admin_only() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(&state, request("GET", "/api/users", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // ── Wizard ───────────────────────────────────────────────

    #[tokio::test]
    async fn wizard_navigation_over_the_api() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(&state, request("GET", "/api/wizard", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["step"], "Demographics");
        assert_eq!(json["position"], 1);
        assert_eq!(json["total"], 12);
        assert_eq!(json["is_first"], true);

        let response = send(&state, request("POST", "/api/wizard/next", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["step"], "Pregnancy");
        assert_eq!(json["position"], 2);

        // Save a draft, walk away, come back
        let response = send(
            &state,
            request(
                "PUT",
                "/api/wizard/draft",
                Some(&token),
                Some(json!({"data": {"weeks": 12}})),
            ),
        )
        .await;
        assert_eq!(response_json(response).await["has_draft"], true);

        send(&state, request("POST", "/api/wizard/next", Some(&token), None)).await;
        send(&state, request("POST", "/api/wizard/prev", Some(&token), None)).await;

        let response = send(&state, request("GET", "/api/wizard/draft", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["data"]["weeks"], 12);

        // Jump by name, then reset
        let response = send(
            &state,
            request(
                "POST",
                "/api/wizard/goto",
                Some(&token),
                Some(json!({"step": "postpartum"})),
            ),
        )
        .await;
        assert_eq!(response_json(response).await["position"], 11);

        let response = send(&state, request("POST", "/api/wizard/reset", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["position"], 1);
        assert_eq!(json["has_draft"], false);
    }

    #[tokio::test]
    async fn wizard_prev_clamps_at_the_first_step() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(&state, request("POST", "/api/wizard/prev", Some(&token), None)).await;
        let json = response_json(response).await;
        assert_eq!(json["position"], 1, "clamped, not an error");
    }

    #[tokio::test]
    async fn wizard_goto_unknown_step_is_bad_request() {
        let (state, _tmp) = test_state();
        let token = midwife_token(&state).await;

        let response = send(
            &state,
            request(
                "POST",
                "/api/wizard/goto",
                Some(&token),
                Some(json!({"step": "payroll"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ── Misc ─────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (state, _tmp) = test_state();
        let response = send(&state, request("GET", "/api/nonexistent", None, None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_token_is_401() {
        let (state, _tmp) = test_state();
        let response = send(
            &state,
            request("GET", "/api/patients", Some("not-a-token"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

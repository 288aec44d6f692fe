//! API router.
//!
//! Routes are nested under `/api/`. The public router serves the
//! directory, availability and login endpoints; everything else sits
//! behind the bearer-token middleware, which injects the verified
//! `Actor` for per-handler role and ownership checks.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the full API router.
pub fn api_router(ctx: ApiContext) -> Router {
    // Public routes — no credentials required
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register_patient))
        .route("/auth/patient/login", post(endpoints::auth::patient_login))
        .route("/auth/doctor/login", post(endpoints::auth::doctor_login))
        .route("/auth/admin/login", post(endpoints::auth::admin_login))
        .route("/doctors", get(endpoints::doctors::list))
        .route("/doctors/top", get(endpoints::doctors::top))
        .route("/specialities", get(endpoints::doctors::specialities))
        .route("/doctors/:id", get(endpoints::doctors::detail))
        .route("/doctors/:id/slots/:day", get(endpoints::doctors::day_slots))
        .with_state(ctx.clone());

    // Protected routes — bearer token required.
    //
    // Extension must be outermost so the auth middleware can extract
    // ApiContext; .with_state() converts Router<ApiContext> → Router<()>.
    // No path string may repeat a public one: layered routes cannot merge
    // method-by-method with unlayered ones.
    let protected = Router::new()
        .route("/admin/doctors", post(endpoints::doctors::add))
        .route("/doctors/:id/profile", put(endpoints::doctors::update))
        .route(
            "/doctors/:id/availability",
            put(endpoints::doctors::set_availability),
        )
        .route("/doctors/:id/stats", get(endpoints::doctors::stats))
        .route("/doctors/:id/patients", get(endpoints::doctors::patients))
        .route(
            "/doctors/:id/appointments",
            get(endpoints::doctors::appointments),
        )
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::add),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/patients/:id/appointments",
            get(endpoints::patients::appointments),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::book),
        )
        .route("/appointments/today", get(endpoints::appointments::today))
        .route(
            "/appointments/upcoming",
            get(endpoints::appointments::upcoming),
        )
        .route("/appointments/:id", get(endpoints::appointments::detail))
        .route(
            "/appointments/:id/status",
            put(endpoints::appointments::update_status),
        )
        .route(
            "/appointments/:id/cancel",
            put(endpoints::appointments::cancel),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", public)
        .nest("/api", protected)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::auth::{issue_token, Actor};

    const JWT_SECRET: &str = "router-test-secret";
    const ADMIN_EMAIL: &str = "admin@clinicdesk.local";
    const ADMIN_PASSWORD: &str = "admin-password";

    /// Context backed by a temp-file database so every request-scoped
    /// connection sees the same data. The tempdir guard must be kept
    /// alive for the duration of the test.
    fn test_ctx() -> (ApiContext, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("clinicdesk.db");
        // Run migrations once up front
        crate::db::open_database(&db_path).unwrap();
        let ctx = ApiContext::new(
            db_path,
            JWT_SECRET.into(),
            ADMIN_EMAIL.into(),
            ADMIN_PASSWORD.into(),
        );
        (ctx, tmp)
    }

    fn admin_token() -> String {
        issue_token(JWT_SECRET, &Actor::Admin).unwrap()
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>)
        -> Request<Body>
    {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(request(method, uri, token, body))
            .await
            .unwrap();
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Admin creates a doctor; returns its id.
    async fn create_doctor(app: &Router, email: &str) -> String {
        let (status, json) = send(
            app,
            "POST",
            "/api/admin/doctors",
            Some(&admin_token()),
            Some(serde_json::json!({
                "name": "Dr. Lee",
                "email": email,
                "password": "doctor-pass",
                "speciality": "GP",
                "degree": "MBBS",
                "experience_years": 8,
                "fee": 75.0,
                "about": "General practice"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["doctor"]["id"].as_str().unwrap().to_string()
    }

    /// Registers a patient; returns (id, token).
    async fn register_patient(app: &Router, email: &str) -> (String, String) {
        let (status, json) = send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Ada",
                "email": email,
                "password": "patient-pass"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        (
            json["patient"]["id"].as_str().unwrap().to_string(),
            json["token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (status, json) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_auth() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (status, json) = send(&app, "GET", "/api/appointments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (status, _) =
            send(&app, "GET", "/api/appointments", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_then_login() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        register_patient(&app, "ada@mail.test").await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/patient/login",
            None,
            Some(serde_json::json!({"email": "ada@mail.test", "password": "patient-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert!(!json["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        register_patient(&app, "ada@mail.test").await;
        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Ada Again",
                "email": "ada@mail.test",
                "password": "patient-pass"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Email already in use");
    }

    #[tokio::test]
    async fn wrong_password_gets_generic_message() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        register_patient(&app, "ada@mail.test").await;
        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/patient/login",
            None,
            Some(serde_json::json!({"email": "ada@mail.test", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Invalid email or password");

        // Unknown email: identical message
        let (_, json) = send(
            &app,
            "POST",
            "/api/auth/patient/login",
            None,
            Some(serde_json::json!({"email": "ghost@mail.test", "password": "wrong"})),
        )
        .await;
        assert_eq!(json["error"]["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn admin_login_with_configured_credentials() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/admin/login",
            None,
            Some(serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!json["token"].as_str().unwrap().is_empty());

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/admin/login",
            None,
            Some(serde_json::json!({"email": ADMIN_EMAIL, "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_admin_can_add_doctors() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (_, patient_token) = register_patient(&app, "ada@mail.test").await;
        let (status, json) = send(
            &app,
            "POST",
            "/api/admin/doctors",
            Some(&patient_token),
            Some(serde_json::json!({
                "name": "Dr. Fake",
                "email": "fake@clinic.test",
                "password": "doctor-pass",
                "speciality": "GP",
                "degree": "MBBS",
                "experience_years": 1,
                "fee": 10.0,
                "about": "?"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn directory_lists_created_doctor() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        create_doctor(&app, "lee@clinic.test").await;
        let (status, json) = send(&app, "GET", "/api/doctors?speciality=GP", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["doctors"].as_array().unwrap().len(), 1);
        assert_eq!(json["doctors"][0]["name"], "Dr. Lee");
        // The credential hash must never serialize
        assert!(json["doctors"][0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn slots_endpoint_partitions_the_catalog() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/doctors/{doctor_id}/slots/2030-06-10"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["available_slots"].as_array().unwrap().len(), 8);
        assert_eq!(json["booked_slots"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (_, patient_token) = register_patient(&app, "ada@mail.test").await;

        // Book
        let (status, json) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&patient_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "11:00 AM",
                "symptoms": "headache"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["appointment"]["status"], "pending");
        assert_eq!(json["appointment"]["doctor"]["name"], "Dr. Lee");
        let appointment_id = json["appointment"]["id"].as_str().unwrap().to_string();

        // Slot consumed
        let (_, json) = send(
            &app,
            "GET",
            &format!("/api/doctors/{doctor_id}/slots/2030-06-10"),
            None,
            None,
        )
        .await;
        assert!(json["booked_slots"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("11:00 AM")));

        // Second booking of the same slot conflicts
        let (_, other_token) = register_patient(&app, "bea@mail.test").await;
        let (status, json) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&other_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "11:00 AM"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "SLOT_CONFLICT");

        // Cancel, then the other patient can book it
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/cancel"),
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&other_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "11:00 AM"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unavailable_doctor_yields_explicit_error() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/doctors/{doctor_id}/availability"),
            Some(&admin_token()),
            Some(serde_json::json!({"available": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/doctors/{doctor_id}/slots/2030-06-10"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "DOCTOR_UNAVAILABLE");
    }

    #[tokio::test]
    async fn patient_cannot_cancel_someone_elses_appointment() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (_, ada_token) = register_patient(&app, "ada@mail.test").await;
        let (_, bea_token) = register_patient(&app, "bea@mail.test").await;

        let (_, json) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&ada_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "09:00 AM"
            })),
        )
        .await;
        let appointment_id = json["appointment"]["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/cancel"),
            Some(&bea_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            json["error"]["message"],
            "You are not authorized to cancel this appointment"
        );
    }

    #[tokio::test]
    async fn doctor_status_updates_respect_ownership() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let other_doctor_id = create_doctor(&app, "chen@clinic.test").await;
        let (_, patient_token) = register_patient(&app, "ada@mail.test").await;

        let (_, json) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&patient_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "09:00 AM"
            })),
        )
        .await;
        let appointment_id = json["appointment"]["id"].as_str().unwrap().to_string();

        // Log the other doctor in via the API
        let (_, json) = send(
            &app,
            "POST",
            "/api/auth/doctor/login",
            None,
            Some(serde_json::json!({"email": "chen@clinic.test", "password": "doctor-pass"})),
        )
        .await;
        let other_doctor_token = json["token"].as_str().unwrap().to_string();
        assert_eq!(json["doctor"]["id"], other_doctor_id);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/status"),
            Some(&other_doctor_token),
            Some(serde_json::json!({"status": "confirmed"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The owning doctor may confirm
        let (_, json) = send(
            &app,
            "POST",
            "/api/auth/doctor/login",
            None,
            Some(serde_json::json!({"email": "lee@clinic.test", "password": "doctor-pass"})),
        )
        .await;
        let owner_token = json["token"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/status"),
            Some(&owner_token),
            Some(serde_json::json!({"status": "confirmed", "notes": "bring reports"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["appointment"]["status"], "confirmed");
        assert_eq!(json["appointment"]["notes"], "bring reports");
    }

    #[tokio::test]
    async fn completed_appointment_is_terminal_over_http() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (_, patient_token) = register_patient(&app, "ada@mail.test").await;

        let (_, json) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&patient_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "09:00 AM"
            })),
        )
        .await;
        let appointment_id = json["appointment"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/status"),
            Some(&admin_token()),
            Some(serde_json::json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{appointment_id}/cancel"),
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "TERMINAL_STATUS");
    }

    #[tokio::test]
    async fn admin_listing_filters_and_paginates() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (patient_id, patient_token) = register_patient(&app, "ada@mail.test").await;

        for slot in ["09:00 AM", "10:00 AM", "11:00 AM"] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/appointments",
                Some(&patient_token),
                Some(serde_json::json!({
                    "doctor_id": doctor_id,
                    "date": "2030-06-10",
                    "slot": slot
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/appointments?patient_id={patient_id}&status=pending"),
            Some(&admin_token()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["page"], 1);
        assert_eq!(json["appointments"].as_array().unwrap().len(), 3);

        // Patients cannot use the admin listing
        let (status, _) = send(
            &app,
            "GET",
            "/api/appointments",
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patient_profile_ownership() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (ada_id, ada_token) = register_patient(&app, "ada@mail.test").await;
        let (_, bea_token) = register_patient(&app, "bea@mail.test").await;

        // Bea cannot read Ada's profile
        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/patients/{ada_id}"),
            Some(&bea_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Ada updates her own phone
        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/patients/{ada_id}"),
            Some(&ada_token),
            Some(serde_json::json!({"phone": "5550123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["patient"]["phone"], "5550123");

        // Admin deletes the account
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/patients/{ada_id}"),
            Some(&admin_token()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/patients/{ada_id}"),
            Some(&admin_token()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn doctor_stats_shape() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let doctor_id = create_doctor(&app, "lee@clinic.test").await;
        let (_, patient_token) = register_patient(&app, "ada@mail.test").await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(&patient_token),
            Some(serde_json::json!({
                "doctor_id": doctor_id,
                "date": "2030-06-10",
                "slot": "09:00 AM"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/doctors/{doctor_id}/stats"),
            Some(&admin_token()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stats"]["counts"]["total"], 1);
        assert_eq!(json["stats"]["counts"]["pending"], 1);
        assert!(json["stats"]["today"].is_array());
        assert!(json["stats"]["upcoming"].is_array());
    }
}

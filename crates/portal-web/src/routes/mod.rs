//! Route handlers for the portal HTTP interface.

pub mod active;
pub mod catalog;
pub mod health;
pub mod library;
pub mod profile;
pub mod programs;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Profile
        .route(
            "/api/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        // Catalog
        .route(
            "/api/exercises",
            get(catalog::list_exercises).post(catalog::create_exercise),
        )
        .route("/api/exercises/:id", delete(catalog::delete_exercise))
        .route("/api/sets", get(catalog::list_sets).post(catalog::create_set))
        .route("/api/sets/:id", delete(catalog::delete_set))
        .route(
            "/api/daily-routines",
            get(catalog::list_daily_routines).post(catalog::create_daily_routine),
        )
        .route(
            "/api/daily-routines/:id",
            delete(catalog::delete_daily_routine),
        )
        .route("/api/library/events", get(library::events))
        // Programs
        .route(
            "/api/programs",
            get(programs::list_programs).post(programs::create_program),
        )
        .route(
            "/api/programs/:id",
            get(programs::get_program).delete(programs::delete_program),
        )
        .route("/api/programs/:id/start", post(programs::start_program))
        // Active program
        .route("/api/active-program", get(active::get_active))
        .route("/api/active-program/goals", put(active::set_goals))
        .route("/api/active-program/abandon", post(active::abandon))
        .route("/api/active-program/end", post(active::end))
        .route("/api/completed-programs", get(active::completed_programs))
        .route("/api/completed-programs/:id", get(active::completed_program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use database::Database;
    use portal::{Identity, MemoryBlobStore, Portal, StaticTokenAuth};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const TOKEN: &str = "secret-token";

    async fn app() -> Router {
        let db = Database::in_memory().await.unwrap();
        let portal = Portal::new(db.clone(), Arc::new(MemoryBlobStore::new()));
        let auth = StaticTokenAuth::new().with_token(
            TOKEN,
            Identity::new("user-1")
                .with_display_name("Dana")
                .with_email("dana@example.com"),
        );
        router().with_state(AppState::new(db, portal, Arc::new(auth)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed_program(app: &Router) -> String {
        let (status, exercise) = send(
            app,
            Method::POST,
            "/api/exercises",
            Some(TOKEN),
            Some(json!({
                "name": "Squat",
                "body_parts": ["Quads", "Glutes"],
                "measurements": { "reps": true },
                "weight": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{exercise}");

        let (status, set) = send(
            app,
            Method::POST,
            "/api/sets",
            Some(TOKEN),
            Some(json!({ "name": "Legs", "exercises": [exercise["id"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{set}");

        let (status, routine) = send(
            app,
            Method::POST,
            "/api/daily-routines",
            Some(TOKEN),
            Some(json!({ "name": "Leg Day", "routine_type": "Lower Body", "sets": [set["id"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{routine}");

        let (status, program) = send(
            app,
            Method::POST,
            "/api/programs",
            Some(TOKEN),
            Some(json!({
                "name": "Strong Legs",
                "total_weeks": 2,
                "total_phases": 1,
                "phases": [{
                    "name": "Base",
                    "weeks": [1, 2],
                    "weekly_template": { "days": [null, routine["id"], null, null, null, null, null] }
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{program}");
        assert_eq!(program["daily_routines"].as_array().unwrap().len(), 1);
        assert_eq!(program["exercises"][0]["name"], "Squat");

        program["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "You must be signed in.");

        let (status, _) = send(&app, Method::GET, "/api/programs", Some("wrong"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_created_then_patched() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/profile", Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], true);
        assert_eq!(body["profile"]["full_name"], "Dana");

        let (_, body) = send(&app, Method::GET, "/api/profile", Some(TOKEN), None).await;
        assert_eq!(body["created"], false);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/profile",
            Some(TOKEN),
            Some(json!({ "phone": "555-0100", "height": 70.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phone"], "555-0100");
        assert_eq!(body["email"], "dana@example.com");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/profile",
            Some(TOKEN),
            Some(json!({ "email": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_patch_on_first_visit_creates_profile() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/profile",
            Some(TOKEN),
            Some(json!({ "gender": "female" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gender"], "female");
        assert_eq!(body["full_name"], "Dana");

        let (_, body) = send(&app, Method::GET, "/api/profile", Some(TOKEN), None).await;
        assert_eq!(body["created"], false);
        assert_eq!(body["profile"]["gender"], "female");
    }

    #[tokio::test]
    async fn test_program_validation_errors() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/programs",
            Some(TOKEN),
            Some(json!({
                "name": "Untitled",
                "total_weeks": 4,
                "total_phases": 1,
                "phases": [{ "name": " ", "weeks": [1], "weekly_template": { "days": [null, null, null, null, null, null, null] } }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Phase 1 is missing a name.");

        let (status, body) = send(&app, Method::GET, "/api/programs/missing", Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Workout Program not found.");
    }

    #[tokio::test]
    async fn test_active_program_lifecycle() {
        let app = app().await;
        let program_id = seed_program(&app).await;
        let start = format!("/api/programs/{program_id}/start");

        let (status, active) = send(&app, Method::POST, &start, Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::POST, &start, Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");

        let (_, view) = send(&app, Method::GET, "/api/active-program", Some(TOKEN), None).await;
        assert_eq!(view["has_goals"], false);
        assert_eq!(view["first_workout"]["weekday"], "Mon");
        assert_eq!(view["first_workout"]["sets"][0]["exercises"][0], "Squat");

        let goals = json!({
            "current_weight": 180.0,
            "current_body_fat": 20.0,
            "body_measurements": {
                "biceps": 10.0, "triceps": 10.0, "chest": 10.0, "waist": 10.0,
                "hips": 10.0, "thighs": 10.0, "calves": 10.0
            },
            "achievement_goals": "lose fat",
            "consistency_goals": { "percentage_complete": 80, "days_per_week": 4 }
        });

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/active-program/goals",
            Some(TOKEN),
            Some(json!({ "goals": goals, "photo": { "filename": "front.jpg", "data": "not base64!" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/active-program/goals",
            Some(TOKEN),
            Some(json!({ "goals": goals, "photo": { "filename": "front.jpg", "data": "anBlZw==" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{updated}");
        assert_eq!(
            updated["photo_url"],
            format!("memory://program_photos/user-1/{}/front.jpg", active["id"].as_str().unwrap())
        );

        let (_, view) = send(&app, Method::GET, "/api/active-program", Some(TOKEN), None).await;
        assert_eq!(view["has_goals"], true);

        let (status, completed) =
            send(&app, Method::POST, "/api/active-program/end", Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed["program_id"], program_id.as_str());

        let (_, view) = send(&app, Method::GET, "/api/active-program", Some(TOKEN), None).await;
        assert_eq!(view, Value::Null);

        let (_, archive) = send(&app, Method::GET, "/api/completed-programs", Some(TOKEN), None).await;
        assert_eq!(archive.as_array().unwrap().len(), 1);

        let uri = format!("/api/completed-programs/{}", completed["id"].as_str().unwrap());
        let (status, archived) = send(&app, Method::GET, &uri, Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(archived, completed);

        let (status, _) =
            send(&app, Method::GET, "/api/completed-programs/missing", Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::POST, "/api/active-program/abandon", Some(TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_library_events_stream() {
        let app = app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/library/events")
                    .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }
}

use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::Json,
    state::AppState,
    users::{
        dto::{CreateUserRequest, MessageResponse, UpdateUserRequest},
        password::hash_password,
        repo_types::User,
        validation::validate_create,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Ids arrive as raw path segments; one that doesn't parse is a server error,
/// same as any other failed lookup.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    let id = Uuid::parse_str(raw).with_context(|| format!("malformed user id {raw:?}"))?;
    Ok(id)
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list().await?;
    if users.is_empty() {
        return Err(ApiError::Empty);
    }
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    let user = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    if let Err(errors) = validate_create(&payload) {
        warn!(count = errors.len(), "create user rejected by validation");
        return Err(ApiError::Validation(errors));
    }

    let email = payload.email.as_deref().unwrap_or_default();
    if state.store.find_by_email(email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::AlreadyExists);
    }

    let hash = hash_password(payload.password.as_deref().unwrap_or_default())?;
    let user = state.store.insert(payload.into_new_user(hash)).await?;

    info!(user_id = %user.id, "user created");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .update(id, payload.into())
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let user = state.store.delete(id).await?.ok_or(ApiError::NotFound)?;

    info!(user_id = %user.id, "user deleted");
    Ok(Json(MessageResponse {
        msg: format!("User with ID:  {} is deleted", user.id),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{app::build_app, state::AppState, users::password::verify_password};

    use super::*;

    fn server() -> TestServer {
        TestServer::new(build_app(AppState::fake())).expect("test server")
    }

    async fn create(server: &TestServer, body: Value) -> User {
        let response = server.post("/api/user").json(&body).await;
        response.assert_status_ok();
        response.json::<User>()
    }

    fn ada() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "lovelace",
            "number": 1815
        })
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let server = server();
        let created = create(&server, ada()).await;

        let response = server.get(&format!("/api/user/{}", created.id)).await;
        response.assert_status_ok();
        let fetched = response.json::<User>();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name.as_deref(), Some("Ada"));
        assert_eq!(fetched.email.as_deref(), Some("ada@example.com"));
        assert_eq!(fetched.number, Some(1815.0));

        let hash = fetched.password.expect("hash stored");
        assert_ne!(hash, "lovelace");
        assert!(verify_password("lovelace", &hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let server = server();
        create(&server, ada()).await;

        let response = server.post("/api/user").json(&ada()).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "errors": [{ "msg": "User already exists" }] }));

        let users = server.get("/api/user").await.json::<Vec<User>>();
        let same_email = users
            .iter()
            .filter(|u| u.email.as_deref() == Some("ada@example.com"))
            .count();
        assert_eq!(same_email, 1);
    }

    #[tokio::test]
    async fn short_password_fails_validation() {
        let server = server();
        let response = server
            .post("/api/user")
            .json(&json!({ "name": "Bob", "email": "bob@example.com", "password": "12345" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        let errors = body["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["param"], "password");
        assert!(errors[0]["msg"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn empty_body_lists_every_violation() {
        let server = server();
        let response = server.post("/api/user").json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        let params: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["param"].as_str().unwrap())
            .collect();
        assert_eq!(params, vec!["name", "email", "password"]);
    }

    #[tokio::test]
    async fn update_missing_user_is_bad_request() {
        let server = server();
        let response = server
            .put(&format!("/api/user/{}", Uuid::new_v4()))
            .json(&json!({ "name": "Nobody" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "errors": [{ "msg": "User do not exists" }] }));
    }

    #[tokio::test]
    async fn update_missing_user_with_taken_email_is_not_found() {
        let server = server();
        create(&server, ada()).await;

        let response = server
            .put(&format!("/api/user/{}", Uuid::new_v4()))
            .json(&json!({ "email": "ada@example.com" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "errors": [{ "msg": "User do not exists" }] }));
    }

    #[tokio::test]
    async fn non_json_body_reads_as_empty_object() {
        let server = server();
        let response = server.post("/api/user").text("name=Ada").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let server = server();
        let response = server
            .post("/api/user")
            .text("{\"name\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["errors"][0]["msg"].is_string());
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_server_error() {
        let server = server();
        let response = server
            .post("/api/user")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "lovelace",
                "number": "forty-two"
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "Server error");
    }

    #[tokio::test]
    async fn validation_entries_echo_submitted_value() {
        let server = server();
        let response = server
            .post("/api/user")
            .json(&json!({ "name": "Bob", "email": "", "password": "abc" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "errors": [
            { "value": "", "msg": "email is required", "param": "email", "location": "body" },
            { "value": "abc", "msg": "password is required", "param": "password", "location": "body" }
        ] }));
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let server = server();
        let created = create(&server, ada()).await;

        let response = server
            .put(&format!("/api/user/{}", created.id))
            .json(&json!({ "number": 1852, "password": "ignored-here" }))
            .await;
        response.assert_status_ok();
        let updated = response.json::<User>();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.number, Some(1852.0));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.password, created.password);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_to_taken_email_is_conflict() {
        let server = server();
        create(&server, ada()).await;
        let grace = create(
            &server,
            json!({ "name": "Grace", "email": "grace@example.com", "password": "hopper" }),
        )
        .await;

        let response = server
            .put(&format!("/api/user/{}", grace.id))
            .json(&json!({ "email": "ada@example.com" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "errors": [{ "msg": "User already exists" }] }));
    }

    #[tokio::test]
    async fn delete_then_get_is_bad_request() {
        let server = server();
        let created = create(&server, ada()).await;
        let path = format!("/api/user/{}", created.id);

        let response = server.delete(&path).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "msg": format!("User with ID:  {} is deleted", created.id) }));

        server.get(&path).await.assert_status(StatusCode::BAD_REQUEST);
        server.delete(&path).await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_is_bad_request_until_a_user_exists() {
        let server = server();

        let response = server.get("/api/user").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "msg": "No User is present in the database" }));

        let created = create(&server, ada()).await;
        let response = server.get("/api/user").await;
        response.assert_status_ok();
        let users = response.json::<Vec<User>>();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, created.id);
    }

    #[tokio::test]
    async fn malformed_id_is_server_error() {
        let server = server();
        let response = server.get("/api/user/not-a-uuid").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "Server error");
    }
}

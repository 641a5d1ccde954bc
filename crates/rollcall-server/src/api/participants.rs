//! Participant directory API endpoints.
//!
//! A flat directory used by event forms to pick attendees. The per-event
//! check-in projection lives on the event's own participant entries, not
//! here.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use rollcall_core::{is_valid_email, Participant, ParticipantRole};

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Creates the participants router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(list_participants).post(create_participant))
}

/// Request body for adding a participant to the directory.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "Emily Johnson",
    "email": "emily.johnson@example.com",
    "role": "agent"
}))]
pub struct NewParticipantRequest {
    /// Caller-supplied id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Role; defaults to `other`.
    #[serde(default = "default_role")]
    pub role: ParticipantRole,
}

fn default_role() -> ParticipantRole {
    ParticipantRole::Other
}

/// List the participant directory.
#[utoipa::path(
    get,
    path = "/participants",
    tag = "participants",
    operation_id = "listParticipants",
    summary = "List the participant directory",
    responses(
        (status = 200, description = "All directory participants", body = [Participant])
    )
)]
pub async fn list_participants(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<Participant>>> {
    Ok(Json(state.store.list_participants().await?))
}

/// Add a participant to the directory.
#[utoipa::path(
    post,
    path = "/participants",
    tag = "participants",
    operation_id = "createParticipant",
    summary = "Add a participant",
    request_body = NewParticipantRequest,
    responses(
        (status = 201, description = "Participant created", body = Participant),
        (status = 400, description = "Malformed email")
    )
)]
pub async fn create_participant(
    State(state): State<SharedState>,
    Json(request): Json<NewParticipantRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Participant>)> {
    if !is_valid_email(&request.email) {
        return Err(ApiError::BadRequest {
            error_code: "invalid_email".to_string(),
            message: format!("Invalid email address: '{}'", request.email),
        });
    }

    let id = request
        .id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let participant = state
        .store
        .create_participant(Participant::new(
            &id,
            &request.name,
            &request.email,
            request.role,
        ))
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(participant)))
}

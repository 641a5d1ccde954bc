//! Property directory API endpoints.
//!
//! Properties carry the coordinates used to range-check check-ins on events
//! that link to them.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use rollcall_core::{Coordinates, Property};

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Creates the properties router.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/{id}", get(get_property))
}

/// Request body for adding a property to the directory.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "address": "123 Main Street",
    "city": "Los Angeles",
    "state": "CA",
    "zip_code": "90001",
    "price": 1250000,
    "property_type": "Single Family Home",
    "coordinates": { "lat": 34.052235, "lng": -118.243683 }
}))]
pub struct NewPropertyRequest {
    /// Caller-supplied id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip_code: String,
    /// Listing price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Free-text property type.
    #[serde(default)]
    pub property_type: Option<String>,
    /// Geographic position.
    pub coordinates: Coordinates,
}

/// List the property directory.
#[utoipa::path(
    get,
    path = "/properties",
    tag = "properties",
    operation_id = "listProperties",
    summary = "List the property directory",
    responses(
        (status = 200, description = "All directory properties", body = [Property])
    )
)]
pub async fn list_properties(State(state): State<SharedState>) -> ApiResult<Json<Vec<Property>>> {
    Ok(Json(state.store.list_properties().await?))
}

/// Get a property by id.
#[utoipa::path(
    get,
    path = "/properties/{id}",
    tag = "properties",
    operation_id = "getProperty",
    summary = "Get a property",
    params(("id" = String, Path, description = "Property id")),
    responses(
        (status = 200, description = "The property", body = Property),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Property>> {
    let property = state
        .store
        .get_property(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            error_code: "property_not_found".to_string(),
            message: format!("Property not found: {id}"),
        })?;
    Ok(Json(property))
}

/// Add a property to the directory.
#[utoipa::path(
    post,
    path = "/properties",
    tag = "properties",
    operation_id = "createProperty",
    summary = "Add a property",
    request_body = NewPropertyRequest,
    responses(
        (status = 201, description = "Property created", body = Property)
    )
)]
pub async fn create_property(
    State(state): State<SharedState>,
    Json(request): Json<NewPropertyRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Property>)> {
    let property = Property {
        id: request.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        address: request.address,
        city: request.city,
        state: request.state,
        zip_code: request.zip_code,
        price: request.price,
        property_type: request.property_type,
        coordinates: request.coordinates,
    };
    let property = state.store.create_property(property).await?;
    Ok((axum::http::StatusCode::CREATED, Json(property)))
}

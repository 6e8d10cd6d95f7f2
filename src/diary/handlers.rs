use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AddEntryRequest, DayView, GoalsInput, UpdateEntryRequest, WaterRequest, WaterResponse,
};
use super::services;
use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::ApiJson,
    nutrition::{model::iso_date, LoggedFoodEntry, NutritionGoals},
    state::AppState,
};

pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/diary/:date", get(get_day))
        .route("/diary/:date/meals/:meal_id/entries", post(add_entry))
        .route(
            "/diary/:date/meals/:meal_id/entries/:entry_id",
            patch(update_entry).delete(remove_entry),
        )
        .route("/diary/:date/water", post(add_water).put(set_water))
        .route("/meals/:meal_id", delete(delete_meal))
}

pub fn goals_routes() -> Router<AppState> {
    Router::new().route("/goals", get(get_goals).put(put_goals))
}

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    iso_date::parse(raw)
        .map_err(|_| ApiError::BadRequest(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayView>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(services::load_day(&state, user_id, date).await?))
}

#[instrument(skip(state, body))]
pub async fn add_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal_id)): Path<(String, Uuid)>,
    ApiJson(body): ApiJson<AddEntryRequest>,
) -> Result<(StatusCode, Json<LoggedFoodEntry>), ApiError> {
    let date = parse_date(&date)?;
    let quantity = body.quantity.resolve()?;
    let entry =
        services::add_entry(&state, user_id, date, meal_id, body.food_id, quantity).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal_id, entry_id)): Path<(String, Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateEntryRequest>,
) -> Result<Json<LoggedFoodEntry>, ApiError> {
    let date = parse_date(&date)?;
    let quantity = body.quantity.resolve()?;
    let entry =
        services::update_entry_quantity(&state, user_id, date, meal_id, entry_id, quantity)
            .await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal_id, entry_id)): Path<(String, Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date(&date)?;
    services::remove_entry(&state, user_id, date, meal_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete_meal(&state, user_id, meal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST adds to the day's total (the "+200 ml" buttons).
#[instrument(skip(state))]
pub async fn add_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    ApiJson(body): ApiJson<WaterRequest>,
) -> Result<Json<WaterResponse>, ApiError> {
    let date = parse_date(&date)?;
    let amount = services::add_water(&state, user_id, date, body.amount).await?;
    Ok(Json(WaterResponse { date, amount }))
}

#[instrument(skip(state))]
pub async fn set_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    ApiJson(body): ApiJson<WaterRequest>,
) -> Result<Json<WaterResponse>, ApiError> {
    let date = parse_date(&date)?;
    let amount = services::set_water(&state, user_id, date, body.amount).await?;
    Ok(Json(WaterResponse { date, amount }))
}

#[instrument(skip(state))]
pub async fn get_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<NutritionGoals>, ApiError> {
    Ok(Json(services::current_goals(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn put_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<GoalsInput>,
) -> Result<Json<NutritionGoals>, ApiError> {
    Ok(Json(services::update_goals(&state, user_id, body).await?))
}

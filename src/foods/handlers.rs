use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::SearchQuery;
use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::ApiJson,
    nutrition::{FoodRecord, NewFoodRecord},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(search_foods).post(create_custom_food))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<SearchQuery>,
) -> Result<Json<Vec<FoodRecord>>, ApiError> {
    let foods = state.foods.search(user_id, &p.q).await?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodRecord>, ApiError> {
    state
        .foods
        .get_by_id(user_id, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("food"))
}

/// Adds a user-defined food. Existing records are never edited in place.
#[instrument(skip(state, body))]
pub async fn create_custom_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<NewFoodRecord>,
) -> Result<(StatusCode, Json<FoodRecord>), ApiError> {
    body.validate().map_err(ApiError::BadRequest)?;
    let food = state.foods.create_custom(user_id, body).await?;
    info!(%user_id, food_id = %food.id, name = %food.name, "custom food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;
    use crate::auth::JwtKeys;

    async fn send(
        state: &AppState,
        user_id: Uuid,
        req: axum::http::request::Builder,
        body: Body,
    ) -> (StatusCode, Value) {
        let token = JwtKeys::from(&state.config.jwt)
            .sign(user_id, time::Duration::minutes(5))
            .unwrap();
        let req = req
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn custom_food_is_searchable_by_its_owner() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let (status, created) = send(
            &state,
            user,
            Request::builder().method(Method::POST).uri("/api/v1/foods"),
            Body::from(
                json!({
                    "name": "Greek yogurt",
                    "calories_per_100": 97,
                    "protein_per_100": 9,
                    "carbs_per_100": 3.6,
                    "fats_per_100": 5
                })
                .to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["is_custom"], true);

        let (_, found) = send(
            &state,
            user,
            Request::builder().uri("/api/v1/foods?q=yogurt"),
            Body::empty(),
        )
        .await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (_, hidden) = send(
            &state,
            Uuid::new_v4(),
            Request::builder().uri("/api/v1/foods?q=yogurt"),
            Body::empty(),
        )
        .await;
        assert!(hidden.as_array().unwrap().is_empty());

        let uri = format!("/api/v1/foods/{}", created["id"].as_str().unwrap());
        let (status, fetched) =
            send(&state, user, Request::builder().uri(uri), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let uri = format!("/api/v1/foods/{}", created["id"].as_str().unwrap());
        let (status, _) =
            send(&state, Uuid::new_v4(), Request::builder().uri(uri), Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn negative_nutrients_are_rejected() {
        let state = AppState::fake();
        let (status, _) = send(
            &state,
            Uuid::new_v4(),
            Request::builder().method(Method::POST).uri("/api/v1/foods"),
            Body::from(
                json!({
                    "name": "Broken",
                    "calories_per_100": -1,
                    "protein_per_100": 0,
                    "carbs_per_100": 0,
                    "fats_per_100": 0
                })
                .to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_query_lists_catalog() {
        let state = AppState::fake();
        let (status, foods) = send(
            &state,
            Uuid::new_v4(),
            Request::builder().uri("/api/v1/foods"),
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(foods.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn unknown_food_is_not_found() {
        let state = AppState::fake();
        let uri = format!("/api/v1/foods/{}", Uuid::new_v4());
        let (status, _) =
            send(&state, Uuid::new_v4(), Request::builder().uri(uri), Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{GetMealQuery, GetMealResponse};
use crate::{errors::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/menus/getMeal", get(get_meal))
}

/// GET /menus/getMeal?user_id=...
#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Query(q): Query<GetMealQuery>,
) -> Result<Json<GetMealResponse>, AppError> {
    let user_id = q
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("user_id", "missing user_id parameter"))?;

    // cancelled on server shutdown, and when this future is dropped with the connection
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let (meal, shopping_list) = state.scheduler.get_meal(user_id, &cancel).await?;
    info!(%user_id, meal_id = %meal.meal_id, "next meal served");
    Ok(Json(GetMealResponse {
        meal,
        shopping_list,
    }))
}

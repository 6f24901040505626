use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::repo_types::FoodProduct;
use super::services::{available_products, place_product};
use crate::{errors::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/products", get(get_products).post(post_product))
}

#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<FoodProduct>>, AppError> {
    let products = available_products(state.products.as_ref()).await?;
    Ok(Json(products))
}

#[instrument(skip(state, product), fields(name = %product.name))]
pub async fn post_product(
    State(state): State<AppState>,
    Json(product): Json<FoodProduct>,
) -> Result<(StatusCode, String), AppError> {
    let id = place_product(state.products.as_ref(), product).await?;
    Ok((StatusCode::CREATED, format!("Product placed with ID: {}", id)))
}

#[cfg(test)]
mod product_handler_tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn product_json(id: &str, weight: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Test Product 1",
            "weight_per_pkg": weight,
            "amount": 1,
            "price_per_pkg": 9.99,
            "expiration_date": "2030-01-01T00:00:00Z",
            "present_in_fridge": true,
            "nutritional_value_relative": {
                "proteins": 10, "fats": 20, "carbohydrates": 30, "calories": 400
            }
        })
    }

    fn post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/products")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_then_get_round_trips_through_the_store() {
        let app = routes().with_state(AppState::fake());

        let res = app.clone().oneshot(post(product_json("test-id-1", 100))).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let text = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&text[..], b"Product placed with ID: test-id-1");

        let res = app
            .oneshot(Request::get("/products").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let listed: Vec<FoodProduct> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "test-id-1");
        assert_eq!(listed[0].nutritional_value_relative.calories, 400);
    }

    #[tokio::test]
    async fn zero_weight_is_rejected() {
        let app = routes().with_state(AppState::fake());
        let res = app.oneshot(post(product_json("p", 0))).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = routes().with_state(AppState::fake());
        let res = app.oneshot(post(json!({"name": "no weight"}))).await.unwrap();
        assert!(res.status().is_client_error());
    }
}

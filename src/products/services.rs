use tracing::info;
use uuid::Uuid;

use super::repo::ProductStore;
use super::repo_types::FoodProduct;
use crate::errors::AppError;

pub async fn available_products(store: &dyn ProductStore) -> Result<Vec<FoodProduct>, AppError> {
    store.load_products().await
}

/// Validates and stores a product; a blank id gets a fresh UUID.
pub async fn place_product(
    store: &dyn ProductStore,
    mut product: FoodProduct,
) -> Result<String, AppError> {
    if product.weight_per_pkg == 0 {
        return Err(AppError::validation(
            "weight_per_pkg",
            "must be greater than zero",
        ));
    }
    product.id = product.id.trim().to_owned();
    if product.id.is_empty() {
        product.id = Uuid::new_v4().to_string();
    }

    let id = store.save_product(&product).await?;
    info!(product_id = %id, name = %product.name, "product placed");
    Ok(id)
}

use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{FoodProduct, FoodProductRow};
use crate::errors::AppError;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn load_products(&self) -> Result<Vec<FoodProduct>, AppError>;
    /// Inserts the product and returns its id.
    async fn save_product(&self, product: &FoodProduct) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn load_products(&self) -> Result<Vec<FoodProduct>, AppError> {
        let rows = sqlx::query_as::<_, FoodProductRow>(
            r#"
            SELECT id, name, weight_per_pkg, amount, price_per_pkg, expiration_date,
                   present_in_fridge, protein_relative, fat_relative,
                   carbohydrates_relative, calories_relative
              FROM food_products
             ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::io("load_products", "", e))?;

        rows.into_iter()
            .map(FoodProduct::try_from)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| AppError::io("load_products.convert", "", e))
    }

    async fn save_product(&self, p: &FoodProduct) -> Result<String, AppError> {
        let n = &p.nutritional_value_relative;
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO food_products (
                id, name, weight_per_pkg, amount, price_per_pkg, expiration_date,
                present_in_fridge, protein_relative, fat_relative,
                carbohydrates_relative, calories_relative
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&p.id)
        .bind(&p.name)
        .bind(i64::from(p.weight_per_pkg))
        .bind(i64::from(p.amount))
        .bind(f64::from(p.price_per_pkg))
        .bind(p.expiration_date)
        .bind(p.present_in_fridge)
        .bind(i64::from(n.proteins))
        .bind(i64::from(n.fats))
        .bind(i64::from(n.carbohydrates))
        .bind(i64::from(n.calories))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::io("save_product", p.id.as_str(), e))?;
        Ok(id)
    }
}

/// Product stock held in process memory.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryProductStore {
    products: std::sync::RwLock<std::collections::HashMap<String, FoodProduct>>,
}

#[cfg(test)]
#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn load_products(&self) -> Result<Vec<FoodProduct>, AppError> {
        let guard = self
            .products
            .read()
            .map_err(|e| AppError::io("load_products", "", anyhow::anyhow!(e.to_string())))?;
        let mut products: Vec<FoodProduct> = guard.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    async fn save_product(&self, product: &FoodProduct) -> Result<String, AppError> {
        let mut guard = self.products.write().map_err(|e| {
            AppError::io("save_product", product.id.as_str(), anyhow::anyhow!(e.to_string()))
        })?;
        guard.insert(product.id.clone(), product.clone());
        Ok(product.id.clone())
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::models::NutritionalValueRelative;

/// A product kept in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProduct {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub weight_per_pkg: u32,
    pub amount: u32,
    pub price_per_pkg: f32,
    #[serde(with = "time::serde::rfc3339")]
    pub expiration_date: OffsetDateTime,
    pub present_in_fridge: bool,
    pub nutritional_value_relative: NutritionalValueRelative,
}

/// `food_products` row; every column is nullable in the legacy schema.
#[derive(Debug, FromRow)]
pub struct FoodProductRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub weight_per_pkg: Option<i64>,
    pub amount: Option<i64>,
    pub price_per_pkg: Option<f64>,
    pub expiration_date: Option<OffsetDateTime>,
    pub present_in_fridge: Option<bool>,
    pub protein_relative: Option<i64>,
    pub fat_relative: Option<i64>,
    pub carbohydrates_relative: Option<i64>,
    pub calories_relative: Option<i64>,
}

fn to_u32(v: i64, field: &str) -> anyhow::Result<u32> {
    u32::try_from(v).map_err(|_| anyhow::anyhow!("invalid {}: {}", field, v))
}

impl TryFrom<FoodProductRow> for FoodProduct {
    type Error = anyhow::Error;

    fn try_from(r: FoodProductRow) -> Result<Self, Self::Error> {
        let id = r.id.ok_or_else(|| anyhow::anyhow!("invalid id"))?;
        let weight_per_pkg = match r.weight_per_pkg {
            Some(w) if w > 0 => to_u32(w, "weight_per_pkg")?,
            _ => anyhow::bail!("invalid weight_per_pkg for product {}", id),
        };
        let amount = to_u32(
            r.amount
                .ok_or_else(|| anyhow::anyhow!("invalid amount for product {}", id))?,
            "amount",
        )?;
        let price_per_pkg = r
            .price_per_pkg
            .ok_or_else(|| anyhow::anyhow!("invalid price_per_pkg for product {}", id))?;
        let expiration_date = r
            .expiration_date
            .ok_or_else(|| anyhow::anyhow!("invalid expiration_date for product {}", id))?;
        let present_in_fridge = r
            .present_in_fridge
            .ok_or_else(|| anyhow::anyhow!("invalid present_in_fridge for product {}", id))?;

        let (Some(p), Some(f), Some(c)) =
            (r.protein_relative, r.fat_relative, r.carbohydrates_relative)
        else {
            anyhow::bail!("invalid nutritional_value_relative for product {}", id);
        };

        Ok(Self {
            name: r.name.unwrap_or_default(),
            weight_per_pkg,
            amount,
            price_per_pkg: price_per_pkg as f32,
            expiration_date,
            present_in_fridge,
            nutritional_value_relative: NutritionalValueRelative {
                proteins: to_u32(p, "protein_relative")?,
                fats: to_u32(f, "fat_relative")?,
                carbohydrates: to_u32(c, "carbohydrates_relative")?,
                calories: to_u32(r.calories_relative.unwrap_or(0), "calories_relative")?,
            },
            id,
        })
    }
}

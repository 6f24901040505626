use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::repo_types::{DishRow, MealDetail, MealType, ScheduleEntry, ScheduleRow};
use crate::errors::AppError;

/// Persistence of schedules and meal detail.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Every schedule entry of the user. Unknown users yield `NotFound`, a known user
    /// without planned meals yields an empty list.
    async fn load_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, AppError>;

    async fn load_meal_detail(&self, meal_id: &str) -> Result<MealDetail, AppError>;

    /// Rewrites the timestamps of all given entries in a single all-or-nothing update.
    async fn update_schedule(&self, user_id: &str, entries: &[ScheduleEntry])
        -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgScheduleStore {
    db: PgPool,
}

impl PgScheduleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn load_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, AppError> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT meal_id, eat_date, meal_type
              FROM menu
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::io("load_schedule", user_id, e))?;

        if rows.is_empty() {
            let known: bool =
                sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM menu_users WHERE user_id = $1)"#)
                    .bind(user_id)
                    .fetch_one(&self.db)
                    .await
                    .map_err(|e| AppError::io("load_schedule.user", user_id, e))?;
            if !known {
                return Err(AppError::not_found("user", user_id));
            }
        }

        rows.into_iter()
            .map(ScheduleEntry::try_from)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| AppError::io("load_schedule.decode", user_id, e))
    }

    async fn load_meal_detail(&self, meal_id: &str) -> Result<MealDetail, AppError> {
        let meal_type: Option<String> =
            sqlx::query_scalar(r#"SELECT meal_type FROM menu WHERE meal_id = $1"#)
                .bind(meal_id)
                .fetch_optional(&self.db)
                .await
                .map_err(|e| AppError::io("load_meal_detail", meal_id, e))?;
        let meal_type: MealType = meal_type
            .ok_or_else(|| AppError::not_found("meal", meal_id))?
            .parse()
            .map_err(|e| AppError::io("load_meal_detail.decode", meal_id, e))?;

        let dishes = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT dish_id, name, recipe, total_nutrition
              FROM dishes
             WHERE meal_id = $1
             ORDER BY position ASC, dish_id ASC
            "#,
        )
        .bind(meal_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::io("load_meal_detail.dishes", meal_id, e))?;

        debug!(%meal_id, dishes = dishes.len(), "meal detail loaded");
        Ok(MealDetail::from_dishes(meal_id.to_owned(), meal_type, dishes))
    }

    async fn update_schedule(
        &self,
        user_id: &str,
        entries: &[ScheduleEntry],
    ) -> Result<(), AppError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::io("update_schedule.begin", user_id, e))?;

        for entry in entries {
            // dropping `tx` on the error path rolls the whole update back
            sqlx::query(
                r#"
                UPDATE menu
                   SET eat_date = $1
                 WHERE user_id = $2 AND meal_id = $3
                "#,
            )
            .bind(entry.eat_at)
            .bind(user_id)
            .bind(&entry.meal_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("update meal {}", entry.meal_id))
            .map_err(|e| AppError::io("update_schedule", user_id, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::io("update_schedule.commit", user_id, e))?;
        debug!(%user_id, entries = entries.len(), "schedule updated");
        Ok(())
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::models::NutritionalValueAbsolute;

/// Meal category of a schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => anyhow::bail!("unknown meal type '{}'", other),
        }
    }
}

/// One planned meal occurrence in a user's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub meal_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub eat_at: OffsetDateTime,
    pub meal_type: MealType,
}

/// Raw `menu` row; `meal_type` is stored as text.
#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub meal_id: String,
    pub eat_date: OffsetDateTime,
    pub meal_type: String,
}

impl TryFrom<ScheduleRow> for ScheduleEntry {
    type Error = anyhow::Error;

    fn try_from(r: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meal_type: r.meal_type.parse()?,
            meal_id: r.meal_id,
            eat_at: r.eat_date,
        })
    }
}

/// Recipes and nutrition of one meal occurrence, aggregated over its dishes.
///
/// `dish_ids`, `dish_names` and `recipes` are parallel lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDetail {
    pub meal_id: String,
    pub dish_ids: Vec<String>,
    pub dish_names: Vec<String>,
    pub meal_type: MealType,
    pub recipes: Vec<String>,
    pub total_nutrition: NutritionalValueAbsolute,
}

/// Raw `dishes` row.
#[derive(Debug, FromRow)]
pub struct DishRow {
    pub dish_id: String,
    pub name: String,
    pub recipe: String,
    pub total_nutrition: sqlx::types::Json<NutritionalValueAbsolute>,
}

impl MealDetail {
    pub fn from_dishes(meal_id: String, meal_type: MealType, dishes: Vec<DishRow>) -> Self {
        let mut detail = Self {
            meal_id,
            dish_ids: Vec::with_capacity(dishes.len()),
            dish_names: Vec::with_capacity(dishes.len()),
            meal_type,
            recipes: Vec::with_capacity(dishes.len()),
            total_nutrition: NutritionalValueAbsolute::default(),
        };
        for d in dishes {
            detail.dish_ids.push(d.dish_id);
            detail.dish_names.push(d.name);
            detail.recipes.push(d.recipe);
            detail.total_nutrition = detail.total_nutrition.add(d.total_nutrition.0);
        }
        detail
    }
}

#[cfg(test)]
mod repo_types_tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn meal_type_parses_case_insensitively() {
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert_eq!(" snack ".parse::<MealType>().unwrap(), MealType::Snack);
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn schedule_row_converts() {
        let row = ScheduleRow {
            meal_id: "m1".into(),
            eat_date: datetime!(2024-03-01 08:00 UTC),
            meal_type: "breakfast".into(),
        };
        let entry = ScheduleEntry::try_from(row).unwrap();
        assert_eq!(entry.meal_type, MealType::Breakfast);
        assert_eq!(entry.eat_at, datetime!(2024-03-01 08:00 UTC));
    }

    #[test]
    fn schedule_row_with_bad_type_is_rejected() {
        let row = ScheduleRow {
            meal_id: "m1".into(),
            eat_date: datetime!(2024-03-01 08:00 UTC),
            meal_type: "elevenses".into(),
        };
        assert!(ScheduleEntry::try_from(row).is_err());
    }

    #[test]
    fn detail_keeps_lists_parallel_and_sums_nutrition() {
        let dish = |id: &str, kcal: u32| DishRow {
            dish_id: id.into(),
            name: format!("dish {id}"),
            recipe: format!("{{\"id\":\"{id}\"}}"),
            total_nutrition: sqlx::types::Json(NutritionalValueAbsolute {
                proteins: 1,
                fats: 2,
                carbohydrates: 3,
                calories: kcal,
            }),
        };
        let detail = MealDetail::from_dishes(
            "meal1".into(),
            MealType::Dinner,
            vec![dish("d1", 100), dish("d2", 250)],
        );
        assert_eq!(detail.dish_ids, vec!["d1", "d2"]);
        assert_eq!(detail.dish_names, vec!["dish d1", "dish d2"]);
        assert_eq!(detail.recipes.len(), 2);
        assert_eq!(detail.total_nutrition.calories, 350);
        assert_eq!(detail.total_nutrition.proteins, 2);
    }

    #[test]
    fn entry_serializes_with_lowercase_type() {
        let entry = ScheduleEntry {
            meal_id: "m1".into(),
            eat_at: datetime!(2024-03-01 13:00 UTC),
            meal_type: MealType::Lunch,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"lunch\""));
        assert!(json.contains("2024-03-01T13:00:00Z"));
    }
}

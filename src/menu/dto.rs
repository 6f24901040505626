use serde::{Deserialize, Serialize};

use super::repo_types::MealDetail;

#[derive(Debug, Deserialize)]
pub struct GetMealQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Next meal of the user together with what still has to be bought for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetMealResponse {
    pub meal: MealDetail,
    pub shopping_list: String,
}

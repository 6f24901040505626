use serde::{Deserialize, Serialize};

/// Nutrition per 100 g of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalValueRelative {
    pub proteins: u32,      // grams
    pub fats: u32,          // grams
    pub carbohydrates: u32, // grams
    pub calories: u32,
}

/// Nutrition of a whole dish or meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalValueAbsolute {
    pub proteins: u32,
    pub fats: u32,
    pub carbohydrates: u32,
    pub calories: u32,
}

impl NutritionalValueAbsolute {
    pub fn add(self, other: Self) -> Self {
        Self {
            proteins: self.proteins.saturating_add(other.proteins),
            fats: self.fats.saturating_add(other.fats),
            carbohydrates: self.carbohydrates.saturating_add(other.carbohydrates),
            calories: self.calories.saturating_add(other.calories),
        }
    }
}

impl std::iter::Sum for NutritionalValueAbsolute {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::add)
    }
}

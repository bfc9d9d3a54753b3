//! Recipe model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::{AuthorProfile, UnknownVariant, UserSnapshot};

/// Meal category of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Breakfast,
    Main,
    Dessert,
    Smoothie,
    Baby,
    Drink,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breakfast => "breakfast",
            Category::Main => "main",
            Category::Dessert => "dessert",
            Category::Smoothie => "smoothie",
            Category::Baby => "baby",
            Category::Drink => "drink",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Category::Breakfast),
            "main" => Ok(Category::Main),
            "dessert" => Ok(Category::Dessert),
            "smoothie" => Ok(Category::Smoothie),
            "baby" => Ok(Category::Baby),
            "drink" => Ok(Category::Drink),
            other => Err(UnknownVariant {
                kind: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// Unit of an ingredient amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountUnit {
    #[serde(rename = "ml")]
    Milliliters,
    #[serde(rename = "l")]
    Liters,
    #[serde(rename = "mg")]
    Milligrams,
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "pc")]
    Piece,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: u32,
    pub unit: AmountUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepStep {
    pub rank: u32,
    pub description: String,
}

impl PrepStep {
    /// Rank step descriptions densely from 1 in the given order
    pub fn ranked<I>(descriptions: I) -> Vec<PrepStep>
    where
        I: IntoIterator<Item = String>,
    {
        descriptions
            .into_iter()
            .zip(1..)
            .map(|(description, rank)| PrepStep { rank, description })
            .collect()
    }
}

/// Recipe as returned by reads, with its author and owner embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub image_name: String,
    pub recipe_url: String,
    pub time_m: i32,
    pub category: Category,
    pub ingredients: Vec<Ingredient>,
    pub prep_steps: Vec<PrepStep>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub author: Option<AuthorProfile>,
    pub user_created: Option<UserSnapshot>,
}

/// New recipe creation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub recipe_url: String,
    pub time_m: i32,
    pub category: Category,
    pub ingredients: Vec<Ingredient>,
    /// Step descriptions in order; ranks are assigned on creation
    pub prep_steps: Vec<String>,
    pub author_id: Uuid,
    pub user_id: Uuid,
}

/// Recipe update payload
///
/// Prep steps are stored as given; their ranks are not re-checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub name: Option<String>,
    pub image_name: Option<String>,
    pub recipe_url: Option<String>,
    pub time_m: Option<i32>,
    pub category: Option<Category>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub prep_steps: Option<Vec<PrepStep>>,
    pub author_id: Option<Uuid>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image_name.is_none()
            && self.recipe_url.is_none()
            && self.time_m.is_none()
            && self.category.is_none()
            && self.ingredients.is_none()
            && self.prep_steps.is_none()
            && self.author_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_dense_from_one() {
        let steps = PrepStep::ranked(["Whisk".to_string(), "Fry".to_string(), "Serve".to_string()]);

        let ranks: Vec<u32> = steps.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(steps[1].description, "Fry");
    }

    #[test]
    fn category_text_matches_serde() {
        for category in [
            Category::Breakfast,
            Category::Main,
            Category::Dessert,
            Category::Smoothie,
            Category::Baby,
            Category::Drink,
        ] {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("desert".parse::<Category>().is_err());
    }

    #[test]
    fn ingredient_units_use_short_names() {
        let ingredient: Ingredient = serde_json::from_value(serde_json::json!({
            "name": "flour",
            "amount": 200,
            "unit": "g",
        }))
        .unwrap();
        assert_eq!(ingredient.unit, AmountUnit::Grams);

        let json = serde_json::to_value(AmountUnit::Tablespoon).unwrap();
        assert_eq!(json, "tbsp");
    }

    #[test]
    fn patch_distinguishes_absent_from_empty() {
        let patch: RecipePatch = serde_json::from_value(serde_json::json!({
            "ingredients": [],
            "timeM": 0,
        }))
        .unwrap();

        assert_eq!(patch.ingredients, Some(vec![]));
        assert_eq!(patch.time_m, Some(0));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
    }
}

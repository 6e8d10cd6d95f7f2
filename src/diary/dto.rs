use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::nutrition::{
    model::iso_date, AdvisoryEvent, DailyTotals, DayProgress, MacroTotals, Meal, NutritionGoals,
};

#[derive(Debug, Serialize)]
pub struct MealView {
    #[serde(flatten)]
    pub meal: Meal,
    pub totals: MacroTotals,
}

/// Everything the diary screen shows for one date.
#[derive(Debug, Serialize)]
pub struct DayView {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meals: Vec<MealView>,
    pub totals: DailyTotals,
    pub goals: NutritionGoals,
    pub progress: DayProgress,
    pub advisories: Vec<AdvisoryEvent>,
}

/// Quantity as sent by clients: a number, or the raw text of an input field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct AddEntryRequest {
    pub food_id: Uuid,
    pub quantity: QuantityInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub quantity: QuantityInput,
}

#[derive(Debug, Deserialize)]
pub struct GoalsInput {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default)]
    pub water_intake: Option<f64>,
    /// Accepted for compatibility and ignored; calories are derived.
    #[serde(default)]
    pub calories: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WaterRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct WaterResponse {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub amount: f64,
}

impl QuantityInput {
    /// Numeric value; text is parsed and validated, numbers are validated when scaled.
    pub fn resolve(&self) -> Result<f64, crate::nutrition::NutritionError> {
        match self {
            QuantityInput::Number(q) => Ok(*q),
            QuantityInput::Text(raw) => crate::nutrition::engine::parse_quantity(raw),
        }
    }
}

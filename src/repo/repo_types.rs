//! Row shapes for the Postgres tables and their conversions into domain types.

use sqlx::{types::Json, FromRow};
use time::Date;
use uuid::Uuid;

use crate::nutrition::{FoodRecord, LoggedFoodEntry, Meal, NutritionGoals};

#[derive(Debug, FromRow)]
pub(super) struct FoodRow {
    id: Uuid,
    name: String,
    calories_per_100: f64,
    protein_per_100: f64,
    carbs_per_100: f64,
    fats_per_100: f64,
    owner_id: Option<Uuid>,
    is_custom: bool,
}

impl From<FoodRow> for FoodRecord {
    fn from(r: FoodRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            calories_per_100: r.calories_per_100,
            protein_per_100: r.protein_per_100,
            carbs_per_100: r.carbs_per_100,
            fats_per_100: r.fats_per_100,
            owner_id: r.owner_id,
            is_custom: r.is_custom,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MealRow {
    id: Uuid,
    user_id: Uuid,
    date: Date,
    title: String,
    slot_time: String,
    entries: Json<Vec<LoggedFoodEntry>>,
}

impl From<MealRow> for Meal {
    fn from(r: MealRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            title: r.title,
            time: r.slot_time,
            entries: r.entries.0,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct GoalsRow {
    user_id: Uuid,
    protein: f64,
    carbs: f64,
    fats: f64,
    water_intake: f64,
}

impl TryFrom<GoalsRow> for NutritionGoals {
    type Error = anyhow::Error;

    fn try_from(r: GoalsRow) -> anyhow::Result<Self> {
        // calories column is ignored on read and re-derived
        Ok(NutritionGoals::new(
            r.user_id,
            r.protein,
            r.carbs,
            r.fats,
            r.water_intake,
        )?)
    }
}

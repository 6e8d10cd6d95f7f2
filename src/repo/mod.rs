//! Persistence seams. The engine never touches these; services fetch, compute,
//! then persist through them.

pub mod memory;
pub mod pg;
mod repo_types;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::nutrition::{FoodRecord, Meal, NewFoodRecord, NutritionGoals};

pub const SEARCH_LIMIT: usize = 20;

#[async_trait]
pub trait FoodCatalogRepository: Send + Sync {
    /// Case-insensitive name search over shared foods and `owner`'s custom foods.
    async fn search(&self, owner: Uuid, query: &str) -> anyhow::Result<Vec<FoodRecord>>;
    /// A shared food, or one of `owner`'s custom foods. Other users' custom
    /// foods are not visible.
    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<FoodRecord>>;
    async fn create_custom(&self, owner: Uuid, food: NewFoodRecord) -> anyhow::Result<FoodRecord>;
}

#[async_trait]
pub trait MealRepository: Send + Sync {
    /// Meals for the day, ordered by slot time.
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<Meal>>;
    /// Inserts each meal whose `(user, date, title)` slot is still free.
    /// Slots that already exist are left untouched.
    async fn seed(&self, meals: Vec<Meal>) -> anyhow::Result<()>;
    /// Inserts or replaces the meal with the same id.
    async fn save(&self, meal: Meal) -> anyhow::Result<Meal>;
    /// Returns `false` when no meal of `user_id` had that id.
    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait GoalsRepository: Send + Sync {
    async fn fetch_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionGoals>>;
    async fn save(&self, goals: NutritionGoals) -> anyhow::Result<NutritionGoals>;
}

#[async_trait]
pub trait WaterIntakeRepository: Send + Sync {
    /// Millilitres logged for the day, 0 when nothing was logged.
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<f64>;
    /// Overwrites the day's total.
    async fn save(&self, user_id: Uuid, date: Date, amount: f64) -> anyhow::Result<f64>;
    /// Adds `delta` to the day's total atomically and returns the new total.
    /// Returns `None`, leaving the total unchanged, when it would exceed `cap`.
    async fn increment(
        &self,
        user_id: Uuid,
        date: Date,
        delta: f64,
        cap: f64,
    ) -> anyhow::Result<Option<f64>>;
}

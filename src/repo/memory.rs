//! In-memory repositories. Used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use super::{
    FoodCatalogRepository, GoalsRepository, MealRepository, WaterIntakeRepository, SEARCH_LIMIT,
};
use crate::nutrition::{FoodRecord, Meal, NewFoodRecord, NutritionGoals};

fn lock<T>(m: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    m.lock().map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
}

pub struct MemoryFoodCatalog {
    foods: Mutex<Vec<FoodRecord>>,
}

impl MemoryFoodCatalog {
    pub fn empty() -> Self {
        Self {
            foods: Mutex::new(Vec::new()),
        }
    }

    /// Catalog preloaded with a handful of common foods.
    pub fn with_samples() -> Self {
        let samples = [
            ("Grilled chicken breast", 165.0, 31.0, 0.0, 3.6),
            ("White rice", 130.0, 2.7, 28.0, 0.3),
            ("Carioca beans", 77.0, 4.8, 14.0, 0.5),
            ("Sweet potato", 86.0, 1.6, 20.0, 0.1),
            ("Whole egg", 155.0, 13.0, 1.1, 11.0),
            ("Rolled oats", 389.0, 16.9, 66.3, 6.9),
        ];
        let foods = samples
            .into_iter()
            .map(|(name, calories, protein, carbs, fats)| FoodRecord {
                id: Uuid::new_v4(),
                name: name.to_string(),
                calories_per_100: calories,
                protein_per_100: protein,
                carbs_per_100: carbs,
                fats_per_100: fats,
                owner_id: None,
                is_custom: false,
            })
            .collect();
        Self {
            foods: Mutex::new(foods),
        }
    }
}

fn visible_to(food: &FoodRecord, owner: Uuid) -> bool {
    food.owner_id.map_or(true, |o| o == owner)
}

#[async_trait]
impl FoodCatalogRepository for MemoryFoodCatalog {
    async fn search(&self, owner: Uuid, query: &str) -> anyhow::Result<Vec<FoodRecord>> {
        let needle = query.trim().to_lowercase();
        let foods = lock(&self.foods)?;
        Ok(foods
            .iter()
            .filter(|f| visible_to(f, owner))
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<FoodRecord>> {
        Ok(lock(&self.foods)?
            .iter()
            .find(|f| f.id == id && visible_to(f, owner))
            .cloned())
    }

    async fn create_custom(&self, owner: Uuid, food: NewFoodRecord) -> anyhow::Result<FoodRecord> {
        let record = food.into_record(owner);
        lock(&self.foods)?.push(record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct MemoryMealRepository {
    meals: Mutex<HashMap<Uuid, Meal>>,
}

#[async_trait]
impl MealRepository for MemoryMealRepository {
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<Meal>> {
        let meals = lock(&self.meals)?;
        let mut day: Vec<Meal> = meals
            .values()
            .filter(|m| m.user_id == user_id && m.date == date)
            .cloned()
            .collect();
        day.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.title.cmp(&b.title)));
        Ok(day)
    }

    async fn seed(&self, new_meals: Vec<Meal>) -> anyhow::Result<()> {
        let mut meals = lock(&self.meals)?;
        for meal in new_meals {
            let taken = meals.values().any(|m| {
                m.user_id == meal.user_id && m.date == meal.date && m.title == meal.title
            });
            if !taken {
                meals.insert(meal.id, meal);
            }
        }
        Ok(())
    }

    async fn save(&self, meal: Meal) -> anyhow::Result<Meal> {
        let mut meals = lock(&self.meals)?;
        let clash = meals.values().any(|m| {
            m.id != meal.id && m.user_id == meal.user_id && m.date == meal.date && m.title == meal.title
        });
        if clash {
            anyhow::bail!(
                "meal {:?} already exists for {} on {}",
                meal.title,
                meal.user_id,
                meal.date
            );
        }
        meals.insert(meal.id, meal.clone());
        Ok(meal)
    }

    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let mut meals = lock(&self.meals)?;
        match meals.get(&meal_id) {
            Some(m) if m.user_id == user_id => {
                meals.remove(&meal_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryGoalsRepository {
    goals: Mutex<HashMap<Uuid, NutritionGoals>>,
}

#[async_trait]
impl GoalsRepository for MemoryGoalsRepository {
    async fn fetch_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionGoals>> {
        Ok(lock(&self.goals)?.get(&user_id).cloned())
    }

    async fn save(&self, goals: NutritionGoals) -> anyhow::Result<NutritionGoals> {
        lock(&self.goals)?.insert(goals.user_id(), goals.clone());
        Ok(goals)
    }
}

#[derive(Default)]
pub struct MemoryWaterIntakeRepository {
    amounts: Mutex<HashMap<(Uuid, Date), f64>>,
}

#[async_trait]
impl WaterIntakeRepository for MemoryWaterIntakeRepository {
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<f64> {
        Ok(lock(&self.amounts)?
            .get(&(user_id, date))
            .copied()
            .unwrap_or(0.0))
    }

    async fn save(&self, user_id: Uuid, date: Date, amount: f64) -> anyhow::Result<f64> {
        lock(&self.amounts)?.insert((user_id, date), amount);
        Ok(amount)
    }

    async fn increment(
        &self,
        user_id: Uuid,
        date: Date,
        delta: f64,
        cap: f64,
    ) -> anyhow::Result<Option<f64>> {
        // read, check, add and write under one guard
        let mut amounts = lock(&self.amounts)?;
        let next = amounts.get(&(user_id, date)).copied().unwrap_or(0.0) + delta;
        if !next.is_finite() || next > cap {
            return Ok(None);
        }
        amounts.insert((user_id, date), next);
        Ok(Some(next))
    }
}

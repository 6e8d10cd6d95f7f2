use thiserror::Error;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use crate::diary::dto::{DayView, GoalsInput, MealView};
use crate::nutrition::{
    defaults::{missing_slots, MAX_DAILY_WATER_ML},
    engine, LoggedFoodEntry, Meal, NutritionError, NutritionGoals, WaterIntakeRecord,
};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum DiaryError {
    #[error(transparent)]
    Invalid(#[from] NutritionError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

pub type DiaryResult<T> = Result<T, DiaryError>;

pub async fn current_goals(state: &AppState, user_id: Uuid) -> DiaryResult<NutritionGoals> {
    Ok(state
        .goals
        .fetch_for_user(user_id)
        .await?
        .unwrap_or_else(|| NutritionGoals::default_for(user_id)))
}

/// Meals for the day, creating any template slot that does not exist yet.
async fn meals_for_day(
    state: &AppState,
    user_id: Uuid,
    date: Date,
) -> DiaryResult<Vec<Meal>> {
    let meals = state.meals.fetch_for_date(user_id, date).await?;
    let missing = missing_slots(user_id, date, &meals);
    if missing.is_empty() {
        return Ok(meals);
    }
    debug!(%user_id, %date, count = missing.len(), "seeding meal slots");
    state.meals.seed(missing).await?;
    Ok(state.meals.fetch_for_date(user_id, date).await?)
}

pub async fn load_day(state: &AppState, user_id: Uuid, date: Date) -> DiaryResult<DayView> {
    let goals = current_goals(state, user_id).await?;
    let meals = meals_for_day(state, user_id, date).await?;
    let water = WaterIntakeRecord {
        user_id,
        date,
        amount: state.water.fetch_for_date(user_id, date).await?,
    };

    let totals = engine::compute_daily_totals(&meals, &water);
    let progress = engine::day_progress(&totals, &goals);
    let advisories = engine::evaluate_goal_advisories(&totals, &goals);
    if !advisories.is_empty() {
        state.notifier.notify(user_id, date, &advisories);
    }

    let meals = meals
        .into_iter()
        .map(|meal| MealView {
            totals: engine::compute_meal_totals(&meal),
            meal,
        })
        .collect();

    Ok(DayView {
        date,
        meals,
        totals,
        goals,
        progress,
        advisories,
    })
}

pub async fn add_entry(
    state: &AppState,
    user_id: Uuid,
    date: Date,
    meal_id: Uuid,
    food_id: Uuid,
    quantity: f64,
) -> DiaryResult<LoggedFoodEntry> {
    let mut meal = meals_for_day(state, user_id, date)
        .await?
        .into_iter()
        .find(|m| m.id == meal_id)
        .ok_or(DiaryError::NotFound("meal"))?;
    let food = state
        .foods
        .get_by_id(user_id, food_id)
        .await?
        .ok_or(DiaryError::NotFound("food"))?;

    let entry = engine::scale_food(&food, quantity)?;
    meal.entries.push(entry.clone());
    state.meals.save(meal).await?;

    info!(%user_id, %meal_id, entry_id = %entry.id, food = %entry.name, "entry logged");
    Ok(entry)
}

pub async fn update_entry_quantity(
    state: &AppState,
    user_id: Uuid,
    date: Date,
    meal_id: Uuid,
    entry_id: Uuid,
    quantity: f64,
) -> DiaryResult<LoggedFoodEntry> {
    let mut meal = state
        .meals
        .fetch_for_date(user_id, date)
        .await?
        .into_iter()
        .find(|m| m.id == meal_id)
        .ok_or(DiaryError::NotFound("meal"))?;
    let slot = meal
        .entries
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or(DiaryError::NotFound("entry"))?;
    let food = state
        .foods
        .get_by_id(user_id, slot.food_record_id)
        .await?
        .ok_or(DiaryError::NotFound("food"))?;

    let edited = engine::rescale_entry(slot, &food, quantity)?;
    *slot = edited.clone();
    state.meals.save(meal).await?;

    info!(%user_id, %meal_id, %entry_id, quantity, "entry updated");
    Ok(edited)
}

/// Removes one entry. The meal itself stays, possibly empty.
pub async fn remove_entry(
    state: &AppState,
    user_id: Uuid,
    date: Date,
    meal_id: Uuid,
    entry_id: Uuid,
) -> DiaryResult<()> {
    let mut meal = state
        .meals
        .fetch_for_date(user_id, date)
        .await?
        .into_iter()
        .find(|m| m.id == meal_id)
        .ok_or(DiaryError::NotFound("meal"))?;
    let before = meal.entries.len();
    meal.entries.retain(|e| e.id != entry_id);
    if meal.entries.len() == before {
        return Err(DiaryError::NotFound("entry"));
    }
    state.meals.save(meal).await?;

    info!(%user_id, %meal_id, %entry_id, "entry removed");
    Ok(())
}

pub async fn delete_meal(state: &AppState, user_id: Uuid, meal_id: Uuid) -> DiaryResult<()> {
    if !state.meals.delete(user_id, meal_id).await? {
        return Err(DiaryError::NotFound("meal"));
    }
    info!(%user_id, %meal_id, "meal deleted");
    Ok(())
}

/// Saves new targets. Calories are derived from the macros; any value the
/// caller sent for them is dropped.
pub async fn update_goals(
    state: &AppState,
    user_id: Uuid,
    input: GoalsInput,
) -> DiaryResult<NutritionGoals> {
    let mut goals = current_goals(state, user_id).await?;
    goals.set_macros(input.protein, input.carbs, input.fats)?;
    if let Some(water) = input.water_intake {
        goals.set_water_intake(water)?;
    }
    let saved = state.goals.save(goals).await?;
    info!(%user_id, calories = saved.calories(), "goals updated");
    Ok(saved)
}

fn check_water(amount: f64, allow_zero: bool) -> Result<(), NutritionError> {
    let ok = amount.is_finite()
        && amount <= MAX_DAILY_WATER_ML
        && (amount > 0.0 || (allow_zero && amount == 0.0));
    if ok {
        Ok(())
    } else {
        Err(NutritionError::InvalidWaterAmount(format!(
            "{amount} ml is not allowed"
        )))
    }
}

pub async fn add_water(state: &AppState, user_id: Uuid, date: Date, delta: f64) -> DiaryResult<f64> {
    check_water(delta, false)?;
    let total = state
        .water
        .increment(user_id, date, delta, MAX_DAILY_WATER_ML)
        .await?
        .ok_or_else(|| {
            NutritionError::InvalidWaterAmount(format!(
                "adding {delta} ml would exceed {MAX_DAILY_WATER_ML} ml for the day"
            ))
        })?;
    debug!(%user_id, %date, delta, total, "water added");
    Ok(total)
}

pub async fn set_water(state: &AppState, user_id: Uuid, date: Date, amount: f64) -> DiaryResult<f64> {
    check_water(amount, true)?;
    Ok(state.water.save(user_id, date, amount).await?)
}

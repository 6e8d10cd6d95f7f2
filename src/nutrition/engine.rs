//! Nutrient arithmetic for the diary: quantity scaling, daily totals, goal
//! derivation and advisories. Everything here is pure and synchronous; the only
//! side effect is id generation in [`scale_food`].

use uuid::Uuid;

use super::error::NutritionError;
use super::model::{
    AdvisoryEvent, AdvisoryKind, DailyTotals, DayProgress, FoodRecord, LoggedFoodEntry,
    MacroTotals, Meal, NutritionGoals, Tenths, WaterIntakeRecord,
};

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

const CALORIE_LIMIT_RATIO: f64 = 0.90;
const LOW_PROTEIN_RATIO: f64 = 0.50;

/// Upper bound for any single scaled nutrient value. Keeps daily totals well
/// inside the fixed-point accumulator's range.
pub const MAX_ENTRY_VALUE: f64 = 1e12;

/// Parses a quantity typed by the user (grams or ml).
pub fn parse_quantity(raw: &str) -> Result<f64, NutritionError> {
    let quantity: f64 = raw
        .trim()
        .parse()
        .map_err(|_| NutritionError::InvalidQuantity(format!("{raw:?} is not a number")))?;
    check_quantity(quantity)?;
    Ok(quantity)
}

fn check_quantity(quantity: f64) -> Result<(), NutritionError> {
    if !quantity.is_finite() {
        return Err(NutritionError::InvalidQuantity(format!(
            "{quantity} is not a finite number"
        )));
    }
    if quantity <= 0.0 {
        return Err(NutritionError::InvalidQuantity(format!(
            "{quantity} must be greater than zero"
        )));
    }
    Ok(())
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scales a per-100 food profile to `quantity`, producing a new log entry.
///
/// Calories are rounded to whole kcal; protein, carbs and fats to one decimal.
pub fn scale_food(record: &FoodRecord, quantity: f64) -> Result<LoggedFoodEntry, NutritionError> {
    rescale(Uuid::new_v4(), record, quantity)
}

/// Re-derives an existing entry for a new quantity, keeping its id.
pub fn rescale_entry(
    entry: &LoggedFoodEntry,
    record: &FoodRecord,
    quantity: f64,
) -> Result<LoggedFoodEntry, NutritionError> {
    rescale(entry.id, record, quantity)
}

fn rescale(id: Uuid, record: &FoodRecord, quantity: f64) -> Result<LoggedFoodEntry, NutritionError> {
    check_quantity(quantity)?;
    let multiplier = quantity / 100.0;
    let entry = LoggedFoodEntry {
        id,
        food_record_id: record.id,
        name: record.name.clone(),
        quantity,
        calories: (record.calories_per_100 * multiplier).round(),
        protein: round_tenth(record.protein_per_100 * multiplier),
        carbs: round_tenth(record.carbs_per_100 * multiplier),
        fats: round_tenth(record.fats_per_100 * multiplier),
    };
    let largest = [entry.calories, entry.protein, entry.carbs, entry.fats]
        .into_iter()
        .fold(0.0_f64, f64::max);
    if largest > MAX_ENTRY_VALUE {
        return Err(NutritionError::InvalidQuantity(format!(
            "{quantity} g of {} is out of range",
            record.name
        )));
    }
    Ok(entry)
}

#[derive(Default, Clone, Copy)]
struct Accumulator {
    calories: Tenths,
    protein: Tenths,
    carbs: Tenths,
    fats: Tenths,
}

impl Accumulator {
    fn push(self, e: &LoggedFoodEntry) -> Self {
        Self {
            calories: self.calories + Tenths::of(e.calories),
            protein: self.protein + Tenths::of(e.protein),
            carbs: self.carbs + Tenths::of(e.carbs),
            fats: self.fats + Tenths::of(e.fats),
        }
    }

    fn finish(self) -> MacroTotals {
        MacroTotals {
            calories: self.calories.value(),
            protein: self.protein.value(),
            carbs: self.carbs.value(),
            fats: self.fats.value(),
        }
    }
}

/// Totals for a single meal slot.
pub fn compute_meal_totals(meal: &Meal) -> MacroTotals {
    meal.entries
        .iter()
        .fold(Accumulator::default(), Accumulator::push)
        .finish()
}

/// Sums every entry of every meal and attaches the day's water.
pub fn compute_daily_totals(meals: &[Meal], water: &WaterIntakeRecord) -> DailyTotals {
    let macros = meals
        .iter()
        .flat_map(|m| m.entries.iter())
        .fold(Accumulator::default(), Accumulator::push)
        .finish();
    DailyTotals {
        calories: macros.calories,
        protein: macros.protein,
        carbs: macros.carbs,
        fats: macros.fats,
        water_intake: water.amount,
    }
}

/// `protein*4 + carbs*4 + fats*9`, unrounded.
pub fn derive_calorie_goal(protein: f64, carbs: f64, fats: f64) -> f64 {
    protein * KCAL_PER_G_PROTEIN + carbs * KCAL_PER_G_CARBS + fats * KCAL_PER_G_FAT
}

/// Evaluates the advisories that apply to the current totals.
///
/// Stateless: the same inputs always produce the same events.
pub fn evaluate_goal_advisories(totals: &DailyTotals, goals: &NutritionGoals) -> Vec<AdvisoryEvent> {
    let mut events = Vec::new();

    let calorie_ratio = try_ratio(totals.calories, goals.calories());
    if calorie_ratio.is_some_and(|r| r >= CALORIE_LIMIT_RATIO) {
        events.push(AdvisoryEvent {
            kind: AdvisoryKind::CalorieApproachingLimit,
            message: "You are close to your daily calorie limit.".into(),
        });
    }

    let protein_ratio = try_ratio(totals.protein, goals.protein());
    if calorie_ratio.is_some()
        && protein_ratio.is_some_and(|r| r < LOW_PROTEIN_RATIO)
        && totals.calories > goals.calories() / 2.0
    {
        events.push(AdvisoryEvent {
            kind: AdvisoryKind::LowProteinWarning,
            message: "Protein intake is low. Consider adding more protein to your meals.".into(),
        });
    }

    events
}

fn try_ratio(current: f64, goal: f64) -> Option<f64> {
    (goal.is_finite() && goal > 0.0).then(|| current / goal)
}

/// `min(current / goal, 1.0)`, or `DivisionUndefined` for a zero, negative or
/// non-finite goal.
pub fn try_progress_fraction(current: f64, goal: f64) -> Result<f64, NutritionError> {
    let ratio = try_ratio(current, goal).ok_or(NutritionError::DivisionUndefined)?;
    Ok(ratio.clamp(0.0, 1.0))
}

/// Progress-bar fraction. An undefined ratio renders as an empty bar (0.0).
pub fn progress_fraction(current: f64, goal: f64) -> f64 {
    try_progress_fraction(current, goal).unwrap_or(0.0)
}

pub fn day_progress(totals: &DailyTotals, goals: &NutritionGoals) -> DayProgress {
    DayProgress {
        calories: progress_fraction(totals.calories, goals.calories()),
        protein: progress_fraction(totals.protein, goals.protein()),
        carbs: progress_fraction(totals.carbs, goals.carbs()),
        fats: progress_fraction(totals.fats, goals.fats()),
        water_intake: progress_fraction(totals.water_intake, goals.water_intake()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn chicken() -> FoodRecord {
        FoodRecord {
            id: Uuid::new_v4(),
            name: "Chicken breast".into(),
            calories_per_100: 165.0,
            protein_per_100: 31.0,
            carbs_per_100: 0.0,
            fats_per_100: 3.6,
            owner_id: None,
            is_custom: false,
        }
    }

    fn rice() -> FoodRecord {
        FoodRecord {
            id: Uuid::new_v4(),
            name: "White rice".into(),
            calories_per_100: 130.0,
            protein_per_100: 2.7,
            carbs_per_100: 28.0,
            fats_per_100: 0.3,
            owner_id: None,
            is_custom: false,
        }
    }

    fn meal_with(entries: Vec<LoggedFoodEntry>) -> Meal {
        let mut meal = Meal::empty(Uuid::nil(), date!(2024 - 05 - 01), "Lunch", "13:00");
        meal.entries = entries;
        meal
    }

    fn water(amount: f64) -> WaterIntakeRecord {
        WaterIntakeRecord {
            user_id: Uuid::nil(),
            date: date!(2024 - 05 - 01),
            amount,
        }
    }

    fn goals(protein: f64, carbs: f64, fats: f64) -> NutritionGoals {
        NutritionGoals::new(Uuid::nil(), protein, carbs, fats, 3000.0).unwrap()
    }

    fn totals(calories: f64, protein: f64) -> DailyTotals {
        DailyTotals {
            calories,
            protein,
            ..DailyTotals::default()
        }
    }

    #[test]
    fn scale_food_rounds_per_nutrient() {
        let record = chicken();
        let entry = scale_food(&record, 150.0).unwrap();
        assert_eq!(entry.calories, 248.0);
        assert_eq!(entry.protein, 46.5);
        assert_eq!(entry.carbs, 0.0);
        assert_eq!(entry.fats, 5.4);
        assert_eq!(entry.quantity, 150.0);
        assert_eq!(entry.food_record_id, record.id);
        assert_eq!(entry.name, "Chicken breast");
    }

    #[test]
    fn scale_food_generates_fresh_ids() {
        let record = chicken();
        let a = scale_food(&record, 100.0).unwrap();
        let b = scale_food(&record, 100.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn scaled_entry_is_independent_of_later_record_changes() {
        let mut record = chicken();
        let entry = scale_food(&record, 200.0).unwrap();
        record.calories_per_100 = 500.0;
        assert_eq!(entry.calories, 330.0);
    }

    #[test]
    fn scale_food_rejects_non_positive_or_nan() {
        let record = chicken();
        for q in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = scale_food(&record, q).unwrap_err();
            assert!(matches!(err, NutritionError::InvalidQuantity(_)), "{q}");
        }
    }

    #[test]
    fn scale_food_rejects_out_of_range_results() {
        let err = scale_food(&chicken(), 1e18).unwrap_err();
        assert!(matches!(err, NutritionError::InvalidQuantity(_)));
        // 1e11 g of chicken is 1.65e11 kcal, still accepted
        assert_eq!(scale_food(&chicken(), 1e11).unwrap().calories, 1.65e11);
    }

    #[test]
    fn oversized_stored_entries_do_not_overflow_totals() {
        let mut entry = scale_food(&chicken(), 100.0).unwrap();
        entry.calories = 1.65e18;
        let meals = [meal_with(vec![entry.clone(), entry.clone(), entry])];
        let totals = compute_daily_totals(&meals, &water(0.0));
        assert!(totals.calories.is_finite() && totals.calories > 0.0);
        assert_eq!(compute_meal_totals(&meals[0]).calories, totals.calories);
    }

    #[test]
    fn parse_quantity_accepts_numbers_only() {
        assert_eq!(parse_quantity(" 150 ").unwrap(), 150.0);
        assert_eq!(parse_quantity("12.5").unwrap(), 12.5);
        for raw in ["", "abc", "NaN", "0", "-3"] {
            assert!(
                matches!(parse_quantity(raw), Err(NutritionError::InvalidQuantity(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn rescale_entry_keeps_id_and_rederives() {
        let record = chicken();
        let entry = scale_food(&record, 100.0).unwrap();
        let edited = rescale_entry(&entry, &record, 150.0).unwrap();
        assert_eq!(edited.id, entry.id);
        assert_eq!(edited.calories, 248.0);
        assert_eq!(edited.protein, 46.5);
    }

    #[test]
    fn daily_totals_sum_all_meals_and_copy_water() {
        let breakfast = meal_with(vec![scale_food(&rice(), 100.0).unwrap()]);
        let lunch = meal_with(vec![scale_food(&chicken(), 150.0).unwrap()]);
        let totals = compute_daily_totals(&[breakfast, lunch], &water(750.0));
        assert_eq!(totals.calories, 378.0);
        assert_eq!(totals.protein, 49.2);
        assert_eq!(totals.carbs, 28.0);
        assert_eq!(totals.fats, 5.7);
        assert_eq!(totals.water_intake, 750.0);
    }

    #[test]
    fn daily_totals_are_partition_invariant() {
        let entries: Vec<_> = [(chicken(), 150.0), (rice(), 230.0), (chicken(), 85.0), (rice(), 45.0)]
            .iter()
            .map(|(r, q)| scale_food(r, *q).unwrap())
            .collect();

        let single = [meal_with(entries.clone())];
        let split = [
            meal_with(entries[..1].to_vec()),
            meal_with(entries[1..3].to_vec()),
            meal_with(entries[3..].to_vec()),
        ];
        let reversed = [meal_with(entries.iter().rev().cloned().collect())];

        let w = water(0.0);
        let expected = compute_daily_totals(&single, &w);
        assert_eq!(compute_daily_totals(&split, &w), expected);
        assert_eq!(compute_daily_totals(&reversed, &w), expected);
    }

    #[test]
    fn daily_totals_are_repeatable() {
        let meals = [meal_with(vec![scale_food(&chicken(), 120.0).unwrap()])];
        let w = water(200.0);
        assert_eq!(compute_daily_totals(&meals, &w), compute_daily_totals(&meals, &w));
    }

    #[test]
    fn meal_totals_sum_to_daily_totals() {
        let meals = [
            meal_with(vec![scale_food(&chicken(), 150.0).unwrap()]),
            meal_with(vec![
                scale_food(&rice(), 80.0).unwrap(),
                scale_food(&chicken(), 33.0).unwrap(),
            ]),
        ];
        let per_meal: Vec<_> = meals.iter().map(compute_meal_totals).collect();
        let daily = compute_daily_totals(&meals, &water(0.0));
        let summed_protein = per_meal.iter().map(|t| Tenths::of(t.protein)).fold(Tenths::default(), |a, b| a + b);
        assert_eq!(summed_protein.value(), daily.protein);
        assert_eq!(per_meal.iter().map(|t| t.calories).sum::<f64>(), daily.calories);
    }

    #[test]
    fn empty_day_totals_are_zero() {
        let meals = [meal_with(Vec::new())];
        let totals = compute_daily_totals(&meals, &water(0.0));
        assert_eq!(totals, DailyTotals::default());
    }

    #[test]
    fn calorie_goal_is_exact_and_idempotent() {
        for (p, c, f) in [(180.0, 300.0, 70.0), (0.0, 0.0, 0.0), (92.5, 210.5, 55.5)] {
            let first = derive_calorie_goal(p, c, f);
            assert_eq!(first, derive_calorie_goal(p, c, f));
            assert_eq!(first, 4.0 * p + 4.0 * c + 9.0 * f);
        }
        assert_eq!(derive_calorie_goal(180.0, 300.0, 70.0), 2550.0);
    }

    #[test]
    fn advisories_fire_at_thresholds() {
        // 150*4 + 237.5*4 + 50*9 = 2000 kcal
        let goals = goals(150.0, 237.5, 50.0);
        assert_eq!(goals.calories(), 2000.0);

        let kinds: Vec<_> = evaluate_goal_advisories(&totals(1800.0, 50.0), &goals)
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![AdvisoryKind::CalorieApproachingLimit, AdvisoryKind::LowProteinWarning]
        );

        assert!(evaluate_goal_advisories(&totals(900.0, 50.0), &goals).is_empty());
    }

    #[test]
    fn low_protein_requires_more_than_half_the_calories() {
        let goals = goals(150.0, 237.5, 50.0);
        let events = evaluate_goal_advisories(&totals(1000.0, 10.0), &goals);
        assert!(events.is_empty());

        let events = evaluate_goal_advisories(&totals(1001.0, 10.0), &goals);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AdvisoryKind::LowProteinWarning);
    }

    #[test]
    fn calorie_advisory_fires_alone_when_protein_is_fine() {
        let goals = goals(150.0, 237.5, 50.0);
        let events = evaluate_goal_advisories(&totals(1900.0, 140.0), &goals);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AdvisoryKind::CalorieApproachingLimit);
    }

    #[test]
    fn advisories_have_no_memory_between_calls() {
        let goals = goals(150.0, 237.5, 50.0);
        let t = totals(1800.0, 50.0);
        let first = evaluate_goal_advisories(&t, &goals);
        let second = evaluate_goal_advisories(&t, &goals);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn advisories_skip_zero_goals() {
        let goals = goals(0.0, 0.0, 0.0);
        assert!(evaluate_goal_advisories(&totals(500.0, 0.0), &goals).is_empty());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_fraction(2500.0, 2000.0), 1.0);
        assert_eq!(progress_fraction(500.0, 2000.0), 0.25);
        assert_eq!(progress_fraction(-10.0, 2000.0), 0.0);
    }

    #[test]
    fn progress_against_zero_goal_is_undefined() {
        assert_eq!(
            try_progress_fraction(10.0, 0.0),
            Err(NutritionError::DivisionUndefined)
        );
        assert_eq!(try_progress_fraction(0.0, 100.0), Ok(0.0));
        assert_eq!(progress_fraction(10.0, 0.0), 0.0);
    }

    #[test]
    fn day_progress_covers_every_bar() {
        let goals = NutritionGoals::new(Uuid::nil(), 100.0, 200.0, 50.0, 2000.0).unwrap();
        let totals = DailyTotals {
            calories: 3000.0,
            protein: 50.0,
            carbs: 50.0,
            fats: 0.0,
            water_intake: 500.0,
        };
        let p = day_progress(&totals, &goals);
        assert_eq!(p.calories, 1.0);
        assert_eq!(p.protein, 0.5);
        assert_eq!(p.carbs, 0.25);
        assert_eq!(p.fats, 0.0);
        assert_eq!(p.water_intake, 0.25);
    }
}

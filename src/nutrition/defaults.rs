use time::Date;
use uuid::Uuid;

use super::model::Meal;

/// Meal slots every diary day starts with, as `(title, time)`.
pub const MEAL_TEMPLATE: [(&str, &str); 6] = [
    ("Breakfast", "07:00"),
    ("Morning Snack", "10:00"),
    ("Lunch", "13:00"),
    ("Afternoon Snack", "16:00"),
    ("Dinner", "19:00"),
    ("Supper", "21:00"),
];

pub const DEFAULT_PROTEIN_G: f64 = 180.0;
pub const DEFAULT_CARBS_G: f64 = 300.0;
pub const DEFAULT_FATS_G: f64 = 70.0;
pub const DEFAULT_WATER_ML: f64 = 3700.0;

/// Largest water total accepted for a single day.
pub const MAX_DAILY_WATER_ML: f64 = 50_000.0;

/// Template slots not yet present in `existing` (matched by title).
pub fn missing_slots(user_id: Uuid, date: Date, existing: &[Meal]) -> Vec<Meal> {
    MEAL_TEMPLATE
        .iter()
        .filter(|(title, _)| !existing.iter().any(|m| m.title == *title))
        .map(|(title, time)| Meal::empty(user_id, date, title, time))
        .collect()
}

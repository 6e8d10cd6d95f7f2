pub mod defaults;
pub mod engine;
pub mod error;
pub mod model;

pub use error::NutritionError;
pub use model::{
    AdvisoryEvent, AdvisoryKind, DailyTotals, DayProgress, FoodRecord, GoalsRecord,
    LoggedFoodEntry, MacroTotals, Meal, NewFoodRecord, NutritionGoals, WaterIntakeRecord,
};

use std::ops::Add;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::defaults::{DEFAULT_CARBS_G, DEFAULT_FATS_G, DEFAULT_PROTEIN_G, DEFAULT_WATER_ML};
use super::engine::derive_calorie_goal;
use super::error::NutritionError;

/// `YYYY-MM-DD` (de)serialization for diary dates.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Nutrient profile normalized to a 100 g (or 100 ml) reference quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100: f64,
    pub protein_per_100: f64,
    pub carbs_per_100: f64,
    pub fats_per_100: f64,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub is_custom: bool,
}

/// Payload for a user-defined catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodRecord {
    pub name: String,
    pub calories_per_100: f64,
    pub protein_per_100: f64,
    pub carbs_per_100: f64,
    pub fats_per_100: f64,
}

impl NewFoodRecord {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        let fields = [
            ("calories_per_100", self.calories_per_100),
            ("protein_per_100", self.protein_per_100),
            ("carbs_per_100", self.carbs_per_100),
            ("fats_per_100", self.fats_per_100),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{field} must be a non-negative number"));
            }
        }
        Ok(())
    }

    pub fn into_record(self, owner_id: Uuid) -> FoodRecord {
        FoodRecord {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            calories_per_100: self.calories_per_100,
            protein_per_100: self.protein_per_100,
            carbs_per_100: self.carbs_per_100,
            fats_per_100: self.fats_per_100,
            owner_id: Some(owner_id),
            is_custom: true,
        }
    }
}

/// A food scaled to the quantity actually eaten. Nutrients are fixed at log time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFoodEntry {
    pub id: Uuid,
    pub food_record_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub title: String,
    pub time: String,
    #[serde(default)]
    pub entries: Vec<LoggedFoodEntry>,
}

impl Meal {
    pub fn empty(user_id: Uuid, date: Date, title: &str, time: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            title: title.to_string(),
            time: time.to_string(),
            entries: Vec::new(),
        }
    }
}

/// Daily targets for one user. `calories` is always derived from the macros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GoalsRecord")]
pub struct NutritionGoals {
    user_id: Uuid,
    protein: f64,
    carbs: f64,
    fats: f64,
    calories: f64,
    water_intake: f64,
}

/// Wire/row shape of the goals. A `calories` value, if present, is discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalsRecord {
    pub user_id: Uuid,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub water_intake: f64,
    #[serde(default)]
    pub calories: Option<f64>,
}

impl TryFrom<GoalsRecord> for NutritionGoals {
    type Error = NutritionError;

    fn try_from(r: GoalsRecord) -> Result<Self, Self::Error> {
        NutritionGoals::new(r.user_id, r.protein, r.carbs, r.fats, r.water_intake)
    }
}

impl NutritionGoals {
    pub fn new(
        user_id: Uuid,
        protein: f64,
        carbs: f64,
        fats: f64,
        water_intake: f64,
    ) -> Result<Self, NutritionError> {
        for (field, value) in [
            ("protein", protein),
            ("carbs", carbs),
            ("fats", fats),
            ("water_intake", water_intake),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(NutritionError::InvalidGoal(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        Ok(Self {
            user_id,
            protein,
            carbs,
            fats,
            calories: derive_calorie_goal(protein, carbs, fats),
            water_intake,
        })
    }

    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            protein: DEFAULT_PROTEIN_G,
            carbs: DEFAULT_CARBS_G,
            fats: DEFAULT_FATS_G,
            calories: derive_calorie_goal(DEFAULT_PROTEIN_G, DEFAULT_CARBS_G, DEFAULT_FATS_G),
            water_intake: DEFAULT_WATER_ML,
        }
    }

    /// Replaces the macro targets and re-derives calories.
    pub fn set_macros(&mut self, protein: f64, carbs: f64, fats: f64) -> Result<(), NutritionError> {
        *self = Self::new(self.user_id, protein, carbs, fats, self.water_intake)?;
        Ok(())
    }

    pub fn set_water_intake(&mut self, water_intake: f64) -> Result<(), NutritionError> {
        *self = Self::new(self.user_id, self.protein, self.carbs, self.fats, water_intake)?;
        Ok(())
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
    pub fn protein(&self) -> f64 {
        self.protein
    }
    pub fn carbs(&self) -> f64 {
        self.carbs
    }
    pub fn fats(&self) -> f64 {
        self.fats
    }
    pub fn calories(&self) -> f64 {
        self.calories
    }
    pub fn water_intake(&self) -> f64 {
        self.water_intake
    }
}

/// Summed macros for a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Everything eaten and drunk on one day. Derived per request, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub water_intake: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntakeRecord {
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisoryKind {
    CalorieApproachingLimit,
    LowProteinWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryEvent {
    pub kind: AdvisoryKind,
    pub message: String,
}

/// Progress-bar fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayProgress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub water_intake: f64,
}

/// Fixed-point accumulator in tenths of a unit.
///
/// Logged nutrients carry at most one decimal, so summing in tenths is exact and
/// independent of how entries are grouped into meals. Conversion and addition
/// saturate instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tenths(i64);

impl Tenths {
    pub(crate) fn of(value: f64) -> Self {
        Tenths((value * 10.0).round() as i64)
    }

    pub(crate) fn value(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

impl Add for Tenths {
    type Output = Tenths;

    fn add(self, other: Tenths) -> Tenths {
        Tenths(self.0.saturating_add(other.0))
    }
}

use thiserror::Error;

/// Validation failures raised by the nutrition engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("progress is undefined for a zero goal")]
    DivisionUndefined,

    #[error("invalid water amount: {0}")]
    InvalidWaterAmount(String),

    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}

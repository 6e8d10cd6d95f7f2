use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{FoodRow, GoalsRow, MealRow};
use super::{
    FoodCatalogRepository, GoalsRepository, MealRepository, WaterIntakeRepository, SEARCH_LIMIT,
};
use crate::nutrition::{FoodRecord, Meal, NewFoodRecord, NutritionGoals};

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl FoodCatalogRepository for PgRepository {
    async fn search(&self, owner: Uuid, query: &str) -> anyhow::Result<Vec<FoodRecord>> {
        let rows = sqlx::query_as::<_, FoodRow>(
            r#"
            SELECT id, name, calories_per_100, protein_per_100, carbs_per_100, fats_per_100,
                   owner_id, is_custom
            FROM foods
            WHERE (owner_id IS NULL OR owner_id = $1)
              AND name ILIKE $2
            ORDER BY name
            LIMIT $3
            "#,
        )
        .bind(owner)
        .bind(like_pattern(query))
        .bind(SEARCH_LIMIT as i64)
        .fetch_all(&self.db)
        .await
        .context("search foods")?;
        Ok(rows.into_iter().map(FoodRecord::from).collect())
    }

    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<FoodRecord>> {
        let row = sqlx::query_as::<_, FoodRow>(
            r#"
            SELECT id, name, calories_per_100, protein_per_100, carbs_per_100, fats_per_100,
                   owner_id, is_custom
            FROM foods
            WHERE id = $1 AND (owner_id IS NULL OR owner_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("get food by id")?;
        Ok(row.map(FoodRecord::from))
    }

    async fn create_custom(&self, owner: Uuid, food: NewFoodRecord) -> anyhow::Result<FoodRecord> {
        let record = food.into_record(owner);
        let row = sqlx::query_as::<_, FoodRow>(
            r#"
            INSERT INTO foods (id, name, calories_per_100, protein_per_100, carbs_per_100,
                               fats_per_100, owner_id, is_custom)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING id, name, calories_per_100, protein_per_100, carbs_per_100, fats_per_100,
                      owner_id, is_custom
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(record.calories_per_100)
        .bind(record.protein_per_100)
        .bind(record.carbs_per_100)
        .bind(record.fats_per_100)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .context("insert custom food")?;
        Ok(row.into())
    }
}

#[async_trait]
impl MealRepository for PgRepository {
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, date, title, slot_time, entries
            FROM meals
            WHERE user_id = $1 AND date = $2
            ORDER BY slot_time, title
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("fetch meals for date")?;
        Ok(rows.into_iter().map(Meal::from).collect())
    }

    async fn seed(&self, meals: Vec<Meal>) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin seed")?;
        for meal in meals {
            sqlx::query(
                r#"
                INSERT INTO meals (id, user_id, date, title, slot_time, entries)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id, date, title) DO NOTHING
                "#,
            )
            .bind(meal.id)
            .bind(meal.user_id)
            .bind(meal.date)
            .bind(&meal.title)
            .bind(&meal.time)
            .bind(Json(&meal.entries))
            .execute(&mut *tx)
            .await
            .context("seed meal slot")?;
        }
        tx.commit().await.context("commit seed")?;
        Ok(())
    }

    async fn save(&self, meal: Meal) -> anyhow::Result<Meal> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meals (id, user_id, date, title, slot_time, entries)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
                SET title = EXCLUDED.title,
                    slot_time = EXCLUDED.slot_time,
                    entries = EXCLUDED.entries,
                    updated_at = now()
                WHERE meals.user_id = EXCLUDED.user_id
            RETURNING id, user_id, date, title, slot_time, entries
            "#,
        )
        .bind(meal.id)
        .bind(meal.user_id)
        .bind(meal.date)
        .bind(&meal.title)
        .bind(&meal.time)
        .bind(Json(&meal.entries))
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("save meal {}", meal.id))?;
        Ok(row.into())
    }

    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM meals WHERE id = $1 AND user_id = $2"#)
            .bind(meal_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete meal")?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl GoalsRepository for PgRepository {
    async fn fetch_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionGoals>> {
        let row = sqlx::query_as::<_, GoalsRow>(
            r#"
            SELECT user_id, protein, carbs, fats, water_intake
            FROM nutrition_goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("fetch nutrition goals")?;
        row.map(NutritionGoals::try_from).transpose()
    }

    async fn save(&self, goals: NutritionGoals) -> anyhow::Result<NutritionGoals> {
        let row = sqlx::query_as::<_, GoalsRow>(
            r#"
            INSERT INTO nutrition_goals (user_id, protein, carbs, fats, calories, water_intake)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
                SET protein = EXCLUDED.protein,
                    carbs = EXCLUDED.carbs,
                    fats = EXCLUDED.fats,
                    calories = EXCLUDED.calories,
                    water_intake = EXCLUDED.water_intake,
                    updated_at = now()
            RETURNING user_id, protein, carbs, fats, water_intake
            "#,
        )
        .bind(goals.user_id())
        .bind(goals.protein())
        .bind(goals.carbs())
        .bind(goals.fats())
        .bind(goals.calories())
        .bind(goals.water_intake())
        .fetch_one(&self.db)
        .await
        .context("save nutrition goals")?;
        row.try_into()
    }
}

#[async_trait]
impl WaterIntakeRepository for PgRepository {
    async fn fetch_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<f64> {
        let amount = sqlx::query_scalar::<_, f64>(
            r#"SELECT amount FROM water_intake WHERE user_id = $1 AND date = $2"#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await
        .context("fetch water intake")?;
        Ok(amount.unwrap_or(0.0))
    }

    async fn save(&self, user_id: Uuid, date: Date, amount: f64) -> anyhow::Result<f64> {
        let amount = sqlx::query_scalar::<_, f64>(
            r#"
            INSERT INTO water_intake (user_id, date, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE
                SET amount = EXCLUDED.amount, updated_at = now()
            RETURNING amount
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(amount)
        .fetch_one(&self.db)
        .await
        .context("save water intake")?;
        Ok(amount)
    }

    async fn increment(
        &self,
        user_id: Uuid,
        date: Date,
        delta: f64,
        cap: f64,
    ) -> anyhow::Result<Option<f64>> {
        // evaluated server-side so concurrent increments compound; a refused
        // update returns no row
        let amount = sqlx::query_scalar::<_, f64>(
            r#"
            INSERT INTO water_intake (user_id, date, amount)
            SELECT $1, $2, $3
            WHERE $3 <= $4
            ON CONFLICT (user_id, date) DO UPDATE
                SET amount = water_intake.amount + EXCLUDED.amount, updated_at = now()
                WHERE water_intake.amount + EXCLUDED.amount <= $4
            RETURNING amount
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(delta)
        .bind(cap)
        .fetch_optional(&self.db)
        .await
        .context("increment water intake")?;
        Ok(amount)
    }
}

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, JwtConfig};
use crate::notify::{AdvisoryNotifier, TracingNotifier};
use crate::repo::memory::{
    MemoryFoodCatalog, MemoryGoalsRepository, MemoryMealRepository, MemoryWaterIntakeRepository,
};
use crate::repo::pg::PgRepository;
use crate::repo::{FoodCatalogRepository, GoalsRepository, MealRepository, WaterIntakeRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub foods: Arc<dyn FoodCatalogRepository>,
    pub meals: Arc<dyn MealRepository>,
    pub goals: Arc<dyn GoalsRepository>,
    pub water: Arc<dyn WaterIntakeRepository>,
    pub notifier: Arc<dyn AdvisoryNotifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(database_url) = config.database_url.as_deref() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config));
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }
        info!("connected to postgres");

        let pg = Arc::new(PgRepository::new(db));
        Ok(Self {
            config,
            foods: pg.clone(),
            meals: pg.clone(),
            goals: pg.clone(),
            water: pg,
            notifier: Arc::new(TracingNotifier),
        })
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            foods: Arc::new(MemoryFoodCatalog::with_samples()),
            meals: Arc::new(MemoryMealRepository::default()),
            goals: Arc::new(MemoryGoalsRepository::default()),
            water: Arc::new(MemoryWaterIntakeRepository::default()),
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
        });
        Self::in_memory(config)
    }
}

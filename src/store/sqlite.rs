use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::{RecordStore, StoreError};
use crate::config::DatabaseConfig;
use crate::models::{NutrientPatch, RecordId, StoredRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS food_items (
    id TEXT UNIQUE,
    name TEXT,
    calories REAL,
    protein REAL,
    fat REAL,
    carbs REAL,
    sugar REAL,
    fiber REAL,
    sodium REAL,
    cholesterol REAL,
    serving_size REAL,
    serving_unit TEXT,
    nutrition_source TEXT,
    updated_at TEXT
)
"#;

const SELECT_COLUMNS: &str = "id, name, calories, protein, fat, carbs, sugar, fiber, sodium, \
     cholesterol, serving_size, serving_unit, nutrition_source";

/// Record store over an SQLite `food_items` table
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await?;

        info!(max_connections = max_connections, "Connected to record store");
        Ok(Self { pool })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::connect(&config.url, config.max_connections).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO food_items (id, name, calories, protein, fat, carbs, sugar, fiber, \
             sodium, cholesterol, serving_size, serving_unit, nutrition_source, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_ref().map(RecordId::as_str))
        .bind(record.name.as_deref())
        .bind(record.calories)
        .bind(record.protein)
        .bind(record.fat)
        .bind(record.carbs)
        .bind(record.sugar)
        .bind(record.fiber)
        .bind(record.sodium)
        .bind(record.cholesterol)
        .bind(record.serving_size)
        .bind(record.serving_unit.as_deref())
        .bind(record.nutrition_source.as_deref())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 AS health").fetch_one(&self.pool).await?;
        let health: i64 = row.try_get("health")?;
        Ok(health == 1)
    }
}

/// Rows from older app versions can carry NULLs or wrongly typed values in
/// any column, so every field is decoded leniently.
fn record_from_row(row: &SqliteRow) -> StoredRecord {
    let real = |column: &str| row.try_get::<Option<f64>, _>(column).ok().flatten();
    let text = |column: &str| row.try_get::<Option<String>, _>(column).ok().flatten();

    StoredRecord {
        id: text("id").map(RecordId::new),
        name: text("name"),
        calories: real("calories"),
        protein: real("protein"),
        fat: real("fat"),
        carbs: real("carbs"),
        sugar: real("sugar"),
        fiber: real("fiber"),
        sodium: real("sodium"),
        cholesterol: real("cholesterol"),
        serving_size: real("serving_size"),
        serving_unit: text("serving_unit"),
        nutrition_source: text("nutrition_source"),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn query_by_provenance(&self, tag: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM food_items \
             WHERE instr(LOWER(nutrition_source), ?) > 0"
        );
        let rows = sqlx::query(&sql)
            .bind(tag.to_lowercase())
            .fetch_all(&self.pool)
            .await?;

        debug!(tag = tag, rows = rows.len(), "Queried records by provenance");
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn get(&self, id: &RecordId) -> Result<Option<StoredRecord>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM food_items WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn update(&self, id: &RecordId, patch: &NutrientPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE food_items SET \
                calories = ?, protein = ?, fat = ?, carbs = ?, \
                sugar = COALESCE(?, sugar), \
                fiber = COALESCE(?, fiber), \
                sodium = COALESCE(?, sodium), \
                cholesterol = COALESCE(?, cholesterol), \
                nutrition_source = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(patch.calories)
        .bind(patch.protein)
        .bind(patch.fat)
        .bind(patch.carbs)
        .bind(patch.sugar)
        .bind(patch.fiber)
        .bind(patch.sodium)
        .bind(patch.cholesterol)
        .bind(patch.nutrition_source.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

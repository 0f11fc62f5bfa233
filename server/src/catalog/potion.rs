//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Potion catalog
//!
//! Potion effects are stored as a JSON document.

use crate::error::{ServiceError, ServiceResult};
use questkeep_common::{Potion, PotionFields};
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Potion catalog service
#[derive(Clone)]
pub struct PotionService {
    pool: SqlitePool,
}

impl PotionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, fields: PotionFields) -> ServiceResult<Potion> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let potion = Potion {
            id: fields.id.unwrap_or_else(Uuid::new_v4),
            name: fields.name,
            effects: fields.effects,
            utility: fields.utility,
        };

        sqlx::query("INSERT INTO potions (id, name, effects, utility) VALUES (?, ?, ?, ?)")
            .bind(potion.id)
            .bind(&potion.name)
            .bind(Json(&potion.effects))
            .bind(&potion.utility)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, "Potion already exists"))?;

        tracing::info!("Created potion {} ({})", potion.name, potion.id);
        Ok(potion)
    }

    pub async fn search_by_id(&self, id: Uuid) -> ServiceResult<Option<Potion>> {
        Ok(
            sqlx::query_as::<_, Potion>("SELECT id, name, effects, utility FROM potions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: Uuid, fields: PotionFields) -> ServiceResult<bool> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let result =
            sqlx::query("UPDATE potions SET name = ?, effects = ?, utility = ? WHERE id = ?")
                .bind(&fields.name)
                .bind(Json(&fields.effects))
                .bind(&fields.utility)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM potions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Potion>> {
        Ok(
            sqlx::query_as::<_, Potion>("SELECT id, name, effects, utility FROM potions")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

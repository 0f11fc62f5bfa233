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


//! Weapon catalog

use crate::error::{ServiceError, ServiceResult};
use questkeep_common::{Weapon, WeaponFields};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Weapon catalog service
#[derive(Clone)]
pub struct WeaponService {
    pool: SqlitePool,
}

impl WeaponService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a weapon, generating an id when none is supplied
    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, fields: WeaponFields) -> ServiceResult<Weapon> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let weapon = Weapon {
            id: fields.id.unwrap_or_else(Uuid::new_v4),
            name: fields.name,
            category: fields.category,
            damage: fields.damage,
        };

        sqlx::query("INSERT INTO weapons (id, name, category, damage) VALUES (?, ?, ?, ?)")
            .bind(weapon.id)
            .bind(&weapon.name)
            .bind(&weapon.category)
            .bind(weapon.damage)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, "Weapon already exists"))?;

        tracing::info!("Created weapon {} ({})", weapon.name, weapon.id);
        Ok(weapon)
    }

    pub async fn search_by_id(&self, id: Uuid) -> ServiceResult<Option<Weapon>> {
        Ok(
            sqlx::query_as::<_, Weapon>("SELECT id, name, category, damage FROM weapons WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: Uuid, fields: WeaponFields) -> ServiceResult<bool> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let result = sqlx::query("UPDATE weapons SET name = ?, category = ?, damage = ? WHERE id = ?")
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.damage)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM weapons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Weapon>> {
        Ok(
            sqlx::query_as::<_, Weapon>("SELECT id, name, category, damage FROM weapons")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

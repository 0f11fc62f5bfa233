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


//! Gear (armour) catalog

use crate::error::{ServiceError, ServiceResult};
use questkeep_common::{Gear, GearFields};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct GearService {
    pool: SqlitePool,
}

impl GearService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, fields: GearFields) -> ServiceResult<Gear> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let gear = Gear {
            id: fields.id.unwrap_or_else(Uuid::new_v4),
            name: fields.name,
            category: fields.category,
            armour: fields.armour,
        };

        sqlx::query("INSERT INTO gears (id, name, category, armour) VALUES (?, ?, ?, ?)")
            .bind(gear.id)
            .bind(&gear.name)
            .bind(&gear.category)
            .bind(gear.armour)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, "Gear already exists"))?;

        tracing::info!("Created gear {} ({})", gear.name, gear.id);
        Ok(gear)
    }

    pub async fn search_by_id(&self, id: Uuid) -> ServiceResult<Option<Gear>> {
        Ok(
            sqlx::query_as::<_, Gear>("SELECT id, name, category, armour FROM gears WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: Uuid, fields: GearFields) -> ServiceResult<bool> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let result = sqlx::query("UPDATE gears SET name = ?, category = ?, armour = ? WHERE id = ?")
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.armour)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM gears WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Gear>> {
        Ok(
            sqlx::query_as::<_, Gear>("SELECT id, name, category, armour FROM gears")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

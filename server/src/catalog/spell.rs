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


//! Spell catalog

use crate::error::{ServiceError, ServiceResult};
use questkeep_common::{Spell, SpellFields};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Spell catalog service
#[derive(Clone)]
pub struct SpellService {
    pool: SqlitePool,
}

impl SpellService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a spell, generating an id when none is supplied
    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, fields: SpellFields) -> ServiceResult<Spell> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let spell = Spell {
            id: fields.id.unwrap_or_else(Uuid::new_v4),
            name: fields.name,
            description: fields.description,
            mana_cost: fields.mana_cost,
            damage: fields.damage,
            duration: fields.duration,
        };

        sqlx::query("INSERT INTO spells (id, name, description, manaCost, damage, duration) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(spell.id)
            .bind(&spell.name)
            .bind(&spell.description)
            .bind(spell.mana_cost)
            .bind(spell.damage)
            .bind(spell.duration)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, "Spell already exists"))?;

        tracing::info!("Created spell {} ({})", spell.name, spell.id);
        Ok(spell)
    }

    pub async fn search_by_id(&self, id: Uuid) -> ServiceResult<Option<Spell>> {
        Ok(
            sqlx::query_as::<_, Spell>("SELECT id, name, description, manaCost AS mana_cost, damage, duration FROM spells WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: Uuid, fields: SpellFields) -> ServiceResult<bool> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let result = sqlx::query("UPDATE spells SET name = ?, description = ?, manaCost = ?, damage = ?, duration = ? WHERE id = ?")
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.mana_cost)
        .bind(fields.damage)
        .bind(fields.duration)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM spells WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Spell>> {
        Ok(
            sqlx::query_as::<_, Spell>("SELECT id, name, description, manaCost AS mana_cost, damage, duration FROM spells")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

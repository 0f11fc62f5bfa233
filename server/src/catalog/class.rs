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


//! Class catalog

use crate::error::{ServiceError, ServiceResult};
use questkeep_common::{Class, ClassFields};
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

pub const CLASS_NAME_TAKEN: &str = "Class name already exists";

/// Load a class through any executor, so transactions can re-check roles
pub(crate) async fn find_class<'e, E>(executor: E, id: Uuid) -> Result<Option<Class>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Class>("SELECT id, name, description, attributes FROM classes WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Class catalog service
#[derive(Clone)]
pub struct ClassService {
    pool: SqlitePool,
}

impl ClassService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a class. Names are unique across classes.
    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, fields: ClassFields) -> ServiceResult<Class> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM classes WHERE name = ?")
            .bind(&fields.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            tracing::debug!("Class name {} already taken", fields.name);
            return Err(ServiceError::conflict(CLASS_NAME_TAKEN));
        }

        let class = Class {
            id: fields.id.unwrap_or_else(Uuid::new_v4),
            name: fields.name,
            description: fields.description,
            attributes: fields.attributes,
        };

        // The UNIQUE constraint settles races the pre-check cannot see.
        sqlx::query("INSERT INTO classes (id, name, description, attributes) VALUES (?, ?, ?, ?)")
            .bind(class.id)
            .bind(&class.name)
            .bind(&class.description)
            .bind(Json(&class.attributes))
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, CLASS_NAME_TAKEN))?;

        tracing::info!("Created class {} ({})", class.name, class.id);
        Ok(class)
    }

    pub async fn search_by_id(&self, id: Uuid) -> ServiceResult<Option<Class>> {
        Ok(find_class(&self.pool, id).await?)
    }

    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: Uuid, fields: ClassFields) -> ServiceResult<bool> {
        fields.validate().map_err(ServiceError::Invalid)?;

        let result = sqlx::query(
            "UPDATE classes SET name = ?, description = ?, attributes = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(Json(&fields.attributes))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::on_duplicate(e, CLASS_NAME_TAKEN))?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Class>> {
        Ok(
            sqlx::query_as::<_, Class>("SELECT id, name, description, attributes FROM classes")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

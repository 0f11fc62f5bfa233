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


//! Association (join table) plumbing shared by the aggregate services

use sqlx::{Sqlite, SqliteConnection};
use std::collections::HashSet;
use uuid::Uuid;

/// A many-to-many association owned by a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Gear,
    Potions,
    Weapons,
    Spells,
}

impl Link {
    pub fn table(&self) -> &'static str {
        match self {
            Link::Gear => "character_gear",
            Link::Potions => "character_potions",
            Link::Weapons => "character_weapons",
            Link::Spells => "wizard_spells",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Link::Gear => "gear_id",
            Link::Potions => "potion_id",
            Link::Weapons => "weapon_id",
            Link::Spells => "spell_id",
        }
    }
}

/// Whether the `(owner, member)` row exists
pub async fn exists<'e, E>(executor: E, link: Link, owner: Uuid, member: Uuid) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT character_id FROM {} WHERE character_id = ? AND {} = ?",
        link.table(),
        link.column()
    );
    let row: Option<(Uuid,)> = sqlx::query_as(&sql)
        .bind(owner)
        .bind(member)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

pub async fn insert<'e, E>(executor: E, link: Link, owner: Uuid, member: Uuid) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO {} (character_id, {}) VALUES (?, ?)",
        link.table(),
        link.column()
    );
    sqlx::query(&sql)
        .bind(owner)
        .bind(member)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove exactly the `(owner, member)` row. Returns whether a row was removed.
pub async fn remove<'e, E>(executor: E, link: Link, owner: Uuid, member: Uuid) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "DELETE FROM {} WHERE character_id = ? AND {} = ?",
        link.table(),
        link.column()
    );
    let result = sqlx::query(&sql)
        .bind(owner)
        .bind(member)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Remove every row owned by `owner`
pub async fn clear(conn: &mut SqliteConnection, link: Link, owner: Uuid) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE character_id = ?", link.table());
    let result = sqlx::query(&sql).bind(owner).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Replace the owner's whole membership with `members`.
///
/// Duplicate ids in `members` are inserted once.
pub async fn replace(
    conn: &mut SqliteConnection,
    link: Link,
    owner: Uuid,
    members: &[Uuid],
) -> Result<(), sqlx::Error> {
    clear(conn, link, owner).await?;

    let mut seen = HashSet::new();
    for member in members.iter().copied().filter(|member| seen.insert(*member)) {
        insert(&mut *conn, link, owner, member).await?;
    }
    Ok(())
}

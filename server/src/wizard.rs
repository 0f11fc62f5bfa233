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


//! Wizard extension service
//!
//! A wizard is a character whose class has the wizard role, composed with a
//! `wizards` extension row (mana pool) and its known spells. Character state is
//! always read and written through [`crate::character`].

use crate::association::{self, Link};
use crate::catalog::{find_class, ClassService, SpellService};
use crate::character::{self, CharacterService};
use crate::error::{ServiceError, ServiceResult};
use crate::persistence;
use metrics::{counter, histogram};
use questkeep_common::rules;
use questkeep_common::{
    Character, ClassRole, CombatReport, NewWizard, Spell, Wizard, WizardUpdate,
};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const WIZARD_NOT_FOUND: &str = "Wizard not found";
pub const INVALID_WIZARD_CLASS: &str = "Invalid class ID for Wizard";
pub const SPELL_ALREADY_ADDED: &str = "Spell already added to this wizard";
pub const NOT_ENOUGH_MANA: &str = "Not enough mana to cast this spell";
pub const MANA_FULL: &str = "Your Mana is full! Keep combat wizard";

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
struct ManaRow {
    character_id: Uuid,
    mana: i32,
    max_mana: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct KnownSpell {
    character_id: Uuid,
    #[sqlx(flatten)]
    spell: Spell,
}

fn compose(character: Character, mana: ManaRow, spells: Vec<Spell>) -> Wizard {
    Wizard {
        character,
        mana: mana.mana,
        max_mana: mana.max_mana,
        spells,
    }
}

async fn find_mana<'e, E>(executor: E, id: Uuid) -> Result<Option<ManaRow>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        "SELECT character_id, mana, maxMana AS max_mana FROM wizards WHERE character_id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

async fn set_mana<'e, E>(executor: E, id: Uuid, mana: i32) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE wizards SET mana = ? WHERE character_id = ?")
        .bind(mana)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

async fn require_wizard_class(conn: &mut SqliteConnection, class_id: Uuid) -> ServiceResult<()> {
    match find_class(&mut *conn, class_id).await? {
        Some(class) if class.role() == ClassRole::Wizard => Ok(()),
        _ => {
            tracing::debug!("Class {} does not have the wizard role", class_id);
            Err(ServiceError::rule(INVALID_WIZARD_CLASS))
        }
    }
}

async fn insert_wizard(conn: &mut SqliteConnection, wizard: &Wizard) -> ServiceResult<()> {
    character::insert_character(&mut *conn, &wizard.character).await?;
    sqlx::query("INSERT INTO wizards (character_id, mana, maxMana) VALUES (?, ?, ?)")
        .bind(wizard.id())
        .bind(wizard.mana)
        .bind(wizard.max_mana)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn apply_wizard_update(
    conn: &mut SqliteConnection,
    id: Uuid,
    update: &WizardUpdate,
) -> ServiceResult<()> {
    character::apply_update(&mut *conn, id, &update.character).await?;
    require_wizard_class(&mut *conn, update.character.class_id).await?;

    let result = sqlx::query("UPDATE wizards SET mana = ?, maxMana = ? WHERE character_id = ?")
        .bind(update.mana)
        .bind(update.max_mana)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found(WIZARD_NOT_FOUND));
    }

    association::replace(conn, Link::Spells, id, &update.spells).await?;
    Ok(())
}

/// Role check first, then spells, the extension row and the character.
///
/// A missing character or extension row is [`ServiceError::NotFound`]; a
/// character of another class is a rule violation and is left untouched.
async fn apply_wizard_delete(conn: &mut SqliteConnection, id: Uuid) -> ServiceResult<()> {
    let class_id: Option<(Uuid,)> = sqlx::query_as("SELECT class_id FROM characters WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some((class_id,)) = class_id else {
        return Err(ServiceError::not_found(WIZARD_NOT_FOUND));
    };
    require_wizard_class(&mut *conn, class_id).await?;

    association::clear(&mut *conn, Link::Spells, id).await?;
    let result = sqlx::query("DELETE FROM wizards WHERE character_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found(WIZARD_NOT_FOUND));
    }

    character::apply_delete(conn, id).await
}

async fn apply_cast(
    conn: &mut SqliteConnection,
    wizard_id: Uuid,
    mana: i32,
    target_id: Uuid,
    hp: i32,
) -> ServiceResult<()> {
    character::set_hp(&mut *conn, target_id, hp).await?;
    set_mana(&mut *conn, wizard_id, mana).await?;
    Ok(())
}

async fn consume_mana_potion(
    conn: &mut SqliteConnection,
    wizard_id: Uuid,
    potion_id: Uuid,
    mana: i32,
) -> ServiceResult<()> {
    set_mana(&mut *conn, wizard_id, mana).await?;
    association::remove(&mut *conn, Link::Potions, wizard_id, potion_id).await?;
    Ok(())
}

/// Wizard extension service
#[derive(Clone)]
pub struct WizardService {
    pool: SqlitePool,
    characters: CharacterService,
    classes: ClassService,
    spells: SpellService,
}

impl WizardService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            characters: CharacterService::new(pool.clone()),
            classes: ClassService::new(pool.clone()),
            spells: SpellService::new(pool.clone()),
            pool,
        }
    }

    /// Create the character row and its mana extension together.
    ///
    /// The class must carry the wizard role.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_wizard(&self, request: NewWizard) -> ServiceResult<Wizard> {
        request.validate().map_err(ServiceError::Invalid)?;

        let mut tx = self.pool.begin().await?;
        let outcome = require_wizard_class(&mut *tx, request.character.class_id).await;
        let outcome = match outcome {
            Ok(()) => {
                let wizard = Wizard {
                    character: character::build_character(request.character),
                    mana: request.mana,
                    max_mana: request.max_mana,
                    spells: Vec::new(),
                };
                insert_wizard(&mut *tx, &wizard).await.map(|()| wizard)
            }
            Err(error) => Err(error),
        };
        let wizard = persistence::finish(tx, "wizard create", outcome).await?;

        tracing::info!("Created wizard {} ({})", wizard.name(), wizard.id());
        Ok(wizard)
    }

    /// Load a wizard, or `None` when the character is missing, its class is
    /// not a wizard class, or it has no extension row
    pub async fn search_wizard_by_id(&self, id: Uuid) -> ServiceResult<Option<Wizard>> {
        let Some(character) = self.characters.search_character_by_id(id).await? else {
            return Ok(None);
        };

        let is_wizard = find_class(&self.pool, character.class_id)
            .await?
            .is_some_and(|class| class.role() == ClassRole::Wizard);
        if !is_wizard {
            return Ok(None);
        }

        let Some(mana) = find_mana(&self.pool, id).await? else {
            return Ok(None);
        };

        let spells = sqlx::query_as(
            "SELECT s.id AS id, s.name AS name, s.description AS description,
                    s.manaCost AS mana_cost, s.damage AS damage, s.duration AS duration
             FROM spells s
             JOIN wizard_spells ws ON ws.spell_id = s.id
             WHERE ws.character_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(compose(character, mana, spells)))
    }

    async fn require_wizard(&self, id: Uuid) -> ServiceResult<Wizard> {
        self.search_wizard_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(WIZARD_NOT_FOUND))
    }

    /// Replace the character state, mana pool and known spells in one
    /// transaction, then return the wizard as stored
    #[tracing::instrument(skip(self, update))]
    pub async fn update_wizard(&self, id: Uuid, update: WizardUpdate) -> ServiceResult<Wizard> {
        update.validate().map_err(ServiceError::Invalid)?;

        let mut tx = self.pool.begin().await?;
        let outcome = apply_wizard_update(&mut *tx, id, &update).await;
        persistence::finish(tx, "wizard update", outcome).await?;

        tracing::info!("Updated wizard {}", id);
        self.require_wizard(id).await
    }

    /// Delete known spells, the extension row and then the character.
    ///
    /// Returns `false` when no such wizard exists. A character whose class is
    /// not a wizard class is rejected and kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_wizard(&self, id: Uuid) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        let outcome = apply_wizard_delete(&mut *tx, id).await;
        match persistence::finish(tx, "wizard delete", outcome).await {
            Ok(()) => {
                tracing::info!("Deleted wizard {}", id);
                Ok(true)
            }
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Every character with an extension row whose class is a wizard class
    pub async fn get_all_wizards(&self) -> ServiceResult<Vec<Wizard>> {
        let wizard_classes: HashSet<Uuid> = self
            .classes
            .get_all()
            .await?
            .into_iter()
            .filter(|class| class.role() == ClassRole::Wizard)
            .map(|class| class.id)
            .collect();
        let characters = self.characters.get_all_characters().await?;

        let mana: Vec<ManaRow> =
            sqlx::query_as("SELECT character_id, mana, maxMana AS max_mana FROM wizards")
                .fetch_all(&self.pool)
                .await?;
        let mana: HashMap<Uuid, ManaRow> =
            mana.into_iter().map(|row| (row.character_id, row)).collect();

        let known: Vec<KnownSpell> = sqlx::query_as(
            "SELECT ws.character_id AS character_id, s.id AS id, s.name AS name,
                    s.description AS description, s.manaCost AS mana_cost,
                    s.damage AS damage, s.duration AS duration
             FROM wizard_spells ws
             JOIN spells s ON s.id = ws.spell_id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut spells: HashMap<Uuid, Vec<Spell>> = HashMap::new();
        for row in known {
            spells.entry(row.character_id).or_default().push(row.spell);
        }

        Ok(characters
            .into_iter()
            .filter(|character| wizard_classes.contains(&character.class_id))
            .filter_map(|character| {
                let row = *mana.get(&character.id)?;
                let known = spells.remove(&character.id).unwrap_or_default();
                Some(compose(character, row, known))
            })
            .collect())
    }

    /// Teach a wizard a spell
    #[tracing::instrument(skip(self))]
    pub async fn add_spell(&self, wizard_id: Uuid, spell_id: Uuid) -> ServiceResult<Wizard> {
        let mut wizard = self.require_wizard(wizard_id).await?;
        let spell = self
            .spells
            .search_by_id(spell_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Spell not found"))?;

        if association::exists(&self.pool, Link::Spells, wizard_id, spell_id).await? {
            return Err(ServiceError::conflict(SPELL_ALREADY_ADDED));
        }
        association::insert(&self.pool, Link::Spells, wizard_id, spell_id)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, SPELL_ALREADY_ADDED))?;

        tracing::info!("Wizard {} learned {}", wizard.name(), spell.name);
        wizard.spells.push(spell);
        Ok(wizard)
    }

    /// Cast a known spell at `target_id`, spending its mana cost
    #[tracing::instrument(skip(self))]
    pub async fn cast_spell(
        &self,
        wizard_id: Uuid,
        target_id: Uuid,
        spell_id: Uuid,
    ) -> ServiceResult<CombatReport> {
        let wizard = self.require_wizard(wizard_id).await?;
        self.spells
            .search_by_id(spell_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Spell not found"))?;

        let spell = wizard.spell(spell_id).ok_or_else(|| {
            ServiceError::rule("Spell not found or does not belong to the attacker")
        })?;

        if wizard.mana < spell.mana_cost {
            tracing::debug!(
                "Wizard {} has {} mana, {} needs {}",
                wizard.name(),
                wizard.mana,
                spell.name,
                spell.mana_cost
            );
            return Err(ServiceError::rule(NOT_ENOUGH_MANA));
        }

        let target = self
            .characters
            .search_character_by_id(target_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Target not found"))?;

        let damage = rules::spell_damage(spell);
        let hp = rules::deplete(target.hp, damage);
        let mana = rules::deplete(wizard.mana, spell.mana_cost);

        let mut tx = self.pool.begin().await?;
        let outcome = apply_cast(&mut *tx, wizard_id, mana, target_id, hp).await;
        persistence::finish(tx, "spell cast", outcome).await?;

        counter!("questkeep_spells_cast_total").increment(1);
        histogram!("questkeep_damage_dealt").record(damage as f64);

        let message = rules::spell_message(wizard.name(), &spell.name, &target.name, damage, hp);
        tracing::info!("{}", message);
        Ok(CombatReport { message })
    }

    /// Drink the first mana potion the wizard carries
    #[tracing::instrument(skip(self))]
    pub async fn restore_mana(&self, wizard_id: Uuid) -> ServiceResult<Wizard> {
        let mut wizard = self.require_wizard(wizard_id).await?;

        let (potion_id, amount) = wizard
            .character
            .mana_potion()
            .and_then(|potion| potion.effects.restores_mana().map(|amount| (potion.id, amount)))
            .ok_or_else(|| ServiceError::not_found("No mana potions available"))?;

        if wizard.mana == wizard.max_mana {
            return Err(ServiceError::rule(MANA_FULL));
        }

        let mana = rules::restore(wizard.mana, amount, wizard.max_mana);

        let mut tx = self.pool.begin().await?;
        let outcome = consume_mana_potion(&mut *tx, wizard_id, potion_id, mana).await;
        persistence::finish(tx, "mana restore", outcome).await?;

        counter!("questkeep_mana_restores_total").increment(1);
        tracing::info!(
            "Wizard {} restored {} mana",
            wizard.name(),
            mana - wizard.mana
        );

        wizard.mana = mana;
        wizard.character.take_potion(potion_id);
        Ok(wizard)
    }
}

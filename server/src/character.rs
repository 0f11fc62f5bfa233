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


//! Character aggregate service
//!
//! Owns the character row and its gear, potion and weapon associations, and
//! applies the combat, healing and equipment rules on top of them.

use crate::association::{self, Link};
use crate::catalog::{ClassService, GearService, PotionService, WeaponService};
use crate::error::{ServiceError, ServiceResult};
use crate::persistence;
use metrics::{counter, histogram};
use questkeep_common::rules;
use questkeep_common::{
    Character, CharacterUpdate, CombatReport, Gear, HealReport, NewCharacter, Potion, Weapon,
};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

pub const CHARACTER_NOT_FOUND: &str = "Character not found";
pub const WEAPON_ALREADY_ADDED: &str = "Weapon already added to this character";
// Gear duplicates have always reported this wording; clients match on it.
pub const GEAR_ALREADY_ADDED: &str = "Weapon already exists in character's inventory";
pub const POTION_ALREADY_ADDED: &str = "Potion already exists in character's inventory";
pub const HP_FULL: &str = "Your HP is full! Keep fighting, warrior!";

const CHARACTER_COLUMNS: &str = "id, name, race, class_id, hp, maxHp AS max_hp, ac";

#[derive(Debug, sqlx::FromRow)]
struct CharacterRow {
    id: Uuid,
    name: String,
    race: String,
    class_id: Uuid,
    hp: i32,
    max_hp: i32,
    ac: i32,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Character {
            id: row.id,
            name: row.name,
            race: row.race,
            class_id: row.class_id,
            hp: row.hp,
            max_hp: row.max_hp,
            ac: row.ac,
            gear: Vec::new(),
            potions: Vec::new(),
            weapons: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OwnedGear {
    character_id: Uuid,
    #[sqlx(flatten)]
    gear: Gear,
}

#[derive(Debug, sqlx::FromRow)]
struct OwnedPotion {
    character_id: Uuid,
    #[sqlx(flatten)]
    potion: Potion,
}

#[derive(Debug, sqlx::FromRow)]
struct OwnedWeapon {
    character_id: Uuid,
    #[sqlx(flatten)]
    weapon: Weapon,
}

/// Build the aggregate for a creation request. Associations start empty.
pub(crate) fn build_character(request: NewCharacter) -> Character {
    Character {
        id: request.id.unwrap_or_else(Uuid::new_v4),
        name: request.name,
        race: request.race,
        class_id: request.class_id,
        hp: request.hp,
        max_hp: request.max_hp,
        ac: request.ac,
        gear: Vec::new(),
        potions: Vec::new(),
        weapons: Vec::new(),
    }
}

pub(crate) async fn insert_character<'e, E>(executor: E, character: &Character) -> ServiceResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO characters (id, name, race, class_id, hp, maxHp, ac) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(character.id)
    .bind(&character.name)
    .bind(&character.race)
    .bind(character.class_id)
    .bind(character.hp)
    .bind(character.max_hp)
    .bind(character.ac)
    .execute(executor)
    .await
    .map_err(|e| ServiceError::on_duplicate(e, "Character already exists"))?;
    Ok(())
}

pub(crate) async fn set_hp<'e, E>(executor: E, id: Uuid, hp: i32) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE characters SET hp = ? WHERE id = ?")
        .bind(hp)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Replace scalars, then gear, potions and weapons, in that order.
///
/// A missing character is reported as [`ServiceError::Concealed`].
pub(crate) async fn apply_update(
    conn: &mut SqliteConnection,
    id: Uuid,
    update: &CharacterUpdate,
) -> ServiceResult<()> {
    let result = sqlx::query(
        "UPDATE characters SET name = ?, race = ?, class_id = ?, hp = ?, maxHp = ?, ac = ? WHERE id = ?",
    )
    .bind(&update.name)
    .bind(&update.race)
    .bind(update.class_id)
    .bind(update.hp)
    .bind(update.max_hp)
    .bind(update.ac)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Character {} not found for update", id);
        return Err(ServiceError::Concealed);
    }

    association::replace(conn, Link::Gear, id, &update.gear).await?;
    association::replace(conn, Link::Potions, id, &update.potions).await?;
    association::replace(conn, Link::Weapons, id, &update.weapons).await?;
    Ok(())
}

/// Delete associations first, then the character row
pub(crate) async fn apply_delete(conn: &mut SqliteConnection, id: Uuid) -> ServiceResult<()> {
    association::clear(conn, Link::Gear, id).await?;
    association::clear(conn, Link::Potions, id).await?;
    association::clear(conn, Link::Weapons, id).await?;

    let result = sqlx::query("DELETE FROM characters WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found(CHARACTER_NOT_FOUND));
    }
    Ok(())
}

async fn equip_gear(conn: &mut SqliteConnection, id: Uuid, gear_id: Uuid, ac: i32) -> ServiceResult<()> {
    association::insert(&mut *conn, Link::Gear, id, gear_id)
        .await
        .map_err(|e| ServiceError::on_duplicate(e, GEAR_ALREADY_ADDED))?;

    sqlx::query("UPDATE characters SET ac = ? WHERE id = ?")
        .bind(ac)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn consume_healing(conn: &mut SqliteConnection, id: Uuid, potion_id: Uuid, hp: i32) -> ServiceResult<()> {
    set_hp(&mut *conn, id, hp).await?;
    association::remove(&mut *conn, Link::Potions, id, potion_id).await?;
    Ok(())
}

fn group_by_owner<T>(rows: impl IntoIterator<Item = (Uuid, T)>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for (owner, item) in rows {
        grouped.entry(owner).or_default().push(item);
    }
    grouped
}

/// Character aggregate service
#[derive(Clone)]
pub struct CharacterService {
    pool: SqlitePool,
    classes: ClassService,
    gear: GearService,
    potions: PotionService,
    weapons: WeaponService,
}

impl CharacterService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            classes: ClassService::new(pool.clone()),
            gear: GearService::new(pool.clone()),
            potions: PotionService::new(pool.clone()),
            weapons: WeaponService::new(pool.clone()),
            pool,
        }
    }

    /// Insert a new character with empty associations
    #[tracing::instrument(skip(self, request))]
    pub async fn create_character(&self, request: NewCharacter) -> ServiceResult<Character> {
        request.validate().map_err(ServiceError::Invalid)?;

        let character = build_character(request);
        insert_character(&self.pool, &character).await?;

        tracing::info!("Created character {} ({})", character.name, character.id);
        Ok(character)
    }

    /// Load a character with its gear, potions and weapons inlined
    pub async fn search_character_by_id(&self, id: Uuid) -> ServiceResult<Option<Character>> {
        let row: Option<CharacterRow> =
            sqlx::query_as(&format!("SELECT {} FROM characters WHERE id = ?", CHARACTER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut character = Character::from(row);

        character.potions = sqlx::query_as(
            "SELECT p.id AS id, p.name AS name, p.effects AS effects, p.utility AS utility
             FROM potions p
             JOIN character_potions cp ON cp.potion_id = p.id
             WHERE cp.character_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        character.weapons = sqlx::query_as(
            "SELECT w.id AS id, w.name AS name, w.category AS category, w.damage AS damage
             FROM weapons w
             JOIN character_weapons cw ON cw.weapon_id = w.id
             WHERE cw.character_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        character.gear = sqlx::query_as(
            "SELECT g.id AS id, g.name AS name, g.category AS category, g.armour AS armour
             FROM gears g
             JOIN character_gear cg ON cg.gear_id = g.id
             WHERE cg.character_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(character))
    }

    async fn require_character(&self, id: Uuid, message: &str) -> ServiceResult<Character> {
        self.search_character_by_id(id).await?.ok_or_else(|| {
            tracing::debug!("Character {} not found", id);
            ServiceError::not_found(message)
        })
    }

    /// Replace a character's scalar fields and all three association sets in
    /// one transaction.
    ///
    /// The lists in `update` are the complete desired membership. A missing
    /// character fails with the generic [`ServiceError::Concealed`].
    #[tracing::instrument(skip(self, update))]
    pub async fn update_character(&self, id: Uuid, update: CharacterUpdate) -> ServiceResult<bool> {
        update.validate().map_err(ServiceError::Invalid)?;

        let mut tx = self.pool.begin().await?;
        let outcome = apply_update(&mut *tx, id, &update).await;
        persistence::finish(tx, "character update", outcome).await?;

        tracing::info!("Updated character {}", id);
        Ok(true)
    }

    /// Delete a character and every association it owns in one transaction.
    ///
    /// Returns `false` when no such character exists.
    #[tracing::instrument(skip(self))]
    pub async fn delete_character(&self, id: Uuid) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        let outcome = apply_delete(&mut *tx, id).await;
        match persistence::finish(tx, "character delete", outcome).await {
            Ok(()) => {
                tracing::info!("Deleted character {}", id);
                Ok(true)
            }
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// All characters with their associations, loaded in four queries
    pub async fn get_all_characters(&self) -> ServiceResult<Vec<Character>> {
        let rows: Vec<CharacterRow> =
            sqlx::query_as(&format!("SELECT {} FROM characters", CHARACTER_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        let gear: Vec<OwnedGear> = sqlx::query_as(
            "SELECT cg.character_id AS character_id, g.id AS id, g.name AS name,
                    g.category AS category, g.armour AS armour
             FROM character_gear cg
             JOIN gears g ON g.id = cg.gear_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let potions: Vec<OwnedPotion> = sqlx::query_as(
            "SELECT cp.character_id AS character_id, p.id AS id, p.name AS name,
                    p.effects AS effects, p.utility AS utility
             FROM character_potions cp
             JOIN potions p ON p.id = cp.potion_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let weapons: Vec<OwnedWeapon> = sqlx::query_as(
            "SELECT cw.character_id AS character_id, w.id AS id, w.name AS name,
                    w.category AS category, w.damage AS damage
             FROM character_weapons cw
             JOIN weapons w ON w.id = cw.weapon_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut gear = group_by_owner(gear.into_iter().map(|row| (row.character_id, row.gear)));
        let mut potions =
            group_by_owner(potions.into_iter().map(|row| (row.character_id, row.potion)));
        let mut weapons =
            group_by_owner(weapons.into_iter().map(|row| (row.character_id, row.weapon)));

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut character = Character::from(row);
                character.gear = gear.remove(&character.id).unwrap_or_default();
                character.potions = potions.remove(&character.id).unwrap_or_default();
                character.weapons = weapons.remove(&character.id).unwrap_or_default();
                character
            })
            .collect())
    }

    /// Attach a weapon to a character
    #[tracing::instrument(skip(self))]
    pub async fn add_weapon(&self, character_id: Uuid, weapon_id: Uuid) -> ServiceResult<Character> {
        let mut character = self.require_character(character_id, CHARACTER_NOT_FOUND).await?;
        let weapon = self
            .weapons
            .search_by_id(weapon_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Weapon not found"))?;

        if association::exists(&self.pool, Link::Weapons, character_id, weapon_id).await? {
            return Err(ServiceError::conflict(WEAPON_ALREADY_ADDED));
        }
        association::insert(&self.pool, Link::Weapons, character_id, weapon_id)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, WEAPON_ALREADY_ADDED))?;

        tracing::info!("Character {} took weapon {}", character.name, weapon.name);
        character.weapons.push(weapon);
        Ok(character)
    }

    /// Attach gear to a character and raise its armor class by the gear's
    /// category, capped at 1000
    #[tracing::instrument(skip(self))]
    pub async fn add_gear(&self, character_id: Uuid, gear_id: Uuid) -> ServiceResult<Character> {
        let mut character = self.require_character(character_id, CHARACTER_NOT_FOUND).await?;
        let gear = self
            .gear
            .search_by_id(gear_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Gear not found"))?;

        if association::exists(&self.pool, Link::Gear, character_id, gear_id).await? {
            return Err(ServiceError::conflict(GEAR_ALREADY_ADDED));
        }

        let ac = rules::equip_armor_class(character.ac, &gear.category);
        let mut tx = self.pool.begin().await?;
        let outcome = equip_gear(&mut *tx, character_id, gear_id, ac).await;
        persistence::finish(tx, "gear equip", outcome).await?;

        tracing::info!(
            "Character {} equipped {} ({}), AC {} -> {}",
            character.name,
            gear.name,
            gear.category,
            character.ac,
            ac
        );
        character.ac = ac;
        character.gear.push(gear);
        Ok(character)
    }

    /// Attach a potion to a character
    #[tracing::instrument(skip(self))]
    pub async fn add_potion(&self, character_id: Uuid, potion_id: Uuid) -> ServiceResult<Character> {
        let mut character = self.require_character(character_id, CHARACTER_NOT_FOUND).await?;
        let potion = self
            .potions
            .search_by_id(potion_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Potion not found"))?;

        if association::exists(&self.pool, Link::Potions, character_id, potion_id).await? {
            return Err(ServiceError::conflict(POTION_ALREADY_ADDED));
        }
        association::insert(&self.pool, Link::Potions, character_id, potion_id)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, POTION_ALREADY_ADDED))?;

        character.potions.push(potion);
        Ok(character)
    }

    /// Strike `target_id` with one of the attacker's own weapons
    #[tracing::instrument(skip(self))]
    pub async fn attack(
        &self,
        attacker_id: Uuid,
        target_id: Uuid,
        weapon_id: Uuid,
    ) -> ServiceResult<CombatReport> {
        let attacker = self.search_character_by_id(attacker_id).await?;
        let target = self.search_character_by_id(target_id).await?;
        let (Some(attacker), Some(mut target)) = (attacker, target) else {
            return Err(ServiceError::not_found("Character not Found"));
        };

        let weapon = attacker.weapon(weapon_id).ok_or_else(|| {
            ServiceError::rule("Weapon not found or does not belong to the attacker")
        })?;

        let class = self
            .classes
            .search_by_id(attacker.class_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Class not found"))?;

        let strike = rules::strike(weapon, target.ac, rules::class_bonus(&class));
        target.hp = rules::deplete(target.hp, strike.total());
        set_hp(&self.pool, target.id, target.hp).await?;

        counter!("questkeep_attacks_total").increment(1);
        histogram!("questkeep_damage_dealt").record(strike.total() as f64);

        let message =
            rules::attack_message(&attacker.name, &target.name, &weapon.name, &strike, target.hp);
        tracing::info!("{}", message);
        Ok(CombatReport { message })
    }

    /// Drink the first healing potion the character carries
    #[tracing::instrument(skip(self))]
    pub async fn heal(&self, character_id: Uuid) -> ServiceResult<HealReport> {
        let mut character = self.require_character(character_id, CHARACTER_NOT_FOUND).await?;

        let (potion_id, amount) = character
            .healing_potion()
            .and_then(|potion| potion.effects.restores_hp().map(|amount| (potion.id, amount)))
            .ok_or_else(|| ServiceError::not_found("Potion does not exist in character's inventory"))?;

        if character.hp == character.max_hp {
            return Err(ServiceError::rule(HP_FULL));
        }

        let hp = rules::restore(character.hp, amount, character.max_hp);
        let restored = hp - character.hp;

        let mut tx = self.pool.begin().await?;
        let outcome = consume_healing(&mut *tx, character_id, potion_id, hp).await;
        persistence::finish(tx, "heal", outcome).await?;

        counter!("questkeep_heals_total").increment(1);

        character.hp = hp;
        character.take_potion(potion_id);
        let message = rules::heal_message(&character.name, restored);
        tracing::info!("{}", message);
        Ok(HealReport { message, character })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_owner() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let grouped = group_by_owner(vec![(a, 1), (b, 2), (a, 3)]);

        assert_eq!(grouped[&a], vec![1, 3]);
        assert_eq!(grouped[&b], vec![2]);
        assert!(!grouped.contains_key(&Uuid::new_v4()));
    }

    #[test]
    fn test_build_character_generates_id() {
        let request = NewCharacter {
            id: None,
            name: "Conan".to_string(),
            race: "Human".to_string(),
            class_id: Uuid::new_v4(),
            hp: 100,
            max_hp: 100,
            ac: 0,
        };
        let character = build_character(request.clone());
        assert!(!character.id.is_nil());
        assert!(character.weapons.is_empty());

        let id = Uuid::new_v4();
        let character = build_character(NewCharacter {
            id: Some(id),
            ..request
        });
        assert_eq!(character.id, id);
    }
}

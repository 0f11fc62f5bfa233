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


//! Test utilities for store-backed testing

use crate::catalog::{
    ClassService, GearService, PotionService, SpellService, WeaponService,
};
use crate::character::CharacterService;
use crate::persistence;
use crate::wizard::WizardService;
use questkeep_common::{
    Character, Class, ClassAttributes, ClassFields, Gear, GearFields, NewCharacter, NewWizard,
    Potion, PotionEffects, PotionFields, Spell, SpellFields, Weapon, WeaponFields, Wizard,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use uuid::Uuid;

/// Create a private in-memory database with the schema applied.
///
/// The pool holds exactly one connection for its whole lifetime, since each
/// in-memory connection is a separate database.
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    persistence::bootstrap_schema(&pool)
        .await
        .expect("Failed to bootstrap schema");
    pool
}

pub async fn create_test_class(pool: &SqlitePool, name: &str, strength: i32, dexterity: i32) -> Class {
    ClassService::new(pool.clone())
        .create(ClassFields {
            id: None,
            name: name.to_string(),
            description: format!("{} class", name),
            attributes: ClassAttributes {
                strength,
                dexterity,
                ..Default::default()
            },
        })
        .await
        .expect("Failed to create class")
}

pub async fn create_test_weapon(pool: &SqlitePool, name: &str, damage: i32) -> Weapon {
    WeaponService::new(pool.clone())
        .create(WeaponFields {
            id: None,
            name: name.to_string(),
            category: "sword".to_string(),
            damage,
        })
        .await
        .expect("Failed to create weapon")
}

pub async fn create_test_gear(pool: &SqlitePool, name: &str, category: &str) -> Gear {
    GearService::new(pool.clone())
        .create(GearFields {
            id: None,
            name: name.to_string(),
            category: category.to_string(),
            armour: 10,
        })
        .await
        .expect("Failed to create gear")
}

pub async fn create_test_potion(pool: &SqlitePool, name: &str, effects: PotionEffects) -> Potion {
    PotionService::new(pool.clone())
        .create(PotionFields {
            id: None,
            name: name.to_string(),
            effects,
            utility: "restoration".to_string(),
        })
        .await
        .expect("Failed to create potion")
}

/// Potion restoring `amount` HP
pub async fn create_healing_potion(pool: &SqlitePool, amount: i32) -> Potion {
    let effects = PotionEffects {
        hp_restore: Some(amount),
        ..Default::default()
    };
    create_test_potion(pool, &format!("Healing {}", amount), effects).await
}

/// Potion restoring `amount` mana
pub async fn create_mana_potion(pool: &SqlitePool, amount: i32) -> Potion {
    let effects = PotionEffects {
        mana_restore: Some(amount),
        ..Default::default()
    };
    create_test_potion(pool, &format!("Mana {}", amount), effects).await
}

pub async fn create_test_spell(pool: &SqlitePool, name: &str, mana_cost: i32, damage: i32, duration: i32) -> Spell {
    SpellService::new(pool.clone())
        .create(SpellFields {
            id: None,
            name: name.to_string(),
            description: format!("{} spell", name),
            mana_cost,
            damage,
            duration,
        })
        .await
        .expect("Failed to create spell")
}

pub fn new_character(name: &str, class_id: Uuid, hp: i32, ac: i32) -> NewCharacter {
    NewCharacter {
        id: None,
        name: name.to_string(),
        race: "Human".to_string(),
        class_id,
        hp,
        max_hp: hp,
        ac,
    }
}

/// Character at full health (`hp == max_hp`)
pub async fn create_test_character(pool: &SqlitePool, name: &str, class_id: Uuid, hp: i32, ac: i32) -> Character {
    CharacterService::new(pool.clone())
        .create_character(new_character(name, class_id, hp, ac))
        .await
        .expect("Failed to create character")
}

pub async fn create_test_wizard(pool: &SqlitePool, name: &str, class_id: Uuid, mana: i32, max_mana: i32) -> Wizard {
    WizardService::new(pool.clone())
        .create_wizard(NewWizard {
            character: new_character(name, class_id, 1000, 0),
            mana,
            max_mana,
        })
        .await
        .expect("Failed to create wizard")
}

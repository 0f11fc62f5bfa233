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


//! Integration tests for the character aggregate service
//!
//! Covers CRUD with associations, item attachment, combat and healing, and
//! rollback of the transactional mutations.

use questkeep_common::{CharacterUpdate, NewCharacter};
use questkeep_server::test_utils::*;
use questkeep_server::{CharacterService, ServiceError};
use sqlx::SqlitePool;
use uuid::Uuid;

fn update_from(character: &questkeep_common::Character) -> CharacterUpdate {
    CharacterUpdate {
        name: character.name.clone(),
        race: character.race.clone(),
        class_id: character.class_id,
        gear: character.gear.iter().map(|g| g.id).collect(),
        potions: character.potions.iter().map(|p| p.id).collect(),
        weapons: character.weapons.iter().map(|w| w.id).collect(),
        hp: character.hp,
        max_hp: character.max_hp,
        ac: character.ac,
    }
}

async fn count_links(pool: &SqlitePool, table: &str, id: Uuid) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE character_id = ?", table);
    let (count,): (i64,) = sqlx::query_as(&sql).bind(id).fetch_one(pool).await.unwrap();
    count
}

#[tokio::test]
async fn test_create_and_search_character() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let service = CharacterService::new(pool);

    let created = service
        .create_character(new_character("Conan", class.id, 2000, 0))
        .await
        .unwrap();
    assert!(created.gear.is_empty() && created.potions.is_empty() && created.weapons.is_empty());

    let found = service.search_character_by_id(created.id).await.unwrap();
    assert_eq!(found, Some(created));
    assert!(service.search_character_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_character_rejects_invalid_stats() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let service = CharacterService::new(pool);

    let mut request = new_character("Conan", class.id, 100, 0);
    request.hp = 150;
    let err = service.create_character(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));

    let err = service
        .create_character(new_character("Conan", class.id, 100, 1001))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));
    assert!(service.get_all_characters().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_replaces_associations() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let sword = create_test_weapon(&pool, "Sword", 200).await;
    let helm = create_test_gear(&pool, "Helm", "skullcap").await;
    let potion = create_healing_potion(&pool, 100).await;
    let service = CharacterService::new(pool.clone());

    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;
    service.add_weapon(character.id, axe.id).await.unwrap();
    service.add_potion(character.id, potion.id).await.unwrap();

    let mut update = update_from(&character);
    update.name = "Conan the Cimmerian".to_string();
    update.hp = 1500;
    update.weapons = vec![sword.id, sword.id];
    update.gear = vec![helm.id];
    update.potions = vec![];
    assert!(service.update_character(character.id, update).await.unwrap());

    let stored = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Conan the Cimmerian");
    assert_eq!(stored.hp, 1500);
    assert_eq!(stored.weapons, vec![sword]);
    assert_eq!(stored.gear, vec![helm]);
    assert!(stored.potions.is_empty());
}

#[tokio::test]
async fn test_update_missing_character_is_concealed() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;

    let err = service
        .update_character(Uuid::new_v4(), update_from(&character))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Concealed));
    assert_eq!(err.to_string(), "Something went wrong");
}

#[tokio::test]
async fn test_update_failure_rolls_back_everything() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let helm = create_test_gear(&pool, "Helm", "skullcap").await;
    let potion = create_healing_potion(&pool, 100).await;
    let service = CharacterService::new(pool.clone());

    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;
    service.add_weapon(character.id, axe.id).await.unwrap();
    service.add_potion(character.id, potion.id).await.unwrap();
    let before = service.add_gear(character.id, helm.id).await.unwrap();

    // The unknown weapon id violates the foreign key after gear and potions
    // have already been rewritten.
    let mut update = update_from(&before);
    update.name = "Renamed".to_string();
    update.gear = vec![];
    update.potions = vec![];
    update.weapons = vec![Uuid::new_v4()];
    let err = service.update_character(character.id, update).await.unwrap_err();
    assert!(matches!(err, ServiceError::Database(_)));

    let after = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(after.name, "Conan");
    assert_eq!(after.ac, before.ac);
    assert_eq!(after.weapons, vec![axe]);
    assert_eq!(after.gear, vec![helm]);
    assert_eq!(after.potions, vec![potion]);
}

#[tokio::test]
async fn test_delete_character_cascades_associations() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let helm = create_test_gear(&pool, "Helm", "skullcap").await;
    let potion = create_healing_potion(&pool, 100).await;
    let service = CharacterService::new(pool.clone());

    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;
    service.add_weapon(character.id, axe.id).await.unwrap();
    service.add_gear(character.id, helm.id).await.unwrap();
    service.add_potion(character.id, potion.id).await.unwrap();

    assert!(service.delete_character(character.id).await.unwrap());
    assert!(service.search_character_by_id(character.id).await.unwrap().is_none());
    for table in ["character_weapons", "character_gear", "character_potions"] {
        assert_eq!(count_links(&pool, table, character.id).await, 0);
    }

    assert!(!service.delete_character(character.id).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_character_returns_false() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;

    assert!(!service.delete_character(Uuid::new_v4()).await.unwrap());
    assert!(service.search_character_by_id(character.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_failure_rolls_back_associations() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Wizard", 0, 0).await;
    let staff = create_test_weapon(&pool, "Staff", 50).await;
    let potion = create_mana_potion(&pool, 100).await;
    let service = CharacterService::new(pool.clone());

    // The wizard extension row still references the character, so the final
    // delete fails after the association rows are gone.
    let wizard = create_test_wizard(&pool, "Merlin", class.id, 500, 1000).await;
    service.add_weapon(wizard.id(), staff.id).await.unwrap();
    service.add_potion(wizard.id(), potion.id).await.unwrap();

    let err = service.delete_character(wizard.id()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Database(_)));

    let after = service.search_character_by_id(wizard.id()).await.unwrap().unwrap();
    assert_eq!(after.weapons, vec![staff]);
    assert_eq!(after.potions, vec![potion]);
}

#[tokio::test]
async fn test_get_all_characters_groups_associations() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let sword = create_test_weapon(&pool, "Sword", 200).await;
    let service = CharacterService::new(pool.clone());

    let conan = create_test_character(&pool, "Conan", class.id, 2000, 0).await;
    let red = create_test_character(&pool, "Red Sonja", class.id, 2000, 0).await;
    let idle = create_test_character(&pool, "Idle", class.id, 2000, 0).await;
    service.add_weapon(conan.id, axe.id).await.unwrap();
    service.add_weapon(conan.id, sword.id).await.unwrap();
    service.add_weapon(red.id, sword.id).await.unwrap();

    let all = service.get_all_characters().await.unwrap();
    assert_eq!(all.len(), 3);

    let find = |id: Uuid| all.iter().find(|c| c.id == id).unwrap();
    let mut conan_weapons: Vec<_> = find(conan.id).weapons.iter().map(|w| w.name.clone()).collect();
    conan_weapons.sort();
    assert_eq!(conan_weapons, vec!["Axe", "Sword"]);
    assert_eq!(find(red.id).weapons, vec![sword]);
    assert!(find(idle.id).weapons.is_empty());
}

#[tokio::test]
async fn test_add_weapon_errors() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;

    let err = service.add_weapon(Uuid::new_v4(), axe.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Character not found");

    let err = service.add_weapon(character.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Weapon not found");

    let armed = service.add_weapon(character.id, axe.id).await.unwrap();
    assert_eq!(armed.weapons, vec![axe.clone()]);

    let err = service.add_weapon(character.id, axe.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Weapon already added to this character");
}

#[tokio::test]
async fn test_add_gear_raises_armor_class() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let chest = create_test_gear(&pool, "Breastplate", "chestplate").await;
    let boots = create_test_gear(&pool, "Boots", "cleats").await;
    let ring = create_test_gear(&pool, "Ring", "jewelry").await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 100).await;

    let equipped = service.add_gear(character.id, chest.id).await.unwrap();
    assert_eq!(equipped.ac, 500);
    let equipped = service.add_gear(character.id, boots.id).await.unwrap();
    assert_eq!(equipped.ac, 600);
    let equipped = service.add_gear(character.id, ring.id).await.unwrap();
    assert_eq!(equipped.ac, 600);
    assert_eq!(equipped.gear.len(), 3);

    let stored = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(stored.ac, 600);
}

#[tokio::test]
async fn test_add_gear_caps_armor_class() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let chest = create_test_gear(&pool, "Breastplate", "chestplate").await;
    let legs = create_test_gear(&pool, "Greaves", "leggings").await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 800).await;

    let equipped = service.add_gear(character.id, chest.id).await.unwrap();
    assert_eq!(equipped.ac, 1000);
    let equipped = service.add_gear(character.id, legs.id).await.unwrap();
    assert_eq!(equipped.ac, 1000);
}

#[tokio::test]
async fn test_add_gear_duplicate() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let helm = create_test_gear(&pool, "Helm", "skullcap").await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;

    let err = service.add_gear(character.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Gear not found");

    service.add_gear(character.id, helm.id).await.unwrap();
    let err = service.add_gear(character.id, helm.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Weapon already exists in character's inventory");

    let stored = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(stored.ac, 300);
}

#[tokio::test]
async fn test_add_potion_errors() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let potion = create_healing_potion(&pool, 100).await;
    let service = CharacterService::new(pool.clone());
    let character = create_test_character(&pool, "Conan", class.id, 2000, 0).await;

    let err = service.add_potion(character.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Potion not found");

    service.add_potion(character.id, potion.id).await.unwrap();
    let err = service.add_potion(character.id, potion.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Potion already exists in character's inventory");
}

#[tokio::test]
async fn test_attack_with_class_bonus() {
    let pool = create_test_pool().await;
    let barbarian = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let service = CharacterService::new(pool.clone());

    let attacker = create_test_character(&pool, "Conan", barbarian.id, 2000, 0).await;
    let target = create_test_character(&pool, "Thulsa", barbarian.id, 2000, 200).await;
    service.add_weapon(attacker.id, axe.id).await.unwrap();

    let report = service.attack(attacker.id, target.id, axe.id).await.unwrap();
    assert!(report
        .message
        .contains("dealing 300 damage and 50 bonus for a total of 350"));
    assert!(!report.message.contains("defeated"));

    let stored = service.search_character_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 1650);
}

#[tokio::test]
async fn test_attack_halves_against_heavy_armor() {
    let pool = create_test_pool().await;
    let rogue = create_test_class(&pool, "Rogue", 0, 20).await;
    let dagger = create_test_weapon(&pool, "Dagger", 100).await;
    let service = CharacterService::new(pool.clone());

    let attacker = create_test_character(&pool, "Shadow", rogue.id, 2000, 0).await;
    let target = create_test_character(&pool, "Knight", rogue.id, 2000, 100).await;
    service.add_weapon(attacker.id, dagger.id).await.unwrap();

    let report = service.attack(attacker.id, target.id, dagger.id).await.unwrap();
    assert!(report
        .message
        .contains("dealing 50 damage and 20 bonus for a total of 70"));

    let stored = service.search_character_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 1930);
}

#[tokio::test]
async fn test_attack_defeats_target() {
    let pool = create_test_pool().await;
    let barbarian = create_test_class(&pool, "Barbarian", 50, 0).await;
    let fighter = create_test_class(&pool, "Fighter", 99, 99).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let service = CharacterService::new(pool.clone());

    let attacker = create_test_character(&pool, "Conan", barbarian.id, 2000, 0).await;
    let target = create_test_character(&pool, "Goblin", fighter.id, 300, 0).await;
    service.add_weapon(attacker.id, axe.id).await.unwrap();

    let report = service.attack(attacker.id, target.id, axe.id).await.unwrap();
    assert!(report.message.ends_with("has been defeated."));

    let stored = service.search_character_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 0);
    assert!(stored.is_defeated());

    service.attack(attacker.id, target.id, axe.id).await.unwrap();
    let stored = service.search_character_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 0);
}

#[tokio::test]
async fn test_attack_without_bonus_omits_bonus() {
    let pool = create_test_pool().await;
    let fighter = create_test_class(&pool, "Fighter", 99, 99).await;
    let sword = create_test_weapon(&pool, "Sword", 200).await;
    let service = CharacterService::new(pool.clone());

    let attacker = create_test_character(&pool, "Ser", fighter.id, 2000, 0).await;
    let target = create_test_character(&pool, "Dummy", fighter.id, 2000, 0).await;
    service.add_weapon(attacker.id, sword.id).await.unwrap();

    let report = service.attack(attacker.id, target.id, sword.id).await.unwrap();
    assert_eq!(
        report.message,
        "Ser attacked Dummy with Sword, dealing 200 damage for a total of 200"
    );
}

#[tokio::test]
async fn test_attack_errors() {
    let pool = create_test_pool().await;
    let barbarian = create_test_class(&pool, "Barbarian", 50, 0).await;
    let axe = create_test_weapon(&pool, "Axe", 300).await;
    let service = CharacterService::new(pool.clone());

    let attacker = create_test_character(&pool, "Conan", barbarian.id, 2000, 0).await;
    let target = create_test_character(&pool, "Thulsa", barbarian.id, 2000, 0).await;

    let err = service.attack(attacker.id, Uuid::new_v4(), axe.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Character not Found");

    let err = service.attack(attacker.id, target.id, axe.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::RuleViolation(_)));
    assert_eq!(
        err.to_string(),
        "Weapon not found or does not belong to the attacker"
    );

    let stored = service.search_character_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 2000);
}

#[tokio::test]
async fn test_heal_consumes_one_potion() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let small = create_healing_potion(&pool, 80).await;
    let large = create_healing_potion(&pool, 500).await;
    let service = CharacterService::new(pool.clone());

    let character = service
        .create_character(NewCharacter {
            hp: 100,
            max_hp: 150,
            ..new_character("Conan", class.id, 150, 0)
        })
        .await
        .unwrap();
    service.add_potion(character.id, small.id).await.unwrap();
    service.add_potion(character.id, large.id).await.unwrap();

    let report = service.heal(character.id).await.unwrap();
    assert_eq!(report.character.hp, 150);
    assert_eq!(report.character.potions.len(), 1);
    assert_eq!(report.message, "Conan has been healed by 50 HP");

    let stored = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(stored.hp, 150);
    assert_eq!(stored.potions.len(), 1);
    assert_eq!(stored.potions, report.character.potions);
}

#[tokio::test]
async fn test_heal_rejects_full_health() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let potion = create_healing_potion(&pool, 80).await;
    let service = CharacterService::new(pool.clone());

    let character = create_test_character(&pool, "Conan", class.id, 150, 0).await;
    service.add_potion(character.id, potion.id).await.unwrap();

    let err = service.heal(character.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::RuleViolation(_)));
    assert_eq!(err.to_string(), "Your HP is full! Keep fighting, warrior!");

    let stored = service.search_character_by_id(character.id).await.unwrap().unwrap();
    assert_eq!(stored.potions, vec![potion]);
}

#[tokio::test]
async fn test_heal_requires_healing_potion() {
    let pool = create_test_pool().await;
    let class = create_test_class(&pool, "Barbarian", 50, 0).await;
    let mana = create_mana_potion(&pool, 80).await;
    let service = CharacterService::new(pool.clone());

    let character = service
        .create_character(NewCharacter {
            hp: 10,
            max_hp: 150,
            ..new_character("Conan", class.id, 150, 0)
        })
        .await
        .unwrap();
    service.add_potion(character.id, mana.id).await.unwrap();

    let err = service.heal(character.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.to_string(), "Potion does not exist in character's inventory");

    let err = service.heal(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Character not found");
}

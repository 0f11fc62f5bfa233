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


//! Catalog item definitions: weapons, gear, potions and spells
//!
//! Catalog items are reusable definitions. Characters own them only through
//! association rows, never directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weapon definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Weapon {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub damage: i32,
}

/// Armour piece definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Gear {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub armour: i32,
}

/// Effects applied when a potion is consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotionEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp_restore: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_restore: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase_damage: Option<i32>,
}

impl PotionEffects {
    /// HP restored by this potion, if it restores any
    pub fn restores_hp(&self) -> Option<i32> {
        self.hp_restore.filter(|amount| *amount > 0)
    }

    /// Mana restored by this potion, if it restores any
    pub fn restores_mana(&self) -> Option<i32> {
        self.mana_restore.filter(|amount| *amount > 0)
    }
}

/// Potion definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Potion {
    pub id: Uuid,
    pub name: String,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub effects: PotionEffects,
    pub utility: String,
}

/// Spell definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Spell {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub mana_cost: i32,
    pub damage: i32,
    pub duration: i32,
}

/// Field set used to create or replace a weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponFields {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub damage: i32,
}

impl WeaponFields {
    pub fn validate(&self) -> Result<(), String> {
        validate_name("Weapon", &self.name)?;
        if self.damage < 0 {
            return Err("Weapon damage cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Field set used to create or replace a piece of gear
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearFields {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub armour: i32,
}

impl GearFields {
    pub fn validate(&self) -> Result<(), String> {
        validate_name("Gear", &self.name)?;
        if self.armour < 0 {
            return Err("Gear armour cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Field set used to create or replace a potion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotionFields {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub effects: PotionEffects,
    #[serde(default)]
    pub utility: String,
}

impl PotionFields {
    pub fn validate(&self) -> Result<(), String> {
        validate_name("Potion", &self.name)
    }
}

/// Field set used to create or replace a spell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellFields {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mana_cost: i32,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub duration: i32,
}

impl SpellFields {
    pub fn validate(&self) -> Result<(), String> {
        validate_name("Spell", &self.name)?;
        if self.mana_cost < 0 {
            return Err("Spell mana cost cannot be negative".to_string());
        }
        if self.damage < 0 || self.duration < 0 {
            return Err("Spell damage and duration cannot be negative".to_string());
        }
        Ok(())
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} name cannot be empty", kind));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potion_effects_camel_case() {
        let effects: PotionEffects =
            serde_json::from_str(r#"{"hpRestore": 50, "manaRestore": 0}"#).unwrap();

        assert_eq!(effects.restores_hp(), Some(50));
        assert_eq!(effects.restores_mana(), None);
        assert_eq!(effects.increase_damage, None);

        let json = serde_json::to_string(&effects).unwrap();
        assert!(json.contains("hpRestore"));
        assert!(!json.contains("increaseDamage"));
    }

    #[test]
    fn test_spell_serializes_mana_cost() {
        let spell = Spell {
            id: Uuid::new_v4(),
            name: "Fireball".to_string(),
            description: "Burns".to_string(),
            mana_cost: 40,
            damage: 100,
            duration: 2,
        };
        let json = serde_json::to_value(&spell).unwrap();
        assert_eq!(json["manaCost"], 40);
    }

    #[test]
    fn test_field_validation() {
        let weapon = WeaponFields {
            id: None,
            name: "Anduril".to_string(),
            category: "sword".to_string(),
            damage: -1,
        };
        assert!(weapon.validate().is_err());

        let gear = GearFields {
            id: None,
            name: "".to_string(),
            category: "chestplate".to_string(),
            armour: 10,
        };
        assert_eq!(gear.validate(), Err("Gear name cannot be empty".to_string()));

        let spell: SpellFields =
            serde_json::from_str(r#"{"name": "Spark", "manaCost": 5}"#).unwrap();
        assert!(spell.validate().is_ok());
        assert_eq!(spell.damage, 0);
        assert_eq!(spell.duration, 0);
    }
}

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


//! Character aggregate and its request shapes

use crate::item::{Gear, Potion, Weapon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest armor class any character may reach
pub const MAX_ARMOR_CLASS: i32 = 1000;

fn default_hp() -> i32 {
    2000
}

/// Character aggregate: the character row plus the items it owns through
/// association rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: Uuid,
    pub name: String,
    pub race: String,
    pub class_id: Uuid,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    #[serde(default)]
    pub gear: Vec<Gear>,
    #[serde(default)]
    pub potions: Vec<Potion>,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
}

impl Character {
    /// A character with no hit points left is defeated. There is no way back.
    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Owned weapon by id
    pub fn weapon(&self, weapon_id: Uuid) -> Option<&Weapon> {
        self.weapons.iter().find(|weapon| weapon.id == weapon_id)
    }

    /// First owned potion that restores HP
    pub fn healing_potion(&self) -> Option<&Potion> {
        self.potions
            .iter()
            .find(|potion| potion.effects.restores_hp().is_some())
    }

    /// First owned potion that restores mana
    pub fn mana_potion(&self) -> Option<&Potion> {
        self.potions
            .iter()
            .find(|potion| potion.effects.restores_mana().is_some())
    }

    /// Drop a single owned potion by id, returning it if it was held
    pub fn take_potion(&mut self, potion_id: Uuid) -> Option<Potion> {
        let index = self.potions.iter().position(|potion| potion.id == potion_id)?;
        Some(self.potions.remove(index))
    }
}

/// Character creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub race: String,
    pub class_id: Uuid,
    #[serde(default = "default_hp")]
    pub hp: i32,
    #[serde(default = "default_hp")]
    pub max_hp: i32,
    #[serde(default)]
    pub ac: i32,
}

impl NewCharacter {
    pub fn validate(&self) -> Result<(), String> {
        validate_stats(&self.name, self.hp, self.max_hp, self.ac)
    }
}

/// Full replacement of a character's scalar fields and association sets.
///
/// Association lists are the complete desired membership; anything not listed
/// is detached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterUpdate {
    pub name: String,
    pub race: String,
    pub class_id: Uuid,
    #[serde(default)]
    pub gear: Vec<Uuid>,
    #[serde(default)]
    pub potions: Vec<Uuid>,
    #[serde(default)]
    pub weapons: Vec<Uuid>,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
}

impl CharacterUpdate {
    pub fn validate(&self) -> Result<(), String> {
        validate_stats(&self.name, self.hp, self.max_hp, self.ac)
    }
}

fn validate_stats(name: &str, hp: i32, max_hp: i32, ac: i32) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Character name cannot be empty".to_string());
    }
    if max_hp < 0 {
        return Err("Max HP cannot be negative".to_string());
    }
    if hp < 0 || hp > max_hp {
        return Err(format!("HP must be between 0 and {}", max_hp));
    }
    if !(0..=MAX_ARMOR_CLASS).contains(&ac) {
        return Err(format!("AC must be between 0 and {}", MAX_ARMOR_CLASS));
    }
    Ok(())
}

/// Result of an attack or a spell cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub message: String,
}

/// Result of a heal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealReport {
    pub message: String,
    pub character: Character,
}

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


//! Wizard: a character plus a mana pool and known spells

use crate::character::{Character, CharacterUpdate, NewCharacter};
use crate::item::Spell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_mana() -> i32 {
    1000
}

/// A character whose class is a wizard, composed with its extension row and spells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    #[serde(flatten)]
    pub character: Character,
    pub mana: i32,
    pub max_mana: i32,
    #[serde(default)]
    pub spells: Vec<Spell>,
}

impl Wizard {
    pub fn id(&self) -> Uuid {
        self.character.id
    }

    pub fn name(&self) -> &str {
        &self.character.name
    }

    /// Known spell by id
    pub fn spell(&self, spell_id: Uuid) -> Option<&Spell> {
        self.spells.iter().find(|spell| spell.id == spell_id)
    }
}

/// Wizard creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWizard {
    #[serde(flatten)]
    pub character: NewCharacter,
    #[serde(default = "default_mana")]
    pub mana: i32,
    #[serde(default = "default_mana")]
    pub max_mana: i32,
}

impl NewWizard {
    pub fn validate(&self) -> Result<(), String> {
        self.character.validate()?;
        validate_mana(self.mana, self.max_mana)
    }
}

/// Full replacement of a wizard, including its complete spell list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardUpdate {
    #[serde(flatten)]
    pub character: CharacterUpdate,
    #[serde(default)]
    pub spells: Vec<Uuid>,
    pub mana: i32,
    pub max_mana: i32,
}

impl WizardUpdate {
    pub fn validate(&self) -> Result<(), String> {
        self.character.validate()?;
        validate_mana(self.mana, self.max_mana)
    }
}

fn validate_mana(mana: i32, max_mana: i32) -> Result<(), String> {
    if max_mana < 0 {
        return Err("Max mana cannot be negative".to_string());
    }
    if mana < 0 || mana > max_mana {
        return Err(format!("Mana must be between 0 and {}", max_mana));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wizard_flattened_defaults() {
        let request: NewWizard = serde_json::from_value(serde_json::json!({
            "name": "Merlin",
            "race": "Human",
            "classId": Uuid::new_v4(),
            "hp": 800,
            "maxHp": 900,
        }))
        .unwrap();

        assert_eq!(request.character.name, "Merlin");
        assert_eq!(request.character.hp, 800);
        assert_eq!(request.mana, 1000);
        assert_eq!(request.max_mana, 1000);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_mana_bounds() {
        assert!(validate_mana(0, 0).is_ok());
        assert!(validate_mana(1001, 1000).is_err());
        assert!(validate_mana(-5, 1000).is_err());
    }

    #[test]
    fn test_wizard_serializes_character_fields_inline() {
        let wizard = Wizard {
            character: Character {
                id: Uuid::new_v4(),
                name: "Merlin".to_string(),
                race: "Human".to_string(),
                class_id: Uuid::new_v4(),
                hp: 10,
                max_hp: 10,
                ac: 0,
                gear: vec![],
                potions: vec![],
                weapons: vec![],
            },
            mana: 50,
            max_mana: 100,
            spells: vec![],
        };

        let json = serde_json::to_value(&wizard).unwrap();
        assert_eq!(json["name"], "Merlin");
        assert_eq!(json["maxMana"], 100);
        assert_eq!(json["maxHp"], 10);
    }
}

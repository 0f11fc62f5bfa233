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


//! Game rules
//!
//! Pure functions for combat, healing, mana and armor. Services load and
//! persist state; everything numeric is decided here.

use crate::character::MAX_ARMOR_CLASS;
use crate::class::{Class, ClassRole};
use crate::item::{Spell, Weapon};

/// Armor class granted by a gear category.
///
/// | Category   | AC  |
/// |------------|-----|
/// | chestplate | 400 |
/// | skullcap   | 300 |
/// | leggings   | 200 |
/// | cleats     | 100 |
/// | other      | 0   |
pub fn armor_increment(category: &str) -> i32 {
    match category.trim().to_ascii_lowercase().as_str() {
        "chestplate" => 400,
        "skullcap" => 300,
        "leggings" => 200,
        "cleats" => 100,
        _ => 0,
    }
}

/// Armor class after equipping gear of the given category. Capped at
/// [`MAX_ARMOR_CLASS`] and never lower than the current value.
pub fn equip_armor_class(current: i32, category: &str) -> i32 {
    current
        .saturating_add(armor_increment(category))
        .min(MAX_ARMOR_CLASS)
        .max(current)
}

/// Damage bonus the attacker's class adds to every weapon strike
pub fn class_bonus(class: &Class) -> i32 {
    match class.role() {
        ClassRole::Barbarian => class.attributes.strength,
        ClassRole::Rogue => class.attributes.dexterity,
        ClassRole::Wizard | ClassRole::Other => 0,
    }
}

/// Damage breakdown of a single weapon strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub base: i32,
    pub bonus: i32,
}

impl Strike {
    /// Combined damage; never negative
    pub fn total(&self) -> i32 {
        self.base.saturating_add(self.bonus).max(0)
    }
}

/// Resolve a strike. Armor at least as high as the weapon's damage halves the
/// base damage (integer division).
pub fn strike(weapon: &Weapon, target_ac: i32, bonus: i32) -> Strike {
    let base = if target_ac >= weapon.damage {
        weapon.damage / 2
    } else {
        weapon.damage
    };
    Strike { base, bonus }
}

/// Spell damage: multiplied by duration when the spell lasts, otherwise as-is
pub fn spell_damage(spell: &Spell) -> i32 {
    let damage = if spell.duration > 0 {
        spell.damage.saturating_mul(spell.duration)
    } else {
        spell.damage
    };
    damage.max(0)
}

/// Remaining pool after taking `amount`, floored at zero
pub fn deplete(current: i32, amount: i32) -> i32 {
    current.saturating_sub(amount).max(0)
}

/// Pool after restoring `amount`, capped at `maximum`
pub fn restore(current: i32, amount: i32, maximum: i32) -> i32 {
    current.saturating_add(amount).min(maximum)
}

fn defeat_clause(message: &mut String, target: &str, remaining_hp: i32) {
    if remaining_hp == 0 {
        message.push_str(&format!(". {} has been defeated.", target));
    }
}

/// Attack narration, e.g. `"A attacked B with Axe, dealing 300 damage and 50
/// bonus for a total of 350"`
pub fn attack_message(
    attacker: &str,
    target: &str,
    weapon: &str,
    strike: &Strike,
    remaining_hp: i32,
) -> String {
    let mut message = format!(
        "{} attacked {} with {}, dealing {} damage",
        attacker, target, weapon, strike.base
    );
    if strike.bonus != 0 {
        message.push_str(&format!(" and {} bonus", strike.bonus));
    }
    message.push_str(&format!(" for a total of {}", strike.total()));
    defeat_clause(&mut message, target, remaining_hp);
    message
}

/// Spell narration
pub fn spell_message(
    wizard: &str,
    spell: &str,
    target: &str,
    damage: i32,
    remaining_hp: i32,
) -> String {
    let mut message = format!(
        "{} cast {} on {}, dealing {} damage",
        wizard, spell, target, damage
    );
    defeat_clause(&mut message, target, remaining_hp);
    message
}

pub fn heal_message(name: &str, restored: i32) -> String {
    format!("{} has been healed by {} HP", name, restored)
}

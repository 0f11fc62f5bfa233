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


//! Questkeep Common Types
//!
//! This crate defines the plain data shapes shared by the Questkeep services and
//! any routing layer in front of them:
//! - Catalog entities (Class, Weapon, Gear, Potion, Spell)
//! - Character and Wizard aggregates with their request shapes
//! - Pure game rules (combat, healing, mana, armor)

pub mod character;
pub mod class;
pub mod item;
pub mod rules;
pub mod wizard;

pub use character::{Character, CharacterUpdate, CombatReport, HealReport, NewCharacter};
pub use class::{Class, ClassAttributes, ClassFields, ClassRole};
pub use item::{
    Gear, GearFields, Potion, PotionEffects, PotionFields, Spell, SpellFields, Weapon,
    WeaponFields,
};
pub use wizard::{NewWizard, Wizard, WizardUpdate};

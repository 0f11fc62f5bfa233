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


//! Character classes and the role each one plays in the rule engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Role a class fills in the rules.
///
/// Derived once from the class name so no service compares class names directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassRole {
    Wizard,
    Barbarian,
    Rogue,
    Other,
}

impl ClassRole {
    /// Resolve the role for a class name, ignoring case and surrounding whitespace
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wizard" => ClassRole::Wizard,
            "barbarian" => ClassRole::Barbarian,
            // "Rouge" is present in seeded class data and is matched as a Rogue.
            "rogue" | "rouge" => ClassRole::Rogue,
            _ => ClassRole::Other,
        }
    }
}

impl std::fmt::Display for ClassRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassRole::Wizard => write!(f, "Wizard"),
            ClassRole::Barbarian => write!(f, "Barbarian"),
            ClassRole::Rogue => write!(f, "Rogue"),
            ClassRole::Other => write!(f, "Other"),
        }
    }
}

/// Class attribute scores.
///
/// The four core scores default to zero when absent; any other keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAttributes {
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub dexterity: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub charisma: i32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, i32>,
}

impl ClassAttributes {
    /// Look up any attribute by key, core or custom. Missing keys read as zero.
    pub fn get(&self, key: &str) -> i32 {
        match key {
            "strength" => self.strength,
            "dexterity" => self.dexterity,
            "intelligence" => self.intelligence,
            "charisma" => self.charisma,
            other => self.extra.get(other).copied().unwrap_or(0),
        }
    }
}

/// Character class catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub attributes: ClassAttributes,
}

impl Class {
    pub fn role(&self) -> ClassRole {
        ClassRole::from_name(&self.name)
    }
}

/// Field set used to create or replace a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFields {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: ClassAttributes,
}

impl ClassFields {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Class name cannot be empty".to_string());
        }
        Ok(())
    }
}

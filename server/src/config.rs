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


use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use uuid::Uuid;

/// Database used when the configuration leaves `url` empty
pub const DEFAULT_DATABASE_URL: &str = "sqlite://questkeep.db";

/// Pool size used when the configuration leaves `max_connections` unset
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
            command: None,
        }
    }
}

/// Administrative operations exposed by the binary
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create any missing tables
    Schema,
    /// List all classes
    Classes,
    /// List all characters with their inventory
    Characters,
    /// List all wizards with their spells
    Wizards,
    /// Show one character
    Character { id: Uuid },
    /// Show one wizard
    Wizard { id: Uuid },
    /// Strike a target with one of the attacker's weapons
    Attack {
        attacker: Uuid,
        target: Uuid,
        weapon: Uuid,
    },
    /// Drink the first healing potion a character carries
    Heal { id: Uuid },
    /// Cast a known spell at a target
    Cast {
        wizard: Uuid,
        target: Uuid,
        spell: Uuid,
    },
    /// Drink the first mana potion a wizard carries
    RestoreMana { id: Uuid },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, String> {
        let conf = serde_yaml::from_reader(
            std::fs::File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?,
        )
        .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(conf)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: EnvField<String>,

    #[serde(default)]
    pub max_connections: EnvField<u32>,

    /// Apply the schema on startup
    #[serde(default)]
    pub bootstrap: bool,
}

impl DatabaseConfig {
    pub fn url(&self) -> &str {
        if self.url.trim().is_empty() {
            DEFAULT_DATABASE_URL
        } else {
            self.url.as_str()
        }
    }

    pub fn max_connections(&self) -> u32 {
        match *self.max_connections {
            0 => DEFAULT_MAX_CONNECTIONS,
            n => n,
        }
    }
}

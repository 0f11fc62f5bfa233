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


use clap::Parser;
use questkeep_server::catalog::ClassService;
use questkeep_server::config::{Arguments, Command, Configuration};
use questkeep_server::{persistence, CharacterService, ServiceError, WizardService};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(pool: SqlitePool, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let characters = CharacterService::new(pool.clone());
    let wizards = WizardService::new(pool.clone());

    match command {
        Command::Schema => {
            persistence::bootstrap_schema(&pool).await?;
            println!("Schema is up to date");
        }
        Command::Classes => print_json(&ClassService::new(pool).get_all().await?)?,
        Command::Characters => print_json(&characters.get_all_characters().await?)?,
        Command::Wizards => print_json(&wizards.get_all_wizards().await?)?,
        Command::Character { id } => match characters.search_character_by_id(id).await? {
            Some(character) => print_json(&character)?,
            None => return Err(ServiceError::not_found("Character not found").into()),
        },
        Command::Wizard { id } => match wizards.search_wizard_by_id(id).await? {
            Some(wizard) => print_json(&wizard)?,
            None => return Err(ServiceError::not_found("Wizard not found").into()),
        },
        Command::Attack {
            attacker,
            target,
            weapon,
        } => print_json(&characters.attack(attacker, target, weapon).await?)?,
        Command::Heal { id } => print_json(&characters.heal(id).await?)?,
        Command::Cast {
            wizard,
            target,
            spell,
        } => print_json(&wizards.cast_spell(wizard, target, spell).await?)?,
        Command::RestoreMana { id } => print_json(&wizards.restore_mana(id).await?)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let pool = persistence::connect(&config.database).await?;
    if config.database.bootstrap {
        persistence::bootstrap_schema(&pool).await?;
    }

    let Some(command) = arguments.command else {
        tracing::info!("No command given, database at {} is reachable", config.database.url());
        return Ok(());
    };

    let result = run(pool.clone(), command).await;
    pool.close().await;
    if let Err(ref error) = result {
        tracing::error!("Command failed: {}", error);
    }
    result
}

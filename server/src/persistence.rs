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


//! Relational store plumbing
//!
//! This module handles:
//! - Building the connection pool from configuration
//! - Bootstrapping the schema the services depend on
//! - Finishing transactions: commit on success, explicit rollback on failure

use crate::config::DatabaseConfig;
use crate::error::ServiceResult;
use metrics::counter;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Schema for every table the services read or write
pub const SCHEMA: &str = include_str!("../schema.sql");

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create a connection pool for the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let url = config.url();
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every in-memory connection is its own database, so keep exactly one alive.
    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections())
    };

    tracing::info!("Connecting to database at {}", url);
    pool.connect_with(options).await
}

/// Create any missing tables. Safe to run repeatedly.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut count = 0;
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
        count += 1;
    }
    tracing::info!("Schema bootstrap applied {} statements", count);
    Ok(())
}

/// Commit `tx` if `outcome` succeeded, otherwise roll it back and hand the
/// original error back to the caller.
///
/// A failed rollback is logged; it never replaces the original error.
pub async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    operation: &str,
    outcome: ServiceResult<T>,
) -> ServiceResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            counter!("questkeep_transaction_rollbacks_total").increment(1);
            tracing::warn!("Rolling back {}: {}", operation, error);
            if let Err(rollback_error) = tx.rollback().await {
                tracing::error!("Failed to roll back {}: {}", operation, rollback_error);
            }
            Err(error)
        }
    }
}

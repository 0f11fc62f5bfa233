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


//! Service error taxonomy

use thiserror::Error;

/// Broad error category a routing layer maps to a transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    RuleViolation,
    Invalid,
    Persistence,
}

/// Errors raised by the Questkeep services.
///
/// Domain variants display exactly their descriptive message, so callers can
/// branch on either the variant or the text.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A character, item or class does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The item is already attached, or a unique name is taken.
    #[error("{0}")]
    Conflict(String),

    /// A game rule forbids the operation (full HP, not enough mana, ...).
    #[error("{0}")]
    RuleViolation(String),

    /// Input field set breaks an entity invariant.
    #[error("{0}")]
    Invalid(String),

    /// Failure whose cause is deliberately withheld from the caller.
    #[error("Something went wrong")]
    Concealed,

    /// Relational store failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn rule(message: impl Into<String>) -> Self {
        ServiceError::RuleViolation(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::NotFound(_) => ErrorCategory::NotFound,
            ServiceError::Conflict(_) => ErrorCategory::Conflict,
            ServiceError::RuleViolation(_) => ErrorCategory::RuleViolation,
            ServiceError::Invalid(_) => ErrorCategory::Invalid,
            ServiceError::Concealed | ServiceError::Database(_) => ErrorCategory::Persistence,
        }
    }

    /// Suggested HTTP status for the routing layer
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict | ErrorCategory::RuleViolation => 409,
            ErrorCategory::Invalid => 400,
            ErrorCategory::Persistence => 500,
        }
    }

    /// Translate a unique or primary key violation into a conflict carrying
    /// `message`. Any other store error passes through unchanged.
    pub fn on_duplicate(error: sqlx::Error, message: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServiceError::conflict(message)
            }
            _ => ServiceError::Database(error),
        }
    }
}

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


//! Questkeep Server
//!
//! Aggregate consistency and game-rule services over a relational store:
//! - Catalog services for classes, weapons, gear, potions and spells
//! - The character aggregate with its item associations, combat and healing
//! - The wizard extension with its mana pool and known spells
//!
//! Multi-statement mutations run in a single transaction through
//! [`persistence::finish`].

pub mod association;
pub mod catalog;
pub mod character;
pub mod config;
pub mod error;
pub mod persistence;
pub mod test_utils;
pub mod wizard;

pub use character::CharacterService;
pub use error::{ErrorCategory, ServiceError, ServiceResult};
pub use wizard::WizardService;

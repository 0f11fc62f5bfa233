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


//! Catalog services
//!
//! Independent CRUD over the single-table catalogs. "Not found" is reported as
//! `None` / `false`; only store failures and invalid field sets are errors.

pub mod class;
pub mod gear;
pub mod potion;
pub mod spell;
pub mod weapon;

pub(crate) use class::find_class;
pub use class::ClassService;
pub use gear::GearService;
pub use potion::PotionService;
pub use spell::SpellService;
pub use weapon::WeaponService;

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Kiln Infra
//!
//! Concrete implementations of the `kiln-core` RHI contracts.
//!
//! This crate owns the backends and the code that selects one of them at
//! runtime. Callers pick a backend through [`RhiInstance`] and from then on
//! only talk to the `Rhi` trait object it hands out.

#![warn(missing_docs)]

pub mod config;
pub mod graphics;
pub mod instance;

pub use instance::RhiInstance;

#[cfg(feature = "null")]
pub use config::load_null_rhi_config;
#[cfg(feature = "null")]
pub use graphics::null::{NullRhi, NullRhiConfig};

// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the Mnemo storage seam.
//!
//! The engine is consumed through [`MemoryStore`], using `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod memory;

pub use memory::MemoryStore;

// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per concern.

pub mod graph;
pub mod records;
pub mod retention;
pub mod search;

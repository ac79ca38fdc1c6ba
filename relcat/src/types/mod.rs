// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Scalar value system and object identifiers shared by storage and catalogs

pub mod oid;
pub mod value;

pub use oid::Oid;
pub use value::{TypeId, Value};

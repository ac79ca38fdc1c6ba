// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Object identifiers for catalog rows.
//!
//! OIDs are never reused. `Oid::INVALID` is the reserved "no such object" value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of every catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oid(pub u32);

impl Oid {
    /// Sentinel returned by lookups that find nothing
    pub const INVALID: Oid = Oid(u32::MAX);

    pub fn new(raw: u32) -> Self {
        Oid(raw)
    }

    pub fn is_valid(self) -> bool {
        self != Oid::INVALID
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for Oid {
    fn default() -> Self {
        Oid::INVALID
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "INVALID_OID")
        }
    }
}

impl From<u32> for Oid {
    fn from(raw: u32) -> Self {
        Oid(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_oid_is_default() {
        assert_eq!(Oid::default(), Oid::INVALID);
        assert!(!Oid::INVALID.is_valid());
        assert!(Oid(1000).is_valid());
        assert_eq!(Oid::INVALID.to_string(), "INVALID_OID");
    }
}

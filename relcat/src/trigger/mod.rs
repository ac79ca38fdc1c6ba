// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Trigger definitions materialized from the trigger catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trigger type bitmask as stored in the `tgtype` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TriggerType(pub i16);

impl TriggerType {
    pub const ROW: TriggerType = TriggerType(1 << 0);
    pub const BEFORE: TriggerType = TriggerType(1 << 1);
    pub const INSERT: TriggerType = TriggerType(1 << 2);
    pub const DELETE: TriggerType = TriggerType(1 << 3);
    pub const UPDATE: TriggerType = TriggerType(1 << 4);
    pub const TRUNCATE: TriggerType = TriggerType(1 << 5);
    pub const INSTEAD: TriggerType = TriggerType(1 << 6);

    pub fn bits(self) -> i16 {
        self.0
    }

    pub fn contains(self, other: TriggerType) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_row(self) -> bool {
        self.contains(Self::ROW)
    }

    pub fn is_before(self) -> bool {
        self.contains(Self::BEFORE)
    }
}

impl std::ops::BitOr for TriggerType {
    type Output = TriggerType;

    fn bitor(self, rhs: TriggerType) -> TriggerType {
        TriggerType(self.0 | rhs.0)
    }
}

impl From<i16> for TriggerType {
    fn from(bits: i16) -> Self {
        TriggerType(bits)
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        parts.push(if self.is_row() { "ROW" } else { "STATEMENT" });
        if self.contains(Self::INSTEAD) {
            parts.push("INSTEAD OF");
        } else if self.is_before() {
            parts.push("BEFORE");
        } else {
            parts.push("AFTER");
        }
        for (flag, label) in [
            (Self::INSERT, "INSERT"),
            (Self::DELETE, "DELETE"),
            (Self::UPDATE, "UPDATE"),
            (Self::TRUNCATE, "TRUNCATE"),
        ] {
            if self.contains(flag) {
                parts.push(label);
            }
        }
        write!(f, "{} ({})", parts.join(" "), self.0)
    }
}

/// One trigger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub name: String,
    pub trigger_type: TriggerType,
    /// Qualified name of the function the trigger calls
    pub function_name: String,
    /// Comma-separated argument list
    pub function_args: String,
    /// Opaque serialized WHEN condition, kept byte-for-byte
    pub fire_condition: Option<Vec<u8>>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Trigger {
    pub fn new(
        name: impl Into<String>,
        trigger_type: TriggerType,
        function_name: impl Into<String>,
        function_args: impl Into<String>,
        fire_condition: Option<Vec<u8>>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger_type,
            function_name: function_name.into(),
            function_args: function_args.into(),
            fire_condition,
            timestamp,
        }
    }

    pub fn args(&self) -> Vec<&str> {
        if self.function_args.is_empty() {
            return Vec::new();
        }
        self.function_args.split(',').collect()
    }

    /// Join arguments into the stored `tgargs` form
    pub fn serialize_function_args<S: AsRef<str>>(args: &[S]) -> String {
        args.iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Triggers of one table, in catalog scan order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerList {
    triggers: Vec<Trigger>,
}

impl TriggerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trigger> {
        self.triggers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trigger> {
        self.triggers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.triggers.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn has_trigger_type(&self, trigger_type: TriggerType) -> bool {
        self.triggers
            .iter()
            .any(|t| t.trigger_type == trigger_type)
    }

    pub fn triggers_of_type(&self, trigger_type: TriggerType) -> impl Iterator<Item = &Trigger> {
        self.triggers
            .iter()
            .filter(move |t| t.trigger_type == trigger_type)
    }
}

impl IntoIterator for TriggerList {
    type Item = Trigger;
    type IntoIter = std::vec::IntoIter<Trigger>;

    fn into_iter(self) -> Self::IntoIter {
        self.triggers.into_iter()
    }
}

impl FromIterator<Trigger> for TriggerList {
    fn from_iter<I: IntoIterator<Item = Trigger>>(iter: I) -> Self {
        Self {
            triggers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_type_bits() {
        let t = TriggerType::ROW | TriggerType::BEFORE | TriggerType::INSERT;
        assert_eq!(t.bits(), 0b111);
        assert!(t.is_row());
        assert!(t.contains(TriggerType::INSERT));
        assert!(!t.contains(TriggerType::DELETE));
        assert_eq!(t.to_string(), "ROW BEFORE INSERT (7)");
    }

    #[test]
    fn test_args_split() {
        let args = Trigger::serialize_function_args(&["a", "b c", "d"]);
        let trigger = Trigger::new("t", TriggerType::ROW, "f", args, None, None);
        assert_eq!(trigger.args(), vec!["a", "b c", "d"]);

        let empty = Trigger::new("t", TriggerType::ROW, "f", "", None, None);
        assert!(empty.args().is_empty());
    }

    #[test]
    fn test_list_keeps_duplicates_in_order() {
        let mut list = TriggerList::new();
        list.add_trigger(Trigger::new("a", TriggerType(1), "f", "", None, None));
        list.add_trigger(Trigger::new("a", TriggerType(1), "f", "", None, None));
        list.add_trigger(Trigger::new("b", TriggerType(2), "f", "", None, None));
        assert_eq!(list.names(), vec!["a", "a", "b"]);
        assert_eq!(list.triggers_of_type(TriggerType(1)).count(), 2);
        assert!(!list.has_trigger_type(TriggerType(4)));
    }
}

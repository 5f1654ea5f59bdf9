// ABOUTME: Slot model for user-facing refinement choices (portion size, rice amount, cut)
// ABOUTME: Slots are pure views over the current item list keyed by slot name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A slot option or selection: grams or a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// Numeric option such as rice grams
    Number(f64),
    /// Label option such as `ロース` or `regular`
    Text(String),
}

impl SlotValue {
    /// Numeric view, parsing labels that hold a number
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<f64> for SlotValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A refinement question presented to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot key (`portion_size`, `rice_size`, `pork_cut`)
    pub key: String,
    /// Question shown to the user
    pub question: String,
    /// Allowed answers
    pub options: Vec<SlotValue>,
    /// Answer reflected by the current items
    pub selected: SlotValue,
    /// Unit of numeric options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Slots keyed by slot name
pub type Slots = BTreeMap<String, Slot>;

/// A caller's answer to a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSelection {
    /// Slot key being answered
    pub key: String,
    /// Chosen option
    pub value: SlotValue,
}

impl SlotSelection {
    /// Create a selection
    pub fn new(key: impl Into<String>, value: impl Into<SlotValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

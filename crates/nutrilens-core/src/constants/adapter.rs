// ABOUTME: Shadow-to-legacy adapter defaults and version stamp
// ABOUTME: Values appear verbatim in legacy responses during the migration window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Adapter release stamped into `meta.adapter.version`
pub const ADAPTER_VERSION: &str = "2025-09-20";

/// Source label stamped into `meta.adapter.source`, also the last-resort ID seed
pub const ADAPTER_SOURCE: &str = "shadow_v2";

/// Dish name used when the DTO has none
pub const DEFAULT_DISH: &str = "食事";

/// Meal slot used when the DTO has none
pub const DEFAULT_SLOT: &str = "other";

/// Log event used when the DTO has none
pub const DEFAULT_EVENT: &str = "eat";

/// Length of a base64url item identifier (16 bytes, unpadded)
pub const ITEM_ID_LEN: usize = 22;

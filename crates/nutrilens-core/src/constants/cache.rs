// ABOUTME: Cache-related constants for TTL, capacity, and key namespacing
// ABOUTME: Bounds the in-memory analysis cache used by the nutrition service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum cache entries before coarse eviction kicks in
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 2_000;

/// Analysis result TTL (7 days)
pub const TTL_ANALYSIS_SECS: u64 = 604_800;

/// Cache key prefix for namespacing
pub const CACHE_KEY_PREFIX: &str = "nutrition:";

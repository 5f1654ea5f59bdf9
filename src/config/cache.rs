// ABOUTME: Response cache configuration (enable flag, TTL, capacity)
// ABOUTME: Loaded from CACHE_ENABLED, CACHE_TTL_SEC, and CACHE_MAX_ENTRIES
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::time::Duration;

use nutrilens_core::constants::cache::{DEFAULT_CACHE_MAX_ENTRIES, TTL_ANALYSIS_SECS};
use serde::{Deserialize, Serialize};

/// Analysis cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Serve repeated requests from memory
    pub enabled: bool,
    /// Entry lifetime in seconds; zero keeps entries until evicted
    pub ttl_secs: u64,
    /// Maximum number of entries before coarse eviction
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: TTL_ANALYSIS_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment
    ///
    /// Caching is on unless `CACHE_ENABLED` is exactly `0`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("CACHE_ENABLED").map_or(true, |v| v.trim() != "0"),
            ttl_secs: env::var("CACHE_TTL_SEC")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(TTL_ANALYSIS_SECS),
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
        }
    }

    /// Entry lifetime as a duration
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

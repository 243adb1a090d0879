//! Format-result cache
//!
//! Keys cover everything a result depends on besides bundle content:
//! message id, attribute, canonicalized arguments, isolation mode, and
//! strict mode (bundle mutations clear the cache wholesale). Entries are
//! weighted by output length plus a per-error surcharge; oversize or
//! error-bloated results are not cached, and counters track the skips.
//! Eviction is insertion-ordered.

use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::diagnostics::runtime::FormattingError;
use crate::resolver::value::{FluentArgs, FluentValue};

/// Weight charged per recorded error when sizing a cache entry
pub const ERROR_WEIGHT: usize = 64;

/// Cache sizing configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_size: usize,
    /// Heaviest entry worth caching
    pub max_entry_weight: usize,
    /// Most errors an entry may carry and still be cached
    pub max_errors_per_entry: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1_024,
            max_entry_weight: 64 * 1024,
            max_errors_per_entry: 16,
        }
    }
}

/// Hashable shadow of a [`FluentValue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CanonicalValue {
    Str(String),
    Int(i64),
    /// Normalized decimal rendering, so `1.0` and `1.00` share entries
    Dec(String),
    Bool(bool),
    /// Seconds + subsecond nanoseconds since the epoch
    DateTime(i64, u32),
    Number {
        value: String,
        formatted: String,
        precision: Option<u32>,
    },
}

fn canonical_decimal(value: &Decimal) -> String {
    value.normalize().to_string()
}

impl From<&FluentValue> for CanonicalValue {
    fn from(value: &FluentValue) -> Self {
        match value {
            FluentValue::String(s) => CanonicalValue::Str(s.clone()),
            FluentValue::Integer(i) => CanonicalValue::Int(*i),
            FluentValue::Decimal(d) => CanonicalValue::Dec(canonical_decimal(d)),
            FluentValue::Bool(b) => CanonicalValue::Bool(*b),
            FluentValue::DateTime(dt) => {
                CanonicalValue::DateTime(dt.and_utc().timestamp(), dt.and_utc().timestamp_subsec_nanos())
            }
            FluentValue::Number(n) => CanonicalValue::Number {
                value: canonical_decimal(&n.value),
                formatted: n.formatted.clone(),
                precision: n.precision,
            },
        }
    }
}

/// Full cache key for one format request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    message_id: String,
    attribute: Option<String>,
    /// Sorted by argument name; `FluentArgs` is ordered already
    args: Vec<(String, CanonicalValue)>,
    use_isolating: bool,
    strict: bool,
}

impl CacheKey {
    pub(crate) fn new(
        message_id: &str,
        attribute: Option<&str>,
        args: Option<&FluentArgs>,
        use_isolating: bool,
        strict: bool,
    ) -> Self {
        let args = args
            .map(|map| {
                map.iter()
                    .map(|(name, value)| (name.clone(), CanonicalValue::from(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            message_id: message_id.to_string(),
            attribute: attribute.map(str::to_string),
            args,
            use_isolating,
            strict,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedResult {
    text: String,
    errors: Vec<FormattingError>,
}

/// Bounded, counted format cache
#[derive(Debug, Default)]
pub(crate) struct FormatCache {
    config: CacheConfig,
    entries: HashMap<CacheKey, CachedResult>,
    order: VecDeque<CacheKey>,
    pub hits: u64,
    pub misses: u64,
    pub skipped_oversize: u64,
    pub skipped_errors: u64,
}

impl FormatCache {
    pub(crate) fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub(crate) fn get(&mut self, key: &CacheKey) -> Option<(String, Vec<FormattingError>)> {
        match self.entries.get(key) {
            Some(cached) => {
                self.hits += 1;
                Some((cached.text.clone(), cached.errors.clone()))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub(crate) fn insert(&mut self, key: CacheKey, text: &str, errors: &[FormattingError]) {
        if errors.len() > self.config.max_errors_per_entry {
            self.skipped_errors += 1;
            return;
        }
        let weight = text.len() + errors.len() * ERROR_WEIGHT;
        if weight > self.config.max_entry_weight {
            self.skipped_oversize += 1;
            return;
        }

        if self.entries.contains_key(&key) {
            self.entries.insert(
                key,
                CachedResult {
                    text: text.to_string(),
                    errors: errors.to_vec(),
                },
            );
            return;
        }

        while self.entries.len() >= self.config.max_size {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CachedResult {
                text: text.to_string(),
                errors: errors.to_vec(),
            },
        );
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

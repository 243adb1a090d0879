//! Bundle - Thread-Safe Message Container
//!
//! A bundle holds the messages, terms, and functions of one locale and
//! formats message identifiers against argument bindings. Shared
//! operations (`format_pattern`, `has_message`, introspection) take the
//! readers-writer lock with `read_recursive`, so a custom function that
//! re-enters the bundle on the same thread cannot deadlock itself;
//! mutators (`add_resource`, `add_function`, `clear_cache`) take the
//! exclusive lock. parking_lot's fairness keeps writers from starving.
//! `add_resource` parses outside the lock (the parser is pure) and only
//! the registration step is exclusive.
//!
//! The function registry starts as the shared frozen default and is
//! copied on the first `add_function` (copy-on-write). Strict mode is
//! applied only at the `format_pattern` boundary: errors are collected
//! everywhere and converted to [`IntegrityError`] on exit.

pub mod cache;
pub mod introspect;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;

use crate::diagnostics::runtime::{FormattingError, FormattingErrorKind, IntegrityError};
use crate::functions::{
    default_registry, FluentFunction, FunctionRegistry, FunctionSignature, RegistryError,
};
use crate::locale::{codes, default_oracle, LocaleError, LocaleOracle};
use crate::parser::{ParseError, Parser, ParserConfig};
use crate::resolver::value::FluentArgs;
use crate::resolver::{self, ResolverEnv};
use crate::syntax::ast::{Entry, Junk, Message, Term};
use crate::validator::ValidationOptions;

pub use cache::CacheConfig;
pub use introspect::EntryIntrospection;

use cache::{CacheKey, FormatCache};

/// Bundle configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Wrap interpolations in FSI/PDI isolation marks
    pub use_isolating: bool,
    /// Convert accumulated errors into exceptions at the API boundary
    pub strict: bool,
    /// Maximum accepted resource size in bytes
    pub max_source_size: usize,
    /// Depth budget shared by parsing and resolution
    pub max_nesting_depth: usize,
    /// Format-cache sizing; `None` disables caching
    pub cache: Option<CacheConfig>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            use_isolating: true,
            strict: false,
            max_source_size: crate::parser::DEFAULT_MAX_SOURCE_SIZE,
            max_nesting_depth: crate::parser::DEFAULT_MAX_NESTING_DEPTH,
            cache: Some(CacheConfig::default()),
        }
    }
}

/// Lock-acquisition failures on the timeout-taking variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// Zero-duration timeouts are rejected rather than busy-tried
    InvalidTimeout,
    /// The lock could not be acquired within the timeout
    Timeout,
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::InvalidTimeout => write!(f, "timeout must be greater than zero"),
            LockError::Timeout => write!(f, "could not acquire the bundle lock in time"),
        }
    }
}

impl std::error::Error for LockError {}

/// Cache observability counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub skipped_oversize: u64,
    pub skipped_errors: u64,
}

struct BundleInner {
    messages: HashMap<String, Message>,
    terms: HashMap<String, Term>,
    functions: Arc<FunctionRegistry>,
    /// Behind its own mutex so cache counters can move under a read lock
    cache: Option<Mutex<FormatCache>>,
    /// Raw content of junk regions from every added resource; strict
    /// mode refuses to format while any are present
    junk: Vec<String>,
}

/// Thread-safe container for one locale's messages, terms, and functions
pub struct Bundle {
    locale: String,
    config: BundleConfig,
    oracle: Arc<dyn LocaleOracle>,
    inner: RwLock<BundleInner>,
    /// Introspection memo; read-mostly, a lost race recomputes
    memo: Mutex<HashMap<String, Arc<EntryIntrospection>>>,
    /// Bumped by every mutation; drives scoped cache invalidation
    mutations: AtomicU64,
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read_recursive();
        f.debug_struct("Bundle")
            .field("locale", &self.locale)
            .field("messages", &inner.messages.len())
            .field("terms", &inner.terms.len())
            .field("strict", &self.config.strict)
            .finish_non_exhaustive()
    }
}

impl Bundle {
    /// A bundle with default configuration and the built-in locale data
    pub fn new(locale: &str) -> Result<Self, LocaleError> {
        Self::with_config(locale, BundleConfig::default())
    }

    pub fn with_config(locale: &str, config: BundleConfig) -> Result<Self, LocaleError> {
        Self::with_oracle(locale, config, default_oracle())
    }

    /// Inject a custom locale-data provider
    pub fn with_oracle(
        locale: &str,
        config: BundleConfig,
        oracle: Arc<dyn LocaleOracle>,
    ) -> Result<Self, LocaleError> {
        let validated = codes::validate_locale(locale)?;
        let cache = config.cache.clone().map(|c| Mutex::new(FormatCache::new(c)));
        Ok(Self {
            locale: validated.canonical,
            config,
            oracle,
            inner: RwLock::new(BundleInner {
                messages: HashMap::new(),
                terms: HashMap::new(),
                functions: default_registry(),
                cache,
                junk: Vec::new(),
            }),
            memo: Mutex::new(HashMap::new()),
            mutations: AtomicU64::new(0),
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    fn mark_mutated(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
        self.memo.lock().clear();
    }

    /// Parse and register a resource.
    ///
    /// Parsing happens outside the write lock; only registration is
    /// exclusive. Entries registered twice follow last-write-wins; the
    /// validator's shadow pass (see [`Bundle::validation_options`])
    /// reports those overwrites. Junk entries are returned, not raised.
    pub fn add_resource(&self, source: &str) -> Result<Vec<Junk>, ParseError> {
        let parser = Parser::new(ParserConfig {
            max_source_size: self.config.max_source_size,
            max_nesting_depth: self.config.max_nesting_depth,
        })?;
        let resource = parser.parse(source)?;

        let mut junk_out = Vec::new();
        {
            let mut inner = self.inner.write();
            for entry in resource.entries {
                match entry {
                    Entry::Message(message) => {
                        inner.messages.insert(message.id.name.clone(), message);
                    }
                    Entry::Term(term) => {
                        inner.terms.insert(term.id.name.clone(), term);
                    }
                    Entry::Junk(junk) => {
                        inner.junk.push(junk.content.clone());
                        junk_out.push(junk);
                    }
                    Entry::Comment(_) => {}
                }
            }
            if let Some(cache) = &inner.cache {
                cache.lock().clear();
            }
        }
        self.mark_mutated();
        Ok(junk_out)
    }

    /// Register a custom function.
    ///
    /// The shared default registry is copied on the first mutation; other
    /// bundles keep the original.
    pub fn add_function(
        &self,
        signature: FunctionSignature,
        callable: FluentFunction,
    ) -> Result<(), RegistryError> {
        {
            let mut inner = self.inner.write();
            let mut copy = inner.functions.thawed_copy();
            copy.register(signature, callable)?;
            inner.functions = Arc::new(copy);
            if let Some(cache) = &inner.cache {
                cache.lock().clear();
            }
        }
        self.mark_mutated();
        Ok(())
    }

    pub fn has_message(&self, id: &str) -> bool {
        self.inner.read_recursive().messages.contains_key(id)
    }

    pub fn has_term(&self, id: &str) -> bool {
        self.inner.read_recursive().terms.contains_key(id)
    }

    /// Whether a message carries the attribute (last-wins lookup)
    pub fn has_attribute(&self, id: &str, attribute: &str) -> bool {
        self.inner
            .read_recursive()
            .messages
            .get(id)
            .map(|message| message.attribute(attribute).is_some())
            .unwrap_or(false)
    }

    pub fn message_ids(&self) -> Vec<String> {
        let inner = self.inner.read_recursive();
        let mut ids: Vec<String> = inner.messages.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn term_ids(&self) -> Vec<String> {
        let inner = self.inner.read_recursive();
        let mut ids: Vec<String> = inner.terms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Format a message (or `-term`) value or attribute.
    ///
    /// Non-strict bundles always return `Ok`: failures surface as
    /// fallback text plus the error list. Strict bundles convert junk
    /// presence and non-empty error lists into [`IntegrityError`].
    pub fn format_pattern(
        &self,
        id: &str,
        args: Option<&FluentArgs>,
        attribute: Option<&str>,
    ) -> Result<(String, Vec<FormattingError>), IntegrityError> {
        let inner = self.inner.read_recursive();
        self.format_locked(&inner, id, args, attribute)
    }

    /// `format_pattern` for the message value
    pub fn format_value(
        &self,
        id: &str,
        args: Option<&FluentArgs>,
    ) -> Result<(String, Vec<FormattingError>), IntegrityError> {
        self.format_pattern(id, args, None)
    }

    /// Timeout-taking variant; rejects zero timeouts
    pub fn try_format_pattern_for(
        &self,
        id: &str,
        args: Option<&FluentArgs>,
        attribute: Option<&str>,
        timeout: Duration,
    ) -> Result<Result<(String, Vec<FormattingError>), IntegrityError>, LockError> {
        if timeout.is_zero() {
            return Err(LockError::InvalidTimeout);
        }
        let inner = self
            .inner
            .try_read_recursive_for(timeout)
            .ok_or(LockError::Timeout)?;
        Ok(self.format_locked(&inner, id, args, attribute))
    }

    fn format_locked(
        &self,
        inner: &BundleInner,
        id: &str,
        args: Option<&FluentArgs>,
        attribute: Option<&str>,
    ) -> Result<(String, Vec<FormattingError>), IntegrityError> {
        if self.config.strict && !inner.junk.is_empty() {
            return Err(IntegrityError::Syntax {
                junk: inner.junk.clone(),
            });
        }

        let key = inner.cache.as_ref().map(|_| {
            CacheKey::new(
                id,
                attribute,
                args,
                self.config.use_isolating,
                self.config.strict,
            )
        });
        if let (Some(cache), Some(key)) = (&inner.cache, &key) {
            if let Some((text, errors)) = cache.lock().get(key) {
                return self.finish(text, errors);
            }
        }

        let env = ResolverEnv {
            messages: &inner.messages,
            terms: &inner.terms,
            functions: &inner.functions,
            oracle: self.oracle.as_ref(),
            locale: &self.locale,
            use_isolating: self.config.use_isolating,
            max_depth: self.config.max_nesting_depth,
        };

        let (text, errors) = if let Some(term_id) = id.strip_prefix('-') {
            match inner.terms.get(term_id) {
                Some(term) => resolver::resolve_term(&env, term_id, term, attribute, args),
                None => {
                    let fallback = resolver::term_fallback(term_id);
                    let error = FormattingError::new(
                        FormattingErrorKind::TermNotFound,
                        format!("unknown term \"{id}\""),
                    )
                    .with_fallback(fallback.clone());
                    (fallback, vec![error])
                }
            }
        } else {
            match inner.messages.get(id) {
                Some(message) => resolver::resolve_message(&env, id, message, attribute, args),
                None => {
                    let fallback = resolver::message_fallback(id, attribute);
                    let error = FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("unknown message \"{id}\""),
                    )
                    .with_fallback(fallback.clone());
                    (fallback, vec![error])
                }
            }
        };

        if let (Some(cache), Some(key)) = (&inner.cache, key) {
            cache.lock().insert(key, &text, &errors);
        }
        self.finish(text, errors)
    }

    /// Strict-mode boundary conversion
    fn finish(
        &self,
        text: String,
        errors: Vec<FormattingError>,
    ) -> Result<(String, Vec<FormattingError>), IntegrityError> {
        if self.config.strict && !errors.is_empty() {
            return Err(IntegrityError::Formatting {
                fallback: text,
                errors,
            });
        }
        Ok((text, errors))
    }

    /// What a message needs from its caller; memoized
    pub fn introspect_message(&self, id: &str) -> Option<Arc<EntryIntrospection>> {
        let memo_key = format!("msg:{id}");
        if let Some(cached) = self.memo.lock().get(&memo_key) {
            return Some(Arc::clone(cached));
        }
        let inner = self.inner.read_recursive();
        let message = inner.messages.get(id)?;
        let report = Arc::new(introspect::introspect_message(
            message,
            self.config.max_nesting_depth,
        ));
        drop(inner);
        self.memo.lock().insert(memo_key, Arc::clone(&report));
        Some(report)
    }

    /// What a term needs from its caller; memoized
    pub fn introspect_term(&self, id: &str) -> Option<Arc<EntryIntrospection>> {
        let memo_key = format!("term:{id}");
        if let Some(cached) = self.memo.lock().get(&memo_key) {
            return Some(Arc::clone(cached));
        }
        let inner = self.inner.read_recursive();
        let term = inner.terms.get(id)?;
        let report = Arc::new(introspect::introspect_term(
            term,
            self.config.max_nesting_depth,
        ));
        drop(inner);
        self.memo.lock().insert(memo_key, Arc::clone(&report));
        Some(report)
    }

    /// Validation options seeded with this bundle's registered entries
    /// and their dependency sets
    pub fn validation_options(&self) -> ValidationOptions {
        let inner = self.inner.read_recursive();
        let mut options = ValidationOptions {
            max_chain_depth: self.config.max_nesting_depth,
            ..ValidationOptions::default()
        };
        for (id, message) in &inner.messages {
            options.known_messages.insert(id.clone());
            let report = introspect::introspect_message(message, self.config.max_nesting_depth);
            options.known_dependencies.insert(
                format!("msg:{id}"),
                report
                    .message_references
                    .iter()
                    .map(|m| format!("msg:{m}"))
                    .chain(report.term_references.iter().map(|t| format!("term:{t}")))
                    .collect(),
            );
        }
        for (id, term) in &inner.terms {
            options.known_terms.insert(id.clone());
            let report = introspect::introspect_term(term, self.config.max_nesting_depth);
            options.known_dependencies.insert(
                format!("term:{id}"),
                report
                    .message_references
                    .iter()
                    .map(|m| format!("msg:{m}"))
                    .chain(report.term_references.iter().map(|t| format!("term:{t}")))
                    .collect(),
            );
        }
        options
    }

    pub fn clear_cache(&self) {
        let inner = self.inner.write();
        if let Some(cache) = &inner.cache {
            cache.lock().clear();
        }
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        let inner = self.inner.read_recursive();
        inner.cache.as_ref().map(|cache| {
            let cache = cache.lock();
            CacheStats {
                size: cache.len(),
                hits: cache.hits,
                misses: cache.misses,
                skipped_oversize: cache.skipped_oversize,
                skipped_errors: cache.skipped_errors,
            }
        })
    }

    /// Scoped-use guard: on drop, the cache is cleared only if the
    /// bundle was mutated during the scope.
    pub fn scope(&self) -> BundleScope<'_> {
        BundleScope {
            bundle: self,
            mutations_at_entry: self.mutations.load(Ordering::Relaxed),
        }
    }
}

/// See [`Bundle::scope`]
pub struct BundleScope<'a> {
    bundle: &'a Bundle,
    mutations_at_entry: u64,
}

impl Drop for BundleScope<'_> {
    fn drop(&mut self) {
        if self.bundle.mutations.load(Ordering::Relaxed) != self.mutations_at_entry {
            self.bundle.clear_cache();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::value::{args, FluentValue};
    use crate::resolver::{FSI, PDI};

    fn plain_bundle(source: &str) -> Bundle {
        let bundle = Bundle::with_config(
            "en",
            BundleConfig {
                use_isolating: false,
                ..BundleConfig::default()
            },
        )
        .unwrap();
        bundle.add_resource(source).unwrap();
        bundle
    }

    #[test]
    fn simple_message_formats() {
        let bundle = plain_bundle("msg = hello");
        let (text, errors) = bundle.format_pattern("msg", None, None).unwrap();
        assert_eq!(text, "hello");
        assert!(errors.is_empty());
    }

    #[test]
    fn invalid_locale_is_rejected_at_construction() {
        assert!(Bundle::new("not a locale").is_err());
    }

    #[test]
    fn locale_is_canonicalized() {
        let bundle = Bundle::new("FR-fr").unwrap();
        assert_eq!(bundle.locale(), "fr_FR");
    }

    #[test]
    fn plural_scenario_formats_with_isolation_marks() {
        let bundle = Bundle::new("en").unwrap();
        bundle
            .add_resource("items = { $n ->\n    [one] one item\n   *[other] { $n } items\n}")
            .unwrap();
        let call_args = args([("n", 5.into())]);
        let (text, errors) = bundle
            .format_pattern("items", Some(&call_args), None)
            .unwrap();
        assert_eq!(text, format!("{FSI}{FSI}5{PDI} items{PDI}"));
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_message_returns_fallback_and_error() {
        let bundle = plain_bundle("msg = hello");
        let (text, errors) = bundle.format_pattern("gone", None, None).unwrap();
        assert_eq!(text, "{gone}");
        assert_eq!(errors[0].kind, FormattingErrorKind::ReferenceNotFound);
    }

    #[test]
    fn term_attribute_addressing_is_last_wins() {
        let bundle = plain_bundle("-brand = X\n    .legal = Old\n    .legal = New");
        let (text, errors) = bundle
            .format_pattern("-brand", None, Some("legal"))
            .unwrap();
        assert_eq!(text, "New");
        assert!(errors.is_empty());
    }

    #[test]
    fn last_registration_wins_for_messages() {
        let bundle = plain_bundle("m = first");
        bundle.add_resource("m = second").unwrap();
        assert_eq!(bundle.format_pattern("m", None, None).unwrap().0, "second");
    }

    #[test]
    fn junk_is_returned_not_raised() {
        let bundle = plain_bundle("ok = fine");
        let junk = bundle.add_resource("=== broken\nalso-ok = yes").unwrap();
        assert_eq!(junk.len(), 1);
        assert!(bundle.has_message("also-ok"));
    }

    #[test]
    fn strict_mode_raises_on_errors() {
        let bundle = Bundle::with_config(
            "en",
            BundleConfig {
                strict: true,
                use_isolating: false,
                ..BundleConfig::default()
            },
        )
        .unwrap();
        bundle.add_resource("msg = { $missing }").unwrap();
        match bundle.format_pattern("msg", None, None) {
            Err(IntegrityError::Formatting { fallback, errors }) => {
                assert_eq!(fallback, "{$missing}");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn strict_mode_raises_on_junk_presence() {
        let bundle = Bundle::with_config(
            "en",
            BundleConfig {
                strict: true,
                ..BundleConfig::default()
            },
        )
        .unwrap();
        bundle.add_resource("msg = fine\n=== junk").unwrap();
        assert!(matches!(
            bundle.format_pattern("msg", None, None),
            Err(IntegrityError::Syntax { .. })
        ));
    }

    #[test]
    fn cycle_returns_fallback_and_error() {
        let bundle = plain_bundle("a = { b }\nb = { a }");
        let (text, errors) = bundle.format_pattern("a", None, None).unwrap();
        assert!(!text.is_empty());
        assert!(errors.iter().any(|e| matches!(
            e.kind,
            FormattingErrorKind::CyclicReference | FormattingErrorKind::MaxDepthExceeded
        )));
    }

    #[test]
    fn cache_results_match_uncached_results() {
        let source = "items = { $n ->\n    [one] one item\n   *[other] { $n } items\n}";
        let cached = plain_bundle(source);
        let uncached = Bundle::with_config(
            "en",
            BundleConfig {
                use_isolating: false,
                cache: None,
                ..BundleConfig::default()
            },
        )
        .unwrap();
        uncached.add_resource(source).unwrap();

        for n in [0_i64, 1, 2, 5, 21] {
            let call_args = args([("n", n.into())]);
            let from_cached = cached
                .format_pattern("items", Some(&call_args), None)
                .unwrap();
            let repeat = cached
                .format_pattern("items", Some(&call_args), None)
                .unwrap();
            let from_uncached = uncached
                .format_pattern("items", Some(&call_args), None)
                .unwrap();
            assert_eq!(from_cached, from_uncached);
            assert_eq!(from_cached, repeat);
        }
        let stats = cached.cache_stats().unwrap();
        assert!(stats.hits >= 5, "expected repeat hits, got {stats:?}");
        assert!(uncached.cache_stats().is_none());
    }

    #[test]
    fn add_resource_invalidates_the_cache() {
        let bundle = plain_bundle("m = old");
        assert_eq!(bundle.format_pattern("m", None, None).unwrap().0, "old");
        bundle.add_resource("m = new").unwrap();
        assert_eq!(bundle.format_pattern("m", None, None).unwrap().0, "new");
    }

    #[test]
    fn custom_functions_are_copy_on_write() {
        let bundle = plain_bundle("m = { SHOUT($word) }");
        let other = plain_bundle("m = irrelevant");
        bundle
            .add_function(
                FunctionSignature::new("SHOUT", 1),
                Arc::new(|positional, _, _| match &positional[0] {
                    FluentValue::String(s) => Ok(FluentValue::String(s.to_uppercase())),
                    other => Ok(other.clone()),
                }),
            )
            .unwrap();
        let call_args = args([("word", "quiet".into())]);
        let (text, errors) = bundle
            .format_pattern("m", Some(&call_args), None)
            .unwrap();
        assert_eq!(text, "QUIET");
        assert!(errors.is_empty(), "{errors:?}");
        // The other bundle still has only the builtins.
        drop(other);
        assert!(crate::functions::default_registry().get("SHOUT").is_none());
    }

    #[test]
    fn introspection_is_memoized_and_invalidated() {
        let bundle = plain_bundle("m = Hello { $name } from { -brand }\n-brand = X");
        let first = bundle.introspect_message("m").unwrap();
        assert_eq!(first.variables, vec!["name"]);
        assert_eq!(first.term_references, vec!["brand"]);
        let second = bundle.introspect_message("m").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        bundle.add_resource("m = plain now").unwrap();
        let third = bundle.introspect_message("m").unwrap();
        assert!(third.variables.is_empty());
    }

    #[test]
    fn has_attribute_follows_last_wins() {
        let bundle = plain_bundle("login =\n    .placeholder = Enter name");
        assert!(bundle.has_attribute("login", "placeholder"));
        assert!(!bundle.has_attribute("login", "missing"));
        assert!(!bundle.has_attribute("missing", "placeholder"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let bundle = plain_bundle("m = x");
        assert_eq!(
            bundle
                .try_format_pattern_for("m", None, None, Duration::ZERO)
                .unwrap_err(),
            LockError::InvalidTimeout
        );
        let ok = bundle
            .try_format_pattern_for("m", None, None, Duration::from_millis(50))
            .unwrap()
            .unwrap();
        assert_eq!(ok.0, "x");
    }

    #[test]
    fn scope_clears_cache_only_after_mutation() {
        let bundle = plain_bundle("m = x");
        {
            let _scope = bundle.scope();
            bundle.format_pattern("m", None, None).unwrap();
            bundle.format_pattern("m", None, None).unwrap();
        }
        // No mutation inside the scope: the cached entry survives.
        assert!(bundle.cache_stats().unwrap().size > 0);

        {
            let _scope = bundle.scope();
            bundle.add_resource("extra = y").unwrap();
            bundle.format_pattern("m", None, None).unwrap();
        }
        assert_eq!(bundle.cache_stats().unwrap().size, 0);
    }

    #[test]
    fn validation_options_expose_bundle_knowledge() {
        let bundle = plain_bundle("base = { -brand }\n-brand = X");
        let options = bundle.validation_options();
        assert!(options.known_messages.contains("base"));
        assert!(options.known_terms.contains("brand"));
        let deps = options.known_dependencies.get("msg:base").unwrap();
        assert!(deps.contains("term:brand"));
    }
}

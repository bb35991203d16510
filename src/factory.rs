//! Immutable record factory.
//!
//! The factory turns plain data into [`ImmutableRecord`]s and is the entry
//! point of the path-set engine. It owns the freeze policy decision: either a
//! fixed policy from [`FactoryConfig`], or the process-wide default read on
//! every call.

use crate::engine;
use crate::error::RecordResult;
use crate::freeze;
use crate::path::RecordPath;
use crate::policy::{FactoryConfig, FreezePolicy};
use crate::record::{Fields, ImmutableRecord};
use crate::value::Value;

/// Builds and updates records under a freeze policy.
///
/// # Examples
///
/// ```
/// use irecord::{FreezePolicy, RecordFactory};
/// use serde_json::json;
///
/// let factory = RecordFactory::with_policy(FreezePolicy::Shallow);
/// let r = factory.create_from_json(json!({"a": 1, "d": {"e": 2}}));
///
/// assert!(r.assign("a", 22).is_err());
/// assert_eq!(r.get_path("a").unwrap().unwrap().as_int(), Some(1));
///
/// let r2 = factory.set(&r, "d.e", 3).unwrap();
/// assert!(r2.is_frozen());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFactory {
    config: FactoryConfig,
}

impl RecordFactory {
    /// Creates a factory from configuration.
    #[must_use]
    pub const fn new(config: FactoryConfig) -> Self {
        Self { config }
    }

    /// Factory pinned to `policy`; ignores the process-wide default.
    #[must_use]
    pub const fn with_policy(policy: FreezePolicy) -> Self {
        Self::new(FactoryConfig::with_policy(policy))
    }

    /// Factory that follows the process-wide default.
    #[must_use]
    pub const fn global() -> Self {
        Self::new(FactoryConfig {
            freeze_policy: None,
        })
    }

    /// The configuration this factory was built with.
    #[must_use]
    pub const fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// The policy this factory applies right now.
    #[must_use]
    pub fn policy(&self) -> FreezePolicy {
        self.config.effective_policy()
    }

    /// Creates a record holding the own keys of `source`, or an empty one.
    ///
    /// The copy is shallow: nested records are shared with `source`, so a
    /// `DEEP` policy freezes those shared nodes as well.
    #[must_use]
    pub fn create(&self, source: Option<&ImmutableRecord>) -> ImmutableRecord {
        let fields = source.map(ImmutableRecord::shallow_fields).unwrap_or_default();
        self.seal(fields)
    }

    /// Creates a record from any value. Non-record input yields an empty record.
    #[must_use]
    pub fn create_from_value(&self, source: &Value) -> ImmutableRecord {
        match source {
            Value::Record(record) => self.create(Some(record)),
            other => {
                tracing::debug!(kind = other.type_name(), "non-record source, creating empty record");
                self.create(None)
            }
        }
    }

    /// Creates a record from key/value pairs.
    pub fn create_from_entries<I, K, V>(&self, entries: I) -> ImmutableRecord
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.seal(fields)
    }

    /// Creates a record from JSON. Non-object JSON yields an empty record.
    #[must_use]
    pub fn create_from_json(&self, json: serde_json::Value) -> ImmutableRecord {
        match json {
            serde_json::Value::Object(map) => {
                let fields = map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect();
                self.seal(fields)
            }
            other => self.create_from_value(&Value::from_json(other)),
        }
    }

    /// Parses `path` and returns a new record with `value` written there.
    ///
    /// # Errors
    ///
    /// - `RecordError::InvalidPath` for malformed paths (checked before any copy)
    /// - see [`engine::apply`] for traversal errors
    pub fn set(
        &self,
        record: &ImmutableRecord,
        path: &str,
        value: impl Into<Value>,
    ) -> RecordResult<ImmutableRecord> {
        let path = RecordPath::parse(path)?;
        self.set_in(record, &path, value)
    }

    /// Like [`RecordFactory::set`] with an already parsed path.
    ///
    /// # Errors
    ///
    /// See [`engine::apply`].
    pub fn set_in(
        &self,
        record: &ImmutableRecord,
        path: &RecordPath,
        value: impl Into<Value>,
    ) -> RecordResult<ImmutableRecord> {
        engine::apply(record, path, value.into(), self.policy())
    }

    /// Wraps `fields` in a new node and applies the policy.
    pub(crate) fn seal(&self, fields: Fields) -> ImmutableRecord {
        let policy = self.policy();
        let record = ImmutableRecord::from_fields(fields);
        freeze::lock_record(&record, policy);
        tracing::debug!(policy = %policy, keys = record.len(), "record created");
        record
    }
}

impl From<FactoryConfig> for RecordFactory {
    fn from(config: FactoryConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_without_source_is_empty() {
        let r = RecordFactory::with_policy(FreezePolicy::None).create(None);
        assert!(r.is_empty());
        assert!(!r.is_frozen());
    }

    #[test]
    fn create_copies_own_keys_shallowly() {
        let factory = RecordFactory::with_policy(FreezePolicy::None);
        let source = factory.create_from_json(json!({"a": 1, "d": {"e": 2}}));
        let copy = factory.create(Some(&source));

        assert_eq!(copy, source);
        assert!(!copy.ptr_eq(&source));
        let d_source = source.get("d").unwrap();
        let d_copy = copy.get("d").unwrap();
        assert!(d_source.as_record().unwrap().ptr_eq(d_copy.as_record().unwrap()));
    }

    #[test]
    fn non_record_sources_yield_empty_records() {
        let factory = RecordFactory::with_policy(FreezePolicy::None);
        assert!(factory.create_from_value(&Value::Int(3)).is_empty());
        assert!(factory.create_from_json(json!([1, 2, 3])).is_empty());
        assert!(factory.create_from_json(json!("text")).is_empty());
    }

    #[test]
    fn create_from_entries() {
        let factory = RecordFactory::with_policy(FreezePolicy::Shallow);
        let r = factory.create_from_entries([("a", Value::Int(1)), ("b", Value::from("x"))]);
        assert_eq!(r.to_json(), json!({"a": 1, "b": "x"}));
        assert!(r.is_frozen());
    }

    #[test]
    fn set_rejects_invalid_paths_before_copying() {
        let factory = RecordFactory::with_policy(FreezePolicy::None);
        let r = factory.create_from_json(json!({"a": 1}));
        for bad in ["", ".", "a.", ".a", "a..b"] {
            let err = factory.set(&r, bad, 1).unwrap_err();
            assert!(err.is_invalid_path(), "{bad:?} should be rejected");
        }
        assert_eq!(r.to_json(), json!({"a": 1}));
    }

    #[test]
    fn pinned_policy_is_reported() {
        assert_eq!(RecordFactory::with_policy(FreezePolicy::Deep).policy(), FreezePolicy::Deep);
        assert_eq!(RecordFactory::global().config().freeze_policy, None);
        let factory: RecordFactory = FactoryConfig::with_policy(FreezePolicy::Shallow).into();
        assert_eq!(factory.policy(), FreezePolicy::Shallow);
    }
}

//! The immutable record type.
//!
//! An [`ImmutableRecord`] is a handle to a shared node holding string keys
//! and [`Value`]s. Cloning the handle shares the node, the same way two
//! variables can point at one object. Updates go through [`ImmutableRecord::set`],
//! which never touches the receiver and returns a new generation that shares
//! every untouched subtree.
//!
//! Nodes can additionally be frozen (see [`crate::freeze`]); a frozen node
//! rejects direct writes made with [`ImmutableRecord::assign`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine;
use crate::error::{RecordError, RecordResult};
use crate::factory::RecordFactory;
use crate::path::RecordPath;
use crate::policy::FreezePolicy;
use crate::settable::Settable;
use crate::value::Value;

pub(crate) type Fields = BTreeMap<String, Value>;

/// Serializes direct writes that link one node to another, so the cycle
/// check and the insert happen as one step across all records.
static LINK_GATE: Mutex<()> = Mutex::new(());

struct RecordNode {
    fields: RwLock<Fields>,
    frozen: AtomicBool,
}

/// A record whose updates produce new records.
///
/// # Examples
///
/// ```
/// use irecord::ImmutableRecord;
/// use serde_json::json;
///
/// let r = ImmutableRecord::from_json(json!({"a": 1, "d": {"a": {"b": {"c": 10}}}}));
/// let r2 = r.set("a", 5).unwrap().set("d.a.b.c", 50).unwrap();
///
/// assert_eq!(r.to_json(), json!({"a": 1, "d": {"a": {"b": {"c": 10}}}}));
/// assert_eq!(r2.to_json(), json!({"a": 5, "d": {"a": {"b": {"c": 50}}}}));
/// ```
#[derive(Clone)]
pub struct ImmutableRecord {
    node: Arc<RecordNode>,
}

impl ImmutableRecord {
    /// Creates an empty record using the process-wide freeze policy.
    #[must_use]
    pub fn new() -> Self {
        RecordFactory::default().create(None)
    }

    /// Shallow copy of `source` using the process-wide freeze policy.
    #[must_use]
    pub fn from_record(source: &ImmutableRecord) -> Self {
        RecordFactory::default().create(Some(source))
    }

    /// Builds a record from key/value pairs using the process-wide freeze policy.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        RecordFactory::default().create_from_entries(entries)
    }

    /// Builds a record from JSON using the process-wide freeze policy.
    ///
    /// Non-object JSON yields an empty record.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        RecordFactory::default().create_from_json(json)
    }

    /// Returns a new record with `value` written at the dotted `path`.
    ///
    /// Uses the process-wide freeze policy as it is at call time.
    ///
    /// # Errors
    ///
    /// - `RecordError::InvalidPath` for empty or malformed paths
    /// - `RecordError::TypeMismatch` when the path runs through a non-record
    /// - any error reported by a delegated container
    pub fn set(&self, path: &str, value: impl Into<Value>) -> RecordResult<Self> {
        RecordFactory::default().set(self, path, value)
    }

    /// Writes `key` in place.
    ///
    /// The write is visible through every handle sharing this node. This is
    /// the mutation that freezing blocks.
    ///
    /// # Errors
    ///
    /// - `RecordError::Frozen` if the node is frozen (the node is unchanged)
    /// - `RecordError::Cycle` if `value` already contains this record, directly
    ///   or through a container
    pub fn assign(&self, key: impl Into<String>, value: impl Into<Value>) -> RecordResult<()> {
        let key = key.into();
        let value = value.into();

        let held = value.held_records();
        if held.is_empty() {
            return self.insert(key, value);
        }

        let _link = LINK_GATE
            .lock()
            .map_err(|_| RecordError::internal("record link gate poisoned"))?;
        if held.iter().any(|child| child.ptr_eq(self) || child.reaches(self)) {
            tracing::debug!(key = %key, "direct write rejected: would create a cycle");
            return Err(RecordError::Cycle { key });
        }
        self.insert(key, value)
    }

    fn insert(&self, key: String, value: Value) -> RecordResult<()> {
        let mut fields = self
            .node
            .fields
            .write()
            .map_err(|_| RecordError::internal("record lock poisoned"))?;
        if self.is_frozen() {
            tracing::debug!(key = %key, "direct write rejected on frozen record");
            return Err(RecordError::Frozen { key });
        }
        fields.insert(key, value);
        Ok(())
    }

    /// Reads an own key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields().get(key).cloned()
    }

    /// Follows `path` through nested records and containers.
    #[must_use]
    pub fn get_in(&self, path: &RecordPath) -> Option<Value> {
        let (head, _) = path.split_first();
        let mut current = self.get(head)?;
        for segment in &path.segments()[1..] {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Parses `path` and follows it.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidPath` for malformed paths.
    pub fn get_path(&self, path: &str) -> RecordResult<Option<Value>> {
        let path = RecordPath::parse(path)?;
        Ok(self.get_in(&path))
    }

    /// True if `key` is an own key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields().contains_key(key)
    }

    /// Own keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.fields().keys().cloned().collect()
    }

    /// Snapshot of the own entries in key order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of own keys.
    pub fn len(&self) -> usize {
        self.fields().len()
    }

    /// True if the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Returns true once the node has been locked.
    pub fn is_frozen(&self) -> bool {
        self.node.frozen.load(Ordering::Acquire)
    }

    /// True when both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// JSON-shaped snapshot of the record.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Builds an unfrozen node directly from fields.
    pub(crate) fn from_fields(fields: Fields) -> Self {
        Self {
            node: Arc::new(RecordNode {
                fields: RwLock::new(fields),
                frozen: AtomicBool::new(false),
            }),
        }
    }

    /// Unfrozen node built from a JSON object, nested objects included.
    pub(crate) fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::from_fields(
            map.into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect(),
        )
    }

    /// Copy of the own key/value pairs. Nested values are shared.
    pub(crate) fn shallow_fields(&self) -> Fields {
        self.fields().clone()
    }

    /// Marks the node frozen. Returns false if it already was.
    pub(crate) fn freeze_node(&self) -> bool {
        // Taken so a concurrent `assign` either lands before the freeze or sees it.
        let _guard = self
            .node
            .fields
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        !self.node.frozen.swap(true, Ordering::AcqRel)
    }

    fn fields(&self) -> RwLockReadGuard<'_, Fields> {
        self.node
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// True if `target` is reachable through nested records or containers.
    ///
    /// `target`'s own node is never read, only compared.
    fn reaches(&self, target: &ImmutableRecord) -> bool {
        let mut stack = vec![self.clone()];
        let mut seen = HashSet::new();
        while let Some(record) = stack.pop() {
            if !seen.insert(Arc::as_ptr(&record.node)) {
                continue;
            }
            let children: Vec<ImmutableRecord> = record
                .fields()
                .values()
                .flat_map(Value::held_records)
                .collect();
            for child in children {
                if child.ptr_eq(target) {
                    return true;
                }
                stack.push(child);
            }
        }
        false
    }
}

impl Default for ImmutableRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ImmutableRecord {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.fields() == *other.fields()
    }
}

impl fmt::Debug for ImmutableRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields().iter()).finish()
    }
}

impl fmt::Display for ImmutableRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ImmutableRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

impl Serialize for ImmutableRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (k, v) in fields.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ImmutableRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Fields::deserialize(deserializer)?;
        Ok(RecordFactory::default().seal(fields))
    }
}

impl Settable for ImmutableRecord {
    fn set(&self, path: &RecordPath, value: Value, policy: FreezePolicy) -> RecordResult<Value> {
        engine::apply(self, path, value, policy).map(Value::Record)
    }

    fn get(&self, key: &str) -> Option<Value> {
        ImmutableRecord::get(self, key)
    }

    fn freeze(&self, policy: FreezePolicy) {
        crate::freeze::lock_record(self, policy);
    }

    fn nested_records(&self) -> Vec<ImmutableRecord> {
        vec![self.clone()]
    }

    fn is_frozen(&self) -> bool {
        ImmutableRecord::is_frozen(self)
    }

    fn to_json(&self) -> serde_json::Value {
        ImmutableRecord::to_json(self)
    }

    fn type_name(&self) -> &'static str {
        "record"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(json: serde_json::Value) -> ImmutableRecord {
        match Value::from_json(json) {
            Value::Record(r) => r,
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_clone_shares_node() {
        let r = plain(json!({"a": 1}));
        let alias = r.clone();
        assert!(r.ptr_eq(&alias));

        r.assign("a", 2).unwrap();
        assert_eq!(alias.get("a"), Some(Value::Int(2)));
    }

    #[test]
    fn test_equality_is_structural() {
        let a = plain(json!({"x": {"y": 1}}));
        let b = plain(json!({"x": {"y": 1}}));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);

        b.freeze_node();
        assert_eq!(a, b, "frozen state must not affect equality");
    }

    #[test]
    fn test_assign_rejected_when_frozen() {
        let r = plain(json!({"a": 1}));
        assert!(r.freeze_node());
        assert!(!r.freeze_node(), "second freeze reports no change");

        let err = r.assign("a", 99).unwrap_err();
        assert!(err.is_frozen());
        let err = r.assign("new", 1).unwrap_err();
        assert!(err.is_frozen());
        assert_eq!(r.to_json(), json!({"a": 1}));
    }

    #[test]
    fn test_assign_rejects_cycles() {
        let outer = plain(json!({"inner": {}}));
        let inner = outer.get("inner").unwrap().as_record().unwrap().clone();

        assert!(matches!(
            outer.assign("me", outer.clone()),
            Err(RecordError::Cycle { .. })
        ));
        assert!(matches!(
            inner.assign("up", outer.clone()),
            Err(RecordError::Cycle { .. })
        ));
        assert_eq!(outer.keys(), vec!["inner".to_string()]);
    }

    #[test]
    fn test_assign_rejects_cycles_through_containers() {
        let r = plain(json!({"inner": {}}));
        let inner = r.get("inner").unwrap().as_record().unwrap().clone();

        let err = r
            .assign("me", Value::Container(Arc::new(r.clone())))
            .unwrap_err();
        assert!(matches!(err, RecordError::Cycle { .. }));

        // `inner` -> box(r) -> inner
        let err = inner
            .assign("up", Value::Container(Arc::new(r.clone())))
            .unwrap_err();
        assert!(matches!(err, RecordError::Cycle { .. }));

        assert_eq!(r.to_json(), json!({"inner": {}}));
    }

    #[test]
    fn test_assign_detects_cycles_behind_existing_containers() {
        let a = plain(json!({}));
        let b = plain(json!({}));
        a.assign("b", Value::Container(Arc::new(b.clone()))).unwrap();

        let err = b.assign("a", a.clone()).unwrap_err();
        assert!(matches!(err, RecordError::Cycle { .. }));
        assert!(b.is_empty());
    }

    #[test]
    fn test_concurrent_cross_links_leave_no_cycle() {
        for _ in 0..64 {
            let a = plain(json!({}));
            let b = plain(json!({}));
            let results = std::thread::scope(|scope| {
                let left = scope.spawn(|| a.assign("b", b.clone()));
                let right = scope.spawn(|| b.assign("a", a.clone()));
                [left.join().unwrap(), right.join().unwrap()]
            });

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(a.is_empty() || b.is_empty());
        }
    }

    #[test]
    fn test_record_container_freezes_with_policy() {
        let r = plain(json!({"x": {"y": 1}}));
        let container: &dyn Settable = &r;

        container.freeze(FreezePolicy::Shallow);
        assert!(r.is_frozen());
        assert!(!r.get("x").unwrap().as_record().unwrap().is_frozen());

        let r = plain(json!({"x": {"y": 1}}));
        let container: &dyn Settable = &r;
        container.freeze(FreezePolicy::Deep);
        assert!(r.get("x").unwrap().as_record().unwrap().is_frozen());
    }

    #[test]
    fn test_get_path() {
        let r = plain(json!({"d": {"a": {"b": {"c": 10}}}, "n": 3}));
        assert_eq!(r.get_path("d.a.b.c").unwrap(), Some(Value::Int(10)));
        assert_eq!(r.get_path("d.a.missing").unwrap(), None);
        assert_eq!(r.get_path("n.x").unwrap(), None);
        assert!(r.get_path("d..a").is_err());
    }

    #[test]
    fn test_keys_and_entries() {
        let r = plain(json!({"b": 2, "a": 1}));
        assert_eq!(r.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(r.len(), 2);
        assert!(!r.is_empty());
        assert!(r.contains_key("a"));
        assert_eq!(r.entries()[1], ("b".to_string(), Value::Int(2)));
    }

    #[test]
    fn test_serialization_has_only_data() {
        let r = plain(json!({"a": 1, "d": {"e": "x"}}));
        r.freeze_node();
        let text = serde_json::to_string(&r).unwrap();
        assert_eq!(text, r#"{"a":1,"d":{"e":"x"}}"#);
        assert!(!text.contains("set"));
        assert!(!text.contains("frozen"));
    }

    #[test]
    fn test_display_and_debug() {
        let r = plain(json!({"a": 1}));
        assert_eq!(r.to_string(), r#"{"a":1}"#);
        assert_eq!(format!("{r:?}"), r#"{"a": Int(1)}"#);
    }
}

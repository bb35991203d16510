//! Freeze enforcement.
//!
//! [`lock`] changes the frozen state of exactly the nodes it is given; it
//! never copies. Under `DEEP` it walks nested records and hands the policy
//! to containers so they lock what they hold. Anything already frozen is
//! skipped, which also stops the walk on shared subtrees.

use crate::policy::FreezePolicy;
use crate::record::ImmutableRecord;
use crate::value::Value;

/// Applies `policy` to `value` and returns it.
///
/// Primitives and opaque JSON pass through untouched under every policy.
///
/// # Examples
///
/// ```
/// use irecord::{freeze, FreezePolicy, RecordFactory, Value};
/// use serde_json::json;
///
/// let r = RecordFactory::with_policy(FreezePolicy::None).create_from_json(json!({"a": 1}));
/// let locked = freeze::lock(Value::Record(r.clone()), FreezePolicy::Shallow);
/// assert!(r.is_frozen());
/// assert!(r.assign("a", 2).is_err());
/// assert_eq!(locked, Value::Record(r));
/// ```
#[must_use]
pub fn lock(value: Value, policy: FreezePolicy) -> Value {
    match policy {
        FreezePolicy::None => {}
        FreezePolicy::Shallow => lock_one(&value),
        FreezePolicy::Deep => lock_deep(&value),
    }
    value
}

/// Applies `policy` to a record.
pub fn lock_record(record: &ImmutableRecord, policy: FreezePolicy) {
    match policy {
        FreezePolicy::None => {}
        FreezePolicy::Shallow => {
            record.freeze_node();
        }
        FreezePolicy::Deep => lock_deep_record(record),
    }
}

fn lock_one(value: &Value) {
    match value {
        Value::Record(record) => {
            record.freeze_node();
        }
        Value::Container(container) => container.freeze(FreezePolicy::Shallow),
        _ => {}
    }
}

fn lock_deep(value: &Value) {
    match value {
        Value::Record(record) => lock_deep_record(record),
        Value::Container(container) => container.freeze(FreezePolicy::Deep),
        _ => {}
    }
}

fn lock_deep_record(root: &ImmutableRecord) {
    root.freeze_node();

    let mut pending = vec![root.clone()];
    while let Some(record) = pending.pop() {
        for (key, value) in record.entries() {
            match value {
                Value::Record(child) => {
                    if child.freeze_node() {
                        tracing::trace!(key = %key, "froze nested record");
                        pending.push(child);
                    }
                }
                Value::Container(container) => {
                    if !container.is_frozen() {
                        tracing::trace!(key = %key, kind = container.type_name(), "froze nested container");
                        container.freeze(FreezePolicy::Deep);
                    }
                }
                _ => {}
            }
        }
    }
}

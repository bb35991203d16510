//! Path-set engine.
//!
//! `apply(record, "a.b.c", v)` is the immutable equivalent of
//! `record.a.b.c = v`: every record on the path is shallow-copied, the leaf
//! is assigned on the deepest copy, and the copies are linked back up to a
//! new top-level record. Everything off the path is shared with the input.
//!
//! Key invariants:
//! - The input record and every node reachable from it are never written.
//! - Each rebuilt node passes through the freeze step as it is produced.
//! - A specialized container met on the path receives the remaining
//!   sub-path through its own `Settable::set`.
//! - A missing key on the path is treated as an empty record.

use crate::error::{RecordError, RecordResult};
use crate::freeze;
use crate::path::{RecordPath, SEPARATOR};
use crate::policy::FreezePolicy;
use crate::record::{Fields, ImmutableRecord};
use crate::value::Value;

/// Returns a new record with `value` written at `path`.
///
/// # Errors
///
/// - `RecordError::TypeMismatch` if an intermediate segment holds a value
///   that is neither a record nor a container (including `null`)
/// - whatever a delegated container returns
///
/// On error nothing has been modified.
pub fn apply(
    record: &ImmutableRecord,
    path: &RecordPath,
    value: Value,
    policy: FreezePolicy,
) -> RecordResult<ImmutableRecord> {
    let updated = rebuild(record.shallow_fields(), path, 0, value, policy)?;
    tracing::debug!(path = %path, policy = %policy, keys = updated.len(), "record set");
    Ok(updated)
}

fn rebuild(
    mut fields: Fields,
    path: &RecordPath,
    depth: usize,
    value: Value,
    policy: FreezePolicy,
) -> RecordResult<ImmutableRecord> {
    let segments = path.segments();
    let key = &segments[depth];

    let child = if depth + 1 == segments.len() {
        value
    } else {
        match fields.get(key) {
            Some(Value::Record(child)) => {
                Value::Record(rebuild(child.shallow_fields(), path, depth + 1, value, policy)?)
            }
            Some(Value::Container(container)) => {
                let rest = RecordPath::from_segments(segments[depth + 1..].iter().cloned())?;
                tracing::trace!(
                    key = %key,
                    rest = %rest,
                    kind = container.type_name(),
                    "delegating set to container"
                );
                container.set(&rest, value, policy)?
            }
            None => Value::Record(rebuild(Fields::new(), path, depth + 1, value, policy)?),
            Some(other) => {
                return Err(RecordError::TypeMismatch {
                    path: segments[..=depth].join(SEPARATOR),
                    found: other.type_name(),
                });
            }
        }
    };

    fields.insert(key.clone(), child);
    let copy = ImmutableRecord::from_fields(fields);
    freeze::lock_record(&copy, policy);
    Ok(copy)
}

//! The `Settable` capability.
//!
//! Any container that can answer `set(path, value) -> new container` can sit
//! inside a record and take part in path updates. When the path-set engine
//! walks into such a value it hands the remaining sub-path to the container
//! instead of treating it as a plain record.

use std::fmt;

use crate::error::RecordResult;
use crate::path::RecordPath;
use crate::policy::FreezePolicy;
use crate::record::ImmutableRecord;
use crate::value::Value;

/// A container with its own immutable update semantics.
///
/// Implementations must never mutate `self` in `set`; they return the
/// updated container as a new [`Value`].
pub trait Settable: fmt::Debug + Send + Sync {
    /// Produces a new container with `value` written at `path`.
    ///
    /// `policy` is the freeze policy in effect for the enclosing update.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures, typically as
    /// `RecordError::Container`.
    fn set(&self, path: &RecordPath, value: Value, policy: FreezePolicy) -> RecordResult<Value>;

    /// Reads a direct child, used for path lookups.
    fn get(&self, key: &str) -> Option<Value>;

    /// Locks the container against direct writes.
    ///
    /// Called with `Shallow` or `Deep`. Under `Deep` the container must also
    /// lock every record or container it holds, e.g. with
    /// [`crate::freeze::lock`].
    fn freeze(&self, policy: FreezePolicy);

    /// Returns true once `freeze` has been called.
    fn is_frozen(&self) -> bool;

    /// Records held directly by this container.
    ///
    /// Used to reject writes that would close a cycle. Containers holding
    /// records must report them; the default is for containers of plain data.
    fn nested_records(&self) -> Vec<ImmutableRecord> {
        Vec::new()
    }

    /// JSON-shaped snapshot used for serialization and equality.
    fn to_json(&self) -> serde_json::Value;

    /// Human-readable kind of container.
    fn type_name(&self) -> &'static str {
        "container"
    }
}

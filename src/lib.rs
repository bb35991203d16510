//! # irecord - immutable records with path-based updates
//!
//! An [`ImmutableRecord`] wraps key/value data (with arbitrarily nested
//! sub-records) so that changes are expressed as pure functions returning a
//! new record. Unchanged structure is shared between generations.
//!
//! ## Core Concepts
//!
//! - **ImmutableRecord**: shared node of keys and [`Value`]s with a `set`
//!   method that is not part of its data
//! - **Path**: dotted key sequence such as `"person.address.street"`
//! - **Freeze Policy**: `NONE` (default), `SHALLOW` or `DEEP`; how far new
//!   records are locked against direct writes
//! - **Settable**: capability of specialized containers to take part in
//!   path updates with their own semantics
//!
//! ## Usage
//!
//! ```rust
//! use irecord::{FreezePolicy, ImmutableRecord, RecordFactory};
//! use serde_json::json;
//!
//! let r = ImmutableRecord::from_json(json!({"a": 1, "b": 2, "c": 3, "d": {"a": {"b": {"c": 10}}}}));
//! let r2 = r.set("a", 5)?.set("d.a.b.c", 50)?;
//!
//! assert_eq!(r2.to_json(), json!({"a": 5, "b": 2, "c": 3, "d": {"a": {"b": {"c": 50}}}}));
//! assert_eq!(r.to_json(), json!({"a": 1, "b": 2, "c": 3, "d": {"a": {"b": {"c": 10}}}}));
//!
//! // Explicit policy instead of the process-wide default.
//! let strict = RecordFactory::with_policy(FreezePolicy::Deep);
//! let locked = strict.create(Some(&r2));
//! assert!(locked.assign("a", 0).is_err());
//! # Ok::<(), irecord::RecordError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod factory;
pub mod freeze;
pub mod path;
pub mod policy;
pub mod record;
pub mod settable;
pub mod value;

// Re-export primary types at crate root for convenience
pub use error::{PathError, RecordError, RecordResult};
pub use factory::RecordFactory;
pub use path::RecordPath;
pub use policy::{FactoryConfig, FreezePolicy, ParsePolicyError};
pub use record::ImmutableRecord;
pub use settable::Settable;
pub use value::Value;

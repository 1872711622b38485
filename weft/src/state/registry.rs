//! Process-wide registry of serializable state shapes, keyed by a stable type tag.
//!
//! A persistence layer stores a [`TypedState`](super::TypedState) envelope and uses the
//! tag to decide which shape to decode. A tag maps to exactly one Rust type for the
//! lifetime of the process.

use std::any::{type_name, TypeId};

use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;

use super::ConversationState;

/// Stable type tag of [`ConversationState`].
pub const REACT_STATE_TAG: &str = "_weft_react_state";

static REGISTRY: Lazy<DashMap<&'static str, (TypeId, &'static str)>> = Lazy::new(DashMap::new);

static REACT_STATE_REGISTRATION: OnceCell<Result<(), StateTypeError>> = OnceCell::new();

/// Errors from registering or decoding tagged state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateTypeError {
    /// The tag is already registered for a different type.
    #[error("state type tag {tag} already registered for {existing}")]
    TagConflict { tag: String, existing: String },

    /// A tagged envelope carries a different tag than the one being decoded.
    #[error("state type tag mismatch: expected {expected}, found {found}")]
    TagMismatch { expected: String, found: String },

    /// Encoding or decoding the state failed.
    #[error("state codec error: {0}")]
    Codec(String),
}

/// Registers `T` under `tag`. Registering the same type again is a no-op.
pub fn register_serializable_type<T: 'static>(tag: &'static str) -> Result<(), StateTypeError> {
    let entry = REGISTRY
        .entry(tag)
        .or_insert_with(|| (TypeId::of::<T>(), type_name::<T>()));
    let (type_id, existing) = *entry.value();
    if type_id != TypeId::of::<T>() {
        return Err(StateTypeError::TagConflict {
            tag: tag.to_string(),
            existing: existing.to_string(),
        });
    }
    tracing::debug!(tag, type_name = type_name::<T>(), "state type registered");
    Ok(())
}

/// True when `tag` has been registered (for any type).
pub fn is_registered(tag: &str) -> bool {
    REGISTRY.contains_key(tag)
}

/// Registers [`ConversationState`] under [`REACT_STATE_TAG`], once per process.
///
/// Later calls return the outcome of the first one.
pub fn register_state_type() -> Result<(), StateTypeError> {
    REACT_STATE_REGISTRATION
        .get_or_init(|| register_serializable_type::<ConversationState>(REACT_STATE_TAG))
        .clone()
}

//! State types for the ReAct graph.
//!
//! - [`ConversationState`]: history plus the direct-return marker; the persistable part of a run.
//! - [`ReActState`]: the graph state of one run (conversation plus stage hand-off slots).
//! - [`register_state_type`]: one-time registration of the conversation shape under
//!   [`REACT_STATE_TAG`] for serialization.

mod react_state;
mod registry;

pub use react_state::{ConversationState, ModelOutput, ReActState, TypedState};
pub use registry::{
    is_registered, register_serializable_type, register_state_type, StateTypeError,
    REACT_STATE_TAG,
};

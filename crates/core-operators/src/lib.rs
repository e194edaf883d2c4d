//! Vim-style operators over `core-state`.
//!
//! An operator combines a target (motion or text object) with a mutation:
//! it selects, edits every selection inside one transaction, writes
//! registers and change marks, and settles the editor mode. Operators are
//! rows in a registry (`spec::OPERATORS`) interpreted by one engine on
//! `Session`; families only contribute the per-selection step.

pub mod error;
pub mod input;
pub mod operator;
pub mod session;
pub mod spec;
pub mod target;

mod delete;
mod external;
mod increment;
mod insert;
mod misc;
mod put;
mod replace;
mod select_list;
mod surround;
mod transform;

pub use error::{OperatorError, Outcome};
pub use external::run_filters;
pub use input::{InputPrompt, InputSource, ScriptedInput, SelectItem};
pub use operator::{Operator, OperatorRequest, TargetRequest};
pub use session::Session;
pub use spec::{
    Behavior, InsertKind, OPERATORS, OperatorFlags, OperatorSpec, lookup, operator_names,
};
pub use target::{
    Motion, MotionKind, Pair, Target, TargetKind, TextObject, TextObjectKind, resolve_target,
    target_names,
};

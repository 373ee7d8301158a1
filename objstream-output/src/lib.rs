//! # objstream-output
//!
//! Output machinery for the objstream engine: the partial-JSON parser that
//! turns truncated buffers into best-effort values, structural equality for
//! snapshot deduplication, schema descriptors, the per-shape output
//! strategies, and the provider-mode adapters.
//!
//! ## Shapes and modes
//!
//! The caller picks an output *shape* (`object`, `array`, `no-schema`) and
//! the engine resolves a provider *mode* (`json` text deltas vs. `tool`
//! call arguments). Strategies own shape semantics; [`ModePlan`] owns mode
//! semantics. The two compose freely except `no-schema` + `tool`, which is
//! rejected because tool mode has nothing to declare as tool parameters.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod equality;
pub mod error;
pub mod mode;
pub mod partial;
pub mod schema;
pub mod strategy;

pub use equality::deep_equal;
pub use error::{NoObjectCause, NoObjectGeneratedError, TypeValidationError};
pub use mode::{
    schema_system_prompt, DeltaExtract, ModePlan, DEFAULT_TOOL_DESCRIPTION, DEFAULT_TOOL_NAME,
    NO_SCHEMA_SYSTEM_PROMPT,
};
pub use partial::{parse_partial_json, ParseState, ParsedJson};
pub use schema::{Schema, ValidateFn};
pub use strategy::{
    snapshot_changed, strategy_for, FinalOutput, OutputStrategy, PartialUpdate,
};

//! # objstream-provider
//!
//! The provider contract consumed by the objstream engine: the
//! [`LanguageModel`] trait, call options, the streamed [`Fragment`]
//! vocabulary, and a [`MockLanguageModel`] test double that replays
//! scripted fragment transcripts while recording every call it receives.
//!
//! Transport concerns (HTTP, retries, pooling) live entirely behind
//! [`LanguageModel::do_stream`]; the engine only sees an ordered stream of
//! fragments.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod fragment;
pub mod mock;
pub mod model;
pub mod options;
pub mod response;

pub use error::ProviderError;
pub use fragment::Fragment;
pub use mock::MockLanguageModel;
pub use model::{BoxedLanguageModel, LanguageModel};
pub use options::{CallMode, CallOptions, ToolSpec};
pub use response::{CallWarning, FragmentStream, RawCall, RawResponse, StreamResponse};

//! Character-level formal letter generation library.
//!
//! This crate provides a complete train-and-generate pipeline:
//! - Corpus cleaning and character vocabulary construction
//! - A recurrent (LSTM) next-character model with minibatch training
//! - Temperature-controlled autoregressive sampling
//! - Formal letter assembly around purpose-matched body templates
//!
//! The high-level entry points are `train_letter_model` and
//! `TrainedLetterModel::generate`; the `model` module exposes the
//! individual pipeline stages for callers that need finer control.

/// Error taxonomy shared by the whole pipeline.
pub mod error;

/// Corpus normalization.
pub mod corpus;

/// Model pipeline: vocabulary, windows, encoder, network, trainer,
/// sampler and generator.
pub mod model;

/// Letter assembly and the high-level train/generate facade.
pub mod letter;

/// I/O utilities (corpus loading, path helpers).
pub mod io;

pub use error::{LetterGenError, Result};
pub use letter::{
	body_template, compose_letter, train_letter_model, LetterRequest, TrainedLetterModel,
};
pub use model::trainer::TrainingConfig;

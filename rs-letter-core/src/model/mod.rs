//! Top-level module for the character-level letter model.
//!
//! This module wires the full training and generation pipeline:
//! - Vocabulary construction (`Vocabulary`)
//! - Training window extraction (`Window`, `sample_windows`)
//! - One-hot encoding (`encoder`)
//! - The recurrent network itself (`SequenceModel`)
//! - Minibatch training (`TrainingConfig`, `fit`)
//! - Temperature sampling (`sample_index`)
//! - Autoregressive generation (`Generator`)

/// Ordered character set with bijective char/index maps.
///
/// Built once from the cleaned corpus and shared read-only by the
/// encoder, the sampler and the generator.
pub mod vocabulary;

/// Supervised training windows sliced from the corpus.
pub mod dataset;

/// One-hot encoding of contexts and window batches.
pub mod encoder;

/// The LSTM next-character model.
///
/// Handles weight initialization, the stateless forward pass, and
/// backpropagation through time for the trainer.
pub mod network;

/// Minibatch cross-entropy training with RMSprop.
pub mod trainer;

/// Temperature-controlled multinomial sampling.
pub mod sampler;

/// High-level interface for generating body text from a trained model.
///
/// Exposes seed selection and the autoregressive sampling walk with
/// configurable length and temperature.
pub mod generator;

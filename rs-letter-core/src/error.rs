use thiserror::Error;

/// Errors produced by the letter generation pipeline.
///
/// Setup errors (`EmptyCorpus`, `InsufficientData`) abort model construction.
/// Generation errors (`UnknownCharacter`, `InvalidTemperature`,
/// `InvalidDistribution`) abort a single call and leave trained
/// parameters untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LetterGenError {
	/// The cleaned corpus contained no characters.
	#[error("corpus is empty after cleaning")]
	EmptyCorpus,

	/// The corpus was too short to produce a single training window
	/// or a generation seed.
	#[error("corpus is too short to sample training windows")]
	InsufficientData,

	/// A character outside the vocabulary was encountered during encoding.
	#[error("character {0:?} is not in the vocabulary")]
	UnknownCharacter(char),

	/// Temperature must be strictly positive.
	#[error("temperature must be > 0, got {0}")]
	InvalidTemperature(f64),

	/// A probability vector handed to the sampler contained a
	/// non-positive or non-finite entry.
	#[error("invalid probability {value} at index {index}")]
	InvalidDistribution {
		index: usize,
		value: f64,
	},
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, LetterGenError>;

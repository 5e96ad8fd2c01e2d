use ndarray::{Array2, Array3};

use crate::error::Result;
use crate::model::dataset::Window;
use crate::model::vocabulary::Vocabulary;

/// One-hot encodes a context string into a `(seq_len, vocab)` matrix.
///
/// Row `t` holds a single `1.0` at the vocabulary index of the `t`-th
/// character of the context.
///
/// # Errors
/// Returns `UnknownCharacter` if any character is missing from the
/// vocabulary.
pub fn encode_context(context: &str, vocabulary: &Vocabulary) -> Result<Array2<f32>> {
	let seq_len = context.chars().count();
	let mut encoded = Array2::zeros((seq_len, vocabulary.len()));

	for (t, c) in context.chars().enumerate() {
		let index = vocabulary.char_to_index(c)?;
		encoded[[t, index]] = 1.0;
	}

	Ok(encoded)
}

/// One-hot encodes a batch of windows.
///
/// # Returns
/// - inputs of shape `(batch, seq_len, vocab)`
/// - targets of shape `(batch, vocab)`, one `1.0` per row at the
///   target character's index
///
/// # Errors
/// Returns `UnknownCharacter` on the first vocabulary miss.
pub fn encode_batch(
	windows: &[Window],
	vocabulary: &Vocabulary,
) -> Result<(Array3<f32>, Array2<f32>)> {
	let seq_len = windows.first().map_or(0, |w| w.context.chars().count());
	let mut inputs = Array3::zeros((windows.len(), seq_len, vocabulary.len()));
	let mut targets = Array2::zeros((windows.len(), vocabulary.len()));

	for (b, window) in windows.iter().enumerate() {
		for (t, c) in window.context.chars().enumerate() {
			let index = vocabulary.char_to_index(c)?;
			inputs[[b, t, index]] = 1.0;
		}
		let target_index = vocabulary.char_to_index(window.target)?;
		targets[[b, target_index]] = 1.0;
	}

	Ok((inputs, targets))
}

use ndarray::Axis;
use rand::Rng;

use crate::error::{LetterGenError, Result};
use crate::model::encoder::encode_context;
use crate::model::network::SequenceModel;
use crate::model::sampler::sample_index;
use crate::model::vocabulary::Vocabulary;

/// Smallest probability fed to the sampler.
///
/// Model outputs can underflow to exactly zero after softmax; clipping
/// here keeps the sampler's strict positive-entry contract intact for
/// genuinely malformed distributions.
pub const PROB_FLOOR: f32 = 1e-12;

/// Body text produced by one generation run.
///
/// The seed is the corpus slice the walk started from; the
/// continuation holds only the sampled characters. The document
/// assembler places them at different points of the letter.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedBody {
	/// Corpus slice used as the initial generation state.
	pub seed: String,
	/// Characters sampled from the model, in order.
	pub continuation: String,
}

/// Autoregressive text generator.
///
/// # Responsibilities
/// - Pick a random seed window from the corpus
/// - Repeatedly encode the current state, query the model and sample
///   the next character
/// - Slide the state window forward one character per step
///
/// The generator borrows everything read-only, so a failed call can
/// never corrupt trained parameters.
#[derive(Debug)]
pub struct Generator<'a> {
	corpus: &'a str,
	vocabulary: &'a Vocabulary,
	model: &'a SequenceModel,
	seq_len: usize,
}

impl<'a> Generator<'a> {
	/// Creates a generator over a trained model.
	///
	/// # Errors
	/// Returns `InsufficientData` when the corpus is too short to
	/// contain a full seed window.
	pub fn new(
		corpus: &'a str,
		vocabulary: &'a Vocabulary,
		model: &'a SequenceModel,
		seq_len: usize,
	) -> Result<Self> {
		if corpus.chars().count() <= seq_len {
			return Err(LetterGenError::InsufficientData);
		}
		Ok(Self { corpus, vocabulary, model, seq_len })
	}

	/// Generates `length` characters of body text.
	///
	/// # Behavior
	/// - Seeds the state from a uniformly random corpus offset
	/// - Samples one character per step at the given temperature
	/// - `length == 0` is valid and yields an empty continuation
	///
	/// All randomness (seed pick and every draw) flows through `rng`,
	/// so a seeded rng reproduces the output exactly.
	///
	/// # Errors
	/// - `InvalidTemperature` when `temperature <= 0`
	/// - `UnknownCharacter` if the state ever leaves the vocabulary
	pub fn generate(
		&self,
		length: usize,
		temperature: f64,
		rng: &mut impl Rng,
	) -> Result<GeneratedBody> {
		let chars: Vec<char> = self.corpus.chars().collect();

		// Uniform seed offset; `new` guarantees the range is non-empty
		let offset = rng.random_range(0..=chars.len() - self.seq_len - 1);
		let seed: String = chars[offset..offset + self.seq_len].iter().collect();

		let mut state: Vec<char> = chars[offset..offset + self.seq_len].to_vec();
		let mut continuation = String::with_capacity(length);

		for _ in 0..length {
			let context: String = state.iter().collect();
			let encoded = encode_context(&context, self.vocabulary)?;
			let batch = encoded.insert_axis(Axis(0));

			let probs = self.model.predict(&batch);
			let clipped: Vec<f32> = probs
				.row(0)
				.iter()
				.map(|p| p.max(PROB_FLOOR))
				.collect();

			let index = sample_index(&clipped, temperature, rng)?;
			// Sampled index is within the vocabulary. Should not panic.
			let next = self.vocabulary.index_to_char(index).unwrap();

			continuation.push(next);
			state.remove(0);
			state.push(next);
		}

		Ok(GeneratedBody { seed, continuation })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::dataset::sample_windows;
	use crate::model::trainer::{fit, TrainingConfig};
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn trained_fixture(corpus: &str, seq_len: usize) -> (Vocabulary, SequenceModel) {
		let vocab = Vocabulary::build(corpus).unwrap();
		let windows = sample_windows(corpus, seq_len, 1);
		let mut rng = StdRng::seed_from_u64(5);
		let mut model = SequenceModel::new(vocab.len(), 8, &mut rng);
		let config = TrainingConfig {
			seq_len,
			stride: 1,
			batch_size: 32,
			epochs: 1,
			learning_rate: 0.01,
			hidden: 8,
		};
		fit(&mut model, &windows, &vocab, &config, &mut rng).unwrap();
		(vocab, model)
	}

	#[test]
	fn too_short_corpus_is_rejected() {
		let corpus = "short";
		let vocab = Vocabulary::build(corpus).unwrap();
		let mut rng = StdRng::seed_from_u64(5);
		let model = SequenceModel::new(vocab.len(), 8, &mut rng);

		assert!(matches!(
			Generator::new(corpus, &vocab, &model, 10),
			Err(LetterGenError::InsufficientData)
		));
	}

	#[test]
	fn zero_length_yields_empty_continuation() {
		let corpus = "the quick brown fox jumps over the lazy dog. ".repeat(3);
		let (vocab, model) = trained_fixture(&corpus, 10);
		let generator = Generator::new(&corpus, &vocab, &model, 10).unwrap();

		let mut rng = StdRng::seed_from_u64(9);
		let body = generator.generate(0, 0.5, &mut rng).unwrap();
		assert!(body.continuation.is_empty());
		assert_eq!(body.seed.chars().count(), 10);
	}

	#[test]
	fn produces_requested_length_from_vocabulary() {
		let corpus = "the quick brown fox jumps over the lazy dog. ".repeat(3);
		let (vocab, model) = trained_fixture(&corpus, 10);
		let generator = Generator::new(&corpus, &vocab, &model, 10).unwrap();

		let mut rng = StdRng::seed_from_u64(9);
		let body = generator.generate(25, 0.5, &mut rng).unwrap();
		assert_eq!(body.continuation.chars().count(), 25);
		assert!(body.continuation.chars().all(|c| vocab.contains(c)));
	}

	#[test]
	fn seeded_rng_reproduces_output() {
		let corpus = "the quick brown fox jumps over the lazy dog. ".repeat(3);
		let (vocab, model) = trained_fixture(&corpus, 10);
		let generator = Generator::new(&corpus, &vocab, &model, 10).unwrap();

		let run = |seed: u64| {
			let mut rng = StdRng::seed_from_u64(seed);
			generator.generate(15, 0.5, &mut rng).unwrap()
		};
		assert_eq!(run(21), run(21));
	}

	#[test]
	fn invalid_temperature_propagates() {
		let corpus = "the quick brown fox jumps over the lazy dog. ".repeat(3);
		let (vocab, model) = trained_fixture(&corpus, 10);
		let generator = Generator::new(&corpus, &vocab, &model, 10).unwrap();

		let mut rng = StdRng::seed_from_u64(9);
		assert_eq!(
			generator.generate(5, 0.0, &mut rng).unwrap_err(),
			LetterGenError::InvalidTemperature(0.0)
		);
	}
}

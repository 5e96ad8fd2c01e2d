use log::info;
use ndarray::{Array2, Zip};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LetterGenError, Result};
use crate::model::dataset::Window;
use crate::model::encoder::encode_batch;
use crate::model::network::SequenceModel;
use crate::model::vocabulary::Vocabulary;

/// Training hyperparameters.
///
/// Defaults: 40-character windows every 3 characters, minibatches of
/// 256, 4 epochs, RMSprop at a 0.01 learning rate over a 128-wide
/// hidden layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingConfig {
	/// Characters per training window.
	pub seq_len: usize,
	/// Offset between consecutive windows.
	pub stride: usize,
	/// Windows per minibatch.
	pub batch_size: usize,
	/// Full passes over the window set.
	pub epochs: usize,
	/// RMSprop base learning rate.
	pub learning_rate: f32,
	/// LSTM hidden width.
	pub hidden: usize,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self {
			seq_len: 40,
			stride: 3,
			batch_size: 256,
			epochs: 4,
			learning_rate: 0.01,
			hidden: 128,
		}
	}
}

/// RMSprop optimizer.
///
/// Keeps one running average of squared gradients per parameter
/// matrix and scales each update by its inverse square root.
struct Rmsprop {
	learning_rate: f32,
	rho: f32,
	epsilon: f32,
	/// One cache per parameter, indexed by the model's parameter slot.
	caches: Vec<Option<Array2<f32>>>,
}

impl Rmsprop {
	fn new(learning_rate: f32) -> Self {
		Self {
			learning_rate,
			rho: 0.9,
			epsilon: 1e-7,
			caches: vec![None; 5],
		}
	}

	/// Updates one parameter matrix in place from its gradient.
	fn update(&mut self, param: &mut Array2<f32>, grad: &Array2<f32>, slot: usize) {
		let (learning_rate, rho, epsilon) = (self.learning_rate, self.rho, self.epsilon);
		let cache = self.caches[slot].get_or_insert_with(|| Array2::zeros(grad.dim()));

		Zip::from(cache.view_mut())
			.and(grad)
			.for_each(|c, g| *c = rho * *c + (1.0 - rho) * g * g);

		Zip::from(param.view_mut())
			.and(cache.view())
			.and(grad)
			.for_each(|p, c, g| *p -= learning_rate * g / (c.sqrt() + epsilon));
	}
}

/// Fits the model on a window set with minibatch gradient descent.
///
/// # Behavior
/// - Shuffles window order every epoch from the injected rng
/// - Encodes one minibatch at a time
/// - Minimizes categorical cross-entropy through full BPTT
/// - Logs one line of loss telemetry per epoch
///
/// # Returns
/// Mean training loss per epoch, in epoch order.
///
/// # Errors
/// Returns `InsufficientData` when the window set is empty and
/// `UnknownCharacter` when a window does not encode against the
/// vocabulary.
pub fn fit(
	model: &mut SequenceModel,
	windows: &[Window],
	vocabulary: &Vocabulary,
	config: &TrainingConfig,
	rng: &mut impl Rng,
) -> Result<Vec<f32>> {
	if windows.is_empty() {
		return Err(LetterGenError::InsufficientData);
	}

	let mut optimizer = Rmsprop::new(config.learning_rate);
	let mut order: Vec<usize> = (0..windows.len()).collect();
	let mut epoch_losses = Vec::with_capacity(config.epochs);

	for epoch in 0..config.epochs {
		order.shuffle(rng);

		let mut loss_sum = 0.0;
		let mut batch_count = 0;

		for chunk in order.chunks(config.batch_size.max(1)) {
			let batch: Vec<Window> = chunk.iter().map(|i| windows[*i].clone()).collect();
			let (inputs, targets) = encode_batch(&batch, vocabulary)?;

			let pass = model.forward(&inputs);
			loss_sum += cross_entropy(&pass.probs, &targets);
			batch_count += 1;

			// Softmax + cross-entropy gradient, averaged over the batch
			let batch_len = batch.len() as f32;
			let d_logits = (&pass.probs - &targets) / batch_len;

			let grads = model.backward(&inputs, &pass, &d_logits);
			model.apply_gradients(&grads, |param, grad, slot| {
				optimizer.update(param, grad, slot);
			});
		}

		let mean_loss = loss_sum / batch_count as f32;
		epoch_losses.push(mean_loss);
		info!(
			"epoch {}/{} - loss {:.4}",
			epoch + 1,
			config.epochs,
			mean_loss
		);
	}

	Ok(epoch_losses)
}

/// Mean categorical cross-entropy over a batch of one-hot targets.
fn cross_entropy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
	let mut total = 0.0;
	for (prob_row, target_row) in probs.rows().into_iter().zip(targets.rows()) {
		for (p, t) in prob_row.iter().zip(target_row.iter()) {
			if *t > 0.0 {
				total -= p.max(1e-10).ln();
			}
		}
	}
	total / probs.nrows() as f32
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::dataset::sample_windows;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn empty_window_set_is_rejected() {
		let vocab = Vocabulary::build("abc").unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		let mut model = SequenceModel::new(vocab.len(), 8, &mut rng);

		let result = fit(&mut model, &[], &vocab, &TrainingConfig::default(), &mut rng);
		assert_eq!(result.unwrap_err(), LetterGenError::InsufficientData);
	}

	#[test]
	fn returns_one_loss_per_epoch() {
		let corpus = "the quick brown fox jumps over the lazy dog. ".repeat(4);
		let vocab = Vocabulary::build(&corpus).unwrap();
		let windows = sample_windows(&corpus, 10, 3);

		let mut rng = StdRng::seed_from_u64(1);
		let mut model = SequenceModel::new(vocab.len(), 16, &mut rng);
		let config = TrainingConfig {
			seq_len: 10,
			stride: 3,
			batch_size: 16,
			epochs: 3,
			learning_rate: 0.01,
			hidden: 16,
		};

		let losses = fit(&mut model, &windows, &vocab, &config, &mut rng).unwrap();
		assert_eq!(losses.len(), 3);
		assert!(losses.iter().all(|l| l.is_finite() && *l > 0.0));
	}

	#[test]
	fn loss_decreases_on_degenerate_corpus() {
		// A single repeated character is trivially learnable.
		let corpus = "ababababababababababababababab";
		let vocab = Vocabulary::build(corpus).unwrap();
		let windows = sample_windows(corpus, 4, 1);

		let mut rng = StdRng::seed_from_u64(3);
		let mut model = SequenceModel::new(vocab.len(), 8, &mut rng);
		let config = TrainingConfig {
			seq_len: 4,
			stride: 1,
			batch_size: 8,
			epochs: 5,
			learning_rate: 0.01,
			hidden: 8,
		};

		let losses = fit(&mut model, &windows, &vocab, &config, &mut rng).unwrap();
		assert!(losses.last().unwrap() < losses.first().unwrap());
	}

	#[test]
	fn default_config_values() {
		let config = TrainingConfig::default();
		assert_eq!(config.seq_len, 40);
		assert_eq!(config.stride, 3);
		assert_eq!(config.batch_size, 256);
		assert_eq!(config.epochs, 4);
		assert_eq!(config.learning_rate, 0.01);
		assert_eq!(config.hidden, 128);
	}
}

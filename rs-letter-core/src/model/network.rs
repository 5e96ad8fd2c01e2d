use ndarray::{s, Array1, Array2, Array3, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Recurrent next-character model: one LSTM layer followed by a dense
/// projection to vocabulary logits and a softmax.
///
/// ## Responsibilities:
/// - Forward pass from one-hot batches to next-character probabilities
/// - Cached forward + backward pass (BPTT) for the trainer
///
/// ## Invariants
/// - Gate weights are stored fused as `(_, 4 * hidden)` matrices in
///   input | forget | cell | output order
/// - Every call processes the full window from zeroed hidden and cell
///   state; no state survives between calls
/// - Parameters are only mutated through `apply_gradients`
#[derive(Clone, Debug)]
pub struct SequenceModel {
	vocab_size: usize,
	hidden: usize,
	/// Input-to-gate weights, `(vocab, 4 * hidden)`.
	w_x: Array2<f32>,
	/// Hidden-to-gate weights, `(hidden, 4 * hidden)`.
	w_h: Array2<f32>,
	/// Gate biases, `(4 * hidden,)`. Forget slice starts at 1.0.
	b: Array1<f32>,
	/// Output projection, `(hidden, vocab)`.
	w_out: Array2<f32>,
	/// Output bias, `(vocab,)`.
	b_out: Array1<f32>,
}

/// Per-timestep activations kept for backpropagation.
#[derive(Clone, Debug)]
pub(crate) struct StepCache {
	pub(crate) input_gate: Array2<f32>,
	pub(crate) forget_gate: Array2<f32>,
	pub(crate) cell_candidate: Array2<f32>,
	pub(crate) output_gate: Array2<f32>,
	pub(crate) cell_prev: Array2<f32>,
	pub(crate) cell_tanh: Array2<f32>,
	pub(crate) hidden_prev: Array2<f32>,
}

/// Everything the backward pass needs from a forward pass.
#[derive(Clone, Debug)]
pub(crate) struct ForwardPass {
	pub(crate) probs: Array2<f32>,
	pub(crate) hidden_last: Array2<f32>,
	pub(crate) steps: Vec<StepCache>,
}

/// Parameter gradients, one buffer per weight matrix.
#[derive(Clone, Debug)]
pub(crate) struct Gradients {
	pub(crate) w_x: Array2<f32>,
	pub(crate) w_h: Array2<f32>,
	pub(crate) b: Array1<f32>,
	pub(crate) w_out: Array2<f32>,
	pub(crate) b_out: Array1<f32>,
}

fn sigmoid(x: &Array2<f32>) -> Array2<f32> {
	x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Glorot-scaled normal initialization.
fn glorot(rows: usize, cols: usize, fan_in: usize, fan_out: usize, rng: &mut impl Rng) -> Array2<f32> {
	let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
	// Positive finite std. Should not panic.
	let dist = Normal::new(0.0, std).unwrap();
	Array2::from_shape_fn((rows, cols), |_| dist.sample(rng))
}

impl SequenceModel {
	/// Creates a model with freshly initialized weights.
	///
	/// Gate and output weights are Glorot-scaled; biases start at zero
	/// except the forget gate, which starts at 1.0 so early training
	/// does not flush the cell state.
	pub fn new(vocab_size: usize, hidden: usize, rng: &mut impl Rng) -> Self {
		let mut b = Array1::zeros(4 * hidden);
		b.slice_mut(s![hidden..2 * hidden]).fill(1.0);

		Self {
			vocab_size,
			hidden,
			w_x: glorot(vocab_size, 4 * hidden, vocab_size, hidden, rng),
			w_h: glorot(hidden, 4 * hidden, hidden, hidden, rng),
			b,
			w_out: glorot(hidden, vocab_size, hidden, vocab_size, rng),
			b_out: Array1::zeros(vocab_size),
		}
	}

	/// Vocabulary width this model was built for.
	pub fn vocab_size(&self) -> usize {
		self.vocab_size
	}

	/// Hidden layer width.
	pub fn hidden(&self) -> usize {
		self.hidden
	}

	/// Predicts next-character probabilities for a batch of encoded
	/// windows of shape `(batch, seq_len, vocab)`.
	///
	/// Each output row is non-negative and sums to 1 (within floating
	/// point tolerance). The call is stateless: hidden and cell state
	/// start from zero every time.
	pub fn predict(&self, batch: &Array3<f32>) -> Array2<f32> {
		self.forward(batch).probs
	}

	/// Forward pass keeping per-timestep activations for BPTT.
	pub(crate) fn forward(&self, batch: &Array3<f32>) -> ForwardPass {
		let (batch_size, seq_len, _) = batch.dim();
		let hidden = self.hidden;

		let mut h = Array2::zeros((batch_size, hidden));
		let mut c = Array2::zeros((batch_size, hidden));
		let mut steps = Vec::with_capacity(seq_len);

		for t in 0..seq_len {
			let x_t = batch.index_axis(Axis(1), t);

			// Fused gate pre-activations (batch, 4 * hidden)
			let a = x_t.dot(&self.w_x) + h.dot(&self.w_h) + &self.b;

			let input_gate = sigmoid(&a.slice(s![.., 0..hidden]).to_owned());
			let forget_gate = sigmoid(&a.slice(s![.., hidden..2 * hidden]).to_owned());
			let cell_candidate = a.slice(s![.., 2 * hidden..3 * hidden]).mapv(f32::tanh);
			let output_gate = sigmoid(&a.slice(s![.., 3 * hidden..4 * hidden]).to_owned());

			let cell_prev = c.clone();
			c = &forget_gate * &cell_prev + &input_gate * &cell_candidate;
			let cell_tanh = c.mapv(f32::tanh);
			let hidden_prev = h.clone();
			h = &output_gate * &cell_tanh;

			steps.push(StepCache {
				input_gate,
				forget_gate,
				cell_candidate,
				output_gate,
				cell_prev,
				cell_tanh,
				hidden_prev,
			});
		}

		let logits = h.dot(&self.w_out) + &self.b_out;
		let probs = softmax_rows(&logits);

		ForwardPass { probs, hidden_last: h, steps }
	}

	/// Backpropagation through time.
	///
	/// `d_logits` is the gradient of the loss with respect to the
	/// output logits, `(batch, vocab)`. Returns gradients with the
	/// same shapes as the parameters.
	pub(crate) fn backward(
		&self,
		batch: &Array3<f32>,
		pass: &ForwardPass,
		d_logits: &Array2<f32>,
	) -> Gradients {
		let hidden = self.hidden;
		let seq_len = pass.steps.len();

		let mut grads = Gradients {
			w_x: Array2::zeros(self.w_x.dim()),
			w_h: Array2::zeros(self.w_h.dim()),
			b: Array1::zeros(self.b.dim()),
			w_out: pass.hidden_last.t().dot(d_logits),
			b_out: d_logits.sum_axis(Axis(0)),
		};

		let mut dh = d_logits.dot(&self.w_out.t());
		let mut dc: Array2<f32> = Array2::zeros(dh.dim());

		for t in (0..seq_len).rev() {
			let step = &pass.steps[t];
			let x_t = batch.index_axis(Axis(1), t);

			dc = dc + &dh * &step.output_gate * step.cell_tanh.mapv(|v| 1.0 - v * v);
			let d_output = &dh * &step.cell_tanh;

			let d_input = &dc * &step.cell_candidate;
			let d_candidate = &dc * &step.input_gate;
			let d_forget = &dc * &step.cell_prev;

			// Gate pre-activation gradients
			let da_input = d_input * &step.input_gate * step.input_gate.mapv(|v| 1.0 - v);
			let da_forget = d_forget * &step.forget_gate * step.forget_gate.mapv(|v| 1.0 - v);
			let da_candidate = d_candidate * step.cell_candidate.mapv(|v| 1.0 - v * v);
			let da_output = d_output * &step.output_gate * step.output_gate.mapv(|v| 1.0 - v);

			let mut da = Array2::zeros((dh.nrows(), 4 * hidden));
			da.slice_mut(s![.., 0..hidden]).assign(&da_input);
			da.slice_mut(s![.., hidden..2 * hidden]).assign(&da_forget);
			da.slice_mut(s![.., 2 * hidden..3 * hidden]).assign(&da_candidate);
			da.slice_mut(s![.., 3 * hidden..4 * hidden]).assign(&da_output);

			grads.w_x = grads.w_x + x_t.t().dot(&da);
			grads.w_h = grads.w_h + step.hidden_prev.t().dot(&da);
			grads.b = grads.b + da.sum_axis(Axis(0));

			dh = da.dot(&self.w_h.t());
			dc = &dc * &step.forget_gate;
		}

		grads
	}

	/// Applies parameter deltas computed by the optimizer.
	pub(crate) fn apply_gradients<F>(&mut self, grads: &Gradients, mut step: F)
	where
		F: FnMut(&mut Array2<f32>, &Array2<f32>, usize),
	{
		step(&mut self.w_x, &grads.w_x, 0);
		step(&mut self.w_h, &grads.w_h, 1);
		step(&mut self.w_out, &grads.w_out, 2);

		// Biases ride along as single-row matrices so the optimizer
		// only has to handle one shape.
		let mut b = self.b.clone().insert_axis(Axis(0));
		step(&mut b, &grads.b.clone().insert_axis(Axis(0)), 3);
		self.b = b.remove_axis(Axis(0));

		let mut b_out = self.b_out.clone().insert_axis(Axis(0));
		step(&mut b_out, &grads.b_out.clone().insert_axis(Axis(0)), 4);
		self.b_out = b_out.remove_axis(Axis(0));
	}
}

/// Row-wise softmax with max subtraction for numerical stability.
fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
	let mut probs = logits.clone();
	for mut row in probs.rows_mut() {
		let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
		row.mapv_inplace(|v| (v - max).exp());
		let sum = row.sum();
		row.mapv_inplace(|v| v / sum);
	}
	probs
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn one_hot_batch(indices: &[&[usize]], vocab: usize) -> Array3<f32> {
		let seq_len = indices[0].len();
		let mut batch = Array3::zeros((indices.len(), seq_len, vocab));
		for (b, sequence) in indices.iter().enumerate() {
			for (t, index) in sequence.iter().enumerate() {
				batch[[b, t, *index]] = 1.0;
			}
		}
		batch
	}

	#[test]
	fn prediction_rows_are_distributions() {
		let mut rng = StdRng::seed_from_u64(7);
		let model = SequenceModel::new(5, 16, &mut rng);
		let batch = one_hot_batch(&[&[0, 1, 2], &[4, 3, 2]], 5);

		let probs = model.predict(&batch);
		assert_eq!(probs.dim(), (2, 5));
		for row in probs.rows() {
			assert!(row.iter().all(|p| *p >= 0.0));
			assert!((row.sum() - 1.0).abs() < 1e-5);
		}
	}

	#[test]
	fn repeated_calls_are_stateless() {
		let mut rng = StdRng::seed_from_u64(7);
		let model = SequenceModel::new(5, 16, &mut rng);
		let batch = one_hot_batch(&[&[0, 1, 2]], 5);

		assert_eq!(model.predict(&batch), model.predict(&batch));
	}

	#[test]
	fn gradients_match_parameter_shapes() {
		let mut rng = StdRng::seed_from_u64(7);
		let model = SequenceModel::new(4, 8, &mut rng);
		let batch = one_hot_batch(&[&[0, 1], &[2, 3]], 4);

		let pass = model.forward(&batch);
		let d_logits = pass.probs.clone();
		let grads = model.backward(&batch, &pass, &d_logits);

		assert_eq!(grads.w_x.dim(), (4, 32));
		assert_eq!(grads.w_h.dim(), (8, 32));
		assert_eq!(grads.b.dim(), 32);
		assert_eq!(grads.w_out.dim(), (8, 4));
		assert_eq!(grads.b_out.dim(), 4);
	}

	#[test]
	fn forget_bias_starts_at_one() {
		let mut rng = StdRng::seed_from_u64(7);
		let model = SequenceModel::new(3, 4, &mut rng);
		for t in 4..8 {
			assert_eq!(model.b[t], 1.0);
		}
		for t in 0..4 {
			assert_eq!(model.b[t], 0.0);
		}
	}
}

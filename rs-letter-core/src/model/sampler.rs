use rand::Rng;

use crate::error::{LetterGenError, Result};

/// Draws an index from a probability vector reshaped by temperature.
///
/// # Behavior
/// - Moves to log space, divides by `temperature`, exponentiates and
///   renormalizes (max subtraction keeps the exponentials in range)
/// - Draws once from the resulting multinomial with a cumulative
///   subtraction scan
///
/// Low temperatures sharpen the distribution toward its argmax, high
/// temperatures flatten it toward uniform.
///
/// # Errors
/// - `InvalidTemperature` when `temperature <= 0`
/// - `InvalidDistribution` when `probs` is empty or contains a
///   non-positive or non-finite entry
pub fn sample_index(probs: &[f32], temperature: f64, rng: &mut impl Rng) -> Result<usize> {
	if temperature <= 0.0 {
		return Err(LetterGenError::InvalidTemperature(temperature));
	}
	if probs.is_empty() {
		return Err(LetterGenError::InvalidDistribution { index: 0, value: 0.0 });
	}

	let mut log_probs = Vec::with_capacity(probs.len());
	for (index, p) in probs.iter().enumerate() {
		let p = *p as f64;
		if !p.is_finite() || p <= 0.0 {
			return Err(LetterGenError::InvalidDistribution { index, value: p });
		}
		log_probs.push(p.ln() / temperature);
	}

	// Max subtraction before exponentiation
	let max = log_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	let reshaped: Vec<f64> = log_probs.iter().map(|l| (l - max).exp()).collect();
	let total: f64 = reshaped.iter().sum();

	let mut r = rng.random::<f64>() * total;
	for (index, weight) in reshaped.iter().enumerate() {
		if r < *weight {
			return Ok(index);
		}
		r -= weight;
	}

	// Rounding can push `r` past the last bucket. Should not happen
	// otherwise.
	Ok(reshaped.len() - 1)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn index_stays_in_range() {
		let probs = [0.1, 0.2, 0.3, 0.4];
		let mut rng = StdRng::seed_from_u64(11);
		for _ in 0..200 {
			let index = sample_index(&probs, 1.0, &mut rng).unwrap();
			assert!(index < probs.len());
		}
	}

	#[test]
	fn low_temperature_converges_to_argmax() {
		let probs = [0.05, 0.8, 0.1, 0.05];
		let mut rng = StdRng::seed_from_u64(11);
		for _ in 0..100 {
			assert_eq!(sample_index(&probs, 1e-3, &mut rng).unwrap(), 1);
		}
	}

	#[test]
	fn high_temperature_reaches_unlikely_indices() {
		let probs = [0.96, 0.02, 0.01, 0.01];
		let mut rng = StdRng::seed_from_u64(11);
		let mut seen = [false; 4];
		for _ in 0..2000 {
			seen[sample_index(&probs, 10.0, &mut rng).unwrap()] = true;
		}
		assert!(seen.iter().all(|s| *s));
	}

	#[test]
	fn rejects_non_positive_temperature() {
		let mut rng = StdRng::seed_from_u64(11);
		assert_eq!(
			sample_index(&[0.5, 0.5], 0.0, &mut rng).unwrap_err(),
			LetterGenError::InvalidTemperature(0.0)
		);
		assert_eq!(
			sample_index(&[0.5, 0.5], -1.0, &mut rng).unwrap_err(),
			LetterGenError::InvalidTemperature(-1.0)
		);
	}

	#[test]
	fn rejects_zero_probability_entries() {
		let mut rng = StdRng::seed_from_u64(11);
		assert_eq!(
			sample_index(&[0.5, 0.0, 0.5], 1.0, &mut rng).unwrap_err(),
			LetterGenError::InvalidDistribution { index: 1, value: 0.0 }
		);
	}

	#[test]
	fn rejects_empty_distribution() {
		let mut rng = StdRng::seed_from_u64(11);
		assert!(sample_index(&[], 1.0, &mut rng).is_err());
	}

	#[test]
	fn seeded_rng_reproduces_draws() {
		let probs = [0.25, 0.25, 0.25, 0.25];
		let draws = |seed: u64| -> Vec<usize> {
			let mut rng = StdRng::seed_from_u64(seed);
			(0..50)
				.map(|_| sample_index(&probs, 0.7, &mut rng).unwrap())
				.collect()
		};
		assert_eq!(draws(42), draws(42));
	}
}

use rand::rngs::StdRng;
use rand::SeedableRng;

use rs_letter_core::model::generator::Generator;
use rs_letter_core::{train_letter_model, LetterRequest, LetterGenError, TrainingConfig};

fn pangram_corpus() -> String {
	// Well over 100 characters so the window sampler has material
	"the quick brown fox jumps over the lazy dog. ".repeat(5)
}

fn quick_config() -> TrainingConfig {
	TrainingConfig {
		seq_len: 10,
		stride: 1,
		batch_size: 32,
		epochs: 1,
		learning_rate: 0.01,
		hidden: 16,
	}
}

#[test]
fn trains_and_generates_a_complete_letter() {
	let mut rng = StdRng::seed_from_u64(17);
	let trained = train_letter_model(&pangram_corpus(), &quick_config(), &mut rng).unwrap();

	let request = LetterRequest {
		length: 5,
		temperature: 0.5,
		recipient: "Mr. Smith".to_owned(),
		sender: "Jane Doe".to_owned(),
		purpose: "complaint".to_owned(),
	};
	let letter = trained.generate(&request, &mut rng).unwrap();

	assert!(letter.starts_with("Sender's Address:"));
	assert!(letter.contains("Receiver's Address:\nMr. Smith"));
	assert!(letter.contains("Subject: complaint"));
	assert!(letter.contains("Sir/Madam,"));
	assert!(letter.contains("formally lodge a complaint"));
	assert!(letter.ends_with("Sincerely,\nJane Doe"));
}

#[test]
fn generated_body_is_deterministic_for_a_seeded_rng() {
	let mut rng = StdRng::seed_from_u64(17);
	let trained = train_letter_model(&pangram_corpus(), &quick_config(), &mut rng).unwrap();

	// Compare at the body level; the composed letter embeds today's
	// date, which is not part of the random walk
	let run = |seed: u64| {
		let mut rng = StdRng::seed_from_u64(seed);
		let request = LetterRequest {
			length: 30,
			temperature: 0.5,
			recipient: "Mr. Smith".to_owned(),
			sender: "Jane Doe".to_owned(),
			purpose: "complaint".to_owned(),
		};
		trained.generate(&request, &mut rng).unwrap()
	};
	assert_eq!(run(99), run(99));
}

#[test]
fn leave_application_selects_the_leave_template() {
	let mut rng = StdRng::seed_from_u64(17);
	let trained = train_letter_model(&pangram_corpus(), &quick_config(), &mut rng).unwrap();

	let request = LetterRequest {
		length: 0,
		temperature: 0.5,
		recipient: "The Manager".to_owned(),
		sender: "Jane Doe".to_owned(),
		purpose: "Leave Application".to_owned(),
	};
	let letter = trained.generate(&request, &mut rng).unwrap();

	assert!(letter.contains("request a leave of absence"));
	assert!(!letter.contains("submitting this application for the position"));
}

#[test]
fn zero_length_produces_only_seed_and_fixed_parts() {
	let corpus = pangram_corpus();
	let mut rng = StdRng::seed_from_u64(17);
	let trained = train_letter_model(&corpus, &quick_config(), &mut rng).unwrap();

	let request = LetterRequest {
		length: 0,
		temperature: 0.5,
		recipient: "Mr. Smith".to_owned(),
		sender: "Jane Doe".to_owned(),
		purpose: "enquiry".to_owned(),
	};
	let letter = trained.generate(&request, &mut rng).unwrap();

	assert!(letter.contains("The Times of India"));
	assert!(letter.ends_with("Sincerely,\nJane Doe"));
}

#[test]
fn generation_errors_leave_the_model_usable() {
	let mut rng = StdRng::seed_from_u64(17);
	let trained = train_letter_model(&pangram_corpus(), &quick_config(), &mut rng).unwrap();

	let bad = LetterRequest {
		length: 5,
		temperature: -1.0,
		recipient: "Mr. Smith".to_owned(),
		sender: "Jane Doe".to_owned(),
		purpose: "order".to_owned(),
	};
	assert_eq!(
		trained.generate(&bad, &mut rng).unwrap_err(),
		LetterGenError::InvalidTemperature(-1.0)
	);

	// The failed call must not have corrupted anything
	let good = LetterRequest { temperature: 0.5, ..bad };
	assert!(trained.generate(&good, &mut rng).is_ok());
}

#[test]
fn training_rejects_inputs_without_a_full_window() {
	let mut rng = StdRng::seed_from_u64(17);

	assert_eq!(
		train_letter_model("", &quick_config(), &mut rng).unwrap_err(),
		LetterGenError::EmptyCorpus
	);
	assert_eq!(
		train_letter_model("too short", &quick_config(), &mut rng).unwrap_err(),
		LetterGenError::InsufficientData
	);
}

#[test]
fn generator_walk_reproduces_exactly_under_one_rng() {
	// Drive the low-level generator directly so the comparison covers
	// both the seed pick and every sampling draw
	let cleaned = rs_letter_core::corpus::clean(&pangram_corpus());
	let vocabulary = rs_letter_core::model::vocabulary::Vocabulary::build(&cleaned).unwrap();

	let windows = rs_letter_core::model::dataset::sample_windows(&cleaned, 10, 1);
	let mut train_rng = StdRng::seed_from_u64(3);
	let mut model = rs_letter_core::model::network::SequenceModel::new(vocabulary.len(), 16, &mut train_rng);
	rs_letter_core::model::trainer::fit(&mut model, &windows, &vocabulary, &quick_config(), &mut train_rng).unwrap();

	let generator = Generator::new(&cleaned, &vocabulary, &model, 10).unwrap();
	let run = |seed: u64| {
		let mut rng = StdRng::seed_from_u64(seed);
		generator.generate(20, 0.5, &mut rng).unwrap()
	};

	let first = run(7);
	let second = run(7);
	assert_eq!(first.seed, second.seed);
	assert_eq!(first.continuation, second.continuation);
}

use chrono::Local;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::corpus;
use crate::error::Result;
use crate::model::dataset::sample_windows;
use crate::model::generator::{GeneratedBody, Generator};
use crate::model::network::SequenceModel;
use crate::model::trainer::{fit, TrainingConfig};
use crate::model::vocabulary::Vocabulary;

const LEAVE_TEMPLATE: &str = "\n\nI would like to kindly request a leave of absence from work \
for the following reasons. I will ensure that all my duties and \
responsibilities are properly handed over before my departure, \
and I will make sure to return by the specified date.";

const COMPLAINT_TEMPLATE: &str = "\n\nI am writing to formally lodge a complaint regarding the issue. \
I hope that you will look into this matter at the earliest and \
take the necessary actions to resolve the issue as soon as possible.";

const ENQUIRY_TEMPLATE: &str = "\n\nThis is with reference to your advertisement in the \u{2018}The Times of India\u{2019} for CAT Coaching classes. \
I have passed the B.Sc. degree examination with Statistics as the main subject.\
I am keen on joining your institute for the coaching classes.\
Kindly let me know about the procedure of applying for the qualifying test and its date.\
I would like to enroll as soon as possible. Your early response will enable me to decide fast.";

const ORDER_TEMPLATE: &str = "\n\nThis is with reference to the Order No.(________) placed on Nov 17, 20xx.\
The order consists of letterhead and business cards.\
As per the agreement, we were promised to receive the order by Nov 22, 20xx.\
The order did not reach on time, and the quality of the papers and design selected for business cards \
does not match the one selected. We faced a lot of embarrassment and inconvenience, and our reputation \
is at stake in the eyes of our clients. Kindly ensure that the order will be replaced by Dec 4, 20xx.";

const PROMOTION_TEMPLATE: &str = "\n\nWe are glad to announce the grand opening of a new branch of our company in QPR Colony, Delhi on Dec 05, 20xx.\
As a respected client, we are delighted to inform you that this branch offers various solutions to your problems.\
We are dedicated to providing you with the best service and would be happy to have you as our guest.";

const APPLICATION_TEMPLATE: &str = "\n\nI am submitting this application for the position that is available. \
I have attached my resume and relevant documents for your consideration. \
I am eager to discuss how my skills can contribute to your organization.";

const INVITATION_TEMPLATE: &str = "\n\nIt is with great pleasure that I invite you to the event being held on \
[date]. We would be honored to have your presence at this occasion, and I \
look forward to your confirmation of attendance.";

const GENERIC_TEMPLATE: &str = "\n\nI am writing to you regarding the above-mentioned subject. \
I would like to formally request your attention to this matter and provide the necessary assistance. \
Your prompt response and cooperation would be highly appreciated.";

/// Selects the fixed body template for a purpose line.
///
/// Matching is a case-insensitive substring check and the first match
/// wins, in this order: leave, complaint, enquiry, order, promotion,
/// application, invitation, then a generic fallback.
pub fn body_template(purpose: &str) -> &'static str {
	let purpose = purpose.to_lowercase();

	if purpose.contains("leave") {
		LEAVE_TEMPLATE
	} else if purpose.contains("complaint") {
		COMPLAINT_TEMPLATE
	} else if purpose.contains("enquiry") {
		ENQUIRY_TEMPLATE
	} else if purpose.contains("order") {
		ORDER_TEMPLATE
	} else if purpose.contains("promotion") {
		PROMOTION_TEMPLATE
	} else if purpose.contains("application") {
		APPLICATION_TEMPLATE
	} else if purpose.contains("invitation") {
		INVITATION_TEMPLATE
	} else {
		GENERIC_TEMPLATE
	}
}

/// Parameters for one letter generation call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LetterRequest {
	/// Number of model-sampled characters in the body.
	pub length: usize,
	/// Sampling temperature, must be strictly positive.
	pub temperature: f64,
	/// Receiver's address block.
	pub recipient: String,
	/// Name placed under the closing.
	pub sender: String,
	/// Subject line; also drives template selection.
	pub purpose: String,
}

/// Assembles the final letter around a generated body.
///
/// Layout: address header, today's date, salutation, the seed text,
/// the purpose-matched template, the sampled continuation, and the
/// signature.
pub fn compose_letter(request: &LetterRequest, body: &GeneratedBody) -> String {
	let date_today = Local::now().format("%B %d, %Y");

	format!(
		"Sender's Address:\n[Your Address Here]\n\n\
		Date: {date_today}\n\n\
		Receiver's Address:\n{recipient}\n\n\
		Subject: {purpose}\n\n\
		Sir/Madam,\n\n\
		{seed}{template}{continuation}\n\n\
		Sincerely,\n{sender}",
		recipient = request.recipient,
		purpose = request.purpose,
		seed = body.seed,
		template = body_template(&request.purpose),
		continuation = body.continuation,
		sender = request.sender,
	)
}

/// A corpus, its vocabulary and a fitted model, bundled for
/// generation.
///
/// Created by `train_letter_model`; every generation call borrows it
/// read-only, so concurrent use only needs external serialization of
/// the calls themselves.
#[derive(Clone, Debug)]
pub struct TrainedLetterModel {
	corpus: String,
	vocabulary: Vocabulary,
	model: SequenceModel,
	seq_len: usize,
}

/// Trains a letter model from raw corpus text.
///
/// # Behavior
/// - Cleans the corpus (`corpus::clean`)
/// - Builds the vocabulary and samples training windows
/// - Initializes and fits the recurrent model
///
/// # Errors
/// - `EmptyCorpus` when nothing survives cleaning
/// - `InsufficientData` when no full training window fits
pub fn train_letter_model(
	raw_text: &str,
	config: &TrainingConfig,
	rng: &mut impl Rng,
) -> Result<TrainedLetterModel> {
	let corpus = corpus::clean(raw_text);
	let vocabulary = Vocabulary::build(&corpus)?;
	let windows = sample_windows(&corpus, config.seq_len, config.stride);

	info!(
		"training on {} characters, vocabulary of {}, {} windows",
		corpus.chars().count(),
		vocabulary.len(),
		windows.len()
	);

	let mut model = SequenceModel::new(vocabulary.len(), config.hidden, rng);
	fit(&mut model, &windows, &vocabulary, config, rng)?;

	Ok(TrainedLetterModel {
		corpus,
		vocabulary,
		model,
		seq_len: config.seq_len,
	})
}

impl TrainedLetterModel {
	/// Generates a complete formal letter for a request.
	///
	/// # Errors
	/// - `InvalidTemperature` when the request temperature is not
	///   strictly positive
	/// - `InsufficientData` when the corpus cannot seed a window
	pub fn generate(&self, request: &LetterRequest, rng: &mut impl Rng) -> Result<String> {
		let generator = Generator::new(&self.corpus, &self.vocabulary, &self.model, self.seq_len)?;
		let body = generator.generate(request.length, request.temperature, rng)?;
		Ok(compose_letter(request, &body))
	}

	/// Number of characters in the cleaned training corpus.
	pub fn corpus_len(&self) -> usize {
		self.corpus.chars().count()
	}

	/// Number of distinct characters the model predicts over.
	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary.len()
	}
}

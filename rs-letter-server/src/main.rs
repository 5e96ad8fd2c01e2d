use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use rs_letter_core::io::{list_files, read_corpus};
use rs_letter_core::{train_letter_model, LetterRequest, TrainedLetterModel, TrainingConfig};

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	length: Option<String>,
	temperature: Option<String>,
	recipient: Option<String>,
	sender: Option<String>,
	purpose: Option<String>,
}

#[derive(Deserialize)]
struct TrainQuery {
	corpus: Option<String>,
}

struct SharedData {
	trained: Option<TrainedLetterModel>,
}

impl GenerateParams {
	/// Parses the raw query into a validated `LetterRequest`.
	///
	/// Unparsable numeric fields are reported as a descriptive error
	/// instead of generated output. Missing fields fall back to the
	/// defaults length 300 and temperature 0.5.
	fn letter_request(&self) -> Result<LetterRequest, String> {
		let length = match &self.length {
			None => 300,
			Some(s) => match s.parse::<usize>() {
				Ok(n) => n,
				Err(_) => return Err(format!("Length must be a non-negative integer, got '{s}'")),
			},
		};

		let temperature = match &self.temperature {
			None => 0.5,
			Some(s) => match s.parse::<f64>() {
				Ok(t) => t,
				Err(_) => return Err(format!("Temperature must be a number, got '{s}'")),
			},
		};

		Ok(LetterRequest {
			length,
			temperature,
			recipient: self.recipient.clone().unwrap_or_else(|| "[Receiver's Address Here]".to_owned()),
			sender: self.sender.clone().unwrap_or_else(|| "[Your Name Here]".to_owned()),
			purpose: self.purpose.clone().unwrap_or_default(),
		})
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a formal letter from the trained model based on query
/// parameters. Returns the full letter text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let request = match query.letter_request() {
		Ok(r) => r,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let trained = match &shared_data.trained {
		Some(t) => t,
		None => return HttpResponse::BadRequest().body("No model trained, PUT /v1/train first"),
	};

	match trained.generate(&request, &mut rand::rng()) {
		Ok(letter) => HttpResponse::Ok().body(letter),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files(&"./data".to_owned(), "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/status")]
async fn get_status(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match &shared_data.trained {
		Some(t) => HttpResponse::Ok().body(format!(
			"trained\ncorpus characters: {}\nvocabulary size: {}",
			t.corpus_len(),
			t.vocabulary_size()
		)),
		None => HttpResponse::Ok().body("untrained"),
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the shared model on a named corpus file from `./data`.
/// An optional JSON body overrides the default training
/// configuration. The model lock is held for the whole run, so
/// concurrent requests wait until training finishes.
#[put("/v1/train")]
async fn put_train(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<TrainQuery>,
	config: Option<web::Json<TrainingConfig>>,
) -> impl Responder {
	let corpus_name = match &query.corpus {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let corpus_path = format!("./data/{}.txt", corpus_name);
	let raw_text = match read_corpus(&corpus_path) {
		Ok(t) => t,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to read corpus: {e}")),
	};

	let config = config.map_or_else(TrainingConfig::default, |json| json.into_inner());

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match train_letter_model(&raw_text, &config, &mut rand::rng()) {
		Ok(trained) => {
			shared_data.trained = Some(trained);
			HttpResponse::Ok().body("Model trained successfully")
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to train model: {e}")),
	}
}

/// Main entry point for the server.
///
/// Starts untrained, wraps the shared model in a `Mutex` so all model
/// access is serialized, and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpus files are read from `./data/*.txt`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		trained: None,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(put_train)
			.service(get_status)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

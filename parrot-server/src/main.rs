use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, middleware, post, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use parrot_core::io::{list_files, normalize_folder};
use parrot_core::model::brain::{Brain, DEFAULT_CHAIN_LENGTH};
use parrot_core::model::generator::{Generator, DEFAULT_MAX_WORDS};

/// Directory holding corpus text files and their binary caches.
const DATA_DIR: &str = "./data";

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String>,
	max_words: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
	chain_length: Option<usize>,
}

struct SharedData {
	brain: Brain,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Samples one sentence from the shared brain, seeded by the `seed` query
/// parameter. Returns the generated sentence as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let seed = query.seed.as_deref().unwrap_or("");
	let max_words = query.max_words.unwrap_or(DEFAULT_MAX_WORDS);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	// Generation against an untrained model is undefined, refuse it here
	if shared_data.brain.is_empty() {
		return HttpResponse::Conflict().body("Model is untrained, train or load a corpus first");
	}

	let generator = Generator::with_max_words(max_words);
	HttpResponse::Ok().body(generator.generate(&shared_data.brain, seed))
}

/// HTTP POST endpoint `/v1/train`
///
/// Feeds training phrases into the shared brain, one phrase per body line.
#[post("/v1/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let mut trained = 0;
	for phrase in body.lines() {
		if phrase.trim().is_empty() {
			continue;
		}
		shared_data.brain.train(phrase);
		trained += 1;
	}

	HttpResponse::Ok().body(format!("Trained {trained} phrases"))
}

#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files(normalize_folder(DATA_DIR), "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.brain.corpus_names().join("\n"))
}

/// HTTP PUT endpoint `/v1/load_corpora`
///
/// Rebuilds the shared brain from the named corpus files under `./data`,
/// merging them into one model.
#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let chain_length = query.chain_length.unwrap_or(DEFAULT_CHAIN_LENGTH);

	let corpus_names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	let mut brain = match Brain::new(chain_length) {
		Ok(b) => b,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	for name in corpus_names {
		let corpus_path = format!("{DATA_DIR}/{name}.txt");
		let partial = match Brain::load(&corpus_path, chain_length) {
			Ok(b) => b,
			Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
		};
		if let Err(e) = brain.merge(&partial) {
			return HttpResponse::InternalServerError().body(format!("Failed to merge corpus: {e}"));
		}
	}
	shared_data.brain = brain;

	HttpResponse::Ok().body("Corpora loaded successfully")
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let brain = &shared_data.brain;
	HttpResponse::Ok().body(format!(
		"chain_length: {}\ncontexts: {}\nobservations: {}\ncorpora: {}",
		brain.chain_length(),
		brain.context_count(),
		brain.observation_count(),
		brain.corpus_names().join(",")
	))
}

/// Main entry point for the server.
///
/// Starts with an empty brain of the default chain length, wrapped in a
/// `Mutex` for thread safety. Clients either feed phrases through
/// `/v1/train` or load corpus files through `/v1/load_corpora` before
/// asking `/v1/generate` for sentences.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - The corpus directory is hardcoded and should be made configurable.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

	let shared_data = SharedData {
		// Cannot fail, the default chain length is nonzero
		brain: Brain::new(DEFAULT_CHAIN_LENGTH).unwrap(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	log::info!("listening on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.service(get_generated)
			.service(post_train)
			.service(get_corpora)
			.service(put_corpora)
			.service(get_loaded_corpora)
			.service(get_stats)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::io;
use super::state::State;
use super::token::{Context, Token};

/// Canonical context length: two words of history per prediction.
pub const DEFAULT_CHAIN_LENGTH: usize = 2;

/// A word-level Markov model built from short training phrases.
///
/// The `Brain` maps each fixed-length context of preceding words to the
/// statistics of the words observed to follow it anywhere in the corpus.
///
/// # Responsibilities
/// - Ingest phrases one at a time and accumulate follower counts
/// - Serve non-mutating context lookups to the generator
/// - Merge with another brain of the same chain length
/// - Build itself from a corpus file, with a binary cache for fast reloads
///
/// # Invariants
/// - `chain_length` is >= 1 and fixed for the lifetime of the instance
/// - Every stored context key has length `chain_length`
/// - Every stored state has at least one recorded follower; lookups never
///   create entries, so empty states cannot appear
#[derive(Serialize, Deserialize, Debug)]
pub struct Brain {
	/// Number of preceding words used to predict the next one.
	chain_length: usize,

	/// Mapping from a normalized context window to its follower statistics.
	states: HashMap<Context, State>,

	/// Names of the corpus files this brain was built from.
	corpus_names: Vec<String>,
}

impl Brain {
	/// Creates a new, empty brain with the given context length.
	///
	/// # Errors
	/// Returns an error if `chain_length` is 0.
	pub fn new(chain_length: usize) -> Result<Self, String> {
		if chain_length < 1 {
			return Err("chain length must be >= 1".to_owned());
		}
		Ok(Self {
			chain_length,
			states: HashMap::new(),
			corpus_names: Vec::new(),
		})
	}

	/// The fixed context length of this brain.
	pub fn chain_length(&self) -> usize {
		self.chain_length
	}

	/// Ingests one training phrase.
	///
	/// Slides a window of `chain_length` tokens over the phrase, starting
	/// from all boundary markers, and records each word as a follower of
	/// the window preceding it. The final window gets a boundary follower,
	/// recording that a phrase may legitimately end there.
	///
	/// # Notes
	/// - Keys are case-normalized; follower tokens keep their original case.
	/// - Not idempotent: repeated phrases double their transition weights,
	///   biasing generation toward their patterns.
	pub fn train(&mut self, phrase: &str) {
		let mut window = Context::stops(self.chain_length);
		for word in phrase.split_whitespace() {
			self.states
				.entry(window.clone())
				.or_insert_with(State::new)
				.add(Token::word(word));
			window.shift(Token::Word(word.to_uppercase()));
		}
		self.states
			.entry(window)
			.or_insert_with(State::new)
			.add(Token::Stop);
	}

	/// Looks up the follower statistics for a context.
	///
	/// Never creates an entry on a miss.
	pub(crate) fn lookup(&self, context: &Context) -> Option<&State> {
		self.states.get(context)
	}

	/// All states with at least one real-word follower.
	///
	/// This is the generator's replacement pool for dead ends.
	pub(crate) fn non_terminal_states(&self) -> Vec<&State> {
		self.states.values().filter(|state| state.has_word()).collect()
	}

	/// Number of distinct contexts currently recorded.
	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// Total follower observations across all contexts.
	pub fn observation_count(&self) -> usize {
		self.states.values().map(State::observations).sum()
	}

	/// True if nothing has been trained yet.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Names of the corpus files this brain was built from.
	pub fn corpus_names(&self) -> &[String] {
		&self.corpus_names
	}

	/// Merges another brain into this one.
	///
	/// # Notes
	/// - Both brains must have the same chain length.
	/// - Occurrence counts for matching contexts and followers are summed.
	///
	/// # Errors
	/// Returns an error if the chain lengths do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.chain_length != other.chain_length {
			return Err(format!(
				"chain length mismatch: self={}, other={}",
				self.chain_length, other.chain_length
			));
		}

		for (context, state) in &other.states {
			if let Some(existing) = self.states.get_mut(context) {
				existing.merge(state);
			} else {
				self.states.insert(context.clone(), state.clone());
			}
		}

		self.corpus_names.extend(other.corpus_names.clone());

		Ok(())
	}

	/// Loads a brain from a corpus file if a binary cache exists,
	/// otherwise builds it by reading the raw file with multithreaded
	/// chunk training and merging.
	///
	/// - `filepath` is the corpus text file, one phrase per line.
	/// - A sibling `.bin` file is used for fast loading when present.
	/// - Uses `postcard` for compact serialization/deserialization.
	///
	/// # Errors
	/// - Propagates file and deserialization failures.
	/// - Returns an error if a cached brain was built with a different
	///   chain length than the requested one.
	pub fn load<P: AsRef<Path>>(filepath: P, chain_length: usize) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_path = io::build_output_path(&filepath, "bin")?;
		let mut brain: Brain;
		if binary_path.exists() {
			let bytes = std::fs::read(&binary_path)?;
			brain = postcard::from_bytes(&bytes)?;
			if brain.chain_length != chain_length {
				return Err(format!(
					"cached model uses chain length {}, requested {}",
					brain.chain_length, chain_length
				)
				.into());
			}
		} else {
			brain = Self::read_corpus_file(&filepath, &binary_path, chain_length)?;
		}
		brain.corpus_names.push(io::get_filename(&filepath)?);
		Ok(brain)
	}

	/// Serializes this brain to a compact binary file.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), Box<dyn std::error::Error>> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(filepath, bytes)?;
		Ok(())
	}

	/// Reads a corpus file, splits its phrases into chunks, trains partial
	/// brains in parallel, merges them, and writes the binary cache.
	///
	/// # Behavior
	/// - Splits input lines into chunks (based on CPU cores * factor).
	/// - Spawns threads training a partial brain per chunk.
	/// - Merges all partial brains sequentially.
	/// - Serializes the merged brain to `binary_path` for future fast loads.
	///
	/// # Notes
	/// - Uses MPSC channels to collect partial brains from threads.
	/// - `unwrap()` is safe in the threads because `chain_length` was
	///   validated before any of them spawn.
	fn read_corpus_file<PF, PB>(
		filename: PF,
		binary_path: PB,
		chain_length: usize,
	) -> Result<Brain, Box<dyn std::error::Error>>
	where
		PF: AsRef<Path>,
		PB: AsRef<Path>,
	{
		let mut brain = Brain::new(chain_length)?;

		let phrases = io::read_lines(&filename)?;
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = ((phrases.len() + chunks - 1) / chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in phrases.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial = Brain::new(chain_length).unwrap();
				for phrase in chunk {
					partial.train(&phrase);
				}
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		for partial in rx.iter() {
			brain.merge(&partial)?;
		}

		brain.save(binary_path)?;

		Ok(brain)
	}
}

#[cfg(test)]
impl Brain {
	/// Test-only: drop one context to manufacture a dead end.
	pub fn forget(&mut self, context: &Context) -> bool {
		self.states.remove(context).is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx(tokens: &[Token]) -> Context {
		Context::from_tokens(tokens)
	}

	fn stop() -> Token {
		Token::Stop
	}

	fn word(w: &str) -> Token {
		Token::word(w)
	}

	#[test]
	fn training_records_the_expected_transitions() {
		let mut brain = Brain::new(2).unwrap();
		brain.train("A B C");

		assert_eq!(brain.context_count(), 4);
		let followers = |key: &[Token]| brain.lookup(&ctx(key)).expect("missing context");
		assert_eq!(followers(&[stop(), stop()]).count(&word("A")), 1);
		assert_eq!(followers(&[stop(), word("A")]).count(&word("B")), 1);
		assert_eq!(followers(&[word("A"), word("B")]).count(&word("C")), 1);
		assert_eq!(followers(&[word("B"), word("C")]).count(&stop()), 1);
	}

	#[test]
	fn keys_are_case_normalized_and_followers_keep_their_case() {
		let mut brain = Brain::new(2).unwrap();
		brain.train("Hello world");

		// Keys are stored uppercased, so the as-typed window is absent
		assert!(brain.lookup(&ctx(&[word("Hello"), word("world")])).is_none());

		let state = brain.lookup(&ctx(&[word("HELLO"), word("WORLD")])).unwrap();
		assert_eq!(state.count(&stop()), 1);
		assert_eq!(brain.lookup(&ctx(&[stop(), stop()])).unwrap().count(&word("Hello")), 1);
	}

	#[test]
	fn training_twice_doubles_weights_and_adds_no_keys() {
		let mut once = Brain::new(2).unwrap();
		once.train("to be or not to be");
		let mut twice = Brain::new(2).unwrap();
		twice.train("to be or not to be");
		twice.train("to be or not to be");

		assert_eq!(twice.context_count(), once.context_count());
		assert_eq!(twice.observation_count(), 2 * once.observation_count());
		for (context, state) in &once.states {
			let doubled = twice.states.get(context).expect("missing context");
			assert_eq!(doubled.observations(), 2 * state.observations());
		}
	}

	#[test]
	fn empty_phrase_trains_only_the_boundary_context() {
		let mut brain = Brain::new(2).unwrap();
		brain.train("");

		assert_eq!(brain.context_count(), 1);
		assert_eq!(brain.lookup(&ctx(&[stop(), stop()])).unwrap().count(&stop()), 1);
	}

	#[test]
	fn trained_states_are_never_empty() {
		let mut brain = Brain::new(1).unwrap();
		brain.train("one two three");
		brain.train("");

		assert!(brain.states.values().all(|state| state.observations() > 0));
	}

	#[test]
	fn zero_chain_length_is_rejected() {
		assert!(Brain::new(0).is_err());
	}

	#[test]
	fn merge_sums_counts_and_rejects_mismatched_chain_lengths() {
		let mut a = Brain::new(2).unwrap();
		a.train("x y");
		let mut b = Brain::new(2).unwrap();
		b.train("x y");
		b.train("x z");

		a.merge(&b).unwrap();

		let state = a.lookup(&ctx(&[stop(), word("X")])).unwrap();
		assert_eq!(state.count(&word("y")), 2);
		assert_eq!(state.count(&word("z")), 1);

		let other = Brain::new(3).unwrap();
		assert!(a.merge(&other).is_err());
	}

	#[test]
	fn load_builds_from_corpus_and_caches_a_binary() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("corpus.txt");
		std::fs::write(&corpus, "hello world\nhello there\n").unwrap();

		let brain = Brain::load(&corpus, 2).unwrap();
		assert!(dir.path().join("corpus.bin").exists());
		assert_eq!(brain.corpus_names(), ["corpus"]);
		assert!(brain.lookup(&ctx(&[stop(), word("HELLO")])).is_some());

		// Second load goes through the cache and sees the same model
		let cached = Brain::load(&corpus, 2).unwrap();
		assert_eq!(cached.context_count(), brain.context_count());
		assert_eq!(cached.observation_count(), brain.observation_count());

		// The cache remembers its chain length
		assert!(Brain::load(&corpus, 3).is_err());
	}
}

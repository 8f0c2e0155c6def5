use serde::{Deserialize, Serialize};

/// A single vocabulary item: a real word or the reserved phrase-boundary
/// marker.
///
/// The marker is its own variant rather than an in-band magic string, so it
/// can never collide with a word from the training corpus.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
	/// Phrase boundary: pads the context at phrase start and records
	/// "the phrase may end here" when observed as a follower.
	Stop,
	/// A whitespace-delimited word, in the case it appeared in.
	Word(String),
}

impl Token {
	/// Wraps a corpus word, keeping its original case.
	pub fn word(word: &str) -> Self {
		Token::Word(word.to_owned())
	}

	/// Returns the case-normalized form used for context keys.
	///
	/// Keys are stored uppercased so lookups are case-insensitive;
	/// follower tokens keep the case they were trained with.
	pub fn normalized(&self) -> Self {
		match self {
			Token::Stop => Token::Stop,
			Token::Word(word) => Token::Word(word.to_uppercase()),
		}
	}

	/// The word carried by this token, or `None` for the boundary marker.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Stop => None,
			Token::Word(word) => Some(word.as_str()),
		}
	}

	pub fn is_stop(&self) -> bool {
		matches!(self, Token::Stop)
	}
}

/// Fixed-length window of normalized tokens indexing the model.
///
/// The window length is the model's chain length and never changes for the
/// lifetime of one model instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Context(Vec<Token>);

impl Context {
	/// A window made entirely of boundary markers (the phrase-start state).
	pub fn stops(chain_length: usize) -> Self {
		Self(vec![Token::Stop; chain_length])
	}

	/// Builds a window from a token slice.
	pub fn from_tokens(tokens: &[Token]) -> Self {
		Self(tokens.to_vec())
	}

	/// Slides the window one step: drops the oldest token, appends `next`.
	pub fn shift(&mut self, next: Token) {
		self.0.remove(0);
		self.0.push(next);
	}
}

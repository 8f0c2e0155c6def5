use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use super::token::Token;

/// Follower statistics for one context.
///
/// Conceptually a node in the Markov chain: outgoing edges are the tokens
/// observed to follow the context, weighted by how often each was seen.
///
/// ## Responsibilities
/// - Accumulate follower occurrences during training
/// - Draw the next token by occurrence-weighted random sampling
/// - Merge with another state recorded for the same context
///
/// ## Invariants
/// - States are created on first observation and never emptied, so at
///   least one occurrence is always recorded
/// - Every occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// Observed followers indexed by token.
	/// The value is how many times the follower was observed.
	transitions: HashMap<Token, usize>,
}

impl State {
	/// Creates an empty state, ready for its first observation.
	pub fn new() -> Self {
		Self { transitions: HashMap::new() }
	}

	/// Records one occurrence of `follower` after this context.
	///
	/// - If the follower was seen before, its occurrence count increases.
	/// - Otherwise a new transition is created with a count of 1.
	pub fn add(&mut self, follower: Token) {
		*self.transitions.entry(follower).or_insert(0) += 1;
	}

	/// Total number of recorded follower observations.
	///
	/// Doubles as the sampling weight of this context when the generator
	/// picks a starting point: richer branching makes a more interesting
	/// start.
	pub fn observations(&self) -> usize {
		self.transitions.values().sum()
	}

	/// True if at least one recorded follower is a real word.
	///
	/// States whose only follower is the boundary marker are terminal and
	/// useless as dead-end replacements.
	pub fn has_word(&self) -> bool {
		self.transitions.keys().any(|token| !token.is_stop())
	}

	/// Draws a follower, each weighted by its occurrence count.
	///
	/// One pass of cumulative subtraction over the distinct followers.
	/// Returns `None` if nothing was ever recorded.
	pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Token> {
		let total = self.observations();
		if total == 0 {
			return None;
		}

		// Randomly select a follower
		let mut r = rng.random_range(0..total);

		let mut fallback: Option<&Token> = None;
		for (token, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(token.clone());
			}
			r -= occurrence;
			fallback = Some(token);
		}

		// Unreachable while counts stay positive, kept for safety
		fallback.cloned()
	}

	/// Merges another state into this one, summing occurrence counts.
	pub fn merge(&mut self, other: &Self) {
		for (token, occurrence) in &other.transitions {
			*self.transitions.entry(token.clone()).or_insert(0) += *occurrence;
		}
	}
}

#[cfg(test)]
impl State {
	/// Test-only: occurrence count recorded for one follower.
	pub fn count(&self, token: &Token) -> usize {
		self.transitions.get(token).copied().unwrap_or(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn draws_follow_occurrence_weights() {
		let mut state = State::new();
		state.add(Token::word("rare"));
		state.add(Token::word("common"));
		state.add(Token::word("common"));
		state.add(Token::word("common"));

		let mut rng = StdRng::seed_from_u64(7);
		let mut common = 0;
		let mut rare = 0;
		for _ in 0..400 {
			match state.draw(&mut rng) {
				Some(Token::Word(w)) if w == "common" => common += 1,
				Some(Token::Word(w)) if w == "rare" => rare += 1,
				other => panic!("unexpected draw: {:?}", other),
			}
		}
		assert!(common > 2 * rare);
		assert!(rare > 0);
	}

	#[test]
	fn empty_state_draws_nothing() {
		let state = State::new();
		let mut rng = StdRng::seed_from_u64(0);
		assert!(state.draw(&mut rng).is_none());
	}

	#[test]
	fn terminal_states_are_detected() {
		let mut terminal = State::new();
		terminal.add(Token::Stop);
		assert!(!terminal.has_word());

		let mut open = State::new();
		open.add(Token::Stop);
		open.add(Token::word("more"));
		assert!(open.has_word());
	}

	#[test]
	fn merge_sums_occurrences() {
		let mut a = State::new();
		a.add(Token::word("w"));
		let mut b = State::new();
		b.add(Token::word("w"));
		b.add(Token::Stop);

		a.merge(&b);

		assert_eq!(a.count(&Token::word("w")), 2);
		assert_eq!(a.count(&Token::Stop), 1);
		assert_eq!(a.observations(), 3);
	}
}

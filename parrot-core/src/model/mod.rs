//! Top-level module for the Markov chat-mimic system.
//!
//! This module provides a word-level Markov chain generator, including:
//! - The trainable transition model (`Brain`)
//! - Sentence sampling (`Generator`)
//! - Vocabulary primitives shared by both (`Token`, `Context`)
//! - Internal follower statistics (`State`)

/// The trainable model: context-to-follower statistics, merging,
/// and corpus-file ingestion with a binary cache.
pub mod brain;

/// Sentence sampling: seed-weighted start selection, the bounded
/// generation walk, and dead-end recovery.
pub mod generator;

/// Internal follower statistics for a single context.
///
/// Tracks occurrence counts and supports weighted random draws.
/// This module is not exposed publicly.
pub(crate) mod state;

/// Vocabulary primitives: words, the phrase-boundary marker, and
/// fixed-length context windows with their case-normalization rules.
pub mod token;

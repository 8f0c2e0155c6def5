//! Word-level Markov chain text generation.
//!
//! This crate ingests short text samples (social-media posts or chat
//! lines), accumulates word-sequence transition statistics, and samples
//! new sentences that stylistically resemble the training corpus:
//! - A trainable transition model with case-insensitive context keys
//! - Seed-weighted sentence generation with dead-end recovery
//! - Corpus-file ingestion with a compact binary cache
//!
//! Hosts (an HTTP server, an interactive loop) live in sibling crates;
//! this crate has no CLI or wire surface of its own.

/// Core model and generation logic.
pub mod model;

/// I/O utilities (corpus reading, path helpers, directory listing).
///
/// Shared with the host crates for corpus management.
pub mod io;

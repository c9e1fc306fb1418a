//! Deterministic two-player chess rules engine.
//!
//! Given a board state and a selected piece, [`chess::game::Game`] computes
//! every fully legal destination (accounting for check, castling, en passant
//! and promotion), applies a chosen move with all side effects and classifies
//! the resulting game state (continuing, check, checkmate, stalemate,
//! fifty-move draw, resignation).
//!
//! Rendering, input loops and the promotion-choice UI are external
//! collaborators: the engine exposes read-only state, a typed event queue and
//! a promotion callback, and knows nothing else about its callers.

#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic
)]

pub mod chess;

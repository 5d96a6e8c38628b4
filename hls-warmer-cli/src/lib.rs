//! Library target for the `hls-warmer` package.
//!
//! The primary deliverable of this package is the `hls-warmer` CLI binary
//! (`src/main.rs`). This library exists so CI can run `cargo test -p hls-warmer --doc`
//! for feature/doctype validation.

#[doc(hidden)]
pub use hls_warmer_engine;

//! URL handling module for Sumi-Harvest
//!
//! This module provides URL normalization, seed parsing, origin comparison
//! and the site key used to lay out per-site output.

mod normalize;
mod origin;

// Re-export main functions
pub use normalize::{ensure_scheme, normalize_url, parse_seed, resolve};
pub use origin::{site_key, Origin};

//! Air-quality analytics for Indian cities.
//!
//! The [`data`] module is the whole analysis pipeline (load → filter →
//! aggregate / forecast); the desktop dashboard in `main.rs` only renders
//! what it produces.

pub mod config;
pub mod data;

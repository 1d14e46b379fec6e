//! Rendering of pipeline outputs. Nothing here computes statistics.

pub mod heatmap;
pub mod map;
pub mod panels;
pub mod plot;

//! Terminal rendering
//!
//! The globe owns the run loop; panels, chart and braille are drawing helpers
//! it composes each frame.

pub mod braille;
pub mod chart;
pub mod globe;
pub mod panels;

//! Layer derivation.
//!
//! Turns parsed GEOL intervals into per-borehole layers, assigns display
//! colors and joins POINT records onto their LOCA location.

pub mod colors;
pub mod layers;
pub mod locations;

pub use colors::assign_colors;
pub use layers::{aggregate_layers, classify, AbbreviationLookup};
pub use locations::join_points;

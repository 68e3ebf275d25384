//! copyfit — fits marketing copy into fixed template areas.
//!
//! Pipeline: derive a role schema from a template, clean candidate bundles against it,
//! fit every role with the layout oracle, rank single fields and whole bundles, and pick
//! a legible text color for the winner.

pub mod config;
pub mod contrast;
pub mod errors;
pub mod hygiene;
pub mod layout;
pub mod models;
pub mod ranking;
pub mod tunables;

//! Engine for infragraph
//!
//! The engine runs in stages:
//! 1. Loading - Build the resource graph from a declaration
//! 2. Validation - Resolve dependencies and check kind invariants
//! 3. Planning - Group the order into waves for display
//! 4. Diffing - Compare against a recorded snapshot

pub mod differ;
pub mod loader;
pub mod planner;
pub mod validate;

pub use loader::{Loaded, Output};
pub use validate::validate;

//! Core data model: trip events, feature vectors, labels, and price quotes.

mod events;
mod features;
mod labels;
mod quote;

pub use events::*;
pub use features::*;
pub use labels::*;
pub use quote::*;

//! Calibrated risk model: artifacts, registry, scorer, and attribution.

mod artifact;
mod explainer;
mod isotonic;
mod registry;
mod scorer;

pub use artifact::*;
pub use explainer::*;
pub use isotonic::*;
pub use registry::*;
pub use scorer::*;

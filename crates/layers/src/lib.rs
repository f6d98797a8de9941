pub mod extrusion;
pub mod host;
pub mod layer;
pub mod style;
pub mod transition;

pub use layer::*;

pub mod camera;
pub mod components;
pub mod highlight;
pub mod input;
pub mod model;
pub mod options;
pub mod overlay;
pub mod picking;

pub use overlay::*;

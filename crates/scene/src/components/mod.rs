pub mod building;
pub mod geometry;
pub mod part;

pub use building::*;
pub use geometry::*;
pub use part::*;

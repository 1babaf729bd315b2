pub mod cycle;
pub mod model;
pub mod step;

pub use cycle::*;
pub use model::*;
pub use step::*;

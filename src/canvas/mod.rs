pub mod selection;
pub mod viewport;

pub use selection::*;
pub use viewport::*;

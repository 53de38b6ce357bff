pub mod export;
pub mod invoice;
pub mod viewer;

pub use export::*;
pub use invoice::*;
pub use viewer::*;

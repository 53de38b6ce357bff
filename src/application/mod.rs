// Application layer - use cases and orchestration.
// Every client (CLI today, a form front-end later) goes through SalesService.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;

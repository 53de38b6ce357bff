mod ledger;
mod money;
mod pricing;
mod sale;
mod shop;
mod validation;

pub use ledger::*;
pub use money::*;
pub use pricing::*;
pub use sale::*;
pub use shop::*;
pub use validation::*;

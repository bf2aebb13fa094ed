mod time;
mod validation;

pub use time::*;
pub use validation::*;

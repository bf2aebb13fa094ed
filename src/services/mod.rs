mod ai;

pub use ai::*;

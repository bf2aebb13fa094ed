mod pool;
mod tasks;
mod types;

pub use pool::*;
pub use tasks::*;
pub use types::*;

#[cfg(test)]
mod tests;

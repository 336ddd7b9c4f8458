pub mod project;
pub mod task;

pub mod prelude;

pub use prelude::*;

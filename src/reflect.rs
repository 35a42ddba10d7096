mod dependency;
mod path;
mod structure;

pub use dependency::*;
pub use path::*;
pub use structure::*;

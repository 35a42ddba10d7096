mod memory;
mod source;

pub use memory::*;
pub use source::*;

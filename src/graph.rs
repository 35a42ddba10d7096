mod builder;
mod connect;
#[allow(clippy::module_inception)]
mod graph;
mod node;
mod object;

pub use builder::*;
pub use graph::*;
pub use node::*;
pub use object::*;

mod assignable;
mod constant;
mod func;
mod interface;
mod service;

pub use assignable::*;
pub use constant::*;
pub use func::*;
pub use interface::*;
pub use service::*;

mod errors;
mod frame;
mod registry;
mod seen;

pub use errors::*;
pub use frame::*;
pub use registry::*;
pub use seen::*;

mod errors;
mod lottery;
mod verification;

pub use errors::*;
pub use lottery::*;
pub use verification::*;

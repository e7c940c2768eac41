mod connection;
mod transport;

pub use transport::*;

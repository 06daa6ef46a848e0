pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod net;
pub mod server;
pub mod timing;

pub use self::error::BenchError;

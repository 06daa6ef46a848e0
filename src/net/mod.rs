pub mod ack;
pub mod tcp;
pub mod utils;
pub use self::tcp::*;

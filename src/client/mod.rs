pub mod payload;
pub mod sender;
pub mod strategy;

pub use self::payload::*;
pub use self::sender::*;
pub use self::strategy::*;

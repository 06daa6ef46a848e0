pub mod framing;
pub mod receiver;

pub use self::framing::*;
pub use self::receiver::*;

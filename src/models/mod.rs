pub mod request;
pub mod winner;

pub use request::*;
pub use winner::*;

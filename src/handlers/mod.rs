pub mod lottery;

pub use lottery::{ALLOW_ORIGIN, lottery_config};

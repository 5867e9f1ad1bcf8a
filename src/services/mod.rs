pub mod lottery_service;
pub mod winner_store;

pub use lottery_service::*;
pub use winner_store::*;

//! 브리지 도메인 모델.

mod account;
mod market_data;
mod order;

pub use account::*;
pub use market_data::*;
pub use order::*;

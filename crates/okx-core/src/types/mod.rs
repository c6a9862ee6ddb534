//! 검증된 입력 타입.

mod decimal;
mod instrument;
mod timeframe;

pub use decimal::*;
pub use instrument::*;
pub use timeframe::*;

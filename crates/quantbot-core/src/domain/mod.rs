//! 핵심 도메인 모델.

mod candle;
mod order;

pub use candle::*;
pub use order::*;

//! 거래 페어 정의.
//!
//! 이 모듈은 거래 가능한 시장을 식별하는 `Pair` 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 거래 가능한 시장을 나타내는 자산 페어.
///
/// 페어는 기준 자산과 호가 자산으로 구성됩니다. 예: BTC/USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// 기준 자산 (예: BTC, ETH)
    pub base: String,
    /// 호가 자산 (예: USD, USDT)
    pub quote: String,
}

impl Pair {
    /// 새 페어를 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// "BASE/QUOTE" 형식 문자열에서 페어를 파싱합니다.
    pub fn from_string(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            Some(Self::new(parts[0], parts[1]))
        } else {
            None
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

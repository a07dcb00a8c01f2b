//! 캔들(OHLCV) 데이터 구조체.

use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 데이터.
///
/// 한 페어의 캔들은 시간 순서가 비감소하는 시퀀스로 도착하지만,
/// 배치 내부는 소스에 따라 최신순일 수도 과거순일 수도 있습니다.
/// 소비하는 쪽은 사용 전에 [`sort_candles_ascending`]으로 시간
/// 순서를 복원해야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
    /// 캔들 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Price {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// 캔들을 타임스탬프 오름차순으로 정렬합니다.
pub fn sort_candles_ascending(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.timestamp);
}

/// 배치에서 가장 최근 캔들을 반환합니다.
pub fn latest_candle(candles: &[Candle]) -> Option<&Candle> {
    candles.iter().max_by_key(|c| c.timestamp)
}

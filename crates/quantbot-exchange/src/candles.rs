//! 백테스트용 캔들 시리즈.

use quantbot_core::{sort_candles_ascending, Candle, CandleInterval, Pair};

/// 유한하고 재생 가능한 캔들 시퀀스.
///
/// 생성 시 타임스탬프 오름차순으로 정렬되며, 배치 단위로 순차
/// 소비됩니다. 백테스트 드라이버가 로컬 체결기를 구동할 때
/// 사용합니다.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    pair: Pair,
    interval: CandleInterval,
    candles: Vec<Candle>,
    cursor: usize,
}

impl CandleSeries {
    /// 새 시리즈를 생성합니다. 입력 순서는 무관합니다.
    pub fn new(pair: Pair, interval: CandleInterval, mut candles: Vec<Candle>) -> Self {
        sort_candles_ascending(&mut candles);
        Self {
            pair,
            interval,
            candles,
            cursor: 0,
        }
    }

    /// 거래 페어를 반환합니다.
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    /// 캔들 간격을 반환합니다.
    pub fn interval(&self) -> CandleInterval {
        self.interval
    }

    /// 전체 캔들 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// 시리즈가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 아직 소비되지 않은 캔들 수를 반환합니다.
    pub fn remaining(&self) -> usize {
        self.candles.len() - self.cursor
    }

    /// 다음 배치를 반환합니다 (최대 `batch_size`개, 소진 시 `None`).
    pub fn next_batch(&mut self, batch_size: usize) -> Option<Vec<Candle>> {
        if self.cursor >= self.candles.len() || batch_size == 0 {
            return None;
        }
        let end = (self.cursor + batch_size).min(self.candles.len());
        let batch = self.candles[self.cursor..end].to_vec();
        self.cursor = end;
        Some(batch)
    }

    /// 커서를 처음으로 되돌려 시리즈를 재생 가능하게 합니다.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

//! 캔들 데이터를 위한 간격 정의.
//!
//! 이 모듈은 거래소가 지원하는 캔들 간격 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleInterval {
    /// 1분봉
    M1,
    /// 3분봉
    M3,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 4시간봉
    H4,
    /// 일봉
    D1,
    /// 주봉
    D7,
    /// 월봉
    MN1,
}

impl CandleInterval {
    /// 이 간격의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            CandleInterval::M1 => Duration::from_secs(60),
            CandleInterval::M3 => Duration::from_secs(3 * 60),
            CandleInterval::M5 => Duration::from_secs(5 * 60),
            CandleInterval::M15 => Duration::from_secs(15 * 60),
            CandleInterval::M30 => Duration::from_secs(30 * 60),
            CandleInterval::H1 => Duration::from_secs(60 * 60),
            CandleInterval::H4 => Duration::from_secs(4 * 60 * 60),
            CandleInterval::D1 => Duration::from_secs(24 * 60 * 60),
            CandleInterval::D7 => Duration::from_secs(7 * 24 * 60 * 60),
            CandleInterval::MN1 => Duration::from_secs(30 * 24 * 60 * 60), // 근사값
        }
    }

    /// 이 간격의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CandleInterval::M1 => "1m",
            CandleInterval::M3 => "3m",
            CandleInterval::M5 => "5m",
            CandleInterval::M15 => "15m",
            CandleInterval::M30 => "30m",
            CandleInterval::H1 => "1h",
            CandleInterval::H4 => "4h",
            CandleInterval::D1 => "1d",
            CandleInterval::D7 => "7d",
            CandleInterval::MN1 => "1M",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CandleInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(CandleInterval::M1),
            "3m" => Ok(CandleInterval::M3),
            "5m" => Ok(CandleInterval::M5),
            "15m" => Ok(CandleInterval::M15),
            "30m" => Ok(CandleInterval::M30),
            "1h" => Ok(CandleInterval::H1),
            "4h" => Ok(CandleInterval::H4),
            "1d" => Ok(CandleInterval::D1),
            "7d" => Ok(CandleInterval::D7),
            "1M" => Ok(CandleInterval::MN1),
            _ => Err(format!("Unknown candle interval: {}", s)),
        }
    }
}

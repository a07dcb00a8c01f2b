//! 설정 관리.
//!
//! 이 모듈은 트레이딩 모드와 애플리케이션 설정을 정의합니다.
//! 트레이딩 모드는 숨은 전역 상태가 아니라 명시적인 설정 값으로
//! 팩토리에 전달됩니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// 트레이딩 모드.
///
/// 거래소 구성 시 한 번 읽히며, 주문 생성기와 체결기 선택을
/// 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    /// 실거래 - 실제 원격 거래소에서 주문 체결
    Live,
    /// 모의투자 - 실시간 시장 데이터로 체결을 시뮬레이션
    Paper,
    /// 백테스트 - 과거 캔들 시리즈로 체결을 시뮬레이션
    Backtest,
}

impl Default for TradingMode {
    fn default() -> Self {
        Self::Paper
    }
}

impl FromStr for TradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIVE" => Ok(Self::Live),
            "PAPER" => Ok(Self::Paper),
            "BACKTEST" => Ok(Self::Backtest),
            _ => Err(format!("Unknown trading mode: {}", s)),
        }
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "LIVE"),
            TradingMode::Paper => write!(f, "PAPER"),
            TradingMode::Backtest => write!(f, "BACKTEST"),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 트레이딩 모드
    pub mode: TradingMode,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 자산별 초기 지갑 잔고
    pub wallet: HashMap<String, Decimal>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut wallet = HashMap::new();
        wallet.insert("USD".to_string(), Decimal::from(10_000));

        Self {
            mode: TradingMode::default(),
            logging: LoggingConfig::default(),
            wallet,
        }
    }
}

impl AppConfig {
    /// 주어진 트레이딩 모드로 설정을 생성합니다.
    pub fn with_mode(mode: TradingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// 설정 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `QUANTBOT_` 접두사를 사용하며 파일 값을
    /// 덮어씁니다 (예: `QUANTBOT_MODE=backtest`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("QUANTBOT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

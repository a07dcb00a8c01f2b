//! 거래소 에러 타입.

use thiserror::Error;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 레지스트리에 없는 거래소 이름
    #[error("Could not find exchange: {0}")]
    UnknownExchange(String),

    /// 기준 가격/시간이 필요하지만 아직 관측된 캔들이 없음
    #[error("No candle available")]
    NoCandleAvailable,

    /// 주문 거부됨 (예: 잔고 부족)
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl ExchangeError {
    /// 재시도 가능한 전송 계층 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_) | ExchangeError::WebSocket(_)
        )
    }

    /// 재시도하면 안 되는 치명적 에러인지 확인.
    ///
    /// 설정 오류(`UnknownExchange`)와 선행 조건 오류는 호출자에게
    /// 그대로 전달되며 재시도 대상이 아닙니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExchangeError::UnknownExchange(_)
                | ExchangeError::NoCandleAvailable
                | ExchangeError::OrderRejected(_)
        )
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

//! 전송 계층 추상화.
//!
//! 코어는 전송을 불투명한 양방향 채널로만 취급합니다. 재연결,
//! 하트비트, 재연결 시 명령 복원은 이 크레이트의 범위 밖입니다.

pub mod local;
pub mod ws;

pub use local::LocalConnection;
pub use ws::WsConnection;

use async_trait::async_trait;
use quantbot_core::{Price, Quantity, Side};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ExchangeResult;

/// 전송 계층에서 올라오는 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// 연결이 열림
    Opened,
    /// 수신된 원문 메시지
    Message(String),
}

/// 거래소로 내려보내는 와이어 명령.
///
/// `{"method": "...", "params": {...}}` 형태의 JSON으로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Command {
    /// 신규 주문 제출
    #[serde(rename_all = "camelCase")]
    NewOrder {
        client_order_id: String,
        symbol: String,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    /// 주문 취소
    #[serde(rename_all = "camelCase")]
    CancelOrder { client_order_id: String },
    /// 주문 대체 (가격/수량 변경)
    #[serde(rename_all = "camelCase")]
    ReplaceOrder {
        client_order_id: String,
        request_client_id: String,
        price: Price,
        quantity: Quantity,
    },
    /// 시장 데이터 구독
    #[serde(rename_all = "camelCase")]
    Subscribe {
        channel: String,
        symbol: String,
        period: String,
    },
}

/// 불투명한 양방향 전송 채널.
///
/// 구현체는 `connect()`에서 이벤트 수신기를 반환하고, 연결이 열리면
/// [`ConnectionEvent::Opened`]를 가장 먼저 전달해야 합니다.
#[async_trait]
pub trait Connection: Send + Sync {
    /// 연결을 열고 이벤트 수신기를 반환합니다.
    async fn connect(&self) -> ExchangeResult<mpsc::Receiver<ConnectionEvent>>;

    /// 명령을 전송합니다.
    async fn send(&self, command: &Command) -> ExchangeResult<()>;
}

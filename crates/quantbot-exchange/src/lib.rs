//! 주문 실행 및 체결 시뮬레이션 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Exchange trait: 트레이딩 모드와 무관한 통합 거래소 인터페이스
//! - 주문 생성기/체결기 (실거래, 모의투자, 백테스트 변형)
//! - OHLCV 캔들 기반 결정적 매칭 알고리즘
//! - 지갑 및 미체결 주문 트래커
//! - 거래소 팩토리와 정적 레지스트리
//! - WebSocket / 로컬 전송 계층

pub mod candles;
pub mod connection;
pub mod creator;
pub mod error;
pub mod events;
pub mod exchange;
pub mod factory;
pub mod filler;
pub mod tracker;
pub mod wallet;

pub use candles::CandleSeries;
pub use connection::{Command, Connection, ConnectionEvent, LocalConnection, WsConnection};
pub use creator::{LocalOrderCreator, OrderCreator, RemoteOrderCreator};
pub use error::{ExchangeError, ExchangeResult};
pub use events::{EventBroadcaster, ExchangeEvent};
pub use exchange::{Exchange, LocalExchange, RemoteExchange};
pub use factory::{find_definition, ExchangeDefinition, ExchangeFactory};
pub use filler::{
    is_order_within_candle, match_candle, LocalOrderFiller, OrderFiller, PaperTradingOrderFiller,
    RemoteOrderFiller,
};
pub use tracker::OrderTracker;
pub use wallet::Wallet;

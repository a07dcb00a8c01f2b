//! 주문 생성기.
//!
//! 전략의 의도(페어, 가격, 수량, 방향)를 구체적인 주문으로 바꾸고
//! 백엔드에 맞는 부수효과를 수행합니다. 원격 변형은 와이어 명령을
//! 전송하고, 로컬 변형은 주문을 인프로세스로 합성합니다.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use quantbot_core::{Candle, Order, Pair, Price, Quantity, Side};

use crate::connection::{Command, Connection};
use crate::error::{ExchangeError, ExchangeResult};
use crate::wallet::Wallet;

/// 원격 거래소로 주문 명령을 전송하는 생성기.
#[derive(Clone)]
pub struct RemoteOrderCreator {
    connection: Arc<dyn Connection>,
}

impl RemoteOrderCreator {
    pub(crate) fn new(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }

    /// 주문을 만들고 와이어 명령을 전송합니다.
    ///
    /// 반환되는 주문의 `id`는 거래소가 리포트로 확정하기 전까지
    /// 자리표시자입니다. 전송 실패는 로깅만 하고 코어로 전파하지
    /// 않습니다. 전달되지 않은 명령의 해소는 외부 재시도 정책의
    /// 몫입니다.
    pub async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order> {
        let order = Order::limit(pair.clone(), price, quantity, side, Utc::now());
        let command = Command::NewOrder {
            client_order_id: order.id.clone(),
            symbol: pair.to_string(),
            side,
            price,
            quantity,
        };

        if let Err(e) = self.connection.send(&command).await {
            warn!(order_id = %order.id, error = %e, "Failed to send order command");
        }

        Ok(order)
    }
}

/// 주문을 인프로세스로 합성하는 생성기 (모의투자/백테스트용).
#[derive(Clone)]
pub struct LocalOrderCreator {
    wallet: Arc<RwLock<Wallet>>,
    current_candle: Arc<RwLock<Option<Candle>>>,
}

impl LocalOrderCreator {
    pub(crate) fn new(
        wallet: Arc<RwLock<Wallet>>,
        current_candle: Arc<RwLock<Option<Candle>>>,
    ) -> Self {
        Self {
            wallet,
            current_candle,
        }
    }

    /// 지갑을 확인한 뒤 주문을 합성합니다.
    ///
    /// 타임스탬프는 관측된 현재 캔들이 있으면 그 캔들의 시간을,
    /// 없으면 벽시계를 사용합니다. 잔고가 부족하면
    /// [`ExchangeError::OrderRejected`]로 실패하고 아무 주문도
    /// 등록되지 않습니다.
    pub async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order> {
        let timestamp = match self.current_candle.read().await.as_ref() {
            Some(candle) => candle.timestamp,
            None => Utc::now(),
        };

        let order = Order::limit(pair.clone(), price, quantity, side, timestamp);
        if !self.wallet.read().await.is_order_allowed(&order) {
            return Err(ExchangeError::OrderRejected(format!(
                "Insufficient balance for {} {} {} @ {}",
                side, pair, quantity, price
            )));
        }

        Ok(order)
    }
}

/// 백엔드별 주문 생성 전략.
#[derive(Clone)]
pub enum OrderCreator {
    /// 실거래: 거래소 네이티브 생성기
    Remote(RemoteOrderCreator),
    /// 모의투자/백테스트: 인프로세스 합성
    Local(LocalOrderCreator),
}

impl OrderCreator {
    /// 주문을 생성합니다.
    pub async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order> {
        match self {
            OrderCreator::Remote(creator) => creator.create_order(pair, price, quantity, side).await,
            OrderCreator::Local(creator) => creator.create_order(pair, price, quantity, side).await,
        }
    }

    /// 생성된 주문의 NEW 리포트를 로컬에서 합성해야 하는지 여부.
    ///
    /// 원격 생성기는 거래소가 리포트를 보내주기를 기다립니다.
    pub fn is_local(&self) -> bool {
        matches!(self, OrderCreator::Local(_))
    }
}

//! 전략이 바라보는 거래소 파사드.
//!
//! 모든 백엔드는 동일한 [`Exchange`] trait을 구현합니다. 백엔드 간
//! 차이는 팩토리가 주입한 주문 생성기와 체결기에만 있으므로 전략
//! 코드는 트레이딩 모드와 무관하게 동일하게 동작합니다.

pub mod local;
pub mod remote;

pub use local::LocalExchange;
pub use remote::RemoteExchange;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

use quantbot_core::{sort_candles_ascending, Candle, Order, Pair, Price, Quantity, Side};

use crate::creator::OrderCreator;
use crate::error::{ExchangeError, ExchangeResult};
use crate::events::ExchangeEvent;
use crate::filler::{OrderFiller, ReportPipeline};

/// 구독 채널의 기본 버퍼 크기.
const EVENT_BUFFER_SIZE: usize = 256;

/// 통합 거래소 인터페이스.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    /// 거래소에 연결하고 이벤트 처리를 시작.
    async fn connect(&mut self) -> ExchangeResult<()>;

    /// 주문을 받을 준비가 되었는지 확인.
    async fn is_ready(&self) -> bool;

    /// 지정가 주문 생성.
    async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order>;

    /// 미체결 주문 취소.
    async fn cancel_order(&self, order: &Order) -> ExchangeResult<()>;

    /// 주문의 가격과 수량을 조정 (대체 주문 발행).
    ///
    /// 모호함을 피하기 위해 가격과 수량 둘 다 필수입니다. 아직
    /// 관측된 캔들이 없으면 [`ExchangeError::NoCandleAvailable`]로
    /// 실패합니다.
    async fn adjust_order(
        &self,
        order: &Order,
        price: Price,
        quantity: Quantity,
    ) -> ExchangeResult<Order>;

    /// 캔들을 구독자에게 발행.
    ///
    /// 입력 순서와 무관하게 타임스탬프 오름차순으로 발행되며, 발행
    /// 후 현재 캔들은 가장 최신 캔들이 됩니다.
    async fn emit_candles(&self, candles: Vec<Candle>);

    /// 캔들 스냅샷 수신 훅.
    async fn on_snapshot_candles(&self, pair: &Pair, candles: Vec<Candle>);

    /// 캔들 업데이트 수신 훅.
    async fn on_update_candles(&self, pair: &Pair, candles: Vec<Candle>);

    /// 현재 미체결 주문 조회.
    async fn get_open_orders(&self) -> Vec<Order>;

    /// 거래소 이벤트 구독.
    async fn subscribe(&self) -> mpsc::Receiver<ExchangeEvent>;
}

/// 파사드 구현체들이 공유하는 코어 상태와 동작.
#[derive(Clone)]
pub(crate) struct ExchangeCore {
    pub name: String,
    pub creator: OrderCreator,
    pub filler: OrderFiller,
    pub pipeline: ReportPipeline,
    pub current_candle: Arc<RwLock<Option<Candle>>>,
    ready: Arc<RwLock<bool>>,
}

impl ExchangeCore {
    pub fn new(
        name: impl Into<String>,
        creator: OrderCreator,
        filler: OrderFiller,
        pipeline: ReportPipeline,
        current_candle: Arc<RwLock<Option<Candle>>>,
    ) -> Self {
        Self {
            name: name.into(),
            creator,
            filler,
            pipeline,
            current_candle,
            ready: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }

    /// 준비 완료로 표시하고 `Ready` 이벤트를 발행합니다.
    pub async fn mark_ready(&self) {
        *self.ready.write().await = true;
        self.pipeline.events.broadcast(ExchangeEvent::Ready).await;
        info!(exchange = %self.name, "Exchange ready");
    }

    pub async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order> {
        let order = self.creator.create_order(pair, price, quantity, side).await?;
        self.pipeline
            .tracker
            .write()
            .await
            .set_order_in_progress(order.id.clone());
        info!(
            order_id = %order.id,
            pair = %pair,
            side = %side,
            price = %price,
            "Order created"
        );

        // 로컬 생성기는 NEW 리포트를 직접 합성해 되돌려 보냅니다.
        // 원격 생성기의 주문은 거래소 리포트가 확정합니다.
        if self.creator.is_local() {
            self.pipeline.process_report(order.clone(), None).await;
        }
        Ok(order)
    }

    pub async fn cancel_order(&self, order: &Order) -> ExchangeResult<()> {
        self.guard_not_in_progress(&order.id).await?;
        self.pipeline
            .tracker
            .write()
            .await
            .set_order_in_progress(order.id.clone());

        if self.creator.is_local() {
            let timestamp = self.report_timestamp().await;
            let order = self.authoritative_order(order).await;
            self.pipeline
                .process_report(order.as_canceled(timestamp), None)
                .await;
        }
        Ok(())
    }

    pub async fn adjust_order(
        &self,
        order: &Order,
        price: Price,
        quantity: Quantity,
    ) -> ExchangeResult<Order> {
        let candle_timestamp = self
            .current_candle
            .read()
            .await
            .as_ref()
            .map(|c| c.timestamp)
            .ok_or(ExchangeError::NoCandleAvailable)?;

        self.guard_not_in_progress(&order.id).await?;
        let order = self.authoritative_order(order).await;
        let replacement = order.replace_with(price, quantity, candle_timestamp);
        self.pipeline
            .tracker
            .write()
            .await
            .set_order_in_progress(order.id.clone());

        if self.creator.is_local() {
            self.pipeline
                .process_report(replacement.clone(), Some(&order))
                .await;
        }
        Ok(replacement)
    }

    pub async fn emit_candles(&self, mut candles: Vec<Candle>) {
        if candles.is_empty() {
            return;
        }
        sort_candles_ascending(&mut candles);
        if let Some(latest) = candles.last() {
            *self.current_candle.write().await = Some(latest.clone());
        }
        self.pipeline
            .events
            .broadcast(ExchangeEvent::UpdateCandles(candles))
            .await;
    }

    pub async fn on_snapshot_candles(&self, pair: &Pair, candles: Vec<Candle>) {
        self.emit_candles(candles.clone()).await;
        self.filler.on_snapshot_candles(pair, &candles).await;
    }

    pub async fn on_update_candles(&self, pair: &Pair, candles: Vec<Candle>) {
        self.emit_candles(candles.clone()).await;
        self.filler.on_update_candles(pair, &candles).await;
    }

    pub async fn get_open_orders(&self) -> Vec<Order> {
        self.pipeline.tracker.read().await.get_open_orders()
    }

    pub async fn subscribe(&self) -> mpsc::Receiver<ExchangeEvent> {
        self.pipeline.events.subscribe(EVENT_BUFFER_SIZE).await
    }

    /// 트래커에 기록된 미체결 사본을 우선합니다.
    ///
    /// 호출자가 들고 있는 주문 사본은 오래됐을 수 있으므로, 취소와
    /// 조정 리포트는 트래커가 기억하는 가격/수량 기준으로 합성합니다.
    async fn authoritative_order(&self, order: &Order) -> Order {
        self.pipeline
            .tracker
            .read()
            .await
            .find_open_order(&order.id)
            .cloned()
            .unwrap_or_else(|| order.clone())
    }

    /// 현재 캔들이 있으면 그 시간을, 없으면 벽시계를 반환합니다.
    async fn report_timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self.current_candle.read().await.as_ref() {
            Some(candle) => candle.timestamp,
            None => chrono::Utc::now(),
        }
    }

    /// 같은 주문에 대한 동시 조정/취소를 거부합니다.
    async fn guard_not_in_progress(&self, id: &str) -> ExchangeResult<()> {
        if self.pipeline.tracker.read().await.is_order_in_progress(id) {
            return Err(ExchangeError::OrderRejected(format!(
                "Order is in progress: {}",
                id
            )));
        }
        Ok(())
    }
}

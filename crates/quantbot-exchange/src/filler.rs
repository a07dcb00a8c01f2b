//! 주문 체결기와 매칭 알고리즘.
//!
//! 시뮬레이션 백엔드(모의투자, 백테스트)는 동일한 매칭 알고리즘을
//! 공유합니다. 캔들 하나에 대해:
//!
//! 1. `created_at`이 캔들 타임스탬프보다 엄격히 이른 주문만 체결
//!    후보가 됩니다. 주문보다 먼저 발생한 캔들은 그 주문을 체결할
//!    수 없습니다.
//! 2. 매수는 `candle.low < price`, 매도는 `candle.high > price`일
//!    때만 체결됩니다. 등호는 체결하지 않습니다 (스프레드 모델링).
//! 3. 체결 리포트는 `updated_at`에 캔들 타임스탬프를 찍어 백테스트
//!    결정성을 보존합니다.
//! 4. 나이 필터나 가격 조건에 걸리지 않은 주문만 미체결 집합에
//!    남습니다.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use quantbot_core::{sort_candles_ascending, Candle, Order, Pair, Side};

use crate::events::{EventBroadcaster, ExchangeEvent};
use crate::tracker::OrderTracker;
use crate::wallet::Wallet;

/// 주문이 캔들 가격 범위 안에서 체결되는지 판정합니다.
///
/// 등호는 체결하지 않습니다. 정확히 지정가에 닿기만 한 경우는
/// 호가 스프레드 때문에 실제로는 체결되지 않았을 수 있습니다.
pub fn is_order_within_candle(order: &Order, candle: &Candle) -> bool {
    match order.side {
        Side::Buy => candle.low < order.price,
        Side::Sell => candle.high > order.price,
    }
}

/// 캔들 하나를 미체결 집합과 매칭합니다.
///
/// `(생존 주문, 체결 리포트)`를 반환합니다. 나이 필터에 걸린 주문과
/// 가격이 닿지 않은 주문은 생존 집합에 남습니다.
pub fn match_candle(open_orders: Vec<Order>, candle: &Candle) -> (Vec<Order>, Vec<Order>) {
    let mut survivors = Vec::with_capacity(open_orders.len());
    let mut fills = Vec::new();

    for order in open_orders {
        let eligible = order.created_at < candle.timestamp;
        if eligible && is_order_within_candle(&order, candle) {
            fills.push(order.as_filled(candle.timestamp));
        } else {
            survivors.push(order);
        }
    }

    (survivors, fills)
}

/// 리포트를 트래커, 지갑, 이벤트 버스로 흘려보내는 파이프라인.
///
/// 시뮬레이션 경로 전용입니다. 지갑 산술은 이 파이프라인을 지나는
/// 리포트에만 적용됩니다.
#[derive(Clone)]
pub(crate) struct ReportPipeline {
    pub tracker: Arc<RwLock<OrderTracker>>,
    pub wallet: Arc<RwLock<Wallet>>,
    pub events: EventBroadcaster<ExchangeEvent>,
}

impl ReportPipeline {
    /// 리포트 하나를 지갑 → 트래커 → 구독자 순으로 적용합니다.
    pub async fn process_report(&self, report: Order, superseded: Option<&Order>) {
        self.wallet.write().await.update_assets(&report, superseded);
        self.tracker.write().await.process(&report);
        self.events.broadcast(ExchangeEvent::Report(report)).await;
    }

    /// 캔들 배치를 타임스탬프 오름차순으로 복원한 뒤 캔들별로
    /// 매칭을 적용합니다. 각 캔들의 생존 집합이 다음 캔들의 입력이
    /// 됩니다.
    pub async fn process_candles(&self, candles: &[Candle]) {
        let mut batch = candles.to_vec();
        sort_candles_ascending(&mut batch);

        for candle in &batch {
            let open_orders = self.tracker.read().await.get_open_orders();
            if open_orders.is_empty() {
                continue;
            }

            let (survivors, fills) = match_candle(open_orders, candle);
            self.tracker.write().await.set_open_orders(survivors);

            for fill in fills {
                info!(
                    order_id = %fill.id,
                    pair = %fill.pair,
                    price = %fill.price,
                    "Order filled"
                );
                self.process_report(fill, None).await;
            }
        }
    }
}

/// 원격 거래소가 직접 체결을 보고하는 실거래용 체결기.
///
/// 매칭 알고리즘을 실행하지 않고 거래소 리포트를 트래커로
/// 통과시키기만 합니다.
#[derive(Clone)]
pub struct RemoteOrderFiller {
    tracker: Arc<RwLock<OrderTracker>>,
    events: EventBroadcaster<ExchangeEvent>,
}

impl RemoteOrderFiller {
    pub(crate) fn new(
        tracker: Arc<RwLock<OrderTracker>>,
        events: EventBroadcaster<ExchangeEvent>,
    ) -> Self {
        Self { tracker, events }
    }

    /// 거래소가 보낸 주문 리포트를 통과시킵니다.
    pub async fn on_report(&self, report: Order) {
        self.tracker.write().await.process(&report);
        self.events.broadcast(ExchangeEvent::Report(report)).await;
    }
}

/// 실시간 시장 데이터로 체결을 시뮬레이션하는 모의투자용 체결기.
#[derive(Clone)]
pub struct PaperTradingOrderFiller {
    pipeline: ReportPipeline,
}

/// 과거 캔들 시리즈 재생으로 체결을 시뮬레이션하는 백테스트용 체결기.
#[derive(Clone)]
pub struct LocalOrderFiller {
    pipeline: ReportPipeline,
}

/// 백엔드별 체결 전략.
///
/// 팩토리가 트레이딩 모드에 따라 한 번 선택하며, 거래소 파사드는
/// 어느 변형이 활성인지 알 필요가 없습니다.
#[derive(Clone)]
pub enum OrderFiller {
    /// 실거래: 체결은 원격 거래소가 보고
    Remote(RemoteOrderFiller),
    /// 모의투자: 실시간 캔들에 매칭 알고리즘 적용
    Paper(PaperTradingOrderFiller),
    /// 백테스트: 과거 캔들 배치에 매칭 알고리즘 적용
    Local(LocalOrderFiller),
}

impl OrderFiller {
    pub(crate) fn remote(
        tracker: Arc<RwLock<OrderTracker>>,
        events: EventBroadcaster<ExchangeEvent>,
    ) -> Self {
        OrderFiller::Remote(RemoteOrderFiller::new(tracker, events))
    }

    pub(crate) fn paper(pipeline: ReportPipeline) -> Self {
        OrderFiller::Paper(PaperTradingOrderFiller { pipeline })
    }

    pub(crate) fn local(pipeline: ReportPipeline) -> Self {
        OrderFiller::Local(LocalOrderFiller { pipeline })
    }

    /// 캔들 스냅샷(과거 구간 백필)에 반응합니다.
    pub async fn on_snapshot_candles(&self, pair: &Pair, candles: &[Candle]) {
        match self {
            OrderFiller::Paper(filler) => {
                debug!(pair = %pair, count = candles.len(), "Snapshot candles received");
                filler.pipeline.process_candles(candles).await;
            }
            OrderFiller::Remote(_) | OrderFiller::Local(_) => {}
        }
    }

    /// 실시간 캔들 업데이트에 반응합니다.
    pub async fn on_update_candles(&self, pair: &Pair, candles: &[Candle]) {
        match self {
            OrderFiller::Paper(filler) => {
                debug!(pair = %pair, count = candles.len(), "Update candles received");
                filler.pipeline.process_candles(candles).await;
            }
            OrderFiller::Remote(_) | OrderFiller::Local(_) => {}
        }
    }

    /// 백테스트 배치를 처리합니다 (로컬 체결기 전용).
    pub async fn on_process_candles(&self, candles: &[Candle]) {
        if let OrderFiller::Local(filler) = self {
            filler.pipeline.process_candles(candles).await;
        }
    }

    /// 원격 거래소가 보고한 주문 리포트를 처리합니다.
    ///
    /// 시뮬레이션 체결기는 자체적으로 리포트를 생성하므로 원격
    /// 리포트를 무시합니다.
    pub async fn on_report(&self, report: Order) {
        if let OrderFiller::Remote(filler) = self {
            filler.on_report(report).await;
        }
    }
}

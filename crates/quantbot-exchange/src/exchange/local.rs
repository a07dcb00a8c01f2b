//! 시뮬레이션 백엔드 파사드.

use async_trait::async_trait;
use tokio::sync::mpsc;

use quantbot_core::{Candle, Order, Pair, Price, Quantity, Side};

use super::{Exchange, ExchangeCore};
use crate::candles::CandleSeries;
use crate::error::ExchangeResult;
use crate::events::ExchangeEvent;

/// 네트워크 없이 동작하는 시뮬레이션 거래소.
///
/// 주입된 체결기에 따라 모의투자(실시간 캔들)와 백테스트(과거
/// 시리즈 재생) 양쪽을 모두 지원합니다. 캔들 발행이 곧 시장의
/// 진행이므로 [`Exchange::emit_candles`]가 체결 파이프라인도 함께
/// 구동합니다.
pub struct LocalExchange {
    core: ExchangeCore,
}

impl LocalExchange {
    pub(crate) fn new(core: ExchangeCore) -> Self {
        Self { core }
    }

    /// 캔들 시리즈를 배치 단위로 재생합니다 (백테스트 드라이버).
    pub async fn replay(&self, series: &mut CandleSeries, batch_size: usize) {
        while let Some(batch) = series.next_batch(batch_size) {
            self.emit_candles(batch).await;
        }
    }

    /// 시뮬레이션 지갑의 자산 잔고를 조회합니다.
    pub async fn balance(&self, asset: &str) -> rust_decimal::Decimal {
        self.core.pipeline.wallet.read().await.balance(asset)
    }
}

#[async_trait]
impl Exchange for LocalExchange {
    fn name(&self) -> &str {
        &self.core.name
    }

    async fn connect(&mut self) -> ExchangeResult<()> {
        self.core.mark_ready().await;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.core.is_ready().await
    }

    async fn create_order(
        &self,
        pair: &Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> ExchangeResult<Order> {
        self.core.create_order(pair, price, quantity, side).await
    }

    async fn cancel_order(&self, order: &Order) -> ExchangeResult<()> {
        self.core.cancel_order(order).await
    }

    async fn adjust_order(
        &self,
        order: &Order,
        price: Price,
        quantity: Quantity,
    ) -> ExchangeResult<Order> {
        self.core.adjust_order(order, price, quantity).await
    }

    async fn emit_candles(&self, candles: Vec<Candle>) {
        self.core.emit_candles(candles.clone()).await;
        self.core.filler.on_process_candles(&candles).await;
    }

    async fn on_snapshot_candles(&self, pair: &Pair, candles: Vec<Candle>) {
        self.core.on_snapshot_candles(pair, candles).await;
    }

    async fn on_update_candles(&self, pair: &Pair, candles: Vec<Candle>) {
        self.core.on_update_candles(pair, candles).await;
    }

    async fn get_open_orders(&self) -> Vec<Order> {
        self.core.get_open_orders().await
    }

    async fn subscribe(&self) -> mpsc::Receiver<ExchangeEvent> {
        self.core.subscribe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ExchangeFactory;
    use chrono::{DateTime, Duration, Utc};
    use quantbot_core::{AppConfig, TradingMode};
    use rust_decimal_macros::dec;

    fn candle(low: rust_decimal::Decimal, timestamp: DateTime<Utc>) -> Candle {
        Candle {
            open: dec!(110),
            high: dec!(120),
            low,
            close: dec!(115),
            volume: dec!(10),
            timestamp,
        }
    }

    async fn backtest_exchange() -> LocalExchange {
        let factory = ExchangeFactory::new(AppConfig::with_mode(TradingMode::Backtest));
        factory.create_local_exchange("local").unwrap()
    }

    #[tokio::test]
    async fn test_connect_emits_ready() {
        let mut exchange = backtest_exchange().await;
        let mut rx = exchange.subscribe().await;

        exchange.connect().await.unwrap();
        assert!(exchange.is_ready().await);
        assert!(matches!(rx.recv().await, Some(ExchangeEvent::Ready)));
    }

    #[tokio::test]
    async fn test_emit_candles_republishes_ascending() {
        let exchange = backtest_exchange().await;
        let mut rx = exchange.subscribe().await;
        let t0 = Utc::now();

        // 최신순 입력
        exchange
            .emit_candles(vec![
                candle(dec!(100), t0 + Duration::minutes(2)),
                candle(dec!(100), t0 + Duration::minutes(1)),
                candle(dec!(100), t0),
            ])
            .await;

        match rx.recv().await {
            Some(ExchangeEvent::UpdateCandles(published)) => {
                assert_eq!(published.len(), 3);
                assert!(published.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            }
            other => panic!("Expected UpdateCandles, got {:?}", other),
        }

        // 현재 캔들은 최대 타임스탬프 캔들
        let replacement_base = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(90), dec!(1), Side::Buy)
            .await
            .unwrap();
        assert_eq!(replacement_base.created_at, t0 + Duration::minutes(2));
    }

    #[tokio::test]
    async fn test_adjust_order_requires_candle() {
        let exchange = backtest_exchange().await;
        let order = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(1), Side::Buy)
            .await
            .unwrap();

        let result = exchange.adjust_order(&order, dec!(90), dec!(1)).await;
        assert!(matches!(
            result,
            Err(crate::error::ExchangeError::NoCandleAvailable)
        ));
    }

    #[tokio::test]
    async fn test_adjust_order_emits_replaced_report() {
        let exchange = backtest_exchange().await;
        let t0 = Utc::now();
        exchange.emit_candles(vec![candle(dec!(200), t0)]).await;

        let order = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(1), Side::Buy)
            .await
            .unwrap();
        let replacement = exchange.adjust_order(&order, dec!(90), dec!(2)).await.unwrap();

        assert_ne!(replacement.id, order.id);
        assert_eq!(replacement.original_id.as_deref(), Some(order.id.as_str()));

        let open = exchange.get_open_orders().await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, replacement.id);
    }

    #[tokio::test]
    async fn test_cancel_order_removes_from_open_set() {
        let exchange = backtest_exchange().await;
        let order = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(1), Side::Buy)
            .await
            .unwrap();
        assert_eq!(exchange.get_open_orders().await.len(), 1);

        exchange.cancel_order(&order).await.unwrap();
        assert!(exchange.get_open_orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_with_stale_copy_releases_tracked_reservation() {
        let exchange = backtest_exchange().await;
        let order = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(1), Side::Buy)
            .await
            .unwrap();
        assert_eq!(exchange.balance("USD").await, dec!(9900));

        // 호출자 사본의 가격이 어긋나 있어도 트래커 기준으로 해제
        let mut stale = order.clone();
        stale.price = dec!(50);
        exchange.cancel_order(&stale).await.unwrap();

        assert!(exchange.get_open_orders().await.is_empty());
        assert_eq!(exchange.balance("USD").await, dec!(10000));
    }

    #[tokio::test]
    async fn test_replay_fills_backtest_order() {
        let exchange = backtest_exchange().await;
        let t0 = Utc::now();

        // 현재 캔들을 t0로 설정한 뒤 BUY@100 생성
        exchange.emit_candles(vec![candle(dec!(200), t0)]).await;
        let order = exchange
            .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(1), Side::Buy)
            .await
            .unwrap();

        let mut series = crate::candles::CandleSeries::new(
            Pair::new("BTC", "USD"),
            quantbot_core::CandleInterval::M1,
            vec![
                candle(dec!(150), t0 + Duration::minutes(1)),
                candle(dec!(99), t0 + Duration::minutes(2)),
            ],
        );
        exchange.replay(&mut series, 1).await;

        assert!(exchange.get_open_orders().await.is_empty());
        let _ = order;
    }
}

//! 백테스트 엔드투엔드 통합 테스트.
//!
//! 팩토리 조립 → 주문 생성 → 캔들 시리즈 재생 → 체결 → 잔고 정산의
//! 전체 흐름을 검증합니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use quantbot_core::{AppConfig, Candle, CandleInterval, Pair, ReportType, Side, TradingMode};
use quantbot_exchange::{CandleSeries, Exchange, ExchangeError, ExchangeEvent, ExchangeFactory};

fn candle(low: Decimal, timestamp: DateTime<Utc>) -> Candle {
    Candle {
        open: dec!(160),
        high: dec!(170),
        low,
        close: dec!(165),
        volume: dec!(50),
        timestamp,
    }
}

fn backtest_config() -> AppConfig {
    let mut wallet = HashMap::new();
    wallet.insert("USD".to_string(), dec!(10000));
    AppConfig {
        wallet,
        ..AppConfig::with_mode(TradingMode::Backtest)
    }
}

#[tokio::test]
async fn test_full_backtest_flow() {
    let factory = ExchangeFactory::new(backtest_config());
    let mut exchange = factory.create_local_exchange("local").unwrap();
    let mut events = exchange.subscribe().await;
    let pair = Pair::new("BTC", "USD");
    let t0 = Utc::now();

    exchange.connect().await.unwrap();
    assert!(matches!(events.recv().await, Some(ExchangeEvent::Ready)));

    // 시드 캔들로 현재 캔들 설정
    exchange.emit_candles(vec![candle(dec!(150), t0)]).await;
    assert!(matches!(
        events.recv().await,
        Some(ExchangeEvent::UpdateCandles(_))
    ));

    // BUY 1 BTC @ 100 — 지갑에서 100 USD 예약
    let order = exchange
        .create_order(&pair, dec!(100), dec!(1), Side::Buy)
        .await
        .unwrap();
    assert_eq!(order.created_at, t0);
    match events.recv().await {
        Some(ExchangeEvent::Report(report)) => {
            assert_eq!(report.id, order.id);
            assert_eq!(report.report_type, ReportType::New);
        }
        other => panic!("Expected NEW report, got {:?}", other),
    }
    assert_eq!(exchange.balance("USD").await, dec!(9900));

    // 가격이 닿지 않는 캔들, 그 다음 low 99 캔들 재생
    let mut series = CandleSeries::new(
        pair.clone(),
        CandleInterval::M1,
        vec![
            candle(dec!(120), t0 + Duration::minutes(1)),
            candle(dec!(99), t0 + Duration::minutes(2)),
        ],
    );
    exchange.replay(&mut series, 1).await;

    // 첫 배치: 캔들만, 둘째 배치: 캔들 + 체결 리포트
    assert!(matches!(
        events.recv().await,
        Some(ExchangeEvent::UpdateCandles(_))
    ));
    assert!(matches!(
        events.recv().await,
        Some(ExchangeEvent::UpdateCandles(_))
    ));
    match events.recv().await {
        Some(ExchangeEvent::Report(report)) => {
            assert_eq!(report.id, order.id);
            assert_eq!(report.report_type, ReportType::Trade);
            assert_eq!(report.updated_at, t0 + Duration::minutes(2));
        }
        other => panic!("Expected TRADE report, got {:?}", other),
    }

    // 정산: USD는 예약분이 소진된 채, BTC가 입금됨
    assert!(exchange.get_open_orders().await.is_empty());
    assert_eq!(exchange.balance("USD").await, dec!(9900));
    assert_eq!(exchange.balance("BTC").await, dec!(1));
}

#[tokio::test]
async fn test_adjust_then_fill_at_new_price() {
    let factory = ExchangeFactory::new(backtest_config());
    let mut exchange = factory.create_local_exchange("local").unwrap();
    let pair = Pair::new("BTC", "USD");
    let t0 = Utc::now();

    exchange.connect().await.unwrap();
    exchange.emit_candles(vec![candle(dec!(150), t0)]).await;

    let order = exchange
        .create_order(&pair, dec!(100), dec!(1), Side::Buy)
        .await
        .unwrap();
    let replacement = exchange.adjust_order(&order, dec!(110), dec!(1)).await.unwrap();
    assert_eq!(exchange.balance("USD").await, dec!(9890));

    // 원 주문 가격에는 닿지 않지만 대체 주문 가격에는 닿는 캔들
    let mut series = CandleSeries::new(
        pair,
        CandleInterval::M1,
        vec![candle(dec!(105), t0 + Duration::minutes(1))],
    );
    exchange.replay(&mut series, 1).await;

    assert!(exchange.get_open_orders().await.is_empty());
    assert_eq!(exchange.balance("BTC").await, dec!(1));
    let _ = replacement;
}

#[tokio::test]
async fn test_lagging_subscriber_receives_fill_during_long_replay() {
    let factory = ExchangeFactory::new(backtest_config());
    let mut exchange = factory.create_local_exchange("local").unwrap();
    let mut events = exchange.subscribe().await;
    let pair = Pair::new("BTC", "USD");
    let t0 = Utc::now();

    exchange.connect().await.unwrap();
    exchange.emit_candles(vec![candle(dec!(150), t0)]).await;
    let order = exchange
        .create_order(&pair, dec!(100), dec!(1), Side::Buy)
        .await
        .unwrap();

    // 구독 버퍼보다 훨씬 긴 재생, 마지막 캔들에서만 체결
    let candles: Vec<Candle> = (1..=301i64)
        .map(|i| {
            let low = if i == 301 { dec!(99) } else { dec!(120) };
            candle(low, t0 + Duration::minutes(i))
        })
        .collect();
    let mut series = CandleSeries::new(pair.clone(), CandleInterval::M1, candles);

    // 뒤처진 구독자: 재생과 동시에 천천히 소비
    let order_id = order.id.clone();
    let reader = tokio::spawn(async move {
        let mut saw_trade = false;
        while let Some(event) = events.recv().await {
            if let ExchangeEvent::Report(report) = event {
                if report.id == order_id && report.report_type == ReportType::Trade {
                    saw_trade = true;
                }
            }
        }
        saw_trade
    });

    exchange.replay(&mut series, 1).await;
    assert!(exchange.get_open_orders().await.is_empty());

    // 거래소를 내리면 이벤트 채널이 닫히고 구독자가 종료됨
    drop(exchange);
    assert!(
        reader.await.unwrap(),
        "Fill report was not delivered to the lagging subscriber"
    );
}

#[tokio::test]
async fn test_insufficient_balance_rejects_order() {
    let factory = ExchangeFactory::new(backtest_config());
    let exchange = factory.create_local_exchange("local").unwrap();

    let result = exchange
        .create_order(&Pair::new("BTC", "USD"), dec!(100), dec!(200), Side::Buy)
        .await;

    assert!(matches!(result, Err(ExchangeError::OrderRejected(_))));
    assert!(exchange.get_open_orders().await.is_empty());
    assert_eq!(exchange.balance("USD").await, dec!(10000));
}

#[tokio::test]
async fn test_unknown_exchange_name() {
    let factory = ExchangeFactory::new(backtest_config());
    let result = factory.create_exchange("kraken");

    match result {
        Err(err) => assert_eq!(err.to_string(), "Could not find exchange: kraken"),
        Ok(_) => panic!("Expected UnknownExchange error"),
    }
}

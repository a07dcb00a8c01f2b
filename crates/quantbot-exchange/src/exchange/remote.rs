//! 원격 거래소 백엔드 파사드.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use quantbot_core::{Candle, CandleInterval, Order, Pair, Price, Quantity, Side};

use super::{Exchange, ExchangeCore};
use crate::connection::{Command, Connection, ConnectionEvent};
use crate::error::ExchangeResult;
use crate::events::ExchangeEvent;

/// 원격 거래소가 보내는 와이어 메시지.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
enum VenueMessage {
    /// 주문 리포트
    Report(Order),
    /// 캔들 스냅샷 (과거 구간)
    #[serde(rename_all = "camelCase")]
    SnapshotCandles { pair: Pair, candles: Vec<Candle> },
    /// 캔들 업데이트
    #[serde(rename_all = "camelCase")]
    UpdateCandles { pair: Pair, candles: Vec<Candle> },
}

/// 전송 채널 너머의 실제 거래소를 감싸는 파사드.
///
/// 실거래에서는 원격 생성기/체결기가, 모의투자에서는 로컬 생성기와
/// 모의 체결기가 주입됩니다. 어느 쪽이든 시장 데이터는 전송 채널을
/// 통해 들어옵니다.
pub struct RemoteExchange {
    core: ExchangeCore,
    connection: Arc<dyn Connection>,
}

impl RemoteExchange {
    pub(crate) fn new(core: ExchangeCore, connection: Arc<dyn Connection>) -> Self {
        Self { core, connection }
    }

    /// 해당 페어/간격의 캔들 구독 명령을 전송합니다.
    pub async fn subscribe_candles(&self, pair: &Pair, interval: CandleInterval) {
        self.send_command(Command::Subscribe {
            channel: "candles".to_string(),
            symbol: pair.to_string(),
            period: interval.to_string(),
        })
        .await;
    }

    /// 명령 전송 실패는 로깅만 하고 전파하지 않습니다. 해당 주문의
    /// 진행 중 표시는 외부 재시도 정책이 해소할 때까지 유지됩니다.
    async fn send_command(&self, command: Command) {
        if let Err(e) = self.connection.send(&command).await {
            warn!(error = %e, "Failed to send command");
        }
    }
}

async fn handle_event(core: &ExchangeCore, event: ConnectionEvent) {
    match event {
        ConnectionEvent::Opened => core.mark_ready().await,
        ConnectionEvent::Message(text) => match serde_json::from_str::<VenueMessage>(&text) {
            Ok(VenueMessage::Report(report)) => core.filler.on_report(report).await,
            Ok(VenueMessage::SnapshotCandles { pair, candles }) => {
                core.on_snapshot_candles(&pair, candles).await;
            }
            Ok(VenueMessage::UpdateCandles { pair, candles }) => {
                core.on_update_candles(&pair, candles).await;
            }
            Err(e) => debug!(error = %e, "Ignoring unrecognized message"),
        },
    }
}

#[async_trait]
impl Exchange for RemoteExchange {
    fn name(&self) -> &str {
        &self.core.name
    }

    async fn connect(&mut self) -> ExchangeResult<()> {
        let mut rx = self.connection.connect().await?;
        let core = self.core.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_event(&core, event).await;
            }
            debug!(exchange = %core.name, "Connection event stream closed");
        });
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
        self.core.cancel_order(order).await?;
        if !self.core.creator.is_local() {
            self.send_command(Command::CancelOrder {
                client_order_id: order.id.clone(),
            })
            .await;
        }
        Ok(())
    }

    async fn adjust_order(
        &self,
        order: &Order,
        price: Price,
        quantity: Quantity,
    ) -> ExchangeResult<Order> {
        let replacement = self.core.adjust_order(order, price, quantity).await?;
        if !self.core.creator.is_local() {
            self.send_command(Command::ReplaceOrder {
                client_order_id: order.id.clone(),
                request_client_id: replacement.id.clone(),
                price,
                quantity,
            })
            .await;
        }
        Ok(replacement)
    }

    async fn emit_candles(&self, candles: Vec<Candle>) {
        self.core.emit_candles(candles).await;
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

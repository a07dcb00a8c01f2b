//! 거래소 팩토리 — 구성 루트.
//!
//! 거래소 이름과 트레이딩 모드로부터 주문 생성기, 체결기, 지갑,
//! 트래커를 선택해 하나의 거래소로 조립합니다. 트레이딩 모드는
//! 숨은 전역 상태가 아니라 [`AppConfig`]로 명시적으로 전달되므로
//! 팩토리는 입력에 대해 순수합니다.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use quantbot_core::{AppConfig, Candle, CandleInterval, TradingMode};

use crate::connection::{Connection, WsConnection};
use crate::creator::{LocalOrderCreator, OrderCreator, RemoteOrderCreator};
use crate::error::{ExchangeError, ExchangeResult};
use crate::events::EventBroadcaster;
use crate::exchange::{Exchange, ExchangeCore, LocalExchange, RemoteExchange};
use crate::filler::{OrderFiller, ReportPipeline};
use crate::tracker::OrderTracker;
use crate::wallet::Wallet;

/// 레지스트리에 등록된 거래소 정의.
#[derive(Debug, Clone)]
pub struct ExchangeDefinition {
    /// 거래소 이름
    pub name: &'static str,
    /// WebSocket 엔드포인트 (시뮬레이션 전용이면 빈 문자열)
    pub ws_url: &'static str,
    /// 지원되는 캔들 간격
    pub intervals: &'static [CandleInterval],
}

impl ExchangeDefinition {
    /// 거래소가 해당 캔들 간격을 지원하는지 확인합니다.
    pub fn supports(&self, interval: CandleInterval) -> bool {
        self.intervals.contains(&interval)
    }
}

const ALL_INTERVALS: &[CandleInterval] = &[
    CandleInterval::M1,
    CandleInterval::M3,
    CandleInterval::M5,
    CandleInterval::M15,
    CandleInterval::M30,
    CandleInterval::H1,
    CandleInterval::H4,
    CandleInterval::D1,
    CandleInterval::D7,
    CandleInterval::MN1,
];

/// 정적 거래소 레지스트리.
const REGISTRY: &[ExchangeDefinition] = &[
    ExchangeDefinition {
        name: "local",
        ws_url: "",
        intervals: ALL_INTERVALS,
    },
    ExchangeDefinition {
        name: "hitbtc",
        ws_url: "wss://api.hitbtc.com/api/2/ws",
        intervals: ALL_INTERVALS,
    },
];

/// 이름으로 거래소 정의를 찾습니다.
pub fn find_definition(name: &str) -> Option<&'static ExchangeDefinition> {
    REGISTRY.iter().find(|def| def.name == name)
}

/// 트레이딩 모드에 맞는 주문 생성기를 선택합니다.
///
/// 실거래에서는 거래소 네이티브(원격) 생성기를, 그 외에는 로컬
/// 생성기를 사용합니다. 전송 채널이 없는 시뮬레이션 전용 거래소는
/// 실거래 모드에서도 로컬 생성기로 동작합니다.
pub(crate) fn select_creator(
    mode: TradingMode,
    connection: Option<Arc<dyn Connection>>,
    wallet: Arc<RwLock<Wallet>>,
    current_candle: Arc<RwLock<Option<Candle>>>,
) -> OrderCreator {
    match (mode, connection) {
        (TradingMode::Live, Some(connection)) => {
            OrderCreator::Remote(RemoteOrderCreator::new(connection))
        }
        _ => OrderCreator::Local(LocalOrderCreator::new(wallet, current_candle)),
    }
}

/// 트레이딩 모드에 맞는 체결기를 선택합니다.
pub(crate) fn select_filler(mode: TradingMode, pipeline: &ReportPipeline) -> OrderFiller {
    match mode {
        TradingMode::Live => {
            OrderFiller::remote(pipeline.tracker.clone(), pipeline.events.clone())
        }
        TradingMode::Paper => OrderFiller::paper(pipeline.clone()),
        TradingMode::Backtest => OrderFiller::local(pipeline.clone()),
    }
}

/// 거래소 구성 루트.
pub struct ExchangeFactory {
    config: AppConfig,
}

impl ExchangeFactory {
    /// 주어진 설정으로 팩토리를 생성합니다.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 이름으로 거래소를 생성합니다.
    ///
    /// 레지스트리에 없는 이름은 [`ExchangeError::UnknownExchange`]로
    /// 실패합니다. 설정 오류이므로 재시도 대상이 아닙니다.
    pub fn create_exchange(&self, name: &str) -> ExchangeResult<Box<dyn Exchange>> {
        let definition =
            find_definition(name).ok_or_else(|| ExchangeError::UnknownExchange(name.to_string()))?;
        info!(
            exchange = definition.name,
            mode = %self.config.mode,
            "Creating exchange"
        );

        if definition.ws_url.is_empty() {
            Ok(Box::new(self.build_local(definition.name)))
        } else {
            let connection: Arc<dyn Connection> = Arc::new(WsConnection::new(definition.ws_url));
            Ok(Box::new(self.build_remote(definition.name, connection)))
        }
    }

    /// 시뮬레이션 거래소를 구체 타입으로 생성합니다 (백테스트 재생용).
    pub fn create_local_exchange(&self, name: &str) -> ExchangeResult<LocalExchange> {
        let definition =
            find_definition(name).ok_or_else(|| ExchangeError::UnknownExchange(name.to_string()))?;
        Ok(self.build_local(definition.name))
    }

    /// 주어진 전송 채널로 원격 거래소를 생성합니다.
    pub fn create_remote_exchange(
        &self,
        name: impl Into<String>,
        connection: Arc<dyn Connection>,
    ) -> RemoteExchange {
        self.build_remote(name, connection)
    }

    fn build_local(&self, name: impl Into<String>) -> LocalExchange {
        LocalExchange::new(self.build_core(name, None))
    }

    fn build_remote(&self, name: impl Into<String>, connection: Arc<dyn Connection>) -> RemoteExchange {
        let core = self.build_core(name, Some(connection.clone()));
        RemoteExchange::new(core, connection)
    }

    /// 거래소마다 새 지갑과 트래커를 구성합니다. 계정 상태는 거래소
    /// 인스턴스 간에 공유되지 않습니다.
    fn build_core(
        &self,
        name: impl Into<String>,
        connection: Option<Arc<dyn Connection>>,
    ) -> ExchangeCore {
        let wallet = Arc::new(RwLock::new(Wallet::new(self.config.wallet.clone())));
        let tracker = Arc::new(RwLock::new(OrderTracker::new()));
        let pipeline = ReportPipeline {
            tracker,
            wallet: wallet.clone(),
            events: EventBroadcaster::new(),
        };
        let current_candle = Arc::new(RwLock::new(None));

        let creator = select_creator(
            self.config.mode,
            connection,
            wallet,
            current_candle.clone(),
        );
        let filler = select_filler(self.config.mode, &pipeline);

        ExchangeCore::new(name, creator, filler, pipeline, current_candle)
    }
}

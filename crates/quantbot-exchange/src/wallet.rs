//! 자산별 잔고를 관리하는 지갑.
//!
//! 지갑은 하나의 거래소 인스턴스가 독점적으로 소유하며, 시뮬레이션
//! 경로에서만 변경됩니다. 실거래 모드에서는 원격 거래소가 잔고의
//! 출처이므로 지갑 산술은 적용되지 않습니다.

use quantbot_core::{Order, ReportType, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// 자산 심볼에서 사용 가능 잔고로의 매핑.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    assets: HashMap<String, Decimal>,
}

impl Wallet {
    /// 초기 잔고로 지갑을 생성합니다.
    pub fn new(initial: HashMap<String, Decimal>) -> Self {
        Self { assets: initial }
    }

    /// 자산의 사용 가능 잔고를 반환합니다 (없으면 0).
    pub fn balance(&self, asset: &str) -> Decimal {
        self.assets.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// 주문을 감당할 잔고가 있는지 확인합니다.
    ///
    /// 매수는 호가 자산 잔고가 `price * quantity` 이상이어야 하고,
    /// 매도는 기준 자산 잔고가 `quantity` 이상이어야 합니다.
    pub fn is_order_allowed(&self, order: &Order) -> bool {
        match order.side {
            Side::Buy => self.balance(&order.pair.quote) >= order.price * order.quantity,
            Side::Sell => self.balance(&order.pair.base) >= order.quantity,
        }
    }

    /// 주문 리포트에 따라 잔고를 조정합니다.
    ///
    /// - NEW: 주문 금액을 예약 (매수: 호가 자산 차감, 매도: 기준 자산 차감)
    /// - TRADE: 반대쪽 자산을 정산 (매수: 기준 자산 입금, 매도: 호가 자산 입금)
    /// - CANCELED: 예약 해제
    /// - REPLACED: 대체된 주문(`superseded`)의 예약을 해제하고 새 주문을 예약
    pub fn update_assets(&mut self, report: &Order, superseded: Option<&Order>) {
        match report.report_type {
            ReportType::New => self.reserve(report),
            ReportType::Trade => self.settle(report),
            ReportType::Canceled => self.release(report),
            ReportType::Replaced => {
                if let Some(old) = superseded {
                    self.release(old);
                }
                self.reserve(report);
            }
        }
        debug!(
            order_id = %report.id,
            report_type = ?report.report_type,
            "Wallet updated"
        );
    }

    fn entry(&mut self, asset: &str) -> &mut Decimal {
        self.assets.entry(asset.to_string()).or_insert(Decimal::ZERO)
    }

    fn reserve(&mut self, order: &Order) {
        match order.side {
            Side::Buy => *self.entry(&order.pair.quote) -= order.price * order.quantity,
            Side::Sell => *self.entry(&order.pair.base) -= order.quantity,
        }
    }

    fn release(&mut self, order: &Order) {
        match order.side {
            Side::Buy => *self.entry(&order.pair.quote) += order.price * order.quantity,
            Side::Sell => *self.entry(&order.pair.base) += order.quantity,
        }
    }

    fn settle(&mut self, order: &Order) {
        match order.side {
            Side::Buy => *self.entry(&order.pair.base) += order.quantity,
            Side::Sell => *self.entry(&order.pair.quote) += order.price * order.quantity,
        }
    }
}

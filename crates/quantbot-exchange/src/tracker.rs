//! 미체결 주문 집합을 관리하는 트래커.
//!
//! 계정이 미체결로 간주하는 주문의 단일 진실 공급원입니다. 유일한
//! 쓰기 경로는 [`OrderTracker::process`]이며, 리포트가 중복되거나
//! 순서가 뒤바뀌어 도착해도 에러 없이 수렴합니다.

use quantbot_core::{Order, ReportType};
use std::collections::HashSet;
use tracing::debug;

/// 계정의 미체결 주문 집합.
#[derive(Debug, Default)]
pub struct OrderTracker {
    open_orders: Vec<Order>,
    in_progress: HashSet<String>,
}

impl OrderTracker {
    /// 빈 트래커를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주문 리포트 하나를 적용합니다.
    ///
    /// 리포트 유형별 동작:
    /// - NEW: 같은 `id`가 없으면 삽입 (중복 삽입은 무시)
    /// - REPLACED: `original_id` 주문을 제거하고 새 주문을 삽입 (원자적)
    /// - CANCELED / TRADE: 해당 `id` 주문을 제거
    ///
    /// 없는 주문에 대한 제거는 조용한 no-op입니다. 리포트는 해당
    /// 주문의 진행 중 표시도 함께 해제합니다.
    pub fn process(&mut self, report: &Order) {
        self.in_progress.remove(&report.id);
        if let Some(original_id) = &report.original_id {
            self.in_progress.remove(original_id);
        }

        match report.report_type {
            ReportType::New => {
                if !self.contains(&report.id) {
                    self.open_orders.push(report.clone());
                }
            }
            ReportType::Replaced => {
                if let Some(original_id) = &report.original_id {
                    self.open_orders.retain(|o| &o.id != original_id);
                }
                if !self.contains(&report.id) {
                    self.open_orders.push(report.clone());
                }
            }
            ReportType::Canceled | ReportType::Trade => {
                self.open_orders.retain(|o| o.id != report.id);
            }
        }

        debug!(
            order_id = %report.id,
            report_type = ?report.report_type,
            open_orders = self.open_orders.len(),
            "Order report processed"
        );
    }

    /// 현재 미체결 주문의 복사본을 반환합니다.
    pub fn get_open_orders(&self) -> Vec<Order> {
        self.open_orders.clone()
    }

    /// 미체결 주문 집합을 통째로 교체합니다.
    ///
    /// 매칭 알고리즘이 생존 주문 집합을 되돌려 쓸 때와 상태 복원 시
    /// 사용됩니다.
    pub fn set_open_orders(&mut self, orders: Vec<Order>) {
        self.open_orders = orders;
    }

    /// `id`의 미체결 주문을 찾습니다.
    pub fn find_open_order(&self, id: &str) -> Option<&Order> {
        self.open_orders.iter().find(|o| o.id == id)
    }

    /// 주문을 진행 중으로 표시합니다.
    ///
    /// 확인 리포트가 도착할 때까지 같은 주문에 대한 두 번째
    /// 조정/취소를 호출자가 거부할 수 있게 합니다.
    pub fn set_order_in_progress(&mut self, id: String) {
        self.in_progress.insert(id);
    }

    /// 주문이 진행 중인지 확인합니다.
    pub fn is_order_in_progress(&self, id: &str) -> bool {
        self.in_progress.contains(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.open_orders.iter().any(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quantbot_core::{Pair, Side};
    use rust_decimal_macros::dec;

    fn new_order() -> Order {
        Order::limit(
            Pair::new("BTC", "USD"),
            dec!(100),
            dec!(1),
            Side::Buy,
            Utc::now(),
        )
    }

    #[test]
    fn test_new_report_inserts_once() {
        let mut tracker = OrderTracker::new();
        let order = new_order();

        tracker.process(&order);
        tracker.process(&order);

        assert_eq!(tracker.get_open_orders().len(), 1);
    }

    #[test]
    fn test_trade_and_cancel_are_idempotent() {
        let mut tracker = OrderTracker::new();
        let order = new_order();
        tracker.process(&order);

        let filled = order.as_filled(Utc::now());
        tracker.process(&filled);
        tracker.process(&filled);
        assert!(tracker.get_open_orders().is_empty());

        let other = new_order();
        tracker.process(&other);
        let canceled = other.as_canceled(Utc::now());
        tracker.process(&canceled);
        tracker.process(&canceled);
        assert!(tracker.get_open_orders().is_empty());
    }

    #[test]
    fn test_replaced_is_atomic() {
        let mut tracker = OrderTracker::new();
        let order = new_order();
        tracker.process(&order);

        let replacement = order.replace_with(dec!(150), dec!(2), Utc::now());
        tracker.process(&replacement);

        let open = tracker.get_open_orders();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, replacement.id);
        assert!(!open.iter().any(|o| o.id == order.id));
    }

    #[test]
    fn test_replaced_with_missing_original_still_inserts() {
        let mut tracker = OrderTracker::new();
        let order = new_order();
        let replacement = order.replace_with(dec!(150), dec!(2), Utc::now());

        tracker.process(&replacement);
        assert_eq!(tracker.get_open_orders().len(), 1);
    }

    #[test]
    fn test_missing_order_removal_is_noop() {
        let mut tracker = OrderTracker::new();
        let ghost = new_order().as_canceled(Utc::now());

        tracker.process(&ghost);
        assert!(tracker.get_open_orders().is_empty());
    }

    #[test]
    fn test_find_open_order_by_id() {
        let mut tracker = OrderTracker::new();
        let order = new_order();
        tracker.process(&order);

        let found = tracker.find_open_order(&order.id);
        assert_eq!(found.map(|o| o.id.as_str()), Some(order.id.as_str()));

        tracker.process(&order.as_filled(Utc::now()));
        assert!(tracker.find_open_order(&order.id).is_none());
    }

    #[test]
    fn test_in_progress_cleared_by_report() {
        let mut tracker = OrderTracker::new();
        let order = new_order();

        tracker.set_order_in_progress(order.id.clone());
        assert!(tracker.is_order_in_progress(&order.id));

        tracker.process(&order);
        assert!(!tracker.is_order_in_progress(&order.id));
    }

    #[test]
    fn test_in_progress_cleared_for_replaced_original() {
        let mut tracker = OrderTracker::new();
        let order = new_order();
        tracker.process(&order);

        tracker.set_order_in_progress(order.id.clone());
        let replacement = order.replace_with(dec!(120), dec!(1), Utc::now());
        tracker.process(&replacement);

        assert!(!tracker.is_order_in_progress(&order.id));
    }
}

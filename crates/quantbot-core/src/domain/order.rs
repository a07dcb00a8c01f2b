//! 주문 및 주문 리포트 타입.
//!
//! 이 모듈은 트레이딩 시스템의 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형
//! - `OrderStatus` - 주문 상태
//! - `ReportType` - 주문 리포트 유형
//! - `TimeInForce` - 주문 유효 기간
//! - `Order` - 주문 엔티티 겸 주문 리포트
//!
//! 주문 상태 변경은 항상 주문 전체를 담은 리포트로 표현됩니다.
//! 개별 필드를 제자리에서 수정하는 일은 없습니다.

use crate::types::{Pair, Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// 지정가 주문 - 지정 가격 이상/이하에서 체결
    Limit,
}

/// 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 미체결 상태로 등록됨
    New,
    /// 전량 체결됨
    Filled,
    /// 취소됨
    Canceled,
}

impl OrderStatus {
    /// 주문이 최종 상태인지 확인합니다.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
    }
}

/// 주문 상태 변경을 설명하는 리포트 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// 새 주문 등록됨
    New,
    /// 기존 주문이 새 주문으로 대체됨
    Replaced,
    /// 주문 취소됨
    Canceled,
    /// 주문 체결됨
    Trade,
}

/// 주문 유효 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// 취소될 때까지 유효 (Good Till Cancelled)
    GTC,
    /// 즉시 체결 또는 취소 (Immediate Or Cancel)
    IOC,
    /// 전량 체결 또는 취소 (Fill Or Kill)
    FOK,
}

/// 주문 엔티티.
///
/// 동일한 구조체가 주문 리포트 역할도 합니다. `report_type`이
/// 이 리포트가 설명하는 상태 변경을 나타냅니다. `id`는 할당 후
/// 불변이며, 주문 대체는 항상 새 `id`를 가진 새 주문을 만들고
/// `original_id`로 대체 대상 주문을 가리킵니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 주문 ID (계정 내에서 유일)
    pub id: String,
    /// 대체된 원본 주문의 ID (REPLACED 리포트에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    /// 거래 페어
    pub pair: Pair,
    /// 주문 방향
    pub side: Side,
    /// 지정가
    pub price: Price,
    /// 주문 수량
    pub quantity: Quantity,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 유효 기간
    pub time_in_force: TimeInForce,
    /// 현재 상태
    pub status: OrderStatus,
    /// 리포트 유형
    pub report_type: ReportType,
    /// 생성 타임스탬프
    pub created_at: DateTime<Utc>,
    /// 마지막 업데이트 타임스탬프
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// 새 지정가 주문을 생성합니다 (상태 NEW, 리포트 NEW).
    pub fn limit(
        pair: Pair,
        price: Price,
        quantity: Quantity,
        side: Side,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_id: None,
            pair,
            side,
            price,
            quantity,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::GTC,
            status: OrderStatus::New,
            report_type: ReportType::New,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// 이 주문의 체결 리포트를 생성합니다.
    ///
    /// 백테스트 결정성을 위해 `updated_at`은 벽시계가 아닌
    /// 체결을 일으킨 캔들의 타임스탬프를 사용합니다.
    pub fn as_filled(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: OrderStatus::Filled,
            report_type: ReportType::Trade,
            updated_at: timestamp,
            ..self.clone()
        }
    }

    /// 이 주문의 취소 리포트를 생성합니다.
    pub fn as_canceled(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: OrderStatus::Canceled,
            report_type: ReportType::Canceled,
            updated_at: timestamp,
            ..self.clone()
        }
    }

    /// 이 주문을 대체하는 새 주문 리포트를 생성합니다.
    ///
    /// 대체 주문은 새 `id`를 받고 `original_id`가 이 주문을
    /// 가리킵니다. 대체 시점 이전의 캔들로는 체결될 수 없도록
    /// `created_at`도 대체 시점으로 설정됩니다.
    pub fn replace_with(
        &self,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_id: Some(self.id.clone()),
            price,
            quantity,
            status: OrderStatus::New,
            report_type: ReportType::Replaced,
            created_at: timestamp,
            updated_at: timestamp,
            ..self.clone()
        }
    }

    /// 주문이 여전히 미체결 상태인지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::New
    }
}

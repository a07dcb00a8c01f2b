//! # Quantbot Core
//!
//! 트레이딩 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 실거래/모의투자/백테스트 전반에서 공유되는 기본 타입을 제공합니다:
//! - 주문 및 주문 리포트 타입
//! - 캔들(OHLCV) 데이터 구조체
//! - 거래 페어 및 캔들 간격 정의
//! - 트레이딩 모드 및 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use logging::*;
pub use types::*;

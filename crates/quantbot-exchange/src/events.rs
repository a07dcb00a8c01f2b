//! 거래소 이벤트 및 이벤트 브로드캐스터.
//!
//! 각 거래소 인스턴스는 자신의 브로드캐스터를 소유합니다. 전역
//! 이벤트 버스는 없으며, 구독자는 `subscribe()`로 받은 채널을 통해
//! 이벤트를 수신합니다.

use quantbot_core::{Candle, Order};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// 전략 계층으로 전달되는 거래소 이벤트.
#[derive(Debug, Clone)]
pub enum ExchangeEvent {
    /// 거래소가 주문을 받을 준비가 됨
    Ready,
    /// 주문 리포트 (NEW/REPLACED/CANCELED/TRADE)
    Report(Order),
    /// 타임스탬프 오름차순으로 정렬된 캔들 업데이트
    UpdateCandles(Vec<Candle>),
}

/// 단순 mpsc 기반 이벤트 브로드캐스터.
///
/// 복제본은 같은 구독자 목록을 공유하므로 거래소 내부 구성 요소들이
/// 하나의 브로드캐스터를 함께 사용할 수 있습니다.
#[derive(Debug)]
pub struct EventBroadcaster<T: Clone + Send> {
    senders: Arc<RwLock<Vec<mpsc::Sender<T>>>>,
}

impl<T: Clone + Send> Clone for EventBroadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            senders: Arc::clone(&self.senders),
        }
    }
}

impl<T: Clone + Send> EventBroadcaster<T> {
    /// 새 브로드캐스터를 생성합니다.
    pub fn new() -> Self {
        Self {
            senders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 구독을 등록하고 수신기를 반환합니다.
    pub async fn subscribe(&self, buffer_size: usize) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(buffer_size);
        self.senders.write().await.push(tx);
        rx
    }

    /// 모든 살아있는 구독자에게 이벤트를 전달합니다.
    ///
    /// 닫힌 구독자는 전달 과정에서 목록에서 제거됩니다. 버퍼가 가득
    /// 찬 구독자에게는 자리가 날 때까지 기다립니다. 느린 구독자는
    /// 발행자를 밀어내기(backpressure)로 늦출 뿐 이벤트를 잃지
    /// 않습니다.
    pub async fn broadcast(&self, event: T) {
        let mut senders = self.senders.write().await;
        senders.retain(|tx| !tx.is_closed());
        for tx in senders.iter() {
            // 전송 오류 무시 (구독자가 삭제되었을 수 있음)
            let _ = tx.send(event.clone()).await;
        }
    }

    /// 현재 구독자 수를 반환합니다.
    pub async fn subscriber_count(&self) -> usize {
        self.senders.read().await.len()
    }
}

impl<T: Clone + Send> Default for EventBroadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let broadcaster: EventBroadcaster<u32> = EventBroadcaster::new();
        let mut rx1 = broadcaster.subscribe(8).await;
        let mut rx2 = broadcaster.subscribe(8).await;

        broadcaster.broadcast(7).await;

        assert_eq!(rx1.recv().await, Some(7));
        assert_eq!(rx2.recv().await, Some(7));
    }

    #[tokio::test]
    async fn test_full_buffer_applies_backpressure_instead_of_dropping() {
        let broadcaster: EventBroadcaster<u32> = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe(1).await;

        let producer = broadcaster.clone();
        let handle = tokio::spawn(async move {
            for i in 0..10 {
                producer.broadcast(i).await;
            }
        });

        // 버퍼 1짜리 느린 구독자도 이벤트를 하나도 잃지 않아야 함
        for i in 0..10 {
            assert_eq!(rx.recv().await, Some(i));
        }
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let broadcaster: EventBroadcaster<u32> = EventBroadcaster::new();
        let rx = broadcaster.subscribe(8).await;
        drop(rx);

        broadcaster.broadcast(1).await;
        assert_eq!(broadcaster.subscriber_count().await, 0);
    }
}

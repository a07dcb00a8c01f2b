//! 시뮬레이션용 로컬 전송.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::{Command, Connection, ConnectionEvent};
use crate::error::{ExchangeError, ExchangeResult};

/// 네트워크 없이 동작하는 전송 구현.
///
/// 연결 즉시 `Opened`를 전달하고, 전송된 명령을 기록만 합니다.
/// 시뮬레이션 백엔드와 테스트에서 사용됩니다.
#[derive(Debug, Default)]
pub struct LocalConnection {
    sent: Arc<RwLock<Vec<Command>>>,
    event_tx: Arc<RwLock<Option<mpsc::Sender<ConnectionEvent>>>>,
}

impl LocalConnection {
    /// 새 로컬 전송을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 전송된 명령의 복사본을 반환합니다.
    pub async fn sent_commands(&self) -> Vec<Command> {
        self.sent.read().await.clone()
    }

    /// 수신 메시지를 주입합니다 (테스트용).
    pub async fn push_message(&self, text: impl Into<String>) -> ExchangeResult<()> {
        let guard = self.event_tx.read().await;
        let tx = guard
            .as_ref()
            .ok_or_else(|| ExchangeError::NetworkError("not connected".to_string()))?;
        tx.send(ConnectionEvent::Message(text.into()))
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))
    }
}

#[async_trait]
impl Connection for LocalConnection {
    async fn connect(&self) -> ExchangeResult<mpsc::Receiver<ConnectionEvent>> {
        let (tx, rx) = mpsc::channel(64);
        tx.send(ConnectionEvent::Opened)
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;
        *self.event_tx.write().await = Some(tx);
        Ok(rx)
    }

    async fn send(&self, command: &Command) -> ExchangeResult<()> {
        self.sent.write().await.push(command.clone());
        Ok(())
    }
}

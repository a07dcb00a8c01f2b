//! tokio-tungstenite 기반 WebSocket 전송.

use async_trait::async_trait;
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::{Command, Connection, ConnectionEvent};
use crate::error::{ExchangeError, ExchangeResult};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// 원격 거래소와의 WebSocket 연결.
///
/// 읽기 절반은 백그라운드 태스크가 소유하며 수신된 텍스트 프레임을
/// 이벤트 채널로 전달합니다. 재연결 정책은 제공하지 않습니다.
pub struct WsConnection {
    url: String,
    writer: RwLock<Option<WsSink>>,
}

impl WsConnection {
    /// 주어진 URL로 연결하는 전송을 생성합니다.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            writer: RwLock::new(None),
        }
    }

    /// 연결 URL을 반환합니다.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn connect(&self) -> ExchangeResult<mpsc::Receiver<ConnectionEvent>> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ExchangeError::WebSocket(e.to_string()))?;
        debug!(url = %self.url, "WebSocket connected");

        let (sink, mut reader) = stream.split();
        *self.writer.write().await = Some(sink);

        let (tx, rx) = mpsc::channel(256);
        tx.send(ConnectionEvent::Opened)
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(message) = reader.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if tx.send(ConnectionEvent::Message(text)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("WebSocket closed by peer");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "WebSocket read error");
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, command: &Command) -> ExchangeResult<()> {
        let text = serde_json::to_string(command)?;
        let mut guard = self.writer.write().await;
        let sink = guard
            .as_mut()
            .ok_or_else(|| ExchangeError::NetworkError("not connected".to_string()))?;

        sink.send(Message::Text(text))
            .await
            .map_err(|e| ExchangeError::WebSocket(e.to_string()))
    }
}

//! # Edge TTS client
//!
//! Клиент websocket-сервиса Microsoft Edge "Read aloud". Каждый фрагмент текста
//! синтезируется через отдельное соединение; MP3-данные фрагментов склеиваются.

pub mod protocol;
pub mod voices;

use std::time::Duration;

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use super::TtsService;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::models::SynthesisRequest;

type EdgeSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Клиент Edge TTS
pub struct EdgeTtsClient {
    endpoint: String,
    output_format: String,
    connect_timeout: Duration,
    receive_timeout: Duration,
}

impl EdgeTtsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            output_format: config.output_format.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            receive_timeout: Duration::from_secs(config.receive_timeout_secs),
        }
    }

    async fn connect(&self) -> AppResult<EdgeSocket> {
        let connection_id = Uuid::new_v4().simple().to_string();
        let url = protocol::connection_url(&self.endpoint, &connection_id, Utc::now());

        let mut request = url.into_client_request()?;
        let user_agent = HeaderValue::from_str(&protocol::user_agent())
            .map_err(|e| AppError::ConnectionError(format!("Invalid User-Agent header: {}", e)))?;

        let headers = request.headers_mut();
        headers.insert("pragma", HeaderValue::from_static("no-cache"));
        headers.insert("cache-control", HeaderValue::from_static("no-cache"));
        headers.insert("origin", HeaderValue::from_static(protocol::ORIGIN));
        headers.insert("user-agent", user_agent);
        headers.insert("accept-encoding", HeaderValue::from_static("gzip, deflate, br"));
        headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));

        debug!("Connecting to {} (connection {})", self.endpoint, connection_id);
        let (socket, _) = timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| AppError::Timeout("connecting to the speech service".to_string()))??;

        Ok(socket)
    }

    /// Синтезирует один SSML-документ и возвращает MP3-данные
    async fn synthesize_ssml(&self, ssml: &str) -> AppResult<Vec<u8>> {
        let mut socket = self.connect().await?;

        let now = Utc::now();
        let request_id = Uuid::new_v4().simple().to_string();
        socket
            .send(Message::Text(protocol::speech_config_message(&self.output_format, now)))
            .await?;
        socket
            .send(Message::Text(protocol::ssml_message(&request_id, ssml, now)))
            .await?;

        let audio = self.receive_audio(&mut socket).await;

        if let Err(e) = socket.close(None).await {
            debug!("Closing speech socket failed: {}", e);
        }

        let audio = audio?;
        if audio.is_empty() {
            return Err(AppError::NoAudio);
        }
        Ok(audio)
    }

    async fn receive_audio(&self, socket: &mut EdgeSocket) -> AppResult<Vec<u8>> {
        let mut audio = Vec::new();

        loop {
            let next = timeout(self.receive_timeout, socket.next())
                .await
                .map_err(|_| AppError::Timeout("waiting for synthesized audio".to_string()))?;

            let Some(message) = next else {
                debug!("Speech service closed the stream");
                break;
            };

            match message? {
                Message::Text(text) => {
                    let frame = protocol::parse_text_frame(&text);
                    match frame.path() {
                        Some("turn.end") => break,
                        Some("turn.start") | Some("response") | Some("audio.metadata") => {}
                        other => debug!("Ignoring text frame with path {:?}", other),
                    }
                }
                Message::Binary(data) => {
                    let frame = protocol::parse_binary_frame(&data)?;
                    if frame.path() != Some("audio") {
                        return Err(AppError::ProtocolError(format!(
                            "unexpected binary frame path {:?}",
                            frame.path()
                        )));
                    }
                    audio.extend_from_slice(frame.body);
                }
                Message::Close(frame) => {
                    debug!("Speech service sent close: {:?}", frame);
                    break;
                }
                _ => {}
            }
        }

        Ok(audio)
    }
}

#[async_trait::async_trait]
impl TtsService for EdgeTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<Vec<u8>> {
        let prepared = protocol::prepare_text(&request.text);
        let chunks = protocol::split_text(&prepared, protocol::MAX_CHUNK_BYTES);
        if chunks.is_empty() {
            return Err(AppError::EmptyText);
        }

        info!(
            "Synthesizing {} chunk(s) with {} (rate {}, style {})",
            chunks.len(),
            request.voice_id,
            request.rate,
            request.style.map(|s| s.as_str()).unwrap_or("none")
        );

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let ssml = protocol::build_ssml(&request.voice_id, request.rate, request.style, chunk);
            let part = self.synthesize_ssml(&ssml).await.inspect_err(|e| {
                warn!("Chunk {}/{} failed: {}", index + 1, chunks.len(), e);
            })?;
            debug!("Chunk {}/{}: {} bytes", index + 1, chunks.len(), part.len());
            audio.extend(part);
        }

        info!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SpeechRate, SpeechStyle};
    use crate::services::tts::synthesize_with_fallback;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    const FAKE_MP3: &[u8] = b"ID3\x04fake-mp3-bytes";

    #[derive(Clone, Copy)]
    enum Behaviour {
        /// Отвечает аудио на любой запрос
        Speak,
        /// Закрывает соединение, если в SSML есть стиль
        RejectStyles,
        /// Никогда не отправляет аудио
        Silent,
        /// Принимает запрос и молчит
        Hang,
        /// Отправляет бинарный кадр не с аудио
        WrongBinaryPath,
    }

    /// Поднимает локальный websocket-сервер; возвращает endpoint и счётчик SSML-запросов
    async fn spawn_server(behaviour: Behaviour) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();

                    let config = ws.next().await.unwrap().unwrap().into_text().unwrap();
                    assert!(config.contains("Path:speech.config"));

                    let ssml = ws.next().await.unwrap().unwrap().into_text().unwrap();
                    assert!(ssml.contains("Path:ssml"));
                    counter.fetch_add(1, Ordering::SeqCst);

                    let styled = ssml.contains("express-as");
                    match behaviour {
                        Behaviour::RejectStyles if styled => {
                            let _ = ws.close(None).await;
                            return;
                        }
                        Behaviour::Silent => {
                            let _ = ws
                                .send(Message::Text("Path:turn.end\r\n\r\n{}".to_string()))
                                .await;
                        }
                        Behaviour::Hang => {}
                        Behaviour::WrongBinaryPath => {
                            let frame = protocol::encode_binary_frame(
                                "X-RequestId:1\r\nPath:metadata\r\n",
                                b"{}",
                            );
                            let _ = ws.send(Message::Binary(frame)).await;
                        }
                        _ => {
                            let _ = ws
                                .send(Message::Text("Path:turn.start\r\n\r\n{}".to_string()))
                                .await;
                            let frame = protocol::encode_binary_frame(
                                "X-RequestId:1\r\nContent-Type:audio/mpeg\r\nPath:audio\r\n",
                                FAKE_MP3,
                            );
                            let _ = ws.send(Message::Binary(frame)).await;
                            let _ = ws
                                .send(Message::Text("Path:turn.end\r\n\r\n{}".to_string()))
                                .await;
                        }
                    }

                    while let Some(Ok(_)) = ws.next().await {}
                });
            }
        });

        (format!("ws://{}/edge/v1", addr), requests)
    }

    fn client_for(endpoint: String) -> EdgeTtsClient {
        client_with_timeouts(endpoint, 5, 5)
    }

    fn client_with_timeouts(endpoint: String, connect_secs: u64, receive_secs: u64) -> EdgeTtsClient {
        let config = AppConfig {
            endpoint,
            connect_timeout_secs: connect_secs,
            receive_timeout_secs: receive_secs,
            ..AppConfig::default()
        };
        EdgeTtsClient::new(&config)
    }

    fn request(text: &str, style: Option<SpeechStyle>) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice_id: "en-US-AriaNeural".to_string(),
            rate: SpeechRate::new(10),
            style,
        }
    }

    #[tokio::test]
    async fn test_synthesize_collects_audio() {
        let (endpoint, requests) = spawn_server(Behaviour::Speak).await;
        let client = client_for(endpoint);

        let audio = client.synthesize(&request("Hello there", None)).await.unwrap();

        assert_eq!(audio, FAKE_MP3);
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_long_text_uses_one_connection_per_chunk() {
        let (endpoint, requests) = spawn_server(Behaviour::Speak).await;
        let client = client_for(endpoint);

        let text = "word ".repeat(2000);
        let audio = client.synthesize(&request(&text, None)).await.unwrap();

        let chunks = requests.load(Ordering::SeqCst);
        assert!(chunks >= 3);
        assert_eq!(audio.len(), FAKE_MP3.len() * chunks);
    }

    #[tokio::test]
    async fn test_style_rejection_falls_back_once() {
        let (endpoint, requests) = spawn_server(Behaviour::RejectStyles).await;
        let client = client_for(endpoint);

        let (audio, applied) =
            synthesize_with_fallback(&client, &request("So happy", Some(SpeechStyle::Cheerful)))
                .await
                .unwrap();

        assert_eq!(audio, FAKE_MP3);
        assert_eq!(applied, None);
        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_silent_service_is_no_audio() {
        let (endpoint, requests) = spawn_server(Behaviour::Silent).await;
        let client = client_for(endpoint);

        let result = synthesize_with_fallback(&client, &request("Anyone?", None)).await;

        assert!(matches!(result, Err(AppError::NoAudio)));
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("ws://{}/edge/v1", addr));
        let result = client.synthesize(&request("Hello", None)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_silent_server_hits_receive_timeout() {
        let (endpoint, requests) = spawn_server(Behaviour::Hang).await;
        let client = client_with_timeouts(endpoint, 5, 1);

        let started = std::time::Instant::now();
        let result = client.synthesize(&request("Hello", None)).await;

        assert!(matches!(result, Err(AppError::Timeout(_))), "{:?}", result);
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stalled_handshake_hits_connect_timeout() {
        // TCP принимается, но HTTP-ответа на upgrade нет
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client = client_with_timeouts(format!("ws://{}/edge/v1", addr), 1, 5);
        let result = client.synthesize(&request("Hello", None)).await;

        match result {
            Err(AppError::Timeout(what)) => assert!(what.contains("connecting")),
            other => panic!("expected connect timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_audio_binary_frame_is_protocol_error() {
        let (endpoint, _) = spawn_server(Behaviour::WrongBinaryPath).await;
        let client = client_for(endpoint);

        let result = client.synthesize(&request("Hello", None)).await;

        assert!(matches!(result, Err(AppError::ProtocolError(_))), "{:?}", result);
    }
}

//! # Edge Read Aloud protocol
//!
//! Построение сообщений для websocket-сервиса Microsoft Edge TTS и разбор его
//! ответов. Здесь нет сетевого кода: только строки, байты и токены, поэтому всё
//! покрыто обычными юнит-тестами.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::errors::{AppError, AppResult};
use crate::models::{SpeechRate, SpeechStyle};

pub const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";
pub const CHROMIUM_FULL_VERSION: &str = "130.0.2849.68";
pub const CHROMIUM_MAJOR_VERSION: &str = "130";
pub const SEC_MS_GEC_VERSION: &str = "1-130.0.2849.68";
pub const ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

/// Максимальный размер одного SSML-фрагмента в байтах
pub const MAX_CHUNK_BYTES: usize = 4096;

// Секунды между 1601-01-01 и 1970-01-01
const WIN_EPOCH_OFFSET_SECS: u64 = 11_644_473_600;
// Токен меняется раз в пять минут
const GEC_BUCKET_SECS: u64 = 300;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("valid control-char regex"));

pub fn user_agent() -> String {
    format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.0.0",
        major = CHROMIUM_MAJOR_VERSION
    )
}

/// Токен `Sec-MS-GEC`: SHA-256 от тиков Windows (с шагом 5 минут) и клиентского токена
pub fn sec_ms_gec(now: DateTime<Utc>) -> String {
    let secs = now.timestamp().max(0) as u64 + WIN_EPOCH_OFFSET_SECS;
    let bucket = secs - secs % GEC_BUCKET_SECS;
    let ticks = bucket * 10_000_000;

    let digest = Sha256::digest(format!("{}{}", ticks, TRUSTED_CLIENT_TOKEN).as_bytes());
    hex::encode_upper(digest)
}

/// Полный URL для подключения к websocket
pub fn connection_url(endpoint: &str, connection_id: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}?TrustedClientToken={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}&ConnectionId={}",
        endpoint,
        TRUSTED_CLIENT_TOKEN,
        sec_ms_gec(now),
        SEC_MS_GEC_VERSION,
        connection_id
    )
}

/// URL списка голосов провайдера
pub fn voices_url(endpoint: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}?trustedclienttoken={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}",
        endpoint,
        TRUSTED_CLIENT_TOKEN,
        sec_ms_gec(now),
        SEC_MS_GEC_VERSION
    )
}

/// Метка времени в формате JavaScript `Date.toString()`
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

pub fn speech_config_message(output_format: &str, now: DateTime<Utc>) -> String {
    format!(
        "X-Timestamp:{}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":{{\
         \"sentenceBoundaryEnabled\":\"false\",\"wordBoundaryEnabled\":\"false\"}},\
         \"outputFormat\":\"{}\"}}}}}}}}\r\n",
        timestamp(now),
        output_format
    )
}

pub fn ssml_message(request_id: &str, ssml: &str, now: DateTime<Utc>) -> String {
    format!(
        "X-RequestId:{}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{}Z\r\n\
         Path:ssml\r\n\r\n\
         {}",
        request_id,
        timestamp(now),
        ssml
    )
}

/// Заменяет управляющие символы пробелом и экранирует `& < >`
pub fn prepare_text(text: &str) -> String {
    let cleaned = CONTROL_CHARS.replace_all(text, " ");
    cleaned
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Делит подготовленный текст на фрагменты не длиннее `max_bytes`.
///
/// Граница ищется по последнему переводу строки, затем по пробелу, иначе по
/// границе символа UTF-8. XML-сущность (`&amp;` и т.п.) никогда не разрывается.
pub fn split_text(text: &str, max_bytes: usize) -> Vec<String> {
    let max_bytes = max_bytes.max(4);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while rest.len() > max_bytes {
        let window = &rest.as_bytes()[..max_bytes];

        let mut split_at = window
            .iter()
            .rposition(|&b| b == b'\n')
            .or_else(|| window.iter().rposition(|&b| b == b' '))
            .unwrap_or_else(|| char_boundary_at_or_before(rest, max_bytes));

        // Не режем посреди незакрытой сущности
        if let Some(amp) = rest[..split_at].rfind('&') {
            if !rest[amp..split_at].contains(';') {
                split_at = amp;
            }
        }

        if split_at == 0 {
            split_at = char_boundary_at_or_before(rest, max_bytes);
        }

        let chunk = rest[..split_at].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[split_at..].trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

fn char_boundary_at_or_before(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    if i == 0 {
        // первый символ длиннее лимита: берём его целиком
        text.chars().next().map(char::len_utf8).unwrap_or(0)
    } else {
        i
    }
}

/// `en-US-GuyNeural` → `Microsoft Server Speech Text to Speech Voice (en-US, GuyNeural)`
pub fn voice_long_name(voice_id: &str) -> String {
    match voice_id.rsplit_once('-') {
        Some((locale, name)) if locale.contains('-') => format!(
            "Microsoft Server Speech Text to Speech Voice ({}, {})",
            locale, name
        ),
        _ => voice_id.to_string(),
    }
}

fn voice_locale(voice_id: &str) -> &str {
    let mut parts = voice_id.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(lang), Some(region)) => &voice_id[..lang.len() + 1 + region.len()],
        _ => "en-US",
    }
}

/// SSML для одного фрагмента уже подготовленного текста
pub fn build_ssml(
    voice_id: &str,
    rate: SpeechRate,
    style: Option<SpeechStyle>,
    escaped_text: &str,
) -> String {
    let prosody = format!(
        "<prosody pitch='+0Hz' rate='{}' volume='+0%'>{}</prosody>",
        rate, escaped_text
    );
    let body = match style {
        Some(style) => format!(
            "<mstts:express-as style='{}'>{}</mstts:express-as>",
            style, prosody
        ),
        None => prosody,
    };

    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' \
         xmlns:mstts='https://www.w3.org/2001/mstts' xml:lang='{}'>\
         <voice name='{}'>{}</voice></speak>",
        voice_locale(voice_id),
        voice_long_name(voice_id),
        body
    )
}

/// Разобранное сообщение сервиса
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub headers: HashMap<String, String>,
    pub body: &'a [u8],
}

impl Frame<'_> {
    pub fn path(&self) -> Option<&str> {
        self.headers.get("Path").map(String::as_str)
    }
}

fn parse_headers(raw: &str) -> HashMap<String, String> {
    raw.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Текстовый кадр: `заголовки\r\n\r\nтело`
pub fn parse_text_frame(text: &str) -> Frame<'_> {
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text, ""));
    Frame {
        headers: parse_headers(head),
        body: body.as_bytes(),
    }
}

/// Бинарный кадр: 2 байта длины заголовков (big-endian), заголовки, полезная нагрузка
pub fn parse_binary_frame(data: &[u8]) -> AppResult<Frame<'_>> {
    if data.len() < 2 {
        return Err(AppError::ProtocolError(
            "binary frame is missing the header length".to_string(),
        ));
    }
    let header_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    let body_start = 2 + header_len;
    if body_start > data.len() {
        return Err(AppError::ProtocolError(format!(
            "binary header length {} exceeds frame size {}",
            header_len,
            data.len()
        )));
    }

    let head = std::str::from_utf8(&data[2..body_start])
        .map_err(|e| AppError::ProtocolError(format!("binary headers are not UTF-8: {}", e)))?;

    Ok(Frame {
        headers: parse_headers(head),
        body: &data[body_start..],
    })
}

/// Собирает бинарный кадр для тестового сервера
#[cfg(test)]
pub(crate) fn encode_binary_frame(headers: &str, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(2 + headers.len() + body.len());
    let header_len = u16::try_from(headers.len()).expect("binary headers fit in u16");
    frame.extend_from_slice(&header_len.to_be_bytes());
    frame.extend_from_slice(headers.as_bytes());
    frame.extend_from_slice(body);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 5, 9, 3, 27).unwrap()
    }

    #[test]
    fn test_sec_ms_gec_is_stable_within_bucket() {
        let a = Utc.with_ymd_and_hms(2024, 11, 5, 9, 0, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 11, 5, 9, 4, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 11, 5, 9, 5, 0).unwrap();

        assert_eq!(sec_ms_gec(a), sec_ms_gec(b));
        assert_ne!(sec_ms_gec(b), sec_ms_gec(c));
    }

    #[test]
    fn test_sec_ms_gec_format() {
        let token = sec_ms_gec(fixed_now());
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_connection_url() {
        let url = connection_url("wss://example/v1", "abc", fixed_now());
        assert!(url.starts_with("wss://example/v1?TrustedClientToken=6A5AA1D4"));
        assert!(url.contains("&Sec-MS-GEC-Version=1-130.0.2849.68"));
        assert!(url.ends_with("&ConnectionId=abc"));
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(
            timestamp(fixed_now()),
            "Tue Nov 05 2024 09:03:27 GMT+0000 (Coordinated Universal Time)"
        );
    }

    #[test]
    fn test_speech_config_message_is_valid_json_body() {
        let msg = speech_config_message("audio-24khz-48kbitrate-mono-mp3", fixed_now());
        let frame = parse_text_frame(&msg);
        assert_eq!(frame.path(), Some("speech.config"));

        let body: serde_json::Value =
            serde_json::from_slice(frame.body).expect("config body is JSON");
        assert_eq!(
            body["context"]["synthesis"]["audio"]["outputFormat"],
            "audio-24khz-48kbitrate-mono-mp3"
        );
    }

    #[test]
    fn test_prepare_text_escapes_and_cleans() {
        assert_eq!(prepare_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(prepare_text("bell\x07here\nnext"), "bell here\nnext");
    }

    #[test]
    fn test_split_short_text_is_single_chunk() {
        assert_eq!(split_text("  hello world  ", 4096), vec!["hello world"]);
        assert!(split_text("   ", 4096).is_empty());
    }

    #[test]
    fn test_split_prefers_newline_then_space() {
        let chunks = split_text("one two\nthree four", 12);
        assert_eq!(chunks, vec!["one two", "three four"]);

        let chunks = split_text("alpha beta gamma", 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_split_respects_byte_limit_and_utf8() {
        let text = "приветмир".repeat(50);
        let chunks = split_text(&text, 31);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 31);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_never_breaks_entity() {
        let text = prepare_text("aaaaaaa&bbbbbbbbbb");
        // "aaaaaaa&amp;bbbbbbbbbb": на 10 байтах граница попадает внутрь "&amp;"
        let chunks = split_text(&text, 10);
        assert_eq!(chunks[0], "aaaaaaa");
        assert!(chunks[1].starts_with("&amp;"));
        for chunk in &chunks {
            assert!(chunk.len() <= 10);
        }
    }

    #[test]
    fn test_voice_long_name() {
        assert_eq!(
            voice_long_name("en-US-GuyNeural"),
            "Microsoft Server Speech Text to Speech Voice (en-US, GuyNeural)"
        );
        assert_eq!(voice_long_name("weird"), "weird");
    }

    #[test]
    fn test_ssml_with_and_without_style() {
        let plain = build_ssml("fr-FR-HenriNeural", SpeechRate::new(-20), None, "Bonjour");
        assert!(plain.contains("xml:lang='fr-FR'"));
        assert!(plain.contains("rate='-20%'"));
        assert!(!plain.contains("express-as"));

        let styled = build_ssml(
            "en-US-AriaNeural",
            SpeechRate::new(5),
            Some(SpeechStyle::Cheerful),
            "Hi",
        );
        assert!(styled.contains("<mstts:express-as style='cheerful'><prosody"));
        assert!(styled.contains("rate='+5%'"));
        assert!(styled.ends_with("</mstts:express-as></voice></speak>"));
    }

    #[test]
    fn test_parse_binary_frame() {
        let data = encode_binary_frame("X-RequestId:1\r\nPath:audio\r\n", &[1, 2, 3]);
        let frame = parse_binary_frame(&data).unwrap();
        assert_eq!(frame.path(), Some("audio"));
        assert_eq!(frame.body, &[1, 2, 3]);
    }

    #[test]
    fn test_parse_binary_frame_rejects_truncated() {
        assert!(parse_binary_frame(&[0]).is_err());
        assert!(parse_binary_frame(&[0, 50, b'P']).is_err());
    }

    #[test]
    #[should_panic(expected = "fit in u16")]
    fn test_encode_refuses_oversized_headers() {
        let headers = "X".repeat(u16::MAX as usize + 1);
        encode_binary_frame(&headers, b"");
    }

    #[test]
    fn test_parse_text_frame() {
        let frame = parse_text_frame("X-RequestId:42\r\nPath:turn.end\r\n\r\n{}");
        assert_eq!(frame.path(), Some("turn.end"));
        assert_eq!(frame.headers.get("X-RequestId").map(String::as_str), Some("42"));
        assert_eq!(frame.body, b"{}");
    }
}

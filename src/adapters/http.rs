use crate::config::toml_config::UpstreamConfig;
use crate::domain::model::{InfoKind, LookupRequest};
use crate::domain::ports::CaseLookupClient;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::OnceCell;

const SESSION_PATH: &str = "/pgj/index.on";

/// 法院拍賣網站 API 客戶端
pub struct CourtApiClient {
    client: Client,
    base_url: String,
    session_warmup: bool,
    session: OnceCell<()>,
}

impl CourtApiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9"));

        if let Some(extra) = &config.headers {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    LookupError::InvalidConfigValue {
                        field: "upstream.headers".to_string(),
                        value: key.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let value = HeaderValue::from_str(value).map_err(|e| {
                    LookupError::InvalidConfigValue {
                        field: format!("upstream.headers.{}", key),
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
                headers.insert(name, value);
            }
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LookupError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_warmup: config.session_warmup,
            session: OnceCell::new(),
        })
    }

    pub fn endpoint(&self, kind: InfoKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint_path())
    }

    fn session_url(&self) -> String {
        format!("{}{}", self.base_url, SESSION_PATH)
    }

    /// 首次查詢前造訪首頁取得 session cookie，每個 client 只做一次
    async fn ensure_session(&self) -> Result<()> {
        if !self.session_warmup {
            return Ok(());
        }

        self.session
            .get_or_try_init(|| async move {
                let url = self.session_url();
                tracing::debug!("Initializing upstream session: {}", url);

                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| network_failure(&url, "", e))?;

                if !response.status().is_success() {
                    return Err(LookupError::UpstreamError {
                        endpoint: url,
                        request_body: String::new(),
                        status: Some(response.status().as_u16()),
                        message: format!("session warm-up failed: HTTP {}", response.status()),
                    });
                }

                tracing::info!("🔑 Upstream session initialized");
                Ok::<(), LookupError>(())
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl CaseLookupClient for CourtApiClient {
    async fn fetch(
        &self,
        kind: InfoKind,
        request: &LookupRequest,
    ) -> Result<Option<serde_json::Value>> {
        self.ensure_session().await?;

        let endpoint = self.endpoint(kind);
        let body = serde_json::to_string(request)?;
        tracing::debug!("POST {} {}", endpoint, body);

        let mut builder = self.client.post(&endpoint).json(request);
        if self.session_warmup {
            builder = builder.header(REFERER, self.session_url());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| network_failure(&endpoint, &body, e))?;

        let status = response.status();
        tracing::debug!("Upstream response status: {}", status);

        // 非 2xx 一律視為上游錯誤，本體讀不完也不改判為網路錯誤
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.trim();
            let message = if detail.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, detail.chars().take(200).collect::<String>())
            };
            return Err(LookupError::UpstreamError {
                endpoint,
                request_body: body,
                status: Some(status.as_u16()),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| network_failure(&endpoint, &body, e))?;

        parse_payload(&endpoint, &body, status.as_u16(), &text)
    }
}

fn network_failure(endpoint: &str, body: &str, error: reqwest::Error) -> LookupError {
    let timed_out = error.is_timeout();
    if timed_out {
        tracing::warn!("⏱️ Request to {} timed out", endpoint);
    } else {
        tracing::warn!("❌ Request to {} failed: {}", endpoint, error);
    }

    LookupError::NetworkFailure {
        endpoint: endpoint.to_string(),
        request_body: body.to_string(),
        reason: error.to_string(),
        timed_out,
    }
}

/// 解析 2xx 回應本體，取出 `data`；`data` 缺少或為 null 代表查無資料
fn parse_payload(
    endpoint: &str,
    body: &str,
    status: u16,
    text: &str,
) -> Result<Option<serde_json::Value>> {
    let upstream_error = |message: String| LookupError::UpstreamError {
        endpoint: endpoint.to_string(),
        request_body: body.to_string(),
        status: Some(status),
        message,
    };

    let trimmed = text.trim_start();
    let head = trimmed.chars().take(16).collect::<String>().to_ascii_lowercase();
    if head.starts_with("<!doctype") || head.starts_with("<html") {
        // 會話過期或端點被下架時，上游會回傳 HTML 頁面
        return Err(upstream_error(
            "received an HTML page instead of JSON (session expired or endpoint retired)"
                .to_string(),
        ));
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| upstream_error(format!("malformed JSON: {}", e)))?;

    match value {
        serde_json::Value::Object(mut map) => match map.remove("data") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => Ok(Some(data)),
        },
        other => Err(upstream_error(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_extracts_data() {
        let data = parse_payload("e", "{}", 200, r#"{"data": {"a": 1}, "status": 200}"#).unwrap();
        assert_eq!(data, Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_parse_payload_missing_or_null_data_is_empty() {
        assert_eq!(parse_payload("e", "{}", 200, r#"{"status": 200}"#).unwrap(), None);
        assert_eq!(parse_payload("e", "{}", 200, r#"{"data": null}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_payload_rejects_html_and_garbage() {
        for text in [
            "<!DOCTYPE html><html></html>",
            "  <html><body>점검중</body></html>",
            "not json",
            "[1, 2, 3]",
        ] {
            assert!(
                matches!(
                    parse_payload("e", "{}", 200, text),
                    Err(LookupError::UpstreamError { .. })
                ),
                "expected upstream error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = UpstreamConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..Default::default()
        };
        let client = CourtApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(InfoKind::Schedule),
            "http://127.0.0.1:8080/pgj/pgj15A/selectCsDtlDxdyDts.on"
        );
    }
}

use crate::core::case_key::{build_request, parse, to_case_key};
use crate::core::reshape::reshape;
use crate::domain::model::{CourtOffice, InfoKind, LookupOutcome, LookupRequest};
use crate::domain::ports::CaseLookupClient;
use crate::utils::error::{LookupError, Result};
use std::future::Future;

/// 案件查詢入口：純函數的正規化步驟 + 注入的查詢客戶端
pub struct CaseKeyResolver<C: CaseLookupClient> {
    client: C,
}

impl<C: CaseLookupClient> CaseKeyResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 解析、正規化並組出請求；任何驗證錯誤都在網路呼叫之前回傳
    pub fn prepare(&self, office: &CourtOffice, raw: &str) -> Result<LookupRequest> {
        let id = parse(raw)?;
        let key = to_case_key(&id)?;
        let request = build_request(office, &key)?;

        tracing::debug!("Resolved '{}' -> {} @ {}", raw.trim(), key, office);
        Ok(request)
    }

    /// 只查詢案件內容
    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupOutcome> {
        self.lookup_kinds(request, &[InfoKind::CaseDetail]).await
    }

    /// 每種資料各送一次請求，第一個錯誤即中止，不做重試
    pub async fn lookup_kinds(
        &self,
        request: &LookupRequest,
        kinds: &[InfoKind],
    ) -> Result<LookupOutcome> {
        let kinds = if kinds.is_empty() {
            &[InfoKind::CaseDetail][..]
        } else {
            kinds
        };

        let mut fetched = Vec::with_capacity(kinds.len());
        for kind in kinds {
            tracing::debug!(
                "📡 Fetching {} for case {}",
                kind.label(),
                request.case_key()
            );
            let data = self.client.fetch(*kind, request).await?;
            if data.is_none() {
                tracing::debug!("No {} data for case {}", kind.label(), request.case_key());
            }
            fetched.push((*kind, data));
        }

        let outcome = reshape(request.court_office(), request.case_key(), fetched);
        match &outcome {
            LookupOutcome::Found(_) => {
                tracing::info!("✅ Case {} found", request.case_key())
            }
            LookupOutcome::Empty => {
                tracing::info!("🔍 No matching case for {}", request.case_key())
            }
        }
        Ok(outcome)
    }

    pub async fn resolve(
        &self,
        office: &CourtOffice,
        raw: &str,
        kinds: &[InfoKind],
    ) -> Result<LookupOutcome> {
        let request = self.prepare(office, raw)?;
        self.lookup_kinds(&request, kinds).await
    }

    /// `cancel` 先完成時放棄進行中的請求並回傳 `Cancelled`
    pub async fn resolve_cancellable<F>(
        &self,
        office: &CourtOffice,
        raw: &str,
        kinds: &[InfoKind],
        cancel: F,
    ) -> Result<LookupOutcome>
    where
        F: Future<Output = ()>,
    {
        let request = self.prepare(office, raw)?;

        tokio::select! {
            outcome = self.lookup_kinds(&request, kinds) => outcome,
            _ = cancel => {
                tracing::info!("Lookup for {} cancelled", request.case_key());
                Err(LookupError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockClient {
        responses: Arc<Mutex<Vec<Result<Option<serde_json::Value>>>>>,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<(InfoKind, String)>>>,
    }

    impl MockClient {
        fn with_responses(responses: Vec<Result<Option<serde_json::Value>>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses)),
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaseLookupClient for MockClient {
        async fn fetch(
            &self,
            kind: InfoKind,
            request: &LookupRequest,
        ) -> Result<Option<serde_json::Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .await
                .push((kind, serde_json::to_string(request)?));
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                Ok(None)
            } else {
                responses.remove(0)
            }
        }
    }

    struct SlowClient;

    #[async_trait]
    impl CaseLookupClient for SlowClient {
        async fn fetch(
            &self,
            _kind: InfoKind,
            _request: &LookupRequest,
        ) -> Result<Option<serde_json::Value>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    fn office() -> CourtOffice {
        CourtOffice::new("B000210")
    }

    #[tokio::test]
    async fn test_validation_fails_before_any_network_call() {
        let resolver = CaseKeyResolver::new(MockClient::default());

        let err = resolver
            .resolve(&office(), "24타경123", &[InfoKind::CaseDetail])
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::MalformedIdentifier { .. }));

        let err = resolver
            .resolve(&office(), "2024타경1000000", &[InfoKind::CaseDetail])
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::SequenceOverflow { .. }));

        let err = resolver
            .resolve(&CourtOffice::new(""), "2024타경12345", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::MissingCourtOffice));

        assert_eq!(resolver.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_sends_request_body_and_reshapes() {
        let client = MockClient::with_responses(vec![Ok(Some(json!({
            "jbrsAddr": "서울특별시 서초구",
            "aeeEvlAmt": 1000,
            "lwsDspslPrc": 640
        })))]);
        let resolver = CaseKeyResolver::new(client.clone());

        let request = resolver.prepare(&office(), "2022타경3944").unwrap();
        let outcome = resolver.lookup(&request).await.unwrap();

        let result = outcome.found().unwrap();
        assert_eq!(result.case_key.as_str(), "202201300003944");
        assert_eq!(result.summary.as_ref().unwrap().discount_rate(), Some(36));

        let seen = client.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, InfoKind::CaseDetail);
        assert_eq!(
            seen[0].1,
            r#"{"dma_srchCsDtlInf":{"cortOfcCd":"B000210","csNo":"202201300003944"}}"#
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let resolver =
            CaseKeyResolver::new(MockClient::with_responses(vec![Ok(None), Ok(Some(json!([])))]));

        let outcome = resolver
            .resolve(
                &office(),
                "2024타경12345",
                &[InfoKind::CaseDetail, InfoKind::Schedule],
            )
            .await
            .unwrap();

        assert!(outcome.is_empty());
        assert_eq!(resolver.client().call_count(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_without_retry() {
        let client = MockClient::with_responses(vec![Err(LookupError::NetworkFailure {
            endpoint: "http://upstream/selectAuctnCsSrchRslt.on".to_string(),
            request_body: "{}".to_string(),
            reason: "operation timed out".to_string(),
            timed_out: true,
        })]);
        let resolver = CaseKeyResolver::new(client.clone());

        let err = resolver
            .resolve(&office(), "2024타경12345", &InfoKind::ALL)
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::NetworkFailure { timed_out: true, .. }));
        // 第一個錯誤即停止，其餘種類不再送出
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_cancellable_returns_cancelled() {
        let resolver = CaseKeyResolver::new(SlowClient);

        let err = resolver
            .resolve_cancellable(
                &office(),
                "2024타경12345",
                &[InfoKind::CaseDetail],
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::Cancelled));
    }

    #[tokio::test]
    async fn test_resolve_cancellable_completes_when_not_cancelled() {
        let client = MockClient::with_responses(vec![Ok(Some(json!({"jbrsAddr": "인천"})))]);
        let resolver = CaseKeyResolver::new(client);

        let outcome = resolver
            .resolve_cancellable(
                &office(),
                "2024타경77",
                &[InfoKind::CaseDetail],
                std::future::pending::<()>(),
            )
            .await
            .unwrap();

        assert!(!outcome.is_empty());
    }
}

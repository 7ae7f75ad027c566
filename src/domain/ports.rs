use crate::domain::model::{InfoKind, LookupRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 唯一有副作用的邊界：對上游送出一次查詢
///
/// 回傳上游回應中的 `data` 內容；`None` 表示上游正常回應但查無資料。
/// 實作不得自行重試，重試由呼叫端決定。
#[async_trait]
pub trait CaseLookupClient: Send + Sync {
    async fn fetch(
        &self,
        kind: InfoKind,
        request: &LookupRequest,
    ) -> Result<Option<serde_json::Value>>;
}

#[async_trait]
impl<C: CaseLookupClient + ?Sized> CaseLookupClient for std::sync::Arc<C> {
    async fn fetch(
        &self,
        kind: InfoKind,
        request: &LookupRequest,
    ) -> Result<Option<serde_json::Value>> {
        (**self).fetch(kind, request).await
    }
}

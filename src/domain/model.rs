use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 案件種類：使用者輸入中的標記字與 API 使用的種類代碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    /// 不動產拍賣（標記 `타경`）
    RealEstateAuction,
}

impl CaseType {
    pub const ALL: [CaseType; 1] = [CaseType::RealEstateAuction];

    pub fn marker(&self) -> &'static str {
        match self {
            CaseType::RealEstateAuction => "타경",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CaseType::RealEstateAuction => "0130",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.marker() == marker)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// 使用者輸入的案件編號，例如 `2024타경12345`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CaseIdentifier {
    pub(crate) year: u16,
    pub(crate) case_type: CaseType,
    pub(crate) sequence_number: u32,
}

impl CaseIdentifier {
    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn case_type(&self) -> CaseType {
        self.case_type
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }
}

impl fmt::Display for CaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{}{}",
            self.year,
            self.case_type.marker(),
            self.sequence_number
        )
    }
}

/// API 用的 15 位數字案件鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseKey(pub(crate) String);

impl TryFrom<String> for CaseKey {
    type Error = crate::utils::error::LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaseKey> for String {
    fn from(key: CaseKey) -> Self {
        key.0
    }
}

impl CaseKey {
    pub const LEN: usize = 15;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 法院代碼（例如 `B000210`），由呼叫端提供
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtOffice(String);

impl CourtOffice {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourtOffice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetailQuery {
    #[serde(rename = "cortOfcCd")]
    pub court_office: CourtOffice,
    #[serde(rename = "csNo")]
    pub case_key: CaseKey,
}

/// 送往上游的請求本體：`{"dma_srchCsDtlInf":{"cortOfcCd":..,"csNo":..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    #[serde(rename = "dma_srchCsDtlInf")]
    pub query: CaseDetailQuery,
}

impl LookupRequest {
    pub fn court_office(&self) -> &CourtOffice {
        &self.query.court_office
    }

    pub fn case_key(&self) -> &CaseKey {
        &self.query.case_key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    CaseDetail,
    Schedule,
    DocumentDelivery,
}

impl InfoKind {
    pub const ALL: [InfoKind; 3] = [
        InfoKind::CaseDetail,
        InfoKind::Schedule,
        InfoKind::DocumentDelivery,
    ];

    pub fn endpoint_path(&self) -> &'static str {
        match self {
            InfoKind::CaseDetail => "/pgj/pgj15A/selectAuctnCsSrchRslt.on",
            InfoKind::Schedule => "/pgj/pgj15A/selectCsDtlDxdyDts.on",
            InfoKind::DocumentDelivery => "/pgj/pgj15A/selectDlvrOfdocDtsDtl.on",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InfoKind::CaseDetail => "사건내역",
            InfoKind::Schedule => "기일내역",
            InfoKind::DocumentDelivery => "문건송달내역",
        }
    }

    /// CLI 參數名稱，也接受韓文標籤
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "case" | "case_detail" | "사건내역" => Some(InfoKind::CaseDetail),
            "schedule" | "기일내역" => Some(InfoKind::Schedule),
            "documents" | "document_delivery" | "문건송달내역" => {
                Some(InfoKind::DocumentDelivery)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub address: Option<String>,
    pub property_type: Option<String>,
    pub building_name: Option<String>,
    pub area_m2: Option<f64>,
    pub appraisal_price: Option<u64>,
    pub minimum_price: Option<u64>,
}

impl CaseSummary {
    /// 最低賣價相對鑑定價的折扣（百分比，四捨五入）
    pub fn discount_rate(&self) -> Option<u32> {
        match (self.appraisal_price, self.minimum_price) {
            (Some(appraisal), Some(minimum)) if appraisal > 0 && minimum > 0 => {
                let rate = (1.0 - minimum as f64 / appraisal as f64) * 100.0;
                Some(rate.max(0.0).round() as u32)
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &CaseSummary::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: Option<String>,
    pub result: Option<String>,
    pub place: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDeliveryEntry {
    pub document_name: Option<String>,
    pub sent_on: Option<String>,
    pub received_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseLookupResult {
    pub court_office: CourtOffice,
    pub case_key: CaseKey,
    pub summary: Option<CaseSummary>,
    pub schedule: Vec<ScheduleEntry>,
    pub documents: Vec<DocumentDeliveryEntry>,
    /// 上游原始 `data` 內容，依查詢種類保存
    pub raw: BTreeMap<InfoKind, serde_json::Value>,
}

/// 查無案件是正常結果，不是錯誤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(CaseLookupResult),
    Empty,
}

impl LookupOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, LookupOutcome::Empty)
    }

    pub fn found(&self) -> Option<&CaseLookupResult> {
        match self {
            LookupOutcome::Found(result) => Some(result),
            LookupOutcome::Empty => None,
        }
    }
}

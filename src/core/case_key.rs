use crate::domain::model::{
    CaseDetailQuery, CaseIdentifier, CaseKey, CaseType, CourtOffice, LookupRequest,
};
use crate::utils::error::{LookupError, Result};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

const MAX_SEQUENCE: u32 = 999_999;
// 鍵內序號欄位固定 7 位：4 + 4 + 7 = 15
const KEY_SEQUENCE_WIDTH: usize = 7;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `\d` 會匹配 Unicode 數字，這裡只接受 ASCII
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^([0-9]+)([^0-9]*)([0-9]*)(.*)$").expect("identifier pattern is valid")
    })
}

fn malformed(input: &str, reason: impl Into<String>) -> LookupError {
    LookupError::MalformedIdentifier {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// 解析 `<4位年份><標記><1~7位序號>` 形式的案件編號
pub fn parse(raw: &str) -> Result<CaseIdentifier> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(malformed(raw, "identifier is empty"));
    }

    let caps = identifier_pattern()
        .captures(trimmed)
        .ok_or_else(|| malformed(raw, "identifier must start with a 4-digit year"))?;

    let year = &caps[1];
    let marker = &caps[2];
    let sequence = &caps[3];
    let rest = &caps[4];

    if year.len() != 4 {
        return Err(malformed(
            raw,
            format!("year must be exactly 4 digits, got {}", year.len()),
        ));
    }

    let case_type = CaseType::from_marker(marker).ok_or_else(|| {
        if marker.is_empty() {
            malformed(raw, "case type marker (e.g. 타경) is missing")
        } else {
            malformed(raw, format!("unknown case type marker '{}'", marker))
        }
    })?;

    if sequence.is_empty() {
        return Err(malformed(raw, "sequence number is missing"));
    }
    if !rest.is_empty() {
        return Err(malformed(raw, "sequence number must contain digits only"));
    }
    if sequence.len() > KEY_SEQUENCE_WIDTH {
        return Err(malformed(
            raw,
            format!("sequence number is too long ({} digits)", sequence.len()),
        ));
    }

    // 長度已檢查，7 位數內不會溢位
    let sequence_number: u32 = sequence
        .parse()
        .map_err(|_| malformed(raw, "sequence number is not a valid integer"))?;
    if sequence_number == 0 {
        return Err(malformed(raw, "sequence number must be positive"));
    }

    Ok(CaseIdentifier {
        year: year
            .parse()
            .map_err(|_| malformed(raw, "year is not a valid integer"))?,
        case_type,
        sequence_number,
    })
}

/// `年份 + 種類代碼 + 序號補零至 7 位`，純函數；序號上限為 999999
pub fn to_case_key(id: &CaseIdentifier) -> Result<CaseKey> {
    if id.sequence_number > MAX_SEQUENCE {
        return Err(LookupError::SequenceOverflow {
            sequence: id.sequence_number,
        });
    }

    Ok(CaseKey(format!(
        "{:04}{}{:0width$}",
        id.year,
        id.case_type.code(),
        id.sequence_number,
        width = KEY_SEQUENCE_WIDTH
    )))
}

/// 只檢查法院代碼非空；代碼是否合法由呼叫端負責
pub fn build_request(office: &CourtOffice, key: &CaseKey) -> Result<LookupRequest> {
    if office.as_str().trim().is_empty() {
        return Err(LookupError::MissingCourtOffice);
    }

    Ok(LookupRequest {
        query: CaseDetailQuery {
            court_office: office.clone(),
            case_key: key.clone(),
        },
    })
}

impl FromStr for CaseIdentifier {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl CaseIdentifier {
    pub fn to_case_key(&self) -> Result<CaseKey> {
        to_case_key(self)
    }
}

/// 接受已正規化的 15 位鍵（例如直接從 API 回應複製）
impl FromStr for CaseKey {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        if key.len() != CaseKey::LEN || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(s, "case key must be exactly 15 ASCII digits"));
        }
        if CaseType::from_code(&key[4..8]).is_none() {
            return Err(malformed(
                s,
                format!("unknown case type code '{}'", &key[4..8]),
            ));
        }
        Ok(CaseKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(raw: &str) -> Result<CaseKey> {
        parse(raw).and_then(|id| to_case_key(&id))
    }

    #[test]
    fn test_parse_extracts_year_and_sequence() {
        let id = parse("2024타경12345").unwrap();
        assert_eq!(id.year(), 2024);
        assert_eq!(id.sequence_number(), 12345);
        assert_eq!(id.case_type(), CaseType::RealEstateAuction);
        assert_eq!(id.to_string(), "2024타경12345");
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let id = parse("  2022타경3944\n").unwrap();
        assert_eq!(id.sequence_number(), 3944);
    }

    #[test]
    fn test_case_key_example() {
        assert_eq!(key_for("2024타경12345").unwrap().as_str(), "202401300012345");
        assert_eq!(key_for("2022타경3944").unwrap().as_str(), "202201300003944");
    }

    #[test]
    fn test_case_key_is_deterministic() {
        let first = key_for("2023타경98765").unwrap();
        let second = key_for("2023타경98765").unwrap();
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
        assert_eq!(first.as_str().len(), CaseKey::LEN);
    }

    #[test]
    fn test_sequence_boundaries() {
        assert_eq!(key_for("2024타경1").unwrap().as_str(), "202401300000001");
        assert_eq!(key_for("2024타경999999").unwrap().as_str(), "202401300999999");
        assert!(matches!(
            key_for("2024타경1000000"),
            Err(LookupError::SequenceOverflow { sequence: 1_000_000 })
        ));
    }

    #[test]
    fn test_two_digit_year_is_malformed() {
        assert!(matches!(
            parse("24타경123"),
            Err(LookupError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn test_missing_marker_is_malformed() {
        assert!(matches!(
            parse("2024-12345"),
            Err(LookupError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            parse("202412345"),
            Err(LookupError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn test_other_malformed_inputs() {
        for raw in [
            "",
            "타경12345",
            "2024타경",
            "2024타경12a45",
            "2024타경 12345",
            "2024타경12345678",
            "2024타경0",
            "2024가단12345",
            "２０２４타경12345",
        ] {
            assert!(
                matches!(parse(raw), Err(LookupError::MalformedIdentifier { .. })),
                "expected malformed for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_leading_zero_sequence_is_accepted() {
        assert_eq!(key_for("2024타경0012345").unwrap().as_str(), "202401300012345");
    }

    #[test]
    fn test_build_request_exact_json() {
        let office = CourtOffice::new("B000210");
        let key: CaseKey = "202201300003944".parse().unwrap();
        let request = build_request(&office, &key).unwrap();

        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"dma_srchCsDtlInf":{"cortOfcCd":"B000210","csNo":"202201300003944"}}"#
        );
    }

    #[test]
    fn test_build_request_rejects_empty_office() {
        let key = key_for("2024타경12345").unwrap();
        assert!(matches!(
            build_request(&CourtOffice::new(""), &key),
            Err(LookupError::MissingCourtOffice)
        ));
        assert!(matches!(
            build_request(&CourtOffice::new("  "), &key),
            Err(LookupError::MissingCourtOffice)
        ));
    }

    #[test]
    fn test_derived_key_parses_back() {
        for raw in ["2024타경1", "2024타경12345", "2022타경3944", "2024타경999999"] {
            let key = key_for(raw).unwrap();
            assert_eq!(key.as_str().len(), CaseKey::LEN);
            assert_eq!(key.as_str().parse::<CaseKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_found_outcome_survives_json_round_trip() {
        use crate::domain::model::{CaseLookupResult, LookupOutcome};

        let outcome = LookupOutcome::Found(CaseLookupResult {
            court_office: CourtOffice::new("B000210"),
            case_key: key_for("2024타경12345").unwrap(),
            summary: None,
            schedule: Vec::new(),
            documents: Vec::new(),
            raw: Default::default(),
        });

        let json = serde_json::to_string(&outcome).unwrap();
        let back: LookupOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_case_key_from_str_validation() {
        assert!("202401300012345".parse::<CaseKey>().is_ok());
        assert!("20240130001234".parse::<CaseKey>().is_err());
        assert!("2024013000123a5".parse::<CaseKey>().is_err());
        assert!("202409990012345".parse::<CaseKey>().is_err());
    }
}

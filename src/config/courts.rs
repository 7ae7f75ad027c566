use crate::domain::model::CourtOffice;
use crate::utils::error::{LookupError, Result};
use std::collections::BTreeMap;

/// 法院拍賣網站使用的法院代碼（地方法院及支院）
const BUILTIN_COURTS: &[(&str, &str)] = &[
    // 首爾
    ("서울중앙지방법원", "B000210"),
    ("서울동부지방법원", "B000211"),
    ("서울남부지방법원", "B000212"),
    ("서울북부지방법원", "B000213"),
    ("서울서부지방법원", "B000215"),
    // 京畿
    ("의정부지방법원", "B000214"),
    ("고양지원", "B214807"),
    ("남양주지원", "B214804"),
    ("수원지방법원", "B000250"),
    ("성남지원", "B000251"),
    ("여주지원", "B000252"),
    ("평택지원", "B000253"),
    ("안산지원", "B250826"),
    ("안양지원", "B000254"),
    // 仁川
    ("인천지방법원", "B000240"),
    ("부천지원", "B000241"),
    // 江原
    ("춘천지방법원", "B000260"),
    ("강릉지원", "B000261"),
    ("원주지원", "B000262"),
    ("속초지원", "B000263"),
    ("영월지원", "B000264"),
    // 忠北
    ("청주지방법원", "B000270"),
    ("충주지원", "B000271"),
    ("제천지원", "B000272"),
    ("영동지원", "B000273"),
    // 忠南/大田
    ("대전지방법원", "B000280"),
    ("홍성지원", "B000281"),
    ("논산지원", "B000282"),
    ("천안지원", "B000283"),
    ("공주지원", "B000284"),
    ("서산지원", "B000285"),
    // 慶北/大邱
    ("대구지방법원", "B000310"),
    ("안동지원", "B000311"),
    ("경주지원", "B000312"),
    ("김천지원", "B000313"),
    ("상주지원", "B000314"),
    ("의성지원", "B000315"),
    ("영덕지원", "B000316"),
    ("포항지원", "B000317"),
    ("대구서부지원", "B000320"),
    // 慶南/釜山/蔚山
    ("부산지방법원", "B000410"),
    ("부산동부지원", "B000412"),
    ("부산서부지원", "B000414"),
    ("울산지방법원", "B000411"),
    ("창원지방법원", "B000420"),
    ("마산지원", "B000431"),
    ("진주지원", "B000421"),
    ("통영지원", "B000422"),
    ("밀양지원", "B000423"),
    ("거창지원", "B000424"),
    // 全南/光州
    ("광주지방법원", "B000510"),
    ("목포지원", "B000511"),
    ("장흥지원", "B000512"),
    ("순천지원", "B000513"),
    ("해남지원", "B000514"),
    // 全北
    ("전주지방법원", "B000520"),
    ("군산지원", "B000521"),
    ("정읍지원", "B000522"),
    ("남원지원", "B000523"),
    // 濟州
    ("제주지방법원", "B000530"),
];

/// 法院名稱與代碼對照表；呼叫端用它把名稱轉成 `CourtOffice`
#[derive(Debug, Clone)]
pub struct CourtDirectory {
    by_name: BTreeMap<String, String>,
}

impl Default for CourtDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CourtDirectory {
    pub fn builtin() -> Self {
        Self {
            by_name: BUILTIN_COURTS
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        }
    }

    /// 設定檔中的項目會新增或覆蓋內建項目
    pub fn with_overrides<'a, I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, code) in entries {
            self.by_name.insert(name.trim().to_string(), code.trim().to_string());
        }
        self
    }

    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name.trim()).map(String::as_str)
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        self.by_name
            .iter()
            .find(|(_, c)| c.as_str() == code)
            .map(|(name, _)| name.as_str())
    }

    /// 先以名稱比對，再以代碼比對
    pub fn resolve(&self, name_or_code: &str) -> Result<CourtOffice> {
        let input = name_or_code.trim();
        if let Some(code) = self.code_for(input) {
            return Ok(CourtOffice::new(code));
        }
        if self.name_for(input).is_some() {
            return Ok(CourtOffice::new(input));
        }
        Err(LookupError::UnknownCourt {
            name: input.to_string(),
        })
    }

    /// 首爾的法院排在最前，其餘依名稱排序
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .by_name
            .iter()
            .map(|(name, code)| (name.as_str(), code.as_str()))
            .collect();
        entries.sort_by_key(|(name, _)| (!name.starts_with("서울"), *name));
        entries
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_directory_size() {
        assert_eq!(CourtDirectory::builtin().len(), 60);
    }

    #[test]
    fn test_resolve_by_name_and_code() {
        let courts = CourtDirectory::builtin();
        assert_eq!(courts.resolve("서울중앙지방법원").unwrap().as_str(), "B000210");
        assert_eq!(courts.resolve(" B000250 ").unwrap().as_str(), "B000250");
        assert_eq!(courts.name_for("B000530"), Some("제주지방법원"));
    }

    #[test]
    fn test_resolve_unknown_court() {
        let courts = CourtDirectory::builtin();
        assert!(matches!(
            courts.resolve("없는법원"),
            Err(LookupError::UnknownCourt { .. })
        ));
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut extra = BTreeMap::new();
        extra.insert("서울중앙지방법원".to_string(), "B999999".to_string());
        extra.insert("테스트법원".to_string(), "B000001".to_string());

        let courts = CourtDirectory::builtin().with_overrides(&extra);
        assert_eq!(courts.code_for("서울중앙지방법원"), Some("B999999"));
        assert_eq!(courts.code_for("테스트법원"), Some("B000001"));
        assert_eq!(courts.len(), 61);
    }

    #[test]
    fn test_entries_list_seoul_first() {
        let courts = CourtDirectory::builtin();
        let entries = courts.entries();
        assert!(entries[..5].iter().all(|(name, _)| name.starts_with("서울")));
    }
}

use crate::domain::model::{
    CaseKey, CaseLookupResult, CaseSummary, CourtOffice, DocumentDeliveryEntry, InfoKind,
    LookupOutcome, ScheduleEntry,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// 上游欄位名稱在前，其餘為舊版或英文欄位的備援
const ADDRESS_FIELDS: &[&str] = &["jbrsAddr", "printSt", "address"];
const PROPERTY_TYPE_FIELDS: &[&str] = &["mtrKndNm", "dspslUsgNm", "propertyType"];
const BUILDING_NAME_FIELDS: &[&str] = &["mtrNm", "bldgNm", "buldNm"];
const AREA_FIELDS: &[&str] = &["excsvAr", "area"];
const APPRAISAL_FIELDS: &[&str] = &["aeeEvlAmt", "gamevalAmt", "appraisalPrice"];
const MINIMUM_PRICE_FIELDS: &[&str] = &["lwsDspslPrc", "minmaePrice", "minPrice"];

const SCHEDULE_DATE_FIELDS: &[&str] = &["dxdyDt", "dxdyYmd", "date"];
const SCHEDULE_RESULT_FIELDS: &[&str] = &["dxdyRsltNm", "result"];
const SCHEDULE_PLACE_FIELDS: &[&str] = &["dxdyPlc", "dxdyPlcNm", "place"];

const DOCUMENT_NAME_FIELDS: &[&str] = &["ofdocNm", "docName"];
const DOCUMENT_SENT_FIELDS: &[&str] = &["sndngDt", "sendDate"];
const DOCUMENT_RECEIVED_FIELDS: &[&str] = &["rcptDt", "recvDate"];

const SUMMARY_FIELDS: &[&[&str]] = &[
    ADDRESS_FIELDS,
    PROPERTY_TYPE_FIELDS,
    BUILDING_NAME_FIELDS,
    AREA_FIELDS,
    APPRAISAL_FIELDS,
    MINIMUM_PRICE_FIELDS,
];
const SCHEDULE_FIELDS: &[&[&str]] = &[
    SCHEDULE_DATE_FIELDS,
    SCHEDULE_RESULT_FIELDS,
    SCHEDULE_PLACE_FIELDS,
];
const DOCUMENT_FIELDS: &[&[&str]] = &[
    DOCUMENT_NAME_FIELDS,
    DOCUMENT_SENT_FIELDS,
    DOCUMENT_RECEIVED_FIELDS,
];

const MAX_SEARCH_DEPTH: usize = 4;

/// 把各查詢種類的 `data` 組合成型別化結果；全部為空時回傳 `Empty`
pub fn reshape(
    court_office: &CourtOffice,
    case_key: &CaseKey,
    fetched: Vec<(InfoKind, Option<Value>)>,
) -> LookupOutcome {
    let raw: BTreeMap<InfoKind, Value> = fetched
        .into_iter()
        .filter_map(|(kind, data)| data.filter(|v| !is_blank(v)).map(|v| (kind, v)))
        .collect();

    if raw.is_empty() {
        return LookupOutcome::Empty;
    }

    let summary = raw
        .get(&InfoKind::CaseDetail)
        .map(summarize_case)
        .filter(|s| !s.is_empty());
    let schedule = raw
        .get(&InfoKind::Schedule)
        .map(schedule_entries)
        .unwrap_or_default();
    let documents = raw
        .get(&InfoKind::DocumentDelivery)
        .map(document_entries)
        .unwrap_or_default();

    LookupOutcome::Found(CaseLookupResult {
        court_office: court_office.clone(),
        case_key: case_key.clone(),
        summary,
        schedule,
        documents,
        raw,
    })
}

/// 空值、空字串，以及只包含空值的陣列或物件（例如 `{"list": []}`）
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.values().all(is_blank),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// 所有欄位都取自同一筆物件（第一筆帶有摘要欄位的物件）
pub fn summarize_case(data: &Value) -> CaseSummary {
    let Some(record) = find_record(data, SUMMARY_FIELDS) else {
        return CaseSummary::default();
    };

    CaseSummary {
        address: field(record, ADDRESS_FIELDS).and_then(as_text),
        property_type: field(record, PROPERTY_TYPE_FIELDS).and_then(as_text),
        building_name: field(record, BUILDING_NAME_FIELDS).and_then(as_text),
        area_m2: field(record, AREA_FIELDS).and_then(as_f64),
        appraisal_price: field(record, APPRAISAL_FIELDS).and_then(as_u64),
        minimum_price: field(record, MINIMUM_PRICE_FIELDS).and_then(as_u64),
    }
}

pub fn schedule_entries(data: &Value) -> Vec<ScheduleEntry> {
    collect_records(data, SCHEDULE_FIELDS)
        .into_iter()
        .map(|record| ScheduleEntry {
            date: field(record, SCHEDULE_DATE_FIELDS)
                .and_then(as_text)
                .map(|d| normalize_date(&d)),
            result: field(record, SCHEDULE_RESULT_FIELDS).and_then(as_text),
            place: field(record, SCHEDULE_PLACE_FIELDS).and_then(as_text),
        })
        .filter(|entry| entry != &ScheduleEntry::default())
        .collect()
}

pub fn document_entries(data: &Value) -> Vec<DocumentDeliveryEntry> {
    collect_records(data, DOCUMENT_FIELDS)
        .into_iter()
        .map(|record| DocumentDeliveryEntry {
            document_name: field(record, DOCUMENT_NAME_FIELDS).and_then(as_text),
            sent_on: field(record, DOCUMENT_SENT_FIELDS)
                .and_then(as_text)
                .map(|d| normalize_date(&d)),
            received_on: field(record, DOCUMENT_RECEIVED_FIELDS)
                .and_then(as_text)
                .map(|d| normalize_date(&d)),
        })
        .filter(|entry| entry != &DocumentDeliveryEntry::default())
        .collect()
}

/// 找出列表型資料：頂層陣列、`list` 欄位、或物件帶有已知欄位的巢狀陣列
fn collect_records<'a>(data: &'a Value, groups: &[&[&str]]) -> Vec<&'a Map<String, Value>> {
    match data {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("list") {
                return items.iter().filter_map(Value::as_object).collect();
            }

            // 其他物件陣列（例如物件清單）不能搶先被當成這一類的紀錄
            let nested = map.values().find_map(|v| match v {
                Value::Array(items)
                    if items
                        .iter()
                        .filter_map(Value::as_object)
                        .any(|record| has_any_field(record, groups)) =>
                {
                    Some(items)
                }
                _ => None,
            });

            match nested {
                Some(items) => items.iter().filter_map(Value::as_object).collect(),
                None if has_any_field(map, groups) => vec![map],
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !is_blank(v))
}

fn has_any_field(record: &Map<String, Value>, groups: &[&[&str]]) -> bool {
    groups.iter().any(|keys| field(record, keys).is_some())
}

/// 深度優先搜尋第一筆帶有任一指定欄位的物件
fn find_record<'a>(value: &'a Value, groups: &[&[&str]]) -> Option<&'a Map<String, Value>> {
    fn search<'a>(
        value: &'a Value,
        groups: &[&[&str]],
        depth: usize,
    ) -> Option<&'a Map<String, Value>> {
        if depth > MAX_SEARCH_DEPTH {
            return None;
        }
        match value {
            Value::Object(map) if has_any_field(map, groups) => Some(map),
            Value::Object(map) => map.values().find_map(|v| search(v, groups, depth + 1)),
            Value::Array(items) => items.iter().find_map(|v| search(v, groups, depth + 1)),
            _ => None,
        }
    }
    search(value, groups, 0)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 接受數字或像 `"1,200,000원"` 這類字串
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .trim_end_matches('원')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            digits.trim().parse().ok()
        }
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("㎡").trim().parse().ok(),
        _ => None,
    }
}

/// `20240315` → `2024-03-15`；無法辨識的格式原樣保留
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

use crate::error::{FillError, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::HashMap, fs, path::Path, slice};
static COLUMN_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            "order_no",
            &["RCK Order no.", "RCK Order No", "RCK Order no", "Order No", "주문번호"][..],
        ),
        (
            "customer_name",
            &["Customer name", "Customer Name", "customer name", "고객명", "고객사"][..],
        ),
        (
            "customer_po",
            &["Customer PO", "Customer PO No", "customer po", "고객 PO", "고객PO"][..],
        ),
        ("item_qty", &["Item qty", "Item Qty", "item qty", "Qty", "수량"][..]),
        ("ico_unit", &["ICO Unit", "ICO unit", "ico unit", "Unit Price", "단가"][..]),
        (
            "sales_unit_price",
            &["Sales Unit Price", "Sales unit price", "sales unit price", "판매단가"][..],
        ),
        ("model", &["Model", "MODEL", "model", "모델"][..]),
        (
            "delivery_date",
            &[
                "Requested delivery date",
                "Delivery Date",
                "delivery date",
                "납기일",
                "요청납기일",
            ][..],
        ),
        ("item_name", &["Item name", "Item Name", "item name", "품목명"][..]),
        ("remark", &["Remark", "REMARK", "remark", "비고"][..]),
        ("incoterms", &["Incoterms", "INCOTERMS", "incoterms", "인코텀즈"][..]),
        ("opportunity", &["Opportunity", "OPPORTUNITY", "opportunity", "프로젝트"][..]),
        ("sector", &["Sector", "SECTOR", "sector", "섹터"][..]),
        (
            "industry_code",
            &["Industry code", "Industry Code", "industry code", "산업코드"][..],
        ),
        ("sheet_type", &["_시트구분"][..]),
        (
            "power_supply",
            &["Power supply", "Power Supply", "power supply", "전원"][..],
        ),
        ("als", &["ALS", "als"][..]),
        ("so_id", &["SO_ID"][..]),
        ("dn_id", &["DN_ID"][..]),
        ("currency", &["Currency", "통화"][..]),
        ("po_receipt_date", &["PO receipt date", "PO Receipt Date"][..]),
        ("delivery_address", &["납품 주소", "Delivery address"][..]),
        ("dispatch_date", &["출고일", "Dispatch date"][..]),
    ])
});
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);
impl Record {
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
    pub fn resolve_key(&self, key: &str) -> Option<&str> {
        if let Some((found, _)) = self.0.get_key_value(key) {
            return Some(found);
        }
        if let Some(aliases) = COLUMN_ALIASES.get(key)
            && let Some(found) = aliases
                .iter()
                .find_map(|alias| self.0.get_key_value(*alias).map(|(k, _)| k.as_str()))
        {
            return Some(found);
        }
        self.0
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(String::as_str)
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        let value = self.0.get(self.resolve_key(key)?)?;
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().eq_ignore_ascii_case("nan") => None,
            _ => Some(value),
        }
    }
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(value_text).unwrap_or_default()
    }
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.get(key).and_then(parse_date)
    }
    pub fn is_flagged(&self, key: &str) -> bool {
        self.text(key).trim().eq_ignore_ascii_case("y")
    }
}
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
            .map_or_else(|| n.to_string(), |f| format!("{f:.0}")),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_owned(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let Value::String(s) = value else {
        return None;
    };
    let head = s.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y.%m.%d"))
        .ok()
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSet {
    pub primary: Record,
    pub items: Vec<Record>,
}
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordSet {
    Structured {
        primary: Record,
        #[serde(default)]
        items: Vec<Record>,
    },
    Rows(Vec<Record>),
}
impl<'de> Deserialize<'de> for RecordSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawRecordSet::deserialize(deserializer)? {
            RawRecordSet::Structured { primary, items } => Ok(Self { primary, items }),
            RawRecordSet::Rows(rows) => {
                let primary = rows
                    .first()
                    .cloned()
                    .ok_or_else(|| serde::de::Error::custom("레코드가 하나도 없습니다."))?;
                Ok(Self {
                    primary,
                    items: rows,
                })
            }
        }
    }
}
impl RecordSet {
    pub fn new(primary: Record, items: Vec<Record>) -> Result<Self> {
        let set = Self { primary, items };
        set.validate()?;
        Ok(set)
    }
    pub fn from_json(text: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(text)?;
        set.validate()?;
        Ok(set)
    }
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| FillError::RecordSet(format!("{} 읽기 실패 ({e})", path.display())))?;
        Self::from_json(&text)
    }
    pub fn items(&self) -> &[Record] {
        if self.items.is_empty() {
            slice::from_ref(&self.primary)
        } else {
            &self.items
        }
    }
    pub fn len(&self) -> usize {
        self.items().len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.primary.0.is_empty()
    }
    pub fn validate(&self) -> Result<()> {
        let mut items = self.items.iter().enumerate();
        let Some((_, first)) = items.next() else {
            return Ok(());
        };
        let mut expected: Vec<&str> = first.keys().collect();
        expected.sort_unstable();
        for (idx, item) in items {
            let mut keys: Vec<&str> = item.keys().collect();
            keys.sort_unstable();
            if keys != expected {
                return Err(FillError::RecordSet(format!(
                    "{}번째 아이템의 필드 구성이 첫 아이템과 다릅니다.",
                    idx + 1
                )));
            }
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::{Record, RecordSet, value_text};
    use chrono::NaiveDate;
    use serde_json::json;
    #[test]
    fn lookup_prefers_exact_then_alias_then_case_insensitive() {
        let rec = Record::new()
            .with("RCK Order no.", "ND-0001")
            .with("customer NAME", "Acme")
            .with("Customer PO", "PO-77");
        assert_eq!(rec.text("order_no"), "ND-0001");
        assert_eq!(rec.text("Customer PO"), "PO-77");
        assert_eq!(rec.text("CUSTOMER NAME"), "Acme");
        assert_eq!(rec.text("missing"), "");
    }
    #[test]
    fn nan_and_null_read_as_missing() {
        let rec = Record::new()
            .with("Remark", "NaN")
            .with("Model", serde_json::Value::Null)
            .with("Item qty", 3);
        assert!(rec.get("remark").is_none());
        assert!(rec.get("model").is_none());
        assert_eq!(rec.text("item_qty"), "3");
    }
    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(value_text(&json!(1001.0)), "1001");
        assert_eq!(value_text(&json!(12.5)), "12.5");
        assert_eq!(value_text(&json!("007")), "007");
    }
    #[test]
    fn dates_accept_timestamps_and_separators() {
        let rec = Record::new()
            .with("delivery_date", "2025-03-04 00:00:00")
            .with("PO receipt date", "2025/01/31");
        assert_eq!(rec.date("delivery_date"), NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(rec.date("po_receipt_date"), NaiveDate::from_ymd_opt(2025, 1, 31));
    }
    #[test]
    fn structured_and_row_json_both_load() {
        let set = RecordSet::from_json(r#"{"primary": {"Model": "IQ3"}}"#).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.items()[0].text("model"), "IQ3");
        let rows = RecordSet::from_json(r#"[{"Model": "IQ3"}, {"Model": "IQ10"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.primary.text("model"), "IQ3");
    }
    #[test]
    fn mismatched_item_schema_is_rejected() {
        let err = RecordSet::from_json(
            r#"{"primary": {}, "items": [{"Model": "a", "Qty": 1}, {"Model": "b"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2번째"), "{err}");
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One catalog entry as served by the upstream API.
///
/// Decoding never fails on a single odd field: a missing or non-numeric
/// `Capability` becomes `None` and scalar text fields are stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseRecord {
    #[serde(rename = "Capability", default, deserialize_with = "lenient_id")]
    pub capability: Option<u64>,
    #[serde(rename = "Business Function", default, deserialize_with = "lenient_text")]
    pub business_function: Option<String>,
    #[serde(rename = "Business Capability", default, deserialize_with = "lenient_text")]
    pub business_capability: Option<String>,
    #[serde(rename = "Stakeholder or User", default, deserialize_with = "lenient_text")]
    pub stakeholder: Option<String>,
    #[serde(rename = "AI Use Case", default, deserialize_with = "lenient_text")]
    pub use_case: Option<String>,
    #[serde(rename = "AI Algorithms & Frameworks", default, deserialize_with = "lenient_text")]
    pub algorithms: Option<String>,
    #[serde(rename = "Datasets", default, deserialize_with = "lenient_text")]
    pub datasets: Option<String>,
    #[serde(rename = "Action / Implementation", default, deserialize_with = "lenient_text")]
    pub implementation: Option<String>,
    #[serde(rename = "AI Tools & Models", default, deserialize_with = "lenient_text")]
    pub tools: Option<String>,
    #[serde(rename = "Digital Platforms and Tools", default, deserialize_with = "lenient_text")]
    pub platforms: Option<String>,
    #[serde(rename = "Expected Outcomes and Results", default, deserialize_with = "lenient_text")]
    pub expected_outcomes: Option<String>,
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// One page of the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCasePage {
    /// Kept loose: only a positive number counts as a total
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub data: Vec<UseCaseRecord>,
}

impl UseCasePage {
    /// The upstream total if it is a usable positive number
    pub fn valid_total(&self) -> Option<u64> {
        let total = self.total.as_ref()?;
        let value = total.as_u64().or_else(|| {
            total
                .as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map(|f| f as u64)
        })?;
        (value > 0).then_some(value)
    }

    /// Page size the upstream actually applied, falling back to the requested one
    pub fn effective_page_size(&self, requested: u32) -> usize {
        match self.page_size {
            Some(size) if size > 0 => size as usize,
            _ => requested as usize,
        }
    }
}

/// How rows are keyed.
///
/// The two front-end variants disagree, so both are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIdentity {
    /// `page * page_size + index + 1` with a zero-indexed page
    #[default]
    Position,
    /// The upstream `Capability` value
    Capability,
}

impl RowIdentity {
    /// Row key. A record without a usable `Capability` falls back to its
    /// position key.
    pub fn key(self, page: u32, page_size: u32, index: usize, record: &UseCaseRecord) -> u64 {
        let position = u64::from(page) * u64::from(page_size) + index as u64 + 1;
        match self {
            RowIdentity::Position => position,
            RowIdentity::Capability => record.capability.unwrap_or(position),
        }
    }
}

/// A record with its row key
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: u64,
    pub record: UseCaseRecord,
}

/// Key every record of a fetched page
pub fn key_rows(
    identity: RowIdentity,
    page: u32,
    page_size: u32,
    records: Vec<UseCaseRecord>,
) -> Vec<CatalogRow> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| CatalogRow {
            id: identity.key(page, page_size, index, &record),
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(capability: u64) -> UseCaseRecord {
        serde_json::from_value(json!({ "Capability": capability })).unwrap()
    }

    #[test]
    fn test_record_field_names() {
        let value = crate::proxy::test_support::sample_record(7);
        let record: UseCaseRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.capability, Some(7));
        assert_eq!(record.business_function.as_deref(), Some("Function 7"));
        assert_eq!(record.stakeholder.as_deref(), Some("Analyst"));
        assert_eq!(record.expected_outcomes, None);
    }

    #[test]
    fn test_valid_total() {
        let mut page: UseCasePage = serde_json::from_value(json!({ "total": 45, "data": [] })).unwrap();
        assert_eq!(page.valid_total(), Some(45));

        page.total = Some(json!(0));
        assert_eq!(page.valid_total(), None);
        page.total = Some(json!(-3));
        assert_eq!(page.valid_total(), None);
        page.total = Some(json!("45"));
        assert_eq!(page.valid_total(), None);
        page.total = Some(json!(12.0));
        assert_eq!(page.valid_total(), Some(12));
        page.total = None;
        assert_eq!(page.valid_total(), None);
    }

    #[test]
    fn test_effective_page_size() {
        let page: UseCasePage = serde_json::from_value(json!({ "page_size": 50 })).unwrap();
        assert_eq!(page.effective_page_size(20), 50);

        let page: UseCasePage = serde_json::from_value(json!({ "page_size": 0 })).unwrap();
        assert_eq!(page.effective_page_size(20), 20);
    }

    #[test]
    fn test_position_identity() {
        let rows = key_rows(RowIdentity::Position, 2, 20, vec![record(900), record(901)]);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![41, 42]);
    }

    #[test]
    fn test_capability_identity() {
        let rows = key_rows(RowIdentity::Capability, 2, 20, vec![record(900), record(901)]);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![900, 901]);
    }

    #[test]
    fn test_odd_records_do_not_fail_the_page() {
        let page: UseCasePage = serde_json::from_value(json!({
            "total": 4,
            "data": [
                { "Capability": 1 },
                { "Capability": null, "Datasets": 12 },
                { "AI Use Case": true },
                { "Capability": "42", "Business Function": ["a"] },
            ]
        }))
        .unwrap();

        let caps: Vec<_> = page.data.iter().map(|r| r.capability).collect();
        assert_eq!(caps, vec![Some(1), None, None, Some(42)]);
        assert_eq!(page.data[1].datasets.as_deref(), Some("12"));
        assert_eq!(page.data[2].use_case.as_deref(), Some("true"));
        assert_eq!(page.data[3].business_function.as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn test_capability_identity_falls_back_to_position() {
        let page: UseCasePage = serde_json::from_value(json!({
            "data": [{ "Capability": 900 }, { "Capability": null }, {}]
        }))
        .unwrap();

        let rows = key_rows(RowIdentity::Capability, 1, 20, page.data.clone());
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![900, 22, 23]);

        let rows = key_rows(RowIdentity::Position, 1, 20, page.data);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![21, 22, 23]);
    }

    #[test]
    fn test_identity_config_names() {
        let identity: RowIdentity = serde_json::from_str(r#""capability""#).unwrap();
        assert_eq!(identity, RowIdentity::Capability);
        assert_eq!(serde_json::to_string(&RowIdentity::Position).unwrap(), r#""position""#);
    }
}

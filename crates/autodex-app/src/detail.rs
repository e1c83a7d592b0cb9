// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::{MakeId, TrimId};

const FIELD_PREFIX: &str = "model_";

pub const SPEC_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Engine & Power",
        &[
            "model_engine_type",
            "model_engine_compression",
            "model_engine_fuel",
            "model_engine_power_hp",
            "model_engine_power_ps",
            "model_engine_power_kw",
            "model_engine_power_rpm",
            "model_engine_torque_nm",
            "model_engine_torque_lbft",
            "model_engine_torque_rpm",
            "model_engine_valves_per_cyl",
        ],
    ),
    (
        "Performance",
        &[
            "model_top_speed_kph",
            "model_top_speed_mph",
            "model_0_to_100_kph",
            "model_lkm_hwy",
            "model_lkm_mixed",
            "model_lkm_city",
        ],
    ),
    (
        "Transmission & Drivetrain",
        &["model_transmission_type", "model_drive", "model_gears"],
    ),
    (
        "Dimensions & Weight",
        &[
            "model_weight_kg",
            "model_length_mm",
            "model_width_mm",
            "model_height_mm",
            "model_wheelbase_mm",
            "model_seats",
            "model_doors",
        ],
    ),
    (
        "General Info",
        &[
            "model_body",
            "model_engine_position",
            "model_engine_bore_mm",
            "model_engine_stroke_mm",
            "model_engine_cc",
            "model_sold_in_us",
        ],
    ),
];

/// Flat spec table for one trim, values normalized to strings.
pub type DetailRecord = BTreeMap<String, String>;

/// Every trim's spec table for one make, fetched as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailTable {
    records: HashMap<TrimId, DetailRecord>,
}

impl DetailTable {
    pub fn new(records: HashMap<TrimId, DetailRecord>) -> Self {
        Self { records }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("decode detail table")?;
        let Value::Object(entries) = value else {
            bail!("detail table must be a JSON object keyed by trim id");
        };

        let mut records = HashMap::with_capacity(entries.len());
        for (trim_id, fields) in entries {
            let Value::Object(fields) = fields else {
                bail!("detail record for trim {trim_id} must be a JSON object");
            };
            let record = fields
                .into_iter()
                .filter_map(|(key, value)| normalize_value(value).map(|value| (key, value)))
                .collect::<DetailRecord>();
            records.insert(TrimId::new(trim_id), record);
        }
        Ok(Self { records })
    }

    pub fn get(&self, trim_id: &TrimId) -> Option<&DetailRecord> {
        self.records.get(trim_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn normalize_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) if number.as_f64() == Some(0.0) => Some("0".to_owned()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_owned()),
        other => Some(other.to_string()),
    }
}

/// Where per-make detail tables come from.
pub trait DetailSource {
    fn fetch_make_details(&mut self, make_id: &MakeId) -> Result<DetailTable>;
}

/// Per-make detail tables fetched so far. Grows for the whole session and
/// never evicts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailCache {
    tables: HashMap<MakeId, DetailTable>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, make_id: &MakeId) -> bool {
        self.tables.contains_key(make_id)
    }

    pub fn get(&self, make_id: &MakeId) -> Option<&DetailTable> {
        self.tables.get(make_id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the cached table for `make_id`, fetching it first if this is
    /// the first request for that make. A failed fetch leaves the cache
    /// untouched.
    pub fn get_or_fetch<S>(&mut self, make_id: &MakeId, source: &mut S) -> Result<&DetailTable>
    where
        S: DetailSource + ?Sized,
    {
        if !self.tables.contains_key(make_id) {
            debug!(make = %make_id, "detail cache miss");
            let table = source
                .fetch_make_details(make_id)
                .with_context(|| format!("load details for make {make_id}"))?;
            info!(make = %make_id, trims = table.len(), "cached make details");
            self.tables.insert(make_id.clone(), table);
        } else {
            debug!(make = %make_id, "detail cache hit");
        }
        self.tables
            .get(make_id)
            .ok_or_else(|| anyhow!("detail cache lost entry for make {make_id}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecField {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCategory {
    pub name: &'static str,
    pub fields: Vec<SpecField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub make_id: MakeId,
    pub trim_id: TrimId,
    pub title: String,
    pub categories: Vec<SpecCategory>,
}

/// Resolves the full spec record for one trim and organizes it for display.
pub fn present_detail<S>(
    cache: &mut DetailCache,
    source: &mut S,
    make_id: &MakeId,
    trim_id: &TrimId,
) -> Result<DetailView>
where
    S: DetailSource + ?Sized,
{
    let table = cache.get_or_fetch(make_id, source)?;
    let record = table.get(trim_id).ok_or_else(|| {
        anyhow!(
            "trim {trim_id} is missing from the detail table of make {make_id}; the catalog index and detail data disagree"
        )
    })?;

    Ok(DetailView {
        make_id: make_id.clone(),
        trim_id: trim_id.clone(),
        title: detail_title(record, make_id, trim_id),
        categories: categorize(record),
    })
}

pub fn categorize(record: &DetailRecord) -> Vec<SpecCategory> {
    SPEC_CATEGORIES
        .iter()
        .filter_map(|(name, keys)| {
            let fields = keys
                .iter()
                .filter_map(|key| {
                    let value = record.get(*key)?;
                    is_displayable(value).then(|| SpecField {
                        key: (*key).to_owned(),
                        label: field_label(key),
                        value: value.clone(),
                    })
                })
                .collect::<Vec<_>>();
            (!fields.is_empty()).then_some(SpecCategory {
                name: *name,
                fields,
            })
        })
        .collect()
}

/// `false` for the sentinels marking an inapplicable field. Matching is
/// exact: `"none"` and `" 0"` are real values.
pub fn is_displayable(value: &str) -> bool {
    !value.is_empty() && value != "0" && value != "None"
}

pub fn field_label(key: &str) -> String {
    key.strip_prefix(FIELD_PREFIX)
        .unwrap_or(key)
        .replace('_', " ")
}

fn detail_title(record: &DetailRecord, make_id: &MakeId, trim_id: &TrimId) -> String {
    let parts = ["model_year", "make_display", "model_name"]
        .iter()
        .filter_map(|key| record.get(*key))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        format!("{make_id} {trim_id}")
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DetailCache, DetailRecord, DetailSource, DetailTable, categorize, field_label,
        is_displayable, present_detail,
    };
    use crate::{MakeId, TrimId};
    use anyhow::{Result, bail};

    struct CountingSource {
        fetches: usize,
        fail: bool,
    }

    impl DetailSource for CountingSource {
        fn fetch_make_details(&mut self, make_id: &MakeId) -> Result<DetailTable> {
            self.fetches += 1;
            if self.fail {
                bail!("offline");
            }
            assert_eq!(make_id.as_str(), "honda");
            DetailTable::from_json(
                r#"{"c2":{"model_year":"2022","make_display":"Honda","model_name":"Civic","model_engine_power_hp":"0","model_engine_type":"Inline-4","model_drive":"None","model_gears":6}}"#,
            )
        }
    }

    fn record(pairs: &[(&str, &str)]) -> DetailRecord {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn zero_field_is_omitted_but_category_survives() {
        let categories = categorize(&record(&[
            ("model_engine_power_hp", "0"),
            ("model_engine_torque_nm", "250"),
        ]));
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Engine & Power");
        assert_eq!(categories[0].fields.len(), 1);
        assert_eq!(categories[0].fields[0].label, "engine torque nm");
    }

    #[test]
    fn category_with_only_sentinels_is_omitted() {
        let categories = categorize(&record(&[
            ("model_transmission_type", "None"),
            ("model_drive", ""),
            ("model_gears", "0"),
            ("model_body", "Sedan"),
        ]));
        let names = categories.iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["General Info"]);
    }

    #[test]
    fn categories_and_fields_keep_fixed_order() {
        let categories = categorize(&record(&[
            ("model_doors", "4"),
            ("model_weight_kg", "1200"),
            ("model_top_speed_kph", "210"),
            ("model_engine_cc", "1998"),
            ("unrelated_key", "x"),
        ]));
        let names = categories.iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["Performance", "Dimensions & Weight", "General Info"]
        );
        let dims = categories[1]
            .fields
            .iter()
            .map(|f| f.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(dims, vec!["model_weight_kg", "model_doors"]);
    }

    #[test]
    fn labels_strip_first_prefix_only() {
        assert_eq!(field_label("model_0_to_100_kph"), "0 to 100 kph");
        assert_eq!(field_label("model_model_x"), "model x");
        assert_eq!(field_label("sold_in_us"), "sold in us");
    }

    #[test]
    fn sentinel_values_are_not_displayable() {
        assert!(!is_displayable(""));
        assert!(!is_displayable("0"));
        assert!(!is_displayable("None"));
        assert!(is_displayable("0.5"));
        assert!(is_displayable("Nonesuch"));
    }

    #[test]
    fn sentinel_matching_is_exact() {
        assert!(is_displayable("none"));
        assert!(is_displayable("NONE"));
        assert!(is_displayable(" None"));
        assert!(is_displayable("0 "));
    }

    #[test]
    fn numeric_and_null_values_are_normalized() -> Result<()> {
        let table = DetailTable::from_json(
            r#"{"t1":{"model_seats":5,"model_doors":0,"model_body":null,"model_lkm_city":7.5}}"#,
        )?;
        let record = table.get(&TrimId::from("t1")).expect("t1 present");
        assert_eq!(record.get("model_seats").map(String::as_str), Some("5"));
        assert_eq!(record.get("model_doors").map(String::as_str), Some("0"));
        assert_eq!(record.get("model_lkm_city").map(String::as_str), Some("7.5"));
        assert!(!record.contains_key("model_body"));
        Ok(())
    }

    #[test]
    fn false_flags_are_absent_and_true_flags_are_kept() -> Result<()> {
        let table = DetailTable::from_json(
            r#"{"t1":{"model_year":"2020","model_sold_in_us":false,"model_turbo":true}}"#,
        )?;
        let record = table.get(&TrimId::from("t1")).expect("t1 present");
        assert!(!record.contains_key("model_sold_in_us"));
        assert_eq!(record.get("model_turbo").map(String::as_str), Some("true"));
        Ok(())
    }

    #[test]
    fn non_object_table_is_rejected() {
        assert!(DetailTable::from_json("[]").is_err());
        assert!(DetailTable::from_json(r#"{"t1":"oops"}"#).is_err());
    }

    #[test]
    fn repeated_requests_fetch_once() -> Result<()> {
        let mut cache = DetailCache::new();
        let mut source = CountingSource {
            fetches: 0,
            fail: false,
        };
        let make = MakeId::from("honda");
        let trim = TrimId::from("c2");

        let first = present_detail(&mut cache, &mut source, &make, &trim)?;
        let second = present_detail(&mut cache, &mut source, &make, &trim)?;
        assert_eq!(source.fetches, 1);
        assert_eq!(first, second);
        assert_eq!(first.title, "2022 Honda Civic");
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_trim_is_reported_not_rendered_empty() {
        let mut cache = DetailCache::new();
        let mut source = CountingSource {
            fetches: 0,
            fail: false,
        };
        let error = present_detail(
            &mut cache,
            &mut source,
            &MakeId::from("honda"),
            &TrimId::from("c9"),
        )
        .expect_err("missing trim should fail");
        assert!(error.to_string().contains("trim c9 is missing"));
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let mut cache = DetailCache::new();
        let mut source = CountingSource {
            fetches: 0,
            fail: true,
        };
        let make = MakeId::from("honda");
        let trim = TrimId::from("c2");
        assert!(present_detail(&mut cache, &mut source, &make, &trim).is_err());
        assert!(present_detail(&mut cache, &mut source, &make, &trim).is_err());
        assert_eq!(source.fetches, 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn title_falls_back_to_ids() {
        let view_title = super::detail_title(
            &record(&[]),
            &MakeId::from("honda"),
            &TrimId::from("c1"),
        );
        assert_eq!(view_title, "honda c1");
    }
}

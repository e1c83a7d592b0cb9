// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{Catalog, MakeId, TrimId};

pub const YEAR_MIN_DEFAULT: i32 = 0;
pub const YEAR_MAX_DEFAULT: i32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub make_id: Option<MakeId>,
    pub model_name: Option<String>,
    pub trim_id: Option<TrimId>,
    pub keyword: String,
    pub year_min: i32,
    pub year_max: i32,
    // Region and body style have no counterpart in the index; see `matches`.
    pub us_only: bool,
    pub body_style: Option<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            make_id: None,
            model_name: None,
            trim_id: None,
            keyword: String::new(),
            year_min: YEAR_MIN_DEFAULT,
            year_max: YEAR_MAX_DEFAULT,
            us_only: false,
            body_style: None,
        }
    }
}

impl FilterCriteria {
    pub fn is_unfiltered(&self) -> bool {
        self.make_id.is_none()
            && self.model_name.is_none()
            && self.trim_id.is_none()
            && self.keyword.trim().is_empty()
            && self.year_min == YEAR_MIN_DEFAULT
            && self.year_max == YEAR_MAX_DEFAULT
    }
}

/// Flat projection of one trim with its enclosing make and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredRecord {
    pub make_id: MakeId,
    pub make_name: String,
    pub model_name: String,
    pub trim_id: TrimId,
    pub year: i32,
    pub trim_name: String,
}

/// Walks the catalog in stored order and keeps every trim that satisfies all
/// active predicates. The result is rebuilt from scratch on every call.
pub fn apply_filters(catalog: &Catalog, criteria: &FilterCriteria) -> Vec<FilteredRecord> {
    let keyword = criteria.keyword.to_lowercase();
    let mut records = Vec::new();

    for make in catalog.makes() {
        if criteria
            .make_id
            .as_ref()
            .is_some_and(|make_id| make_id != &make.id)
        {
            continue;
        }
        for model in &make.models {
            if criteria
                .model_name
                .as_deref()
                .is_some_and(|name| name != model.name)
            {
                continue;
            }
            for trim in &model.trims {
                if criteria
                    .trim_id
                    .as_ref()
                    .is_some_and(|trim_id| trim_id != &trim.id)
                {
                    continue;
                }
                if trim.year < criteria.year_min || trim.year > criteria.year_max {
                    continue;
                }
                if !keyword.is_empty() {
                    let full_name =
                        format!("{} {} {}", make.name, model.name, trim.match_label())
                            .to_lowercase();
                    if !full_name.contains(&keyword) {
                        continue;
                    }
                }

                records.push(FilteredRecord {
                    make_id: make.id.clone(),
                    make_name: make.name.clone(),
                    model_name: model.name.clone(),
                    trim_id: trim.id.clone(),
                    year: trim.year,
                    trim_name: trim.display_label().to_owned(),
                });
            }
        }
    }

    records
}

/// Parses a year bound the way a loose numeric form input is read: leading
/// digits win, and a blank, non-numeric, or zero value falls back to
/// `default`.
pub fn parse_year_bound(raw: &str, default: i32) -> i32 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(digits.len(), |(index, _)| index);

    match digits[..end].parse::<i32>() {
        Ok(0) | Err(_) => default,
        Ok(value) => sign * value,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FilterCriteria, YEAR_MAX_DEFAULT, YEAR_MIN_DEFAULT, apply_filters, parse_year_bound,
    };
    use crate::{Catalog, Make, MakeId, Model, Trim, TrimId};

    fn civic_catalog() -> Catalog {
        Catalog::new(vec![Make {
            id: MakeId::from("honda"),
            name: "Honda".to_owned(),
            models: vec![Model {
                name: "Civic".to_owned(),
                trims: vec![
                    Trim {
                        id: TrimId::from("c1"),
                        year: 2020,
                        label: None,
                    },
                    Trim {
                        id: TrimId::from("c2"),
                        year: 2022,
                        label: Some("Si".to_owned()),
                    },
                ],
            }],
        }])
    }

    #[test]
    fn year_min_keeps_only_newer_trim() {
        let criteria = FilterCriteria {
            year_min: 2021,
            ..FilterCriteria::default()
        };
        let records = apply_filters(&civic_catalog(), &criteria);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].make_name, "Honda");
        assert_eq!(records[0].model_name, "Civic");
        assert_eq!(records[0].year, 2022);
        assert_eq!(records[0].trim_name, "Si");
    }

    #[test]
    fn missing_label_displays_base_but_does_not_match_base_keyword() {
        let all = apply_filters(&civic_catalog(), &FilterCriteria::default());
        assert_eq!(all[0].trim_name, "Base");

        let criteria = FilterCriteria {
            keyword: "base".to_owned(),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&civic_catalog(), &criteria).is_empty());
    }

    #[test]
    fn keyword_spans_make_model_and_label() {
        let criteria = FilterCriteria {
            keyword: "honda civic si".to_owned(),
            ..FilterCriteria::default()
        };
        let records = apply_filters(&civic_catalog(), &criteria);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].trim_id, TrimId::from("c2"));
    }

    #[test]
    fn region_and_body_style_do_not_narrow_index_results() {
        let criteria = FilterCriteria {
            us_only: true,
            body_style: Some("coupe".to_owned()),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_filters(&civic_catalog(), &criteria).len(), 2);
        assert!(criteria.is_unfiltered());
    }

    #[test]
    fn year_bound_parsing_mirrors_loose_inputs() {
        assert_eq!(parse_year_bound("2021", YEAR_MIN_DEFAULT), 2021);
        assert_eq!(parse_year_bound(" 1999xyz", YEAR_MIN_DEFAULT), 1999);
        assert_eq!(parse_year_bound("", YEAR_MAX_DEFAULT), YEAR_MAX_DEFAULT);
        assert_eq!(parse_year_bound("any", YEAR_MAX_DEFAULT), YEAR_MAX_DEFAULT);
        assert_eq!(parse_year_bound("0", YEAR_MAX_DEFAULT), YEAR_MAX_DEFAULT);
        assert_eq!(parse_year_bound("-5", YEAR_MIN_DEFAULT), -5);
    }
}

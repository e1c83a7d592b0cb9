// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FilteredRecord, TOTAL_SPECS, ViewKind};

/// Display caps, not pagination cursors: records past the cap are not
/// reachable from the grid or table.
pub const GRID_DISPLAY_CAP: usize = 50;
pub const TABLE_DISPLAY_CAP: usize = 100;

pub const TABLE_COLUMNS: [&str; 5] = ["make", "model", "year", "trim", ""];
pub const SPECS_ACTION_LABEL: &str = "specs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCard {
    pub badge: String,
    pub make: String,
    pub model: String,
    pub trim: String,
}

pub fn display_cap(view: ViewKind) -> Option<usize> {
    match view {
        ViewKind::Grid => Some(GRID_DISPLAY_CAP),
        ViewKind::Table => Some(TABLE_DISPLAY_CAP),
        ViewKind::Tree => None,
    }
}

/// The prefix of `records` a flat view shows. The tree takes everything.
pub fn capped_records(view: ViewKind, records: &[FilteredRecord]) -> &[FilteredRecord] {
    match display_cap(view) {
        Some(cap) => &records[..records.len().min(cap)],
        None => records,
    }
}

pub fn grid_cards(records: &[FilteredRecord]) -> Vec<GridCard> {
    capped_records(ViewKind::Grid, records)
        .iter()
        .map(|record| GridCard {
            badge: record.year.to_string(),
            make: record.make_name.clone(),
            model: record.model_name.clone(),
            trim: record.trim_name.clone(),
        })
        .collect()
}

pub fn table_rows(records: &[FilteredRecord]) -> Vec<[String; 5]> {
    capped_records(ViewKind::Table, records)
        .iter()
        .map(|record| {
            [
                record.make_name.clone(),
                record.model_name.clone(),
                record.year.to_string(),
                record.trim_name.clone(),
                SPECS_ACTION_LABEL.to_owned(),
            ]
        })
        .collect()
}

pub fn result_count_text(matched: usize) -> String {
    format!("Displaying {matched} of {TOTAL_SPECS} specifications")
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ids::*;

/// Size of the full specification corpus, independent of how much of it the
/// loaded index covers. Used as the denominator of the result count.
pub const TOTAL_SPECS: usize = 78_864;

pub const DEFAULT_TRIM_LABEL: &str = "Base";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trim {
    #[serde(rename = "i")]
    pub id: TrimId,
    #[serde(rename = "y")]
    pub year: i32,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Trim {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_TRIM_LABEL)
    }

    /// Label used for keyword matching; a missing label matches as empty.
    pub fn match_label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "t", default)]
    pub trims: Vec<Trim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Make {
    #[serde(rename = "i")]
    pub id: MakeId,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "m", default)]
    pub models: Vec<Model>,
}

impl Make {
    pub fn find_model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// The make → model → trim index. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    makes: Vec<Make>,
}

impl Catalog {
    pub fn new(makes: Vec<Make>) -> Self {
        Self { makes }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let makes: Vec<Make> =
            serde_json::from_str(raw).context("decode catalog index (expected a JSON array)")?;
        Ok(Self::new(makes))
    }

    pub fn makes(&self) -> &[Make] {
        &self.makes
    }

    pub fn find_make(&self, id: &MakeId) -> Option<&Make> {
        self.makes.iter().find(|make| &make.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.makes.is_empty()
    }

    pub fn trim_count(&self) -> usize {
        self.makes
            .iter()
            .flat_map(|make| &make.models)
            .map(|model| model.trims.len())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewKind {
    Grid,
    Table,
    #[default]
    Tree,
}

impl ViewKind {
    pub const ALL: [Self; 3] = [Self::Grid, Self::Table, Self::Tree];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Table => "table",
            Self::Tree => "tree",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "grid" => Some(Self::Grid),
            "table" | "list" => Some(Self::Table),
            "tree" => Some(Self::Tree),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Table => "list",
            Self::Tree => "tree",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

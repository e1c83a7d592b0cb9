// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use std::cmp::Ordering;

use crate::{Catalog, Make, MakeId, TrimId};

pub const NEWEST_SELECTABLE_YEAR: i32 = 2025;
pub const OLDEST_SELECTABLE_YEAR: i32 = 1940;

const ALL_MAKES: &str = "All Makes";
const ALL_MODELS: &str = "All Models";
const ALL_TRIMS: &str = "All Trims";
const SELECT_MAKE_FIRST: &str = "Select Make first";
const SELECT_MODEL_FIRST: &str = "Select Model first";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// One dropdown: its options, the chosen value (`None` means "all"), and
/// whether it currently accepts input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub options: Vec<SelectOption>,
    pub selected: Option<String>,
    pub enabled: bool,
    pub placeholder: &'static str,
}

impl Selector {
    fn disabled(placeholder: &'static str) -> Self {
        Self {
            options: Vec::new(),
            selected: None,
            enabled: false,
            placeholder,
        }
    }

    fn populated(placeholder: &'static str, options: Vec<SelectOption>) -> Self {
        Self {
            options,
            selected: None,
            enabled: true,
            placeholder,
        }
    }

    pub fn selected_label(&self) -> &str {
        self.selected
            .as_deref()
            .and_then(|value| self.options.iter().find(|option| option.value == value))
            .map_or(self.placeholder, |option| option.label.as_str())
    }

    /// Value reached by moving `delta` steps through `[all, options...]`,
    /// wrapping at both ends. A disabled selector stays at "all".
    pub fn step(&self, delta: isize) -> Option<String> {
        if !self.enabled || self.options.is_empty() {
            return None;
        }
        let current = self
            .selected
            .as_deref()
            .and_then(|value| self.options.iter().position(|option| option.value == value))
            .map_or(0, |index| index + 1) as isize;
        let len = self.options.len() as isize + 1;
        let next = (current + delta).rem_euclid(len) as usize;
        next.checked_sub(1)
            .map(|index| self.options[index].value.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorState {
    pub make: Selector,
    pub model: Selector,
    pub trim: Selector,
}

impl SelectorState {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            make: Selector::populated(ALL_MAKES, make_options(catalog)),
            model: Selector::disabled(SELECT_MAKE_FIRST),
            trim: Selector::disabled(SELECT_MODEL_FIRST),
        }
    }

    /// Rebuilds the model selector for `make_id` and resets the trim selector.
    /// Clearing the make disables both dependents.
    pub fn select_make(&mut self, catalog: &Catalog, make_id: Option<&MakeId>) -> Result<()> {
        self.trim = Selector::disabled(SELECT_MODEL_FIRST);
        let Some(make_id) = make_id else {
            self.make.selected = None;
            self.model = Selector::disabled(SELECT_MAKE_FIRST);
            return Ok(());
        };

        let options = model_options(catalog, make_id)?;
        self.make.selected = Some(make_id.as_str().to_owned());
        self.model = Selector::populated(ALL_MODELS, options);
        Ok(())
    }

    /// Rebuilds the trim selector for the currently selected make.
    pub fn select_model(&mut self, catalog: &Catalog, model_name: Option<&str>) -> Result<()> {
        let Some(model_name) = model_name else {
            self.model.selected = None;
            self.trim = Selector::disabled(SELECT_MODEL_FIRST);
            return Ok(());
        };
        let make_id = self
            .make
            .selected
            .as_deref()
            .map(MakeId::from)
            .ok_or_else(|| anyhow!("cannot select model {model_name:?} before a make"))?;

        let options = trim_options(catalog, &make_id, model_name)?;
        self.model.selected = Some(model_name.to_owned());
        self.trim = Selector::populated(ALL_TRIMS, options);
        Ok(())
    }

    pub fn select_trim(&mut self, trim_id: Option<&TrimId>) -> Result<()> {
        let Some(trim_id) = trim_id else {
            self.trim.selected = None;
            return Ok(());
        };
        if !self.trim.enabled {
            bail!("cannot select trim {trim_id} before a model");
        }
        if !self
            .trim
            .options
            .iter()
            .any(|option| option.value == trim_id.as_str())
        {
            bail!("trim {trim_id} is not offered for the selected model");
        }
        self.trim.selected = Some(trim_id.as_str().to_owned());
        Ok(())
    }
}

pub fn make_options(catalog: &Catalog) -> Vec<SelectOption> {
    let mut makes = catalog.makes().iter().collect::<Vec<_>>();
    makes.sort_by(|a, b| compare_names(&a.name, &b.name));
    makes
        .into_iter()
        .map(|make| SelectOption {
            value: make.id.as_str().to_owned(),
            label: make.name.clone(),
        })
        .collect()
}

pub fn model_options(catalog: &Catalog, make_id: &MakeId) -> Result<Vec<SelectOption>> {
    let make = find_make(catalog, make_id)?;
    let mut names = make
        .models
        .iter()
        .map(|model| model.name.as_str())
        .collect::<Vec<_>>();
    names.sort_by(|a, b| compare_names(a, b));
    Ok(names
        .into_iter()
        .map(|name| SelectOption {
            value: name.to_owned(),
            label: name.to_owned(),
        })
        .collect())
}

pub fn trim_options(
    catalog: &Catalog,
    make_id: &MakeId,
    model_name: &str,
) -> Result<Vec<SelectOption>> {
    let make = find_make(catalog, make_id)?;
    let model = make.find_model(model_name).ok_or_else(|| {
        anyhow!(
            "model {model_name:?} not found under make {make_id}; the catalog index may be stale"
        )
    })?;
    let mut trims = model.trims.iter().collect::<Vec<_>>();
    trims.sort_by(|a, b| b.year.cmp(&a.year));
    Ok(trims
        .into_iter()
        .map(|trim| SelectOption {
            value: trim.id.as_str().to_owned(),
            label: format!("{} {}", trim.year, trim.display_label()),
        })
        .collect())
}

/// Years offered by the year range selectors, newest first.
pub fn year_options() -> Vec<i32> {
    (OLDEST_SELECTABLE_YEAR..=NEWEST_SELECTABLE_YEAR)
        .rev()
        .collect()
}

fn find_make<'a>(catalog: &'a Catalog, make_id: &MakeId) -> Result<&'a Make> {
    catalog.find_make(make_id).ok_or_else(|| {
        anyhow!("make {make_id} not found in the catalog; the catalog index may be stale")
    })
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

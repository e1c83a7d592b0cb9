// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    Catalog, DetailCache, DetailSource, DetailView, FilterCriteria, FilteredRecord, MakeId,
    ResultTree, SelectorState, TrimId, apply_filters, present_detail,
};

/// Application context: the loaded catalog, the session's detail cache, and
/// everything derived from the current filter criteria.
///
/// All UI input funnels through the `on_*` handlers. Each filter change
/// recomputes the flat result list and rebuilds the tree from it; nothing
/// else triggers a recompute.
#[derive(Debug, Clone)]
pub struct Browser {
    catalog: Catalog,
    details: DetailCache,
    criteria: FilterCriteria,
    selectors: SelectorState,
    filtered: Vec<FilteredRecord>,
    tree: ResultTree,
    filter_runs: usize,
}

impl Browser {
    pub fn new(catalog: Catalog) -> Self {
        let selectors = SelectorState::new(&catalog);
        let mut browser = Self {
            catalog,
            details: DetailCache::new(),
            criteria: FilterCriteria::default(),
            selectors,
            filtered: Vec::new(),
            tree: ResultTree::default(),
            filter_runs: 0,
        };
        browser.refilter();
        browser
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selectors(&self) -> &SelectorState {
        &self.selectors
    }

    pub fn filtered(&self) -> &[FilteredRecord] {
        &self.filtered
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ResultTree {
        &mut self.tree
    }

    pub fn details(&self) -> &DetailCache {
        &self.details
    }

    /// How many times the filter has run since construction.
    pub fn filter_runs(&self) -> usize {
        self.filter_runs
    }

    /// Replaces the criteria wholesale. Selector state is re-derived for any
    /// make/model/trim that changed; an id unknown to the catalog rejects the
    /// whole change and leaves the previous criteria in place.
    pub fn on_filter_changed(&mut self, criteria: FilterCriteria) -> Result<()> {
        let mut selectors = self.selectors.clone();
        if criteria.make_id.as_ref().map(MakeId::as_str) != selectors.make.selected.as_deref() {
            selectors.select_make(&self.catalog, criteria.make_id.as_ref())?;
        }
        if criteria.model_name.as_deref() != selectors.model.selected.as_deref() {
            selectors.select_model(&self.catalog, criteria.model_name.as_deref())?;
        }
        if criteria.trim_id.as_ref().map(TrimId::as_str) != selectors.trim.selected.as_deref() {
            selectors.select_trim(criteria.trim_id.as_ref())?;
        }

        self.selectors = selectors;
        self.criteria = criteria;
        self.refilter();
        Ok(())
    }

    /// Applies `edit` to a copy of the current criteria and submits it.
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut FilterCriteria)) -> Result<()> {
        let mut criteria = self.criteria.clone();
        edit(&mut criteria);
        self.on_filter_changed(criteria)
    }

    /// Selecting a make clears the model and trim below it.
    pub fn on_make_selected(&mut self, make_id: Option<MakeId>) -> Result<()> {
        self.update_criteria(|criteria| {
            criteria.make_id = make_id;
            criteria.model_name = None;
            criteria.trim_id = None;
        })
    }

    /// Selecting a model clears the trim below it.
    pub fn on_model_selected(&mut self, model_name: Option<String>) -> Result<()> {
        self.update_criteria(|criteria| {
            criteria.model_name = model_name;
            criteria.trim_id = None;
        })
    }

    pub fn on_trim_selected(&mut self, trim_id: Option<TrimId>) -> Result<()> {
        self.update_criteria(|criteria| criteria.trim_id = trim_id)
    }

    pub fn on_detail_requested<S>(
        &mut self,
        make_id: &MakeId,
        trim_id: &TrimId,
        source: &mut S,
    ) -> Result<DetailView>
    where
        S: DetailSource + ?Sized,
    {
        present_detail(&mut self.details, source, make_id, trim_id)
            .with_context(|| format!("show specs for {make_id}/{trim_id}"))
    }

    fn refilter(&mut self) {
        self.filtered = apply_filters(&self.catalog, &self.criteria);
        self.tree = ResultTree::build(&self.filtered);
        self.filter_runs += 1;
        debug!(
            matched = self.filtered.len(),
            runs = self.filter_runs,
            "filter applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::Browser;
    use crate::{
        Catalog, DetailSource, DetailTable, FilterCriteria, Make, MakeId, Model, Trim, TrimId,
    };
    use anyhow::Result;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Make {
                id: MakeId::from("toyota"),
                name: "Toyota".to_owned(),
                models: vec![
                    Model {
                        name: "Supra".to_owned(),
                        trims: vec![Trim {
                            id: TrimId::from("s1"),
                            year: 1994,
                            label: Some("Turbo".to_owned()),
                        }],
                    },
                    Model {
                        name: "Corolla".to_owned(),
                        trims: vec![Trim {
                            id: TrimId::from("co1"),
                            year: 2019,
                            label: None,
                        }],
                    },
                ],
            },
            Make {
                id: MakeId::from("honda"),
                name: "Honda".to_owned(),
                models: vec![Model {
                    name: "Civic".to_owned(),
                    trims: vec![Trim {
                        id: TrimId::from("c1"),
                        year: 2020,
                        label: None,
                    }],
                }],
            },
        ])
    }

    struct TableSource;

    impl DetailSource for TableSource {
        fn fetch_make_details(&mut self, _make_id: &MakeId) -> Result<DetailTable> {
            DetailTable::from_json(r#"{"s1":{"model_engine_type":"Inline-6"}}"#)
        }
    }

    #[test]
    fn new_browser_shows_everything() {
        let browser = Browser::new(catalog());
        assert_eq!(browser.filtered().len(), 3);
        assert_eq!(browser.tree().roots().len(), 2);
        assert_eq!(browser.filter_runs(), 1);
    }

    #[test]
    fn make_then_model_cascade_narrows_results() -> Result<()> {
        let mut browser = Browser::new(catalog());

        browser.on_make_selected(Some(MakeId::from("toyota")))?;
        assert_eq!(browser.filtered().len(), 2);
        assert!(browser.selectors().model.enabled);

        browser.on_model_selected(Some("Supra".to_owned()))?;
        assert_eq!(browser.filtered().len(), 1);
        assert!(browser.selectors().trim.enabled);

        browser.on_trim_selected(Some(TrimId::from("s1")))?;
        assert_eq!(browser.filtered()[0].trim_name, "Turbo");

        browser.on_model_selected(None)?;
        assert_eq!(browser.criteria().trim_id, None);
        assert!(!browser.selectors().trim.enabled);
        assert_eq!(browser.filtered().len(), 2);
        Ok(())
    }

    #[test]
    fn changing_make_clears_model_and_trim() -> Result<()> {
        let mut browser = Browser::new(catalog());
        browser.on_make_selected(Some(MakeId::from("toyota")))?;
        browser.on_model_selected(Some("Supra".to_owned()))?;

        browser.on_make_selected(Some(MakeId::from("honda")))?;
        assert_eq!(browser.criteria().model_name, None);
        assert_eq!(browser.filtered().len(), 1);
        assert_eq!(browser.filtered()[0].model_name, "Civic");
        Ok(())
    }

    #[test]
    fn unknown_make_keeps_previous_criteria() -> Result<()> {
        let mut browser = Browser::new(catalog());
        browser.on_make_selected(Some(MakeId::from("honda")))?;

        let error = browser
            .on_make_selected(Some(MakeId::from("saab")))
            .expect_err("unknown make should fail");
        assert!(error.to_string().contains("not found"));
        assert_eq!(browser.criteria().make_id, Some(MakeId::from("honda")));
        assert_eq!(browser.filtered().len(), 1);
        Ok(())
    }

    #[test]
    fn keyword_change_goes_through_filter_handler() -> Result<()> {
        let mut browser = Browser::new(catalog());
        browser.on_filter_changed(FilterCriteria {
            keyword: "SUPRA".to_owned(),
            ..FilterCriteria::default()
        })?;
        assert_eq!(browser.filtered().len(), 1);
        assert_eq!(browser.filter_runs(), 2);
        Ok(())
    }

    #[test]
    fn detail_request_fills_cache() -> Result<()> {
        let mut browser = Browser::new(catalog());
        let view = browser.on_detail_requested(
            &MakeId::from("toyota"),
            &TrimId::from("s1"),
            &mut TableSource,
        )?;
        assert_eq!(view.categories[0].fields[0].value, "Inline-6");
        assert!(browser.details().contains(&MakeId::from("toyota")));
        Ok(())
    }
}

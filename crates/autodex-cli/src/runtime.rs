// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use autodex_app::{DetailSource, DetailTable, MakeId, Theme};
use autodex_db::Store;
use autodex_source::DataSource;

/// Wires the catalog source and the preference store into the browser loop.
pub struct CatalogRuntime<'a> {
    source: DataSource,
    store: &'a Store,
}

impl<'a> CatalogRuntime<'a> {
    pub fn new(source: DataSource, store: &'a Store) -> Self {
        Self { source, store }
    }
}

impl DetailSource for CatalogRuntime<'_> {
    fn fetch_make_details(&mut self, make_id: &MakeId) -> Result<DetailTable> {
        self.source.fetch_make_details(make_id)
    }
}

impl autodex_tui::AppRuntime for CatalogRuntime<'_> {
    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.put_theme(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogRuntime;
    use anyhow::Result;
    use autodex_app::{Browser, MakeId, Theme, TrimId};
    use autodex_db::Store;
    use autodex_source::{DataSource, DirectorySource};
    use autodex_testkit::{honda_catalog, honda_detail_json, temp_data_dir};
    use autodex_tui::AppRuntime;

    #[test]
    fn save_theme_writes_through_to_store() -> Result<()> {
        let (_dir, root) = temp_data_dir(&honda_catalog(), &[])?;
        let store = Store::open_memory()?;
        store.bootstrap()?;

        let mut runtime =
            CatalogRuntime::new(DataSource::Directory(DirectorySource::new(&root)?), &store);
        runtime.save_theme(Theme::Light)?;
        assert_eq!(store.get_theme()?, Theme::Light);
        Ok(())
    }

    #[test]
    fn detail_requests_read_from_source() -> Result<()> {
        let (_dir, root) = temp_data_dir(&honda_catalog(), &[("honda", honda_detail_json())])?;
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let source = DataSource::Directory(DirectorySource::new(&root)?);
        let mut browser = Browser::new(source.load_catalog()?);
        let mut runtime = CatalogRuntime::new(source, &store);

        let detail = browser.on_detail_requested(
            &MakeId::from("honda"),
            &TrimId::from("c2"),
            &mut runtime,
        )?;
        assert_eq!(detail.title, "2022 Honda Civic");
        assert!(browser.details().contains(&MakeId::from("honda")));
        Ok(())
    }

    #[test]
    fn missing_detail_file_is_an_error() -> Result<()> {
        let (_dir, root) = temp_data_dir(&honda_catalog(), &[])?;
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let source = DataSource::Directory(DirectorySource::new(&root)?);
        let mut browser = Browser::new(source.load_catalog()?);
        let mut runtime = CatalogRuntime::new(source, &store);

        let error = browser
            .on_detail_requested(&MakeId::from("honda"), &TrimId::from("c1"), &mut runtime)
            .expect_err("no detail file was written");
        assert!(format!("{error:#}").contains("honda.json"));
        assert!(browser.details().is_empty());
        Ok(())
    }
}

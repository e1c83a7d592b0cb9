// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use autodex_app::{Catalog, DetailSource, DetailTable, MakeId};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const INDEX_FILE: &str = "index.json";
pub const DETAILS_DIR: &str = "details";

/// Fetches the catalog index and per-make detail tables over HTTP.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("data.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("data.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "data.base_url {trimmed:?} must use http or https; use data.data_dir for local files"
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("data.base_url {trimmed:?} cannot be used as a base URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn index_url(&self) -> Result<Url> {
        self.endpoint(&[INDEX_FILE])
    }

    /// The detail endpoint for one make. The id is percent-encoded as a single
    /// path segment.
    pub fn details_url(&self, make_id: &MakeId) -> Result<Url> {
        self.endpoint(&[DETAILS_DIR, &format!("{make_id}.json")])
    }

    pub fn fetch_catalog(&self) -> Result<Catalog> {
        let url = self.index_url()?;
        let body = self.get_text(&url)?;
        let catalog = Catalog::from_json(&body).with_context(|| format!("read {url}"))?;
        info!(
            makes = catalog.makes().len(),
            trims = catalog.trim_count(),
            %url,
            "loaded catalog index"
        );
        Ok(catalog)
    }

    pub fn fetch_make_details(&self, make_id: &MakeId) -> Result<DetailTable> {
        let url = self.details_url(make_id)?;
        let body = self.get_text(&url)?;
        let table = DetailTable::from_json(&body).with_context(|| format!("read {url}"))?;
        debug!(make = %make_id, trims = table.len(), "fetched make details");
        Ok(table)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("data.base_url {} cannot take path segments", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_text(&self, url: &Url) -> Result<String> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), %url, "data request failed");
            return Err(clean_error_response(status, url, &body));
        }
        response.text().with_context(|| format!("read body of {url}"))
    }
}

/// Reads the same layout as the HTTP source from a local directory:
/// `<root>/index.json` and `<root>/details/<make>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!(
                "data directory {} does not exist; point data.data_dir at a folder containing {INDEX_FILE}",
                root.display()
            );
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn details_path(&self, make_id: &MakeId) -> Result<PathBuf> {
        let id = make_id.as_str();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            bail!("make id {id:?} cannot be used as a file name");
        }
        Ok(self.root.join(DETAILS_DIR).join(format!("{id}.json")))
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = self.index_path();
        let body = read_file(&path)?;
        let catalog =
            Catalog::from_json(&body).with_context(|| format!("read {}", path.display()))?;
        info!(
            makes = catalog.makes().len(),
            trims = catalog.trim_count(),
            path = %path.display(),
            "loaded catalog index"
        );
        Ok(catalog)
    }

    pub fn load_make_details(&self, make_id: &MakeId) -> Result<DetailTable> {
        let path = self.details_path(make_id)?;
        let body = read_file(&path)?;
        let table =
            DetailTable::from_json(&body).with_context(|| format!("read {}", path.display()))?;
        debug!(make = %make_id, trims = table.len(), "read make details");
        Ok(table)
    }
}

/// Where catalog data comes from for this session.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http(Client),
    Directory(DirectorySource),
}

impl DataSource {
    pub fn load_catalog(&self) -> Result<Catalog> {
        match self {
            Self::Http(client) => client.fetch_catalog(),
            Self::Directory(dir) => dir.load_catalog(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(client) => f.write_str(client.base_url()),
            Self::Directory(dir) => write!(f, "{}", dir.root().display()),
        }
    }
}

impl DetailSource for DataSource {
    fn fetch_make_details(&mut self, make_id: &MakeId) -> Result<DetailTable> {
        match self {
            Self::Http(client) => client.fetch_make_details(make_id),
            Self::Directory(dir) => dir.load_make_details(make_id),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| {
        format!(
            "read {}; check that data.data_dir points at an exported catalog",
            path.display()
        )
    })
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "request to {base_url} timed out -- raise data.timeout or check the server ({error})"
        );
    }
    anyhow!("cannot reach {base_url} -- start the catalog server or fix data.base_url ({error})")
}

fn clean_error_response(status: StatusCode, url: &Url, body: &str) -> anyhow::Error {
    if status == StatusCode::NOT_FOUND {
        return anyhow!("{url} not found (404); the catalog data may be incomplete");
    }
    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }
    anyhow!("server returned {} for {url}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::{Client, DirectorySource};
    use autodex_app::MakeId;
    use std::time::Duration;

    #[test]
    fn new_rejects_bad_base_urls() {
        for bad in ["", "   ", "not a url", "ftp://example.com/data", "mailto:a@b.c"] {
            assert!(
                Client::new(bad, Duration::from_secs(1)).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn endpoints_append_to_base_path() {
        let client = Client::new("http://localhost:8000/web_data/", Duration::from_secs(1))
            .expect("valid client");
        assert_eq!(
            client.index_url().expect("index url").as_str(),
            "http://localhost:8000/web_data/index.json"
        );
        assert_eq!(
            client
                .details_url(&MakeId::from("alfa romeo"))
                .expect("details url")
                .as_str(),
            "http://localhost:8000/web_data/details/alfa%20romeo.json"
        );
    }

    #[test]
    fn make_id_is_one_path_segment() {
        let client =
            Client::new("http://localhost:8000/data", Duration::from_secs(1)).expect("valid");
        let url = client
            .details_url(&MakeId::from("a/b"))
            .expect("details url");
        assert_eq!(url.path(), "/data/details/a%2Fb.json");
    }

    #[test]
    fn directory_source_rejects_path_like_make_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = DirectorySource::new(dir.path()).expect("existing dir");
        assert!(source.details_path(&MakeId::from("../secrets")).is_err());
        assert!(source.details_path(&MakeId::from("..")).is_err());
        assert!(source.details_path(&MakeId::from(".")).is_err());
        assert!(source.details_path(&MakeId::from("")).is_err());
        assert!(source.details_path(&MakeId::from(r"a\b")).is_err());
        assert!(source.details_path(&MakeId::from("honda")).is_ok());
        assert!(source.details_path(&MakeId::from("mercedes.benz")).is_ok());
        assert!(source.details_path(&MakeId::from("..honda")).is_ok());
    }

    #[test]
    fn directory_source_requires_existing_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = DirectorySource::new(dir.path().join("missing"))
            .expect_err("missing dir should fail");
        assert!(error.to_string().contains("data.data_dir"));
    }
}

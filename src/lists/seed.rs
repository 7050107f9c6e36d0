use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::List;
use crate::error::{Result, StoreError};

const BUNDLED_LISTS: &str = include_str!("../../assets/lists.json");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the default lists come from when nothing is cached yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedSource {
    Bundled,
    File(PathBuf),
    Url(String),
}

impl SeedSource {
    /// `http://` and `https://` values are fetched, anything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            SeedSource::Url(value.to_string())
        } else {
            SeedSource::File(PathBuf::from(value))
        }
    }

    pub fn fetch(&self) -> Result<Vec<List>> {
        let body = match self {
            SeedSource::Bundled => BUNDLED_LISTS.to_string(),
            SeedSource::File(path) => {
                fs::read_to_string(path).map_err(|source| StoreError::Read {
                    path: path.clone(),
                    source,
                })?
            }
            SeedSource::Url(url) => fetch_url(url)?,
        };
        debug!(source = ?self, bytes = body.len(), "seed lists fetched");
        Ok(serde_json::from_str(&body)?)
    }
}

fn fetch_url(url: &str) -> Result<String> {
    let fetch_error = |source| StoreError::Fetch {
        url: url.to_string(),
        source,
    };
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(fetch_error)?;
    let response = client.get(url).send().map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(fetch_error)
}

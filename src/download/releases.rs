//! Release-metadata lookup and latest-tag selection

use std::time::Duration;

use log::info;
use serde::Deserialize;

use super::fetch::Fetch;
use crate::error::{BuildError, Result};

/// One entry of the release-metadata JSON array
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    pub version: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub milestone: i64,
    #[serde(rename = "time", default)]
    pub release_timestamp: f64,
}

/// Parse the endpoint body into release records
pub fn parse_releases(body: &[u8]) -> Result<Vec<ReleaseInfo>> {
    Ok(serde_json::from_slice(body)?)
}

/// Newest record by timestamp; the first of equal timestamps wins
pub fn select_latest(releases: &[ReleaseInfo]) -> Option<&ReleaseInfo> {
    let (first, rest) = releases.split_first()?;
    Some(rest.iter().fold(first, |latest, release| {
        if release.release_timestamp > latest.release_timestamp {
            release
        } else {
            latest
        }
    }))
}

/// Query the endpoint and return the most recent release across platforms
pub async fn resolve_latest<F: Fetch>(
    fetcher: &F,
    url: &str,
    timeout: Duration,
) -> Result<ReleaseInfo> {
    let body = fetcher.fetch(url, Some(timeout)).await?;
    let releases = parse_releases(&body)?;
    let latest = select_latest(&releases).ok_or(BuildError::EmptyResult)?;

    info!(
        "Latest {} release: {} ({}, milestone {})",
        latest.channel, latest.version, latest.platform, latest.milestone
    );
    Ok(latest.clone())
}

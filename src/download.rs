use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::file_utils::FileManager;

// @module: Fetching source containers from a course index page

static HREF_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap());

/// Scrape `.pdf` links from an index page.
///
/// The scan is a plain attribute grep, not an HTML parse; relative links
/// are resolved against the page URL and duplicates collapse.
pub fn scrape_container_links(page_url: &Url, html: &str) -> Vec<Url> {
    let mut seen = BTreeSet::new();
    let mut links = Vec::new();
    for caps in HREF_ATTR.captures_iter(html) {
        let href = &caps[1];
        if !href.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        match page_url.join(href) {
            Ok(resolved) => {
                if seen.insert(resolved.to_string()) {
                    links.push(resolved);
                }
            }
            Err(e) => warn!("skipping unresolvable link {:?}: {}", href, e),
        }
    }
    links
}

/// Download every container linked from the course index into `input_dir`.
///
/// Files that already exist locally are kept as-is, so a re-run only
/// fetches what is missing. Returns the number of files fetched.
pub async fn download_containers(course_url: &str, input_dir: &Path) -> Result<usize> {
    let page_url = Url::parse(course_url)
        .with_context(|| format!("Invalid course URL: {}", course_url))?;

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let html = client
        .get(page_url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch index page {}", page_url))?
        .error_for_status()
        .context("Index page request was rejected")?
        .text()
        .await
        .context("Failed to read index page body")?;

    let links = scrape_container_links(&page_url, &html);
    info!("index page lists {} container(s)", links.len());
    FileManager::ensure_dir(input_dir)?;

    let mut fetched = 0;
    for link in links {
        let Some(file_name) = link
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
        else {
            warn!("skipping link without a file name: {}", link);
            continue;
        };
        let target = input_dir.join(file_name);
        if FileManager::file_exists(&target) {
            info!("keeping existing {}", target.display());
            continue;
        }

        let bytes = client
            .get(link.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", link))?
            .error_for_status()
            .with_context(|| format!("Request rejected for {}", link))?
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", link))?;
        std::fs::write(&target, &bytes)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!("fetched {} ({} bytes)", target.display(), bytes.len());
        fetched += 1;
    }
    Ok(fetched)
}

use campsite_shared::config::BookingConfig;
use campsite_shared::pitches::{self, FeatureCollection};

use crate::location;

pub const CONFIG_PATH: &str = "/config.json";

/// Resolve a site-relative path against the page origin; reqwest needs
/// absolute URLs.
pub fn absolute_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

fn resolve(path: &str) -> String {
    match location::origin() {
        Some(origin) => absolute_url(&origin, path),
        None => path.to_string(),
    }
}

pub async fn fetch_text(path: &str) -> Result<String, String> {
    let url = resolve(path);
    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {} for {}", resp.status(), path));
    }
    resp.text().await.map_err(|e| e.to_string())
}

pub async fn fetch_config() -> Result<BookingConfig, String> {
    let text = fetch_text(CONFIG_PATH).await?;
    BookingConfig::from_json(&text)
}

/// Startup config. A missing or broken file is not fatal.
pub async fn load_config() -> BookingConfig {
    match fetch_config().await {
        Ok(config) => {
            tracing::info!(layers = config.layers.len(), "Loaded booking config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "Using default booking config");
            BookingConfig::default()
        }
    }
}

pub async fn fetch_pitches(path: &str) -> Result<FeatureCollection, String> {
    let text = fetch_text(path).await?;
    pitches::parse_collection(&text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_for_rooted_path() {
        assert_eq!(
            absolute_url("https://camp.example", "/config.json"),
            "https://camp.example/config.json"
        );
    }

    #[test]
    fn test_absolute_url_for_relative_path() {
        assert_eq!(
            absolute_url("https://camp.example/", "masterplan.svg"),
            "https://camp.example/masterplan.svg"
        );
    }

    #[test]
    fn test_absolute_url_keeps_full_urls() {
        assert_eq!(
            absolute_url("https://camp.example", "https://cdn.example/plan.svg"),
            "https://cdn.example/plan.svg"
        );
    }
}

//! Update checks against the licensing service.

use async_trait::async_trait;
use keymagic_core::ports::{LicensingApi, UpdateCheck};
use keymagic_core::{ApiAction, ApiRequest, Result, UpdateInfo};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Asks the store whether a newer release of a licensed product exists.
pub struct PluginUpdater {
    api: Arc<dyn LicensingApi>,
    item_name: String,
    version: String,
    license: String,
    author: String,
    site_url: String,
}

impl PluginUpdater {
    pub fn new(
        api: Arc<dyn LicensingApi>,
        item_name: impl Into<String>,
        version: impl Into<String>,
        license: impl Into<String>,
        author: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            item_name: item_name.into(),
            version: version.into(),
            license: license.into(),
            author: author.into(),
            site_url: site_url.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

#[async_trait]
impl UpdateCheck for PluginUpdater {
    fn item_name(&self) -> &str {
        &self.item_name
    }

    async fn check(&self) -> Result<Option<UpdateInfo>> {
        let mut request = ApiRequest::new(
            ApiAction::GetVersion,
            self.license.trim(),
            &self.item_name,
            &self.site_url,
        );
        request.version = Some(self.version.clone());
        request.author = Some(self.author.clone());

        let response = self.api.call(&request).await?;

        let Some(new_version) = response.new_version.filter(|v| !v.trim().is_empty()) else {
            debug!(item_name = %self.item_name, "No version information returned");
            return Ok(None);
        };

        if compare_versions(&new_version, &self.version) != Ordering::Greater {
            debug!(item_name = %self.item_name, version = %self.version, "Up to date");
            return Ok(None);
        }

        info!(
            item_name = %self.item_name,
            current = %self.version,
            available = %new_version,
            "Update available"
        );

        let changelog = response
            .sections
            .as_ref()
            .and_then(|s| s.get("changelog"))
            .and_then(|c| c.as_str())
            .map(str::to_string);

        Ok(Some(UpdateInfo {
            item_name: self.item_name.clone(),
            current_version: self.version.clone(),
            new_version,
            package: response.package.filter(|p| !p.is_empty()),
            homepage: response.homepage,
            changelog,
        }))
    }
}

/// Compare dotted version strings numerically, segment by segment. Missing
/// segments count as zero; non-numeric suffixes are ignored.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn segments(v: &str) -> Vec<u64> {
        v.trim()
            .trim_start_matches(['v', 'V'])
            .split(['.', '-', '+'])
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }

    let (a, b) = (segments(a), segments(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            a.get(i)
                .copied()
                .unwrap_or(0)
                .cmp(&b.get(i).copied().unwrap_or(0))
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

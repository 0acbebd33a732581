//! Programming classification of a foreground window

use super::ActivitySettings;

/// Decides whether a window counts as programming
///
/// All matching is case-insensitive. Entries are lowered once here; empty
/// entries are dropped so they cannot match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classifier {
    apps: Vec<String>,
    browsers: Vec<String>,
    sites: Vec<String>,
}

fn normalized(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Classifier {
    /// Build from explicit lists
    pub fn new(apps: &[String], browsers: &[String], sites: &[String]) -> Self {
        Self {
            apps: normalized(apps),
            browsers: normalized(browsers)
                .into_iter()
                .map(|b| b.trim_end_matches(".exe").to_string())
                .collect(),
            sites: normalized(sites),
        }
    }

    /// Build from settings
    pub fn from_settings(settings: &ActivitySettings) -> Self {
        Self::new(
            &settings.programming_apps,
            &settings.browsers,
            &settings.programming_sites,
        )
    }

    /// Whether `process_name` is a recognized browser
    #[must_use]
    pub fn is_browser(&self, process_name: &str) -> bool {
        let process = process_name.trim().to_lowercase();
        let stem = process.strip_suffix(".exe").unwrap_or(&process);
        self.browsers.iter().any(|b| stem.ends_with(b.as_str()))
    }

    /// Whether the window counts as programming
    #[must_use]
    pub fn is_programming(&self, process_name: &str, window_title: &str) -> bool {
        let process = process_name.to_lowercase();
        if self.apps.iter().any(|app| process.contains(app.as_str())) {
            return true;
        }
        if self.is_browser(process_name) {
            let title = window_title.to_lowercase();
            return self.sites.iter().any(|site| title.contains(site.as_str()));
        }
        false
    }
}

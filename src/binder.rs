// Trigger binder - tracks which navigation targets the page currently offers
use crate::page::{Page, Region};
use crate::target::NavigationTarget;
use regex::Regex;
use std::sync::OnceLock;

pub const TRIGGER_ATTRIBUTE: &str = "data-href";

// Regions scanned on every rebind. The template dialog body can carry
// triggers too.
const SCANNED_REGIONS: [Region; 4] = [
    Region::IndexHeader,
    Region::IndexSidebar,
    Region::Mainframe,
    Region::TemplateDialogContent,
];

fn trigger_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r#"\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
            regex::escape(TRIGGER_ATTRIBUTE)
        ))
        .expect("trigger pattern is valid")
    })
}

/// Collect the targets of every `data-href` element in `html`, in document order.
pub fn scan_triggers(html: &str) -> Vec<NavigationTarget> {
    trigger_pattern()
        .captures_iter(html)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .filter_map(|value| NavigationTarget::parse(value.as_str().replace("&amp;", "&")).ok())
        .collect()
}

/// The set of bound triggers. Rebinding replaces it wholesale, so a trigger
/// present in several loads is still bound exactly once.
#[derive(Debug, Default)]
pub struct TriggerBinder {
    bound: Vec<NavigationTarget>,
}

impl TriggerBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebind(&mut self, page: &dyn Page) -> usize {
        let mut bound: Vec<NavigationTarget> = Vec::new();
        for region in SCANNED_REGIONS {
            let Some(html) = page.region_html(region) else {
                continue;
            };
            for target in scan_triggers(html) {
                if !bound.contains(&target) {
                    bound.push(target);
                }
            }
        }
        tracing::debug!(count = bound.len(), "navigation triggers bound");
        self.bound = bound;
        self.bound.len()
    }

    pub fn is_bound(&self, target: &NavigationTarget) -> bool {
        self.bound.contains(target)
    }

    pub fn bound(&self) -> &[NavigationTarget] {
        &self.bound
    }
}

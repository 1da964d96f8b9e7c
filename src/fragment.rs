// Fragments - partial markup returned by the server
use regex::Regex;

// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn html(&self) -> &str {
        &self.0
    }

    /// Blank responses count as failed loads.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Narrow the fragment to the element with the given id, outer markup
    /// included. Returns `None` when no element carries the id.
    pub fn select_id(&self, id: &str) -> Option<Fragment> {
        select_element_by_id(&self.0, id).map(|html| Fragment(html.to_string()))
    }
}

fn select_element_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let open = Regex::new(&format!(
        r#"<([A-Za-z][A-Za-z0-9-]*)\b[^>]*?\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    ))
    .ok()?;
    let found = open.captures(html)?;
    let whole = found.get(0)?;
    let name = found.get(1)?.as_str();

    if whole.as_str().ends_with("/>") || VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name)) {
        return Some(whole.as_str());
    }

    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(name))).ok()?;
    let mut depth = 1usize;
    for tag in tags.captures_iter(&html[whole.end()..]) {
        let matched = tag.get(0)?;
        if matched.as_str().ends_with("/>") {
            continue;
        }
        if tag.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some(&html[whole.start()..whole.end() + matched.end()]);
            }
        } else {
            depth += 1;
        }
    }

    // Unterminated element: take the rest of the document.
    Some(&html[whole.start()..])
}

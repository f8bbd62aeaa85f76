use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

pub const RANDOM_JOKE_ID: &str = "rJoke";
pub const PERSONAL_JOKE_ID: &str = "pJoke";
pub const CUSTOM_JOKE_ID: &str = "cJoke";
pub const FIRST_NAME_ID: &str = "firstname";
pub const LAST_NAME_ID: &str = "lastname";
pub const CUSTOM_MODAL_ID: &str = "customModal";

/// A replaceable piece of markup. `id` is the id attribute of its root tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: Option<String>,
    pub markup: String,
}

impl Fragment {
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        Self {
            id: root_id(&markup),
            markup,
        }
    }
}

/// In-memory page: fragments in document order, text inputs and dialogs.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fragments: Vec<Fragment>,
    inputs: BTreeMap<String, String>,
    dialogs: BTreeMap<String, bool>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The joke page: three placeholders, the name inputs and the hidden modal.
    pub fn home() -> Self {
        let mut doc = Self::new();
        doc.push_fragment(format!(
            r#"<p id="{RANDOM_JOKE_ID}">Press r for a random joke.</p>"#
        ));
        doc.push_fragment(format!(
            r#"<p id="{PERSONAL_JOKE_ID}">Press p for a joke about you.</p>"#
        ));
        doc.push_fragment(format!(
            r#"<p id="{CUSTOM_JOKE_ID}">Press c to pick a name.</p>"#
        ));
        doc.add_input(FIRST_NAME_ID);
        doc.add_input(LAST_NAME_ID);
        doc.add_dialog(CUSTOM_MODAL_ID);
        doc
    }

    pub fn push_fragment(&mut self, markup: impl Into<String>) {
        self.fragments.push(Fragment::new(markup));
    }

    pub fn add_input(&mut self, id: &str) {
        self.inputs.entry(id.to_string()).or_default();
    }

    pub fn add_dialog(&mut self, id: &str) {
        self.dialogs.entry(id.to_string()).or_insert(false);
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn outer_html(&self, id: &str) -> Option<&str> {
        self.position(id).map(|i| self.fragments[i].markup.as_str())
    }

    /// Swaps the element with `id`, tag included, for `markup`.
    ///
    /// Returns false and leaves the page alone when no element has that id.
    pub fn replace_outer_html(&mut self, id: &str, markup: &str) -> bool {
        match self.position(id) {
            Some(i) => {
                self.fragments[i] = Fragment::new(markup);
                true
            }
            None => false,
        }
    }

    pub fn input_value(&self, id: &str) -> Option<&str> {
        self.inputs.get(id).map(String::as_str)
    }

    pub fn input_value_mut(&mut self, id: &str) -> Option<&mut String> {
        self.inputs.get_mut(id)
    }

    pub fn set_input_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.inputs.get_mut(id) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn show_dialog(&mut self, id: &str) {
        if let Some(open) = self.dialogs.get_mut(id) {
            *open = true;
        }
    }

    pub fn hide_dialog(&mut self, id: &str) {
        if let Some(open) = self.dialogs.get_mut(id) {
            *open = false;
        }
    }

    pub fn is_dialog_open(&self, id: &str) -> bool {
        self.dialogs.get(id).copied().unwrap_or(false)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.fragments
            .iter()
            .position(|f| f.id.as_deref() == Some(id))
    }
}

fn root_id_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"^\s*<[A-Za-z][A-Za-z0-9-]*\b[^>]*?\sid\s*=\s*"#,
            r#"(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#,
        ))
        .ok()
    })
    .as_ref()
}

/// Id attribute of the first start tag, if the markup opens with one.
pub fn root_id(markup: &str) -> Option<String> {
    let caps = root_id_regex()?.captures(markup)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().to_string())
}

/// Wrap width handed to html2text. Panels re-wrap to their own width.
const TEXT_WIDTH: usize = 1000;

/// Render a fragment as display lines, blank lines dropped.
pub fn markup_text(markup: &str) -> Result<Vec<String>, html2text::Error> {
    let text = html2text::from_read(markup.as_bytes(), TEXT_WIDTH)?;
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_surface() {
        let doc = Document::home();
        for id in [RANDOM_JOKE_ID, PERSONAL_JOKE_ID, CUSTOM_JOKE_ID] {
            assert!(doc.contains(id), "missing {id}");
        }
        assert_eq!(doc.input_value(FIRST_NAME_ID), Some(""));
        assert_eq!(doc.input_value(LAST_NAME_ID), Some(""));
        assert!(!doc.is_dialog_open(CUSTOM_MODAL_ID));
    }

    #[test]
    fn test_replace_outer_html_swaps_whole_element() {
        let mut doc = Document::home();
        assert!(doc.replace_outer_html(RANDOM_JOKE_ID, r#"<div id="rJoke">X</div>"#));
        assert_eq!(doc.outer_html(RANDOM_JOKE_ID), Some(r#"<div id="rJoke">X</div>"#));
        assert_eq!(doc.fragments().len(), 3);
    }

    #[test]
    fn test_replacement_without_id_drops_target() {
        let mut doc = Document::home();
        assert!(doc.replace_outer_html(RANDOM_JOKE_ID, "<div>X</div>"));
        assert!(!doc.contains(RANDOM_JOKE_ID));
        assert_eq!(doc.fragments()[0].markup, "<div>X</div>");
        assert!(!doc.replace_outer_html(RANDOM_JOKE_ID, "<div>Y</div>"));
        assert_eq!(doc.fragments()[0].markup, "<div>X</div>");
    }

    #[test]
    fn test_last_replacement_wins() {
        let mut doc = Document::home();
        doc.replace_outer_html(PERSONAL_JOKE_ID, r#"<p id="pJoke">second sent</p>"#);
        doc.replace_outer_html(PERSONAL_JOKE_ID, r#"<p id="pJoke">first sent</p>"#);
        assert_eq!(doc.outer_html(PERSONAL_JOKE_ID), Some(r#"<p id="pJoke">first sent</p>"#));
    }

    #[test]
    fn test_root_id_variants() {
        assert_eq!(root_id(r#"<div class="a" id="rJoke">x</div>"#).as_deref(), Some("rJoke"));
        assert_eq!(root_id("  <p id='pJoke'>x</p>").as_deref(), Some("pJoke"));
        assert_eq!(root_id("<span id=cJoke>x</span>").as_deref(), Some("cJoke"));
        assert_eq!(root_id(r#"<div data-id="nope">x</div>"#), None);
        assert_eq!(root_id(r#"text <p id="late">x</p>"#), None);
        assert_eq!(root_id(r#"<div><p id="child">x</p></div>"#), None);
    }

    #[test]
    fn test_dialog_visibility() {
        let mut doc = Document::home();
        doc.show_dialog(CUSTOM_MODAL_ID);
        assert!(doc.is_dialog_open(CUSTOM_MODAL_ID));
        doc.hide_dialog(CUSTOM_MODAL_ID);
        assert!(!doc.is_dialog_open(CUSTOM_MODAL_ID));
        assert!(!doc.is_dialog_open("missing"));
    }

    #[test]
    fn test_set_input_value_only_for_known_inputs() {
        let mut doc = Document::home();
        assert!(doc.set_input_value(FIRST_NAME_ID, "Chuck"));
        assert!(!doc.set_input_value("middlename", "x"));
        assert_eq!(doc.input_value(FIRST_NAME_ID), Some("Chuck"));
        assert_eq!(doc.input_value("middlename"), None);
    }

    #[test]
    fn test_markup_text() {
        let markup = r#"<div id="rJoke"><p>Chuck &amp; Norris</p><p>can&#39;t   lose</p></div>"#;
        let lines = markup_text(markup).unwrap();
        assert_eq!(lines, vec!["Chuck & Norris", "can't lose"]);
    }

    #[test]
    fn test_markup_text_bare_ampersand_before_tag() {
        let lines = markup_text("<p>A & B</p><p>C</p>").unwrap();
        assert_eq!(lines, vec!["A & B", "C"]);

        let lines = markup_text("A & B</p><p>C").unwrap();
        assert_eq!(lines, vec!["A & B", "C"]);
    }

    #[test]
    fn test_markup_text_stray_close_tag() {
        let lines = markup_text("<div>Tom & Jerry</p><p>next</div>").unwrap();
        assert_eq!(lines, vec!["Tom & Jerry", "next"]);
        assert!(lines.iter().all(|l| !l.contains('<')));
    }

    #[test]
    fn test_markup_text_line_break() {
        let lines = markup_text("one<br>two").unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }
}

//! The share root: an HTML snapshot of the element a card is built from.

use blockcard_core::ExtractionConfig;
use scraper::{ElementRef, Html, Selector};

/// Owned snapshot of the share root.
///
/// The HTML is kept as a string and parsed on demand inside synchronous
/// helpers, so extraction futures holding a `RootElement` stay `Send`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootElement {
    pub html: String,
    pub uid: Option<String>,
}

impl RootElement {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            uid: None,
        }
    }

    /// Supply the uid explicitly; it takes precedence over anything found
    /// in the markup.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        self.uid = (!uid.is_empty()).then_some(uid);
        self
    }

    /// Determine the block uid this root stands for.
    ///
    /// Each [`UidStrategy`] is tried in priority order, first against the
    /// root element and then against its first block-text element.
    pub fn resolve_uid(&self, config: &ExtractionConfig) -> Option<String> {
        if let Some(uid) = &self.uid {
            return Some(uid.clone());
        }

        let html = Html::parse_fragment(&self.html);
        let root = root_element(&html)?;
        let block_text = compile_block_text(config)
            .and_then(|selector| block_texts(root, &selector).into_iter().next());

        let candidates: Vec<ElementRef> = std::iter::once(root).chain(block_text).collect();
        for strategy in UidStrategy::ALL {
            for element in &candidates {
                if let Some(uid) = strategy.apply(*element, config) {
                    log::debug!("Resolved uid {} by {:?}", uid, strategy);
                    return Some(uid);
                }
            }
        }

        log::debug!("No uid found on share root");
        None
    }
}

/// Ways of reading a block uid off a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidStrategy {
    /// One of the configured `data-*` attributes.
    Attribute,
    /// The trailing characters of the element id.
    IdSuffix,
}

impl UidStrategy {
    pub const ALL: [UidStrategy; 2] = [UidStrategy::Attribute, UidStrategy::IdSuffix];

    pub fn apply(self, element: ElementRef<'_>, config: &ExtractionConfig) -> Option<String> {
        match self {
            UidStrategy::Attribute => config
                .uid_attributes
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .map(str::trim)
                .find(|uid| !uid.is_empty())
                .map(str::to_string),
            UidStrategy::IdSuffix => {
                let id = element.value().id()?;
                id_suffix(id, config.uid_suffix_len)
            }
        }
    }
}

/// Last `len` characters of `id`, if they look like a uid.
fn id_suffix(id: &str, len: usize) -> Option<String> {
    let count = id.chars().count();
    if len == 0 || count < len {
        return None;
    }
    let suffix: String = id.chars().skip(count - len).collect();
    suffix
        .chars()
        .all(is_uid_char)
        .then_some(suffix)
}

fn is_uid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// First element of a parsed fragment.
pub(crate) fn root_element(html: &Html) -> Option<ElementRef<'_>> {
    html.root_element().children().find_map(ElementRef::wrap)
}

pub(crate) fn compile_block_text(config: &ExtractionConfig) -> Option<Selector> {
    match Selector::parse(&config.block_text_selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!(
                "Invalid block text selector {:?}: {}",
                config.block_text_selector,
                e
            );
            None
        }
    }
}

/// Block-text elements under `root` in document order, the root included
/// when it matches itself.
pub(crate) fn block_texts<'a>(root: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    if selector.matches(&root) {
        found.push(root);
    }
    found.extend(root.select(selector).filter(|el| el.id() != root.id()));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_explicit_uid_wins() {
        let root = RootElement::from_html(r#"<div data-uid="fromattr1"></div>"#).with_uid("explicit1");
        assert_eq!(root.resolve_uid(&config()).as_deref(), Some("explicit1"));
    }

    #[test]
    fn test_empty_explicit_uid_is_ignored() {
        let root = RootElement::from_html(r#"<div data-uid="fromattr1"></div>"#).with_uid("");
        assert_eq!(root.resolve_uid(&config()).as_deref(), Some("fromattr1"));
    }

    #[test]
    fn test_attribute_on_root() {
        let root = RootElement::from_html(r#"<div data-block-uid="abc123def"><span>x</span></div>"#);
        assert_eq!(root.resolve_uid(&config()).as_deref(), Some("abc123def"));
    }

    #[test]
    fn test_id_suffix_on_block_text() {
        let html = r#"<div class="roam-block-container">
            <div class="rm-block-text" id="block-input-user-body-outline-page0001-abc123def">hi</div>
        </div>"#;
        let root = RootElement::from_html(html);
        assert_eq!(root.resolve_uid(&config()).as_deref(), Some("abc123def"));
    }

    #[test]
    fn test_attribute_beats_id_suffix() {
        let html = r#"<div id="block-input-zzzzzzzzz">
            <div class="rm-block-text" data-uid="abc123def">hi</div>
        </div>"#;
        let root = RootElement::from_html(html);
        assert_eq!(root.resolve_uid(&config()).as_deref(), Some("abc123def"));
    }

    #[test]
    fn test_id_suffix_rejects_non_uid_chars() {
        assert_eq!(id_suffix("block.input:abc", 9), None);
        assert_eq!(id_suffix("short", 9), None);
        assert_eq!(id_suffix("x-abc_12-3d", 9).as_deref(), Some("abc_12-3d"));
    }

    #[test]
    fn test_no_uid() {
        let root = RootElement::from_html("<div><p>nothing</p></div>");
        assert_eq!(root.resolve_uid(&config()), None);
        assert_eq!(RootElement::default().resolve_uid(&config()), None);
    }

    #[test]
    fn test_block_texts_include_root() {
        let html = Html::parse_fragment(
            r#"<div class="rm-block-text">a<div class="rm-block-text">b</div></div>"#,
        );
        let root = root_element(&html).unwrap();
        let selector = Selector::parse(".rm-block-text").unwrap();
        assert_eq!(block_texts(root, &selector).len(), 2);
    }
}

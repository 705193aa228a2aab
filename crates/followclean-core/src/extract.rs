//! Turning one rendered account card into an [`Account`].
//!
//! The default rules target x.com's `UserCell` markup. They are kept behind
//! the [`Extractor`] trait so a different layout only needs a new
//! implementation, not changes to the scanner or executor.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::Account;

/// CSS selector for one account card in the following list.
pub const CARD_SELECTOR: &str = r#"[data-testid="UserCell"]"#;
const CARD_TESTID: &str = "UserCell";
/// CSS selector for the unfollow trigger inside a card.
pub const TRIGGER_SELECTOR: &str = r#"[data-testid$="-unfollow"]"#;
/// CSS selector for the confirm button of the unfollow dialog.
pub const CONFIRMATION_SELECTOR: &str = r#"[data-testid="confirmationSheetConfirm"]"#;

static PROFILE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[A-Za-z0-9_]+$").unwrap());
static STANDALONE_HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@[A-Za-z0-9_]+$").unwrap());
static BUTTON_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?i:click to (?:un)?follow|following$)|Click to)").unwrap());
static FOLLOW_TESTID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)follow").unwrap());

static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[role="link"]"#).unwrap());
static NAME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[role="link"] span"#).unwrap());
static DIR_AUTO_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"[dir="auto"]"#).unwrap());
static AVATAR_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[src*="profile_images"]"#).unwrap());

/// Bio candidates nesting more than this many `dir="auto"` elements are
/// containers of the whole card, not the bio itself.
const MAX_NESTED_TEXT_NODES: usize = 2;

/// A pure function from one card's markup to a candidate account.
pub trait Extractor: Send + Sync {
    /// Returns `None` when the card has no resolvable profile link.
    fn extract(&self, card_html: &str) -> Option<Account>;
}

/// Map a link path to a handle: `/name` becomes `@name`.
///
/// Only bare single-segment paths qualify, so status permalinks and other
/// in-content links never resolve.
pub fn handle_from_href(href: &str) -> Option<String> {
    if href.contains("/status/") || !PROFILE_PATH.is_match(href) {
        return None;
    }
    Some(format!("@{}", &href[1..]))
}

/// The first qualifying profile link wins; later links are bio mentions.
pub fn resolve_handle<'a>(hrefs: impl IntoIterator<Item = &'a str>) -> Option<String> {
    hrefs.into_iter().find_map(handle_from_href)
}

/// Extraction rules for x.com `UserCell` cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct XCardExtractor;

impl Extractor for XCardExtractor {
    fn extract(&self, card_html: &str) -> Option<Account> {
        let fragment = Html::parse_fragment(card_html);
        let root = fragment.root_element();

        let handle =
            resolve_handle(root.select(&LINK_SEL).filter_map(|link| link.value().attr("href")))?;

        let display_name = root
            .select(&NAME_SEL)
            .next()
            .map(|span| span.text().collect::<String>())
            .unwrap_or_else(|| handle.clone());

        let bio = longest_bio(root, &display_name);

        let avatar_url = root
            .select(&AVATAR_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_string();

        Some(Account {
            handle,
            display_name,
            bio,
            avatar_url,
        })
    }
}

fn longest_bio(root: ElementRef<'_>, display_name: &str) -> String {
    let mut bio = String::new();
    for node in root.select(&DIR_AUTO_SEL) {
        let text = node.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() || inside_control(node) {
            continue;
        }
        if text == display_name || STANDALONE_HANDLE.is_match(text) || BUTTON_TEXT.is_match(text) {
            continue;
        }
        if node.select(&DIR_AUTO_SEL).count() > MAX_NESTED_TEXT_NODES {
            continue;
        }
        if text.len() > bio.len() {
            bio = text.to_string();
        }
    }
    bio
}

/// True when the element sits inside a button or a follow-related widget
/// within the card. The card itself carries `role="button"`, so the walk
/// stops below it.
fn inside_control(el: ElementRef<'_>) -> bool {
    let in_button = self_and_ancestors(el).any(|e| {
        let v = e.value();
        v.name() == "button" || v.attr("role") == Some("button")
    });
    if in_button {
        return true;
    }
    self_and_ancestors(el)
        .find_map(|e| e.value().attr("data-testid"))
        .is_some_and(|testid| FOLLOW_TESTID.is_match(testid))
}

fn self_and_ancestors(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .take_while(|e| e.value().attr("data-testid") != Some(CARD_TESTID))
}

//! Series-name inference from sequel titles.
//!
//! `"呪術廻戦 第2期"` and `"Jujutsu Kaisen 2nd Season"` both belong to the
//! series named by their prefix. Titles with no sequel marker have no
//! inferred series.

use regex::Regex;
use std::sync::LazyLock;

/// Markers that may follow the series name directly, without a separator.
const ATTACHED_MARKERS: &str = r"第?[0-9０-９]+(?:期|クール)|第[0-9０-９]+部|[ⅡⅢⅣⅤⅥⅦⅧⅨⅩ]";

/// Markers that must be separated from the series name.
const SEPARATED_MARKERS: &str = r"(?i:[0-9]+(?:st|nd|rd|th)\s+season|season\s*[0-9０-９]+|part\s*[0-9]+|cour\s*[0-9]+)|S[0-9]{1,2}";

/// Bare numbers that count as a marker only at the very end of a title.
/// `Final Fantasy VII: Advent Children` is not a sequel of `Final Fantasy`.
const TRAILING_MARKERS: &str = r"(?:II|III|IV|V|VI|VII|VIII|IX|X)|[2-9]";

/// `<series><marker>+<optional subtitle>` or `<series> <trailing number>`.
static RE_SEQUEL: LazyLock<Regex> = LazyLock::new(|| {
    let marker = format!(r"(?:\s*(?:{ATTACHED_MARKERS})|[\s:：\-－]+(?:{SEPARATED_MARKERS}))");
    Regex::new(&format!(
        r"^(?P<series>.+?)(?:(?:{marker})+(?:\s*[:：\-－～~].*)?|(?:{marker})*[\s:：\-－]+(?:{TRAILING_MARKERS}))$"
    ))
    .unwrap()
});

/// Numbered titles such as `Kaiju No. 8`, where the number is part of the name.
static RE_NUMBERED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bno\.|#)$").unwrap());

/// Infer the series name of a title, if it looks like a sequel or part.
pub fn infer_series_name(title: &str) -> Option<String> {
    let title = title.trim();
    let caps = RE_SEQUEL.captures(title)?;
    let series = caps["series"]
        .trim_end_matches(|c: char| c.is_whitespace() || ":：-－".contains(c))
        .to_string();
    if series.is_empty() || RE_NUMBERED_NAME.is_match(&series) {
        None
    } else {
        Some(series)
    }
}

//! Section-anchored extraction of model output.
//!
//! Headers are matched case-insensitively. Each capture runs from just after
//! its header to the next header that follows it in the format, or to the end
//! of the text. Nothing here fails: unrecognisable text is carried through in
//! `long` so callers can still inspect it.

use crate::models::DescriptionSet;

const SHORT: &str = "short:";
const MEDIUM: &str = "medium:";
const LONG: &str = "long:";
const BULLETS: &str = "bullets:";
const KEYWORDS: &str = "keywords:";

const BULLET_GLYPHS: &[char] = &['•', '-', '*'];

/// `lower` is the ASCII-lowercased copy of `text`, so byte offsets line up.
fn capture<'a>(text: &'a str, lower: &str, header: &str, until: Option<&str>) -> Option<&'a str> {
    let start = lower.find(header)? + header.len();
    let end = until
        .and_then(|next| lower[start..].find(next).map(|offset| start + offset))
        .unwrap_or(text.len());
    Some(text[start..end].trim())
}

fn split_bullets(block: &str) -> Vec<String> {
    block
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix(BULLET_GLYPHS).unwrap_or(line).trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn split_keywords(block: &str) -> Vec<String> {
    block
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_descriptions(text: &str) -> DescriptionSet {
    let lower = text.to_ascii_lowercase();

    let short = capture(text, &lower, SHORT, Some(MEDIUM));
    let medium = capture(text, &lower, MEDIUM, Some(LONG));
    let long = capture(text, &lower, LONG, Some(BULLETS));
    let bullets = capture(text, &lower, BULLETS, Some(KEYWORDS));
    let keywords = capture(text, &lower, KEYWORDS, None);

    if [short, medium, long, bullets, keywords].iter().all(Option::is_none) {
        return DescriptionSet { long: text.to_string(), ..Default::default() };
    }

    DescriptionSet {
        short: short.unwrap_or_default().to_string(),
        medium: medium.unwrap_or_default().to_string(),
        long: long.unwrap_or_default().to_string(),
        bullets: bullets.map(split_bullets).unwrap_or_default(),
        keywords: keywords.map(split_keywords).unwrap_or_default(),
    }
}

/// The span from the first `{` to the last `}`, if there is one.
pub fn json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

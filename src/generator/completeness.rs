use crate::models::DescriptionSet;

pub const MIN_SHORT_CHARS: usize = 30;
pub const MIN_MEDIUM_CHARS: usize = 100;
pub const MIN_LONG_CHARS: usize = 200;
pub const MIN_BULLETS: usize = 3;
pub const MIN_KEYWORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub missing: Vec<&'static str>,
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn short_ok(set: &DescriptionSet) -> bool {
    char_len(&set.short) >= MIN_SHORT_CHARS
}

pub fn medium_ok(set: &DescriptionSet) -> bool {
    char_len(&set.medium) >= MIN_MEDIUM_CHARS
}

pub fn long_ok(set: &DescriptionSet) -> bool {
    char_len(&set.long) >= MIN_LONG_CHARS
}

pub fn bullets_ok(set: &DescriptionSet) -> bool {
    set.bullets.len() >= MIN_BULLETS
}

pub fn keywords_ok(set: &DescriptionSet) -> bool {
    set.keywords.len() >= MIN_KEYWORDS
}

/// Checks every field against its minimum; `missing` keeps field order.
pub fn validate(set: &DescriptionSet) -> Validation {
    let checks: [(bool, &'static str); 5] = [
        (short_ok(set), "short description"),
        (medium_ok(set), "medium description"),
        (long_ok(set), "long description"),
        (bullets_ok(set), "feature bullets"),
        (keywords_ok(set), "keywords"),
    ];
    let missing: Vec<&'static str> = checks.iter().filter(|(ok, _)| !ok).map(|(_, label)| *label).collect();
    Validation { is_valid: missing.is_empty(), missing }
}

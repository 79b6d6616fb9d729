use tracing::info;

use super::completeness::{
    bullets_ok, char_len, keywords_ok, long_ok, medium_ok, short_ok, MIN_MEDIUM_CHARS, MIN_SHORT_CHARS,
};
use crate::models::{Condition, DescriptionSet};

const SHORT_SOURCE_CHARS: usize = 150;
const MEDIUM_SOURCE_CHARS: usize = 300;

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Returns `candidate` only if it is long enough to stand in for the field.
fn usable(candidate: String, min_chars: usize) -> Option<String> {
    (char_len(&candidate) >= min_chars).then_some(candidate)
}

fn generic_short(product_name: &str, used: bool) -> String {
    if used {
        format!("Pre-owned {product_name} in good condition. Well-maintained and fully functional.")
    } else {
        format!("Quality {product_name} available now. Great features and reliable performance.")
    }
}

fn generic_medium(product_name: &str, used: bool) -> String {
    if used {
        format!(
            "This {product_name} is a pre-owned item in good working condition. \
             It has been well-maintained and shows normal signs of use. \
             Sold as-is with an honest description."
        )
    } else {
        format!(
            "This {product_name} offers excellent quality and performance. \
             Perfect for those looking for reliable functionality. \
             Available for immediate purchase."
        )
    }
}

fn generic_long(product_name: &str, used: bool) -> String {
    if used {
        format!(
            "This {product_name} is being sold by its original owner. \
             The item has been carefully maintained and remains in functional condition. \
             While it shows normal wear from use, it continues to perform as expected. \
             Please review the photos carefully for condition details. Sale includes the item as shown. \
             This is a one-time sale - first come, first served."
        )
    } else {
        format!(
            "This {product_name} is available for purchase. \
             It represents excellent value with its combination of features and quality construction, \
             and it is built to hold up to everyday use. \
             Perfect for anyone seeking a reliable solution. Purchase with confidence."
        )
    }
}

fn generic_bullets(used: bool) -> Vec<String> {
    let items: [&str; 5] = if used {
        [
            "Pre-owned item in good condition",
            "Fully functional and tested",
            "Well-maintained by original owner",
            "Includes items as shown in photos",
            "Honest description with photo evidence",
        ]
    } else {
        [
            "Quality construction and materials",
            "Reliable performance",
            "Excellent value for money",
            "Ready for immediate use",
            "Perfect for everyday use",
        ]
    };
    items.iter().map(|s| s.to_string()).collect()
}

fn generic_keywords(product_name: &str, used: bool) -> Vec<String> {
    vec![
        product_name.to_lowercase(),
        if used { "used" } else { "new" }.to_string(),
        if used { "pre-owned" } else { "quality" }.to_string(),
        if used { "good condition" } else { "reliable" }.to_string(),
        "affordable".to_string(),
    ]
}

/// Replaces every field that is below its minimum with derived or generic copy.
///
/// Fields are filled short, medium, long, bullets, keywords; later fields may
/// draw on earlier ones. After this runs the set always passes validation.
pub fn fill_missing(set: &mut DescriptionSet, product_name: &str, condition: Condition) {
    let used = condition.is_used();

    if !short_ok(set) {
        set.short = usable(truncate_chars(&set.medium, SHORT_SOURCE_CHARS), MIN_SHORT_CHARS)
            .or_else(|| usable(truncate_chars(&set.long, SHORT_SOURCE_CHARS), MIN_SHORT_CHARS))
            .unwrap_or_else(|| generic_short(product_name, used));
    }

    if !medium_ok(set) {
        set.medium = usable(truncate_chars(&set.long, MEDIUM_SOURCE_CHARS), MIN_MEDIUM_CHARS)
            .or_else(|| usable(set.short.clone(), MIN_MEDIUM_CHARS))
            .unwrap_or_else(|| generic_medium(product_name, used));
    }

    if !long_ok(set) {
        set.long = format!("{}\n\n{}", set.medium, generic_long(product_name, used));
    }

    if !bullets_ok(set) {
        set.bullets = generic_bullets(used);
    }

    if !keywords_ok(set) {
        set.keywords = generic_keywords(product_name, used);
    }

    info!(product_name, condition = %condition, "🩹 Filled missing parts with fallback content");
}

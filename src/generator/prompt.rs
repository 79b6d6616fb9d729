use crate::models::{Condition, GenerationRequest, Quantity, Tone};

/// Everything the description prompt depends on, borrowed from a validated request.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub product_name: &'a str,
    pub category: Option<&'a str>,
    pub specs: Option<&'a str>,
    pub tone: Tone,
    pub image_count: usize,
    pub condition: Condition,
    pub quantity: Quantity,
}

impl<'a> From<&'a GenerationRequest> for PromptInput<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            product_name: &request.product_name,
            category: request.category.as_deref(),
            specs: request.specs.as_deref(),
            tone: request.tone,
            image_count: request.image_count(),
            condition: request.condition,
            quantity: request.quantity,
        }
    }
}

fn image_context(image_count: usize) -> String {
    if image_count > 1 {
        format!("Analyze all {image_count} product images.")
    } else {
        "Analyze the product image.".to_string()
    }
}

fn condition_note(condition: Condition) -> String {
    if condition.is_used() {
        format!(
            "This is a PRE-OWNED item ({}). Be honest about condition. Focus on value and functionality.",
            condition.human_label()
        )
    } else {
        "This is a NEW product. Focus on features and benefits.".to_string()
    }
}

/// Quantity only matters for new stock; a used item is always a single piece.
fn availability_note(condition: Condition, quantity: Quantity) -> &'static str {
    if condition.is_used() {
        return "Single item for sale.";
    }
    match quantity {
        Quantity::Single => "Single unit available.",
        Quantity::Limited => "Limited stock available.",
        Quantity::Multiple => "Multiple units available.",
    }
}

fn extra_rules(condition: Condition) -> &'static str {
    if condition.is_used() {
        "4. Be HONEST about condition - build trust\n5. Mention what's included"
    } else {
        "4. Highlight key features\n5. Emphasize benefits"
    }
}

/// Renders the description prompt. Pure: identical input gives identical text.
///
/// The `SHORT:`/`MEDIUM:`/`LONG:`/`BULLETS:`/`KEYWORDS:` headers in the format
/// block are what [`super::parser::parse_descriptions`] anchors on.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    format!(
        "You are writing product descriptions for e-commerce.

{image_context}

PRODUCT INFO:
- Name: {name}
- Category: {category}
- Condition: {condition_note}
- Details: {specs}
- Availability: {availability}
- Tone: {tone}

TASK: Generate 3 product descriptions + bullets + keywords.

RULES:
1. SHORT = 50-80 words (punchy, for quick browse)
2. MEDIUM = 150-200 words (balanced, for listings)
3. LONG = 300-400 words (detailed, for conversions)
{extra_rules}

FORMAT (follow exactly):

SHORT:
[50-80 word description]

MEDIUM:
[150-200 word description]

LONG:
[300-400 word description]

BULLETS:
- [Feature/benefit 1]
- [Feature/benefit 2]
- [Feature/benefit 3]
- [Feature/benefit 4]
- [Feature/benefit 5]

KEYWORDS:
keyword1, keyword2, keyword3, keyword4, keyword5

Write compelling copy that converts. Start now:",
        image_context = image_context(input.image_count),
        name = input.product_name,
        category = input.category.unwrap_or("General"),
        condition_note = condition_note(input.condition),
        specs = input.specs.unwrap_or("See images"),
        availability = availability_note(input.condition, input.quantity),
        tone = input.tone.instruction(),
        extra_rules = extra_rules(input.condition),
    )
}

pub const ANALYSIS_PROMPT: &str = r#"Analyze this product image and extract:
1. Product type/category
2. Main colors
3. Visible features
4. Material (if identifiable)
5. Suggested use case

Respond in JSON format:
{
  "category": "...",
  "colors": ["...", "..."],
  "features": ["...", "..."],
  "material": "...",
  "useCase": "..."
}"#;

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use wordsnap::{ModelClient, ModelError, ProductImage};

pub const MODEL_ID: &str = "gemini-fake";

pub const WELL_FORMED: &str = "SHORT:
Enjoy rich wireless sound with these pre-owned headphones. Gently used, fully tested and ready for your daily commute.

MEDIUM:
These wireless headphones deliver clear highs and punchy bass for music, podcasts and calls. They have been gently used and show only light wear on the headband. Bluetooth pairing is quick and the battery still lasts a full working day.

LONG:
Looking for great sound without paying full price? These wireless headphones have been well cared for and are ready for a new home. The soft over-ear cushions block out background noise on the train or in the office, while the foldable design slips easily into a backpack. Bluetooth pairing takes seconds, and the battery comfortably lasts through a long day of listening. Light scuffs on the headband are shown in the photos; everything else works exactly as it should.

BULLETS:
- Clear, balanced wireless sound
- Soft over-ear cushions
• Fast Bluetooth pairing
* All-day battery life
- Foldable travel design

KEYWORDS:
wireless headphones, bluetooth, over-ear, used headphones, travel audio";

pub const LATE_RESPONSE: &str = "SHORT:
This answer arrived after the timeout and must never be returned to anyone.
MEDIUM:
late late late late late late late late late late late late late late late late late late late late late late late
LONG:
late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late late
BULLETS:
- late one
- late two
- late three
KEYWORDS:
late, later, latest";

pub enum Reply {
    Text(String),
    Fail(ModelError),
    After(Duration, String),
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub image_count: usize,
}

/// Model client that answers from a queue of scripted replies.
///
/// When the queue runs dry it keeps answering with `fallback_reply`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    fallback_reply: String,
    calls: Mutex<Vec<Call>>,
    late_deliveries: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Self::with_fallback(replies, "")
    }

    pub fn always(text: &str) -> Arc<Self> {
        Self::with_fallback(vec![], text)
    }

    pub fn with_fallback(replies: Vec<Reply>, fallback_reply: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback_reply: fallback_reply.to_string(),
            calls: Mutex::new(Vec::new()),
            late_deliveries: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Delayed replies that actually ran to completion.
    pub fn late_deliveries(&self) -> usize {
        self.late_deliveries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(
        &self,
        images: &[ProductImage],
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ModelError> {
        self.calls.lock().push(Call {
            prompt: prompt.to_string(),
            temperature,
            max_output_tokens,
            image_count: images.len(),
        });
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::After(delay, text)) => {
                tokio::time::sleep(delay).await;
                self.late_deliveries.fetch_add(1, Ordering::SeqCst);
                Ok(text)
            }
            None => Ok(self.fallback_reply.clone()),
        }
    }

    fn model_id(&self) -> &str {
        MODEL_ID
    }
}

pub fn jpeg() -> ProductImage {
    ProductImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

use std::sync::Arc;
use tracing::{info, warn};

use super::error::{RecommendError, RecommendResult};
use super::extract::extract_items;
use super::fallback::FallbackStrategy;
use super::request::*;
use crate::gemini::Completer;

pub const NO_SUMMARY: &str = "Could not generate summary for this image.";

/// Result of an image search. The summary belongs to this search only.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSearch {
    pub items: Vec<String>,
    pub summary: String,
}

pub struct Recommender {
    completer: Arc<dyn Completer>,
    fallback: Arc<dyn FallbackStrategy>,
}

impl Recommender {
    pub fn new(completer: Arc<dyn Completer>, fallback: Arc<dyn FallbackStrategy>) -> Self {
        Self { completer, fallback }
    }

    pub async fn recommend(&self, request: &Recommendation) -> RecommendResult<Vec<String>> {
        let prompt = request.prompt();
        let text = self.completer.complete(&prompt).await?;
        let items = extract_items(&text);

        info!(kind = ?request.kind(), count = items.len(), "recommendations");
        Ok(items)
    }

    pub async fn search_by_image(&self, upload: ImageUpload) -> RecommendResult<ImageSearch> {
        if upload.data.is_empty() {
            return Err(RecommendError::Malformed("empty image file".to_string()));
        }

        info!(filename = %upload.filename, size = upload.data.len(), "processing image");

        // Both prompts share one buffer.
        let summary_prompt = Prompt::with_image(IMAGE_SUMMARY_PROMPT, upload.data.clone());
        let summary = match self.completer.complete(&summary_prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Error getting image summary: {}", e);
                NO_SUMMARY.to_string()
            }
        };

        let prompt = Prompt::with_image(IMAGE_RECOMMEND_PROMPT, upload.data);
        let items = match self.completer.complete(&prompt).await {
            Ok(text) => extract_items(&text),
            Err(e) => match self.fallback.fallback(&upload.filename) {
                Some(items) => {
                    warn!("Image recommendation failed, using fallback list: {}", e);
                    items
                }
                None => return Err(e.into()),
            },
        };

        Ok(ImageSearch { items, summary })
    }
}

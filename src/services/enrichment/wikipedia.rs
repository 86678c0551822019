use serde_json::Value;

use crate::{
    error::AppResult,
    models::Tags,
    services::enrichment::{ImageResolver, KnowledgeHttp, WikipediaRef},
};

/// Thumbnail from the Wikipedia `pageimages` API
pub struct WikipediaPageImage {
    http: KnowledgeHttp,
    api_template: String,
    thumbnail_size: u32,
}

impl WikipediaPageImage {
    /// `api_template` contains `{lang}`, e.g. `https://{lang}.wikipedia.org/w/api.php`
    pub fn new(http: KnowledgeHttp, api_template: String, thumbnail_size: u32) -> Self {
        Self {
            http,
            api_template,
            thumbnail_size,
        }
    }

    async fn fetch_thumbnail(&self, wikipedia: &WikipediaRef) -> AppResult<Option<String>> {
        let url = self.api_template.replace("{lang}", &wikipedia.lang);
        let size = self.thumbnail_size.to_string();

        let body = self
            .http
            .get_json(
                &url,
                &[
                    ("action", "query"),
                    ("titles", wikipedia.page.as_str()),
                    ("prop", "pageimages"),
                    ("format", "json"),
                    ("pithumbsize", size.as_str()),
                ],
            )
            .await?;

        Ok(first_page_thumbnail(&body))
    }
}

/// `query.pages.<any>.thumbnail.source` of the first page
fn first_page_thumbnail(body: &Value) -> Option<String> {
    body.get("query")?
        .get("pages")?
        .as_object()?
        .values()
        .next()?
        .get("thumbnail")?
        .get("source")?
        .as_str()
        .map(str::to_string)
}

#[async_trait::async_trait]
impl ImageResolver for WikipediaPageImage {
    async fn resolve(&self, tags: &Tags) -> Option<String> {
        let wikipedia = WikipediaRef::from_tags(tags)?;

        match self.fetch_thumbnail(&wikipedia).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    lang = %wikipedia.lang,
                    page = %wikipedia.page,
                    error = %e,
                    "Wikipedia image lookup failed"
                );
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "wikipedia"
    }
}

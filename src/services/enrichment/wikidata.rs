use serde_json::Value;

use crate::{
    error::AppResult,
    models::Tags,
    services::enrichment::{wikidata_id, ImageResolver, KnowledgeHttp},
};

/// Wikidata property holding an item's image file name
const IMAGE_PROPERTY: &str = "P18";

/// Commons file for the item's P18 claim
pub struct WikidataEntityImage {
    http: KnowledgeHttp,
    api_url: String,
    commons_file_path_url: String,
}

impl WikidataEntityImage {
    pub fn new(http: KnowledgeHttp, api_url: String, commons_file_path_url: String) -> Self {
        Self {
            http,
            api_url,
            commons_file_path_url,
        }
    }

    async fn fetch_image(&self, id: &str) -> AppResult<Option<String>> {
        let url = format!(
            "{}/wiki/Special:EntityData/{}.json",
            self.api_url.trim_end_matches('/'),
            id
        );
        let body = self.http.get_json(&url, &[]).await?;

        Ok(image_file_name(&body, id).map(|file| {
            format!(
                "{}/{}",
                self.commons_file_path_url.trim_end_matches('/'),
                file.replace(' ', "_")
            )
        }))
    }
}

/// First P18 value in `entities.<id>.claims`
fn image_file_name<'a>(body: &'a Value, id: &str) -> Option<&'a str> {
    body.get("entities")?
        .get(id)?
        .get("claims")?
        .get(IMAGE_PROPERTY)?
        .get(0)?
        .get("mainsnak")?
        .get("datavalue")?
        .get("value")?
        .as_str()
}

#[async_trait::async_trait]
impl ImageResolver for WikidataEntityImage {
    async fn resolve(&self, tags: &Tags) -> Option<String> {
        let id = wikidata_id(tags)?;

        match self.fetch_image(id).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(wikidata = %id, error = %e, "Wikidata image lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "wikidata"
    }
}

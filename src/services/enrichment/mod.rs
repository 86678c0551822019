/// Image and reference-link enrichment for points of interest
///
/// Images come from an ordered chain of resolvers. Each resolver either yields
/// a URL or nothing; the first URL wins and later resolvers are never called.
/// Resolvers absorb their own network and parse failures.
use reqwest::{header::USER_AGENT, Client as HttpClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::Tags,
};

pub mod wikidata;
pub mod wikipedia;

pub use wikidata::WikidataEntityImage;
pub use wikipedia::WikipediaPageImage;

const DEFAULT_WIKIPEDIA_LANG: &str = "en";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, tags: &Tags) -> Option<String>;

    fn name(&self) -> &'static str;
}

/// Ordered image resolvers; first hit wins
pub struct ImageResolverChain {
    resolvers: Vec<Arc<dyn ImageResolver>>,
}

impl ImageResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn ImageResolver>>) -> Self {
        Self { resolvers }
    }

    /// `image` tag, then Wikipedia page image, then Wikidata P18
    pub fn standard(http_client: HttpClient, config: &Config) -> Self {
        let http = KnowledgeHttp::new(
            http_client,
            config.knowledge_timeout(),
            config.user_agent.clone(),
        );

        let resolvers: Vec<Arc<dyn ImageResolver>> = vec![
            Arc::new(DirectImageTag),
            Arc::new(WikipediaPageImage::new(
                http.clone(),
                config.wikipedia_api_template.clone(),
                config.thumbnail_size,
            )),
            Arc::new(WikidataEntityImage::new(
                http,
                config.wikidata_api_url.clone(),
                config.commons_file_path_url.clone(),
            )),
        ];

        Self::new(resolvers)
    }

    pub async fn resolve(&self, tags: &Tags) -> Option<String> {
        for resolver in &self.resolvers {
            if let Some(url) = resolver.resolve(tags).await {
                tracing::debug!(resolver = resolver.name(), url = %url, "Image resolved");
                return Some(url);
            }
        }
        None
    }
}

/// Uses the element's own `image` tag verbatim
pub struct DirectImageTag;

#[async_trait::async_trait]
impl ImageResolver for DirectImageTag {
    async fn resolve(&self, tags: &Tags) -> Option<String> {
        non_blank_tag(tags, "image").map(str::to_string)
    }

    fn name(&self) -> &'static str {
        "image_tag"
    }
}

/// A `wikipedia=lang:Page` tag split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikipediaRef {
    pub lang: String,
    pub page: String,
}

impl WikipediaRef {
    /// `lang:Page`, or a bare `Page` in English
    ///
    /// A prefix that is not a plausible language code is treated as part of the
    /// page title, so `Star Wars: Episode IV` stays one title.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        let (lang, page) = match raw.split_once(':') {
            Some((lang, page)) if is_language_code(lang) => (lang, page),
            Some(("", page)) => (DEFAULT_WIKIPEDIA_LANG, page),
            _ => (DEFAULT_WIKIPEDIA_LANG, raw),
        };

        let page = page.trim();
        if page.is_empty() {
            return None;
        }

        Some(Self {
            lang: lang.to_ascii_lowercase(),
            page: page.to_string(),
        })
    }

    pub fn from_tags(tags: &Tags) -> Option<Self> {
        non_blank_tag(tags, "wikipedia").and_then(Self::parse)
    }

    pub fn page_url(&self) -> String {
        format!(
            "https://{}.wikipedia.org/wiki/{}",
            self.lang,
            self.page.replace(' ', "_")
        )
    }
}

fn is_language_code(candidate: &str) -> bool {
    (2..=12).contains(&candidate.len())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '-')
}

/// A Wikidata item id such as `Q19675`
pub fn wikidata_id(tags: &Tags) -> Option<&str> {
    non_blank_tag(tags, "wikidata")
        .map(str::trim)
        .filter(|id| id.len() > 1 && id.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Human-facing knowledge-base link: Wikipedia page, else Wikidata entity
pub fn reference_url(tags: &Tags) -> Option<String> {
    if let Some(wikipedia) = WikipediaRef::from_tags(tags) {
        return Some(wikipedia.page_url());
    }

    wikidata_id(tags).map(|id| format!("https://www.wikidata.org/wiki/{}", id))
}

fn non_blank_tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Shared HTTP settings for knowledge-base lookups
#[derive(Clone)]
pub struct KnowledgeHttp {
    http_client: HttpClient,
    timeout: Duration,
    user_agent: String,
}

impl KnowledgeHttp {
    pub fn new(http_client: HttpClient, timeout: Duration, user_agent: String) -> Self {
        Self {
            http_client,
            timeout,
            user_agent,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> AppResult<Value> {
        let response = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

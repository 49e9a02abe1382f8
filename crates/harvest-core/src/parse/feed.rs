//! Feed grammars: XML sitemaps and RSS 2.0.

use serde::Deserialize;

use crate::error::AppError;
use crate::traits::FeedParser;

// ---------------------------------------------------------------------------
// XML sitemap (<urlset><url><loc>…)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    #[serde(default)]
    loc: String,
}

/// Parses XML sitemaps, keeping only Go-language job-offer locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapParser;

impl SitemapParser {
    pub fn new() -> Self {
        Self
    }

    fn is_relevant(url: &str) -> bool {
        !url.is_empty()
            && url.contains("/job-offer/")
            && (url.contains("golang") || url.contains("-go-"))
    }
}

impl FeedParser for SitemapParser {
    fn parse(&self, body: &str) -> Result<Vec<String>, AppError> {
        let sitemap: UrlSet = quick_xml::de::from_str(body)
            .map_err(|e| AppError::FeedError(format!("parse sitemap: {e}")))?;

        if sitemap.urls.is_empty() {
            return Err(AppError::FeedError("no URLs found in sitemap".into()));
        }

        Ok(sitemap
            .urls
            .into_iter()
            .map(|entry| entry.loc)
            .filter(|loc| Self::is_relevant(loc))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RSS 2.0 (<rss><channel><item><link>…)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    link: String,
}

/// Parses RSS 2.0 feeds; invalid item links are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssParser;

impl RssParser {
    pub fn new() -> Self {
        Self
    }
}

impl FeedParser for RssParser {
    fn parse(&self, body: &str) -> Result<Vec<String>, AppError> {
        let rss: Rss = quick_xml::de::from_str(body)
            .map_err(|e| AppError::FeedError(format!("parse RSS feed: {e}")))?;

        if rss.channel.items.is_empty() {
            return Err(AppError::FeedError("no items found in RSS feed".into()));
        }

        let links = rss
            .channel
            .items
            .into_iter()
            .filter_map(|item| match url::Url::parse(&item.link) {
                Ok(parsed) => Some(parsed.to_string()),
                Err(e) => {
                    tracing::warn!(link = %item.link, error = %e, "invalid URL in RSS feed");
                    None
                }
            })
            .collect();

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_extracts_job_offer_urls() {
        let body = "<urlset><url><loc>https://example.com/job-offer/12-go-1</loc></url>\n\
                    <url><loc>https://example.com/job-offer/12-go-2</loc></url></urlset>";

        let urls = SitemapParser::new().parse(body).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/job-offer/12-go-1".to_string(),
                "https://example.com/job-offer/12-go-2".to_string(),
            ]
        );
    }

    #[test]
    fn test_sitemap_filters_irrelevant_urls() {
        let body = "<urlset>\
                    <url><loc>https://example.com/job-offer/senior-golang-dev</loc></url>\
                    <url><loc>https://example.com/job-offer/senior-java-dev</loc></url>\
                    <url><loc>https://example.com/about</loc></url>\
                    </urlset>";

        let urls = SitemapParser::new().parse(body).unwrap();
        assert_eq!(
            urls,
            vec!["https://example.com/job-offer/senior-golang-dev".to_string()]
        );
    }

    #[test]
    fn test_empty_sitemap_is_an_error() {
        let err = SitemapParser::new().parse("<urlset></urlset>").unwrap_err();
        assert!(err.to_string().contains("no URLs found in sitemap"));
    }

    #[test]
    fn test_malformed_sitemap_is_an_error() {
        let err = SitemapParser::new().parse("not xml at all <<<").unwrap_err();
        assert!(matches!(err, AppError::FeedError(_)));
    }

    #[test]
    fn test_rss_extracts_links() {
        let body =
            "<rss><channel><item><link>https://a/b</link></item></channel></rss>";

        let urls = RssParser::new().parse(body).unwrap();
        assert_eq!(urls, vec!["https://a/b".to_string()]);
    }

    #[test]
    fn test_empty_rss_channel_is_an_error() {
        let err = RssParser::new()
            .parse("<rss><channel></channel></rss>")
            .unwrap_err();
        assert!(err.to_string().contains("no items found in RSS feed"));
    }

    #[test]
    fn test_rss_skips_invalid_links() {
        let body = "<rss><channel>\
                    <item><link>https://a/b</link></item>\
                    <item><link>not a url</link></item>\
                    <item><link>https://a/c</link></item>\
                    </channel></rss>";

        let urls = RssParser::new().parse(body).unwrap();
        assert_eq!(
            urls,
            vec!["https://a/b".to_string(), "https://a/c".to_string()]
        );
    }
}

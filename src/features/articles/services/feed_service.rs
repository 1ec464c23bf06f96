use std::io::Cursor;
use std::sync::Arc;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::error::{AppError, Result};
use crate::features::articles::dtos::ArticleSummaryDto;
use crate::features::articles::services::ArticleService;
use crate::shared::constants::FEED_ITEM_LIMIT;

const DUBLIN_CORE_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Channel-level metadata of the RSS feed
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    /// Public site root, without trailing slash
    pub site_url: String,
}

impl FeedChannel {
    fn article_url(&self, slug: &str) -> String {
        format!("{}/article/{}", self.site_url.trim_end_matches('/'), slug)
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| AppError::Internal(format!("Failed to write RSS: {}", e)))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Render an RSS 2.0 document for the given articles
///
/// Authors are display names, not addresses, so they go in `dc:creator`.
pub fn render_rss(channel: &FeedChannel, items: &[ArticleSummaryDto]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:dc", DUBLIN_CORE_NS));
    write(&mut writer, Event::Start(rss))?;
    write(&mut writer, Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.site_url)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "language", "fr")?;
    if let Some(latest) = items.iter().filter_map(|a| a.published_at).max() {
        write_text_element(&mut writer, "lastBuildDate", &latest.to_rfc2822())?;
    }

    for article in items {
        let link = channel.article_url(&article.slug);

        write(&mut writer, Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &article.title)?;
        write_text_element(&mut writer, "link", &link)?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        write(&mut writer, Event::Start(guid))?;
        write(&mut writer, Event::Text(BytesText::new(&link)))?;
        write(&mut writer, Event::End(BytesEnd::new("guid")))?;

        if let Some(excerpt) = &article.excerpt {
            write_text_element(&mut writer, "description", excerpt)?;
        }
        if let Some(category) = &article.category {
            write_text_element(&mut writer, "category", &category.name)?;
        }
        if let Some(author) = &article.author_name {
            write_text_element(&mut writer, "dc:creator", author)?;
        }
        let date = article.published_at.unwrap_or(article.created_at);
        write_text_element(&mut writer, "pubDate", &date.to_rfc2822())?;

        write(&mut writer, Event::End(BytesEnd::new("item")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    write(&mut writer, Event::End(BytesEnd::new("rss")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| AppError::Internal(format!("Generated RSS is not UTF-8: {}", e)))
}

/// Builds the public RSS feed from the latest published articles
pub struct FeedService {
    articles: Arc<ArticleService>,
    channel: FeedChannel,
}

impl FeedService {
    pub fn new(articles: Arc<ArticleService>, channel: FeedChannel) -> Self {
        Self { articles, channel }
    }

    pub async fn rss(&self) -> Result<String> {
        let items = self.articles.latest_published(FEED_ITEM_LIMIT).await?;
        render_rss(&self.channel, &items).inspect_err(|e| {
            tracing::error!("Failed to render RSS feed: {:?}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::articles::dtos::ArticleCategoryDto;
    use crate::features::articles::models::ArticleStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn channel() -> FeedChannel {
        FeedChannel {
            title: "Mad2Moi".to_string(),
            description: "Le blog".to_string(),
            site_url: "https://blog.example.com/".to_string(),
        }
    }

    fn article(title: &str, slug: &str) -> ArticleSummaryDto {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        ArticleSummaryDto {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            excerpt: Some("Un résumé".to_string()),
            status: ArticleStatus::Published,
            category: Some(ArticleCategoryDto {
                id: Uuid::new_v4(),
                name: "Santé".to_string(),
                slug: "sante".to_string(),
                color: None,
                icon: None,
            }),
            is_featured: false,
            featured_image: None,
            tags: vec![],
            read_time: 1,
            view_count: 0,
            author_name: Some("Admin".to_string()),
            published_at: Some(date),
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_render_rss_channel_and_items() {
        let xml = render_rss(&channel(), &[article("Premier", "premier")]).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<rss version=\"2.0\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">"
        ));
        assert!(xml.contains("<title>Mad2Moi</title>"));
        assert!(xml.contains("<link>https://blog.example.com/article/premier</link>"));
        assert!(xml.contains("<category>Santé</category>"));
        assert!(xml.contains("<pubDate>Fri, 15 Mar 2024 10:30:00 +0000</pubDate>"));
    }

    #[test]
    fn test_render_rss_author_as_creator() {
        let xml = render_rss(&channel(), &[article("Premier", "premier")]).unwrap();
        assert!(xml.contains("<dc:creator>Admin</dc:creator>"));
        assert!(!xml.contains("<author>"));

        let mut anonymous = article("Second", "second");
        anonymous.author_name = None;
        let xml = render_rss(&channel(), &[anonymous]).unwrap();
        assert!(!xml.contains("dc:creator>"));
    }

    #[test]
    fn test_render_rss_escapes_text() {
        let xml = render_rss(&channel(), &[article("Tips & <tricks>", "tips")]).unwrap();
        assert!(xml.contains("<title>Tips &amp; &lt;tricks&gt;</title>"));
    }

    #[test]
    fn test_render_rss_without_items() {
        let xml = render_rss(&channel(), &[]).unwrap();
        assert!(xml.contains("<channel>"));
        assert!(!xml.contains("<item>"));
        assert!(!xml.contains("lastBuildDate"));
    }
}

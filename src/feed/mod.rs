//! Syndication documents: RSS feed, sitemap and robots.txt

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::content::{ContentRecord, Post};
use crate::helpers::full_url_for;
use crate::store::ContentStore;

/// Cache policy sent with the feed
pub const FEED_CACHE_CONTROL: &str = "s-maxage=86400, stale-while-revalidate=3600";

/// Newest `feed.size` posts by date, whatever the listing order
fn latest_posts<'a>(store: &'a ContentStore, limit: usize) -> Vec<&'a Post> {
    let mut posts: Vec<&Post> = store.posts().iter().collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts.truncate(limit);
    posts
}

/// Build the RSS 2.0 feed
pub fn rss(config: &SiteConfig, store: &ContentStore, now: DateTime<Utc>) -> String {
    let base_url = config.base_url();
    let mut feed = String::new();

    feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    feed.push('\n');
    feed.push_str(
        r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:atom="http://www.w3.org/2005/Atom">"#,
    );
    feed.push_str("\n<channel>\n");
    feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
    feed.push_str(&format!("  <link>{}</link>\n", escape_xml(base_url)));
    feed.push_str(&format!(
        "  <description>{}</description>\n",
        escape_xml(&config.description)
    ));
    feed.push_str(&format!(
        "  <atom:link href=\"{}/feed\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(base_url)
    ));
    feed.push_str(&format!(
        "  <lastBuildDate>{}</lastBuildDate>\n",
        now.to_rfc2822()
    ));
    feed.push_str("  <copyright>CC BY-NC-SA 4.0</copyright>\n");

    for post in latest_posts(store, config.feed.size) {
        let link = full_url_for(config, &post.permalink);

        feed.push_str("  <item>\n");
        feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
        feed.push_str(&format!("    <link>{}</link>\n", escape_xml(&link)));
        feed.push_str(&format!(
            "    <guid isPermaLink=\"false\">{}</guid>\n",
            escape_xml(&post.slug)
        ));
        feed.push_str(&format!("    <pubDate>{}</pubDate>\n", post.date.to_rfc2822()));
        if !config.author.name.is_empty() {
            feed.push_str(&format!(
                "    <author>{}</author>\n",
                escape_xml(&config.author.name)
            ));
        }
        feed.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(post.description())
        ));
        if config.feed.full {
            feed.push_str(&format!(
                "    <content:encoded><![CDATA[{}]]></content:encoded>\n",
                strip_invalid_xml_chars(&post.content).replace("]]>", "]]]]><![CDATA[>")
            ));
        }
        feed.push_str("  </item>\n");
    }

    feed.push_str("</channel>\n</rss>\n");
    feed
}

/// Build the sitemap: pages first, then posts
pub fn sitemap(config: &SiteConfig, store: &ContentStore) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    let pages = store.pages().iter().map(|p| p as &dyn ContentRecord);
    let posts = store.posts().iter().map(|p| p as &dyn ContentRecord);

    for record in pages.chain(posts) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&full_url_for(config, record.permalink()))
        ));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            record.freshness().format("%Y-%m-%dT%H:%M:%SZ")
        ));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Build robots.txt
pub fn robots(config: &SiteConfig) -> String {
    let base_url = config.base_url();
    format!(
        "User-Agent: *\nAllow: /\n\nHost: {}\nSitemap: {}/sitemap.xml\n",
        base_url, base_url
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip characters that are not allowed in XML 1.0
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortOrder;
    use crate::content::{LoadedContent, Page};
    use chrono::TimeZone;

    fn store(config: &SiteConfig) -> ContentStore {
        let date = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let mut old = Post::new("Old & Gold".into(), "old".into(), date(1), "Notes".into());
        old.summary = "A <summary>".into();
        old.content = "<p>old</p>".into();
        let mut new = Post::new("New".into(), "new".into(), date(2), "Notes".into());
        new.excerpt = "from the body".into();
        new.updated = Some(date(20));

        let content = LoadedContent {
            posts: vec![old, new],
            pages: vec![Page::new("About".into(), "about".into(), date(3))],
            ..Default::default()
        };
        ContentStore::build(config, content).unwrap()
    }

    fn config() -> SiteConfig {
        SiteConfig {
            title: "且听书吟".into(),
            website: "https://yufan.me".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rss_items_newest_first_even_when_sorted_ascending() {
        let mut config = config();
        config.post.sort = SortOrder::Asc;
        config.feed.size = 1;
        let store = store(&config);

        let xml = rss(&config, &store, Utc::now());
        assert!(xml.contains("<title>且听书吟</title>"));
        assert!(xml.contains("<link>https://yufan.me/posts/new</link>"));
        assert!(xml.contains("<description>from the body</description>"));
        assert!(!xml.contains("posts/old"));
    }

    #[test]
    fn test_rss_escapes_and_embeds_content() {
        let config = config();
        let store = store(&config);

        let xml = rss(&config, &store, Utc::now());
        assert!(xml.contains("<title>Old &amp; Gold</title>"));
        assert!(xml.contains("<description>A &lt;summary&gt;</description>"));
        assert!(xml.contains("<![CDATA[<p>old</p>]]>"));

        let mut config = config;
        config.feed.full = false;
        assert!(!rss(&config, &store, Utc::now()).contains("content:encoded>"));
    }

    #[test]
    fn test_sitemap_lists_pages_then_posts_with_freshness() {
        let config = config();
        let store = store(&config);
        let xml = sitemap(&config, &store);

        let about = xml.find("https://yufan.me/about").unwrap();
        let new = xml.find("https://yufan.me/posts/new").unwrap();
        assert!(about < new);
        assert!(xml.contains("<lastmod>2024-01-20T00:00:00Z</lastmod>"));
    }

    #[test]
    fn test_robots() {
        let txt = robots(&config());
        assert!(txt.contains("Sitemap: https://yufan.me/sitemap.xml"));
        assert!(txt.contains("Host: https://yufan.me"));
    }
}

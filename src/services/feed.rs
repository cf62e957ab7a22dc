//! RSS 2.0 rendering for the latest-products feed.

use chrono::{DateTime, Utc};

/// Channel metadata.
#[derive(Debug, Clone)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// One `<item>` of the feed.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<DateTime<Utc>>,
}

/// Render a complete RSS 2.0 document.
pub fn render_rss(channel: &Channel, items: &[FeedItem]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n");
    xml.push_str("  <channel>\n");
    xml.push_str(&format!("    <title>{}</title>\n", xml_escape(&channel.title)));
    xml.push_str(&format!("    <link>{}</link>\n", xml_escape(&channel.link)));
    xml.push_str(&format!(
        "    <description>{}</description>\n",
        xml_escape(&channel.description)
    ));

    for item in items {
        xml.push_str("    <item>\n");
        xml.push_str(&format!("      <title>{}</title>\n", xml_escape(&item.title)));
        xml.push_str(&format!("      <link>{}</link>\n", xml_escape(&item.link)));
        xml.push_str(&format!(
            "      <description>{}</description>\n",
            xml_escape(&item.description)
        ));
        if let Some(pub_date) = item.pub_date {
            xml.push_str(&format!("      <pubDate>{}</pubDate>\n", pub_date.to_rfc2822()));
        }
        xml.push_str(&format!("      <guid>{}</guid>\n", xml_escape(&item.link)));
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_escapes_and_lists_items() {
        let channel = Channel {
            title: "Shop latest products".into(),
            link: "/shop/products".into(),
            description: "Updates".into(),
        };
        let items = vec![FeedItem {
            title: "Tom & Jerry <DVD>".into(),
            link: "/shop/products/1".into(),
            description: "None".into(),
            pub_date: None,
        }];

        let xml = render_rss(&channel, &items);
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<title>Tom &amp; Jerry &lt;DVD&gt;</title>"));
        assert!(xml.contains("<description>None</description>"));
        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(!xml.contains("<pubDate>"));
    }

    #[test]
    fn test_item_with_date_renders_one_element_per_line() {
        let channel = Channel {
            title: "t".into(),
            link: "/".into(),
            description: "d".into(),
        };
        let pub_date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let items = vec![FeedItem {
            title: "Laptop".into(),
            link: "/shop/products/3".into(),
            description: "Portable".into(),
            pub_date: Some(pub_date),
        }];

        let xml = render_rss(&channel, &items);
        let lines: Vec<&str> = xml.lines().map(str::trim).collect();
        assert!(lines.contains(&"<pubDate>Wed, 1 May 2024 12:00:00 +0000</pubDate>"));
        assert!(lines.contains(&"<guid>/shop/products/3</guid>"));
        assert_eq!(lines.last(), Some(&"</rss>"));
    }
}

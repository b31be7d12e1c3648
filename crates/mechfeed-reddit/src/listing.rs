// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing response types and conversion to normalized messages.

use chrono::{DateTime, SecondsFormat};
use mechfeed_core::{NormalizedMessage, Source};
use serde::Deserialize;

use crate::media::Media;

/// `GET /r/<sub>/new.json` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Child {
    pub data: Post,
}

impl Listing {
    /// Posts in listing order, newest first.
    pub fn into_posts(self) -> Vec<Post> {
        self.data.children.into_iter().map(|c| c.data).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub url: String,
    /// Seconds since the epoch.
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link_flair_text: Option<String>,
    /// Rendered body, scanned for media links.
    #[serde(default)]
    pub selftext_html: Option<String>,
    #[serde(default)]
    pub selftext: String,
}

impl Post {
    /// `created` as an RFC 3339 UTC timestamp, empty if out of range.
    pub fn timestamp(&self) -> String {
        let millis = (self.created * 1000.0).round() as i64;
        DateTime::from_timestamp_millis(millis)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default()
    }

    pub fn into_message(self, media: Media) -> NormalizedMessage {
        let timestamp = self.timestamp();
        NormalizedMessage::builder(Source::Feed, self.id)
            .content(self.selftext)
            .author(self.author)
            .timestamp(timestamp)
            .extra("title", self.title)
            .extra("url", self.url)
            .extra("category", self.link_flair_text.unwrap_or_default())
            .extra("album", media.album.unwrap_or_default())
            .extra("thumbnail", media.thumbnail.unwrap_or_default())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{"kind":"Listing","data":{"after":"t3_x","children":[
        {"kind":"t3","data":{"id":"b","author":"seller","url":"https://www.reddit.com/r/mechmarket/comments/b/",
         "created":1700000000.0,"title":"[US-CA] [H] GMK Olivia [W] PayPal","link_flair_text":"Selling",
         "selftext_html":"&lt;p&gt;&lt;a href=\"https://imgur.com/a/xyz\"&gt;timestamp&lt;/a&gt;","selftext":"Olivia++ base kit"}},
        {"kind":"t3","data":{"id":"a","author":"buyer","created":1699999990.5,"title":"[WTB] Kaze"}}
    ]}}"#;

    #[test]
    fn parses_listing_newest_first() {
        let posts: Vec<Post> = serde_json::from_str::<Listing>(LISTING).unwrap().into_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "b");
        assert_eq!(posts[1].link_flair_text, None);
    }

    #[test]
    fn converts_to_feed_message() {
        let post = serde_json::from_str::<Listing>(LISTING).unwrap().into_posts().remove(0);
        let msg = post.into_message(Media {
            album: Some("https://imgur.com/a/xyz".into()),
            thumbnail: Some("https://i.imgur.com/1.jpeg".into()),
        });

        assert_eq!(msg.source(), Source::Feed);
        assert_eq!(msg.content(), "Olivia++ base kit");
        assert_eq!(msg.origin_channel(), "");
        assert_eq!(msg.timestamp(), "2023-11-14T22:13:20Z");
        assert_eq!(msg.extra("category"), Some("Selling"));
        assert_eq!(msg.extra("album"), Some("https://imgur.com/a/xyz"));
        assert_eq!(msg.extra("thumbnail"), Some("https://i.imgur.com/1.jpeg"));
    }
}

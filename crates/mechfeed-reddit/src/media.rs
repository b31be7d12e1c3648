// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media link extraction and album resolution.

use std::sync::LazyLock;

use mechfeed_core::MechfeedError;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

static IMGUR_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="([^"]*imgur[^"]*)""#).expect("imgur link pattern is valid")
});

/// Media attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
    /// First media link found in the body.
    pub album: Option<String>,
    /// Direct image URL, if one could be determined.
    pub thumbnail: Option<String>,
}

/// Every imgur link in a rendered post body, in document order.
pub fn extract_media_links(body: &str) -> Vec<String> {
    IMGUR_LINK
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// How a media link should be treated.
#[derive(Debug, PartialEq, Eq)]
pub enum MediaLink<'a> {
    /// The link already points at an image file.
    Image(&'a str),
    /// The last path segment is an album id that needs resolving.
    Album(&'a str),
}

pub fn classify(link: &str) -> MediaLink<'_> {
    let last = link.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if last.contains('.') {
        MediaLink::Image(link)
    } else {
        MediaLink::Album(last)
    }
}

#[derive(Debug, Deserialize)]
struct AlbumResponse {
    #[serde(default)]
    media: Vec<AlbumMedia>,
}

#[derive(Debug, Deserialize)]
struct AlbumMedia {
    url: String,
}

/// Resolves album ids to their first image via the album endpoint.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: reqwest::Client,
    album_url: String,
    client_id: Option<String>,
}

impl MediaResolver {
    pub fn new(client: reqwest::Client, album_url: String, client_id: Option<String>) -> Self {
        Self {
            client,
            album_url,
            client_id,
        }
    }

    /// Extracts the first media link from `body` and works out a thumbnail.
    /// Resolution failures leave the thumbnail empty.
    pub async fn media_for(&self, body: &str) -> Media {
        let Some(first) = extract_media_links(body).into_iter().next() else {
            return Media::default();
        };

        let thumbnail = match classify(&first) {
            MediaLink::Image(url) => Some(url.to_string()),
            MediaLink::Album(id) => match self.resolve_album(id).await {
                Ok(url) => url,
                Err(e) => {
                    debug!(album = id, error = %e, "album resolution failed");
                    None
                }
            },
        };

        Media {
            album: Some(first),
            thumbnail,
        }
    }

    /// First media URL of an album. `Ok(None)` for empty albums or when no
    /// client id is configured.
    pub async fn resolve_album(&self, album_id: &str) -> Result<Option<String>, MechfeedError> {
        let Some(client_id) = self.client_id.as_deref() else {
            return Ok(None);
        };

        let base = format!("{}/{album_id}", self.album_url.trim_end_matches('/'));
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| MechfeedError::decode(format!("invalid album url {base}"), e))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("include", "media");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MechfeedError::transport("album request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MechfeedError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let album: AlbumResponse = response
            .json()
            .await
            .map_err(|e| MechfeedError::decode("malformed album response", e))?;
        Ok(album.media.into_iter().next().map(|m| m.url))
    }
}

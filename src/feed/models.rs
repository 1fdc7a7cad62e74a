//! Post records as returned by the platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single post (status) from search results or a user timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Platform post ID.
    pub id: u64,
    /// Body text.
    #[serde(default)]
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Posting user.
    pub author: Author,
    /// Hashtags attached to the post, in order of appearance.
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    /// Geotag, if the author shared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Coordinates>,
}

impl Post {
    /// Creates a post stamped with the current time and no geotag.
    ///
    /// The body text is the hashtags rendered with their `#` marker.
    pub fn new(id: u64, screen_name: &str, hashtags: &[&str]) -> Self {
        let hashtags: Vec<Hashtag> = hashtags
            .iter()
            .map(|h| Hashtag {
                text: h.to_string(),
            })
            .collect();
        let text = hashtags
            .iter()
            .map(|h| format!("#{}", h.text))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id,
            text,
            created_at: Utc::now(),
            author: Author {
                screen_name: screen_name.to_string(),
            },
            hashtags,
            geo: None,
        }
    }

    /// Returns true if any attached hashtag matches one of `tags` exactly.
    pub fn has_any_hashtag(&self, tags: &[String]) -> bool {
        self.hashtags.iter().any(|h| tags.contains(&h.text))
    }
}

/// The author of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Unique screen-name, without the leading `@`.
    pub screen_name: String,
}

/// A hashtag entity attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hashtag {
    /// Hashtag text without the leading `#`.
    pub text: String,
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

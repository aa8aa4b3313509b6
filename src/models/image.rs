// Stored image summary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::container::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repo_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repo_digests: Vec<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub shared_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_size: Option<i64>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub containers: i64,
}

impl Image {
    /// Repository and tag of the first repo tag, `<none>` when untagged.
    pub fn repo_and_tag(&self) -> (&str, &str) {
        let Some(first) = self.repo_tags.first() else {
            return ("<none>", "<none>");
        };
        // Split on the last ':' that comes after the final '/', so registry ports stay in the repo.
        let name_start = first.rfind('/').map_or(0, |i| i + 1);
        match first[name_start..].rfind(':') {
            Some(i) => (&first[..name_start + i], &first[name_start + i + 1..]),
            None => (first.as_str(), "<none>"),
        }
    }

    /// Id without the `sha256:` prefix, truncated to 12 chars.
    pub fn short_id(&self) -> &str {
        let id = self.id.strip_prefix("sha256:").unwrap_or(&self.id);
        match id.char_indices().nth(12) {
            Some((end, _)) => &id[..end],
            None => id,
        }
    }
}

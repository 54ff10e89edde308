use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

/// Opaque, immutable note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters of the identifier, used in fallback titles.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Window position and size, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 4,
            y: 2,
            width: 40,
            height: 12,
        }
    }
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl NoteRecord {
    pub fn new(id: NoteId, geometry: Geometry) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            geometry,
        }
    }

    /// Title shown in lists and chrome; falls back when nothing is derived yet.
    pub fn display_title(&self) -> String {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            fallback_title(&self.id)
        } else {
            trimmed.to_string()
        }
    }
}

pub fn fallback_title(id: &NoteId) -> String {
    format!("New Note {}", id.short())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_flat_keys_on_disk() -> serde_json::Result<()> {
        let mut record = NoteRecord::new(NoteId::from("abc"), Geometry::new(1, 2, 30, 10));
        record.title = "hello".into();
        record.content = "hello".into();
        let value = serde_json::to_value(&record)?;
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "title": "hello",
                "content": "hello",
                "x": 1,
                "y": 2,
                "width": 30,
                "height": 10,
            })
        );
        Ok(())
    }

    #[test]
    fn missing_and_null_fields_take_defaults() -> serde_json::Result<()> {
        let record: NoteRecord =
            serde_json::from_str(r#"{"id": "n1", "title": null, "x": 7}"#)?;
        assert_eq!(record.title, "");
        assert_eq!(record.content, "");
        assert_eq!(
            record.geometry,
            Geometry {
                x: 7,
                ..Geometry::default()
            }
        );
        Ok(())
    }

    #[test]
    fn short_id_and_fallback_title() {
        let id = NoteId::from("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        assert_eq!(NoteId::from("abc").short(), "abc");
        let record = NoteRecord::new(id, Geometry::default());
        assert_eq!(record.display_title(), "New Note 01234567");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(NoteId::generate(), NoteId::generate());
    }
}

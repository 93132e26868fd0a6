use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const NOTE_TYPE_TEXT: &str = "text";
pub const NOTE_TYPE_LINK: &str = "link";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Document {
    pub subjects: Vec<Subject>,
}

impl Document {
    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == subject_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub chapters: Vec<Chapter>,
}

impl Subject {
    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == chapter_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub teachers: Vec<Teacher>,
    pub videos: Vec<Video>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Teacher {
    pub name: String,
    pub channel: String,
    pub topic: String,
    pub video_id: String,
}

impl Teacher {
    /// Two teachers are the same entry when name and video id both match.
    pub fn same_entry(&self, other: &Teacher) -> bool {
        self.name == other.name && self.video_id == other.video_id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
    pub title: String,
    pub youtube_id: String,
    pub duration: String,
}

impl Video {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.youtube_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Note {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl Note {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: NOTE_TYPE_TEXT.to_owned(),
            content: content.into(),
        }
    }

    pub fn link(content: impl Into<String>) -> Self {
        Self {
            kind: NOTE_TYPE_LINK.to_owned(),
            content: content.into(),
        }
    }

    pub fn is_link(&self) -> bool {
        self.kind == NOTE_TYPE_LINK
    }

    pub fn same_entry(&self, other: &Note) -> bool {
        self.kind == other.kind && self.content == other.content
    }
}

/// Watched flags keyed by YouTube id. Kept apart from [`Document`], so ids of
/// deleted videos may linger here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProgressMap(BTreeMap<String, bool>);

impl ProgressMap {
    pub fn is_watched(&self, youtube_id: &str) -> bool {
        self.0.get(youtube_id).copied().unwrap_or(false)
    }

    /// Flips the flag for `youtube_id` and returns the new value.
    pub fn toggle(&mut self, youtube_id: &str) -> bool {
        let watched = !self.is_watched(youtube_id);
        self.0.insert(youtube_id.to_owned(), watched);
        watched
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_camel_case_field_names() -> anyhow::Result<()> {
        let json = r#"{
  "subjects": [{
    "id": "science",
    "name": "Science",
    "description": "Physics, chemistry and biology",
    "chapters": [{
      "id": "light",
      "title": "Light",
      "overview": "Reflection and refraction",
      "teachers": [{"name": "A", "channel": "C", "topic": "T", "videoId": "v1"}],
      "videos": [{"title": "Intro", "youtubeId": "v1", "duration": "10:00"}],
      "notes": [{"type": "link", "content": "https://example.com"}]
    }]
  }]
}"#;
        let doc: Document = serde_json::from_str(json)?;
        let chapter = &doc.subjects[0].chapters[0];
        assert_eq!(chapter.teachers[0].video_id, "v1");
        assert_eq!(chapter.videos[0].youtube_id, "v1");
        assert!(chapter.notes[0].is_link());

        let value = serde_json::to_value(&doc)?;
        let chapter = &value["subjects"][0]["chapters"][0];
        assert_eq!(chapter["teachers"][0]["videoId"], "v1");
        assert_eq!(chapter["videos"][0]["youtubeId"], "v1");
        assert_eq!(chapter["notes"][0]["type"], "link");
        Ok(())
    }

    #[test]
    fn missing_fields_default_to_empty() -> anyhow::Result<()> {
        let doc: Document = serde_json::from_str(r#"{"subjects": [{"id": "maths"}]}"#)?;
        assert_eq!(doc.subjects[0].name, "");
        assert!(doc.subjects[0].chapters.is_empty());

        let doc: Document = serde_json::from_str("{}")?;
        assert!(doc.subjects.is_empty());
        Ok(())
    }

    #[test]
    fn unknown_note_type_is_kept_verbatim() -> anyhow::Result<()> {
        let note: Note = serde_json::from_str(r#"{"type": "pdf", "content": "x"}"#)?;
        assert_eq!(note.kind, "pdf");
        assert!(!note.is_link());
        Ok(())
    }

    #[test]
    fn progress_toggle_flips_and_defaults_to_unwatched() {
        let mut progress = ProgressMap::default();
        assert!(!progress.is_watched("abc"));
        assert!(progress.toggle("abc"));
        assert!(progress.is_watched("abc"));
        assert!(!progress.toggle("abc"));
        assert!(!progress.is_watched("abc"));
        assert_eq!(progress.len(), 1);
    }
}

use serde::{Deserialize, Serialize};

use crate::model::{Chapter, Document, Note, Subject, Teacher, Video};
use crate::slug::normalize;

/// One admin form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpsertInput {
    pub subject_name: String,
    pub chapter_title: String,
    pub chapter_overview: String,
    pub teacher: Teacher,
    pub video: Video,
    pub note: Note,
}

impl UpsertInput {
    /// Trims every text field except the note type.
    fn trimmed(&self) -> Self {
        let trim = |value: &str| value.trim().to_owned();
        Self {
            subject_name: trim(&self.subject_name),
            chapter_title: trim(&self.chapter_title),
            chapter_overview: trim(&self.chapter_overview),
            teacher: Teacher {
                name: trim(&self.teacher.name),
                channel: trim(&self.teacher.channel),
                topic: trim(&self.teacher.topic),
                video_id: trim(&self.teacher.video_id),
            },
            video: Video {
                title: trim(&self.video.title),
                youtube_id: trim(&self.video.youtube_id),
                duration: trim(&self.video.duration),
            },
            note: Note {
                kind: self.note.kind.clone(),
                content: trim(&self.note.content),
            },
        }
    }

    fn validate(&self) -> Result<(), UpsertError> {
        let required = [
            ("subjectName", self.subject_name.as_str()),
            ("chapterTitle", self.chapter_title.as_str()),
            ("chapterOverview", self.chapter_overview.as_str()),
            ("teacher.name", self.teacher.name.as_str()),
            ("teacher.channel", self.teacher.channel.as_str()),
            ("teacher.topic", self.teacher.topic.as_str()),
            ("teacher.videoId", self.teacher.video_id.as_str()),
            ("video.title", self.video.title.as_str()),
            ("video.youtubeId", self.video.youtube_id.as_str()),
            ("video.duration", self.video.duration.as_str()),
            ("note.type", self.note.kind.trim()),
            ("note.content", self.note.content.as_str()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(UpsertError::EmptyField { field });
            }
        }

        if normalize(&self.subject_name).is_empty() {
            return Err(UpsertError::EmptyId {
                field: "subjectName",
                value: self.subject_name.clone(),
            });
        }
        if normalize(&self.chapter_title).is_empty() {
            return Err(UpsertError::EmptyId {
                field: "chapterTitle",
                value: self.chapter_title.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpsertError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} {value:?} does not produce a usable id")]
    EmptyId { field: &'static str, value: String },
}

/// What a submission changed. Skipped duplicates are reported as `false`
/// rather than as errors.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub subject_id: String,
    pub chapter_id: String,
    pub subject_created: bool,
    pub chapter_created: bool,
    pub teacher_added: bool,
    pub video_added: bool,
    pub note_added: bool,
}

/// Creates or updates the subject and chapter named by `input`, then appends
/// each child record unless an equal-keyed one already exists.
///
/// An existing subject keeps its name and description. An existing chapter
/// keeps its title but always takes the new overview. On a validation error
/// the document is not modified.
pub fn upsert(doc: &mut Document, input: &UpsertInput) -> Result<UpsertOutcome, UpsertError> {
    let input = input.trimmed();
    input.validate()?;

    let subject_id = normalize(&input.subject_name);
    let chapter_id = normalize(&input.chapter_title);
    let mut outcome = UpsertOutcome {
        subject_id: subject_id.clone(),
        chapter_id: chapter_id.clone(),
        ..UpsertOutcome::default()
    };

    let subject_idx = match doc.subjects.iter().position(|s| s.id == subject_id) {
        Some(idx) => idx,
        None => {
            doc.subjects.push(Subject {
                id: subject_id.clone(),
                name: input.subject_name.clone(),
                description: format!("{} content created from admin panel.", input.subject_name),
                chapters: Vec::new(),
            });
            outcome.subject_created = true;
            doc.subjects.len() - 1
        }
    };
    let subject = &mut doc.subjects[subject_idx];

    let chapter_idx = match subject.chapters.iter().position(|c| c.id == chapter_id) {
        Some(idx) => {
            subject.chapters[idx].overview = input.chapter_overview.clone();
            idx
        }
        None => {
            subject.chapters.push(Chapter {
                id: chapter_id.clone(),
                title: input.chapter_title.clone(),
                overview: input.chapter_overview.clone(),
                ..Chapter::default()
            });
            outcome.chapter_created = true;
            subject.chapters.len() - 1
        }
    };
    let chapter = &mut subject.chapters[chapter_idx];

    if !chapter.teachers.iter().any(|t| t.same_entry(&input.teacher)) {
        chapter.teachers.push(input.teacher.clone());
        outcome.teacher_added = true;
    }
    if !chapter
        .videos
        .iter()
        .any(|v| v.youtube_id == input.video.youtube_id)
    {
        chapter.videos.push(input.video.clone());
        outcome.video_added = true;
    }
    if !chapter.notes.iter().any(|n| n.same_entry(&input.note)) {
        chapter.notes.push(input.note.clone());
        outcome.note_added = true;
    }

    tracing::info!(
        subject_id = %subject_id,
        chapter_id = %chapter_id,
        subject_created = outcome.subject_created,
        chapter_created = outcome.chapter_created,
        teacher_added = outcome.teacher_added,
        video_added = outcome.video_added,
        note_added = outcome.note_added,
        "upserted chapter content"
    );
    Ok(outcome)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubjectSummary {
    pub name: String,
    pub chapter_count: usize,
    pub chapters: Vec<ChapterSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChapterSummary {
    pub title: String,
    pub video_count: usize,
    pub note_count: usize,
}

impl std::fmt::Display for SubjectSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} chapters)", self.name, self.chapter_count)
    }
}

impl std::fmt::Display for ChapterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} — {} video(s), {} note(s)",
            self.title, self.video_count, self.note_count
        )
    }
}

pub fn summary(doc: &Document) -> Vec<SubjectSummary> {
    doc.subjects
        .iter()
        .map(|subject| SubjectSummary {
            name: subject.name.clone(),
            chapter_count: subject.chapters.len(),
            chapters: subject
                .chapters
                .iter()
                .map(|chapter| ChapterSummary {
                    title: chapter.title.clone(),
                    video_count: chapter.videos.len(),
                    note_count: chapter.notes.len(),
                })
                .collect(),
        })
        .collect()
}

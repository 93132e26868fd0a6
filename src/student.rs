use serde::{Deserialize, Serialize};

use crate::content_store::ContentStore;
use crate::model::{Chapter, Document, Note, ProgressMap, Subject, Teacher, Video};
use crate::progress::ProgressStore;

pub const PLACEHOLDER_TITLE: &str = "No chapter selected";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    NoSubject,
    NoChapters,
    ChapterUnavailable,
}

impl Placeholder {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoSubject => "Select a subject to begin.",
            Self::NoChapters => "No chapters available for this subject yet.",
            Self::ChapterUnavailable => "Chapter details unavailable.",
        }
    }
}

/// Subject/chapter ids requested by a caller. Unknown ids are allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

/// Student-side state: the document plus the current subject/chapter.
#[derive(Debug, Clone)]
pub struct StudentState {
    document: Document,
    selected_subject_id: Option<String>,
    selected_chapter_id: Option<String>,
    placeholder: Placeholder,
}

impl StudentState {
    /// Selects the first subject (and so its first chapter) when one exists.
    pub fn boot(document: Document) -> Self {
        let first_subject = document.subjects.first().map(|subject| subject.id.clone());
        let mut state = Self {
            document,
            selected_subject_id: None,
            selected_chapter_id: None,
            placeholder: Placeholder::NoSubject,
        };
        if let Some(subject_id) = first_subject {
            state.select_subject(&subject_id);
        }
        state
    }

    /// Boots, then replays the requested selection on top.
    pub fn restore(document: Document, selection: &Selection) -> Self {
        let mut state = Self::boot(document);
        if let Some(subject_id) = selection.subject.as_deref() {
            state.select_subject(subject_id);
        }
        if let Some(chapter_id) = selection.chapter.as_deref() {
            state.select_chapter(chapter_id);
        }
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.document.subject(self.selected_subject_id.as_deref()?)
    }

    pub fn selected_chapter(&self) -> Option<&Chapter> {
        self.selected_subject()?
            .chapter(self.selected_chapter_id.as_deref()?)
    }

    pub fn selection(&self) -> Selection {
        Selection {
            subject: self.selected_subject_id.clone(),
            chapter: self.selected_chapter_id.clone(),
        }
    }

    pub fn select_subject(&mut self, subject_id: &str) {
        let subject = self.document.subject(subject_id);
        self.selected_subject_id = subject.map(|subject| subject.id.clone());
        let first_chapter = subject
            .and_then(|subject| subject.chapters.first())
            .map(|chapter| chapter.id.clone());
        self.selected_chapter_id = None;

        match first_chapter {
            Some(chapter_id) => self.select_chapter(&chapter_id),
            None => {
                tracing::debug!(subject_id, "no chapters to show for subject");
                self.placeholder = Placeholder::NoChapters;
            }
        }
    }

    pub fn select_chapter(&mut self, chapter_id: &str) {
        self.selected_chapter_id = self
            .selected_subject()
            .and_then(|subject| subject.chapter(chapter_id))
            .map(|chapter| chapter.id.clone());
        if self.selected_chapter_id.is_none() {
            tracing::debug!(chapter_id, "chapter not found in selected subject");
            self.placeholder = Placeholder::ChapterUnavailable;
        }
    }

    pub fn view(&self, progress: &ProgressMap) -> StudentView {
        let subject = self.selected_subject();
        let chapter = self.selected_chapter();

        let subjects = self
            .document
            .subjects
            .iter()
            .map(|s| NavItem {
                id: s.id.clone(),
                label: s.name.clone(),
                active: subject.is_some_and(|selected| selected.id == s.id),
            })
            .collect();

        let chapter_heading = match subject {
            Some(subject) => format!("{} Chapters", subject.name),
            None => "Chapters".to_owned(),
        };

        let chapters = subject
            .map(|subject| {
                subject
                    .chapters
                    .iter()
                    .map(|c| NavItem {
                        id: c.id.clone(),
                        label: c.title.clone(),
                        active: chapter.is_some_and(|selected| selected.id == c.id),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let content = match chapter {
            Some(chapter) => ChapterContent::Details(ChapterDetails::new(chapter, progress)),
            None => ChapterContent::Placeholder {
                title: PLACEHOLDER_TITLE.to_owned(),
                message: self.placeholder.message().to_owned(),
                progress_percent: 0,
            },
        };

        StudentView {
            subjects,
            chapter_heading,
            chapters,
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StudentView {
    pub subjects: Vec<NavItem>,
    pub chapter_heading: String,
    pub chapters: Vec<NavItem>,
    pub content: ChapterContent,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChapterContent {
    Placeholder {
        title: String,
        message: String,
        progress_percent: u32,
    },
    Details(ChapterDetails),
}

impl ChapterContent {
    pub fn progress_percent(&self) -> u32 {
        match self {
            Self::Placeholder {
                progress_percent, ..
            } => *progress_percent,
            Self::Details(details) => details.progress_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChapterDetails {
    pub title: String,
    pub overview: String,
    pub teachers: Vec<Teacher>,
    pub videos: Vec<VideoView>,
    pub notes: Vec<NoteView>,
    pub progress_percent: u32,
}

impl ChapterDetails {
    fn new(chapter: &Chapter, progress: &ProgressMap) -> Self {
        Self {
            title: chapter.title.clone(),
            overview: chapter.overview.clone(),
            teachers: chapter.teachers.clone(),
            videos: chapter
                .videos
                .iter()
                .map(|video| VideoView::new(video, progress.is_watched(&video.youtube_id)))
                .collect(),
            notes: chapter.notes.iter().map(NoteView::from).collect(),
            progress_percent: progress_percent(chapter, progress),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoView {
    pub title: String,
    pub youtube_id: String,
    pub duration: String,
    pub embed_url: String,
    pub watched: bool,
    pub toggle_label: String,
}

impl VideoView {
    fn new(video: &Video, watched: bool) -> Self {
        let toggle_label = if watched {
            "Marked as Watched"
        } else {
            "Mark as Watched"
        };
        Self {
            title: video.title.clone(),
            youtube_id: video.youtube_id.clone(),
            duration: video.duration.clone(),
            embed_url: video.embed_url(),
            watched,
            toggle_label: toggle_label.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteView {
    Text {
        content: String,
    },
    Link {
        href: String,
        label: String,
        target: String,
        rel: String,
    },
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        if note.is_link() {
            Self::Link {
                href: note.content.clone(),
                label: note.content.clone(),
                target: "_blank".to_owned(),
                rel: "noopener noreferrer".to_owned(),
            }
        } else {
            Self::Text {
                content: note.content.clone(),
            }
        }
    }
}

/// Share of the chapter's videos marked watched, rounded to a whole percent.
pub fn progress_percent(chapter: &Chapter, progress: &ProgressMap) -> u32 {
    let total = chapter.videos.len();
    if total == 0 {
        return 0;
    }
    let watched = chapter
        .videos
        .iter()
        .filter(|video| progress.is_watched(&video.youtube_id))
        .count();
    (watched as f64 * 100.0 / total as f64).round() as u32
}

/// A student page ready to render: state after selection plus the current
/// progress map.
#[derive(Debug, Clone)]
pub struct StudentPage {
    pub state: StudentState,
    pub progress: ProgressMap,
}

impl StudentPage {
    pub async fn open(
        content: &ContentStore,
        progress: &ProgressStore,
        selection: &Selection,
    ) -> anyhow::Result<Self> {
        let document = content.load().await?;
        let progress = progress.load().await?;
        Ok(Self {
            state: StudentState::restore(document, selection),
            progress,
        })
    }

    pub fn view(&self) -> StudentView {
        self.state.view(&self.progress)
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::admin::UpsertInput;
use crate::model::{Note, Teacher, Video};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// Directory holding persisted content, progress, and session values.
    #[arg(long, global = true, env = "CLASS10_DATA_DIR", default_value = "class10-data")]
    pub data_dir: PathBuf,

    /// Seed document used when nothing is persisted (path or http/https URL).
    #[arg(long, global = true, env = "CLASS10_FALLBACK", default_value = "data.json")]
    pub fallback: String,

    /// Admin password checked by `login`.
    #[arg(
        long,
        global = true,
        env = "CLASS10_ADMIN_PASSWORD",
        default_value = crate::session::DEFAULT_ADMIN_PASSWORD,
        hide_env_values = true
    )]
    pub admin_password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List subjects and their ids.
    Subjects,
    /// Show the student view for a subject/chapter.
    Show(ShowArgs),
    /// Flip the watched flag of a video.
    ToggleWatched(ToggleWatchedArgs),
    /// Start an admin session.
    Login(LoginArgs),
    /// End the admin session.
    Logout,
    /// Add or update chapter content (requires an admin session).
    Upsert(UpsertArgs),
    /// Print the admin summary of subjects and chapters.
    Summary,
    /// Print the id derived from a display name.
    Slug(SlugArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Subject id (defaults to the first subject).
    #[arg(long)]
    pub subject: Option<String>,

    /// Chapter id (defaults to the subject's first chapter).
    #[arg(long)]
    pub chapter: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ToggleWatchedArgs {
    /// YouTube id of the video.
    #[arg(long)]
    pub video: String,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoteType {
    Text,
    Link,
}

impl NoteType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => crate::model::NOTE_TYPE_TEXT,
            Self::Link => crate::model::NOTE_TYPE_LINK,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpsertArgs {
    #[arg(long)]
    pub subject_name: String,
    #[arg(long)]
    pub chapter_title: String,
    #[arg(long)]
    pub chapter_overview: String,

    #[arg(long)]
    pub teacher_name: String,
    #[arg(long)]
    pub teacher_channel: String,
    #[arg(long)]
    pub teacher_topic: String,
    #[arg(long)]
    pub teacher_video_id: String,

    #[arg(long)]
    pub video_title: String,
    /// YouTube id of the video.
    #[arg(long)]
    pub video_id: String,
    #[arg(long)]
    pub video_duration: String,

    #[arg(long, value_enum, default_value_t = NoteType::Text)]
    pub note_type: NoteType,
    #[arg(long)]
    pub note_content: String,
}

impl From<UpsertArgs> for UpsertInput {
    fn from(args: UpsertArgs) -> Self {
        Self {
            subject_name: args.subject_name,
            chapter_title: args.chapter_title,
            chapter_overview: args.chapter_overview,
            teacher: Teacher {
                name: args.teacher_name,
                channel: args.teacher_channel,
                topic: args.teacher_topic,
                video_id: args.teacher_video_id,
            },
            video: Video {
                title: args.video_title,
                youtube_id: args.video_id,
                duration: args.video_duration,
            },
            note: Note {
                kind: args.note_type.as_str().to_owned(),
                content: args.note_content,
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct SlugArgs {
    /// Display name to normalize.
    pub name: String,
}

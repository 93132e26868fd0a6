use std::sync::Arc;

use anyhow::Context as _;

use crate::admin::{UpsertInput, summary, upsert};
use crate::cli::{
    LoginArgs, OutputFormat, ShowArgs, SlugArgs, StorageArgs, ToggleWatchedArgs, UpsertArgs,
};
use crate::content_store::{ContentStore, FallbackSource};
use crate::progress::ProgressStore;
use crate::render;
use crate::session::{AdminSession, LOGOUT_MESSAGE, LoginResult};
use crate::storage::{KeyValueStore, LocalFsKeyValueStore};
use crate::student::{Selection, StudentPage};

/// Stores shared by every command, all backed by one data directory.
#[derive(Clone)]
pub struct Services {
    pub content: ContentStore,
    pub progress: ProgressStore,
    pub session: AdminSession,
}

impl Services {
    pub fn from_args(args: &StorageArgs) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(LocalFsKeyValueStore::new(&args.data_dir));
        let fallback = FallbackSource::parse(&args.fallback).context("parse --fallback")?;
        Self::new(storage, fallback, args.admin_password.clone())
    }

    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        fallback: FallbackSource,
        admin_password: String,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            content: ContentStore::new(Arc::clone(&storage), fallback)?,
            progress: ProgressStore::new(Arc::clone(&storage)),
            session: AdminSession::new(storage, admin_password),
        })
    }
}

pub async fn subjects(services: &Services) -> anyhow::Result<()> {
    let doc = services.content.load().await.context("load content")?;
    for subject in &doc.subjects {
        println!("{}\t{}", subject.id, subject.name);
    }
    Ok(())
}

pub async fn show(services: &Services, args: ShowArgs) -> anyhow::Result<()> {
    let selection = Selection {
        subject: args.subject,
        chapter: args.chapter,
    };
    let page = StudentPage::open(&services.content, &services.progress, &selection)
        .await
        .context("open student page")?;
    let view = page.view();

    match args.format {
        OutputFormat::Text => print!("{}", render::student_text(&view)),
        OutputFormat::Html => print!("{}", render::student_html(&view)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&view).context("serialize student view")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub async fn toggle_watched(services: &Services, args: ToggleWatchedArgs) -> anyhow::Result<()> {
    let video = args.video.trim();
    if video.is_empty() {
        anyhow::bail!("--video must not be empty");
    }
    let watched = services.progress.toggle(video).await?;
    if watched {
        println!("{video}: watched");
    } else {
        println!("{video}: not watched");
    }
    Ok(())
}

pub async fn login(services: &Services, args: LoginArgs) -> anyhow::Result<()> {
    let result = services.session.login(&args.password).await?;
    println!("{}", result.message());
    if result == LoginResult::Rejected {
        anyhow::bail!("admin login failed");
    }
    Ok(())
}

pub async fn logout(services: &Services) -> anyhow::Result<()> {
    services.session.logout().await?;
    println!("{LOGOUT_MESSAGE}");
    Ok(())
}

pub async fn upsert_content(services: &Services, args: UpsertArgs) -> anyhow::Result<()> {
    if !services.session.is_active().await? {
        anyhow::bail!("admin session required; run `login` first");
    }

    let input = UpsertInput::from(args);
    let mut doc = services.content.load().await.context("load content")?;
    let outcome = upsert(&mut doc, &input).context("invalid content submission")?;
    services
        .content
        .persist(&doc)
        .await
        .context("save content")?;

    println!("Changes saved.");
    if !outcome.teacher_added {
        println!("teacher already listed; skipped");
    }
    if !outcome.video_added {
        println!("video already listed; skipped");
    }
    if !outcome.note_added {
        println!("note already listed; skipped");
    }
    print!("{}", render::summary_text(&summary(&doc)));
    Ok(())
}

pub async fn print_summary(services: &Services) -> anyhow::Result<()> {
    let doc = services.content.load().await.context("load content")?;
    print!("{}", render::summary_text(&summary(&doc)));
    Ok(())
}

pub fn slug(args: SlugArgs) {
    println!("{}", crate::slug::normalize(&args.name));
}

use crate::admin::SubjectSummary;
use crate::student::{ChapterContent, ChapterDetails, NoteView, Selection, StudentView};

/// State of the admin page: login form or dashboard.
#[derive(Debug, Clone, Default)]
pub struct AdminPage {
    pub logged_in: bool,
    pub message: Option<String>,
    pub summary: Vec<SubjectSummary>,
}

pub fn student_html(view: &StudentView) -> String {
    let mut out = page_head("Class 10 Study Hub");
    out.push_str("<main class=\"student\">\n");

    out.push_str("  <nav class=\"subjects\">\n    <h2>Subjects</h2>\n    <ul id=\"subjectList\">\n");
    for subject in &view.subjects {
        let href = page_href(&Selection {
            subject: Some(subject.id.clone()),
            chapter: None,
        });
        out.push_str(&format!(
            "      <li><a class=\"{}\" href=\"{}\">{}</a></li>\n",
            active_class(subject.active),
            html_escape(&href),
            html_escape(&subject.label)
        ));
    }
    out.push_str("    </ul>\n  </nav>\n");

    let current_subject = view
        .subjects
        .iter()
        .find(|subject| subject.active)
        .map(|subject| subject.id.clone());

    out.push_str(&format!(
        "  <nav class=\"chapters\">\n    <h2 id=\"chapterHeading\">{}</h2>\n    <ul id=\"chapterList\">\n",
        html_escape(&view.chapter_heading)
    ));
    for chapter in &view.chapters {
        let href = page_href(&Selection {
            subject: current_subject.clone(),
            chapter: Some(chapter.id.clone()),
        });
        out.push_str(&format!(
            "      <li><a class=\"{}\" href=\"{}\">{}</a></li>\n",
            active_class(chapter.active),
            html_escape(&href),
            html_escape(&chapter.label)
        ));
    }
    out.push_str("    </ul>\n  </nav>\n");

    out.push_str("  <section class=\"content\">\n");
    match &view.content {
        ChapterContent::Placeholder {
            title,
            message,
            progress_percent,
        } => {
            out.push_str(&format!(
                "    <h2 id=\"contentTitle\">{}</h2>\n",
                html_escape(title)
            ));
            out.push_str(&format!(
                "    <p id=\"contentOverview\">{}</p>\n",
                html_escape(message)
            ));
            out.push_str(&progress_badge(*progress_percent));
        }
        ChapterContent::Details(details) => {
            let selection = Selection {
                subject: current_subject,
                chapter: view
                    .chapters
                    .iter()
                    .find(|chapter| chapter.active)
                    .map(|chapter| chapter.id.clone()),
            };
            push_chapter_details(&mut out, details, &selection);
        }
    }
    out.push_str("  </section>\n</main>\n");
    out.push_str(page_tail());
    out
}

fn push_chapter_details(out: &mut String, details: &ChapterDetails, selection: &Selection) {
    out.push_str(&format!(
        "    <h2 id=\"contentTitle\">{}</h2>\n",
        html_escape(&details.title)
    ));
    out.push_str(&format!(
        "    <p id=\"contentOverview\">{}</p>\n",
        html_escape(&details.overview)
    ));
    out.push_str(&progress_badge(details.progress_percent));

    out.push_str("    <div id=\"teacherCards\">\n");
    for teacher in &details.teachers {
        out.push_str("      <article class=\"teacher-card\">\n");
        out.push_str(&format!("        <h4>{}</h4>\n", html_escape(&teacher.name)));
        out.push_str(&format!(
            "        <p><strong>Channel:</strong> {}</p>\n",
            html_escape(&teacher.channel)
        ));
        out.push_str(&format!(
            "        <p><strong>Focus:</strong> {}</p>\n",
            html_escape(&teacher.topic)
        ));
        out.push_str(&format!(
            "        <p><strong>Video ID:</strong> {}</p>\n",
            html_escape(&teacher.video_id)
        ));
        out.push_str("      </article>\n");
    }
    out.push_str("    </div>\n");

    out.push_str("    <div id=\"videoCards\">\n");
    for (idx, video) in details.videos.iter().enumerate() {
        out.push_str(&format!(
            "      <article class=\"video-card\" data-video-index=\"{idx}\">\n"
        ));
        out.push_str(&format!("        <h4>{}</h4>\n", html_escape(&video.title)));
        out.push_str(&format!(
            "        <p><strong>Duration:</strong> {}</p>\n",
            html_escape(&video.duration)
        ));
        out.push_str(&format!(
            "        <div class=\"video-frame\"><iframe src=\"{}\" title=\"{}\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" allowfullscreen loading=\"lazy\"></iframe></div>\n",
            html_escape(&video.embed_url),
            html_escape(&video.title)
        ));
        out.push_str("        <form method=\"post\" action=\"/progress/toggle\">\n");
        out.push_str(&format!(
            "          <input type=\"hidden\" name=\"video\" value=\"{}\">\n",
            html_escape(&video.youtube_id)
        ));
        push_selection_inputs(out, selection);
        out.push_str(&format!(
            "          <button class=\"watch-toggle{}\" type=\"submit\">{}</button>\n",
            if video.watched { " watched" } else { "" },
            html_escape(&video.toggle_label)
        ));
        out.push_str("        </form>\n      </article>\n");
    }
    out.push_str("    </div>\n");

    out.push_str("    <ul id=\"notesList\">\n");
    for note in &details.notes {
        match note {
            NoteView::Text { content } => {
                out.push_str(&format!("      <li>{}</li>\n", html_escape(content)));
            }
            NoteView::Link {
                href,
                label,
                target,
                rel,
            } => {
                out.push_str(&format!(
                    "      <li><a href=\"{}\" target=\"{}\" rel=\"{}\">{}</a></li>\n",
                    html_escape(href),
                    html_escape(target),
                    html_escape(rel),
                    html_escape(label)
                ));
            }
        }
    }
    out.push_str("    </ul>\n");
}

fn push_selection_inputs(out: &mut String, selection: &Selection) {
    for (name, value) in [
        ("subject", selection.subject.as_deref()),
        ("chapter", selection.chapter.as_deref()),
    ] {
        if let Some(value) = value {
            out.push_str(&format!(
                "          <input type=\"hidden\" name=\"{name}\" value=\"{}\">\n",
                html_escape(value)
            ));
        }
    }
}

fn progress_badge(percent: u32) -> String {
    format!("    <p id=\"progressBadge\">Progress: {percent}%</p>\n")
}

pub fn student_text(view: &StudentView) -> String {
    let mut out = String::new();
    out.push_str("Subjects:\n");
    for subject in &view.subjects {
        out.push_str(&format!(
            "  {} {} [{}]\n",
            marker(subject.active),
            subject.label,
            subject.id
        ));
    }
    out.push_str(&format!("{}:\n", view.chapter_heading));
    for chapter in &view.chapters {
        out.push_str(&format!(
            "  {} {} [{}]\n",
            marker(chapter.active),
            chapter.label,
            chapter.id
        ));
    }
    out.push('\n');

    match &view.content {
        ChapterContent::Placeholder {
            title,
            message,
            progress_percent,
        } => {
            out.push_str(&format!("{title}\n{message}\n"));
            out.push_str(&format!("Progress: {progress_percent}%\n"));
        }
        ChapterContent::Details(details) => {
            out.push_str(&format!("{}\n{}\n", details.title, details.overview));
            out.push_str(&format!("Progress: {}%\n", details.progress_percent));

            out.push_str("\nTeachers:\n");
            for teacher in &details.teachers {
                out.push_str(&format!(
                    "  - {} | Channel: {} | Focus: {} | Video ID: {}\n",
                    teacher.name, teacher.channel, teacher.topic, teacher.video_id
                ));
            }
            out.push_str("\nVideos:\n");
            for video in &details.videos {
                out.push_str(&format!(
                    "  [{}] {} ({}) {}\n",
                    if video.watched { "x" } else { " " },
                    video.title,
                    video.duration,
                    video.youtube_id
                ));
            }
            out.push_str("\nNotes:\n");
            for note in &details.notes {
                match note {
                    NoteView::Text { content } => out.push_str(&format!("  - {content}\n")),
                    NoteView::Link { href, .. } => out.push_str(&format!("  - <{href}>\n")),
                }
            }
        }
    }
    out
}

pub fn summary_text(summary: &[SubjectSummary]) -> String {
    let mut out = String::new();
    for subject in summary {
        out.push_str(&format!("{subject}\n"));
        for chapter in &subject.chapters {
            out.push_str(&format!("  - {chapter}\n"));
        }
    }
    out
}

pub fn admin_html(page: &AdminPage) -> String {
    let mut out = page_head("Class 10 Admin");
    out.push_str("<main class=\"admin\">\n");

    if let Some(message) = &page.message {
        out.push_str(&format!(
            "  <p class=\"message\">{}</p>\n",
            html_escape(message)
        ));
    }

    if !page.logged_in {
        out.push_str(
            r#"  <section id="loginSection">
    <h2>Admin Login</h2>
    <form id="loginForm" method="post" action="/admin/login">
      <input id="adminPassword" name="password" type="password" required>
      <button type="submit">Login</button>
    </form>
  </section>
"#,
        );
        out.push_str("</main>\n");
        out.push_str(page_tail());
        return out;
    }

    out.push_str(
        r#"  <section id="dashboardSection">
    <form method="post" action="/admin/logout"><button id="logoutBtn" type="submit">Logout</button></form>
    <form id="contentForm" method="post" action="/admin/content">
      <input name="subject_name" placeholder="Subject" required>
      <input name="chapter_title" placeholder="Chapter title" required>
      <textarea name="chapter_overview" placeholder="Chapter overview" required></textarea>
      <input name="teacher_name" placeholder="Teacher name" required>
      <input name="teacher_channel" placeholder="Teacher channel" required>
      <input name="teacher_topic" placeholder="Teacher topic" required>
      <input name="teacher_video_id" placeholder="Teacher video id" required>
      <input name="video_title" placeholder="Video title" required>
      <input name="video_id" placeholder="YouTube id" required>
      <input name="video_duration" placeholder="Duration" required>
      <select name="note_type">
        <option value="text">text</option>
        <option value="link">link</option>
      </select>
      <textarea name="note_content" placeholder="Note" required></textarea>
      <button type="submit">Save</button>
    </form>
"#,
    );

    out.push_str("    <ul id=\"adminSummary\">\n");
    for subject in &page.summary {
        out.push_str(&format!(
            "      <li><strong>{}</strong> ({} chapters)\n        <ul class=\"notes-list\">\n",
            html_escape(&subject.name),
            subject.chapter_count
        ));
        for chapter in &subject.chapters {
            out.push_str(&format!(
                "          <li>{}</li>\n",
                html_escape(&chapter.to_string())
            ));
        }
        out.push_str("        </ul>\n      </li>\n");
    }
    out.push_str("    </ul>\n  </section>\n</main>\n");
    out.push_str(page_tail());
    out
}

pub fn error_html(message: &str) -> String {
    let mut out = page_head("Class 10 Study Hub");
    out.push_str(&format!(
        "<main class=\"error\">\n  <h2>Content unavailable</h2>\n  <p>{}</p>\n</main>\n",
        html_escape(message)
    ));
    out.push_str(page_tail());
    out
}

/// Query string link back to the student page for `selection`.
pub fn page_href(selection: &Selection) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(subject) = &selection.subject {
        query.append_pair("subject", subject);
    }
    if let Some(chapter) = &selection.chapter {
        query.append_pair("chapter", chapter);
    }
    let query = query.finish();
    if query.is_empty() {
        "/".to_owned()
    } else {
        format!("/?{query}")
    }
}

fn page_head(title: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n<body>\n  <h1>{}</h1>\n",
        html_escape(title),
        html_escape(title)
    )
}

fn page_tail() -> &'static str {
    "</body>\n</html>\n"
}

fn active_class(active: bool) -> &'static str {
    if active { "active" } else { "" }
}

fn marker(active: bool) -> &'static str {
    if active { "*" } else { " " }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{UpsertInput, summary, upsert};
    use crate::model::{Document, Note, ProgressMap, Teacher, Video};
    use crate::student::StudentState;

    fn document() -> anyhow::Result<Document> {
        let mut doc = Document::default();
        let mut input = UpsertInput {
            subject_name: "Science".to_owned(),
            chapter_title: "Light".to_owned(),
            chapter_overview: "Mirrors & <lenses>".to_owned(),
            teacher: Teacher {
                name: "Ms. Rao".to_owned(),
                channel: "Rao Classes".to_owned(),
                topic: "Optics".to_owned(),
                video_id: "abc123".to_owned(),
            },
            video: Video {
                title: "Reflection".to_owned(),
                youtube_id: "abc123".to_owned(),
                duration: "12:30".to_owned(),
            },
            note: Note::link("https://example.com/light?a=1&b=2"),
        };
        upsert(&mut doc, &input)?;
        input.note = Note::text("Revise <b>ray diagrams</b>");
        upsert(&mut doc, &input)?;
        Ok(doc)
    }

    #[test]
    fn student_html_renders_links_and_escapes_text() -> anyhow::Result<()> {
        let view = StudentState::boot(document()?).view(&ProgressMap::default());
        let html = student_html(&view);

        assert!(html.contains(
            "<a href=\"https://example.com/light?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">https://example.com/light?a=1&amp;b=2</a>"
        ));
        assert!(html.contains("<li>Revise &lt;b&gt;ray diagrams&lt;/b&gt;</li>"));
        assert!(html.contains("Mirrors &amp; &lt;lenses&gt;"));
        assert!(html.contains("https://www.youtube.com/embed/abc123"));
        assert!(html.contains("Progress: 0%"));
        assert!(html.contains("<input type=\"hidden\" name=\"video\" value=\"abc123\">"));
        assert!(html.contains("<input type=\"hidden\" name=\"chapter\" value=\"light\">"));
        Ok(())
    }

    #[test]
    fn student_html_shows_placeholder() {
        let view = StudentState::boot(Document::default()).view(&ProgressMap::default());
        let html = student_html(&view);
        assert!(html.contains("<h2 id=\"contentTitle\">No chapter selected</h2>"));
        assert!(html.contains("Select a subject to begin."));
    }

    #[test]
    fn student_text_marks_watched_videos() -> anyhow::Result<()> {
        let state = StudentState::boot(document()?);
        let mut progress = ProgressMap::default();
        progress.toggle("abc123");
        let text = student_text(&state.view(&progress));

        assert!(text.contains("Science Chapters:"));
        assert!(text.contains("  * Light [light]"));
        assert!(text.contains("[x] Reflection (12:30) abc123"));
        assert!(text.contains("Progress: 100%"));
        assert!(text.contains("  - <https://example.com/light?a=1&b=2>"));
        Ok(())
    }

    #[test]
    fn admin_html_switches_on_login() -> anyhow::Result<()> {
        let logged_out = admin_html(&AdminPage::default());
        assert!(logged_out.contains("id=\"loginForm\""));
        assert!(!logged_out.contains("id=\"contentForm\""));

        let page = AdminPage {
            logged_in: true,
            message: Some("Changes saved.".to_owned()),
            summary: summary(&document()?),
        };
        let html = admin_html(&page);
        assert!(html.contains("id=\"contentForm\""));
        assert!(html.contains("<strong>Science</strong> (1 chapters)"));
        assert!(html.contains("<li>Light — 1 video(s), 2 note(s)</li>"));
        assert!(html.contains("Changes saved."));
        Ok(())
    }

    #[test]
    fn page_href_encodes_selection() {
        assert_eq!(page_href(&Selection::default()), "/");
        let href = page_href(&Selection {
            subject: Some("social science".to_owned()),
            chapter: Some("a&b".to_owned()),
        });
        assert_eq!(href, "/?subject=social+science&chapter=a%26b");
    }
}

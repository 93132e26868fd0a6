use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use class10::admin::{UpsertInput, upsert};
use class10::content_store::{ContentStore, FallbackSource};
use class10::model::{Note, Teacher, Video};
use class10::storage::{KeyValueStore, LocalFsKeyValueStore, MemoryKeyValueStore};
use predicates::prelude::*;

const SEED: &str = r#"{"subjects":[{"id":"maths","name":"Maths","description":"Numbers","chapters":[{"id":"real-numbers","title":"Real Numbers","overview":"Euclid's lemma","teachers":[],"videos":[],"notes":[]}]}]}"#;

fn spawn_seed_server() -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let (status, body) = match request.url() {
                "/data.json" => (200, SEED),
                "/broken.json" => (200, "{\"subjects\": ["),
                _ => (404, "not found"),
            };
            let mut resp = tiny_http::Response::from_string(body).with_status_code(status);
            let header =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("content-type header");
            resp.add_header(header);
            let _ = request.respond(resp);
        }
    });

    (base_url, shutdown_tx, handle)
}

fn store(url: &str) -> anyhow::Result<(ContentStore, Arc<MemoryKeyValueStore>)> {
    let storage = Arc::new(MemoryKeyValueStore::new());
    let store = ContentStore::new(storage.clone(), FallbackSource::parse(url)?)?;
    Ok((store, storage))
}

fn submission() -> UpsertInput {
    UpsertInput {
        subject_name: "Maths".to_owned(),
        chapter_title: "Real Numbers".to_owned(),
        chapter_overview: "Fundamental theorem of arithmetic".to_owned(),
        teacher: Teacher {
            name: "Mr. Iyer".to_owned(),
            channel: "Iyer Maths".to_owned(),
            topic: "HCF and LCM".to_owned(),
            video_id: "rn001".to_owned(),
        },
        video: Video {
            title: "HCF by prime factorisation".to_owned(),
            youtube_id: "rn001".to_owned(),
            duration: "18:20".to_owned(),
        },
        note: Note::text("Every composite number is a product of primes."),
    }
}

#[tokio::test]
async fn load_fetches_fallback_over_http() -> anyhow::Result<()> {
    let (base_url, shutdown_tx, handle) = spawn_seed_server();

    let (store, _) = store(&format!("{base_url}/data.json"))?;
    let doc = store.load().await?;
    assert_eq!(doc.subjects[0].chapters[0].id, "real-numbers");

    let _ = shutdown_tx.send(());
    let _ = handle.join();
    Ok(())
}

#[tokio::test]
async fn http_errors_and_bad_json_surface_to_caller() -> anyhow::Result<()> {
    let (base_url, shutdown_tx, handle) = spawn_seed_server();

    let (missing, _) = store(&format!("{base_url}/missing.json"))?;
    let err = missing.load().await.unwrap_err();
    assert!(format!("{err:#}").contains("404"));

    let (broken, _) = store(&format!("{base_url}/broken.json"))?;
    let err = broken.load().await.unwrap_err();
    assert!(format!("{err:#}").contains("parse fallback document"));

    let _ = shutdown_tx.send(());
    let _ = handle.join();
    Ok(())
}

#[tokio::test]
async fn load_after_persist_round_trips_upserted_document() -> anyhow::Result<()> {
    let (base_url, shutdown_tx, handle) = spawn_seed_server();

    let (store, storage) = store(&format!("{base_url}/data.json"))?;
    let mut doc = store.load().await?;
    upsert(&mut doc, &submission())?;
    store.persist(&doc).await?;

    // Stop the server: the persisted copy must be used from here on.
    let _ = shutdown_tx.send(());
    let _ = handle.join();

    let reloaded = store.load().await?;
    assert_eq!(reloaded, doc);
    assert_eq!(reloaded.subjects[0].chapters[0].overview, "Fundamental theorem of arithmetic");
    assert!(storage.get("class10Data").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn last_writer_wins_between_independent_editors() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let seed = temp.path().join("data.json");
    std::fs::write(&seed, SEED)?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(LocalFsKeyValueStore::new(temp.path().join("kv")));
    let first = ContentStore::new(Arc::clone(&storage), FallbackSource::File(seed.clone()))?;
    let second = ContentStore::new(Arc::clone(&storage), FallbackSource::File(seed))?;

    let mut doc_a = first.load().await?;
    let mut doc_b = second.load().await?;

    let mut a = submission();
    a.video.youtube_id = "from-a".to_owned();
    upsert(&mut doc_a, &a)?;
    let mut b = submission();
    b.video.youtube_id = "from-b".to_owned();
    upsert(&mut doc_b, &b)?;

    first.persist(&doc_a).await?;
    second.persist(&doc_b).await?;

    let stored = first.load().await?;
    let ids: Vec<&str> = stored.subjects[0].chapters[0]
        .videos
        .iter()
        .map(|v| v.youtube_id.as_str())
        .collect();
    assert_eq!(ids, vec!["from-b"]);
    Ok(())
}

#[test]
fn cli_accepts_url_fallback() {
    let (base_url, shutdown_tx, handle) = spawn_seed_server();
    let temp = tempfile::TempDir::new().expect("temp dir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("class10");
    cmd.env_remove("RUST_LOG")
        .args([
            "--data-dir",
            temp.path().to_str().expect("utf-8 temp path"),
            "--fallback",
            &format!("{base_url}/data.json"),
            "show",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maths Chapters:"))
        .stdout(predicate::str::contains("Euclid's lemma"));

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

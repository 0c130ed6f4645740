use deck_agent::{
    ai::{MockOutlineClient, OutlineService},
    app::{App, AppServices},
    deck::{build_pptx, DeckRenderer, DeckService},
    models::{ChatRole, EntryBody, Outline, ThemeColor},
    photos::{mock::sample_png, MockPhotoClient, PhotoService},
    session::GREETING,
    Error,
};
use std::io::{Cursor, Read};
use zip::ZipArchive;

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

fn count_slides(bytes: &[u8]) -> usize {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count()
}

#[tokio::test]
async fn test_full_workflow_with_mocks() {
    let outline = MockOutlineClient::new()
        .with_outline(MockOutlineClient::sample_outline("Honey Bees", 3))
        .with_outline(MockOutlineClient::sample_outline("Honey Bees", 5));
    let photos = MockPhotoClient::new().with_image(sample_png(64, 36));
    let dir = tempfile::tempdir().unwrap();

    let app = App::with_services(
        AppServices {
            outline: Box::new(outline.clone()),
            photos: Box::new(photos.clone()),
            deck: Box::new(DeckRenderer::new(dir.path()).unwrap()),
        },
        ThemeColor::NAVY,
    );

    let session = app.create_session().await;
    assert_eq!(
        session.messages[0].body,
        EntryBody::Text {
            text: GREETING.to_string()
        }
    );

    // Topic -> outline for review
    let first = app
        .handle_message(session.id, "Honey bees", None)
        .await
        .unwrap();
    assert_eq!(first.outline.as_ref().unwrap().slides.len(), 3);

    // Feedback -> full replacement
    let second = app
        .handle_message(session.id, "Make it 5 slides", None)
        .await
        .unwrap();
    assert_eq!(second.outline.as_ref().unwrap().slides.len(), 5);
    assert_eq!(outline.get_feedback(), vec!["Make it 5 slides".to_string()]);

    // Confirmation -> file with 5 + 4 slides
    let third = app
        .handle_message(session.id, "YES", Some("#8B0000"))
        .await
        .unwrap();
    let file = third.file.unwrap();
    assert_eq!(file.slide_count, 9);
    assert_eq!(photos.get_search_count(), 5);

    let bytes = std::fs::read(&file.path).unwrap();
    assert_eq!(count_slides(&bytes), 9);

    let theme = read_part(&bytes, "ppt/theme/theme1.xml");
    assert!(theme.contains("8B0000"));
    let closing = read_part(&bytes, "ppt/slides/slide9.xml");
    assert!(closing.contains("Thank You"));
    assert!(closing.contains(r#"<a:srgbClr val="8B0000"/>"#));

    let fetched = app.file(file.id).await.unwrap();
    assert_eq!(fetched.path, file.path);

    // Transcript: greeting, then user/outline/prompt three times (file instead of outline last)
    let transcript = app.session(session.id).await.unwrap();
    assert_eq!(transcript.messages.len(), 10);
    assert!(transcript
        .messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .all(|m| matches!(m.body, EntryBody::Text { .. })));
    assert!(!transcript.has_outline());
}

#[tokio::test]
async fn test_missing_images_do_not_block_generation() {
    let photos = MockPhotoClient::new().with_fetch_failure(true);
    let dir = tempfile::tempdir().unwrap();

    let app = App::with_services(
        AppServices {
            outline: Box::new(MockOutlineClient::new()),
            photos: Box::new(photos.clone()),
            deck: Box::new(DeckRenderer::new(dir.path()).unwrap()),
        },
        ThemeColor::NAVY,
    );

    let id = app.create_session().await.id;
    app.handle_message(id, "Tides", None).await.unwrap();
    let file = app.handle_message(id, "ok", None).await.unwrap().file.unwrap();

    assert_eq!(photos.get_fetch_count(), 3);
    let bytes = std::fs::read(&file.path).unwrap();
    assert_eq!(count_slides(&bytes), 7);

    let archive = ZipArchive::new(Cursor::new(&bytes)).unwrap();
    assert!(!archive.file_names().any(|n| n.starts_with("ppt/media/")));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let app = App::with_services(
        AppServices {
            outline: Box::new(MockOutlineClient::new()),
            photos: Box::new(MockPhotoClient::new()),
            deck: Box::new(deck_agent::deck::MockDeckRenderer::new()),
        },
        ThemeColor::NAVY,
    );

    let a = app.create_session().await.id;
    let b = app.create_session().await.id;

    app.handle_message(a, "Alpha", None).await.unwrap();
    // "yes" with no pending outline is treated as a topic
    let outcome = app.handle_message(b, "yes", None).await.unwrap();
    assert_eq!(outcome.outline.unwrap().presentation_title, "yes");

    assert!(app.session(a).await.unwrap().has_outline());
    assert!(app.session(b).await.unwrap().has_outline());
}

#[tokio::test]
async fn test_mock_services_compose() {
    let outline_client = MockOutlineClient::new();
    let outline: Outline = outline_client.generate_outline("Clouds").await.unwrap();

    let photos = MockPhotoClient::new().with_no_results_for("Clouds photo 2");
    let mut images = Vec::new();
    for slide in &outline.slides {
        images.push(photos.find_image(slide.image_query().unwrap()).await);
    }
    assert_eq!(images.iter().filter(|i| i.is_some()).count(), 2);

    let bytes = build_pptx(&outline, &images, ThemeColor::default()).unwrap();
    assert_eq!(count_slides(&bytes), outline.deck_slide_count());

    let content = read_part(&bytes, "ppt/slides/slide4.xml");
    assert!(!content.contains("<p:pic>"));
    let with_picture = read_part(&bytes, "ppt/slides/slide3.xml");
    assert!(with_picture.contains("<p:pic>"));

    let dir = tempfile::tempdir().unwrap();
    let renderer = DeckRenderer::new(dir.path()).unwrap();
    let file = renderer
        .render(&outline, images, ThemeColor::default())
        .await
        .unwrap();
    assert_eq!(file.slide_count, outline.deck_slide_count());
}

#[tokio::test]
async fn test_unknown_file() {
    let app = App::with_services(
        AppServices {
            outline: Box::new(MockOutlineClient::new()),
            photos: Box::new(MockPhotoClient::new()),
            deck: Box::new(deck_agent::deck::MockDeckRenderer::new()),
        },
        ThemeColor::NAVY,
    );
    let err = app.file(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

use super::*;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WINDOW: Duration = Duration::from_millis(300);
const ROTATION: Duration = Duration::from_millis(4000);

fn sample_catalog(count: usize) -> Catalog {
    let talks = (1..=count)
        .map(|n| Talk {
            title: format!("Charla {}", n),
            description: format!("Descripción {}", n),
            reflection: None,
            questions_and_answers: Vec::new(),
            linkedin: None,
            instagram: None,
            website: None,
        })
        .collect();
    Catalog::new(talks).expect("Failed to build catalog")
}

fn create_image_folder(root: &Path, folder: &str, files: &[&str]) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).expect("Failed to create image folder");
    for file in files {
        fs::write(dir.join(file), b"not really an image").expect("Failed to write file");
    }
}

fn read_dir_order(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.expect("Failed to read entry").file_name().into_string().unwrap())
        .collect()
}

/// Commit whatever transition is pending and return the time after it.
fn settle(view: &mut CarouselView, now: Instant) -> (Instant, Update) {
    let later = now + WINDOW;
    let update = view.tick(later);
    (later, update)
}

#[test]
fn test_next_wraps_from_last_to_first() {
    let t0 = Instant::now();
    let mut nav = SlideNavigator::new(5, WINDOW);
    assert!(nav.go_to(4, t0));
    assert_eq!(nav.tick(t0 + WINDOW), Some(4));

    let t1 = t0 + Duration::from_secs(1);
    assert!(nav.next(t1));
    let state = nav.state();
    assert!(state.transition_lock);
    assert_eq!(state.direction, Some(Direction::Forward));
    assert_eq!(state.current_index, 4);

    // Still locked just before the window closes
    assert_eq!(nav.tick(t1 + Duration::from_millis(299)), None);
    assert!(nav.is_locked());

    assert_eq!(nav.tick(t1 + WINDOW), Some(0));
    let state = nav.state();
    assert_eq!(state.current_index, 0);
    assert!(!state.transition_lock);
    assert_eq!(state.direction, None);
}

#[test]
fn test_previous_wraps_from_first_to_last() {
    let t0 = Instant::now();
    for count in 1..=6 {
        let mut nav = SlideNavigator::new(count, WINDOW);
        assert!(nav.previous(t0));
        assert_eq!(nav.state().direction, Some(Direction::Backward));
        assert_eq!(nav.tick(t0 + WINDOW), Some(count - 1));
    }
}

#[test]
fn test_navigation_ignored_while_locked() {
    let t0 = Instant::now();
    let mut nav = SlideNavigator::new(5, WINDOW);
    assert!(nav.next(t0));
    let locked = nav.state();

    assert!(!nav.next(t0 + Duration::from_millis(10)));
    assert!(!nav.previous(t0 + Duration::from_millis(20)));
    assert!(!nav.go_to(3, t0 + Duration::from_millis(30)));
    assert_eq!(nav.state(), locked);

    // The original deadline still applies
    assert_eq!(nav.tick(t0 + WINDOW), Some(1));
}

#[test]
fn test_go_to_current_index_is_noop() {
    let t0 = Instant::now();
    let mut nav = SlideNavigator::new(5, WINDOW);
    assert!(!nav.go_to(0, t0));
    assert!(!nav.is_locked());

    assert!(nav.go_to(2, t0));
    assert_eq!(nav.state().direction, Some(Direction::Forward));
    assert!(!nav.go_to(0, t0));
    assert_eq!(nav.tick(t0 + WINDOW), Some(2));

    assert!(nav.go_to(1, t0 + WINDOW));
    assert_eq!(nav.state().direction, Some(Direction::Backward));
}

#[test]
fn test_go_to_out_of_range_is_rejected() {
    let t0 = Instant::now();
    let mut nav = SlideNavigator::new(3, WINDOW);
    assert!(!nav.go_to(3, t0));
    assert!(!nav.is_locked());
}

#[test]
fn test_rotator_advances_once_per_interval() {
    let t0 = Instant::now();
    let mut rotator = ImageRotator::new(ROTATION);
    rotator.set_images(vec!["a".into(), "b".into(), "c".into()], t0);
    assert!(rotator.is_running());
    assert_eq!(rotator.current_index(), 0);

    assert!(!rotator.tick(t0 + Duration::from_millis(3999)));
    assert_eq!(rotator.current_index(), 0);

    for step in 1..=7 {
        assert!(rotator.tick(t0 + ROTATION * step));
        assert_eq!(rotator.current_index(), step as usize % 3);
    }
}

#[test]
fn test_rotator_without_enough_images_has_no_timer() {
    let t0 = Instant::now();
    let mut rotator = ImageRotator::new(ROTATION);
    rotator.set_images(Vec::new(), t0);
    assert!(!rotator.is_running());
    assert!(!rotator.tick(t0 + ROTATION * 3));

    rotator.set_images(vec!["only".into()], t0);
    assert!(!rotator.is_running());
    assert!(!rotator.tick(t0 + ROTATION * 3));
    assert_eq!(rotator.current(), Some("only"));
}

#[test]
fn test_manual_image_selection_keeps_timer() {
    let t0 = Instant::now();
    let mut rotator = ImageRotator::new(ROTATION);
    rotator.set_images(vec!["a".into(), "b".into(), "c".into()], t0);
    let deadline = rotator.next_deadline();

    assert!(rotator.select(2));
    assert_eq!(rotator.next_deadline(), deadline);

    assert!(rotator.tick(t0 + ROTATION));
    assert_eq!(rotator.current_index(), 0);
    assert!(!rotator.select(7));
}

#[test]
fn test_new_image_set_rebuilds_timer() {
    let t0 = Instant::now();
    let mut rotator = ImageRotator::new(ROTATION);
    rotator.set_images(vec!["a".into(), "b".into()], t0);
    assert!(rotator.tick(t0 + ROTATION));

    let t1 = t0 + Duration::from_millis(5000);
    rotator.set_images(vec!["x".into(), "y".into()], t1);
    assert_eq!(rotator.current_index(), 0);
    assert_eq!(rotator.next_deadline(), Some(t1 + ROTATION));
    assert!(!rotator.tick(t0 + ROTATION * 2));
}

#[test]
fn test_expansion_is_exclusive() {
    let mut expansion = Expansion::default();
    expansion.toggle_description();
    assert!(expansion.description_expanded());
    expansion.toggle_questions();
    assert!(expansion.questions_expanded());
    assert!(!expansion.description_expanded());
    expansion.toggle_questions();
    assert_eq!(expansion, Expansion::None);
}

#[test]
fn test_committed_change_resets_expansion_and_fetches_images() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(3), CarouselSettings::default());
    view.mount();

    view.handle(Input::ToggleQuestions, t0);
    assert_eq!(view.expansion(), Expansion::Questions);

    let update = view.handle(Input::Next, t0);
    assert!(update.redraw);
    assert_eq!(update.fetch, None);
    // Expansion survives until the change is committed
    assert_eq!(view.expansion(), Expansion::Questions);

    let (_, update) = settle(&mut view, t0);
    assert_eq!(update.fetch, Some(TalkId::from_index(1)));
    assert_eq!(view.expansion(), Expansion::None);
    assert_eq!(view.navigation().current_index, 1);
}

#[test]
fn test_stale_image_listing_is_discarded() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(3), CarouselSettings::default());
    let first = view.mount().fetch.expect("mount requests images");

    view.handle(Input::Next, t0);
    let (t1, update) = settle(&mut view, t0);
    let second = update.fetch.expect("commit requests images");

    // The first talk's listing arrives late
    let update = view.images_loaded(first, Ok(vec!["/img/1/a.png".into()]), t1);
    assert!(!update.redraw);
    assert!(view.images().is_empty());

    let update = view.images_loaded(second, Ok(vec!["/img/2/a.png".into()]), t1);
    assert!(update.redraw);
    assert_eq!(view.images(), ["/img/2/a.png".to_string()]);

    // A duplicate answer is not applied twice
    let update = view.images_loaded(second, Ok(Vec::new()), t1);
    assert!(!update.redraw);
    assert_eq!(view.images().len(), 1);
}

#[test]
fn test_failed_listing_falls_back_to_guessed_image() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(2), CarouselSettings::default());
    let talk = view.mount().fetch.expect("mount requests images");

    let error = BitacoraError::ValidationError("HTTP error: 500".to_string());
    view.images_loaded(talk, Err(error), t0);
    assert_eq!(view.images(), ["/img/1/1.jpg".to_string()]);

    // When the guess does not load either, the image panel shows a placeholder
    let update = view.handle(
        Input::ImageError {
            src: "/img/1/1.jpg".into(),
        },
        t0,
    );
    assert!(update.redraw);
    assert!(view.is_broken("/img/1/1.jpg"));
    assert!(view.render().contains("Imagen no disponible"));
}

#[test]
fn test_swipe_needs_to_pass_threshold() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(4), CarouselSettings::default());
    view.mount();

    view.handle(Input::TouchStart { x: 300.0 }, t0);
    view.handle(Input::TouchMove { x: 240.0 }, t0);
    let update = view.handle(Input::TouchEnd, t0);
    assert!(!update.redraw);
    assert!(!view.navigation().transition_lock);

    // Drag left: next
    view.handle(Input::TouchStart { x: 300.0 }, t0);
    view.handle(Input::TouchMove { x: 200.0 }, t0);
    assert!(view.handle(Input::TouchEnd, t0).redraw);
    let (t1, _) = settle(&mut view, t0);
    assert_eq!(view.navigation().current_index, 1);

    // Drag right: previous
    view.handle(Input::TouchStart { x: 100.0 }, t1);
    view.handle(Input::TouchMove { x: 180.0 }, t1);
    view.handle(Input::TouchEnd, t1);
    settle(&mut view, t1);
    assert_eq!(view.navigation().current_index, 0);

    // A tap without movement is not a swipe
    view.handle(Input::TouchStart { x: 100.0 }, t1);
    assert!(!view.handle(Input::TouchEnd, t1).redraw);
}

#[test]
fn test_arrow_keys_navigate() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(3), CarouselSettings::default());
    view.mount();

    let key = |name: &str| Input::Key {
        key: name.to_string(),
    };

    assert!(!view.handle(key("Enter"), t0).redraw);
    assert!(view.handle(key("ArrowLeft"), t0).redraw);
    assert!(!view.handle(key("ArrowRight"), t0).redraw);
    settle(&mut view, t0);
    assert_eq!(view.navigation().current_index, 2);
}

#[test]
fn test_input_messages_parse() {
    let input: Input = serde_json::from_str(r#"{"type":"select_slide","index":3}"#).unwrap();
    assert_eq!(input, Input::SelectSlide { index: 3 });

    let input: Input = serde_json::from_str(r#"{"type":"next"}"#).unwrap();
    assert_eq!(input, Input::Next);

    let input: Input = serde_json::from_str(r#"{"type":"touch_start","x":12.5}"#).unwrap();
    assert_eq!(input, Input::TouchStart { x: 12.5 });

    assert!(serde_json::from_str::<Input>(r#"{"type":"explode"}"#).is_err());
}

#[test]
fn test_lister_keeps_only_allowed_extensions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_image_folder(
        temp_dir.path(),
        "3",
        &["a.png", "b.gif", "c.txt", "d.JPG", "e.jpeg", "f.webp", "g.bmp", "noext"],
    );

    let lister = ImageDirectoryLister::new(temp_dir.path());
    let images = lister.list("3");

    let allowed = ["a.png", "b.gif", "d.JPG", "e.jpeg", "f.webp"];
    let expected: Vec<String> = read_dir_order(&temp_dir.path().join("3"))
        .into_iter()
        .filter(|name| allowed.contains(&name.as_str()))
        .map(|name| format!("/img/3/{}", name))
        .collect();

    assert_eq!(images, expected);
    assert_eq!(images.len(), 5);
}

#[test]
fn test_lister_scenario_folder_three() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_image_folder(temp_dir.path(), "3", &["a.png", "b.gif", "c.txt"]);

    let mut images = ImageDirectoryLister::new(temp_dir.path()).list_talk(TalkId::from_index(2));
    images.sort();
    assert_eq!(images, vec!["/img/3/a.png", "/img/3/b.gif"]);
}

#[test]
fn test_lister_missing_or_unsafe_folder_is_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_image_folder(temp_dir.path(), "1", &["a.png"]);
    let lister = ImageDirectoryLister::new(temp_dir.path());

    assert!(lister.list("9").is_empty());
    assert!(lister.list("..").is_empty());
    assert!(lister.list("1/../1").is_empty());
    assert!(lister.list("").is_empty());
}

#[test]
fn test_lister_unreadable_folder_is_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // A regular file where the talk folder should be makes read_dir fail
    fs::write(temp_dir.path().join("3"), b"not a directory").unwrap();

    let lister = ImageDirectoryLister::new(temp_dir.path());
    assert!(lister.list("3").is_empty());
    assert!(lister.list_talk(TalkId::from_index(2)).is_empty());
}

#[test]
fn test_talk_id_parse_is_canonical() {
    assert_eq!(TalkId::parse("3"), Some(TalkId::from_index(2)));
    assert_eq!(TalkId::parse("12").map(TalkId::get), Some(12));
    assert_eq!(TalkId::parse("03"), None);
    assert_eq!(TalkId::parse("+3"), None);
    assert_eq!(TalkId::parse("0"), None);
    assert_eq!(TalkId::parse("tres"), None);
}

#[test]
fn test_lister_skips_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_image_folder(temp_dir.path(), "2", &["a.png"]);
    fs::create_dir(temp_dir.path().join("2").join("nested.png")).unwrap();

    let images = ImageDirectoryLister::new(temp_dir.path()).list("2");
    assert_eq!(images, vec!["/img/2/a.png"]);
}

#[test]
fn test_catalog_accepts_original_keys_and_bad_optionals() {
    let json = r#"[
        {
            "titulo": "Uno",
            "descripcion": "Primera",
            "reflexion": "",
            "preguntas": ["¿Qué?", 42, {"question": "¿Cómo?", "answer": "Así"}, {"answer": "sin pregunta"}],
            "linkedin": 7,
            "web": "https://example.com/"
        },
        {
            "title": "Dos",
            "description": "Segunda",
            "questions_and_answers": "not a list"
        }
    ]"#;

    let catalog = Catalog::from_json_str(json).expect("Failed to parse catalog");
    assert_eq!(catalog.len(), 2);

    let first = catalog.get(0).unwrap();
    assert_eq!(first.title, "Uno");
    assert_eq!(first.reflection, None);
    assert_eq!(first.linkedin, None);
    assert_eq!(first.website.as_deref(), Some("https://example.com/"));
    assert_eq!(
        first.questions_and_answers,
        vec![
            QuestionAnswer {
                question: "¿Qué?".into(),
                answer: String::new()
            },
            QuestionAnswer {
                question: "¿Cómo?".into(),
                answer: "Así".into()
            },
        ]
    );

    let second = catalog.get(1).unwrap();
    assert!(second.questions_and_answers.is_empty());
    assert!(!second.has_links());
}

#[test]
fn test_catalog_rejects_empty_dataset() {
    assert!(matches!(
        Catalog::from_json_str("[]"),
        Err(BitacoraError::ConfigError(_))
    ));
    assert!(Catalog::from_json_str(r#"[{"title": "sin descripción"}]"#).is_err());
}

#[test]
fn test_bundled_catalog_loads() {
    let catalog = Catalog::bundled().expect("Bundled dataset should load");
    assert!(!catalog.is_empty());
}

#[test]
fn test_render_shows_placeholders_for_missing_fields() {
    let mut view = CarouselView::new(sample_catalog(2), CarouselSettings::default());
    let talk = view.mount().fetch.unwrap();
    view.images_loaded(talk, Ok(Vec::new()), Instant::now());

    let html = view.render();
    assert!(html.contains("Sin reflexión registrada"));
    assert!(html.contains("Sin preguntas registradas"));
    assert!(html.contains("Sin enlaces"));
    assert!(html.contains("Sin imágenes"));
    assert!(html.contains(r#"<span class="thumb-number">02</span>"#));
}

#[test]
fn test_render_expanded_panel_replaces_grid() {
    let t0 = Instant::now();
    let mut view = CarouselView::new(sample_catalog(2), CarouselSettings::default());
    view.mount();
    view.handle(Input::ToggleDescription, t0);

    let html = view.render();
    assert!(html.contains(r#"<div class="expanded">"#));
    assert!(!html.contains(r#"<div class="grid">"#));
    assert!(html.contains(r#"data-action="collapse""#));
}

#[test]
fn test_render_escapes_talk_text() {
    let talks = vec![Talk {
        title: "<script>alert(1)</script>".into(),
        description: "a & b".into(),
        reflection: None,
        questions_and_answers: Vec::new(),
        linkedin: None,
        instagram: None,
        website: None,
    }];
    let view = CarouselView::new(Catalog::new(talks).unwrap(), CarouselSettings::default());

    let html = view.render();
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("a &amp; b"));
}

#[test]
fn test_resolve_under_rejects_traversal() {
    let root = Path::new("/srv/img");
    assert_eq!(
        utils::resolve_under(root, &["3", "a.png"]),
        Some(root.join("3").join("a.png"))
    );
    assert_eq!(utils::resolve_under(root, &["..", "secret"]), None);
    assert_eq!(utils::resolve_under(root, &[]), None);
}

#[test]
fn test_resource_file_remote() {
    let resource = ResourceFile::new("https://example.com/style.css");
    assert!(resource.is_remote);

    let tag = resource.tag(true).unwrap();
    assert_eq!(tag, r#"<link rel="stylesheet" href="https://example.com/style.css">"#);
}

#[test]
fn test_resource_file_local_embed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let css_path = temp_dir.path().join("extra.css");
    fs::write(&css_path, "body { color: red; }").unwrap();

    let resource = ResourceFile::new(css_path.to_str().unwrap());
    let tag = resource.tag(true).unwrap();
    assert_eq!(tag, "<style>body { color: red; }</style>");

    let linked = resource.tag(false).unwrap();
    assert!(linked.starts_with(r#"<link rel="stylesheet" href=""#));

    let page = resources::PageResources::resolve(
        &[resource, ResourceFile::new("/does/not/exist.css")],
        true,
    );
    assert_eq!(page.head(), "<style>body { color: red; }</style>\n");
}

#[test]
fn test_anyhow_errors_convert() {
    let err: BitacoraError = anyhow::anyhow!("Failed to load talks: broken").into();
    assert!(matches!(err, BitacoraError::CommandError(_)));
    assert_eq!(err.to_string(), "Failed to load talks: broken");
}

use headtrack_annotator::{run_session, AnnotationSession, SessionObserver, TerminalRenderer};
use headtrack_model::annotation::{AnnotationFile, WindowPlacement};
use headtrack_model::point::Point2D;

fn windows() -> Vec<WindowPlacement> {
    vec![
        WindowPlacement {
            cue_frame: 125,
            start_frame: 875,
        },
        WindowPlacement {
            cue_frame: 1125,
            start_frame: 1875,
        },
    ]
}

#[test]
fn scripted_session_saves_and_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");
    let shape = [3, 2];

    // First sitting: mark two frames of segment 0, then quit.
    let mut session = AnnotationSession::new(&shape).unwrap();
    let reference = vec![vec![Some(Point2D::new(50.0, 60.0)); 3], vec![None; 2]];
    let mut renderer = TerminalRenderer::new(Vec::new(), reference);
    let mut messages = Vec::new();
    {
        let observers: &mut [&mut dyn SessionObserver] = &mut [&mut renderer];
        run_session(
            &mut session,
            "m 51 61\nm 52 62\nq\n".as_bytes(),
            &mut messages,
            observers,
        )
        .unwrap();
    }

    let rendered = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(rendered.contains("tracked (50.0, 60.0)"));
    assert!(rendered.ends_with("Session closed with 2 marked frames\n"));

    let file = AnnotationFile::from_store("trial", 25.0, &windows(), session.store()).unwrap();
    file.save(&path).unwrap();

    // Second sitting resumes at the first gap, segment 0 frame 2.
    let loaded = AnnotationFile::load(&path).unwrap();
    let store = loaded.store_with_shape(&shape).unwrap();
    let mut session = AnnotationSession::with_store(store).unwrap();
    assert_eq!(session.cursor().segment, 0);
    assert_eq!(session.cursor().frame, 2);

    run_session(
        &mut session,
        "m 53 63\nn\nm 1 1\nm 2 2\n".as_bytes(),
        &mut messages,
        &mut [],
    )
    .unwrap();

    let store = session.into_store();
    assert_eq!(store.marked_count(), 5);
    assert_eq!(store.get(0, 2), Some(Point2D::new(53.0, 63.0)));
    assert_eq!(store.get(1, 1), Some(Point2D::new(2.0, 2.0)));

    let file = AnnotationFile::from_store("trial", 25.0, &windows(), &store).unwrap();
    file.save(&path).unwrap();
    let saved = AnnotationFile::load(&path).unwrap();
    assert_eq!(saved.segments[1].start_frame, 1875);
    assert!(saved.segments.iter().all(|s| s.points.iter().all(Option::is_some)));
}

#[test]
fn resume_rejects_changed_windows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");

    let session = AnnotationSession::new(&[3, 2]).unwrap();
    AnnotationFile::from_store("trial", 25.0, &windows(), session.store())
        .unwrap()
        .save(&path)
        .unwrap();

    let loaded = AnnotationFile::load(&path).unwrap();
    let err = loaded.store_with_shape(&[4, 2]).unwrap_err();
    assert!(err.to_string().contains("does not match"));
}

mod common;

use common::*;
use pdf_pages::*;
use std::sync::Arc;

fn stub_controller() -> (RecordingCodec, PageController<RecordingCodec>) {
    let codec = RecordingCodec::default();
    let controller = PageController::new(codec.clone(), Arc::new(NumberedThumbnails));
    (codec, controller)
}

#[tokio::test]
async fn test_stale_load_resolved_last_is_ignored() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);

    let ticket_a = session.begin_load("a.pdf");
    let result_a = controller
        .load(ticket_a, Arc::new(stub_bytes(5)), 1.0, no_progress())
        .await;
    let ticket_b = session.begin_load("b.pdf");
    let result_b = controller
        .load(ticket_b, Arc::new(stub_bytes(3)), 1.0, no_progress())
        .await;

    let resolution = session.resolve_load(ticket_b, result_b).unwrap();
    assert_eq!(
        resolution,
        LoadResolution::Ready {
            page_count: 3,
            thumbnails: true
        }
    );
    assert_eq!(
        session.resolve_load(ticket_a, result_a).unwrap(),
        LoadResolution::Stale
    );

    assert_eq!(session.registry().unwrap().len(), 3);
    assert_eq!(session.file_name(), Some("b.pdf"));
    assert_eq!(session.thumbnails().unwrap().key().document, ticket_b.id());
}

#[tokio::test]
async fn test_stale_load_resolved_first_is_ignored() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);

    let ticket_a = session.begin_load("a.pdf");
    let ticket_b = session.begin_load("b.pdf");
    let result_a = controller
        .load(ticket_a, Arc::new(stub_bytes(5)), 1.0, no_progress())
        .await;

    assert_eq!(
        session.resolve_load(ticket_a, result_a).unwrap(),
        LoadResolution::Stale
    );
    assert_eq!(session.state(), SessionState::Loading);
    assert!(session.registry().is_none());

    let result_b = controller
        .load(ticket_b, Arc::new(stub_bytes(3)), 1.0, no_progress())
        .await;
    session.resolve_load(ticket_b, result_b).unwrap();
    assert_eq!(session.registry().unwrap().display_order(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_thumbnail_failure_gives_placeholders() {
    let codec = RecordingCodec::default();
    let controller = PageController::new(codec.clone(), Arc::new(NoThumbnails));
    let mut session = ToolSession::new(ToolKind::RemovePages);

    let resolution = controller
        .run_load(&mut session, "scan.pdf", stub_bytes(4), 0.5, no_progress())
        .await
        .unwrap();
    assert_eq!(
        resolution,
        LoadResolution::Ready {
            page_count: 4,
            thumbnails: false
        }
    );
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.thumbnail_error().is_some());
    assert!(session.thumbnail(1).is_none());

    // Placeholders are fully interactive
    session.toggle(PageId(2)).unwrap();
    session.reorder(3, 0).unwrap();
    let output = controller
        .run_commit(&mut session, &NoProgress)
        .await
        .unwrap();
    assert_eq!(output.bytes, b"4,1,3".to_vec());
    assert_eq!(output.file_name, "scan_edited.pdf");
}

#[tokio::test]
async fn test_thumbnails_follow_identity_after_reorder() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    controller
        .run_load(&mut session, "a.pdf", stub_bytes(3), 1.0, no_progress())
        .await
        .unwrap();

    session.reorder(2, 0).unwrap();
    let first = &session.registry().unwrap().pages()[0];
    assert_eq!(first.original_index, 3);
    assert_eq!(session.thumbnail(first.original_index).unwrap().rgba[0], 3);
}

#[tokio::test]
async fn test_parse_failure_returns_to_empty() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);

    let err = controller
        .run_load(&mut session, "bad.pdf", b"garbage".to_vec(), 1.0, no_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, PagesError::LoadParse(_)));
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.registry().is_none());
}

#[tokio::test]
async fn test_empty_plan_keeps_state() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    controller
        .run_load(&mut session, "a.pdf", stub_bytes(2), 1.0, no_progress())
        .await
        .unwrap();

    session.deselect_all().unwrap();
    assert!(matches!(session.begin_commit(), Err(PagesError::EmptyPlan)));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_commit_failure_allows_retry() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    controller
        .run_load(&mut session, "a.pdf", stub_bytes(3), 1.0, no_progress())
        .await
        .unwrap();
    session.toggle(PageId(1)).unwrap();

    let request = session.begin_commit().unwrap();
    assert_eq!(session.state(), SessionState::Committing);
    assert!(matches!(
        session.toggle(PageId(2)),
        Err(PagesError::InvalidState(SessionState::Committing))
    ));

    let err = session
        .finish_commit(
            request.ticket,
            Err(PagesError::Codec("disk full".to_string())),
        )
        .unwrap_err();
    assert!(matches!(err, PagesError::Codec(_)));
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.last_error().unwrap().contains("disk full"));
    assert_eq!(session.commit_plan().unwrap().pages(), &[2, 3]);

    // Retrying straight from the error state works
    let output = controller
        .run_commit(&mut session, &NoProgress)
        .await
        .unwrap();
    assert_eq!(output.bytes, b"2,3".to_vec());
    assert_eq!(output.page_count, 2);
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_mutation_clears_error_state() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    controller
        .run_load(&mut session, "a.pdf", stub_bytes(3), 1.0, no_progress())
        .await
        .unwrap();

    let request = session.begin_commit().unwrap();
    let _ = session.finish_commit(
        request.ticket,
        Err(PagesError::Codec("broken".to_string())),
    );
    assert_eq!(session.state(), SessionState::Error);

    session.select_all().unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_commit_result_after_new_load_is_stale() {
    let (_, controller) = stub_controller();
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    controller
        .run_load(&mut session, "a.pdf", stub_bytes(3), 1.0, no_progress())
        .await
        .unwrap();

    let request = session.begin_commit().unwrap();
    let bytes = controller
        .commit(request.source.clone(), &request.plan, &NoProgress)
        .await;
    session.begin_load("b.pdf");

    assert_eq!(
        session.finish_commit(request.ticket, bytes).unwrap(),
        CommitResolution::Stale
    );
    assert_eq!(session.state(), SessionState::Loading);
}

//! Integration tests for create / publish / unpublish / remove transitions

use super::test_utils::{Fixture, PhaseRecorder};
use folio::handlers::{HandlerResult, PublishContentContext};
use folio::store::WriteRecord;
use folio::{ContentHandler, VersionOptions};
use std::sync::Arc;

fn flags(record: &WriteRecord) -> (u32, bool, bool) {
    (record.number, record.latest, record.published)
}

#[tokio::test]
async fn test_create_publish_draft_publish_scenario() {
    let fixture = Fixture::new();
    let mut manager = fixture.runtime.session();

    let a = manager.new_item("Page").unwrap();
    manager.create(&a, VersionOptions::Published).await.unwrap();
    let logical_id = a.logical_id();

    let rows = fixture.store.rows_for(logical_id);
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].number, rows[0].latest, rows[0].published), (1, true, true));

    fixture.store.clear_writes();
    let draft = manager
        .get(logical_id, VersionOptions::DraftRequired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.number(), 2);
    assert!(draft.is_latest());
    assert!(!draft.is_published());

    let writes = fixture.store.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(flags(&writes[0]), (1, false, true));
    assert_eq!(flags(&writes[1]), (2, true, false));

    let rows = fixture.store.rows_for(logical_id);
    assert_eq!((rows[0].number, rows[0].latest, rows[0].published), (1, false, true));
    assert_eq!((rows[1].number, rows[1].latest, rows[1].published), (2, true, false));

    fixture.store.clear_writes();
    manager.publish(&draft).await.unwrap();

    let writes = fixture.store.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(flags(&writes[0]), (1, false, false));
    assert_eq!(flags(&writes[1]), (2, true, true));

    // The cached first version observed the demotion
    assert!(!a.is_published());
    let published = manager.get_published(logical_id).await.unwrap().unwrap();
    assert!(published.ptr_eq(&draft));
}

#[tokio::test]
async fn test_publish_is_idempotent() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Published).await.unwrap();
    fixture.store.clear_writes();
    recorder.take();

    manager.publish(&item).await.unwrap();

    assert_eq!(fixture.store.write_count(), 0);
    assert!(recorder.take().is_empty());
}

#[tokio::test]
async fn test_publish_runs_phases_around_writes() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Draft).await.unwrap();
    recorder.take();

    manager.publish(&item).await.unwrap();
    assert_eq!(recorder.take(), vec!["publishing", "published"]);
    assert!(fixture.store.rows_for(item.logical_id())[0].published);
}

struct Veto;

impl ContentHandler for Veto {
    fn publishing(&self, context: &mut PublishContentContext) -> HandlerResult {
        context.cancel = true;
        Ok(())
    }
}

#[tokio::test]
async fn test_canceled_publish_writes_nothing() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![Arc::new(Veto), recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Draft).await.unwrap();
    fixture.store.clear_writes();
    recorder.take();

    manager.publish(&item).await.unwrap();

    // Later handlers in the phase still ran, but nothing after it did
    assert_eq!(recorder.take(), vec!["publishing"]);
    assert_eq!(fixture.store.write_count(), 0);
    assert!(!item.is_published());
}

#[tokio::test]
async fn test_create_defaults_to_published_first_version() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    recorder.take();
    manager.create(&item, VersionOptions::Published).await.unwrap();

    assert_eq!(
        recorder.take(),
        vec!["creating", "created", "publishing", "published"]
    );
    assert_ne!(item.row_id(), 0);
    assert_eq!(item.number(), 1);
    assert!(item.is_latest());
    assert!(item.is_published());
    assert!(manager
        .session()
        .try_get_by_row_id(item.row_id())
        .unwrap()
        .ptr_eq(&item));
}

#[tokio::test]
async fn test_create_draft_with_explicit_number() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    recorder.take();
    manager.create(&item, VersionOptions::Draft).await.unwrap();
    assert_eq!(recorder.take(), vec!["creating", "created"]);
    assert!(!item.is_published());
    assert!(item.is_latest());

    let numbered = manager.new_item("Page").unwrap();
    manager.create(&numbered, VersionOptions::Number(5)).await.unwrap();
    assert_eq!(numbered.number(), 5);
    // Only the draft modes clear the published default
    assert!(numbered.is_published());
}

#[tokio::test]
async fn test_unpublish_without_published_row_is_noop() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Draft).await.unwrap();
    fixture.store.clear_writes();
    recorder.take();

    manager.unpublish(&item).await.unwrap();

    assert_eq!(fixture.store.write_count(), 0);
    assert!(recorder.take().is_empty());
}

#[tokio::test]
async fn test_unpublish_published_item() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Published).await.unwrap();
    fixture.store.clear_writes();
    recorder.take();

    manager.unpublish(&item).await.unwrap();

    assert_eq!(recorder.take(), vec!["unpublishing", "unpublished"]);
    let writes = fixture.store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(flags(&writes[0]), (1, true, false));
    assert!(manager
        .get_published(item.logical_id())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unpublish_through_draft_writes_the_draft() {
    let fixture = Fixture::new();
    let mut manager = fixture.runtime.session();

    let published = manager.new_item("Page").unwrap();
    manager.create(&published, VersionOptions::Published).await.unwrap();
    let logical_id = published.logical_id();
    let draft = manager
        .get(logical_id, VersionOptions::DraftRequired)
        .await
        .unwrap()
        .unwrap();
    fixture.store.clear_writes();

    manager.unpublish(&draft).await.unwrap();

    // The published row is demoted in the session, but the row written is the
    // one the caller passed in.
    assert!(!published.is_published());
    let writes = fixture.store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].row_id, draft.row_id());
    assert!(fixture.store.rows_for(logical_id)[0].published);
}

#[tokio::test]
async fn test_remove_clears_flags_but_keeps_rows() {
    let recorder = PhaseRecorder::new();
    let fixture = Fixture::with_handlers(vec![recorder.clone()]);
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Published).await.unwrap();
    let logical_id = item.logical_id();
    recorder.take();

    manager.remove(&item).await.unwrap();

    assert_eq!(recorder.take(), vec!["removing", "removed"]);
    let rows = fixture.store.rows_for(logical_id);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].latest);
    assert!(!rows[0].published);

    assert!(manager
        .get(logical_id, VersionOptions::Latest)
        .await
        .unwrap()
        .is_none());
    assert!(manager.get_published(logical_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_retires_published_and_draft() {
    let fixture = Fixture::new();
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Published).await.unwrap();
    let logical_id = item.logical_id();
    manager
        .get(logical_id, VersionOptions::DraftRequired)
        .await
        .unwrap()
        .unwrap();
    fixture.store.clear_writes();

    manager.remove(&item).await.unwrap();

    assert_eq!(fixture.store.write_count(), 2);
    assert!(fixture
        .store
        .rows_for(logical_id)
        .iter()
        .all(|r| !r.latest && !r.published));
}

#[tokio::test]
async fn test_version_numbers_are_contiguous() {
    let fixture = Fixture::new();
    let mut manager = fixture.runtime.session();

    let item = manager.new_item("Page").unwrap();
    manager.create(&item, VersionOptions::Published).await.unwrap();
    let logical_id = item.logical_id();

    for _ in 0..4 {
        let draft = manager
            .get(logical_id, VersionOptions::DraftRequired)
            .await
            .unwrap()
            .unwrap();
        manager.publish(&draft).await.unwrap();
    }

    let rows = fixture.store.rows_for(logical_id);
    let numbers: Vec<u32> = rows.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(rows.iter().filter(|r| r.latest).count(), 1);
    assert_eq!(rows.iter().filter(|r| r.published).count(), 1);
    assert!(rows[4].latest && rows[4].published);
}

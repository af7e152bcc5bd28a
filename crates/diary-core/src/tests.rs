//! Tests for `EntryStore` against the in-memory backends.

use std::{future, time::Duration};

use crate::{
  Error,
  entry::{Entry, EntryDraft, EntryId},
  memory::{MemoryError, MemoryRemote, MemoryStore},
  notice::Notice,
  persist::{LocalStore, RemoteStore, encode_local},
  store::{EntryStore, StoreOptions, export_file_name},
};

async fn store() -> EntryStore<MemoryStore> {
  EntryStore::local_only(MemoryStore::new())
    .await
    .expect("in-memory store")
}

async fn mirrored(remote: MemoryRemote) -> EntryStore<MemoryStore, MemoryRemote> {
  EntryStore::open(MemoryStore::new(), Some(remote), StoreOptions::default())
    .await
    .expect("mirrored store")
}

fn draft_a() -> EntryDraft {
  EntryDraft::new("lab", 3, "Goroutines lab", "Worked through channel exercises.")
    .with_day(1)
    .with_topics("Go, Go, concurrency")
    .with_time_spent(2.0)
}

fn draft_b() -> EntryDraft {
  EntryDraft::new("day", 3, "Unit testing", "Table-driven tests and fixtures.")
    .with_day(2)
    .with_topics("testing")
    .with_time_spent(1.5)
}

fn ids(entries: &[Entry]) -> Vec<EntryId> { entries.iter().map(|e| e.id).collect() }

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_identity_and_persists_locally() {
  let s = store().await;

  let entry = s.create(draft_a()).await.unwrap();
  assert_eq!(entry.topics, vec!["Go", "Go", "concurrency"]);
  assert_eq!(entry.timestamp, entry.date.timestamp_millis());

  assert_eq!(s.all().await, vec![entry.clone()]);
  let stored = s.local().load().await.unwrap();
  assert_eq!(stored, vec![entry]);
}

#[tokio::test]
async fn create_rejects_invalid_draft_without_mutating() {
  let s = store().await;
  s.create(draft_a()).await.unwrap();
  let before = s.local().raw();

  let mut bad = draft_b();
  bad.content = "short".into();
  let err = s.create(bad).await.unwrap_err();

  assert!(err.is_validation(), "{err}");
  assert_eq!(s.all().await.len(), 1);
  assert_eq!(s.local().raw(), before);
}

#[tokio::test]
async fn ids_stay_unique_across_mixed_operations() {
  let s = store().await;

  let mut created = Vec::new();
  for _ in 0..25 {
    created.push(s.create(draft_a()).await.unwrap());
  }
  for entry in created.iter().step_by(3) {
    s.delete(entry.id).await.unwrap();
  }
  s.update(created[1].id, draft_b()).await.unwrap();
  for _ in 0..10 {
    s.create(draft_b()).await.unwrap();
  }

  let all = s.all().await;
  let mut unique = ids(&all);
  unique.sort();
  unique.dedup();
  assert_eq!(unique.len(), all.len());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_fields_but_keeps_identity_and_creation_time() {
  let s = store().await;
  let original = s.create(draft_a()).await.unwrap();

  tokio::time::sleep(Duration::from_millis(5)).await;
  let updated = s.update(original.id, draft_b()).await.unwrap();

  assert_eq!(updated.id, original.id);
  assert_eq!(updated.date, original.date);
  assert_eq!(updated.timestamp, original.timestamp);
  assert_eq!(updated.title, "Unit testing");
  assert_eq!(updated.day, Some(2));
  assert_eq!(s.get(original.id).await, Some(updated));
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
  let s = store().await;
  s.create(draft_a()).await.unwrap();
  let before = s.all().await;

  let err = s.update(EntryId(42), draft_b()).await.unwrap_err();
  assert!(matches!(err, Error::EntryNotFound(EntryId(42))));
  assert_eq!(s.all().await, before);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_entry() {
  let s = store().await;
  let a = s.create(draft_a()).await.unwrap();
  let b = s.create(draft_b()).await.unwrap();

  s.delete(a.id).await.unwrap();

  assert_eq!(ids(&s.all().await), vec![b.id]);
  assert_eq!(ids(&s.local().load().await.unwrap()), vec![b.id]);
}

#[tokio::test]
async fn delete_unknown_id_leaves_collection_unchanged() {
  let s = store().await;
  s.create(draft_a()).await.unwrap();
  let before = s.all().await;

  let err = s.delete(EntryId(-1)).await.unwrap_err();
  assert!(err.is_not_found());
  assert_eq!(s.all().await, before);
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[tokio::test]
async fn import_of_non_array_fails_and_keeps_collection() {
  let s = store().await;
  s.create(draft_a()).await.unwrap();
  let before = s.all().await;
  let raw_before = s.local().raw();

  let err = s.import_json(r#"{"not":"an array"}"#).await.unwrap_err();
  assert!(err.is_validation(), "{err}");
  assert_eq!(s.all().await, before);
  assert_eq!(s.local().raw(), raw_before);
}

#[tokio::test]
async fn import_with_malformed_record_fails() {
  let s = store().await;
  let err = s.import_json(r#"[{"id":1,"title":"missing everything"}]"#).await.unwrap_err();
  assert!(err.is_validation());
  assert!(s.all().await.is_empty());
}

#[tokio::test]
async fn import_with_duplicate_ids_fails() {
  let s = store().await;
  let a = s.create(draft_a()).await.unwrap();
  let doc = encode_local(&[a.clone(), a]).unwrap();

  let err = s.import_json(&doc).await.unwrap_err();
  assert!(err.is_validation());
  assert_eq!(s.all().await.len(), 1);
}

#[tokio::test]
async fn export_then_import_reproduces_collection() {
  let source = store().await;
  source.create(draft_a()).await.unwrap();
  let mut sparse = draft_b();
  sparse.day = None;
  sparse.time_spent = None;
  sparse.entry_type = "workshop".into();
  source.create(sparse).await.unwrap();

  let export = source.export().await.unwrap();
  assert!(export.file_name.starts_with("IT401_Learning_Diary_"));
  assert!(export.file_name.ends_with(".json"));

  let target = store().await;
  target.create(draft_b()).await.unwrap();
  let count = target.import_json(&export.body).await.unwrap();

  assert_eq!(count, 2);
  assert_eq!(target.all().await, source.all().await);
}

#[tokio::test]
async fn import_cleans_blank_topics() {
  let s = store().await;
  let doc = r#"[{"id":5,"type":"exam","week":8,"day":null,"lessonDate":"2025-09-22",
    "title":"Midterm","topics":["  ", "graphs "],"content":"Revision notes",
    "timeSpent":null,"date":"2025-09-22T08:00:00.000Z","timestamp":1758528000000}]"#;

  s.import_json(doc).await.unwrap();
  let all = s.all().await;
  assert_eq!(all[0].topics, vec!["graphs"]);
  assert_eq!(all[0].lesson_date.map(|d| d.to_string()).as_deref(), Some("2025-09-22"));
}

#[tokio::test]
async fn ids_after_import_stay_above_imported_ones() {
  let s = store().await;
  let far_future = i64::MAX / 2;
  let doc = format!(
    r#"[{{"id":{far_future},"type":"day","week":1,"title":"Intro","content":"Course overview",
      "date":"2025-08-04T10:00:00Z","timestamp":1754301600000}}]"#
  );
  s.import_json(&doc).await.unwrap();

  let created = s.create(draft_a()).await.unwrap();
  assert!(created.id.0 > far_future);
}

#[tokio::test]
async fn create_refuses_to_reuse_the_largest_id() {
  let s = store().await;
  let doc = format!(
    r#"[{{"id":{},"type":"day","week":1,"title":"Intro","content":"Course overview",
      "date":"2025-08-04T10:00:00Z","timestamp":1754301600000}}]"#,
    i64::MAX
  );
  s.import_json(&doc).await.unwrap();

  let err = s.create(draft_a()).await.unwrap_err();
  assert!(err.is_validation(), "{err}");
  assert_eq!(s.all().await.iter().map(|e| e.id).collect::<Vec<_>>(), vec![EntryId(i64::MAX)]);
}

#[tokio::test]
async fn import_rejects_out_of_range_numbers() {
  let s = store().await;
  let kept = s.create(draft_a()).await.unwrap();

  let record = |fields: &str| {
    format!(
      r#"[{{"id":1,"type":"day","title":"Intro","content":"Course overview",
        "date":"2025-08-04T10:00:00Z","timestamp":1754301600000,{fields}}}]"#
    )
  };
  for fields in [
    r#""week":0"#,
    r#""week":2,"day":0"#,
    r#""week":2,"timeSpent":-5"#,
  ] {
    let err = s.import_json(&record(fields)).await.unwrap_err();
    assert!(err.is_validation(), "{fields}: {err}");
    assert!(err.to_string().contains("entry 0"), "{err}");
  }

  assert_eq!(s.all().await, vec![kept]);
}

#[tokio::test]
async fn import_skips_text_length_limits() {
  let s = store().await;
  let doc = r#"[{"id":1,"type":"day","week":1,"title":"Hi","content":"Short",
    "date":"2025-08-04T10:00:00Z","timestamp":1754301600000}]"#;
  assert_eq!(s.import_json(doc).await.unwrap(), 1);
}

#[test]
fn export_file_name_uses_iso_date() {
  let date = chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
  assert_eq!(export_file_name(date), "IT401_Learning_Diary_2025-09-01.json");
}

// ─── Startup policy ──────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_document_wins_and_overwrites_local() {
  let seed = store().await;
  let remote_entry = seed.create(draft_a()).await.unwrap();
  let remote = MemoryRemote::with_document(vec![remote_entry.clone()]);

  let local = MemoryStore::with_raw("[]");
  let s = EntryStore::open(local, Some(remote), StoreOptions::default()).await.unwrap();

  assert_eq!(s.all().await, vec![remote_entry.clone()]);
  assert_eq!(s.local().load().await.unwrap(), vec![remote_entry]);
  assert_eq!(s.startup_notices(), &[Notice::LoadedFromRemote { count: 1 }]);
  assert!(s.remote().is_some_and(|r| r.document().is_some()));
}

#[tokio::test]
async fn missing_remote_document_falls_back_to_local() {
  let seed = store().await;
  let entry = seed.create(draft_b()).await.unwrap();
  let local = MemoryStore::with_raw(encode_local(&[entry.clone()]).unwrap());

  let s = EntryStore::open(local, Some(MemoryRemote::new()), StoreOptions::default())
    .await
    .unwrap();

  assert_eq!(s.all().await, vec![entry]);
  assert_eq!(s.startup_notices(), &[Notice::LoadedFromLocal { count: 1 }]);
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local() {
  let seed = store().await;
  let entry = seed.create(draft_b()).await.unwrap();
  let local = MemoryStore::with_raw(encode_local(&[entry.clone()]).unwrap());
  let remote = MemoryRemote::with_document(Vec::new());
  remote.set_offline(true);

  let s = EntryStore::open(local, Some(remote), StoreOptions::default()).await.unwrap();

  assert_eq!(s.all().await, vec![entry]);
  assert!(matches!(s.startup_notices()[0], Notice::RemoteLoadFailed { .. }));
}

/// A remote whose load never completes.
struct SilentRemote;

impl RemoteStore for SilentRemote {
  type Error = MemoryError;

  async fn load(&self) -> Result<Option<Vec<Entry>>, MemoryError> { future::pending().await }

  async fn save(&self, _entries: &[Entry]) -> Result<(), MemoryError> { Ok(()) }
}

#[tokio::test]
async fn slow_remote_is_abandoned_after_the_wait() {
  let options = StoreOptions { remote_wait: Duration::from_millis(50) };
  let s = EntryStore::open(MemoryStore::new(), Some(SilentRemote), options).await.unwrap();

  assert!(s.all().await.is_empty());
  assert!(matches!(s.startup_notices()[0], Notice::RemoteLoadFailed { .. }));
  assert_eq!(s.startup_notices()[1], Notice::StartedEmpty);
}

#[tokio::test]
async fn corrupt_local_document_starts_empty() {
  let s = EntryStore::local_only(MemoryStore::with_raw("{ definitely not json"))
    .await
    .unwrap();
  assert!(s.all().await.is_empty());
  assert_eq!(s.startup_notices(), &[Notice::StartedEmpty]);
}

#[tokio::test]
async fn duplicate_ids_in_stored_data_keep_first() {
  let seed = store().await;
  let a = seed.create(draft_a()).await.unwrap();
  let mut clash = a.clone();
  clash.title = "Second copy".into();
  let local = MemoryStore::with_raw(encode_local(&[a.clone(), clash]).unwrap());

  let s = EntryStore::local_only(local).await.unwrap();
  assert_eq!(s.all().await, vec![a]);
}

// ─── Persistence failures ────────────────────────────────────────────────────

#[tokio::test]
async fn local_save_failure_fails_the_operation() {
  let s = store().await;
  let mut notices = s.subscribe();
  s.local().fail_saves(true);

  let err = s.create(draft_a()).await.unwrap_err();
  assert!(matches!(err, Error::LocalPersistence(_)));
  // The in-memory collection already reflects the mutation.
  assert_eq!(s.all().await.len(), 1);
  assert!(matches!(notices.recv().await.unwrap(), Notice::LocalSaveFailed { .. }));
}

#[tokio::test]
async fn remote_save_failure_is_reported_but_not_fatal() {
  let remote = MemoryRemote::new();
  let s = mirrored(remote.clone()).await;
  let mut notices = s.subscribe();
  remote.set_offline(true);

  let entry = s.create(draft_a()).await.unwrap();
  s.flush().await;

  assert_eq!(s.all().await, vec![entry.clone()]);
  assert_eq!(s.local().load().await.unwrap(), vec![entry.clone()]);
  assert_eq!(remote.document(), None);

  let mut seen = Vec::new();
  while let Ok(n) = notices.try_recv() {
    seen.push(n);
  }
  assert!(seen.contains(&Notice::EntryCreated { id: entry.id }));
  assert!(seen.iter().any(|n| matches!(n, Notice::RemoteSaveFailed { .. })));
}

// ─── Remote mirroring ────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_are_mirrored_to_remote() {
  let remote = MemoryRemote::new();
  let s = mirrored(remote.clone()).await;

  let a = s.create(draft_a()).await.unwrap();
  s.create(draft_b()).await.unwrap();
  s.flush().await;
  assert_eq!(remote.document().map(|d| d.len()), Some(2));

  s.delete(a.id).await.unwrap();
  s.flush().await;
  assert_eq!(remote.document(), Some(s.all().await));
}

#[tokio::test]
async fn only_the_newest_snapshot_reaches_a_slow_remote() {
  let remote = MemoryRemote::new();
  let s = mirrored(remote.clone()).await;
  remote.set_paused(true);

  for _ in 0..3 {
    s.create(draft_a()).await.unwrap();
  }
  tokio::task::yield_now().await;
  remote.set_paused(false);
  s.flush().await;

  let saves = remote.completed_saves();
  assert!(saves.len() <= 2, "intermediate snapshots were queued: {saves:?}");
  assert_eq!(saves.last(), Some(&3));
  assert_eq!(remote.document(), Some(s.all().await));
}

#[tokio::test]
async fn local_only_store_reports_local_saves() {
  let s = store().await;
  let mut notices = s.subscribe();

  let entry = s.create(draft_a()).await.unwrap();

  assert_eq!(notices.recv().await.unwrap(), Notice::SavedLocally);
  assert_eq!(notices.recv().await.unwrap(), Notice::EntryCreated { id: entry.id });
}

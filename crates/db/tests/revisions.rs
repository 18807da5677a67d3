//! Integration tests for the revision chain and tag registry.
//!
//! Exercises `RevisionRepo` and `TagRepo` against a real database:
//! - Revision numbers run 1..N with no gaps, including under concurrent appends
//! - Appending to a missing entry is refused without writing
//! - A failed append leaves no partial revision
//! - Tag classification is last-writer-wins; re-attaching is a no-op
//! - Concurrent appends sharing tags in any order do not deadlock
//! - History lists revisions newest first with their own tags

mod common;

use sqlx::PgPool;
use wayside_core::tagging::TagInput;
use wayside_db::models::revision::AppendRevision;
use wayside_db::repositories::{EntryRepo, RevisionRepo, TagRepo};

use common::{create_entry, create_user, new_entry};

fn edit(title: &str, tags: Vec<TagInput>) -> AppendRevision {
    AppendRevision {
        title: title.to_string(),
        content: format!("{title} body"),
        tags,
    }
}

async fn revision_numbers(pool: &PgPool, entry_id: i64) -> Vec<i32> {
    let mut numbers: Vec<i32> = RevisionRepo::list_by_entry(pool, entry_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.revision_number)
        .collect();
    numbers.sort_unstable();
    numbers
}

// ---------------------------------------------------------------------------
// Numbering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_appends_revision_two(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(
        &pool,
        alice,
        &new_entry(
            "Coffee Shop",
            37.77,
            -122.42,
            vec![TagInput::new("food", "category")],
        ),
    )
    .await;

    let appended = RevisionRepo::append(
        &pool,
        created.entry_id,
        alice,
        &edit("Coffee Shop & Bakery", vec![TagInput::new("food", "category")]),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(appended.revision.entry_id, created.entry_id);
    assert_eq!(appended.revision.revision_number, 2);
    assert_eq!(appended.tags.len(), 1);

    let current = RevisionRepo::find_current(&pool, created.entry_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.id, appended.revision.id);
    assert_eq!(current.title, "Coffee Shop & Bakery");

    // Revision 1 is untouched.
    let first = RevisionRepo::find_by_id(&pool, created.revision_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.title, "Coffee Shop");
    assert_eq!(first.revision_number, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sequential_appends_have_no_gaps(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(&pool, alice, &new_entry("Seq", 1.0, 1.0, vec![])).await;

    for i in 0..4 {
        RevisionRepo::append(&pool, created.entry_id, alice, &edit(&format!("v{i}"), vec![]))
            .await
            .unwrap()
            .unwrap();
    }

    assert_eq!(revision_numbers(&pool, created.entry_id).await, vec![1, 2, 3, 4, 5]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_appends_have_no_duplicates(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(&pool, alice, &new_entry("Busy", 2.0, 2.0, vec![])).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let pool = pool.clone();
        let entry_id = created.entry_id;
        handles.push(tokio::spawn(async move {
            RevisionRepo::append(&pool, entry_id, alice, &edit(&format!("c{i}"), vec![]))
                .await
                .unwrap()
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let expected: Vec<i32> = (1..=11).collect();
    assert_eq!(revision_numbers(&pool, created.entry_id).await, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revision_numbers_are_per_entry(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let a = create_entry(&pool, alice, &new_entry("A", 3.0, 3.0, vec![])).await;
    let b = create_entry(&pool, alice, &new_entry("B", 4.0, 4.0, vec![])).await;

    RevisionRepo::append(&pool, a.entry_id, alice, &edit("A2", vec![]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(revision_numbers(&pool, a.entry_id).await, vec![1, 2]);
    assert_eq!(revision_numbers(&pool, b.entry_id).await, vec![1]);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_to_missing_entry_returns_none(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;

    let result = RevisionRepo::append(&pool, 777, alice, &edit("Ghost", vec![]))
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(!EntryRepo::exists(&pool, 777).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_append_leaves_no_partial_revision(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(&pool, alice, &new_entry("Stable", 5.0, 5.0, vec![])).await;

    let result = RevisionRepo::append(
        &pool,
        created.entry_id,
        alice,
        &edit("Bad tags", vec![TagInput::new("fine", ""), TagInput::new(" ", "")]),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(revision_numbers(&pool, created.entry_id).await, vec![1]);
    assert!(TagRepo::find_by_name(&pool, "fine").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tag_classification_last_writer_wins(pool: PgPool) {
    let first = TagRepo::resolve(&pool, "food", "category").await.unwrap();
    let second = TagRepo::resolve(&pool, "food", "cuisine").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.classification, "cuisine");

    let all = TagRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].classification, "cuisine");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_reclassifies_shared_tag(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(
        &pool,
        alice,
        &new_entry("Diner", 6.0, 6.0, vec![TagInput::new("food", "category")]),
    )
    .await;

    RevisionRepo::append(
        &pool,
        created.entry_id,
        alice,
        &edit("Diner", vec![TagInput::new("food", "meal")]),
    )
    .await
    .unwrap()
    .unwrap();

    // Both revisions link to the same tag row, now reclassified.
    let old_tags = TagRepo::tags_for_revision(&pool, created.revision_id)
        .await
        .unwrap();
    assert_eq!(old_tags[0].classification, "meal");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reattach_is_idempotent(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(
        &pool,
        alice,
        &new_entry("Museum", 7.0, 7.0, vec![TagInput::new("art", "topic")]),
    )
    .await;

    TagRepo::attach_to_revision(&pool, created.revision_id, &[TagInput::new("art", "topic")])
        .await
        .unwrap();

    let tags = TagRepo::tags_for_revision(&pool, created.revision_id)
        .await
        .unwrap();
    assert_eq!(tags.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_tags_in_one_request_collapse(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(
        &pool,
        alice,
        &new_entry(
            "Market",
            8.0,
            8.0,
            vec![TagInput::new("food", "a"), TagInput::new(" food ", "b")],
        ),
    )
    .await;

    let tags = TagRepo::tags_for_revision(&pool, created.revision_id)
        .await
        .unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].classification, "b");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_resolve_of_new_tag(pool: PgPool) {
    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            TagRepo::resolve(&pool, "fresh", &format!("c{i}")).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_appends_with_reversed_tag_order(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let first = create_entry(&pool, alice, &new_entry("North", 8.0, 8.0, vec![])).await;
    let second = create_entry(&pool, alice, &new_entry("South", -8.0, 8.0, vec![])).await;

    for round in 0..20 {
        let forward = edit(
            &format!("forward {round}"),
            vec![TagInput::new("alpha", "x"), TagInput::new("beta", "x")],
        );
        let reversed = edit(
            &format!("reversed {round}"),
            vec![TagInput::new("beta", "y"), TagInput::new("alpha", "y")],
        );

        let (a, b) = tokio::join!(
            RevisionRepo::append(&pool, first.entry_id, alice, &forward),
            RevisionRepo::append(&pool, second.entry_id, alice, &reversed),
        );
        assert_eq!(a.unwrap().unwrap().tags.len(), 2, "round {round}");
        assert_eq!(b.unwrap().unwrap().tags.len(), 2, "round {round}");
    }

    assert_eq!(revision_numbers(&pool, first.entry_id).await.len(), 21);
    assert_eq!(revision_numbers(&pool, second.entry_id).await.len(), 21);
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_newest_first_with_own_tags(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let created = create_entry(
        &pool,
        alice,
        &new_entry("Trail", 9.0, 9.0, vec![TagInput::new("hike", "activity")]),
    )
    .await;
    RevisionRepo::append(
        &pool,
        created.entry_id,
        alice,
        &edit("Trail", vec![TagInput::new("view", "feature")]),
    )
    .await
    .unwrap()
    .unwrap();

    let history = RevisionRepo::list_with_tags(&pool, created.entry_id)
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].revision.revision_number, 2);
    assert_eq!(history[0].tags[0].name, "view");
    assert_eq!(history[1].revision.revision_number, 1);
    assert_eq!(history[1].tags[0].name, "hike");
}

//! Tests for the todo repository.

use uuid::Uuid;

use super::SqliteDatabase;
use crate::db::{NewTag, NewTodo, Priority, SortOrder, TodoChanges, TodoQuery, User};

async fn test_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

async fn test_user(db: &SqliteDatabase, email: &str) -> User {
    db.users().create(email, "hash").await.unwrap()
}

fn new_todo(title: &str) -> NewTodo {
    NewTodo {
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_get_todo_with_tags() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let tag = db
        .tags()
        .create(
            user.id,
            &NewTag {
                name: "errands".to_string(),
                color: None,
            },
        )
        .await
        .unwrap();

    let todo = db
        .todos()
        .create(
            user.id,
            &NewTodo {
                title: "  Buy milk  ".to_string(),
                description: Some("From the corner shop".to_string()),
                priority: Some(Priority::High),
                due_date: Some("2026-09-01".to_string()),
                tag_ids: Some(vec![tag.id]),
            },
        )
        .await
        .unwrap();

    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.user_id, user.id);
    assert!(!todo.completed);
    assert_eq!(todo.priority, Priority::High);
    assert_eq!(todo.due_date.as_deref(), Some("2026-09-01"));
    assert_eq!(todo.tags.len(), 1);
    assert_eq!(todo.tags[0].id, tag.id);

    let fetched = db.todos().get(user.id, todo.id).await.unwrap().unwrap();
    assert_eq!(fetched, todo);
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_tag_ids_are_dropped() {
    let db = test_db().await;
    let alice = test_user(&db, "alice@example.com").await;
    let bob = test_user(&db, "bob@example.com").await;

    let bobs_tag = db
        .tags()
        .create(
            bob.id,
            &NewTag {
                name: "private".to_string(),
                color: None,
            },
        )
        .await
        .unwrap();

    let todo = db
        .todos()
        .create(
            alice.id,
            &NewTodo {
                title: "Plan trip".to_string(),
                tag_ids: Some(vec![bobs_tag.id, Uuid::new_v4()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(todo.tags.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn todos_are_invisible_across_users() {
    let db = test_db().await;
    let alice = test_user(&db, "alice@example.com").await;
    let bob = test_user(&db, "bob@example.com").await;

    let todo = db.todos().create(alice.id, &new_todo("Secret")).await.unwrap();

    assert!(db.todos().get(bob.id, todo.id).await.unwrap().is_none());
    assert!(
        db.todos()
            .update(
                bob.id,
                todo.id,
                &TodoChanges {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .is_none()
    );
    assert!(!db.todos().delete(bob.id, todo.id).await.unwrap());

    // Alice's todo is untouched
    let fetched = db.todos().get(alice.id, todo.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Secret");
}

#[tokio::test(flavor = "multi_thread")]
async fn update_applies_partial_fields() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let todo = db
        .todos()
        .create(
            user.id,
            &NewTodo {
                title: "Original".to_string(),
                description: Some("Keep me".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = db
        .todos()
        .update(
            user.id,
            todo.id,
            &TodoChanges {
                title: Some("Renamed".to_string()),
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert!(updated.completed);
    assert_eq!(updated.description.as_deref(), Some("Keep me"));
}

#[tokio::test(flavor = "multi_thread")]
async fn update_bumps_updated_at_even_with_no_fields() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let todo = db.todos().create(user.id, &new_todo("Ping")).await.unwrap();

    let updated = db
        .todos()
        .update(user.id, todo.id, &TodoChanges::default())
        .await
        .unwrap()
        .unwrap();

    assert!(updated.updated_at > todo.updated_at);
    assert_eq!(updated.title, todo.title);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_replaces_full_tag_set() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let tag_a = db
        .tags()
        .create(user.id, &NewTag { name: "a".to_string(), color: None })
        .await
        .unwrap();
    let tag_b = db
        .tags()
        .create(user.id, &NewTag { name: "b".to_string(), color: None })
        .await
        .unwrap();

    let todo = db
        .todos()
        .create(
            user.id,
            &NewTodo {
                title: "Tagged".to_string(),
                tag_ids: Some(vec![tag_a.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(todo.tags.len(), 1);

    let updated = db
        .todos()
        .update(
            user.id,
            todo.id,
            &TodoChanges {
                tag_ids: Some(vec![tag_b.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].id, tag_b.id);

    // Empty set clears all associations
    let cleared = db
        .todos()
        .update(
            user.id,
            todo.id,
            &TodoChanges {
                tag_ids: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_completed() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let done = db.todos().create(user.id, &new_todo("Done")).await.unwrap();
    db.todos().create(user.id, &new_todo("Open")).await.unwrap();
    db.todos()
        .update(
            user.id,
            done.id,
            &TodoChanges {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let completed = db
        .todos()
        .list(
            user.id,
            &TodoQuery {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.total, 1);
    assert_eq!(completed.items[0].title, "Done");

    let open = db
        .todos()
        .list(
            user.id,
            &TodoQuery {
                completed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(open.total, 1);
    assert_eq!(open.items[0].title, "Open");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_search_is_case_insensitive_over_title_and_description() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    db.todos()
        .create(user.id, &new_todo("Buy GROCERIES"))
        .await
        .unwrap();
    db.todos()
        .create(
            user.id,
            &NewTodo {
                title: "Weekend".to_string(),
                description: Some("stock up on groceries".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    db.todos().create(user.id, &new_todo("Unrelated")).await.unwrap();

    let result = db
        .todos()
        .list(
            user.id,
            &TodoQuery {
                search: Some("Groceries".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(result.total, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_paginates_with_stable_total() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    for i in 0..5 {
        db.todos()
            .create(user.id, &new_todo(&format!("Todo {i}")))
            .await
            .unwrap();
    }

    let mut seen = 0;
    for page in 1..=3 {
        let result = db
            .todos()
            .list(
                user.id,
                &TodoQuery {
                    page,
                    page_size: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.total, 5);
        seen += result.items.len();
    }
    assert_eq!(seen, 5);

    // Beyond the last page: empty items, same total
    let past_end = db
        .todos()
        .list(
            user.id,
            &TodoQuery {
                page: 4,
                page_size: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_respects_sort_order() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let first = db.todos().create(user.id, &new_todo("First")).await.unwrap();
    let second = db.todos().create(user.id, &new_todo("Second")).await.unwrap();

    let asc = db
        .todos()
        .list(
            user.id,
            &TodoQuery {
                sort_order: SortOrder::Asc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(asc.items.first().map(|t| t.id), Some(first.id));

    let desc = db
        .todos()
        .list(user.id, &TodoQuery::default())
        .await
        .unwrap();
    assert_eq!(desc.items.first().map(|t| t.id), Some(second.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_todo() {
    let db = test_db().await;
    let user = test_user(&db, "alice@example.com").await;

    let todo = db.todos().create(user.id, &new_todo("Gone soon")).await.unwrap();

    assert!(db.todos().delete(user.id, todo.id).await.unwrap());
    assert!(db.todos().get(user.id, todo.id).await.unwrap().is_none());

    // Second delete is a no-op
    assert!(!db.todos().delete(user.id, todo.id).await.unwrap());
}

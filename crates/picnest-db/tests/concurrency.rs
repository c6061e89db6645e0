mod common;

use std::sync::Arc;
use std::thread;

use common::PASSWORD;
use picnest_db::relations::POST_COMMENTS;
use picnest_db::{Database, ErrorKind, Schema, StoreConfig};
use picnest_types::api::{NewComment, NewPost, NewUser};

fn file_db(dir: &tempfile::TempDir) -> Database {
    let mut config = StoreConfig::new(dir.path().join("picnest.db"));
    config.readers = 2;
    Database::open(&config, Arc::new(Schema::social())).unwrap()
}

#[test]
fn test_concurrent_duplicate_usernames_one_wins() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = &db;
                s.spawn(move || {
                    db.create(NewUser::new(
                        "alice",
                        format!("alice{}@example.com", i),
                        PASSWORD.as_str(),
                    ))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Conflict))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);
    assert!(db.find_user_by_username("alice").unwrap().is_some());
}

#[test]
fn test_reads_see_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir);

    let alice = db
        .create(NewUser::new("alice", "alice@example.com", PASSWORD.as_str()))
        .unwrap();
    let post = db.create(NewPost::new(alice.id, "img.png")).unwrap();

    thread::scope(|s| {
        let writer = s.spawn(|| {
            for i in 0..50 {
                db.create(NewComment::new(post.id, alice.id, format!("c{}", i)))
                    .unwrap();
            }
        });

        for _ in 0..2 {
            s.spawn(|| {
                let mut last_len = 0;
                for _ in 0..20 {
                    let comments = db.list_by(post.id, POST_COMMENTS).to_vec().unwrap();
                    // Rows only ever appear whole and in order.
                    assert!(comments.len() >= last_len);
                    for (i, c) in comments.iter().enumerate() {
                        assert_eq!(c.text, format!("c{}", i));
                    }
                    last_len = comments.len();
                }
            });
        }

        writer.join().unwrap();
    });

    assert_eq!(db.list_by(post.id, POST_COMMENTS).to_vec().unwrap().len(), 50);
}

#[test]
fn test_reopen_keeps_data_and_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = file_db(&dir);
        db.create(NewUser::new("alice", "alice@example.com", PASSWORD.as_str()))
            .unwrap();
    }

    let db = file_db(&dir);
    let alice = db.find_user_by_username("alice").unwrap().unwrap();
    assert_eq!(alice.email, "alice@example.com");
    let err = db
        .create(NewUser::new("alice", "again@example.com", PASSWORD.as_str()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

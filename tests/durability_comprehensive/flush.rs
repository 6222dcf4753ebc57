//! Flush barrier and shutdown.

use crate::*;
use kvlog::Error;
use std::sync::Arc;

#[tokio::test]
async fn test_flush_makes_every_mutation_visible_on_disk() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    for i in 0..200 {
        db.put(&format!("k{}", i), &format!("v{}", i)).await.unwrap();
    }
    db.flush().await;

    assert_eq!(db.logger().pending_writes(), 0);
    assert_eq!(read_lines(&path).len(), 200);
}

#[tokio::test]
async fn test_flush_on_idle_logger_returns() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    db.flush().await;
    db.flush().await;
    assert!(read_lines(&path).is_empty());
}

#[tokio::test]
async fn test_concurrent_writers_get_contiguous_sequences() {
    let (_dir, path) = temp_log();
    let db = Arc::new(open(&path).await);

    let mut handles = Vec::new();
    for t in 0..8 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                db.put(&format!("t{}:{}", t, i), "x").await.unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    db.flush().await;

    let sequences: Vec<u64> = read_lines(&path)
        .iter()
        .map(|l| l.split('\t').next().unwrap().parse().unwrap())
        .collect();
    let expected: Vec<u64> = (1..=400).collect();
    assert_eq!(sequences, expected);
    assert_eq!(db.store().len(), 400);
}

#[tokio::test]
async fn test_close_rejects_later_mutations_but_keeps_reads() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    db.put("k", "v").await.unwrap();
    db.close().await.unwrap();

    assert!(matches!(db.put("k2", "v2").await, Err(Error::Closed)));
    assert_eq!(db.get("k").unwrap(), "v");
    assert_eq!(read_lines(&path).len(), 1);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    db.close().await.unwrap();
    db.close().await.unwrap();
}

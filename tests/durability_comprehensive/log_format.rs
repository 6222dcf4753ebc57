//! On-disk record format.

use crate::*;
use kvlog::{decode_record, Event, EventKind};

#[tokio::test]
async fn test_put_put_delete_scenario() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    db.put("a", "1").await.unwrap();
    db.put("b", "hello world").await.unwrap();
    db.delete("a").await.unwrap();
    db.close().await.unwrap();

    let lines = read_lines(&path);
    assert_eq!(
        lines,
        vec![
            "1\t2\ta\t1".to_string(),
            "2\t2\tb\thello%20world".to_string(),
            "3\t1\ta\t".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_fresh_log_starts_at_one() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    assert_eq!(db.replay_report().events_replayed, 0);
    assert_eq!(db.logger().last_sequence(), 0);

    db.put("k", "v").await.unwrap();
    db.flush().await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    let event = decode_record(&lines[0], 1, 0).unwrap();
    assert_eq!(event, Event::put("k", "v").with_sequence(1));
}

#[tokio::test]
async fn test_records_never_split_across_lines() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    for (key, value) in tricky_values() {
        db.put(key, value).await.unwrap();
    }
    db.close().await.unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), tricky_values().len());

    let mut last = 0;
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.split('\t').count(), 4, "line {}: {:?}", i + 1, line);
        let event = decode_record(line, (i + 1) as u64, last).unwrap();
        assert_eq!(event.kind, EventKind::Put);
        assert_eq!(event.value_str(), tricky_values()[i].1);
        last = event.sequence;
    }
}

#[tokio::test]
async fn test_delete_of_absent_key_is_logged() {
    let (_dir, path) = temp_log();
    let db = open(&path).await;

    db.delete("ghost").await.unwrap();
    db.close().await.unwrap();

    assert_eq!(read_lines(&path), vec!["1\t1\tghost\t".to_string()]);
}

//! Startup replay.

use crate::*;
use kvlog::Error;

#[tokio::test]
async fn test_tricky_values_survive_restart() {
    let (_dir, path) = temp_log();

    {
        let db = open(&path).await;
        for (key, value) in tricky_values() {
            db.put(key, value).await.unwrap();
        }
        db.close().await.unwrap();
    }

    let db = open(&path).await;
    for (key, value) in tricky_values() {
        assert_eq!(db.get(key).unwrap(), value, "value for {}", key);
    }
}

#[tokio::test]
async fn test_restart_reproduces_final_state() {
    let (_dir, path) = temp_log();

    {
        let db = open(&path).await;
        db.put("a", "1").await.unwrap();
        db.put("b", "2").await.unwrap();
        db.put("a", "3").await.unwrap();
        db.delete("b").await.unwrap();
        db.put("c", "4").await.unwrap();
        db.close().await.unwrap();
    }

    let db = open(&path).await;
    let report = db.replay_report();
    assert_eq!(report.events_replayed, 5);
    assert_eq!(report.puts, 4);
    assert_eq!(report.deletes, 1);
    assert_eq!(report.last_sequence, 5);

    assert_eq!(db.store().keys(), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(db.get("a").unwrap(), "3");
    assert!(db.get("b").unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_sequences_continue_after_reopen() {
    let (_dir, path) = temp_log();

    {
        let db = open(&path).await;
        db.put("a", "1").await.unwrap();
        db.put("b", "2").await.unwrap();
        db.close().await.unwrap();
    }

    let db = open(&path).await;
    db.put("c", "3").await.unwrap();
    db.close().await.unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("3\t2\tc\t"));
}

#[tokio::test]
async fn test_several_restarts() {
    let (_dir, path) = temp_log();

    for round in 1..=5u64 {
        let db = open(&path).await;
        assert_eq!(db.replay_report().events_replayed, round - 1);
        db.put("counter", &round.to_string()).await.unwrap();
        db.close().await.unwrap();
    }

    let db = open(&path).await;
    assert_eq!(db.get("counter").unwrap(), "5");
    assert_eq!(db.logger().last_sequence(), 5);
}

#[tokio::test]
async fn test_out_of_order_log_refuses_to_start() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t1\n3\t2\tb\t2\n2\t2\tc\t3\n").unwrap();

    let err = KvLog::open(&path).await.unwrap_err();
    assert!(matches!(err, Error::LogCorruption { last: 3, found: 2 }));

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "1\t2\ta\t1\n3\t2\tb\t2\n2\t2\tc\t3\n");
}

#[tokio::test]
async fn test_duplicate_sequence_refuses_to_start() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t1\n1\t2\tb\t2\n").unwrap();

    let err = KvLog::open(&path).await.unwrap_err();
    assert!(matches!(err, Error::LogCorruption { last: 1, found: 1 }));
}

#[tokio::test]
async fn test_gap_in_sequences_is_accepted() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t1\n5\t2\tb\t2\n").unwrap();

    let db = open(&path).await;
    assert_eq!(db.get("b").unwrap(), "2");

    db.put("c", "3").await.unwrap();
    db.close().await.unwrap();
    assert!(read_lines(&path)[2].starts_with("6\t"));
}

#[tokio::test]
async fn test_malformed_record_refuses_to_start() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t1\nnot a record\n").unwrap();

    let err = KvLog::open(&path).await.unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
}

#[tokio::test]
async fn test_fused_records_refuse_to_start() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "6\t2\ta\t1\n7\t2\tke8\t2\tk\tv\n").unwrap();

    let err = KvLog::open(&path).await.unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
}

#[tokio::test]
async fn test_bad_escape_refuses_to_start() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t%zz\n").unwrap();

    let err = KvLog::open(&path).await.unwrap_err();
    assert!(matches!(err, Error::ValueDecodingFailure { sequence: 1, .. }));
}

#[tokio::test]
async fn test_blank_lines_are_skipped() {
    let (_dir, path) = temp_log();
    std::fs::write(&path, "1\t2\ta\t1\n\n2\t2\tb\t2\n").unwrap();

    let db = open(&path).await;
    assert_eq!(db.replay_report().events_replayed, 2);
    assert_eq!(db.get("b").unwrap(), "2");
}

#[tokio::test]
async fn test_log_in_missing_directory_is_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("t.log");

    let db = open(&path).await;
    db.put("k", "v").await.unwrap();
    db.close().await.unwrap();

    assert!(path.exists());
}

#[tokio::test]
async fn test_put_overwrite_delete_leaves_no_key() {
    let (_dir, path) = temp_log();

    {
        let db = open(&path).await;
        db.put("a", "1").await.unwrap();
        db.put("a", "2").await.unwrap();
        db.delete("a").await.unwrap();
        db.flush().await;
        db.close().await.unwrap();
    }

    let lines = read_lines(&path);
    let sequences: Vec<&str> = lines.iter().map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(sequences, vec!["1", "2", "3"]);

    let db = open(&path).await;
    assert!(db.get("a").unwrap_err().is_not_found());
    assert!(db.store().is_empty());
}

mod properties {
    use crate::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_restart_matches_model(
            ops in prop::collection::vec((any::<bool>(), "[a-d]", any::<String>()), 1..40)
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let (_dir, path) = temp_log();
                let mut model: HashMap<String, String> = HashMap::new();

                {
                    let db = open(&path).await;
                    for (is_put, key, value) in &ops {
                        if *is_put {
                            db.put(key, value).await.unwrap();
                            model.insert(key.clone(), value.clone());
                        } else {
                            db.delete(key).await.unwrap();
                            model.remove(key);
                        }
                    }
                    db.close().await.unwrap();
                }

                let db = open(&path).await;
                assert_eq!(db.replay_report().events_replayed, ops.len() as u64);
                assert_eq!(db.store().len(), model.len());
                for key in ["a", "b", "c", "d"] {
                    match model.get(key) {
                        Some(value) => assert_eq!(&db.get(key).unwrap(), value),
                        None => assert!(db.get(key).unwrap_err().is_not_found()),
                    }
                }
            });
        }
    }
}

use regui::connection::ConnectionManager;
use regui::errors::ReguiError;
use regui::key_browser::{delete_key, describe_key, get_value, list_keys, set_value};
use regui::metrics::{fetch_info, MetricsSampler};
use regui::types::KeyType;
use regui::value::KeyValue;
use std::time::{Duration, Instant};

fn connect() -> ConnectionManager {
    let host = std::env::var("REGUI_TEST_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("REGUI_TEST_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(6379);

    let manager = ConnectionManager::new(Duration::from_secs(2), Duration::from_secs(5));
    manager.connect(&host, port).unwrap();
    manager
}

/// Prefijo único por prueba para no pisar claves de otras ejecuciones.
fn prefix(test: &str) -> String {
    format!("regui-test:{}:{}", test, std::process::id())
}

fn cleanup(manager: &ConnectionManager, prefix: &str) {
    manager
        .with_connection(|conn| {
            for entry in list_keys(conn, &format!("{}*", prefix))? {
                delete_key(conn, &entry.name)?;
            }
            Ok(())
        })
        .unwrap();
}

// ---------------------------------------------------------------------------
// Connection and metrics
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires a running Redis server"]
fn live_connect_and_read_metrics() {
    let manager = connect();
    assert!(manager.is_connected());

    let info = manager.with_connection(|conn| fetch_info(conn)).unwrap();
    let snapshot = MetricsSampler::new().sample(&info, Instant::now());

    assert_ne!(snapshot.version, "-");
    assert!(snapshot.clients >= 1);
    assert!(snapshot.used_memory > 0);

    manager.disconnect();
    assert!(matches!(
        manager.with_connection(|conn| fetch_info(conn)),
        Err(ReguiError::NotConnected)
    ));
}

// ---------------------------------------------------------------------------
// Reads and writes
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires a running Redis server"]
fn live_write_then_read_every_type() {
    let manager = connect();
    let prefix = prefix("types");

    let values = vec![
        KeyValue::String("hola mundo".to_string()),
        KeyValue::List(vec!["b".to_string(), "a".to_string(), "b".to_string()]),
        KeyValue::Set(vec!["x".to_string(), "y".to_string()]),
        KeyValue::ZSet(vec![("low".to_string(), 1.0), ("high".to_string(), 2.5)]),
        KeyValue::Hash(vec![
            ("age".to_string(), "30".to_string()),
            ("name".to_string(), "ana".to_string()),
        ]),
    ];

    manager
        .with_connection(|conn| {
            for value in &values {
                let key = format!("{}:{}", prefix, value.key_type());
                set_value(conn, &key, value, None)?;
                assert_eq!(&get_value(conn, &key)?, value);
            }
            Ok(())
        })
        .unwrap();

    cleanup(&manager, &prefix);
}

#[test]
#[ignore = "requires a running Redis server"]
fn live_write_replaces_previous_collection() {
    let manager = connect();
    let prefix = prefix("replace");
    let key = format!("{}:list", prefix);

    let stored = manager
        .with_connection(|conn| {
            set_value(conn, &key, &KeyValue::List(vec!["old".to_string(); 3]), None)?;
            set_value(conn, &key, &KeyValue::List(vec!["new".to_string()]), None)?;
            get_value(conn, &key)
        })
        .unwrap();

    assert_eq!(stored, KeyValue::List(vec!["new".to_string()]));
    cleanup(&manager, &prefix);
}

#[test]
#[ignore = "requires a running Redis server"]
fn live_ttl_is_applied() {
    let manager = connect();
    let prefix = prefix("ttl");
    let key = format!("{}:session", prefix);

    let entry = manager
        .with_connection(|conn| {
            set_value(
                conn,
                &key,
                &KeyValue::String("token".to_string()),
                Some(Duration::from_secs(120)),
            )?;
            describe_key(conn, &key)
        })
        .unwrap()
        .unwrap();

    assert_eq!(entry.key_type, KeyType::String);
    assert_eq!(entry.size, 5);
    assert!(entry.ttl.is_some_and(|ttl| ttl <= Duration::from_secs(120)));
    cleanup(&manager, &prefix);
}

#[test]
#[ignore = "requires a running Redis server"]
fn live_missing_key_is_reported() {
    let manager = connect();
    let key = format!("{}:nothing", prefix("missing"));

    let result = manager.with_connection(|conn| get_value(conn, &key));
    assert!(matches!(result, Err(ReguiError::KeyNotFound(name)) if name == key));
    assert!(manager.is_connected());
}

// ---------------------------------------------------------------------------
// Listing and deleting
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires a running Redis server"]
fn live_list_filters_and_delete() {
    let manager = connect();
    let prefix = prefix("list");

    manager
        .with_connection(|conn| {
            for name in ["user:1", "user:2", "order:1"] {
                let key = format!("{}:{}", prefix, name);
                set_value(conn, &key, &KeyValue::String(name.to_string()), None)?;
            }

            let users = list_keys(conn, &format!("{}:USER", prefix))?;
            assert_eq!(users.len(), 2);
            assert!(users.windows(2).all(|pair| pair[0].name < pair[1].name));

            let orders = list_keys(conn, &format!("{}:order:*", prefix))?;
            assert_eq!(orders.len(), 1);

            let deleted = format!("{}:user:1", prefix);
            assert!(delete_key(conn, &deleted)?);
            assert!(!delete_key(conn, &deleted)?);

            let remaining = list_keys(conn, &prefix)?;
            assert!(remaining.iter().all(|entry| entry.name != deleted));
            assert_eq!(remaining.len(), 2);
            Ok(())
        })
        .unwrap();

    cleanup(&manager, &prefix);
}

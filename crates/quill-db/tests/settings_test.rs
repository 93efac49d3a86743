use quill_core::{
    AutoSaveInterval, ErrorCode, OrderBy, Settings, SettingsRepository, SortOrder,
};
use quill_db::Database;

/// Reading before any save yields defaults without creating a row.
#[tokio::test]
async fn test_get_returns_defaults_when_never_saved() {
    let db = Database::connect_memory().await.expect("connect");

    assert!(!db.settings.exists().await.expect("exists"));

    let settings = db.settings.get().await.expect("get");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.order_by, OrderBy::Created);
    assert_eq!(settings.order, SortOrder::Desc);
    assert_eq!(settings.auto_save_interval.millis(), 5000);

    assert!(!db.settings.exists().await.expect("exists"));
}

/// Save is an upsert: first save inserts, later saves overwrite wholesale.
#[tokio::test]
async fn test_save_upserts_singleton_row() {
    let db = Database::connect_memory().await.expect("connect");

    let first = Settings {
        order_by: OrderBy::Updated,
        order: SortOrder::Asc,
        auto_save_interval: AutoSaveInterval::new(2000).expect("interval"),
    };
    db.settings.save(&first).await.expect("save");
    assert!(db.settings.exists().await.expect("exists"));
    assert_eq!(db.settings.get().await.expect("get"), first);

    let second = Settings {
        order_by: OrderBy::Created,
        order: SortOrder::Desc,
        auto_save_interval: AutoSaveInterval::new(10_000).expect("interval"),
    };
    db.settings.save(&second).await.expect("overwrite");
    assert_eq!(db.settings.get().await.expect("get"), second);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(db.pool())
        .await
        .expect("count");
    assert_eq!(rows, 1);
}

/// A stored interval outside u32 range must fail closed as a corrupt
/// row, never wrap into a valid-looking value.
#[tokio::test]
async fn test_out_of_range_interval_fails_closed() {
    let db = Database::connect_memory().await.expect("connect");

    sqlx::query(
        "INSERT INTO settings (id, order_by, sort_order, auto_save_interval_ms)
         VALUES (1, 'created', 'desc', ?)",
    )
    .bind((u32::MAX as i64) + 1001)
    .execute(db.pool())
    .await
    .expect("seed oversized interval");

    let err = db.settings.get().await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::CorruptRow));

    sqlx::query("UPDATE settings SET auto_save_interval_ms = -5")
        .execute(db.pool())
        .await
        .expect("seed negative interval");

    let err = db.settings.get().await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::CorruptRow));
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let db = Database::connect_memory().await.expect("connect");

    let custom = Settings {
        order_by: OrderBy::Updated,
        order: SortOrder::Asc,
        auto_save_interval: AutoSaveInterval::new(3000).expect("interval"),
    };
    db.settings.save(&custom).await.expect("save");

    db.settings.reset().await.expect("reset");
    assert!(!db.settings.exists().await.expect("exists"));
    assert_eq!(db.settings.get().await.expect("get"), Settings::default());
}

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

/// Открыть подключение к SQLite (файл и директория создаются при отсутствии)
pub async fn connect(db_file: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;
    Ok(conn)
}

/// Схема хранилища: таблицы, индексы, триггеры неизменяемости аудита.
/// Все выражения идемпотентны (IF NOT EXISTS) — повторный запуск безопасен.
const SCHEMA_SQL: &[&str] = &[
    // a001_store
    r#"
        CREATE TABLE IF NOT EXISTS a001_store (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            address TEXT,
            contact TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    // a002_product: идентичность товара — пара (store_id, upc)
    r#"
        CREATE TABLE IF NOT EXISTS a002_product (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            store_id TEXT NOT NULL,
            upc TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            cost REAL NOT NULL DEFAULT 0,
            supplier_id TEXT,
            supplier_name TEXT,
            inventory INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a002_store_upc ON a002_product (store_id, upc);",
    // a003_sale_transaction: code хранит номер чека, строки — JSON-снимок
    r#"
        CREATE TABLE IF NOT EXISTS a003_sale_transaction (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL,
            comment TEXT,
            store_id TEXT NOT NULL,
            lines_json TEXT NOT NULL,
            subtotal REAL NOT NULL DEFAULT 0,
            tax REAL NOT NULL DEFAULT 0,
            total REAL NOT NULL DEFAULT 0,
            payment_method TEXT NOT NULL,
            cash_given REAL,
            change_given REAL,
            idempotency_key TEXT,
            actor_id TEXT,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a003_number ON a003_sale_transaction (code);",
    r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_a003_idempotency
        ON a003_sale_transaction (store_id, idempotency_key)
        WHERE idempotency_key IS NOT NULL;
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a003_store_created ON a003_sale_transaction (store_id, created_at);",
    // a004_inventory_adjustment (append-only журнал корректировок)
    r#"
        CREATE TABLE IF NOT EXISTS a004_inventory_adjustment (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            store_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            upc TEXT NOT NULL,
            product_name TEXT NOT NULL,
            adjustment_type TEXT NOT NULL,
            quantity_before INTEGER NOT NULL,
            quantity_after INTEGER NOT NULL,
            quantity_changed INTEGER NOT NULL,
            reason TEXT NOT NULL,
            actor_id TEXT,
            actor_name TEXT,
            related_transaction TEXT,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a004_store_created ON a004_inventory_adjustment (store_id, created_at);",
    "CREATE INDEX IF NOT EXISTS idx_a004_store_upc_created ON a004_inventory_adjustment (store_id, upc, created_at);",
    // p900_price_history
    r#"
        CREATE TABLE IF NOT EXISTS p900_price_history (
            id TEXT PRIMARY KEY NOT NULL,
            store_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            upc TEXT NOT NULL,
            product_name TEXT NOT NULL,
            old_price REAL NOT NULL DEFAULT 0,
            new_price REAL NOT NULL DEFAULT 0,
            old_cost REAL NOT NULL DEFAULT 0,
            new_cost REAL NOT NULL DEFAULT 0,
            price_change_percent REAL,
            actor_id TEXT,
            change_reason TEXT NOT NULL DEFAULT '',
            created_at TEXT
        );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p900_store_created ON p900_price_history (store_id, created_at);",
    "CREATE INDEX IF NOT EXISTS idx_p900_store_upc_created ON p900_price_history (store_id, upc, created_at);",
    // p901_audit_log
    r#"
        CREATE TABLE IF NOT EXISTS p901_audit_log (
            id TEXT PRIMARY KEY NOT NULL,
            store_id TEXT NOT NULL,
            actor_id TEXT,
            actor_name TEXT,
            action TEXT NOT NULL,
            category TEXT NOT NULL,
            entity_type TEXT,
            entity_id TEXT,
            changes_json TEXT NOT NULL DEFAULT '[]',
            upc TEXT,
            product_name TEXT,
            transaction_number TEXT,
            reason TEXT,
            extra_json TEXT,
            severity TEXT NOT NULL DEFAULT 'INFO',
            success INTEGER NOT NULL DEFAULT 1,
            error_message TEXT,
            created_at TEXT
        );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p901_store_created ON p901_audit_log (store_id, created_at);",
    "CREATE INDEX IF NOT EXISTS idx_p901_category_created ON p901_audit_log (category, created_at);",
    "CREATE INDEX IF NOT EXISTS idx_p901_upc ON p901_audit_log (upc);",
    "CREATE INDEX IF NOT EXISTS idx_p901_transaction ON p901_audit_log (transaction_number);",
    // Журнал аудита неизменяем: UPDATE/DELETE отклоняются на уровне хранилища
    r#"
        CREATE TRIGGER IF NOT EXISTS trg_p901_no_update
        BEFORE UPDATE ON p901_audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit log is append-only');
        END;
    "#,
    r#"
        CREATE TRIGGER IF NOT EXISTS trg_p901_no_delete
        BEFORE DELETE ON p901_audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit log is append-only');
        END;
    "#,
];

/// Создать таблицы, индексы и триггеры (minimal schema bootstrap)
pub async fn init_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for sql in SCHEMA_SQL {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    tracing::info!("Database schema initialized");
    Ok(())
}

/// Подключение к БД в памяти со свежей схемой (для тестов)
#[cfg(test)]
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    // Ровно одно соединение: каждое новое соединение с :memory:
    // открывало бы отдельную пустую базу
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let conn = Database::connect(options).await?;
    init_schema(&conn).await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let conn = connect_in_memory().await.unwrap();
        // Повторная инициализация не должна падать
        init_schema(&conn).await.unwrap();

        let tables = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'a0%' OR name LIKE 'p9%';"
                    .to_string(),
            ))
            .await
            .unwrap();
        assert!(tables.len() >= 6);
    }
}

use crate::storage::entity::{survey_response, survey_row};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::path::Path;
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let in_memory = db_url.contains(":memory:");
    let mut opt = ConnectOptions::new(db_url.to_owned());
    if in_memory {
        // 内存库每个连接各自独立，只能用单连接
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(4)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(60));
    }
    opt.sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    let db = Database::connect(opt).await?;

    if !in_memory {
        // 启用 WAL 模式
        let _ = db
            .execute(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                "PRAGMA journal_mode=WAL;".to_string(),
            ))
            .await?;
    }

    // 创建表（如果不存在）
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(
        schema
            .create_table_from_entity(survey_response::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    // timestamp 二级索引
    db.execute(sea_orm::Statement::from_string(
        sea_orm::DatabaseBackend::Sqlite,
        "CREATE INDEX IF NOT EXISTS idx_survey_responses_timestamp ON survey_responses(timestamp);"
            .to_string(),
    ))
    .await?;

    info!("Record store ready at {} (survey_responses)", db_url);

    Ok(db)
}

/// 打开（新建）导出用的单文件数据库，只包含 surveys 表
pub async fn open_export_database(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(
        schema
            .create_table_from_entity(survey_row::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;
    Ok(db)
}

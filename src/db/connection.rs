use crate::config::{initialize_application, log_initialization_complete};
use crate::db::migrations::run_migrations;
use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// 指定されたパスのデータベースを開き、マイグレーションを実行する
///
/// # 引数
/// * `database_path` - データベースファイルのパス（存在しない場合は自動作成される）
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
pub fn open_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// データベース接続を初期化し、マイグレーションを実行する
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーション全体の初期化を実行
/// 2. データベース接続を開き、マイグレーションを実行
/// 3. 初期化完了ログを出力
pub fn initialize_database() -> AppResult<Connection> {
    // アプリケーション全体の初期化を実行
    let init_result = initialize_application()?;

    // データベース接続を開く
    let conn = open_database(&init_result.database_path)?;

    // 初期化完了ログを出力
    log_initialization_complete(&init_result);

    Ok(conn)
}

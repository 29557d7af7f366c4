pub mod config;
pub mod db;
pub mod features;
pub mod shared;

use log::{error, info};
use rusqlite::Connection;
use std::sync::Mutex;

pub use features::insights::models::{DashboardSummary, InsightPolicy};
pub use features::subscriptions::models::Subscription;
pub use shared::errors::{AppError, AppResult};

/// アプリケーション状態（データベース接続を保持）
///
/// 呼び出し側レイヤー（HTTPハンドラ等）から共有される。集計ロジック
/// 自体は純粋関数なのでロックは接続の共有のためだけに必要になる。
pub struct AppState {
    pub db: Mutex<Connection>,
}

impl AppState {
    /// データベースを初期化してアプリケーション状態を作成する
    ///
    /// # 戻り値
    /// アプリケーション状態、または失敗時はエラー
    pub fn initialize() -> AppResult<Self> {
        let conn = db::initialize_database().map_err(|e| {
            error!("データベースの初期化に失敗しました: {}", e.details());
            e
        })?;
        Ok(AppState {
            db: Mutex::new(conn),
        })
    }
}

/// ログシステムを初期化
///
/// 環境変数 LOG_LEVEL でレベルを制御する（既定はinfo）。
pub fn init_logging() {
    let log_level = config::get_log_level();

    // env_loggerを初期化
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    info!("ログシステムを初期化しました: level={log_level}");
}

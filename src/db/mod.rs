/// データベース接続関連のモジュール
pub mod connection;
/// マイグレーション関連のモジュール
pub mod migrations;

// 便利な再エクスポート
pub use connection::{initialize_database, open_database};
pub use migrations::run_migrations;

use rusqlite::{Connection, Result};

/// すべてのデータベースマイグレーションを実行する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // サブスクリプションテーブルを作成
    // cycleにはCHECK制約を付けない: 旧バージョンが書き込んだ未知の値も
    // 読み出せるようにし、集計側で警告として報告する
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            cost INTEGER NOT NULL CHECK(cost >= 0),
            cycle TEXT NOT NULL,
            start_date TEXT NOT NULL,
            is_trial INTEGER NOT NULL DEFAULT 0,
            trial_end_date TEXT,
            status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active', 'cancelled')),
            category TEXT NOT NULL DEFAULT 'other',
            url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // サブスクリプションテーブルのインデックスを作成
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_owner ON subscriptions(owner_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_owner_status ON subscriptions(owner_id, status)",
        [],
    )?;

    Ok(())
}

use super::models::{
    CreateSubscriptionDto, Subscription, UpdateSubscriptionDto, CATEGORY_OTHER, STATUS_ACTIVE,
};
use crate::shared::errors::AppError;
use chrono::Utc;
use chrono_tz::Asia::Tokyo;
use rusqlite::{params, Connection, Row};

/// SELECT句の共通カラムリスト
const SELECT_COLUMNS: &str = "id, owner_id, name, cost, cycle, start_date, is_trial, \
     trial_end_date, status, category, url, created_at, updated_at";

/// 行をSubscriptionにマッピングする
fn map_row(row: &Row) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        cost: row.get(3)?,
        cycle: row.get(4)?,
        start_date: row.get(5)?,
        is_trial: row.get::<_, i64>(6)? != 0,
        trial_end_date: row.get(7)?,
        status: row.get(8)?,
        category: row.get(9)?,
        url: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `dto` - サブスクリプション作成用DTO
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラー
pub fn create(
    conn: &Connection,
    dto: CreateSubscriptionDto,
    owner_id: &str,
) -> Result<Subscription, AppError> {
    // JSTで現在時刻を取得
    let now = Utc::now().with_timezone(&Tokyo).to_rfc3339();

    let status = dto.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    let category = dto.category.unwrap_or_else(|| CATEGORY_OTHER.to_string());
    // トライアルでない場合、終了日は保存しない
    let trial_end_date = if dto.is_trial { dto.trial_end_date } else { None };

    conn.execute(
        "INSERT INTO subscriptions (owner_id, name, cost, cycle, start_date, is_trial, trial_end_date, status, category, url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            owner_id,
            dto.name,
            dto.cost,
            dto.cycle,
            dto.start_date,
            dto.is_trial as i64,
            trial_end_date,
            status,
            category,
            dto.url,
            now,
            now
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id(conn, id, owner_id)
}

/// IDでサブスクリプションを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// サブスクリプション、または失敗時はエラー
pub fn find_by_id(conn: &Connection, id: i64, owner_id: &str) -> Result<Subscription, AppError> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM subscriptions WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::not_found(format!("ID {id} のサブスクリプション"))
        }
        _ => AppError::Database(e.to_string()),
    })
}

/// サブスクリプション一覧を取得する
///
/// 登録順（ID昇順）で返す。集計・トライアル警告はこの順序を
/// そのまま保持するため、一覧の順序が出力の順序を決める。
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
/// * `active_only` - 利用中のサブスクリプションのみを取得するか
///
/// # 戻り値
/// サブスクリプションのリスト、または失敗時はエラー
pub fn find_all(
    conn: &Connection,
    owner_id: &str,
    active_only: bool,
) -> Result<Vec<Subscription>, AppError> {
    let query = if active_only {
        format!(
            "SELECT {SELECT_COLUMNS} FROM subscriptions
             WHERE owner_id = ?1 AND status = 'active' ORDER BY id"
        )
    } else {
        format!("SELECT {SELECT_COLUMNS} FROM subscriptions WHERE owner_id = ?1 ORDER BY id")
    };

    let mut stmt = conn.prepare(&query)?;
    let subscriptions = stmt.query_map(params![owner_id], map_row)?;

    subscriptions
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// サブスクリプションを更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `dto` - サブスクリプション更新用DTO
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 更新されたサブスクリプション、または失敗時はエラー
pub fn update(
    conn: &Connection,
    id: i64,
    dto: UpdateSubscriptionDto,
    owner_id: &str,
) -> Result<Subscription, AppError> {
    // JSTで現在時刻を取得
    let now = Utc::now().with_timezone(&Tokyo).to_rfc3339();

    // 既存のサブスクリプションを取得
    let existing = find_by_id(conn, id, owner_id)?;

    // 更新するフィールドを決定
    let name = dto.name.unwrap_or(existing.name);
    let cost = dto.cost.unwrap_or(existing.cost);
    let cycle = dto.cycle.unwrap_or(existing.cycle);
    let start_date = dto.start_date.unwrap_or(existing.start_date);
    let is_trial = dto.is_trial.unwrap_or(existing.is_trial);
    // トライアル解除時は終了日もクリアする
    let trial_end_date = if is_trial {
        dto.trial_end_date.or(existing.trial_end_date)
    } else {
        None
    };
    let status = dto.status.unwrap_or(existing.status);
    let category = dto.category.unwrap_or(existing.category);
    // URLは未指定なら保持、空文字列の場合はNULLに設定
    let url = match dto.url {
        Some(u) if u.is_empty() => None,
        Some(u) => Some(u),
        None => existing.url,
    };

    conn.execute(
        "UPDATE subscriptions
         SET name = ?1, cost = ?2, cycle = ?3, start_date = ?4, is_trial = ?5,
             trial_end_date = ?6, status = ?7, category = ?8, url = ?9, updated_at = ?10
         WHERE id = ?11 AND owner_id = ?12",
        params![
            name,
            cost,
            cycle,
            start_date,
            is_trial as i64,
            trial_end_date,
            status,
            category,
            url,
            now,
            id,
            owner_id
        ],
    )?;

    find_by_id(conn, id, owner_id)
}

/// サブスクリプションの契約状態を設定する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `status` - 新しい契約状態（active / cancelled）
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 更新されたサブスクリプション、または失敗時はエラー
pub fn set_status(
    conn: &Connection,
    id: i64,
    status: &str,
    owner_id: &str,
) -> Result<Subscription, AppError> {
    // JSTで現在時刻を取得
    let now = Utc::now().with_timezone(&Tokyo).to_rfc3339();

    let rows_affected = conn.execute(
        "UPDATE subscriptions SET status = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
        params![status, now, id, owner_id],
    )?;

    if rows_affected == 0 {
        return Err(AppError::not_found(format!("ID {id} のサブスクリプション")));
    }

    find_by_id(conn, id, owner_id)
}

/// サブスクリプションを削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn delete(conn: &Connection, id: i64, owner_id: &str) -> Result<(), AppError> {
    let rows_affected = conn.execute(
        "DELETE FROM subscriptions WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;

    if rows_affected == 0 {
        return Err(AppError::not_found(format!("ID {id} のサブスクリプション")));
    }

    Ok(())
}

/// 所有ユーザーのサブスクリプション件数を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 件数、または失敗時はエラー
pub fn count_for_owner(conn: &Connection, owner_id: &str) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE owner_id = ?1",
        params![owner_id],
        |row| row.get(0),
    )
    .map_err(|e| AppError::Database(e.to_string()))
}

use super::models::{
    CreateSubscriptionDto, Subscription, UpdateSubscriptionDto, KNOWN_CATEGORIES, STATUS_ACTIVE,
    STATUS_CANCELLED,
};
use super::repository;
use crate::features::insights::cost::BillingCycle;
use crate::features::insights::models::{DashboardSummary, InsightPolicy};
use crate::features::insights::service::{dashboard_summary, today_utc};
use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use rusqlite::Connection;

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `dto` - サブスクリプション作成用DTO
/// * `owner_id` - 所有ユーザーID
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラー
pub fn create_subscription(
    conn: &Connection,
    dto: CreateSubscriptionDto,
    owner_id: &str,
) -> AppResult<Subscription> {
    validate_create_subscription_dto(&dto)?;
    repository::create(conn, dto, owner_id)
}

/// サブスクリプション一覧を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
/// * `active_only` - 利用中のサブスクリプションのみを取得するか
///
/// # 戻り値
/// サブスクリプションのリスト（登録順）、または失敗時はエラー
pub fn get_subscriptions(
    conn: &Connection,
    owner_id: &str,
    active_only: bool,
) -> AppResult<Vec<Subscription>> {
    repository::find_all(conn, owner_id, active_only)
}

/// IDでサブスクリプションを取得する
pub fn get_subscription(conn: &Connection, id: i64, owner_id: &str) -> AppResult<Subscription> {
    repository::find_by_id(conn, id, owner_id)
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
pub fn update_subscription(
    conn: &Connection,
    id: i64,
    dto: UpdateSubscriptionDto,
    owner_id: &str,
) -> AppResult<Subscription> {
    validate_update_subscription_dto(&dto)?;

    // 更新後の状態でもトライアル不変条件を守る:
    // is_trialがtrueになるなら終了日が（既存値か指定値で）存在すること
    let existing = repository::find_by_id(conn, id, owner_id)?;
    let is_trial = dto.is_trial.unwrap_or(existing.is_trial);
    let has_end_date = dto
        .trial_end_date
        .as_ref()
        .or(existing.trial_end_date.as_ref())
        .is_some();
    if is_trial && !has_end_date {
        return Err(AppError::validation(
            "トライアル中の場合はトライアル終了日を入力してください",
        ));
    }

    repository::update(conn, id, dto, owner_id)
}

/// サブスクリプションを解約する
pub fn cancel_subscription(conn: &Connection, id: i64, owner_id: &str) -> AppResult<Subscription> {
    repository::set_status(conn, id, STATUS_CANCELLED, owner_id)
}

/// 解約済みのサブスクリプションを再開する
pub fn reactivate_subscription(
    conn: &Connection,
    id: i64,
    owner_id: &str,
) -> AppResult<Subscription> {
    repository::set_status(conn, id, STATUS_ACTIVE, owner_id)
}

/// サブスクリプションを削除する
pub fn delete_subscription(conn: &Connection, id: i64, owner_id: &str) -> AppResult<()> {
    repository::delete(conn, id, owner_id)
}

/// ダッシュボード集計を取得する（基準日は今日）
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
/// * `policy` - 解約済みの扱いに関するポリシー
///
/// # 戻り値
/// ダッシュボード集計結果、または失敗時はエラー
pub fn get_dashboard(
    conn: &Connection,
    owner_id: &str,
    policy: &InsightPolicy,
) -> AppResult<DashboardSummary> {
    get_dashboard_at(conn, owner_id, today_utc(), policy)
}

/// 基準日を指定してダッシュボード集計を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
/// * `reference` - 基準日
/// * `policy` - 解約済みの扱いに関するポリシー
///
/// # 戻り値
/// ダッシュボード集計結果、または失敗時はエラー
pub fn get_dashboard_at(
    conn: &Connection,
    owner_id: &str,
    reference: NaiveDate,
    policy: &InsightPolicy,
) -> AppResult<DashboardSummary> {
    // 解約済みも取得する（集計側のポリシーで制御するため）
    let subscriptions = repository::find_all(conn, owner_id, false)?;
    Ok(dashboard_summary(&subscriptions, reference, policy))
}

/// データが空の場合にサンプルデータを投入する
///
/// # 引数
/// * `conn` - データベース接続
/// * `owner_id` - 所有ユーザーID
/// * `today` - 今日の日付（トライアル終了日の計算に使用）
///
/// # 戻り値
/// 投入した件数（既にデータがある場合は0）、または失敗時はエラー
pub fn seed_if_empty(conn: &Connection, owner_id: &str, today: NaiveDate) -> AppResult<usize> {
    if repository::count_for_owner(conn, owner_id)? > 0 {
        return Ok(0);
    }

    let today_str = today.format("%Y-%m-%d").to_string();
    let in_3_days = (today + Duration::days(3)).format("%Y-%m-%d").to_string();
    let in_14_days = (today + Duration::days(14)).format("%Y-%m-%d").to_string();

    let seeds = vec![
        CreateSubscriptionDto {
            name: "Netflix".to_string(),
            cost: 1549,
            cycle: "monthly".to_string(),
            start_date: "2023-01-15".to_string(),
            is_trial: false,
            trial_end_date: None,
            status: None,
            category: Some("entertainment".to_string()),
            url: None,
        },
        CreateSubscriptionDto {
            name: "Adobe Creative Cloud".to_string(),
            cost: 5499,
            cycle: "monthly".to_string(),
            start_date: today_str.clone(),
            is_trial: true,
            trial_end_date: Some(in_3_days),
            status: None,
            category: Some("productivity".to_string()),
            url: None,
        },
        CreateSubscriptionDto {
            name: "Spotify".to_string(),
            cost: 1099,
            cycle: "monthly".to_string(),
            start_date: "2022-06-01".to_string(),
            is_trial: false,
            trial_end_date: None,
            status: None,
            category: Some("entertainment".to_string()),
            url: None,
        },
        CreateSubscriptionDto {
            name: "Amazon Prime".to_string(),
            cost: 13900,
            cycle: "yearly".to_string(),
            start_date: today_str,
            is_trial: true,
            trial_end_date: Some(in_14_days),
            status: None,
            category: None,
            url: None,
        },
    ];

    let count = seeds.len();
    for dto in seeds {
        repository::create(conn, dto, owner_id)?;
    }

    info!("サンプルデータを{count}件投入しました: owner={owner_id}");
    Ok(count)
}

/// サブスクリプション作成DTOのバリデーション
///
/// # 引数
/// * `dto` - サブスクリプション作成用DTO
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_create_subscription_dto(dto: &CreateSubscriptionDto) -> AppResult<()> {
    validate_name(&dto.name)?;
    validate_cost(dto.cost)?;
    validate_cycle(&dto.cycle)?;
    validate_date_format("開始日", &dto.start_date)?;

    // バリデーション: トライアル中は終了日が必須
    if dto.is_trial {
        match dto.trial_end_date.as_deref() {
            Some(date) => validate_date_format("トライアル終了日", date)?,
            None => {
                return Err(AppError::validation(
                    "トライアル中の場合はトライアル終了日を入力してください",
                ))
            }
        }
    }

    if let Some(ref status) = dto.status {
        validate_status(status)?;
    }

    if let Some(ref category) = dto.category {
        validate_category(category)?;
    }

    Ok(())
}

/// サブスクリプション更新DTOのバリデーション
///
/// # 引数
/// * `dto` - サブスクリプション更新用DTO
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_update_subscription_dto(dto: &UpdateSubscriptionDto) -> AppResult<()> {
    if let Some(ref name) = dto.name {
        validate_name(name)?;
    }

    if let Some(cost) = dto.cost {
        validate_cost(cost)?;
    }

    if let Some(ref cycle) = dto.cycle {
        validate_cycle(cycle)?;
    }

    if let Some(ref start_date) = dto.start_date {
        validate_date_format("開始日", start_date)?;
    }

    if let Some(ref trial_end_date) = dto.trial_end_date {
        validate_date_format("トライアル終了日", trial_end_date)?;
    }

    if let Some(ref status) = dto.status {
        validate_status(status)?;
    }

    if let Some(ref category) = dto.category {
        validate_category(category)?;
    }

    Ok(())
}

/// サービス名のバリデーション
fn validate_name(name: &str) -> AppResult<()> {
    // バリデーション: サービス名は必須
    if name.trim().is_empty() {
        return Err(AppError::validation("サービス名を入力してください"));
    }

    // バリデーション: サービス名は100文字以内
    if name.chars().count() > 100 {
        return Err(AppError::validation(
            "サービス名は100文字以内で入力してください",
        ));
    }

    Ok(())
}

/// 金額のバリデーション（最小通貨単位の非負整数）
fn validate_cost(cost: i64) -> AppResult<()> {
    if cost < 0 {
        return Err(AppError::validation("金額は0以上である必要があります"));
    }

    // バリデーション: 金額は10桁以内
    if cost > 9_999_999_999 {
        return Err(AppError::validation("金額は10桁以内で入力してください"));
    }

    Ok(())
}

/// 請求サイクルのバリデーション
fn validate_cycle(cycle: &str) -> AppResult<()> {
    if BillingCycle::parse(cycle).is_none() {
        return Err(AppError::validation(format!(
            "支払いサイクルは weekly / monthly / quarterly / semiannual / yearly のいずれかである必要があります: {cycle}"
        )));
    }

    Ok(())
}

/// 契約状態のバリデーション
fn validate_status(status: &str) -> AppResult<()> {
    if status != STATUS_ACTIVE && status != STATUS_CANCELLED {
        return Err(AppError::validation(format!(
            "契約状態は'active'または'cancelled'である必要があります: {status}"
        )));
    }

    Ok(())
}

/// カテゴリのバリデーション
fn validate_category(category: &str) -> AppResult<()> {
    if !KNOWN_CATEGORIES.contains(&category) {
        return Err(AppError::validation(format!(
            "カテゴリは entertainment / productivity / utilities / other のいずれかである必要があります: {category}"
        )));
    }

    Ok(())
}

/// 日付形式のバリデーション（YYYY-MM-DD形式）
///
/// # 引数
/// * `label` - エラーメッセージに使うフィールド名
/// * `date` - 日付文字列
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_date_format(label: &str, date: &str) -> AppResult<()> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{label}はYYYY-MM-DD形式で入力してください")))?;

    // 基本的な範囲チェック
    if !(1900..=2100).contains(&parsed.year()) {
        return Err(AppError::validation(format!(
            "{label}は1900年から2100年の間で入力してください"
        )));
    }

    Ok(())
}

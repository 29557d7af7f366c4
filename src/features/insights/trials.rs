//! トライアル期限とカテゴリ重複の分析
//!
//! 基準日は必ず引数で受け取り、内部で時計を読まない（決定的で
//! テスト可能にするため）。日数差は暦日単位で計算する:
//! `NaiveDate`同士の差なので時刻・タイムゾーンによるズレは
//! 型の上で起こり得ない。呼び出し側はUTCの暦日を「今日」として
//! 渡す想定（`service::today_utc`）。

use super::models::{CategoryRedundancy, DataWarning, InsightPolicy, TrialAlert};
use crate::features::subscriptions::models::Subscription;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// トライアル警告の閾値（残り日数がこの値以下で「期限間近」）
pub const TRIAL_ENDING_SOON_DAYS: i64 = 3;

/// トライアルの分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// トライアルではない（または終了日不明）
    NotApplicable,
    /// 終了日を過ぎている
    Expired,
    /// 期限間近（残り0〜3日）
    EndingSoon,
    /// まだ余裕がある（残り4日以上）
    Active,
}

/// 2つの日付の暦日差を計算する
///
/// # 引数
/// * `target` - 対象日
/// * `reference` - 基準日
///
/// # 戻り値
/// 暦日単位の日数差（targetが過去ならマイナス、同日なら0）
pub fn days_until(target: NaiveDate, reference: NaiveDate) -> i64 {
    (target - reference).num_days()
}

/// トライアル終了までの残り日数を計算する
///
/// # 引数
/// * `sub` - サブスクリプション
/// * `reference` - 基準日（通常は今日）
///
/// # 戻り値
/// 残り日数（対象外の場合はNone）と、データ品質警告。
/// トライアル中なのに終了日が無い・解釈できない場合は
/// Noneと警告を返す（分析全体は継続する）。
pub fn trial_days_left(
    sub: &Subscription,
    reference: NaiveDate,
) -> (Option<i64>, Option<DataWarning>) {
    if !sub.is_trial {
        return (None, None);
    }

    let end_date = sub
        .trial_end_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    match end_date {
        Some(end) => (Some(days_until(end, reference)), None),
        None => (
            None,
            Some(DataWarning::MissingTrialEndDate {
                id: sub.id,
                name: sub.name.clone(),
            }),
        ),
    }
}

/// 残り日数からトライアルの状態を分類する
///
/// # 引数
/// * `days_left` - 残り日数（対象外の場合はNone）
///
/// # 戻り値
/// トライアルの分類結果
pub fn classify_trial(days_left: Option<i64>) -> TrialStatus {
    match days_left {
        None => TrialStatus::NotApplicable,
        Some(d) if d < 0 => TrialStatus::Expired,
        Some(d) if d <= TRIAL_ENDING_SOON_DAYS => TrialStatus::EndingSoon,
        Some(_) => TrialStatus::Active,
    }
}

/// 期限間近のトライアルを抽出する
///
/// 入力の順序をそのまま保持する（ソートしない）。
///
/// # 引数
/// * `subscriptions` - サブスクリプションのリスト
/// * `reference` - 基準日
/// * `policy` - 解約済みを対象に含めるかのポリシー
///
/// # 戻り値
/// 期限間近のトライアル警告のリストとデータ品質警告
pub fn expiring_trials(
    subscriptions: &[Subscription],
    reference: NaiveDate,
    policy: &InsightPolicy,
) -> (Vec<TrialAlert>, Vec<DataWarning>) {
    let mut alerts = Vec::new();
    let mut warnings = Vec::new();

    for sub in subscriptions {
        if !policy.include_cancelled_in_trial_alerts && !sub.is_active() {
            continue;
        }

        let (days_left, warning) = trial_days_left(sub, reference);
        if let Some(w) = warning {
            warnings.push(w);
        }

        if classify_trial(days_left) == TrialStatus::EndingSoon {
            alerts.push(TrialAlert {
                id: sub.id,
                name: sub.name.clone(),
                // EndingSoonはSome(0..=3)のときのみ
                days_left: days_left.unwrap_or_default(),
            });
        }
    }

    (alerts, warnings)
}

/// カテゴリごとの重複を検出する
///
/// 2件以上のサブスクリプションを持つカテゴリのみを返す。
/// カテゴリも名前も初出順（登録順）を保持する。
///
/// # 引数
/// * `subscriptions` - サブスクリプションのリスト
/// * `policy` - 解約済みを対象に含めるかのポリシー
///
/// # 戻り値
/// カテゴリ重複のリスト
pub fn categorical_redundancy(
    subscriptions: &[Subscription],
    policy: &InsightPolicy,
) -> Vec<CategoryRedundancy> {
    // カテゴリの初出順を保つためHashMapではなくVecで集計する
    let mut groups: Vec<CategoryRedundancy> = Vec::new();

    for sub in subscriptions {
        if !policy.include_cancelled_in_redundancy && !sub.is_active() {
            continue;
        }

        match groups.iter_mut().find(|g| g.category == sub.category) {
            Some(group) => group.names.push(sub.name.clone()),
            None => groups.push(CategoryRedundancy {
                category: sub.category.clone(),
                names: vec![sub.name.clone()],
            }),
        }
    }

    groups.retain(|g| g.names.len() >= 2);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quickcheck_macros::quickcheck;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_trial(id: i64, name: &str, trial_end: Option<&str>, status: &str) -> Subscription {
        Subscription {
            id,
            owner_id: "user-1".to_string(),
            name: name.to_string(),
            cost: 1000,
            cycle: "monthly".to_string(),
            start_date: "2026-01-01".to_string(),
            is_trial: trial_end.is_some(),
            trial_end_date: trial_end.map(|s| s.to_string()),
            status: status.to_string(),
            category: "other".to_string(),
            url: None,
            created_at: "2026-01-01T00:00:00+09:00".to_string(),
            updated_at: "2026-01-01T00:00:00+09:00".to_string(),
        }
    }

    fn sample_category(id: i64, name: &str, category: &str, status: &str) -> Subscription {
        Subscription {
            id,
            owner_id: "user-1".to_string(),
            name: name.to_string(),
            cost: 1000,
            cycle: "monthly".to_string(),
            start_date: "2026-01-01".to_string(),
            is_trial: false,
            trial_end_date: None,
            status: status.to_string(),
            category: category.to_string(),
            url: None,
            created_at: "2026-01-01T00:00:00+09:00".to_string(),
            updated_at: "2026-01-01T00:00:00+09:00".to_string(),
        }
    }

    #[test]
    fn test_days_until_same_day_is_zero() {
        // 同じ暦日なら0日（端数や時差によるズレなし）
        let d = date("2026-08-25");
        assert_eq!(days_until(d, d), 0);
    }

    #[test]
    fn test_days_until_past_and_future() {
        let today = date("2026-08-25");
        assert_eq!(days_until(date("2026-08-28"), today), 3);
        assert_eq!(days_until(date("2026-08-24"), today), -1);
        // 月をまたぐケース
        assert_eq!(days_until(date("2026-09-01"), today), 7);
    }

    #[test]
    fn test_classify_trial_boundaries() {
        // 閾値3日の境界を確認
        assert_eq!(classify_trial(None), TrialStatus::NotApplicable);
        assert_eq!(classify_trial(Some(-1)), TrialStatus::Expired);
        assert_eq!(classify_trial(Some(0)), TrialStatus::EndingSoon);
        assert_eq!(classify_trial(Some(3)), TrialStatus::EndingSoon);
        assert_eq!(classify_trial(Some(4)), TrialStatus::Active);
    }

    #[test]
    fn test_trial_days_left_not_applicable() {
        let today = date("2026-08-25");

        // トライアルでない場合はNone（警告なし）
        let sub = sample_trial(1, "Netflix", None, "active");
        let (days, warning) = trial_days_left(&sub, today);
        assert_eq!(days, None);
        assert!(warning.is_none());
    }

    #[test]
    fn test_trial_days_left_missing_end_date_is_warned() {
        let today = date("2026-08-25");

        // トライアル中なのに終了日が無い場合は警告付きでNone
        let mut sub = sample_trial(1, "NoDate", None, "active");
        sub.is_trial = true;
        let (days, warning) = trial_days_left(&sub, today);
        assert_eq!(days, None);
        assert!(matches!(
            warning,
            Some(DataWarning::MissingTrialEndDate { .. })
        ));
    }

    #[test]
    fn test_trial_days_left_unparseable_date_is_treated_as_missing() {
        let today = date("2026-08-25");

        let sub = sample_trial(1, "Adobe", Some("not-a-date"), "active");
        let (days, warning) = trial_days_left(&sub, today);
        assert_eq!(days, None);
        assert!(warning.is_some());
    }

    #[test]
    fn test_expiring_trials_scenario_ending_soon() {
        // 終了日が3日後 → 残り3日、期限間近として警告に含まれる
        let today = date("2026-08-25");
        let subs = vec![sample_trial(1, "Adobe", Some("2026-08-28"), "active")];

        let (alerts, warnings) = expiring_trials(&subs, today, &InsightPolicy::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "Adobe");
        assert_eq!(alerts[0].days_left, 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_expiring_trials_scenario_expired() {
        // 終了日が昨日 → 期限切れ、警告には含まれない
        let today = date("2026-08-25");
        let subs = vec![sample_trial(1, "Adobe", Some("2026-08-24"), "active")];

        let (days, _) = trial_days_left(&subs[0], today);
        assert_eq!(days, Some(-1));
        assert_eq!(classify_trial(days), TrialStatus::Expired);

        let (alerts, _) = expiring_trials(&subs, today, &InsightPolicy::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_expiring_trials_preserves_input_order() {
        let today = date("2026-08-25");
        let subs = vec![
            sample_trial(1, "Zulu", Some("2026-08-26"), "active"),
            sample_trial(2, "Netflix", None, "active"),
            sample_trial(3, "Alpha", Some("2026-08-25"), "active"),
            sample_trial(4, "Faraway", Some("2026-12-01"), "active"),
        ];

        let (alerts, _) = expiring_trials(&subs, today, &InsightPolicy::default());
        let names: Vec<&str> = alerts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Zulu", "Alpha"]);
    }

    #[test]
    fn test_expiring_trials_empty_when_no_trials() {
        let today = date("2026-08-25");
        let subs = vec![
            sample_trial(1, "Netflix", None, "active"),
            sample_trial(2, "Spotify", None, "active"),
        ];

        let (alerts, warnings) = expiring_trials(&subs, today, &InsightPolicy::default());
        assert!(alerts.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_expiring_trials_cancelled_policy() {
        let today = date("2026-08-25");
        let subs = vec![sample_trial(1, "Adobe", Some("2026-08-26"), "cancelled")];

        // 既定では解約済みも警告対象
        let (alerts, _) = expiring_trials(&subs, today, &InsightPolicy::default());
        assert_eq!(alerts.len(), 1);

        // ポリシーで除外できる
        let policy = InsightPolicy {
            include_cancelled_in_trial_alerts: false,
            ..Default::default()
        };
        let (alerts, _) = expiring_trials(&subs, today, &policy);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_categorical_redundancy_scenario() {
        // entertainment×2 + utilities×1 → entertainmentのみ返る
        let subs = vec![
            sample_category(1, "Netflix", "entertainment", "active"),
            sample_category(2, "Spotify", "entertainment", "active"),
            sample_category(3, "iCloud", "utilities", "active"),
        ];

        let groups = categorical_redundancy(&subs, &InsightPolicy::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "entertainment");
        assert_eq!(groups[0].names, vec!["Netflix", "Spotify"]);
    }

    #[test]
    fn test_categorical_redundancy_preserves_order() {
        let subs = vec![
            sample_category(1, "iCloud", "utilities", "active"),
            sample_category(2, "Netflix", "entertainment", "active"),
            sample_category(3, "Google One", "utilities", "active"),
            sample_category(4, "Spotify", "entertainment", "active"),
        ];

        let groups = categorical_redundancy(&subs, &InsightPolicy::default());

        // カテゴリは初出順、名前は登録順
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "utilities");
        assert_eq!(groups[0].names, vec!["iCloud", "Google One"]);
        assert_eq!(groups[1].category, "entertainment");
        assert_eq!(groups[1].names, vec!["Netflix", "Spotify"]);
    }

    #[test]
    fn test_categorical_redundancy_cancelled_policy() {
        let subs = vec![
            sample_category(1, "Netflix", "entertainment", "active"),
            sample_category(2, "Spotify", "entertainment", "cancelled"),
        ];

        // 既定では解約済みも対象
        let groups = categorical_redundancy(&subs, &InsightPolicy::default());
        assert_eq!(groups.len(), 1);

        // ポリシーで除外すると1件カテゴリになり返らない
        let policy = InsightPolicy {
            include_cancelled_in_redundancy: false,
            ..Default::default()
        };
        let groups = categorical_redundancy(&subs, &policy);
        assert!(groups.is_empty());
    }

    #[quickcheck]
    fn prop_days_until_same_date_is_zero(offset: u16) -> bool {
        // 任意の日付dについて days_until(d, d) == 0
        let d = date("2000-01-01") + Duration::days(offset as i64);
        days_until(d, d) == 0
    }

    #[quickcheck]
    fn prop_days_until_is_antisymmetric(a_offset: u16, b_offset: u16) -> bool {
        let base = date("2000-01-01");
        let a = base + Duration::days(a_offset as i64);
        let b = base + Duration::days(b_offset as i64);
        days_until(a, b) == -days_until(b, a)
    }
}

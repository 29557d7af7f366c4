use super::cost::aggregate_monthly;
use super::models::{DashboardSummary, InsightPolicy};
use super::trials::{categorical_redundancy, expiring_trials};
use crate::features::subscriptions::models::Subscription;
use chrono::{NaiveDate, Utc};

/// 今日の日付をUTCの暦日で取得する
///
/// 基準日の唯一の供給源。集計ロジック自体は時計を読まず、
/// この値（またはテスト用の任意の日付）を引数で受け取る。
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// ダッシュボード集計を実行する
///
/// 入力のスナップショットと基準日だけから決定的に計算される
/// （内部状態なし、I/Oなし）。不正な行があっても全体は失敗せず、
/// 警告として結果に含める。
///
/// # 引数
/// * `subscriptions` - 所有ユーザーでフィルタ済みのサブスクリプション一覧
/// * `reference` - 基準日（通常は`today_utc()`）
/// * `policy` - 解約済みの扱いに関するポリシー
///
/// # 戻り値
/// ダッシュボード集計結果
pub fn dashboard_summary(
    subscriptions: &[Subscription],
    reference: NaiveDate,
    policy: &InsightPolicy,
) -> DashboardSummary {
    // 月額合計（年額は常にここから導出する）
    let (monthly, mut warnings) = aggregate_monthly(subscriptions);

    // トライアル警告
    let (alerts, mut trial_warnings) = expiring_trials(subscriptions, reference, policy);
    warnings.append(&mut trial_warnings);

    // カテゴリ重複
    let redundancies = categorical_redundancy(subscriptions, policy);

    let active_count = subscriptions.iter().filter(|s| s.is_active()).count();

    DashboardSummary {
        monthly_total: monthly.to_minor_units(),
        yearly_total: monthly.yearly_minor_units(),
        monthly_total_twelfths: monthly.twelfths(),
        active_count,
        expiring_trials: alerts,
        redundancies,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::insights::models::DataWarning;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample(
        id: i64,
        name: &str,
        cost: i64,
        cycle: &str,
        category: &str,
        status: &str,
        trial_end: Option<&str>,
    ) -> Subscription {
        Subscription {
            id,
            owner_id: "user-1".to_string(),
            name: name.to_string(),
            cost,
            cycle: cycle.to_string(),
            start_date: "2026-01-01".to_string(),
            is_trial: trial_end.is_some(),
            trial_end_date: trial_end.map(|s| s.to_string()),
            status: status.to_string(),
            category: category.to_string(),
            url: None,
            created_at: "2026-01-01T00:00:00+09:00".to_string(),
            updated_at: "2026-01-01T00:00:00+09:00".to_string(),
        }
    }

    #[test]
    fn test_dashboard_summary_end_to_end() {
        let today = date("2026-08-25");
        let subs = vec![
            // 年額1200 → 月額100
            sample(1, "Prime", 1200, "yearly", "other", "active", None),
            // 月額1000、3日後にトライアル終了
            sample(
                2,
                "Adobe",
                1000,
                "monthly",
                "productivity",
                "active",
                Some("2026-08-28"),
            ),
            // entertainmentが2件
            sample(3, "Netflix", 1549, "monthly", "entertainment", "active", None),
            sample(4, "Spotify", 1099, "monthly", "entertainment", "active", None),
            // 解約済みは合計に入らない
            sample(5, "Hulu", 99999, "monthly", "entertainment", "cancelled", None),
        ];

        let summary = dashboard_summary(&subs, today, &InsightPolicy::default());

        // 月額 = 100 + 1000 + 1549 + 1099 = 3748
        assert_eq!(summary.monthly_total, 3748);
        // 年額 = 月額の正確値 × 12
        assert_eq!(summary.yearly_total, summary.monthly_total_twelfths);
        assert_eq!(summary.yearly_total, 3748 * 12);

        assert_eq!(summary.active_count, 4);

        // トライアル警告はAdobeのみ
        assert_eq!(summary.expiring_trials.len(), 1);
        assert_eq!(summary.expiring_trials[0].name, "Adobe");
        assert_eq!(summary.expiring_trials[0].days_left, 3);

        // カテゴリ重複は解約済み込みでentertainmentの3件
        assert_eq!(summary.redundancies.len(), 1);
        assert_eq!(summary.redundancies[0].category, "entertainment");
        assert_eq!(
            summary.redundancies[0].names,
            vec!["Netflix", "Spotify", "Hulu"]
        );

        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_dashboard_summary_collects_warnings() {
        let today = date("2026-08-25");
        let mut bad_trial = sample(1, "NoDate", 500, "monthly", "other", "active", None);
        bad_trial.is_trial = true;

        let subs = vec![
            bad_trial,
            sample(2, "Legacy", 300, "biweekly", "other", "active", None),
        ];

        let summary = dashboard_summary(&subs, today, &InsightPolicy::default());

        // 未知サイクルは月額扱いで合計には入る
        assert_eq!(summary.monthly_total, 800);

        // 警告は2件（未知サイクル + トライアル終了日なし）
        assert_eq!(summary.warnings.len(), 2);
        assert!(summary
            .warnings
            .iter()
            .any(|w| matches!(w, DataWarning::InvalidCycle { .. })));
        assert!(summary
            .warnings
            .iter()
            .any(|w| matches!(w, DataWarning::MissingTrialEndDate { .. })));
    }

    #[test]
    fn test_dashboard_summary_empty_input() {
        let summary = dashboard_summary(&[], date("2026-08-25"), &InsightPolicy::default());

        assert_eq!(summary.monthly_total, 0);
        assert_eq!(summary.yearly_total, 0);
        assert_eq!(summary.active_count, 0);
        assert!(summary.expiring_trials.is_empty());
        assert!(summary.redundancies.is_empty());
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_dashboard_summary_is_deterministic() {
        // 同じ入力と基準日に対して同じ結果（JSON表現で比較）
        let today = date("2026-08-25");
        let subs = vec![
            sample(1, "Prime", 1200, "yearly", "other", "active", None),
            sample(2, "Adobe", 1000, "monthly", "productivity", "active", Some("2026-08-28")),
        ];

        let a = dashboard_summary(&subs, today, &InsightPolicy::default());
        let b = dashboard_summary(&subs, today, &InsightPolicy::default());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

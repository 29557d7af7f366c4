use serde::{Deserialize, Serialize};

/// 集計・警告のポリシー設定
///
/// 解約済みのサブスクリプションをトライアル警告やカテゴリ重複の
/// 対象に含めるかどうかを制御する。費用集計は設定に関わらず
/// 常にactiveな行のみを対象とする。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightPolicy {
    /// 解約済みでもトライアル警告の対象に含めるか
    pub include_cancelled_in_trial_alerts: bool,
    /// 解約済みでもカテゴリ重複の対象に含めるか
    pub include_cancelled_in_redundancy: bool,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        // トライアルは解約後も請求が始まるまで警告する価値があるため、
        // 既定ではどちらも対象に含める
        Self {
            include_cancelled_in_trial_alerts: true,
            include_cancelled_in_redundancy: true,
        }
    }
}

/// データ品質に関する警告
///
/// 不正な行があっても集計全体は継続し、該当行の内容だけを
/// 警告として呼び出し側へ報告する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// 未知の請求サイクル（係数1=月額扱いにフォールバックした）
    InvalidCycle { id: i64, name: String, cycle: String },
    /// トライアル中なのに終了日が無い（または解釈できない）
    MissingTrialEndDate { id: i64, name: String },
    /// マイナス金額（0として集計した）
    NegativeCost { id: i64, name: String, cost: i64 },
}

/// トライアル期限警告の1件分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialAlert {
    pub id: i64,
    pub name: String,
    /// トライアル終了までの残り日数（0 = 当日）
    pub days_left: i64,
}

/// 同一カテゴリに複数のサブスクリプションがあることを示すシグナル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRedundancy {
    pub category: String,
    /// カテゴリ内のサブスクリプション名（登録順）
    pub names: Vec<String>,
}

/// ダッシュボード集計結果
///
/// 月額・年額はともに最小通貨単位。正確値（1/12単位）も併せて
/// 保持し、表示用の丸めは`monthly_total`の1箇所でのみ行う。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// 月額合計（最小通貨単位に四捨五入した表示用の値）
    pub monthly_total: i64,
    /// 年額合計（最小通貨単位、月額の正確値×12なので丸め誤差なし）
    pub yearly_total: i64,
    /// 月額合計の正確値（最小通貨単位の1/12を単位とする整数）
    pub monthly_total_twelfths: i64,
    /// 利用中のサブスクリプション件数
    pub active_count: usize,
    /// 期限間近のトライアル（登録順）
    pub expiring_trials: Vec<TrialAlert>,
    /// カテゴリ重複（2件以上のカテゴリのみ）
    pub redundancies: Vec<CategoryRedundancy>,
    /// データ品質の警告
    pub warnings: Vec<DataWarning>,
}

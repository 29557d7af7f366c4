//! 費用の月額換算
//!
//! 異なる請求サイクルの金額を共通の月額基準に換算する。すべての
//! 換算係数は分母が12の有理数（weekly = 52/12、quarterly = 4/12、
//! semiannual = 2/12、yearly = 1/12、monthly = 12/12）なので、
//! 「最小通貨単位の1/12」を単位とする整数で正確に計算できる。
//! 丸めは表示用の変換1箇所でのみ行い、途中で切り捨てない。

use super::models::DataWarning;
use crate::features::subscriptions::models::Subscription;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// 請求サイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Yearly,
}

impl BillingCycle {
    /// すべての請求サイクル
    pub const ALL: [BillingCycle; 5] = [
        BillingCycle::Weekly,
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Semiannual,
        BillingCycle::Yearly,
    ];

    /// 文字列から請求サイクルを解釈する
    ///
    /// # 引数
    /// * `value` - 保存されている請求サイクル文字列
    ///
    /// # 戻り値
    /// 対応する請求サイクル、未知の値の場合はNone
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(BillingCycle::Weekly),
            "monthly" => Some(BillingCycle::Monthly),
            "quarterly" => Some(BillingCycle::Quarterly),
            "semiannual" => Some(BillingCycle::Semiannual),
            "yearly" => Some(BillingCycle::Yearly),
            _ => None,
        }
    }

    /// 請求サイクルの文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Semiannual => "semiannual",
            BillingCycle::Yearly => "yearly",
        }
    }

    /// 月額換算の分子係数（分母は常に12）
    fn twelfths_multiplier(self) -> i64 {
        match self {
            BillingCycle::Weekly => 52,
            BillingCycle::Monthly => 12,
            BillingCycle::Quarterly => 4,
            BillingCycle::Semiannual => 2,
            BillingCycle::Yearly => 1,
        }
    }
}

/// 月額換算値（最小通貨単位の1/12を単位とする非負整数）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MonthlyTwelfths(i64);

impl MonthlyTwelfths {
    /// ゼロ値
    pub const ZERO: MonthlyTwelfths = MonthlyTwelfths(0);

    /// 金額と請求サイクルから月額換算値を計算する
    ///
    /// # 引数
    /// * `cost` - 金額（最小通貨単位、非負であること）
    /// * `cycle` - 請求サイクル
    pub fn from_cost(cost: i64, cycle: BillingCycle) -> Self {
        MonthlyTwelfths(cost * cycle.twelfths_multiplier())
    }

    /// 1/12単位の内部値を取得する
    pub fn twelfths(self) -> i64 {
        self.0
    }

    /// 最小通貨単位に四捨五入する（表示用、ここが唯一の丸め箇所）
    pub fn to_minor_units(self) -> i64 {
        (self.0 + 6) / 12
    }

    /// 年額を最小通貨単位で取得する
    ///
    /// 年額 = 月額 × 12 なので 1/12 単位の内部値そのもの。
    /// 丸め誤差なしで「年額 == 月額 × 12」が常に成り立つ。
    pub fn yearly_minor_units(self) -> i64 {
        self.0
    }
}

impl Add for MonthlyTwelfths {
    type Output = MonthlyTwelfths;

    fn add(self, rhs: MonthlyTwelfths) -> MonthlyTwelfths {
        MonthlyTwelfths(self.0 + rhs.0)
    }
}

impl AddAssign for MonthlyTwelfths {
    fn add_assign(&mut self, rhs: MonthlyTwelfths) {
        self.0 += rhs.0;
    }
}

impl Sum for MonthlyTwelfths {
    fn sum<I: Iterator<Item = MonthlyTwelfths>>(iter: I) -> Self {
        iter.fold(MonthlyTwelfths::ZERO, |acc, v| acc + v)
    }
}

/// 1件のサブスクリプションの月額換算値を計算する
///
/// 不正な行でも失敗せず、警告を添えて計算を継続する:
/// - マイナス金額は0として扱う
/// - 未知の請求サイクルは月額扱い（係数1）にフォールバックする
///
/// # 引数
/// * `sub` - サブスクリプション
///
/// # 戻り値
/// 月額換算値と、該当行に対するデータ品質警告
pub fn monthly_equivalent(sub: &Subscription) -> (MonthlyTwelfths, Vec<DataWarning>) {
    let mut warnings = Vec::new();

    let cost = if sub.cost < 0 {
        warnings.push(DataWarning::NegativeCost {
            id: sub.id,
            name: sub.name.clone(),
            cost: sub.cost,
        });
        0
    } else {
        sub.cost
    };

    let cycle = match BillingCycle::parse(&sub.cycle) {
        Some(cycle) => cycle,
        None => {
            warnings.push(DataWarning::InvalidCycle {
                id: sub.id,
                name: sub.name.clone(),
                cycle: sub.cycle.clone(),
            });
            BillingCycle::Monthly
        }
    };

    (MonthlyTwelfths::from_cost(cost, cycle), warnings)
}

/// 利用中のサブスクリプションの月額合計を計算する
///
/// 解約済みの行はサイクルに関わらず合計に寄与しない。
///
/// # 引数
/// * `subscriptions` - サブスクリプションのリスト
///
/// # 戻り値
/// 月額合計（1/12単位の正確値）とデータ品質警告
pub fn aggregate_monthly(subscriptions: &[Subscription]) -> (MonthlyTwelfths, Vec<DataWarning>) {
    let mut total = MonthlyTwelfths::ZERO;
    let mut warnings = Vec::new();

    for sub in subscriptions.iter().filter(|s| s.is_active()) {
        let (amount, mut w) = monthly_equivalent(sub);
        total += amount;
        warnings.append(&mut w);
    }

    (total, warnings)
}

/// 利用中のサブスクリプションの年額合計を計算する
///
/// 年額は常に月額合計から導出する（独立した計算経路を持たない）。
///
/// # 引数
/// * `subscriptions` - サブスクリプションのリスト
///
/// # 戻り値
/// 年額合計（最小通貨単位の正確値）とデータ品質警告
pub fn aggregate_yearly(subscriptions: &[Subscription]) -> (i64, Vec<DataWarning>) {
    let (monthly, warnings) = aggregate_monthly(subscriptions);
    (monthly.yearly_minor_units(), warnings)
}

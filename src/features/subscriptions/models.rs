use serde::{Deserialize, Serialize};

/// 契約状態: 利用中
pub const STATUS_ACTIVE: &str = "active";
/// 契約状態: 解約済み
pub const STATUS_CANCELLED: &str = "cancelled";

/// カテゴリの既定値
pub const CATEGORY_OTHER: &str = "other";

/// 登録可能なカテゴリの一覧
pub const KNOWN_CATEGORIES: [&str; 4] = ["entertainment", "productivity", "utilities", "other"];

/// サブスクリプションデータモデル
///
/// cycleとcategoryは文字列のまま保持する。未知の値を型で弾いてしまうと
/// 旧データが読めなくなるため、解釈は集計側（insights）で行い、
/// 未知のcycleはそこで警告として報告する。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscription {
    pub id: i64,
    /// 所有ユーザーの識別子（全クエリはこの値でスコープされる）
    pub owner_id: String,
    pub name: String,
    /// 金額（最小通貨単位、例: 円やセント）
    pub cost: i64,
    /// 請求サイクル（weekly / monthly / quarterly / semiannual / yearly）
    pub cycle: String,
    /// 課金開始日（YYYY-MM-DD）
    pub start_date: String,
    pub is_trial: bool,
    /// トライアル終了日（YYYY-MM-DD、is_trialがtrueの場合のみ意味を持つ）
    pub trial_end_date: Option<String>,
    /// 契約状態（active / cancelled）
    pub status: String,
    pub category: String,
    pub url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Subscription {
    /// 利用中（active）のサブスクリプションかどうか
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// サブスクリプション作成用DTO
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub cost: i64,
    pub cycle: String,
    pub start_date: String,
    #[serde(default)]
    pub is_trial: bool,
    pub trial_end_date: Option<String>,
    /// 省略時は"active"
    pub status: Option<String>,
    /// 省略時は"other"
    pub category: Option<String>,
    pub url: Option<String>,
}

/// サブスクリプション更新用DTO
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubscriptionDto {
    pub name: Option<String>,
    pub cost: Option<i64>,
    pub cycle: Option<String>,
    pub start_date: Option<String>,
    pub is_trial: Option<bool>,
    pub trial_end_date: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
}

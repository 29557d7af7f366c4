use crate::config::{get_database_filename, get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーションデータディレクトリ名
const APP_DIR_NAME: &str = "subscription-tracker";

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// データベースファイルのパス
    pub database_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. OS標準のデータディレクトリ配下にアプリ用ディレクトリを作成
/// 2. 初回起動の判定（データベースファイルの存在で判定）
/// 3. 環境に応じたデータベースファイルパスの決定
pub fn initialize_application() -> AppResult<InitializationResult> {
    let base_dir = dirs::data_dir()
        .ok_or_else(|| AppError::configuration("データディレクトリを特定できませんでした"))?;

    initialize_at(&base_dir)
}

/// 指定されたベースディレクトリ配下で初期化を実行する
///
/// # 引数
/// * `base_dir` - ベースディレクトリ（通常はOS標準のデータディレクトリ）
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
pub fn initialize_at(base_dir: &Path) -> AppResult<InitializationResult> {
    // 現在の実行環境を取得
    let environment = get_environment();

    // アプリケーションデータディレクトリを取得・作成
    let app_data_dir = ensure_app_data_directory(base_dir)?;

    // データベースファイルパスを構築
    let db_filename = get_database_filename(environment.clone());
    let database_path = app_data_dir.join(db_filename);

    // 初回起動かどうかを判定（データベースファイルの存在で判定）
    let is_first_run = !database_path.exists();

    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &database_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        database_path,
        environment,
    })
}

/// アプリケーションデータディレクトリを確実に作成する
///
/// # 引数
/// * `base_dir` - ベースディレクトリ
///
/// # 戻り値
/// アプリケーションデータディレクトリのパス、または失敗時はエラー
fn ensure_app_data_directory(base_dir: &Path) -> AppResult<PathBuf> {
    let app_data_dir = base_dir.join(APP_DIR_NAME);

    // ディレクトリが存在しない場合は作成
    if !app_data_dir.exists() {
        fs::create_dir_all(&app_data_dir)?;
        info!(
            "アプリケーションデータディレクトリを作成しました: {:?}",
            app_data_dir
        );
    }

    Ok(app_data_dir)
}

/// 初回起動時の初期化ログを出力する
///
/// # 引数
/// * `environment` - 実行環境
/// * `app_data_dir` - アプリケーションデータディレクトリ
/// * `database_path` - データベースファイルパス
fn log_first_run_initialization(
    environment: &Environment,
    app_data_dir: &Path,
    database_path: &Path,
) {
    info!("=== アプリケーション初回起動 ===");
    info!("実行環境: {:?}", environment);
    info!("アプリデータディレクトリ: {:?}", app_data_dir);
    info!("データベースファイル: {:?}", database_path);
}

/// 初期化完了ログを出力する
///
/// # 引数
/// * `result` - 初期化結果
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        info!("初回起動の初期化が正常に完了しました");
    } else {
        info!("アプリケーション起動完了（既存データベースを使用）");
    }
    info!("環境: {:?}", result.environment);
    info!("データベース: {:?}", result.database_path);
}

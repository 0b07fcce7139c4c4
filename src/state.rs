use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::TotpService;

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// リクエスト間で可変な状態は持たない。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// TOTPサービス
    pub totp_service: TotpService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(config: Config) -> Result<Self, AppError> {
        let totp_service = TotpService::new(config.totp_digits, config.totp_step)?;

        tracing::info!(
            digits = config.totp_digits,
            step = config.totp_step,
            "TOTP サービスを初期化"
        );

        Ok(Self {
            config: Arc::new(config),
            totp_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_default_config() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(state.totp_service.step(), 30);
    }

    #[test]
    fn test_new_with_invalid_totp_config() {
        let config = Config {
            totp_digits: 4,
            ..Config::default()
        };
        assert!(AppState::new(config).is_err());
    }
}

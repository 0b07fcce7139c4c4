use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::services::totp::is_valid_base32;
use crate::state::AppState;

/// OTP生成レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResponse {
    /// 現在のTOTPコード
    pub code: String,
    /// 現在の時間ウィンドウの残り秒数
    pub expires_in: u64,
}

/// POST /otp
///
/// Base32シークレットから現在のTOTPコードを生成
///
/// 処理フロー:
/// 1. ボディをJSONとしてパース
/// 2. `secret` の存在チェック（空白のみは不可）
/// 3. Base32形式チェック
/// 4. コード生成
///
/// # Security
/// - シークレットは保存せず、ログにも出力しない
pub async fn generate_otp(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OtpResponse>, AppError> {
    let body = body.map_err(body_rejection)?;
    let secret = parse_secret(&body)?;

    let otp = state.totp_service.generate(&secret)?;

    tracing::debug!(expires_in = otp.expires_in, "OTP生成完了");

    Ok(Json(OtpResponse {
        code: otp.code,
        expires_in: otp.expires_in,
    }))
}

/// ボディ読み込み失敗の分類（上限超過のみクライアントエラー）
fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }

    AppError::Internal(anyhow::anyhow!("body read error: {}", rejection.body_text()))
}

/// リクエストボディからシークレットを取り出して検証
///
/// Content-Type は見ない。JSONであればオブジェクト以外も受け付け、
/// その場合は `secret` なしとして扱う。
fn parse_secret(body: &[u8]) -> Result<SecretString, AppError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "JSONパースエラー");
        AppError::InvalidJson
    })?;

    let secret = value
        .get("secret")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(AppError::MissingSecret)?;

    // 形式チェックはトリム前の値に対して行う
    if !is_valid_base32(secret) {
        return Err(AppError::InvalidSecretFormat);
    }

    Ok(SecretString::from(secret.to_string()))
}

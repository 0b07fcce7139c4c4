use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("JSONのパースに失敗")]
    InvalidJson,

    #[error("シークレットが未指定または不正")]
    MissingSecret,

    #[error("シークレットがBase32形式ではない")]
    InvalidSecretFormat,

    #[error("OTP生成エラー: {0}")]
    OtpGeneration(String),

    #[error("Content-Type が multipart/form-data ではない")]
    UnsupportedContentType,

    #[error("画像ファイルが見つからない")]
    MissingImage,

    #[error("QRコードが見つからない")]
    NoQrCode,

    #[error("QRコード読み取りエラー: {0}")]
    QrDecode(String),

    #[error("リクエストボディが上限を超過")]
    PayloadTooLarge,

    #[error("ルートが見つからない")]
    NotFound,

    #[error("許可されていないメソッド")]
    MethodNotAllowed,

    #[error("内部エラー: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 全エラーレスポンス共通のボディ
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            message: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidJson => (StatusCode::BAD_REQUEST, ErrorResponse::new("Invalid JSON")),
            Self::MissingSecret => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Missing or invalid secret"),
            ),
            Self::InvalidSecretFormat => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid secret format. Must be a valid base32 string."),
            ),
            Self::OtpGeneration(e) => {
                tracing::error!(error = %e, "OTP生成エラー");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("Failed to generate OTP. Secret may be invalid."),
                )
            }
            Self::UnsupportedContentType => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Content-Type must be multipart/form-data"),
            ),
            Self::MissingImage => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Missing image file"),
            ),
            Self::NoQrCode => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("No QR code found or QR code is empty"),
            ),
            Self::QrDecode(e) => {
                tracing::error!(error = %e, "QRコード処理エラー");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("Failed to read or decode QR code"),
                )
            }
            Self::PayloadTooLarge => {
                tracing::warn!("リクエストボディが上限を超過");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    ErrorResponse::new("Payload Too Large"),
                )
            }
            Self::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::new("Not Found")),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::new("Method Not Allowed"),
            ),
            Self::Internal(e) => {
                tracing::error!(error = ?e, "グローバルエラーハンドラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "An unexpected error occurred".to_string(),
                        message: Some(e.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

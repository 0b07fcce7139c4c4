use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::Serialize;

use crate::error::AppError;
use crate::services::qr::{self, OTPAUTH_PREFIX};

/// アップロードされた画像のフォームフィールド名
const IMAGE_FIELD: &str = "image";

/// QRシークレット抽出レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrSecretResponse {
    /// 抽出したシークレット（otpauth URIでなければペイロード全体）
    pub secret: String,
    /// QRコードから読み取った生データ
    pub original_data: String,
}

/// POST /qr-secret
///
/// multipart/form-data の `image` ファイルからQRコードを読み取り、
/// シークレットを返す。
///
/// 処理フロー:
/// 1. Content-Type チェック
/// 2. `image` ファイルパートの取得
/// 3. 画像デコード・QRコード読み取り
/// 4. otpauth URIなら `secret` パラメータを抽出
pub async fn qr_secret(request: Request) -> Result<Json<QrSecretResponse>, AppError> {
    // 1. Content-Type チェック
    validate_content_type(request.headers())?;

    // 2. `image` ファイルパートの取得
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("multipart parse error: {e}")))?;

    let image = read_image_field(&mut multipart).await?;

    tracing::debug!(size = image.len(), "画像受信");

    // 3. 画像デコード・QRコード読み取り
    let result = qr::decode_qr(image).await?;

    if result.is_empty() {
        return Err(AppError::NoQrCode);
    }

    // 4. シークレット抽出
    let secret = qr::extract_secret(&result);

    tracing::info!(
        otpauth = result.starts_with(OTPAUTH_PREFIX),
        "QRコード読み取り完了"
    );

    Ok(Json(QrSecretResponse {
        secret,
        original_data: result,
    }))
}

/// Content-Type が multipart/form-data で始まるか検証
fn validate_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("multipart/form-data") {
        return Err(AppError::UnsupportedContentType);
    }

    Ok(())
}

/// 最初の `image` パートを読み込む
///
/// ファイル名を持たない（テキストフィールドの）場合は画像なしとみなす。
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if field.file_name().is_none() {
            return Err(AppError::MissingImage);
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::MissingImage)
}

/// multipart 読み込み失敗の分類（上限超過のみクライアントエラー）
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }

    AppError::Internal(anyhow::anyhow!("multipart read error: {e}"))
}

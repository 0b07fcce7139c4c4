use std::fmt::Display;

use image::GenericImageView;
use url::Url;

use crate::error::AppError;

/// 認証アプリ登録用URIのスキーム
pub const OTPAUTH_PREFIX: &str = "otpauth://";

/// 画像バイト列からQRコードを読み取る
///
/// デコードはCPUバウンドなのでブロッキングスレッドで実行し、
/// その完了を1回だけ待つ。QRコードが見つからなければ空文字を返す。
pub async fn decode_qr(bytes: Vec<u8>) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || decode_qr_blocking(&bytes))
        .await
        .map_err(|e| AppError::QrDecode(format!("decoder task failed: {e}")))?
}

fn decode_qr_blocking(bytes: &[u8]) -> Result<String, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::QrDecode(format!("image decode error: {e}")))?;

    tracing::debug!(width = img.width(), height = img.height(), "画像デコード完了");

    let decoder = bardecoder::default_decoder();
    first_payload(decoder.decode(&img))
}

/// 検出結果から最初に読み取れたペイロードを選ぶ
///
/// 検出なしは空文字、検出ありで全件失敗なら最初のエラー。
fn first_payload<E: Display>(results: Vec<Result<String, E>>) -> Result<String, AppError> {
    let mut first_error = None;

    for result in results {
        match result {
            Ok(text) => return Ok(text),
            Err(e) => {
                tracing::debug!(error = %e, "QRシンボルの読み取りに失敗");
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match first_error {
        Some(e) => Err(AppError::QrDecode(e)),
        None => Ok(String::new()),
    }
}

/// QRペイロードからシークレットを取り出す
///
/// `otpauth://` URIなら `secret` クエリパラメータを返す。
/// パース失敗・パラメータなし・空の場合はペイロード全体を返す。
pub fn extract_secret(payload: &str) -> String {
    if !payload.starts_with(OTPAUTH_PREFIX) {
        return payload.to_string();
    }

    match Url::parse(payload) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "secret")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| payload.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "otpauth URIのパースに失敗");
            payload.to_string()
        }
    }
}

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use data_encoding::{BASE32_NOPAD, Encoding, SpecificationError};
use secrecy::{ExposeSecret, SecretString};
use totp_rs::{Algorithm, TOTP};

use crate::error::AppError;

/// 末尾ビットを検査しない Base32 エンコーディング
///
/// 認証アプリ同様、`AB` のような端数ビットが 0 でない入力も受け付ける。
static LENIENT_BASE32: LazyLock<Result<Encoding, SpecificationError>> = LazyLock::new(|| {
    let mut spec = BASE32_NOPAD.specification();
    spec.check_trailing_bits = false;
    spec.encoding()
});

/// シークレットがBase32形式か判定
///
/// `A-Z` と `2-7` が1文字以上、その後に `=` パディングが0個以上。
/// 小文字は受け付けない。
pub fn is_valid_base32(secret: &str) -> bool {
    let body = secret.trim_end_matches('=');
    !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}

/// 生成されたワンタイムパスワード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOtp {
    pub code: String,
    /// 現在の時間ウィンドウの残り秒数
    pub expires_in: u64,
}

/// TOTP (Time-based One-Time Password) サービス
///
/// # Security
/// - シークレット平文はログに出力しない
#[derive(Debug, Clone)]
pub struct TotpService {
    digits: usize,
    step: u64,
}

impl TotpService {
    /// 新しい TotpService を作成
    ///
    /// # Arguments
    /// * `digits` - コード桁数（6〜8）
    /// * `step` - 時間ステップ（秒）
    pub fn new(digits: usize, step: u64) -> Result<Self, AppError> {
        if !(6..=8).contains(&digits) {
            tracing::error!(digits, "TOTP桁数が不正");
            return Err(AppError::Internal(anyhow::anyhow!(
                "totp digits must be between 6 and 8"
            )));
        }

        if step == 0 {
            tracing::error!("TOTPステップが0");
            return Err(AppError::Internal(anyhow::anyhow!(
                "totp step must be greater than zero"
            )));
        }

        Ok(Self { digits, step })
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// 現在時刻のコードと残り秒数を生成
    pub fn generate(&self, secret: &SecretString) -> Result<GeneratedOtp, AppError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::OtpGeneration(format!("system time error: {e}")))?
            .as_secs();

        self.generate_at(secret, now)
    }

    /// 指定したUNIX時刻（秒）のコードと残り秒数を生成
    pub fn generate_at(&self, secret: &SecretString, time: u64) -> Result<GeneratedOtp, AppError> {
        let totp = self.create_totp(secret)?;

        Ok(GeneratedOtp {
            code: totp.generate(time),
            expires_in: self.step - time % self.step,
        })
    }

    /// TOTP オブジェクトを作成
    ///
    /// 128ビット未満の短いシークレットも許容するため `new_unchecked` を使う。
    fn create_totp(&self, secret: &SecretString) -> Result<TOTP, AppError> {
        let secret_bytes = decode_base32(secret.expose_secret())?;

        Ok(TOTP::new_unchecked(
            Algorithm::SHA1,
            self.digits,
            1,
            self.step,
            secret_bytes,
            None,
            String::new(),
        ))
    }
}

/// Base32シークレットをバイト列にデコード（パディングは任意）
fn decode_base32(secret: &str) -> Result<Vec<u8>, AppError> {
    let encoding = LENIENT_BASE32
        .as_ref()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("base32 specification error: {e}")))?;

    encoding
        .decode(secret.trim_end_matches('=').as_bytes())
        .map_err(|e| AppError::OtpGeneration(format!("invalid base32 secret: {e}")))
}

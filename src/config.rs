use std::net::{AddrParseError, SocketAddr};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// リクエストボディの上限（バイト、QR画像アップロード用）
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    // TOTP 設定
    /// コード桁数（6〜8）
    #[serde(default = "default_totp_digits")]
    pub totp_digits: usize,
    /// 時間ステップ（秒）
    #[serde(default = "default_totp_step")]
    pub totp_step: u64,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_TOTP_DIGITS: usize = 6;
const DEFAULT_TOTP_STEP: u64 = 30;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_totp_digits() -> usize {
    DEFAULT_TOTP_DIGITS
}

fn default_totp_step() -> u64 {
    DEFAULT_TOTP_STEP
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// `host:port` の待ち受けアドレス
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            totp_digits: default_totp_digits(),
            totp_step: default_totp_step(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.totp_digits, 6);
        assert_eq!(config.totp_step, 30);
    }

    #[test]
    fn test_overrides_from_env() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("TOTP_DIGITS".to_string(), "8".to_string()),
            ("TOTP_STEP".to_string(), "60".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.totp_digits, 8);
        assert_eq!(config.totp_step, 60);
    }

    #[test]
    fn test_socket_addr() {
        let addr = Config::default().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_socket_addr_with_invalid_host() {
        let config = Config {
            host: "not a host".to_string(),
            ..Config::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];
        let result: Result<Config, _> = envy::from_iter(vars);
        assert!(result.is_err());
    }
}

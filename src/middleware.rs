use std::any::Any;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tracing::Span;

use crate::error::AppError;

/// リクエストごとの span（メソッド・パスを記録）
///
/// `TraceLayer::make_span_with` に渡す。ステータスと処理時間は
/// `DefaultOnResponse` がこの span 内で記録する。
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path()
    )
}

/// ハンドラー内のパニックを 500 JSON レスポンスに変換
///
/// `tower_http::catch_panic::CatchPanicLayer::custom` に渡す。
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(anyhow::anyhow!(message)).into_response()
}

/// 未定義ルートのフォールバック
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// 定義済みパスへの未対応メソッドのフォールバック
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_handle_panic_with_str() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_handle_panic_with_string() {
        let response = handle_panic(Box::new("boom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_span_is_named_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/otp?x=1")
            .body(Body::empty())
            .unwrap();
        // サブスクライバー未登録でも span 生成は失敗しない
        let span = make_request_span(&request);
        assert!(span.is_disabled() || span.metadata().is_some_and(|m| m.name() == "request"));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = method_not_allowed().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

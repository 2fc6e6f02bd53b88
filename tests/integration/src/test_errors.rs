//! Request-scoped failure handling.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::{MockReply, TestGateway, invoker_config};

    async fn error_type(response: reqwest::Response) -> String {
        let body = response.bytes().await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["__type"].as_str().unwrap_or_default().to_owned()
    }

    #[tokio::test]
    async fn test_should_abort_on_non_success_invoke_status() {
        let (gateway, mock) = TestGateway::with_mock(MockReply::raw(
            404,
            r#"{"Message":"Function not found: xxx"}"#,
        ))
        .await
        .unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert!(response.headers().get("x-amzn-requestid").is_some());
        let body = response.text().await.unwrap();
        assert!(!body.contains("Function not found"));
        assert!(body.contains("TransportError"));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_should_abort_on_function_error() {
        let reply = MockReply::raw(200, r#"{"errorMessage":"boom","errorType":"Error"}"#)
            .with_header("X-Amz-Function-Error", "Unhandled");
        let (gateway, _mock) = TestGateway::with_mock(reply).await.unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert_eq!(error_type(response).await, "TransportError");
    }

    #[tokio::test]
    async fn test_should_abort_on_undecodable_envelope() {
        let (gateway, _mock) = TestGateway::with_mock(MockReply::raw(200, "not json"))
            .await
            .unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert_eq!(error_type(response).await, "DecodeError");
    }

    #[tokio::test]
    async fn test_should_abort_on_invalid_base64_body() {
        let (gateway, _mock) = TestGateway::with_mock(MockReply::envelope(&json!({
            "statusCode": 200,
            "isBase64Encoded": true,
            "body": "***"
        })))
        .await
        .unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert_eq!(error_type(response).await, "DecodeError");
    }

    #[tokio::test]
    async fn test_should_abort_when_endpoint_is_unreachable() {
        // Nothing listens on the discard port.
        let gateway = TestGateway::start(&invoker_config("http://127.0.0.1:9"))
            .await
            .unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert_eq!(error_type(response).await, "TransportError");
    }

    #[tokio::test]
    async fn test_should_abort_slow_invocation_after_timeout() {
        let reply =
            MockReply::envelope(&json!({"statusCode": 200})).with_delay(Duration::from_secs(5));
        let mock = crate::MockLambda::start(reply).await.unwrap();
        let mut config = invoker_config(&mock.endpoint());
        config.invoke_timeout_secs = 1;
        let gateway = TestGateway::start(&config).await.unwrap();

        let response = reqwest::get(gateway.url("/")).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        assert_eq!(error_type(response).await, "TransportError");
    }

    #[tokio::test]
    async fn test_should_keep_serving_after_a_failed_request() {
        let (gateway, _mock) = TestGateway::with_mock(MockReply::raw(500, "internal"))
            .await
            .unwrap();

        for _ in 0..3 {
            let response = reqwest::get(gateway.url("/")).await.unwrap();
            assert_eq!(response.status().as_u16(), 502);
        }
    }
}

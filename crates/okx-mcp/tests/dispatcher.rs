//! 디스패처 동작 테스트.
//!
//! 검증 실패는 클라이언트를 호출하지 않아야 하고,
//! 클라이언트 에러는 네 가지 종류로 분류되어 결과 봉투에 담겨야 합니다.

use async_trait::async_trait;
use chrono::Utc;
use mockito::{Matcher, Server};
use okx_core::{
    BalanceSnapshot, Candle, Credentials, InstrumentId, KlineRequest, OrderAck, OrderRequest,
    OrderType, TickerSnapshot, TradeMode,
};
use okx_exchange::{ErrorKind, ExchangeResult, OkxApi, OkxClient, OkxConfig};
use okx_mcp::{Dispatcher, JsonObject, ToolResult};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 호출 횟수와 마지막 요청을 기록하는 가짜 클라이언트.
#[derive(Default)]
struct RecordingApi {
    calls: AtomicUsize,
    last_order: Mutex<Option<OrderRequest>>,
    last_kline: Mutex<Option<KlineRequest>>,
    last_currencies: Mutex<Option<Vec<String>>>,
}

impl RecordingApi {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OkxApi for RecordingApi {
    fn name(&self) -> &str {
        "recording"
    }

    async fn get_balance(&self, currencies: Option<&[String]>) -> ExchangeResult<BalanceSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_currencies.lock().unwrap() = currencies.map(|c| c.to_vec());
        Ok(BalanceSnapshot {
            total_equity: "100".to_string(),
            update_time: None,
            details: vec![],
        })
    }

    async fn get_ticker(&self, instrument_id: &InstrumentId) -> ExchangeResult<TickerSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TickerSnapshot {
            instrument_id: instrument_id.to_string(),
            instrument_type: "SPOT".to_string(),
            last: "65000.1".to_string(),
            last_size: "0.01".to_string(),
            ask_price: "65000.2".to_string(),
            ask_size: "1".to_string(),
            bid_price: "65000.0".to_string(),
            bid_size: "1".to_string(),
            open_24h: "64000".to_string(),
            high_24h: "65500".to_string(),
            low_24h: "63800".to_string(),
            volume_24h: "1900".to_string(),
            volume_currency_24h: "123456789".to_string(),
            timestamp: None,
        })
    }

    async fn get_kline(&self, request: &KlineRequest) -> ExchangeResult<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_kline.lock().unwrap() = Some(request.clone());
        Ok(vec![Candle {
            timestamp: Utc::now(),
            open: "1".to_string(),
            high: "2".to_string(),
            low: "0.5".to_string(),
            close: "1.5".to_string(),
            volume: "10".to_string(),
            volume_currency: "15".to_string(),
            volume_quote: "15".to_string(),
            confirmed: true,
        }])
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_order.lock().unwrap() = Some(request.clone());
        Ok(OrderAck {
            order_id: "312269865356374016".to_string(),
            client_order_id: request.client_order_id.clone().unwrap_or_default(),
            tag: String::new(),
            status_code: "0".to_string(),
            status_message: String::new(),
            timestamp: None,
        })
    }
}

fn recording() -> (Arc<RecordingApi>, Dispatcher) {
    let api = Arc::new(RecordingApi::default());
    let dispatcher = Dispatcher::new(api.clone());
    (api, dispatcher)
}

fn args(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn failure_kind(result: &ToolResult) -> Option<ErrorKind> {
    result.failure().map(|f| f.kind)
}

fn credentials() -> Arc<Credentials> {
    Arc::new(Credentials::new("test-api-key", "secret", "test-passphrase").unwrap())
}

#[tokio::test]
async fn test_limit_order_without_price_never_calls_client() {
    let (api, dispatcher) = recording();

    let result = dispatcher
        .call(
            "create_order",
            args(json!({"instId": "BTC-USDT", "side": "buy", "ordType": "limit", "sz": "0.001"})),
        )
        .await
        .unwrap();

    assert_eq!(failure_kind(&result), Some(ErrorKind::InvalidArgument));
    assert!(result.failure().unwrap().message.contains("px"));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_market_order_with_price_is_rejected() {
    let (api, dispatcher) = recording();

    let result = dispatcher
        .call(
            "create_order",
            args(json!({"instId": "BTC-USDT", "side": "sell", "sz": "0.001", "px": "65000"})),
        )
        .await
        .unwrap();

    assert_eq!(failure_kind(&result), Some(ErrorKind::InvalidArgument));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_kline_limit_above_maximum_rejected_before_dispatch() {
    let (api, dispatcher) = recording();

    let result = dispatcher
        .call("get_kline", args(json!({"instId": "BTC-USDT", "limit": 301})))
        .await
        .unwrap();

    assert_eq!(failure_kind(&result), Some(ErrorKind::InvalidArgument));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_invalid_arguments_never_call_client() {
    let (api, dispatcher) = recording();

    let cases = [
        ("get_ticker", json!({})),
        ("get_ticker", json!({"instId": "BTCUSDT"})),
        ("get_ticker", json!({"instId": "BTC-USDT", "extra": true})),
        ("get_kline", json!({"instId": "BTC-USDT", "bar": "7H"})),
        ("get_kline", json!({"instId": "BTC-USDT", "after": "yesterday"})),
        ("get_balance", json!({"ccy": "BTC;USDT"})),
        ("create_order", json!({"instId": "BTC-USDT", "side": "buy", "sz": "-1"})),
        ("create_order", json!({"instId": "BTC-USDT", "side": "buy", "sz": "abc"})),
        ("create_order", json!({"instId": "BTC-USDT", "side": "buy", "sz": "1", "clOrdId": "bad id!"})),
        ("create_order", json!({"instId": "BTC-USDT", "side": "buy", "sz": "1", "tdMode": "spot"})),
    ];

    for (tool, raw) in cases {
        let result = dispatcher.call(tool, args(raw.clone())).await.unwrap();
        assert_eq!(
            failure_kind(&result),
            Some(ErrorKind::InvalidArgument),
            "{} {} should be rejected",
            tool,
            raw
        );
    }
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_unknown_tool_is_protocol_error() {
    let (api, dispatcher) = recording();

    let err = dispatcher.call("cancel_order", None).await.unwrap_err();

    assert_eq!(err.0, "cancel_order");
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_create_order_passes_validated_request() {
    let (api, dispatcher) = recording();

    let result = dispatcher
        .call(
            "create_order",
            args(json!({
                "instId": "btc-usdt",
                "side": "Buy",
                "ordType": "limit",
                "sz": "0.0010",
                "px": 65000.5,
                "tdMode": "cross",
                "clOrdId": "abc123"
            })),
        )
        .await
        .unwrap();

    assert!(!result.is_error());
    assert_eq!(result.to_json()["order_id"], "312269865356374016");
    assert_eq!(api.calls(), 1);

    let order = api.last_order.lock().unwrap().clone().unwrap();
    assert_eq!(order.instrument_id.as_str(), "BTC-USDT");
    assert_eq!(order.order_type, OrderType::Limit);
    assert_eq!(order.size.as_str(), "0.0010");
    assert_eq!(order.price.as_ref().map(|p| p.as_str()), Some("65000.5"));
    assert_eq!(order.trade_mode, TradeMode::Cross);
    assert_eq!(order.client_order_id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_kline_defaults_and_balance_filter() {
    let (api, dispatcher) = recording();

    let result = dispatcher
        .call("get_kline", args(json!({"instId": "ETH-USDT"})))
        .await
        .unwrap();
    assert!(!result.is_error());

    let kline = api.last_kline.lock().unwrap().clone().unwrap();
    assert_eq!(kline.bar.as_okx_param(), "1H");
    assert_eq!(kline.limit, 100);

    let result = dispatcher
        .call("get_balance", args(json!({"ccy": "btc, usdt"})))
        .await
        .unwrap();
    assert!(!result.is_error());
    assert_eq!(
        api.last_currencies.lock().unwrap().clone(),
        Some(vec!["BTC".to_string(), "USDT".to_string()])
    );
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_ticker_last_preserved_through_dispatcher() {
    let mut server = Server::new_async().await;
    let _ticker = server
        .mock("GET", "/api/v5/market/ticker")
        .match_query(Matcher::UrlEncoded("instId".into(), "BTC-USDT".into()))
        .with_status(200)
        .with_body(
            r#"{"code":"0","msg":"","data":[{"instType":"SPOT","instId":"BTC-USDT","last":"65000.1","lastSz":"0.01","askPx":"65000.2","askSz":"1","bidPx":"65000.0","bidSz":"1","open24h":"64000","high24h":"65500","low24h":"63800","volCcy24h":"1","vol24h":"1","ts":"1717763696789"}]}"#,
        )
        .create_async()
        .await;

    let client = OkxClient::new(
        OkxConfig::default().with_base_url(server.url()),
        credentials(),
    )
    .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(client));

    let result = dispatcher
        .call("get_ticker", args(json!({"instId": "BTC-USDT"})))
        .await
        .unwrap();

    assert!(!result.is_error());
    assert_eq!(result.to_json()["last"], "65000.1");
    assert!(result.to_text().contains("\"65000.1\""));
}

#[tokio::test]
async fn test_exchange_rejection_carries_code() {
    let mut server = Server::new_async().await;
    let order = server
        .mock("POST", "/api/v5/trade/order")
        .with_status(200)
        .with_body(
            r#"{"code":"1","msg":"All operations failed","data":[{"ordId":"","clOrdId":"","tag":"","sCode":"51008","sMsg":"Order failed. Insufficient USDT balance in account."}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = OkxClient::new(
        OkxConfig::default().with_base_url(server.url()),
        credentials(),
    )
    .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(client));

    let result = dispatcher
        .call(
            "create_order",
            args(json!({"instId": "BTC-USDT", "side": "buy", "sz": "100"})),
        )
        .await
        .unwrap();

    order.assert_async().await;
    let envelope = result.to_json();
    assert_eq!(envelope["error"]["kind"], "ExchangeError");
    assert_eq!(envelope["error"]["code"], "51008");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_every_tool_is_network_error_without_retry() {
    // 연결은 받지만 응답하지 않는 서버
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    let accept = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    let config = OkxConfig::default()
        .with_base_url(format!("http://{}", addr))
        .with_timeout(Duration::from_millis(300));
    let client = OkxClient::new(config, credentials()).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(client));

    let calls = [
        ("get_balance", json!({})),
        ("get_ticker", json!({"instId": "BTC-USDT"})),
        ("get_kline", json!({"instId": "BTC-USDT", "bar": "1m", "limit": 5})),
        ("create_order", json!({"instId": "BTC-USDT", "side": "buy", "sz": "0.001"})),
    ];

    for (tool, raw) in calls {
        let result = dispatcher.call(tool, args(raw)).await.unwrap();
        assert_eq!(
            failure_kind(&result),
            Some(ErrorKind::NetworkError),
            "{} should time out",
            tool
        );
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 4);

    accept.abort();
}

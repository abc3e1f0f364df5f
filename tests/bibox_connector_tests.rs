mod common;

use bibox_connector::core::journal::JournalKind;
use bibox_connector::core::kernel::{HmacMd5Signer, Signer};
use bibox_connector::exchanges::bibox::{conversions, Protocol};
use bibox_connector::{
    AccountInfo, ErrorKind, ExchangeConnector, MarketDataSource, Order, OrderPlacer, OrderSide,
    ProtocolVariant,
};
use common::{batched, Harness};
use secrecy::Secret;
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod connector_tests {
    use super::*;

    fn open_order(id: &str, symbol: &str, amount: f64, deal_amount: f64) -> Order {
        Order {
            id: id.to_string(),
            price: 100.0,
            amount,
            deal_amount,
            side: OrderSide::Buy,
            symbol: symbol.to_string(),
        }
    }

    #[tokio::test]
    async fn test_min_amount_is_local() {
        let h = Harness::new(ProtocolVariant::Batched);

        for symbol in ["BTC/USDT", "eth/usdt", "EOS/USDT", "ONT/USDT", "QTUM/USDT"] {
            assert_eq!(h.connector.get_min_amount(symbol), Some(0.001), "{}", symbol);
        }
        assert_eq!(h.connector.get_min_amount("DOGE/USDT"), None);
        assert_eq!(h.rest.call_count(), 0);
    }

    #[tokio::test]
    async fn test_identity_and_limit() {
        let h = Harness::new(ProtocolVariant::Batched);

        assert_eq!(h.connector.get_type(), "bibox");
        assert_eq!(h.connector.get_name(), "bibox");
        assert_eq!(h.connector.limit(), 10.0);
        assert_eq!(h.connector.set_limit(4.0), 4.0);
        assert_eq!(h.connector.limit(), 4.0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_never_reaches_network() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        let c = &h.connector;

        let errors = vec![
            c.trade("buy", "DOGE/USDT", 1.0, 1.0, &[]).await.unwrap_err(),
            c.buy("DOGE/USDT", 1.0, 1.0, &[]).await.unwrap_err(),
            c.get_order("DOGE/USDT", "1").await.unwrap_err(),
            c.get_orders("DOGE/USDT").await.unwrap_err(),
            c.get_trades("DOGE/USDT").await.unwrap_err(),
            c.get_ticker("DOGE/USDT").await.unwrap_err(),
            c.cancel_order(&open_order("1", "DOGE/USDT", 1.0, 0.0))
                .await
                .unwrap_err(),
        ];

        for error in &errors {
            assert_eq!(error.kind(), ErrorKind::Validation, "{}", error);
        }
        assert_eq!(h.rest.call_count(), 0);

        let entries = h.journal_entries();
        assert_eq!(entries.len(), errors.len());
        assert!(entries.iter().all(|e| e.kind == JournalKind::Error));
        assert!(entries[0].message.starts_with("trade() error"));
    }

    #[tokio::test]
    async fn test_unrecognized_side_rejected_locally() {
        let h = Harness::new(ProtocolVariant::Batched);

        let err = h
            .connector
            .trade("hold", "BTC/USDT", 100.0, 1.0, &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.rest.call_count(), 0);
    }

    #[tokio::test]
    async fn test_buy_sends_signed_batched_command() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(batched("orderpending/trade", json!(1234567)));

        let id = h
            .connector
            .buy("ETH/USDT", 300.0, 1.5, &["grid", "level-2"])
            .await
            .unwrap();
        assert_eq!(id, "1234567");

        let calls = h.rest.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.method, "POST");
        assert_eq!(call.endpoint, "orderpending");
        assert_eq!(call.field("apikey"), Some("test_api_key"));

        let cmds = call.field("cmds").unwrap();
        let expected = HmacMd5Signer::new(Secret::new("test_secret_key".to_string()))
            .sign(cmds.as_bytes())
            .unwrap();
        assert_eq!(call.field("sign"), Some(expected.as_str()));

        let command = call.command();
        assert_eq!(command["cmd"], "orderpending/trade");
        assert_eq!(command["index"], 1);
        assert_eq!(command["body"]["pair"], "ETH_USDT");
        assert_eq!(command["body"]["order_side"], 1);
        assert_eq!(command["body"]["order_type"], 2);
        assert_eq!(command["body"]["price"], 300.0);
        assert_eq!(command["body"]["amount"], 1.5);

        let entries = h.journal_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, JournalKind::Buy);
        assert_eq!(entries[0].symbol, "ETH/USDT");
        assert_eq!(entries[0].message, "grid level-2");
    }

    #[tokio::test]
    async fn test_trade_dispatches_market_spelling_to_sell() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(batched("orderpending/trade", json!("998877")));

        let id = h
            .connector
            .trade("SELL_MARKET", "btc/usdt", 9000.0, 0.01, &[])
            .await
            .unwrap();
        assert_eq!(id, "998877");
        assert_eq!(h.rest.calls()[0].command()["body"]["order_side"], 2);
        assert_eq!(h.journal_entries()[0].kind, JournalKind::Sell);
    }

    #[tokio::test]
    async fn test_flat_trade_sends_side_string() {
        let h = Harness::new(ProtocolVariant::Flat);
        h.rest
            .respond(json!({"result": "true", "orderNumber": "31226040"}));

        let id = h.connector.sell("EOS/USDT", 5.5, 20.0, &[]).await.unwrap();
        assert_eq!(id, "31226040");

        let calls = h.rest.calls();
        let call = &calls[0];
        assert_eq!(call.endpoint, "private");
        let command = call.command();
        assert_eq!(command["cmd"], "private/trade");
        assert!(command.get("index").is_none());
        assert_eq!(command["body"]["currencyPair"], "EOS_USDT");
        assert_eq!(command["body"]["type"], "sell");
    }

    #[tokio::test]
    async fn test_batched_open_orders_buy_side_first() {
        let h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(batched(
            "orderpending/orderPendingList",
            json!({"count": 2, "page": 1, "items": [
                {"id": 11, "price": "99.5", "amount": "1", "deal_amount": "0", "order_side": 1, "pair": "BTC_USDT"},
                {"id": 12, "price": "99.0", "amount": "2", "deal_amount": "0.5", "order_side": 1, "pair": "BTC_USDT"}
            ]}),
        ));
        h.rest.respond(batched(
            "orderpending/orderPendingList",
            json!({"count": 1, "page": 1, "items": [
                {"id": 21, "price": "101", "amount": "3", "deal_amount": "1", "order_side": 2, "pair": "BTC_USDT"}
            ]}),
        ));

        let orders = h.connector.get_orders("BTC/USDT").await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["11", "12", "21"]);
        assert_eq!(orders[1].deal_amount, 0.5);
        assert_eq!(orders[2].side, OrderSide::Sell);
        assert!(orders.iter().all(|o| o.symbol == "BTC/USDT"));

        let calls = h.rest.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command()["cmd"], "orderpending/orderPendingList");
        assert_eq!(calls[0].command()["body"]["order_side"], 1);
        assert_eq!(calls[1].command()["body"]["order_side"], 2);
        assert_eq!(calls[0].command()["body"]["coin_symbol"], "BTC");
        assert_eq!(calls[0].command()["body"]["currency_symbol"], "USDT");
    }

    #[tokio::test]
    async fn test_flat_open_orders_partitioned_stably() {
        let h = Harness::new(ProtocolVariant::Flat);
        h.rest.respond(json!({"result": true, "orders": [
            {"orderNumber": "1", "rate": "10", "initialAmount": "1", "filledAmount": "0", "type": "sell", "currencyPair": "ONT_USDT"},
            {"orderNumber": "2", "rate": "9", "initialAmount": "1", "filledAmount": "0", "type": "buy", "currencyPair": "ONT_USDT"},
            {"orderNumber": "3", "rate": "11", "initialAmount": "1", "filledAmount": "0", "type": "sell", "currencyPair": "ONT_USDT"},
            {"orderNumber": "4", "rate": "8", "initialAmount": "1", "filledAmount": "0", "type": "buy", "currencyPair": "ONT_USDT"}
        ]}));

        let orders = h.connector.get_orders("ONT/USDT").await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["2", "4", "1", "3"]);
        assert_eq!(h.rest.call_count(), 1);
        assert_eq!(h.rest.calls()[0].command()["cmd"], "private/openOrders");
    }

    #[tokio::test]
    async fn test_batched_trades_use_history_list() {
        let h = Harness::new(ProtocolVariant::Batched);
        h.rest
            .respond(batched("orderpending/pendingHistoryList", json!({"items": []})));
        h.rest.respond(batched(
            "orderpending/pendingHistoryList",
            json!({"items": [
                {"id": "77", "price": 5, "amount": 2, "deal_amount": 2, "order_side": 2,
                 "coin_symbol": "QTUM", "currency_symbol": "USDT"}
            ]}),
        ));

        let trades = h.connector.get_trades("QTUM/USDT").await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].symbol, "QTUM/USDT");
        assert_eq!(trades[0].remaining(), 0.0);

        for call in h.rest.calls() {
            assert_eq!(call.command()["cmd"], "orderpending/pendingHistoryList");
        }
    }

    #[tokio::test]
    async fn test_empty_results_without_network() {
        let flat = Harness::new(ProtocolVariant::Flat);
        assert!(flat.connector.get_trades("BTC/USDT").await.unwrap().is_empty());
        assert_eq!(flat.rest.call_count(), 0);

        let mut batched = Harness::new(ProtocolVariant::Batched);
        for (symbol, period) in [("BTC/USDT", "M"), ("BTC/USDT", "1h"), ("XRP/USDT", "M")] {
            let records = batched.connector.get_records(symbol, period).await;
            assert!(records.unwrap().is_empty(), "{} {}", symbol, period);
        }
        assert_eq!(batched.rest.call_count(), 0);
        assert!(batched.journal_entries().is_empty());
    }

    #[tokio::test]
    async fn test_get_order_by_id() {
        let h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(batched(
            "orderpending/order",
            json!({"id": 555, "price": "0.5", "amount": "40", "deal_amount": "10",
                   "order_side": 1, "pair": "ONT_USDT"}),
        ));

        let order = h.connector.get_order("ONT/USDT", "555").await.unwrap();
        assert_eq!(order.id, "555");
        assert_eq!(order.remaining(), 30.0);
        assert_eq!(h.rest.calls()[0].command()["body"]["id"], 555);

        let err = h.connector.get_order("ONT/USDT", "abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.rest.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_journals_unfilled_amount() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        h.rest
            .respond(batched("orderpending/cancelTrade", json!("cancelling")));

        let order = open_order("42", "BTC/USDT", 10.0, 3.0);
        assert!(h.connector.cancel_order(&order).await.unwrap());

        let command = h.rest.calls()[0].command();
        assert_eq!(command["cmd"], "orderpending/cancelTrade");
        assert_eq!(command["body"]["id"], 42);

        let entries = h.journal_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, JournalKind::Cancel);
        assert_eq!(entries[0].amount, 7.0);
        assert_eq!(entries[0].price, 100.0);
        assert_eq!(entries[0].message, "cancelling");
    }

    #[tokio::test]
    async fn test_batched_ticker_reverses_asks() {
        let h = Harness::new(ProtocolVariant::Batched);
        // far-to-near feed; the two 101 levels only come out nearest-first
        // when the feed is reversed rather than sorted
        let book = json!({"result": {
            "bids": [["100", "1"], ["99", "2"], ["98", "3"]],
            "asks": [["103", "3"], ["102", "2"], ["101", "4"], ["101", "1"]]
        }});
        h.rest.respond(book.clone());

        let ticker = h.connector.get_ticker("btc/usdt").await.unwrap();
        assert_eq!(ticker.buy, 100.0);
        assert_eq!(ticker.sell, 101.0);
        assert_eq!(ticker.mid, 100.5);
        let asks: Vec<(f64, f64)> = ticker.asks.iter().map(|l| (l.price, l.amount)).collect();
        assert_eq!(asks, [(101.0, 1.0), (101.0, 4.0), (102.0, 2.0), (103.0, 3.0)]);

        let protocol = h.connector.protocol_variant().protocol();
        let ordered = conversions::order_depth(
            protocol.decode_depth(book).unwrap(),
            protocol.asks_descending(),
        );
        assert!(!ordered.resorted, "native ordering should not need the fallback sort");

        let calls = h.rest.calls();
        let call = &calls[0];
        assert_eq!(call.method, "GET");
        assert_eq!(call.endpoint, "https://data.bibox.io/api2/1/orderBook/BTC_USDT");
        assert!(call.form.is_empty());
    }

    #[tokio::test]
    async fn test_ticker_pacing_depends_on_variant() {
        let depth = json!({"result": true, "bids": [[10, 1]], "asks": [[11, 1]]});

        let batched = Harness::new(ProtocolVariant::Batched);
        for _ in 0..3 {
            batched.rest.respond(depth.clone());
        }
        for _ in 0..3 {
            batched.connector.get_ticker("EOS/USDT").await.unwrap();
        }
        assert_eq!(batched.clock.elapsed(), Duration::ZERO);

        let flat = Harness::new(ProtocolVariant::Flat);
        for _ in 0..3 {
            flat.rest.respond(depth.clone());
        }
        for _ in 0..3 {
            flat.connector.get_ticker("EOS/USDT").await.unwrap();
        }
        assert!(flat.clock.elapsed() >= Duration::from_millis(200));
        assert_eq!(flat.rest.calls()[0].endpoint, "orderBook/EOS_USDT");
    }

    #[tokio::test]
    async fn test_empty_book_is_format_error() {
        let h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(json!({"result": {"bids": [], "asks": [["1", "1"]]}}));

        let err = h.connector.get_ticker("BTC/USDT").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn test_batched_account_seeds_known_assets() {
        let h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond(batched(
            "transfer/assets",
            json!({"total_btc": "0.1", "assets_list": [
                {"coin_symbol": "btc", "balance": "0.25", "freeze": "0.05"},
                {"coin_symbol": "USDT", "balance": "1000", "freeze": "0"}
            ]}),
        ));

        let account = h.connector.get_account().await.unwrap();
        assert_eq!(account.len(), 6);
        assert_eq!(account.available("BTC"), 0.25);
        assert_eq!(account.frozen("BTC"), 0.05);
        assert_eq!(account.available("USDT"), 1000.0);
        assert_eq!(account.available("QTUM"), 0.0);

        let flat = account.to_flat_map();
        assert_eq!(flat.len(), 12);
        assert_eq!(flat["FrozenBTC"], 0.05);
        assert_eq!(flat["EOS"], 0.0);

        assert_eq!(h.rest.calls()[0].command()["body"]["select"], 1);
    }

    #[tokio::test]
    async fn test_flat_account_merges_sides() {
        let h = Harness::new(ProtocolVariant::Flat);
        h.rest.respond(json!({
            "result": "true",
            "available": {"eth": "2.5", "USDT": "10"},
            "locked": {"ETH": "0.5"}
        }));

        let account = h.connector.get_account().await.unwrap();
        assert_eq!(account.available("ETH"), 2.5);
        assert_eq!(account.frozen("ETH"), 0.5);
        assert_eq!(account.available("USDT"), 10.0);
        assert_eq!(account.len(), 6);
    }

    #[tokio::test]
    async fn test_error_kinds_surface_and_journal() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        h.rest.respond_status(502, "bad gateway");
        h.rest.respond_raw(b"<html>maintenance</html>");
        h.rest
            .respond(json!({"error": {"code": "3012", "msg": "invalid apikey"}, "cmd": "transfer/assets"}));

        let transport = h.connector.get_account().await.unwrap_err();
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert!(transport.is_retryable());

        let format = h.connector.get_account().await.unwrap_err();
        assert_eq!(format.kind(), ErrorKind::Format);

        let rejected = h.connector.get_account().await.unwrap_err();
        assert_eq!(rejected.kind(), ErrorKind::Exchange);
        assert!(rejected.to_string().contains("invalid apikey"));

        let entries = h.journal_entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.kind == JournalKind::Error));
        assert!(entries[2].message.contains("Exchange"));
    }

    #[tokio::test]
    async fn test_flat_rejection_uses_message() {
        let h = Harness::new(ProtocolVariant::Flat);
        h.rest
            .respond(json!({"result": "false", "message": "Insufficient balance", "code": 2085}));

        let err = h.connector.buy("BTC/USDT", 1.0, 1.0, &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Exchange);
        assert!(err.to_string().contains("Insufficient balance"));
    }

    #[tokio::test]
    async fn test_signed_calls_are_paced() {
        let h = Harness::new(ProtocolVariant::Batched);
        for _ in 0..5 {
            h.rest
                .respond(batched("transfer/assets", json!({"assets_list": []})));
        }

        for _ in 0..5 {
            h.connector.get_account().await.unwrap();
        }
        assert!(h.clock.elapsed() >= Duration::from_millis(400));

        h.connector.set_limit(0.0);
        let before = h.clock.elapsed();
        h.rest
            .respond(batched("transfer/assets", json!({"assets_list": []})));
        h.connector.get_account().await.unwrap();
        assert_eq!(h.clock.elapsed(), before);
    }

    #[tokio::test]
    async fn test_log_goes_to_journal() {
        let mut h = Harness::new(ProtocolVariant::Batched);
        h.connector.log("strategy started");

        let entries = h.journal_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, JournalKind::Info);
        assert_eq!(entries[0].message, "strategy started");
    }
}

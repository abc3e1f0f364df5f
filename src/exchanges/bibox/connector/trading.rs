use crate::core::errors::ExchangeError;
use crate::core::journal::{JournalKind, TradeJournal};
use crate::core::kernel::RestClient;
use crate::core::traits::OrderPlacer;
use crate::core::types::{Order, OrderSide};
use crate::exchanges::bibox::rest::BiboxRest;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Bibox trading implementation
pub struct Trading<R: RestClient> {
    rest: BiboxRest<R>,
    journal: Arc<TradeJournal>,
}

impl<R: RestClient + Clone> Trading<R> {
    pub fn new(rest: &BiboxRest<R>, journal: Arc<TradeJournal>) -> Self {
        Self {
            rest: rest.clone(),
            journal,
        }
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for Trading<R> {
    #[instrument(skip(self, notes), fields(exchange = "bibox"))]
    async fn trade(
        &self,
        side: &str,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        let side = self
            .rest
            .settings()
            .market(symbol)
            .and_then(|_| side.parse::<OrderSide>().map_err(ExchangeError::from))
            .inspect_err(|e| self.journal.operation_failed("trade", symbol, price, amount, e))?;

        match side {
            OrderSide::Buy => self.buy(symbol, price, amount, notes).await,
            OrderSide::Sell => self.sell(symbol, price, amount, notes).await,
        }
    }

    #[instrument(skip(self, notes), fields(exchange = "bibox"))]
    async fn buy(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        self.place(OrderSide::Buy, symbol, price, amount, notes)
            .await
            .inspect_err(|e| self.journal.operation_failed("buy", symbol, price, amount, e))
    }

    #[instrument(skip(self, notes), fields(exchange = "bibox"))]
    async fn sell(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        self.place(OrderSide::Sell, symbol, price, amount, notes)
            .await
            .inspect_err(|e| self.journal.operation_failed("sell", symbol, price, amount, e))
    }

    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_order(&self, symbol: &str, id: &str) -> Result<Order, ExchangeError> {
        self.fetch_order(symbol, id)
            .await
            .inspect_err(|e| self.journal.operation_failed("get_order", symbol, 0.0, 0.0, e))
    }

    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        self.list_orders(symbol, false)
            .await
            .inspect_err(|e| self.journal.operation_failed("get_orders", symbol, 0.0, 0.0, e))
    }

    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_trades(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        self.list_orders(symbol, true)
            .await
            .inspect_err(|e| self.journal.operation_failed("get_trades", symbol, 0.0, 0.0, e))
    }

    #[instrument(skip(self, order), fields(exchange = "bibox", order_id = %order.id))]
    async fn cancel_order(&self, order: &Order) -> Result<bool, ExchangeError> {
        self.cancel(order).await.inspect_err(|e| {
            self.journal.operation_failed(
                "cancel_order",
                &order.symbol,
                order.price,
                order.remaining(),
                e,
            );
        })
    }
}

impl<R: RestClient> Trading<R> {
    async fn place(
        &self,
        side: OrderSide,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        let market = self.rest.settings().market(symbol)?;
        let protocol = self.rest.protocol();

        let request = protocol.place_order(market, side, price, amount);
        let payload = self.rest.execute(&request).await?;
        let id = protocol.decode_order_id(payload)?;

        let kind = match side {
            OrderSide::Buy => JournalKind::Buy,
            OrderSide::Sell => JournalKind::Sell,
        };
        self.journal.log(
            kind,
            &market.symbol.to_string(),
            price,
            amount,
            &notes.join(" "),
        );
        Ok(id)
    }

    async fn fetch_order(&self, symbol: &str, id: &str) -> Result<Order, ExchangeError> {
        let market = self.rest.settings().market(symbol)?;
        let protocol = self.rest.protocol();

        let request = protocol.get_order(market, id)?;
        let payload = self.rest.execute(&request).await?;
        protocol.decode_order(payload, self.rest.settings(), market)
    }

    async fn list_orders(&self, symbol: &str, history: bool) -> Result<Vec<Order>, ExchangeError> {
        let market = self.rest.settings().market(symbol)?;
        let protocol = self.rest.protocol();

        let requests = if history {
            protocol.trade_history(market)
        } else {
            protocol.open_orders(market)
        };
        if requests.is_empty() {
            debug!(protocol = %protocol.variant(), "trade history not offered, returning no orders");
            return Ok(Vec::new());
        }

        let mut orders = Vec::new();
        for request in &requests {
            let payload = self.rest.execute(request).await?;
            orders.extend(protocol.decode_orders(payload, self.rest.settings(), market)?);
        }

        // Buy side first; stable, so each side keeps the exchange's order
        orders.sort_by_key(|order| order.side == OrderSide::Sell);
        Ok(orders)
    }

    async fn cancel(&self, order: &Order) -> Result<bool, ExchangeError> {
        let market = self.rest.settings().market(&order.symbol)?;
        let protocol = self.rest.protocol();

        let request = protocol.cancel_order(market, &order.id)?;
        let payload = self.rest.execute(&request).await?;
        let message = protocol.decode_cancel(payload);

        self.journal.log(
            JournalKind::Cancel,
            &market.symbol.to_string(),
            order.price,
            order.remaining(),
            &message,
        );
        Ok(true)
    }
}

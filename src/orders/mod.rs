//! Simulated order placement.
//!
//! No routing, no order book, no fills: a valid request produces a
//! confirmation message and nothing else happens. Requests are never
//! persisted past the confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::QuoteSource;
use crate::error::{DashboardError, Result};
use crate::models::Side;
use crate::watchlist::SymbolSpec;

/// A user's order intent at the moment of submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    /// Number of lots, not shares
    pub quantity: u32,
    /// Last traded price fetched at placement time, never a cached value
    pub price: f64,
}

/// Outcome of a simulated placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub quantity: u32,
    pub price: f64,
    pub placed_at: DateTime<Utc>,
    /// Human-readable confirmation shown to the user
    pub message: String,
}

/// Validate the request and produce a confirmation.
///
/// Quantity must be at least one lot and the reference price a real,
/// positive number. Given that, placement always succeeds; there is no
/// rejection, matching, or partial fill model.
pub fn place_order(request: &OrderRequest) -> Result<OrderConfirmation> {
    if request.quantity == 0 {
        return Err(DashboardError::input("quantity must be at least 1 lot"));
    }

    if !request.price.is_finite() || request.price <= 0.0 {
        return Err(DashboardError::input(format!(
            "reference price {} is not a tradable price",
            request.price
        )));
    }

    let message = format!(
        "Placed a {} order for {} lots of {} at {:.2} each.",
        request.side, request.quantity, request.symbol, request.price
    );

    Ok(OrderConfirmation {
        id: Uuid::new_v4(),
        symbol: request.symbol.clone(),
        side: request.side,
        quantity: request.quantity,
        price: request.price,
        placed_at: Utc::now(),
        message,
    })
}

/// Submit an order against live data: validate the quantity, fetch a fresh
/// last price for the symbol, then simulate the placement.
///
/// Invalid input never triggers a fetch; a failed price fetch fails the
/// order. The snapshot cache is never consulted for the price.
pub async fn submit<S: QuoteSource>(
    source: &S,
    spec: &SymbolSpec,
    side: Side,
    quantity: u32,
) -> Result<OrderConfirmation> {
    if quantity == 0 {
        return Err(DashboardError::input("quantity must be at least 1 lot"));
    }

    let price = source.fetch_last_price(&spec.symbol).await?;
    let confirmation = place_order(&OrderRequest {
        symbol: spec.symbol.clone(),
        side,
        quantity,
        price,
    })?;

    tracing::info!(
        order_id = %confirmation.id,
        symbol = %confirmation.symbol,
        side = %confirmation.side,
        lots = confirmation.quantity,
        price = confirmation.price,
        "Simulated order placed"
    );

    Ok(confirmation)
}

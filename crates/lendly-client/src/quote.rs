//! # Quotes
//!
//! A price shown before submission, and the price the backend actually charges.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quote::estimate(product, selection)                                    │
//! │     estimate = subtotal(selection, tiers)        (client side)          │
//! │     suggestion = cheapest tier for the days      (display only)         │
//! │  quote.with_span(days)                                                  │
//! │     backend_units() = ceil(span / tier unit)     (what backend bills)   │
//! │              │                                                          │
//! │              ▼  rental request accepted                                 │
//! │  quote.confirm(backend_total)                                           │
//! │     payable()    = backend_total                 (authoritative)        │
//! │     divergence() = backend_total - estimate      (logged, never hidden) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lendly_core::pricing::{backend_quantity, optimal_rental_type, subtotal};
use lendly_core::{Money, OptimalRentalInfo, RentalProduct, RentalSelection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::RentalDataSource;
use crate::error::ClientResult;

/// Price of one rental request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub product_id: String,
    pub selection: RentalSelection,
    /// What the client computed from the product's price tiers.
    pub estimate: Money,
    /// A cheaper tier for the same days, when one exists.
    pub suggestion: Option<OptimalRentalInfo>,
    /// Days between the chosen start and end dates, when known.
    ///
    /// The backend bills tiers from this span, not from the picked quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_days: Option<i64>,
    /// What the backend will charge, once it has answered.
    pub backend_total: Option<Money>,
}

impl Quote {
    /// Prices `selection` against `product`'s tiers.
    pub fn estimate(product: &RentalProduct, selection: RentalSelection) -> ClientResult<Self> {
        let tiers = product.price_tiers();
        tiers.validate()?;

        let suggestion = match selection {
            RentalSelection::Days { days } => {
                Some(optimal_rental_type(days, &tiers)).filter(|info| info.has_discount())
            }
            RentalSelection::Quantity { .. } => None,
        };

        Ok(Quote {
            product_id: product.id.clone(),
            selection,
            estimate: subtotal(selection, &tiers),
            suggestion,
            span_days: None,
            backend_total: None,
        })
    }

    /// Attaches the day count of the chosen date range.
    pub fn with_span(mut self, days: i64) -> Self {
        self.span_days = Some(days.max(0));
        self
    }

    /// Records the backend's total. Any difference from the estimate is logged.
    pub fn confirm(&mut self, backend_total: Money) {
        self.backend_total = Some(backend_total);

        match self.divergence() {
            Some(diff) => warn!(
                product_id = %self.product_id,
                estimate = %self.estimate,
                backend_total = %backend_total,
                diff = %diff,
                backend_units = ?self.backend_units(),
                "Backend total differs from client estimate"
            ),
            None => info!(product_id = %self.product_id, total = %backend_total, "Quote confirmed"),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.backend_total.is_some()
    }

    /// The amount to charge: the backend total when known, else the estimate.
    pub fn payable(&self) -> Money {
        self.backend_total.unwrap_or(self.estimate)
    }

    /// `backend_total - estimate`, or `None` when unconfirmed or equal.
    pub fn divergence(&self) -> Option<Money> {
        self.backend_total
            .map(|total| total - self.estimate)
            .filter(|diff| !diff.is_zero())
    }

    /// Tier units the backend bills for the date span: `ceil(span / unit)`.
    ///
    /// `None` until [`Quote::with_span`] supplies the span. A picked quantity
    /// that disagrees with this count is the usual cause of a divergence.
    pub fn backend_units(&self) -> Option<i64> {
        let span = self.span_days?;
        Some(match self.selection {
            RentalSelection::Days { .. } => span,
            RentalSelection::Quantity { rental_type, .. } => backend_quantity(rental_type, span),
        })
    }
}

/// Fetches a product and prices `selection` against it.
pub async fn quote_product<S: RentalDataSource>(
    source: &S,
    product_id: &str,
    selection: RentalSelection,
) -> ClientResult<Quote> {
    let product = source.product(product_id).await?;
    Quote::estimate(&product, selection)
}

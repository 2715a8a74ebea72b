//! Order construction from validated signal parts.

use tracing::debug;
use tvb_core::{
    ActionMapping, ClientOrderId, CoreError, CoreResult, NormalizedOrder, OrderType, Scalar, Size,
};

use crate::config::OrderProfile;

/// Builds exchange-schema-valid orders from a deployment profile.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    profile: OrderProfile,
}

impl OrderBuilder {
    pub fn new(profile: OrderProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &OrderProfile {
        &self.profile
    }

    /// Resolve the order size from the raw signal amount.
    ///
    /// A missing amount uses the profile default. A present amount must parse
    /// to a finite decimal greater than zero.
    pub fn resolve_size(&self, amount: Option<&Scalar>) -> CoreResult<Size> {
        let Some(raw) = amount else {
            debug!(size = %self.profile.default_size, "No amount in signal, using default size");
            return Ok(self.profile.default_size);
        };

        match Size::parse(&raw.as_text()) {
            Some(size) if size.is_positive() => Ok(size),
            _ => Err(CoreError::InvalidAmount(format!(
                "amount '{raw}' must be a positive number"
            ))),
        }
    }

    /// Assemble a complete order.
    ///
    /// # Errors
    /// `InvalidAmount` if the amount is present but not a positive number,
    /// `InvalidOrder` if a required field would be empty.
    pub fn build(
        &self,
        symbol: String,
        mapping: ActionMapping,
        amount: Option<&Scalar>,
        now_ms: i64,
    ) -> CoreResult<NormalizedOrder> {
        let size = self.resolve_size(amount)?;

        let order = NormalizedOrder {
            symbol,
            product_type: self.profile.product_type.clone(),
            margin_mode: self.profile.margin_mode.clone(),
            margin_coin: self.profile.margin_coin.clone(),
            size,
            side: mapping.side,
            trade_side: mapping.trade_side,
            order_type: OrderType::Market,
            client_oid: ClientOrderId::at(now_ms),
            reduce_only: mapping.reduce_only,
        };
        order.validate()?;

        Ok(order)
    }
}

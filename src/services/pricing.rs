//! Checkout pricing: shipping and tax on top of the cart subtotal.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Orders with a subtotal strictly above this ship for free
    pub free_shipping_threshold: f64,
    pub shipping_fee: f64,
    /// Fraction of the subtotal, e.g. `0.08`
    pub tax_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 50.0,
            shipping_fee: 4.99,
            tax_rate: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub total: f64,
}

impl PricingPolicy {
    /// Every component is rounded to cents before summing, so
    /// `total == subtotal + shipping_cost + tax` holds exactly.
    pub fn quote(&self, subtotal: f64) -> OrderTotals {
        let subtotal = round_money(subtotal);
        let shipping_cost = if subtotal > self.free_shipping_threshold {
            0.0
        } else {
            round_money(self.shipping_fee)
        };
        let tax = round_money(subtotal * self.tax_rate);

        OrderTotals {
            subtotal,
            shipping_cost,
            tax,
            total: round_money(subtotal + shipping_cost + tax),
        }
    }
}

pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

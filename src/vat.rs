//! Flat-rate VAT: add tax to a net amount or extract it from a gross amount

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, require_finite, CalcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// Amount is net of VAT
    Add,
    /// Amount already includes VAT
    Remove,
}

/// Net / VAT / gross split of an amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    pub mode: VatMode,
    pub rate_percent: f64,
    pub net: f64,
    pub vat: f64,
    pub gross: f64,
}

fn validate(amount: f64, rate_percent: f64) -> Result<()> {
    require_finite(amount, "amount")?;
    require_finite(rate_percent, "rate_percent")?;
    if amount <= 0.0 {
        return Err(CalcError::invalid("amount", "must be greater than zero"));
    }
    if rate_percent < 0.0 {
        return Err(CalcError::invalid("rate_percent", "must not be negative"));
    }
    Ok(())
}

/// Add VAT at `rate_percent` to a net amount
pub fn add_vat(net: f64, rate_percent: f64) -> Result<VatBreakdown> {
    validate(net, rate_percent)?;
    let vat = ensure_finite(net * rate_percent / 100.0, "vat amount")?;
    Ok(VatBreakdown {
        mode: VatMode::Add,
        rate_percent,
        net,
        vat,
        gross: ensure_finite(net + vat, "gross amount")?,
    })
}

/// Work backwards from a VAT-inclusive amount
pub fn remove_vat(gross: f64, rate_percent: f64) -> Result<VatBreakdown> {
    validate(gross, rate_percent)?;
    let net = gross / (1.0 + rate_percent / 100.0);
    Ok(VatBreakdown {
        mode: VatMode::Remove,
        rate_percent,
        net,
        vat: gross - net,
        gross,
    })
}

pub fn calculate_vat(mode: VatMode, amount: f64, rate_percent: f64) -> Result<VatBreakdown> {
    match mode {
        VatMode::Add => add_vat(amount, rate_percent),
        VatMode::Remove => remove_vat(amount, rate_percent),
    }
}

use crate::error::{CheckoutError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Preset contribution amounts offered on the form, in whole rupees.
pub const PRESET_AMOUNTS: [u32; 3] = [1000, 2500, 4000];
pub const DEFAULT_PRESET: u32 = 1000;

/// Tip percentages offered on top of the contribution.
pub const TIP_PERCENTS: [u32; 4] = [0, 5, 10, 18];
pub const DEFAULT_TIP: u32 = 0;

/// All rounding in the checkout is half-up; every amount is positive, so
/// "away from zero" and "up" coincide.
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// A positive contribution base, either a preset or a parsed custom amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::InvalidAmount(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// The contribution total: base plus tip, held at two fraction digits.
///
/// A `Total` always fits the integer amount the order endpoint expects, so
/// [`Total::rounded_units`] cannot fail once the value exists.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Total {
    value: Decimal,
    units: u64,
}

impl Total {
    fn new(value: Decimal) -> Result<Self> {
        let value = value.round_dp_with_strategy(2, ROUNDING);
        let units = value
            .round_dp_with_strategy(0, ROUNDING)
            .to_u64()
            .ok_or_else(|| {
                CheckoutError::InvalidAmount(format!("Total {value} is out of range"))
            })?;
        Ok(Self { value, units })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Nearest whole currency unit; this is what the order endpoint receives.
    pub fn rounded_units(&self) -> u64 {
        self.units
    }
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut padded = self.value;
        padded.rescale(2);
        write!(f, "{padded}")
    }
}

/// What the contributor picked: a preset, an optional custom override and a tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionSelection {
    preset: u32,
    custom_amount: String,
    tip_percent: u32,
}

impl Default for ContributionSelection {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET,
            custom_amount: String::new(),
            tip_percent: DEFAULT_TIP,
        }
    }
}

impl ContributionSelection {
    pub fn new(preset: u32, custom_amount: &str, tip_percent: u32) -> Result<Self> {
        let mut selection = Self::default();
        selection.select_preset(preset)?;
        selection.set_custom_amount(custom_amount);
        selection.set_tip(tip_percent)?;
        Ok(selection)
    }

    pub fn preset(&self) -> u32 {
        self.preset
    }

    pub fn custom_amount(&self) -> &str {
        &self.custom_amount
    }

    pub fn tip_percent(&self) -> u32 {
        self.tip_percent
    }

    /// Picks one of [`PRESET_AMOUNTS`]. Any custom amount is discarded.
    pub fn select_preset(&mut self, preset: u32) -> Result<()> {
        if !PRESET_AMOUNTS.contains(&preset) {
            return Err(CheckoutError::InvalidAmount(format!(
                "{preset} is not an offered preset"
            )));
        }
        self.preset = preset;
        self.custom_amount.clear();
        Ok(())
    }

    /// Switches to "other amount" entry with an empty field.
    pub fn choose_other(&mut self) {
        self.custom_amount.clear();
    }

    pub fn set_custom_amount(&mut self, raw: &str) {
        self.custom_amount = raw.trim().to_string();
    }

    pub fn set_tip(&mut self, tip_percent: u32) -> Result<()> {
        if !TIP_PERCENTS.contains(&tip_percent) {
            return Err(CheckoutError::InvalidAmount(format!(
                "{tip_percent}% is not an offered tip"
            )));
        }
        self.tip_percent = tip_percent;
        Ok(())
    }

    /// Whether a custom amount overrides the preset.
    pub fn custom_active(&self) -> bool {
        !self.custom_amount.is_empty()
    }

    /// Whether `preset` should render as the selected option.
    pub fn is_highlighted(&self, preset: u32) -> bool {
        !self.custom_active() && self.preset == preset
    }

    /// The base amount before tip.
    ///
    /// A custom amount that is not a positive decimal is rejected here rather
    /// than being carried into the total.
    pub fn base(&self) -> Result<Amount> {
        if !self.custom_active() {
            return Amount::new(Decimal::from(self.preset));
        }
        let parsed = Decimal::from_str(&self.custom_amount).map_err(|_| {
            CheckoutError::InvalidAmount(format!("'{}' is not a number", self.custom_amount))
        })?;
        Amount::new(parsed)
    }

    /// Tip value for `tip_percent` applied to the current base, for display
    /// next to each tip option.
    pub fn tip_preview(&self, tip_percent: u32) -> Result<Decimal> {
        tip_for(self.base()?, tip_percent)
    }
}

fn out_of_range(base: Amount) -> CheckoutError {
    CheckoutError::InvalidAmount(format!("{} is out of range", base.value()))
}

fn tip_for(base: Amount, tip_percent: u32) -> Result<Decimal> {
    base.value()
        .checked_mul(Decimal::from(tip_percent))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| out_of_range(base))
}

/// Computes base plus tip for a selection.
///
/// Amounts too large to carry a tip, or to fit the order endpoint's integer
/// amount, are rejected as `InvalidAmount`.
pub fn compute_total(selection: &ContributionSelection) -> Result<Total> {
    let base = selection.base()?;
    let tip = tip_for(base, selection.tip_percent)?;
    let total = base.value().checked_add(tip).ok_or_else(|| out_of_range(base))?;
    Total::new(total)
}

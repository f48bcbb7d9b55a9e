#![forbid(unsafe_code)]

//! Visual tuning state.
//!
//! Only opacity is bounded (`[0, 1]`). Every other parameter accepts any
//! finite value; the UI may clamp its sliders, but the core propagates what
//! it is given. Non-finite values are refused by [`AdjustmentState::set`].

use std::fmt;

/// Per-channel multipliers applied after contrast and brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorBalance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorBalance {
    pub const NEUTRAL: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
}

impl Default for ColorBalance {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Identifies one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdjustmentKey {
    Opacity,
    Brightness,
    Contrast,
    Saturation,
    ColorBalanceR,
    ColorBalanceG,
    ColorBalanceB,
}

impl AdjustmentKey {
    pub const ALL: [Self; 7] = [
        Self::Opacity,
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::ColorBalanceR,
        Self::ColorBalanceG,
        Self::ColorBalanceB,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::ColorBalanceR => "color_balance_r",
            Self::ColorBalanceG => "color_balance_g",
            Self::ColorBalanceB => "color_balance_b",
        }
    }
}

impl fmt::Display for AdjustmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected adjustment edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentError {
    NonFinite { key: AdjustmentKey, value: f64 },
}

impl fmt::Display for AdjustmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { key, value } => write!(f, "{key} must be finite, got {value}"),
        }
    }
}

impl std::error::Error for AdjustmentError {}

/// Image adjustments, applied by the pipeline in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdjustmentState {
    pub opacity: f64,
    /// Additive offset in normalized channel units.
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub color_balance: ColorBalance,
}

impl AdjustmentState {
    /// The identity adjustment.
    pub const NEUTRAL: Self = Self {
        opacity: 1.0,
        brightness: 0.0,
        contrast: 1.0,
        saturation: 1.0,
        color_balance: ColorBalance::NEUTRAL,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::NEUTRAL
    }

    /// Set opacity, clamped to `[0, 1]`. Non-finite input is ignored.
    #[must_use]
    pub fn with_opacity(&self, opacity: f64) -> Self {
        if !opacity.is_finite() {
            return *self;
        }
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            ..*self
        }
    }

    /// Return a copy with `key` set to `value`.
    pub fn set(&self, key: AdjustmentKey, value: f64) -> Result<Self, AdjustmentError> {
        if !value.is_finite() {
            return Err(AdjustmentError::NonFinite { key, value });
        }
        let mut next = *self;
        match key {
            AdjustmentKey::Opacity => next.opacity = value.clamp(0.0, 1.0),
            AdjustmentKey::Brightness => next.brightness = value,
            AdjustmentKey::Contrast => next.contrast = value,
            AdjustmentKey::Saturation => next.saturation = value,
            AdjustmentKey::ColorBalanceR => next.color_balance.r = value,
            AdjustmentKey::ColorBalanceG => next.color_balance.g = value,
            AdjustmentKey::ColorBalanceB => next.color_balance.b = value,
        }
        Ok(next)
    }

    /// Current value of `key`.
    #[must_use]
    pub fn get(&self, key: AdjustmentKey) -> f64 {
        match key {
            AdjustmentKey::Opacity => self.opacity,
            AdjustmentKey::Brightness => self.brightness,
            AdjustmentKey::Contrast => self.contrast,
            AdjustmentKey::Saturation => self.saturation,
            AdjustmentKey::ColorBalanceR => self.color_balance.r,
            AdjustmentKey::ColorBalanceG => self.color_balance.g,
            AdjustmentKey::ColorBalanceB => self.color_balance.b,
        }
    }

    /// Back to neutral.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::NEUTRAL
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// All fields are finite and opacity is in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        AdjustmentKey::ALL.iter().all(|k| self.get(*k).is_finite())
            && (0.0..=1.0).contains(&self.opacity)
    }
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

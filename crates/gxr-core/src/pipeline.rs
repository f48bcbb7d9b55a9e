#![forbid(unsafe_code)]

//! The canonical adjustment pipeline.
//!
//! One per-pixel formula, applied in this order by every backend:
//!
//! 1. desaturate toward Rec.601 luminance: `mix(luma, c, saturation)`
//! 2. contrast: `(c - 0.5) * contrast + 0.5`
//! 3. brightness, additive: `c + brightness`
//! 4. colour balance: `c * balance[channel]`
//! 5. alpha: `a * opacity`
//!
//! Intermediate values are never clamped. [`AdjustmentPipeline::apply_rgba8`] clamps once, on
//! output.
//!
//! A backend that cannot reproduce a stage exactly reports it through its
//! [`BackendFidelity`] instead of reordering or dropping it silently.

use std::fmt;

use bitflags::bitflags;

use crate::adjustment::AdjustmentState;

/// Rec.601 luma weights used by the saturation stage.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

bitflags! {
    /// Pipeline stages, in application order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Stages: u8 {
        const SATURATION    = 0b0_0001;
        const CONTRAST      = 0b0_0010;
        const BRIGHTNESS    = 0b0_0100;
        const COLOR_BALANCE = 0b0_1000;
        const OPACITY       = 0b1_0000;
    }
}

/// How faithfully a backend reproduces the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendFidelity {
    /// Stages reproduced with the exact formula.
    pub exact: Stages,
    /// Stages reproduced with a different formula.
    pub approximated: Stages,
    /// Stages the backend cannot express and skips.
    pub unsupported: Stages,
}

impl BackendFidelity {
    pub const EXACT: Self = Self {
        exact: Stages::all(),
        approximated: Stages::empty(),
        unsupported: Stages::empty(),
    };

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.exact == Stages::all()
    }

    /// Stages whose result can differ from the canonical formula.
    #[must_use]
    pub fn deviations(&self) -> Stages {
        self.approximated | self.unsupported
    }
}

/// The render backends that consume adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// CPU path ([`AdjustmentPipeline`]).
    Cpu,
    /// AR / WebGL fragment shader fed by [`ShaderUniforms`].
    Shader,
    /// 2D overlay styled with a [`CssFilter`].
    CssFilter,
}

impl Backend {
    #[must_use]
    pub const fn fidelity(self) -> BackendFidelity {
        match self {
            Self::Cpu | Self::Shader => BackendFidelity::EXACT,
            Self::CssFilter => CssFilter::FIDELITY,
        }
    }
}

// ---------------------------------------------------------------------------
// CPU pipeline
// ---------------------------------------------------------------------------

/// Linear RGBA, nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Adjustment coefficients resolved to `f32` for per-pixel use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentPipeline {
    saturation: f32,
    contrast: f32,
    brightness: f32,
    balance: [f32; 3],
    opacity: f32,
}

impl AdjustmentPipeline {
    #[must_use]
    pub fn new(adjustments: &AdjustmentState) -> Self {
        Self {
            saturation: adjustments.saturation as f32,
            contrast: adjustments.contrast as f32,
            brightness: adjustments.brightness as f32,
            balance: [
                adjustments.color_balance.r as f32,
                adjustments.color_balance.g as f32,
                adjustments.color_balance.b as f32,
            ],
            opacity: adjustments.opacity as f32,
        }
    }

    /// Apply all five stages to one pixel. No clamping.
    #[must_use]
    pub fn apply_pixel(&self, px: Rgba) -> Rgba {
        let mut c = [px.r, px.g, px.b];
        let luma = c[0] * LUMA_WEIGHTS[0] + c[1] * LUMA_WEIGHTS[1] + c[2] * LUMA_WEIGHTS[2];
        for (i, v) in c.iter_mut().enumerate() {
            let mut x = luma + (*v - luma) * self.saturation;
            x = (x - 0.5) * self.contrast + 0.5;
            x += self.brightness;
            x *= self.balance[i];
            *v = x;
        }
        Rgba::new(c[0], c[1], c[2], px.a * self.opacity)
    }

    /// Apply in place to tightly packed RGBA8 pixels. A trailing partial
    /// pixel is left untouched.
    pub fn apply_rgba8(&self, pixels: &mut [u8]) {
        for px in pixels.chunks_exact_mut(4) {
            let out = self.apply_pixel(Rgba::new(
                f32::from(px[0]) / 255.0,
                f32::from(px[1]) / 255.0,
                f32::from(px[2]) / 255.0,
                f32::from(px[3]) / 255.0,
            ));
            px[0] = to_u8(out.r);
            px[1] = to_u8(out.g);
            px[2] = to_u8(out.b);
            px[3] = to_u8(out.a);
        }
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Shader backend
// ---------------------------------------------------------------------------

/// Uniform block for [`FRAGMENT_SHADER`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    pub opacity: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub color_balance: [f32; 3],
}

impl ShaderUniforms {
    #[must_use]
    pub fn new(adjustments: &AdjustmentState) -> Self {
        let p = AdjustmentPipeline::new(adjustments);
        Self {
            opacity: p.opacity,
            brightness: p.brightness,
            contrast: p.contrast,
            saturation: p.saturation,
            color_balance: p.balance,
        }
    }
}

/// GLSL ES fragment shader implementing the pipeline with [`ShaderUniforms`].
pub const FRAGMENT_SHADER: &str = r"
uniform sampler2D uTexture;
uniform float uOpacity;
uniform float uBrightness;
uniform float uContrast;
uniform float uSaturation;
uniform vec3 uColorBalance;
varying vec2 vUv;

void main() {
    vec4 tex = texture2D(uTexture, vUv);
    vec3 c = tex.rgb;
    vec3 gray = vec3(dot(c, vec3(0.299, 0.587, 0.114)));
    c = mix(gray, c, uSaturation);
    c = (c - 0.5) * uContrast + 0.5;
    c += uBrightness;
    c *= uColorBalance;
    gl_FragColor = vec4(c, tex.a * uOpacity);
}
";

// ---------------------------------------------------------------------------
// CSS filter backend
// ---------------------------------------------------------------------------

/// Coarse approximation using CSS filter functions.
///
/// CSS has no additive brightness and no per-channel multiply, so those
/// stages are omitted and reported as unsupported. `saturate()` uses Rec.709
/// weights, so saturation is approximate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssFilter {
    pub saturate: f64,
    pub contrast: f64,
    pub opacity: f64,
}

impl CssFilter {
    pub const FIDELITY: BackendFidelity = BackendFidelity {
        exact: Stages::CONTRAST.union(Stages::OPACITY),
        approximated: Stages::SATURATION,
        unsupported: Stages::BRIGHTNESS.union(Stages::COLOR_BALANCE),
    };

    #[must_use]
    pub fn new(adjustments: &AdjustmentState) -> Self {
        Self {
            saturate: adjustments.saturation.max(0.0),
            contrast: adjustments.contrast.max(0.0),
            opacity: adjustments.opacity,
        }
    }

    /// Stages of `adjustments` this filter would render incorrectly:
    /// unsupported stages whose value is not neutral, plus approximated ones
    /// in use.
    #[must_use]
    pub fn lossy_stages(adjustments: &AdjustmentState) -> Stages {
        let mut lossy = Stages::empty();
        if adjustments.brightness != 0.0 {
            lossy |= Stages::BRIGHTNESS;
        }
        let balance = adjustments.color_balance;
        if balance.r != 1.0 || balance.g != 1.0 || balance.b != 1.0 {
            lossy |= Stages::COLOR_BALANCE;
        }
        if adjustments.saturation != 1.0 {
            lossy |= Stages::SATURATION;
        }
        lossy
    }
}

impl fmt::Display for CssFilter {
    /// The `filter` property value (opacity is applied separately as the
    /// element's `opacity`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "saturate({}) contrast({})", self.saturate, self.contrast)
    }
}

/// Row-major 3x3 colour matrix.
pub type Mat3 = [f32; 9];

pub const IDENTITY: Mat3 = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

// Luma weights used by the compositor filter matrices (Filter Effects 1,
// rounded Rec. 709).
const LR: f32 = 0.213;
const LG: f32 = 0.715;
const LB: f32 = 0.072;

/// Rec. 709 relative luminance of a display-encoded pixel.
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

pub fn apply_mat3(m: &Mat3, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (
        m[0] * r + m[1] * g + m[2] * b,
        m[3] * r + m[4] * g + m[5] * b,
        m[6] * r + m[7] * g + m[8] * b,
    )
}

pub fn is_identity(m: &Mat3) -> bool {
    m.iter().zip(IDENTITY.iter()).all(|(a, b)| (a - b).abs() < 1e-6)
}

/// `saturate(s)`: 0 is grayscale, 1 is identity, >1 oversaturates.
pub fn saturate_matrix(s: f32) -> Mat3 {
    [
        LR + (1.0 - LR) * s,
        LG - LG * s,
        LB - LB * s,
        LR - LR * s,
        LG + (1.0 - LG) * s,
        LB - LB * s,
        LR - LR * s,
        LG - LG * s,
        LB + (1.0 - LB) * s,
    ]
}

/// `sepia(amount)`, amount clamped to [0, 1].
pub fn sepia_matrix(amount: f32) -> Mat3 {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    [
        0.393 + 0.607 * inv,
        0.769 - 0.769 * inv,
        0.189 - 0.189 * inv,
        0.349 - 0.349 * inv,
        0.686 + 0.314 * inv,
        0.168 - 0.168 * inv,
        0.272 - 0.272 * inv,
        0.534 - 0.534 * inv,
        0.131 + 0.869 * inv,
    ]
}

/// Luminance-preserving hue rotation by `degrees`.
pub fn hue_rotate_matrix(degrees: f32) -> Mat3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        LR + cos * (1.0 - LR) - sin * LR,
        LG - cos * LG - sin * LG,
        LB - cos * LB + sin * (1.0 - LB),
        LR - cos * LR + sin * 0.143,
        LG + cos * (1.0 - LG) + sin * 0.140,
        LB - cos * LB - sin * 0.283,
        LR - cos * LR - sin * (1.0 - LR),
        LG - cos * LG + sin * LG,
        LB + cos * (1.0 - LB) + sin * LB,
    ]
}

/// `hsl(hue, s, l)` to RGB in [0, 1]. Hue in degrees, wraps.
pub fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r + m, g + m, b + m)
}

/// Overlay blend of `source` onto `backdrop`, both in [0, 1].
pub fn blend_overlay(backdrop: f32, source: f32) -> f32 {
    if backdrop <= 0.5 {
        2.0 * backdrop * source
    } else {
        1.0 - 2.0 * (1.0 - backdrop) * (1.0 - source)
    }
}

/// Soft-light blend (W3C compositing definition).
pub fn blend_soft_light(backdrop: f32, source: f32) -> f32 {
    if source <= 0.5 {
        backdrop - (1.0 - 2.0 * source) * backdrop * (1.0 - backdrop)
    } else {
        let d = if backdrop <= 0.25 {
            ((16.0 * backdrop - 12.0) * backdrop + 4.0) * backdrop
        } else {
            backdrop.sqrt()
        };
        backdrop + (2.0 * source - 1.0) * (d - backdrop)
    }
}

pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

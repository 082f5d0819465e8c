//! Packed `0xAARRGGBB` colours, the same layout the framebuffer stores.

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

pub const fn channels(c: u32) -> (u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

pub const WHITE: u32 = rgb(255, 255, 255);
pub const BLACK: u32 = rgb(0, 0, 0);

/// Dark fade fill laid over the canvas each frame.
pub const FADE: u32 = rgb(5, 5, 8);

/// Seven-step rainbow used for colour cycling.
pub const RAINBOW: [u32; 7] = [
    0xFFFF0000, 0xFFFF7F00, 0xFFFFFF00, 0xFF00FF00, 0xFF0000FF, 0xFF4B0082, 0xFF9400D3,
];

/// Linear blend `a → b` by `t ∈ [0, 1]`; result is opaque.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF00_0000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Rainbow entry for a time-driven cycle: `floor((t·2 + offset) mod 7)`.
pub fn rainbow_at(time_s: f64, offset: f64) -> u32 {
    let idx = (time_s * 2.0 + offset).rem_euclid(RAINBOW.len() as f64).floor() as usize;
    RAINBOW[idx.min(RAINBOW.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_packs_opaque() {
        assert_eq!(rgb(0x12, 0x34, 0x56), 0xFF123456);
        assert_eq!(channels(0xFF123456), (0x12, 0x34, 0x56));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(BLACK, WHITE, 0.0), BLACK);
        assert_eq!(blend(BLACK, WHITE, 1.0), WHITE);
        assert_eq!(blend(BLACK, WHITE, 7.0), WHITE);
        assert_eq!(channels(blend(BLACK, WHITE, 0.5)).0, 128);
    }

    #[test]
    fn rainbow_cycles_every_three_and_a_half_seconds() {
        assert_eq!(rainbow_at(0.0, 0.0), RAINBOW[0]);
        assert_eq!(rainbow_at(0.5, 0.0), RAINBOW[1]);
        assert_eq!(rainbow_at(3.5, 0.0), RAINBOW[0]);
        assert_eq!(rainbow_at(0.0, 1.0), RAINBOW[1]);
    }
}

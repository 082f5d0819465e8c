//! Fixed colour palettes. A particle's colour is always drawn from the
//! palette of the theme that was active when it was (re)coloured.

use rand::Rng;

#[derive(Debug)]
pub struct Theme {
    pub name:   &'static str,
    pub colors: &'static [u32],
}

pub const THEMES: [Theme; 7] = [
    Theme { name: "Rainbow", colors: &[0xFFFF0000, 0xFFFF7F00, 0xFFFFFF00, 0xFF00FF00, 0xFF0000FF, 0xFF4B0082, 0xFF9400D3] },
    Theme { name: "Fire",    colors: &[0xFFFF0000, 0xFFFF4400, 0xFFFF8800, 0xFFFFCC00, 0xFFFFFF00, 0xFFFF6600] },
    Theme { name: "Ocean",   colors: &[0xFF001A33, 0xFF003366, 0xFF004C99, 0xFF0066CC, 0xFF0099FF, 0xFF00CCFF, 0xFF66FFFF] },
    Theme { name: "Galaxy",  colors: &[0xFF1A0033, 0xFF330066, 0xFF4D0099, 0xFF6600CC, 0xFF9933FF, 0xFFCC66FF, 0xFFFF99FF] },
    Theme { name: "Matrix",  colors: &[0xFF003300, 0xFF004400, 0xFF006600, 0xFF008800, 0xFF00AA00, 0xFF00CC00, 0xFF00FF00] },
    Theme { name: "White",   colors: &[0xFFFFFFFF, 0xFFF0F0F0, 0xFFE8E8E8, 0xFFD8D8D8, 0xFFC8C8C8] },
    Theme { name: "Mercury", colors: &[0xFF4A4A4A, 0xFF5C5C5C, 0xFF3D3D3D, 0xFF6E6E6E, 0xFF2F2F2F, 0xFF505050] },
];

pub const RAINBOW_THEME: usize = 0;
pub const FIRE_THEME:    usize = 1;
pub const OCEAN_THEME:   usize = 2;
pub const GALAXY_THEME:  usize = 3;
pub const MATRIX_THEME:  usize = 4;
pub const MERCURY_THEME: usize = 6;

pub fn theme_count() -> usize {
    THEMES.len()
}

pub fn is_valid_theme(index: usize) -> bool {
    index < THEMES.len()
}

/// Theme by index; out-of-range wraps.
pub fn theme(index: usize) -> &'static Theme {
    &THEMES[index % THEMES.len()]
}

/// Uniform pick from the palette of `index`.
pub fn pick_color<R: Rng + ?Sized>(index: usize, rng: &mut R) -> u32 {
    let colors = theme(index).colors;
    colors[rng.random_range(0..colors.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_stay_in_palette() {
        let mut rng = StdRng::seed_from_u64(3);
        for t in 0..theme_count() {
            for _ in 0..50 {
                assert!(theme(t).colors.contains(&pick_color(t, &mut rng)));
            }
        }
    }

    #[test]
    fn index_wraps() {
        assert_eq!(theme(7).name, "Rainbow");
        assert!(!is_valid_theme(7));
        assert_eq!(theme(MERCURY_THEME).name, "Mercury");
    }
}

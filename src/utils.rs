use image::{Rgba, RgbaImage};

/// Edge length of the generated tray icon in pixels.
pub const ICON_SIZE: u32 = 32;

/// Detects if the system is using light mode.
pub fn is_light_mode() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Light) => true,
        Ok(dark_light::Mode::Unspecified) => {
            // Default to dark mode (white icon) when unspecified
            false
        }
        Ok(dark_light::Mode::Dark) => false,
        Err(_) => {
            // On error, default to dark mode (white icon)
            false
        }
    }
}

/// Draws the tray icon: a white check mark inside a box, on transparency.
pub fn render_icon(size: u32) -> RgbaImage {
    let s = size as f32;
    let stroke = (s / 16.0).max(1.0);
    let inset = s * 0.1;
    let check = [
        (0.28 * s, 0.52 * s),
        (0.44 * s, 0.68 * s),
        (0.74 * s, 0.32 * s),
    ];

    RgbaImage::from_fn(size, size, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);

        let dx = (px - inset).min(s - inset - px);
        let dy = (py - inset).min(s - inset - py);
        let on_border = dx >= 0.0 && dy >= 0.0 && dx.min(dy) < stroke;

        let on_check = check
            .windows(2)
            .any(|seg| segment_distance((px, py), seg[0], seg[1]) < stroke * 1.2);

        if on_border || on_check {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Creates an inverted (dark) version of the icon for light mode.
/// Preserves alpha channel while inverting RGB values.
pub fn create_dark_icon(image: &RgbaImage) -> RgbaImage {
    let mut dark = image.clone();
    for pixel in dark.pixels_mut() {
        pixel[0] = 255 - pixel[0];
        pixel[1] = 255 - pixel[1];
        pixel[2] = 255 - pixel[2];
    }
    dark
}

/// Tray icon matching the current desktop theme.
pub fn themed_icon() -> RgbaImage {
    let icon = render_icon(ICON_SIZE);
    if is_light_mode() {
        tracing::debug!("Light mode detected, using dark tray icon");
        create_dark_icon(&icon)
    } else {
        tracing::debug!("Dark mode detected, using light tray icon");
        icon
    }
}

/// Converts RGBA pixels to the ARGB32 layout used by StatusNotifierItem.
pub fn to_argb(image: &RgbaImage) -> Vec<u8> {
    let mut argb = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        argb.extend_from_slice(&[pixel[3], pixel[0], pixel[1], pixel[2]]);
    }
    argb
}

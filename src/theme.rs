use gpui::*;

#[cfg(target_os = "macos")]
use objc2::rc::Retained;
#[cfg(target_os = "macos")]
use objc2_app_kit::NSColor;

/// Catppuccin Mocha plus status colors for the footer and buttons
pub struct Theme {
    pub text: Rgba,
    pub subtext1: Rgba,
    pub subtext0: Rgba,
    pub overlay1: Rgba,
    pub surface1: Rgba,
    pub surface0: Rgba,
    pub base: Rgba,
    pub mantle: Rgba,
    pub accent: Rgba,
    pub success: Rgba,
    pub warning: Rgba,
    pub error: Rgba,
}

impl Global for Theme {}

#[cfg(target_os = "macos")]
fn system_accent_color() -> Rgba {
    let accent: Retained<NSColor> = NSColor::controlAccentColor();
    let srgb = accent.colorUsingColorSpace(objc2_app_kit::NSColorSpace::sRGBColorSpace().as_ref());
    match srgb {
        Some(color) => {
            let channel = |c: f64| ((c as f32).clamp(0.0, 1.0) * 255.0) as u32;
            rgba(
                channel(color.redComponent()) << 24
                    | channel(color.greenComponent()) << 16
                    | channel(color.blueComponent()) << 8
                    | channel(color.alphaComponent()),
            )
        }
        None => rgb(0x89b4fa),
    }
}

#[cfg(not(target_os = "macos"))]
fn system_accent_color() -> Rgba {
    rgb(0x89b4fa)
}

impl Theme {
    pub fn init(app: &mut App) {
        app.set_global(Theme::mocha());
    }

    pub fn mocha() -> Theme {
        Theme {
            text: rgb(0xcdd6f4),
            subtext1: rgb(0xbac2de),
            subtext0: rgb(0xa6adc8),
            overlay1: rgb(0x7f849c),
            surface1: rgb(0x45475a),
            surface0: rgb(0x313244),
            base: rgb(0x1e1e2e),
            mantle: rgb(0x181825),
            accent: system_accent_color(),
            success: rgb(0xa6e3a1),
            warning: rgb(0xf9e2af),
            error: rgb(0xf38ba8),
        }
    }
}

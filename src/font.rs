use crate::host::{FontId, FontRequest, Host};

pub const DEFAULT_FONT_SIZE: f32 = 17.0;
pub const MAX_FONT_SIZE: f32 = 64.0;

/// Owns the single built bar font. Rebuilding disposes the previous handle
/// strictly before the new one is requested; ownership transfer through
/// `Option::take` means a disposed handle can never be aliased.
#[derive(Default)]
pub struct BarFont {
    handle: Option<FontId>,
}

impl BarFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose any existing handle, then request a new font built at `size`
    /// pixels clamped to `[1, MAX_FONT_SIZE]`. The build merges the host's
    /// symbol glyph source and opts out of the host-global scale factor so
    /// bar glyphs render at a stable pixel size.
    pub fn setup(&mut self, host: &mut dyn Host, size: f32) -> anyhow::Result<()> {
        if let Some(old) = self.handle.take() {
            host.destroy_font(old);
        }
        let request = FontRequest {
            size_px: size.clamp(1.0, MAX_FONT_SIZE),
            merge_symbols: true,
            ignore_global_scale: true,
        };
        self.handle = Some(host.build_font(&request)?);
        Ok(())
    }

    pub fn handle(&self) -> Option<FontId> {
        self.handle
    }

    pub fn dispose(&mut self, host: &mut dyn Host) {
        if let Some(old) = self.handle.take() {
            host.destroy_font(old);
        }
    }
}

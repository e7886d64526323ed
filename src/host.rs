use crate::keybind::Key;
use image::RgbaImage;

/// Handle to a texture owned by the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a font built by the host's font atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u64);

/// Parameters for a host font build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    pub size_px: f32,
    /// Merge the host's symbol glyph source into the built font.
    pub merge_symbols: bool,
    /// Build at a fixed pixel size, ignoring any host-global UI scale.
    pub ignore_global_scale: bool,
}

/// The three host callbacks the engine hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostHook {
    Update,
    Draw,
    OpenConfig,
}

/// Fire-and-forget notifications consumed by cooperating extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcSignal {
    Initialized,
    Disposed,
}

/// Situations in which the host would normally hide plugin UI and the user
/// has opted out of that behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HideOptOuts {
    pub game_ui_off: bool,
    pub cutscene: bool,
    pub gpose: bool,
}

/// The single seam to the embedding application. The engine performs no I/O
/// against the host other than through this trait, so tests drive the whole
/// lifecycle with a mock implementation.
pub trait Host {
    fn register_hook(&mut self, hook: HostHook);
    fn unregister_hook(&mut self, hook: HostHook);

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> anyhow::Result<TextureId>;
    fn destroy_texture(&mut self, id: TextureId);
    /// Pixel data for a built-in icon, or `None` when the host has no asset
    /// for this id.
    fn load_builtin_icon(&mut self, id: u32, hi_res: bool) -> Option<RgbaImage>;

    fn build_font(&mut self, request: &FontRequest) -> anyhow::Result<FontId>;
    fn destroy_font(&mut self, id: FontId);

    fn is_key_down(&self, key: Key) -> bool;

    fn sample_condition(&self, code: &str) -> bool;
    /// Whether the application currently accepts queued text commands.
    fn accepts_commands(&self) -> bool;
    fn execute_command(&mut self, command: &str) -> anyhow::Result<()>;
    fn start_performance(&mut self, instrument: u8) -> anyhow::Result<()>;
    /// The known instrument table, id paired with display name.
    fn instruments(&self) -> Vec<(u8, String)> {
        Vec::new()
    }
    fn is_plugin_loaded(&self, _name: &str) -> bool {
        false
    }

    fn print_echo(&mut self, message: &str);
    fn print_error(&mut self, message: &str);

    fn set_hide_opt_outs(&mut self, opt_outs: HideOptOuts);

    fn ipc_handshake(&mut self) -> anyhow::Result<()>;
    fn install_game_hooks(&mut self) -> anyhow::Result<()>;
    fn send_ipc(&mut self, signal: IpcSignal);
}

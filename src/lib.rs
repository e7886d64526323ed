pub mod commands;
pub mod conditions;
pub mod config;
pub mod font;
pub mod host;
pub mod ipc;
pub mod keybind;
pub mod logging;
pub mod plugin;
pub mod textures;

pub use host::{FontId, FontRequest, HideOptOuts, Host, HostHook, IpcSignal, TextureId};
pub use plugin::{BarRenderer, PluginState, QolBar};

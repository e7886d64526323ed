#![allow(dead_code)]

use image::RgbaImage;
use qol_bar::host::{FontId, FontRequest, HideOptOuts, Host, HostHook, IpcSignal, TextureId};
use qol_bar::keybind::Key;
use qol_bar::plugin::BarRenderer;
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    RegisterHook(HostHook),
    UnregisterHook(HostHook),
    CreateTexture(TextureId),
    DestroyTexture(TextureId),
    BuildFont(FontId, f32),
    DestroyFont(FontId),
    Ipc(IpcSignal),
    Echo(String),
    Error(String),
    HideOptOuts(HideOptOuts),
    ExecuteCommand(String),
    StartPerformance(u8),
}

/// Scriptable host double recording every call crossing the seam.
pub struct MockHost {
    pub events: Vec<HostEvent>,
    next_id: u64,
    pub fail_handshake: bool,
    pub fail_game_hooks: bool,
    pub fail_font: bool,
    pub fail_textures: bool,
    pub keys_down: HashSet<Key>,
    pub conditions_true: HashSet<String>,
    pub condition_samples: Cell<u32>,
    pub accepts_commands: bool,
    pub builtin_icons: HashSet<u32>,
    pub instrument_table: Vec<(u8, String)>,
    pub live_fonts: HashSet<u64>,
    pub live_textures: HashSet<u64>,
    pub uploads: Vec<(u32, u32, Vec<u8>)>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
            fail_handshake: false,
            fail_game_hooks: false,
            fail_font: false,
            fail_textures: false,
            keys_down: HashSet::new(),
            conditions_true: HashSet::new(),
            condition_samples: Cell::new(0),
            accepts_commands: true,
            builtin_icons: HashSet::new(),
            instrument_table: Vec::new(),
            live_fonts: HashSet::new(),
            live_textures: HashSet::new(),
            uploads: Vec::new(),
        }
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ipc_count(&self, signal: IpcSignal) -> usize {
        self.events
            .iter()
            .filter(|e| **e == HostEvent::Ipc(signal))
            .count()
    }

    pub fn hook_counts(&self, hook: HostHook) -> (usize, usize) {
        let registered = self
            .events
            .iter()
            .filter(|e| **e == HostEvent::RegisterHook(hook))
            .count();
        let unregistered = self
            .events
            .iter()
            .filter(|e| **e == HostEvent::UnregisterHook(hook))
            .count();
        (registered, unregistered)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Host for MockHost {
    fn register_hook(&mut self, hook: HostHook) {
        self.events.push(HostEvent::RegisterHook(hook));
    }

    fn unregister_hook(&mut self, hook: HostHook) {
        self.events.push(HostEvent::UnregisterHook(hook));
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> anyhow::Result<TextureId> {
        if self.fail_textures {
            anyhow::bail!("texture creation unavailable");
        }
        self.next_id += 1;
        self.live_textures.insert(self.next_id);
        self.uploads.push((width, height, rgba.to_vec()));
        let id = TextureId(self.next_id);
        self.events.push(HostEvent::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.live_textures.remove(&id.0);
        self.events.push(HostEvent::DestroyTexture(id));
    }

    fn load_builtin_icon(&mut self, id: u32, _hi_res: bool) -> Option<RgbaImage> {
        self.builtin_icons
            .contains(&id)
            .then(|| RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255])))
    }

    fn build_font(&mut self, request: &FontRequest) -> anyhow::Result<FontId> {
        if self.fail_font {
            anyhow::bail!("font atlas unavailable");
        }
        self.next_id += 1;
        self.live_fonts.insert(self.next_id);
        let id = FontId(self.next_id);
        self.events.push(HostEvent::BuildFont(id, request.size_px));
        Ok(id)
    }

    fn destroy_font(&mut self, id: FontId) {
        self.live_fonts.remove(&id.0);
        self.events.push(HostEvent::DestroyFont(id));
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn sample_condition(&self, code: &str) -> bool {
        self.condition_samples.set(self.condition_samples.get() + 1);
        self.conditions_true.contains(code)
    }

    fn accepts_commands(&self) -> bool {
        self.accepts_commands
    }

    fn execute_command(&mut self, command: &str) -> anyhow::Result<()> {
        self.events.push(HostEvent::ExecuteCommand(command.to_string()));
        Ok(())
    }

    fn start_performance(&mut self, instrument: u8) -> anyhow::Result<()> {
        self.events.push(HostEvent::StartPerformance(instrument));
        Ok(())
    }

    fn instruments(&self) -> Vec<(u8, String)> {
        self.instrument_table.clone()
    }

    fn print_echo(&mut self, message: &str) {
        self.events.push(HostEvent::Echo(message.to_string()));
    }

    fn print_error(&mut self, message: &str) {
        self.events.push(HostEvent::Error(message.to_string()));
    }

    fn set_hide_opt_outs(&mut self, opt_outs: HideOptOuts) {
        self.events.push(HostEvent::HideOptOuts(opt_outs));
    }

    fn ipc_handshake(&mut self) -> anyhow::Result<()> {
        if self.fail_handshake {
            anyhow::bail!("no cooperating extension answered");
        }
        Ok(())
    }

    fn install_game_hooks(&mut self) -> anyhow::Result<()> {
        if self.fail_game_hooks {
            anyhow::bail!("signature scan failed");
        }
        Ok(())
    }

    fn send_ipc(&mut self, signal: IpcSignal) {
        self.events.push(HostEvent::Ipc(signal));
    }
}

#[derive(Default)]
pub struct ViewState {
    pub draws: u32,
    pub reloads: u32,
    pub config_toggles: u32,
    pub icon_browser_toggles: u32,
    pub cache_rebuilds: u32,
    pub update_notices: u32,
    pub disposals: u32,
}

/// Renderer collaborator double sharing its counters with the test body.
pub struct RecordingView(pub Rc<std::cell::RefCell<ViewState>>);

impl RecordingView {
    pub fn new() -> (Box<Self>, Rc<std::cell::RefCell<ViewState>>) {
        let state = Rc::new(std::cell::RefCell::new(ViewState::default()));
        (Box::new(Self(state.clone())), state)
    }
}

impl BarRenderer for RecordingView {
    fn draw(&mut self, _host: &mut dyn Host) {
        self.0.borrow_mut().draws += 1;
    }

    fn reload(&mut self) {
        self.0.borrow_mut().reloads += 1;
    }

    fn toggle_config(&mut self) {
        self.0.borrow_mut().config_toggles += 1;
    }

    fn toggle_icon_browser(&mut self) {
        self.0.borrow_mut().icon_browser_toggles += 1;
    }

    fn rebuild_icon_cache(&mut self) {
        self.0.borrow_mut().cache_rebuilds += 1;
    }

    fn draw_update_notice(&mut self, _host: &mut dyn Host) {
        self.0.borrow_mut().update_notices += 1;
    }

    fn dispose(&mut self, _host: &mut dyn Host) {
        self.0.borrow_mut().disposals += 1;
    }
}

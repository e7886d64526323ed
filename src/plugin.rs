use crate::conditions::ConditionCache;
use crate::config::ConfigStore;
use crate::font::BarFont;
use crate::host::{HideOptOuts, Host, HostHook, IpcSignal, TextureId};
use crate::ipc;
use crate::keybind::KeybindRunner;
use crate::textures::TextureSet;
use crate::{commands, logging};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const MESSAGE_PREFIX: &str = "[QoL Bar]";

pub fn print_echo(host: &mut dyn Host, message: &str) {
    host.print_echo(&format!("{MESSAGE_PREFIX} {message}"));
}

pub fn print_error(host: &mut dyn Host, message: &str) {
    host.print_error(&format!("{MESSAGE_PREFIX} {message}"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Uninitialized,
    Initializing,
    Ready,
    /// One-shot initialization failed; the engine stays parked here for the
    /// session. Per-frame work is a no-op, disposal still succeeds.
    Failed,
    Disposing,
    Disposed,
}

/// The bar-rendering collaborator. Only `draw` is required; the engine
/// sequences these calls but owns none of the visuals.
pub trait BarRenderer {
    fn draw(&mut self, host: &mut dyn Host);
    /// Re-read bar definitions after a configuration reload.
    fn reload(&mut self) {}
    fn toggle_config(&mut self) {}
    fn toggle_icon_browser(&mut self) {}
    /// Rebuild the icon browser cache after the user icon set changed.
    fn rebuild_icon_cache(&mut self) {}
    /// Shown each frame after a configuration migration until acknowledged.
    fn draw_update_notice(&mut self, host: &mut dyn Host) {
        let _ = host;
    }
    fn dispose(&mut self, host: &mut dyn Host) {
        let _ = host;
    }
}

/// Deferred user-icon loading, stepped once per draw tick. The two quality
/// variants report completion independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IconLoadPhase {
    Idle,
    Pending { lr_done: bool, hr_done: bool },
}

/// Per-frame driver owning every subsystem. The host registers this object
/// once and calls [`QolBar::on_update_tick`] on its update cadence,
/// [`QolBar::on_draw_tick`] once per rendered frame.
pub struct QolBar {
    state: PluginState,
    pub config: ConfigStore,
    pub textures: TextureSet,
    font: BarFont,
    pub conditions: ConditionCache,
    keybinds: KeybindRunner,
    ready_commands: VecDeque<String>,
    view: Box<dyn BarRenderer>,
    icon_load: IconLoadPhase,
    started: Instant,
    frame_count: u64,
}

impl QolBar {
    pub fn new(host: &mut dyn Host, mut config: ConfigStore, view: Box<dyn BarRenderer>) -> Self {
        // Uninitialized exists only before construction; entering the
        // constructor is the synchronous transition to Initializing.
        let state = PluginState::Initializing;

        config.initialize();
        config.update_version();
        if let Err(e) = config.try_backup() {
            tracing::warn!("version backup failed: {e:#}");
        }
        if config.stored_version() < config.config.version {
            if let Err(e) = config.save() {
                tracing::warn!("saving migrated configuration failed: {e:#}");
            }
        }
        logging::init(config.config.debug_logging);

        host.register_hook(HostHook::Update);
        host.register_hook(HostHook::Draw);
        host.register_hook(HostHook::OpenConfig);

        let conditions =
            ConditionCache::new(Duration::from_millis(config.config.condition_refresh_ms));
        let mut font = BarFont::new();
        if let Err(e) = font.setup(host, config.config.font_size) {
            tracing::error!("font build failed: {e:#}");
        }

        let mut plugin = Self {
            state,
            config,
            textures: TextureSet::new(),
            font,
            conditions,
            keybinds: KeybindRunner::new(),
            ready_commands: VecDeque::new(),
            view,
            icon_load: IconLoadPhase::Idle,
            started: Instant::now(),
            frame_count: 0,
        };
        plugin.check_hide_opt_outs(host);
        plugin.ready_plugin(host);
        plugin
    }

    /// Run the one-shot initialization sequence. On any step's failure the
    /// engine logs and parks permanently in [`PluginState::Failed`]; the host
    /// process lives on.
    pub fn ready_plugin(&mut self, host: &mut dyn Host) {
        if self.state != PluginState::Initializing {
            return;
        }
        match self.try_ready(host) {
            Ok(()) => {
                self.state = PluginState::Ready;
                ipc::send(host, IpcSignal::Initialized);
            }
            Err(e) => {
                tracing::error!("failed loading QoL Bar: {e:#}");
                self.state = PluginState::Failed;
            }
        }
    }

    fn try_ready(&mut self, host: &mut dyn Host) -> anyhow::Result<()> {
        ipc::initialize(host)?;

        let icon_dir = self.config.icon_directory();
        self.textures.lr.add_user_icons(host, &icon_dir);
        self.textures.hr.add_user_icons(host, &icon_dir);
        self.view.rebuild_icon_cache();

        host.install_game_hooks()?;
        self.conditions.install(host);
        Ok(())
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PluginState::Ready
    }

    fn is_disposed(&self) -> bool {
        matches!(self.state, PluginState::Disposing | PluginState::Disposed)
    }

    /// Host update callback. Steps run in a fixed order and each failure is
    /// isolated to its own subsystem, so a failing backup write cannot stop
    /// keybind polling or the condition refresh on the same tick.
    pub fn on_update_tick(&mut self, host: &mut dyn Host) {
        if self.state != PluginState::Ready {
            return;
        }

        self.config.do_timed_backup();

        self.poll_ready_commands(host);

        for idx in self.keybinds.run(host) {
            if let Some(bar) = self.config.config.bars.get_mut(idx) {
                bar.hidden = !bar.hidden;
            }
        }
        self.keybinds.setup_hotkeys(&self.config.config.bars);

        self.conditions.update_cache(host);
    }

    /// Host draw callback. The deferred icon-load step runs before the
    /// readiness gate, matching the load flow where icons queued during a
    /// failed session must still drain.
    pub fn on_draw_tick(&mut self, host: &mut dyn Host) {
        if self.is_disposed() {
            return;
        }
        self.frame_count += 1;

        self.step_icon_load(host);

        if self.state != PluginState::Ready {
            return;
        }

        if self.config.update_notice_pending() {
            self.view.draw_update_notice(host);
        }
        self.view.draw(host);
    }

    /// Host open-config callback, same path as `/qolbar`.
    pub fn on_open_config(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.view.toggle_config();
    }

    /// Route a host text command. Malformed input produces a user-visible
    /// message, never a panic.
    pub fn on_command(&mut self, host: &mut dyn Host, command: &str, argument: &str) {
        if self.is_disposed() {
            return;
        }
        match command {
            "/qolbar" => self.view.toggle_config(),
            "/qolicons" => self.view.toggle_icon_browser(),
            "/qolvisible" => {
                if let Err(message) =
                    commands::run_qol_visible(&mut self.config.config.bars, argument)
                {
                    print_error(host, &message);
                }
            }
            "/performance" => match commands::parse_instrument(argument, &host.instruments()) {
                Some(instrument) => {
                    if let Err(e) = host.start_performance(instrument) {
                        tracing::error!("failed to start performance: {e:#}");
                    }
                }
                None => print_error(host, "Invalid instrument."),
            },
            _ => print_error(host, &format!("Unknown command \"{command}\".")),
        }
    }

    fn step_icon_load(&mut self, host: &mut dyn Host) {
        let IconLoadPhase::Pending { lr_done, hr_done } = self.icon_load else {
            return;
        };
        let dir = self.config.icon_directory();
        let lr_done = lr_done || !self.textures.lr.add_user_icons(host, &dir);
        let hr_done = hr_done || !self.textures.hr.add_user_icons(host, &dir);
        self.icon_load = if lr_done && hr_done {
            self.view.rebuild_icon_cache();
            IconLoadPhase::Idle
        } else {
            IconLoadPhase::Pending { lr_done, hr_done }
        };
    }

    /// Request an incremental re-scan of the user icon directory, spread
    /// across the following draw ticks.
    pub fn request_user_icons(&mut self) {
        if self.is_disposed() {
            return;
        }
        if self.icon_load == IconLoadPhase::Idle {
            self.icon_load = IconLoadPhase::Pending {
                lr_done: false,
                hr_done: false,
            };
        }
    }

    /// Queue a host command to execute once the application accepts commands.
    pub fn queue_ready_command(&mut self, command: impl Into<String>) {
        if self.is_disposed() {
            return;
        }
        self.ready_commands.push_back(command.into());
    }

    fn poll_ready_commands(&mut self, host: &mut dyn Host) {
        if self.ready_commands.is_empty() || !host.accepts_commands() {
            return;
        }
        if let Some(command) = self.ready_commands.pop_front() {
            if let Err(e) = host.execute_command(&command) {
                tracing::error!("deferred command {command:?} failed: {e:#}");
            }
        }
    }

    /// Re-read the configuration from disk while the UI is live.
    pub fn reload(&mut self, host: &mut dyn Host) {
        if self.is_disposed() {
            return;
        }
        self.config.reload();
        self.config.initialize();
        self.config.update_version();
        if let Err(e) = self.config.save() {
            tracing::warn!("saving reloaded configuration failed: {e:#}");
        }
        self.conditions
            .set_interval(Duration::from_millis(self.config.config.condition_refresh_ms));
        self.clean_textures(host, false);
        self.setup_font(host);
        self.view.reload();
        self.check_hide_opt_outs(host);
    }

    /// Rebuild the bar font from the current configured size.
    pub fn setup_font(&mut self, host: &mut dyn Host) {
        if self.is_disposed() {
            return;
        }
        if let Err(e) = self.font.setup(host, self.config.config.font_size) {
            tracing::error!("font build failed: {e:#}");
        }
    }

    pub fn font(&self) -> &BarFont {
        &self.font
    }

    pub fn check_hide_opt_outs(&mut self, host: &mut dyn Host) {
        host.set_hide_opt_outs(HideOptOuts {
            game_ui_off: self.config.config.opt_out_game_ui_off_hide,
            cutscene: self.config.config.opt_out_cutscene_hide,
            gpose: self.config.config.opt_out_gpose_hide,
        });
    }

    /// Release texture resources: empty on reload, destroy on shutdown.
    pub fn clean_textures(&mut self, host: &mut dyn Host, disposing: bool) {
        if disposing {
            self.textures.dispose_all(host);
        } else {
            self.textures.try_empty_all(host);
        }
    }

    pub fn acknowledge_update_notice(&mut self) {
        self.config.acknowledge_update_notice();
    }

    /// Texture for `key` from the quality variant selected by the live
    /// configuration flag.
    pub fn icon(&mut self, host: &mut dyn Host, key: u32) -> Option<TextureId> {
        if self.is_disposed() {
            return None;
        }
        let use_hi_res = self.config.config.use_hi_res_icons;
        self.textures.active_mut(use_hi_res).resolve(host, key)
    }

    /// User icons registered in the active quality variant, key to source
    /// path. Feeds the icon browser collaborator.
    pub fn user_icons(&self) -> &std::collections::HashMap<u32, std::path::PathBuf> {
        self.textures
            .active(self.config.config.use_hi_res_icons)
            .user_icons()
    }

    pub fn is_logged_in(&self) -> bool {
        self.conditions.check("l")
    }

    pub fn has_plugin(&self, host: &dyn Host, name: &str) -> bool {
        host.is_plugin_loaded(name)
    }

    /// Seconds since construction.
    pub fn run_time(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Tear down in a fixed order: the disposed notification goes out first,
    /// then configuration is persisted, hooks unregister, and resources are
    /// released. Idempotent; re-entrant calls are no-ops. Never panics.
    pub fn dispose(&mut self, host: &mut dyn Host) {
        if self.is_disposed() {
            return;
        }
        self.state = PluginState::Disposing;

        ipc::send(host, IpcSignal::Disposed);

        if let Err(e) = self.config.save() {
            tracing::error!("saving configuration on dispose failed: {e:#}");
        }
        if let Err(e) = self.config.save_temp_config() {
            tracing::error!("saving scratch configuration on dispose failed: {e:#}");
        }

        host.unregister_hook(HostHook::Update);
        host.unregister_hook(HostHook::Draw);
        host.unregister_hook(HostHook::OpenConfig);

        self.view.dispose(host);
        self.font.dispose(host);
        self.textures.dispose_all(host);
        self.keybinds.clear();

        self.state = PluginState::Disposed;
    }
}

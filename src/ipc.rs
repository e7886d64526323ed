use crate::host::{Host, IpcSignal};

/// Perform the handshake with cooperating extensions. Part of one-shot
/// initialization; a failure here keeps the plugin non-ready.
pub fn initialize(host: &mut dyn Host) -> anyhow::Result<()> {
    host.ipc_handshake()
}

/// Fire-and-forget notification to cooperating extensions.
pub fn send(host: &mut dyn Host, signal: IpcSignal) {
    tracing::trace!("sending ipc signal {:?}", signal);
    host.send_ipc(signal);
}

//! systemd readiness notifications. No-ops when not started by systemd.

use sd_notify::NotifyState;

pub fn notify_ready() {
    notify(&[NotifyState::Ready]);
}

pub fn notify_stopping() {
    notify(&[NotifyState::Stopping]);
}

fn notify(state: &[NotifyState<'_>]) {
    if let Err(err) = sd_notify::notify(false, state) {
        tracing::debug!(%err, "systemd notification failed");
    }
}

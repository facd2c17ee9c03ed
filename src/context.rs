//! Application Context - Root-Owned Session Settings
//!
//! The selected network and the dark-mode preference live at the
//! application root and are handed to every workflow as an explicit
//! handle. Changes are published over a `watch` channel so long-lived
//! workflows observe a network switch without being rebuilt.

use tokio::sync::watch;
use tracing::info;

use crate::domain::network::Network;

/// Session-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
  /// Network every backend and chain call targets.
  pub network: Network,
  /// Dark theme preference for rendering front-ends.
  pub dark_mode: bool,
}

impl Default for AppSettings {
  fn default() -> Self {
    Self {
      network: Network::Mainnet,
      dark_mode: true,
    }
  }
}

/// Cloneable handle to the session settings.
#[derive(Debug, Clone)]
pub struct AppContext {
  tx: watch::Sender<AppSettings>,
}

impl AppContext {
  /// Create a context seeded with `settings`.
  pub fn new(settings: AppSettings) -> Self {
    let (tx, _rx) = watch::channel(settings);
    Self { tx }
  }

  /// Current settings.
  pub fn settings(&self) -> AppSettings {
    *self.tx.borrow()
  }

  /// Currently selected network.
  pub fn network(&self) -> Network {
    self.tx.borrow().network
  }

  /// Receiver that observes every future change.
  pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
    self.tx.subscribe()
  }

  /// Switch the active network.
  pub fn set_network(&self, network: Network) {
    let changed = self.tx.send_if_modified(|settings| {
      let changed = settings.network != network;
      settings.network = network;
      changed
    });
    if changed {
      info!(network = %network, "Network switched");
    }
  }

  /// Flip the dark-mode preference; returns the new value.
  pub fn toggle_dark_mode(&self) -> bool {
    self.tx.send_modify(|settings| settings.dark_mode = !settings.dark_mode);
    self.tx.borrow().dark_mode
  }
}

impl Default for AppContext {
  fn default() -> Self {
    Self::new(AppSettings::default())
  }
}

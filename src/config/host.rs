//! Host configuration subsection (`host.*`).

use crate::wake::DispatchConfig;
use serde::{Deserialize, Serialize};

/// Host-side limits (`host.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Number of virtual interfaces; wake events for vdev ids at or above
    /// this are rejected (`host.max_interfaces`).
    #[serde(default = "HostConfig::default_max_interfaces")]
    pub max_interfaces: u8,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_interfaces: Self::default_max_interfaces(),
        }
    }
}

impl HostConfig {
    fn default_max_interfaces() -> u8 {
        DispatchConfig::default().max_interfaces
    }

    /// Dispatcher settings derived from this section.
    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            max_interfaces: self.max_interfaces,
        }
    }
}

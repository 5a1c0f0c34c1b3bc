// ── IP and proxy configuration ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IpAssignment {
    #[default]
    Unassigned,
    Dhcp,
    Static {
        /// Address in CIDR notation.
        address: String,
        gateway: Option<String>,
        #[serde(default)]
        dns_servers: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProxySettings {
    #[default]
    Unassigned,
    None,
    Static {
        host: String,
        port: u16,
        #[serde(default)]
        exclusion_list: Vec<String>,
    },
    Pac {
        url: String,
    },
}

impl ProxySettings {
    /// Whether a proxy is actually configured (static or PAC).
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Static { .. } | Self::Pac { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IpConfiguration {
    #[serde(default)]
    pub ip_assignment: IpAssignment,
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl IpConfiguration {
    pub fn dhcp() -> Self {
        Self {
            ip_assignment: IpAssignment::Dhcp,
            proxy: ProxySettings::None,
        }
    }

    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = proxy;
        self
    }
}

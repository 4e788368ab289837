//! Startup connectivity gate

use log::{debug, info, warn};
use sysinfo::Networks;

use crate::error::{ShellError, ShellResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Other,
}

/// The host's currently active network and the transports it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNetwork {
    pub interface: String,
    pub transports: Vec<Transport>,
}

impl ActiveNetwork {
    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }
}

/// Source of network state.
pub trait ConnectivityProbe {
    /// The active network, if the host reports one.
    fn active_network(&self) -> Option<ActiveNetwork>;
}

/// Admits startup only when an active network exposes an allowed transport.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    admitted: Vec<Transport>,
}

impl Default for ConnectivityGate {
    fn default() -> Self {
        Self {
            admitted: vec![Transport::Wifi, Transport::Cellular],
        }
    }
}

impl ConnectivityGate {
    /// The active network, provided it exposes an admitted transport.
    pub fn admit(&self, probe: &dyn ConnectivityProbe) -> ShellResult<ActiveNetwork> {
        let Some(network) = probe.active_network() else {
            warn!("Connectivity: no active network");
            return Err(ShellError::NoConnectivity);
        };

        if !self.admitted.iter().any(|t| network.has_transport(*t)) {
            warn!(
                "Connectivity: network {} exposes no admitted transport ({:?})",
                network.interface, network.transports
            );
            return Err(ShellError::NoConnectivity);
        }

        info!(
            "Connectivity: active network {} ({:?})",
            network.interface, network.transports
        );
        Ok(network)
    }

}

/// One interface as the OS reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceReport {
    pub name: String,
    /// Transport named by the OS adapter type, when it names one.
    pub reported: Option<Transport>,
    pub up: bool,
    pub has_address: bool,
    /// Bytes received plus transmitted since boot.
    pub traffic: u64,
}

impl InterfaceReport {
    fn is_active(&self) -> bool {
        self.up && (self.traffic > 0 || self.has_address)
    }
}

/// Transport of an interface. Wireless evidence from either the OS adapter
/// type or the name wins over a generic Ethernet type, since several hosts
/// report WiFi adapters as Ethernet framing.
pub fn transport_for(name: &str, reported: Option<Transport>) -> Transport {
    let by_name = classify_interface(name);
    match (reported, by_name) {
        (Some(t @ (Transport::Wifi | Transport::Cellular)), _) => t,
        (_, t @ (Transport::Wifi | Transport::Cellular)) => t,
        (Some(t), _) => t,
        (None, t) => t,
    }
}

/// Classify an interface by its OS name alone.
///
/// Covers Unix device names (`wlan0`, `rmnet_data0`) and Windows connection
/// names (`Wi-Fi`, `WLAN`, `Mobile broadband`). Bare `en<N>` is left as
/// Other: macOS uses it for WiFi and Ethernet alike.
pub fn classify_interface(name: &str) -> Transport {
    let name = name.to_ascii_lowercase();
    const WIFI_PREFIXES: &[&str] = &["wlan", "wlp", "wlo", "wl", "wifi", "wi-fi", "ath", "ra"];
    const WIFI_WORDS: &[&str] = &["wi-fi", "wifi", "wlan", "wireless"];
    const CELLULAR_PREFIXES: &[&str] = &["rmnet", "wwan", "ccmni", "pdp_ip", "pdp", "v4-rmnet"];
    const CELLULAR_WORDS: &[&str] = &["mobile broadband", "cellular"];
    const ETHERNET_PREFIXES: &[&str] = &["eth", "enp", "eno", "ens", "enx"];

    if CELLULAR_PREFIXES.iter().any(|p| name.starts_with(p))
        || CELLULAR_WORDS.iter().any(|w| name.contains(w))
    {
        Transport::Cellular
    } else if WIFI_PREFIXES.iter().any(|p| name.starts_with(p))
        || WIFI_WORDS.iter().any(|w| name.contains(w))
    {
        Transport::Wifi
    } else if ETHERNET_PREFIXES.iter().any(|p| name.starts_with(p)) || name.contains("ethernet") {
        Transport::Ethernet
    } else {
        Transport::Other
    }
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0") || name.eq_ignore_ascii_case("loopback")
}

/// Pick the active network among `interfaces`.
///
/// An interface counts as active while it is up and has either carried
/// traffic or holds an address. WiFi and cellular interfaces are preferred
/// over the rest.
pub fn select_active_network<I>(interfaces: I) -> Option<ActiveNetwork>
where
    I: IntoIterator<Item = InterfaceReport>,
{
    let mut best: Option<(u8, ActiveNetwork)> = None;
    for report in interfaces {
        if is_loopback(&report.name) || !report.is_active() {
            continue;
        }
        let transport = transport_for(&report.name, report.reported);
        let rank = match transport {
            Transport::Wifi | Transport::Cellular => 0,
            Transport::Ethernet => 1,
            Transport::Other => 2,
        };
        if best.as_ref().map_or(true, |(r, _)| rank < *r) {
            best = Some((
                rank,
                ActiveNetwork {
                    interface: report.name,
                    transports: vec![transport],
                },
            ));
        }
    }
    best.map(|(_, network)| network)
}

fn reported_transport(kind: netdev::interface::InterfaceType) -> Option<Transport> {
    use netdev::interface::InterfaceType;
    match kind {
        InterfaceType::Wireless80211 => Some(Transport::Wifi),
        InterfaceType::Wwanpp | InterfaceType::Wwanpp2 => Some(Transport::Cellular),
        InterfaceType::Ethernet
        | InterfaceType::FastEthernetT
        | InterfaceType::FastEthernetFx
        | InterfaceType::GigabitEthernet => Some(Transport::Ethernet),
        _ => None,
    }
}

/// Reads adapters and their types with `netdev`, and traffic counters with
/// `sysinfo`.
#[derive(Debug, Default)]
pub struct OsProbe;

impl ConnectivityProbe for OsProbe {
    fn active_network(&self) -> Option<ActiveNetwork> {
        let networks = Networks::new_with_refreshed_list();
        let traffic_of = |name: &str| {
            networks
                .iter()
                .find(|(n, _)| n.as_str() == name)
                .map(|(_, data)| data.total_received().saturating_add(data.total_transmitted()))
        };

        let reports: Vec<InterfaceReport> = netdev::get_interfaces()
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .map(|iface| {
                let up = iface.is_up();
                let has_address = !iface.ipv4.is_empty() || !iface.ipv6.is_empty();
                let traffic = traffic_of(&iface.name);
                // Windows adapters are named by GUID; the connection name is
                // what users (and sysinfo) see.
                let name = iface.friendly_name.clone().unwrap_or_else(|| iface.name.clone());
                InterfaceReport {
                    reported: reported_transport(iface.if_type.clone()),
                    up,
                    has_address,
                    traffic: traffic.or_else(|| traffic_of(&name)).unwrap_or(0),
                    name,
                }
            })
            .collect();
        debug!("Connectivity: interfaces {:?}", reports);
        select_active_network(reports)
    }
}

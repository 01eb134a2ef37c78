use std::net::IpAddr;

use ipnet::IpNet;
use k8s_openapi::api::core::v1::NodeAddress;

const INTERNAL_IP: &str = "InternalIP";
const EXTERNAL_IP: &str = "ExternalIP";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectedAddresses {
    pub primary: Option<String>,
    pub internal: Option<String>,
    pub external: Option<String>,
}

/// Picks the connection address for a node from its reported addresses.
///
/// One scan records the first `InternalIP` and the first `ExternalIP`; later
/// duplicates of the same type are ignored. Every address of any type is
/// additionally tested against `subnet`, where the last match in list order
/// wins. Primary precedence: subnet match, then internal, then external.
/// An address that is not an IP literal never matches and never errors.
pub fn select(addresses: &[NodeAddress], subnet: Option<&IpNet>) -> SelectedAddresses {
    let mut internal: Option<String> = None;
    let mut external: Option<String> = None;
    let mut subnet_match: Option<String> = None;

    for addr in addresses {
        match addr.type_.as_str() {
            INTERNAL_IP if internal.is_none() => internal = Some(addr.address.clone()),
            EXTERNAL_IP if external.is_none() => external = Some(addr.address.clone()),
            _ => {}
        }

        if let Some(net) = subnet {
            if let Ok(ip) = addr.address.parse::<IpAddr>() {
                if net.contains(&ip) {
                    subnet_match = Some(addr.address.clone());
                }
            }
        }
    }

    let primary = subnet_match
        .or_else(|| internal.clone())
        .or_else(|| external.clone());

    SelectedAddresses {
        primary,
        internal,
        external,
    }
}

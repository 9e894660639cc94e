//! Static provider topology drawn in the topology view

use crate::data::{CloudRegion, Exchange, Location, Provider, CLOUD_REGIONS, EXCHANGES};
use crate::filter::ProviderFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// Exchange hosted in a region: same provider and region code
    Hosting,
    /// Backbone between two regions of one provider, drawn dashed
    Backbone,
    /// Faint neutral line between any two exchanges whose providers are active
    Peer,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopologyLink {
    pub from: Location,
    pub to: Location,
    pub kind: LinkKind,
    /// Provider of `from`; peers may cross providers
    pub provider: Provider,
}

impl TopologyLink {
    pub fn is_dashed(&self) -> bool {
        self.kind == LinkKind::Backbone
    }
}

pub fn hosting_region(exchange: &Exchange) -> Option<&'static CloudRegion> {
    CLOUD_REGIONS
        .iter()
        .find(|r| r.provider == exchange.provider && r.code == exchange.region)
}

/// All links whose provider is active, hosting links first
pub fn links(filter: &ProviderFilter) -> Vec<TopologyLink> {
    let mut out = Vec::new();

    for exchange in EXCHANGES.iter().filter(|e| filter.is_active(e.provider)) {
        if let Some(region) = hosting_region(exchange) {
            out.push(TopologyLink {
                from: Location::Exchange(exchange),
                to: Location::Region(region),
                kind: LinkKind::Hosting,
                provider: exchange.provider,
            });
        }
    }

    for (i, a) in CLOUD_REGIONS.iter().enumerate() {
        if !filter.is_active(a.provider) {
            continue;
        }
        for b in CLOUD_REGIONS[i + 1..].iter().filter(|b| b.provider == a.provider) {
            out.push(TopologyLink {
                from: Location::Region(a),
                to: Location::Region(b),
                kind: LinkKind::Backbone,
                provider: a.provider,
            });
        }
    }

    for (i, a) in EXCHANGES.iter().enumerate() {
        if !filter.is_active(a.provider) {
            continue;
        }
        for b in EXCHANGES[i + 1..].iter().filter(|b| filter.is_active(b.provider)) {
            out.push(TopologyLink {
                from: Location::Exchange(a),
                to: Location::Exchange(b),
                kind: LinkKind::Peer,
                provider: a.provider,
            });
        }
    }

    out
}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::content::{ChainId, ForkSchedule};
use crate::distribute::{Broadcast, ClosestNodes, TargetSelector};

/// How the distributor picks target nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPolicy {
    /// Every node receives every record
    All,
    /// Only the given number of nodes closest to the content id
    Closest(usize),
}

impl TargetPolicy {
    pub fn selector(self) -> Box<dyn TargetSelector> {
        match self {
            Self::All => Box::new(Broadcast),
            Self::Closest(count) => Box::new(ClosestNodes { count }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub portal_nodes: Vec<Url>,
    pub eth_rpc_url: Url,
    pub eth_rpc_bearer_token: Option<String>,
    pub chain_id: ChainId,
    pub poll_interval: Duration,
    pub receipt_poll: Duration,
    pub receipt_timeout: Option<Duration>,
    pub targets: TargetPolicy,
    pub forks: ForkSchedule,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Missing required env var: {key}"))
        };
        let opt = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let portal_nodes = get("PORTAL_BRIDGE_NODES")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_http_url("PORTAL_BRIDGE_NODES", s))
            .collect::<Result<Vec<_>>>()?;
        if portal_nodes.is_empty() {
            bail!("PORTAL_BRIDGE_NODES must list at least one node URL");
        }

        let eth_rpc_url = parse_http_url("ETH_RPC_URL", &get("ETH_RPC_URL")?)?;
        let eth_rpc_bearer_token = opt("ETH_RPC_BEARER_TOKEN");

        let chain_id = match opt("CHAIN_ID") {
            Some(v) => {
                let id: u64 = v.parse().with_context(|| format!("CHAIN_ID is not a number: {v}"))?;
                ChainId::try_from(id)
                    .with_context(|| format!("CHAIN_ID {id} does not fit in 16 bits"))?
            }
            None => ChainId::MAINNET,
        };

        let poll_interval = Duration::from_secs(parse_or(&opt, "PORTAL_BRIDGE_POLL_SECS", 6)?);
        let receipt_poll = Duration::from_secs(parse_or(&opt, "RECEIPT_POLL_SECS", 2)?);
        if poll_interval.is_zero() || receipt_poll.is_zero() {
            bail!("poll intervals must be at least one second");
        }
        let receipt_timeout = match parse_or(&opt, "RECEIPT_TIMEOUT_SECS", 0)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let targets = match opt("PORTAL_BRIDGE_TARGETS").as_deref() {
            None | Some("all") => TargetPolicy::All,
            Some(n) => match n.parse::<usize>() {
                Ok(count) if count > 0 => TargetPolicy::Closest(count),
                _ => bail!("PORTAL_BRIDGE_TARGETS must be `all` or a positive node count, got {n}"),
            },
        };

        // Non-mainnet chains default to every fork active from genesis
        let base = if chain_id == ChainId::MAINNET {
            ForkSchedule::mainnet()
        } else {
            ForkSchedule::genesis()
        };
        let forks = ForkSchedule {
            byzantium: parse_or(&opt, "BYZANTIUM_BLOCK", base.byzantium)?,
            berlin: parse_or(&opt, "BERLIN_BLOCK", base.berlin)?,
        };
        if forks.berlin < forks.byzantium {
            bail!("BERLIN_BLOCK must not precede BYZANTIUM_BLOCK");
        }

        Ok(Self {
            portal_nodes,
            eth_rpc_url,
            eth_rpc_bearer_token,
            chain_id,
            poll_interval,
            receipt_poll,
            receipt_timeout,
            targets,
            forks,
        })
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("{key}: invalid URL {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("{key} must start with http:// or https://, got {raw}");
    }
    Ok(url)
}

fn parse_or(opt: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match opt(key) {
        Some(v) => v.parse().with_context(|| format!("{key} is not a number: {v}")),
        None => Ok(default),
    }
}

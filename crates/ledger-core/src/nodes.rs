use crate::error::{LedgerError, Result};
use std::collections::BTreeSet;

/// Known peers, keyed by normalized `host:port`.
#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `address`, returning `false` when it was already known.
    pub fn add(&mut self, address: &str) -> Result<bool> {
        let location = network_location(address)?;
        Ok(self.nodes.insert(location))
    }

    /// Registers every address or none of them. Returns how many were new.
    pub fn add_all<S: AsRef<str>>(&mut self, addresses: &[S]) -> Result<usize> {
        let locations = addresses
            .iter()
            .map(|address| network_location(address.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(locations
            .into_iter()
            .filter(|location| self.nodes.insert(location.clone()))
            .count())
    }

    pub fn contains(&self, address: &str) -> bool {
        network_location(address)
            .map(|location| self.nodes.contains(&location))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Extracts the `host[:port]` part of a URL-like address.
///
/// `http://User@Node-1:5001/get_chain?x` becomes `node-1:5001`. A bare
/// `host:port` is accepted as-is.
pub fn network_location(address: &str) -> Result<String> {
    let invalid = || LedgerError::InvalidAddress(address.to_string());

    let trimmed = address.trim();
    let rest = match trimmed.find("://") {
        Some(pos) => &trimmed[pos + 3..],
        None => trimmed,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = match authority.rfind('@') {
        Some(pos) => &authority[pos + 1..],
        None => authority,
    };

    let (host, port) = split_port(host_port).ok_or_else(invalid)?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }

    let host = host.to_ascii_lowercase();
    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

/// Splits off an optional numeric port, honouring bracketed IPv6 hosts.
fn split_port(host_port: &str) -> Option<(&str, Option<u16>)> {
    let (host, port) = if let Some(stripped) = host_port.strip_prefix('[') {
        let close = stripped.find(']')?;
        let host = &host_port[..close + 2];
        match &stripped[close + 1..] {
            "" => (host, None),
            tail => (host, Some(tail.strip_prefix(':')?)),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    match port {
        None => Some((host, None)),
        Some(port) => port.parse::<u16>().ok().map(|p| (host, Some(p))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_location_examples() {
        assert_eq!(network_location("http://127.0.0.1:5001").unwrap(), "127.0.0.1:5001");
        assert_eq!(
            network_location("https://Node-1.example:8443/get_chain?full=1#top").unwrap(),
            "node-1.example:8443"
        );
        assert_eq!(network_location("127.0.0.1:5002").unwrap(), "127.0.0.1:5002");
        assert_eq!(network_location("http://alice@peer").unwrap(), "peer");
        assert_eq!(network_location("http://[::1]:5000/").unwrap(), "[::1]:5000");
        assert_eq!(network_location("  http://peer:1  ").unwrap(), "peer:1");
    }

    #[test]
    fn network_location_rejects_garbage() {
        for bad in ["", "http://", "http://:5000", "peer:notaport", "peer:70000", "http://[::1"] {
            assert!(
                matches!(network_location(bad), Err(LedgerError::InvalidAddress(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn add_deduplicates_by_location() {
        let mut nodes = NodeRegistry::new();
        assert!(nodes.add("http://127.0.0.1:5001").unwrap());
        assert!(!nodes.add("http://127.0.0.1:5001").unwrap());
        assert!(!nodes.add("http://127.0.0.1:5001/get_chain").unwrap());
        assert!(!nodes.add("127.0.0.1:5001").unwrap());
        assert!(nodes.add("http://127.0.0.1:5002").unwrap());
        assert_eq!(nodes.len(), 2);
        assert!(nodes.contains("https://127.0.0.1:5002"));
        assert!(!nodes.contains("127.0.0.1:5003"));
    }

    #[test]
    fn invalid_address_leaves_registry_untouched() {
        let mut nodes = NodeRegistry::new();
        assert!(nodes.add("http://").is_err());
        assert!(nodes.is_empty());
    }

    #[test]
    fn add_all_is_all_or_nothing() {
        let mut nodes = NodeRegistry::new();
        assert!(matches!(
            nodes.add_all(&["http://a:1", "http://b:1", "http://"]),
            Err(LedgerError::InvalidAddress(bad)) if bad == "http://"
        ));
        assert!(nodes.is_empty());

        assert_eq!(nodes.add_all(&["http://a:1", "a:1", "http://b:1/x"]).unwrap(), 2);
        assert_eq!(nodes.add_all(&["b:1", "c:1"]).unwrap(), 1);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn iter_enumerates_every_node() {
        let mut nodes = NodeRegistry::new();
        nodes.add("http://b:1").unwrap();
        nodes.add("http://a:1").unwrap();
        let all: Vec<_> = nodes.iter().collect();
        assert_eq!(all, vec!["a:1", "b:1"]);
    }
}

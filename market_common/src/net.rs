//! Shared networking constants and helpers used by the watchface and the companion.

/// UDP port the companion listens on for refresh triggers.
pub const COMPANION_PORT: u16 = 9190;
/// UDP port the watchface listens on for market payloads and acknowledgements.
pub const WATCH_PORT: u16 = 9191;
/// Largest datagram either side expects to receive.
pub const MAX_DATAGRAM: usize = 2048;

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_ip_and_port() {
        assert_eq!(addr("127.0.0.1", WATCH_PORT), "127.0.0.1:9191");
    }
}

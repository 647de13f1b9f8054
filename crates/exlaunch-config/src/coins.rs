//! Known coin and network pairs served by ElectrumX-family servers.

use crate::error::{ConfigError, ConfigResult};

/// Per-network defaults used when checking a launch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinProfile {
    /// Coin name as accepted in `COIN`.
    pub name: &'static str,
    /// Network name as accepted in `NET`.
    pub net: &'static str,
    /// Default daemon RPC port appended to `DAEMON_URL` when missing.
    pub rpc_port: u16,
    /// Default client TCP port advertised to peers.
    pub tcp_port: u16,
    /// Default client TLS port advertised to peers.
    pub ssl_port: u16,
}

const COINS: &[CoinProfile] = &[
    CoinProfile {
        name: "Bitcoin",
        net: "mainnet",
        rpc_port: 8332,
        tcp_port: 50001,
        ssl_port: 50002,
    },
    CoinProfile {
        name: "BitcoinSegwit",
        net: "mainnet",
        rpc_port: 8332,
        tcp_port: 50001,
        ssl_port: 50002,
    },
    CoinProfile {
        name: "Bitcoin",
        net: "testnet",
        rpc_port: 18332,
        tcp_port: 51001,
        ssl_port: 51002,
    },
    CoinProfile {
        name: "BitcoinSegwit",
        net: "testnet",
        rpc_port: 18332,
        tcp_port: 51001,
        ssl_port: 51002,
    },
    CoinProfile {
        name: "Qtum",
        net: "mainnet",
        rpc_port: 3889,
        tcp_port: 50001,
        ssl_port: 50002,
    },
    CoinProfile {
        name: "Qtum",
        net: "testnet",
        rpc_port: 13889,
        tcp_port: 51001,
        ssl_port: 51002,
    },
];

/// Find the profile for `coin` on `net`, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCoin`] when no profile matches.
pub fn lookup_coin(coin: &str, net: &str) -> ConfigResult<&'static CoinProfile> {
    COINS
        .iter()
        .find(|profile| {
            profile.name.eq_ignore_ascii_case(coin.trim())
                && profile.net.eq_ignore_ascii_case(net.trim())
        })
        .ok_or_else(|| ConfigError::UnknownCoin {
            coin: coin.to_string(),
            net: net.to_string(),
        })
}

/// There are four networks: bitcoin (mainnet), testnet, signet, and regtest.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bitcoin has multiple networks, each with its own blockchain.
///
/// The network determines the prefixes used when encoding addresses, private keys and extended
/// keys. Testnet and signet share all of these prefixes so an encoded address can not tell them
/// apart; decoding always reports [Network::Testnet] in that case.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    #[serde(alias = "main", alias = "mainnet")]
    Bitcoin,
    #[serde(alias = "test")]
    Testnet,
    Signet,
    Regtest,
}

impl Network {
    /// The version byte prepended to a public key hash in a base58 P2PKH address.
    pub fn p2pkh_prefix(&self) -> u8 {
        match self {
            Network::Bitcoin => 0,
            _ => 111,
        }
    }

    /// The version byte prepended to a script hash in a base58 P2SH address.
    pub fn p2sh_prefix(&self) -> u8 {
        match self {
            Network::Bitcoin => 5,
            _ => 196,
        }
    }

    /// The private key prefix is used for the WIF encoding of a private key.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Bitcoin => 0x80,
            _ => 0xef,
        }
    }

    /// The human readable part of a bech32 segwit address.
    pub fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bc",
            Network::Testnet | Network::Signet => "tb",
            Network::Regtest => "bcrt",
        }
    }

    /// The version bytes of a serialized BIP32 extended public key.
    pub fn xpub_version(&self) -> [u8; 4] {
        match self {
            Network::Bitcoin => [0x04, 0x88, 0xb2, 0x1e],
            _ => [0x04, 0x35, 0x87, 0xcf],
        }
    }

    /// Find the network from a P2PKH or P2SH address version byte.
    ///
    /// Returns the network and whether the version byte is for a script hash.
    pub fn from_address_prefix(prefix: u8) -> Option<(Network, bool)> {
        match prefix {
            0 => Some((Network::Bitcoin, false)),
            5 => Some((Network::Bitcoin, true)),
            111 => Some((Network::Testnet, false)),
            196 => Some((Network::Testnet, true)),
            _ => None,
        }
    }

    /// Find the network from a bech32 human readable part. Upper or lower case is accepted.
    pub fn from_bech32_hrp(hrp: &str) -> Option<Network> {
        match hrp {
            "bc" | "BC" => Some(Network::Bitcoin),
            "tb" | "TB" => Some(Network::Testnet),
            "bcrt" | "BCRT" => Some(Network::Regtest),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Network::Bitcoin => "bitcoin",
            Network::Testnet => "testnet",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        })
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" | "main" | "mainnet" => Ok(Network::Bitcoin),
            "testnet" | "test" => Ok(Network::Testnet),
            "signet" => Ok(Network::Signet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(Error::InvalidNetworkSpecifier(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_serialize_network() {
        let json = serde_json::to_string(&Network::Bitcoin).unwrap();
        assert_eq!(json, "\"bitcoin\"");
        let json = serde_json::to_string(&Network::Testnet).unwrap();
        assert_eq!(json, "\"testnet\"");
        let json = serde_json::to_string(&Network::Signet).unwrap();
        assert_eq!(json, "\"signet\"");
        let json = serde_json::to_string(&Network::Regtest).unwrap();
        assert_eq!(json, "\"regtest\"");
    }

    #[test]
    fn json_deserialize_aliases() {
        let n: Network = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(n, Network::Bitcoin);
        let n: Network = serde_json::from_str("\"main\"").unwrap();
        assert_eq!(n, Network::Bitcoin);
        let n: Network = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(n, Network::Testnet);
        assert!(serde_json::from_str::<Network>("\"stn\"").is_err());
    }

    #[test]
    fn from_str_display() {
        for n in [Network::Bitcoin, Network::Testnet, Network::Signet, Network::Regtest] {
            assert_eq!(Network::from_str(&n.to_string()).unwrap(), n);
        }
        assert!(matches!(
            Network::from_str("litecoin"),
            Err(Error::InvalidNetworkSpecifier(_))
        ));
    }

    #[test]
    fn prefixes() {
        assert_eq!(Network::from_address_prefix(Network::Bitcoin.p2sh_prefix()), Some((Network::Bitcoin, true)));
        assert_eq!(Network::from_address_prefix(Network::Signet.p2pkh_prefix()), Some((Network::Testnet, false)));
        assert_eq!(Network::from_address_prefix(0x30), None);
        assert_eq!(Network::from_bech32_hrp(Network::Regtest.bech32_hrp()), Some(Network::Regtest));
        assert_eq!(Network::from_bech32_hrp("Bc"), None);
    }
}

// ── Persistent randomized MAC assignment ──
//
// A profile identity keeps the same randomized MAC for life, including
// across remove and re-add. The durable map is the source of truth; the
// generator only runs for identities it has never seen.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::external::MacGenerator;
use crate::model::MacAddress;

const GENERATOR_ATTEMPTS: usize = 2;

/// Derives a MAC from a keyed SHA-256 of the config key.
#[derive(Debug, Clone)]
pub struct Sha256MacGenerator {
    secret: Vec<u8>,
}

impl Sha256MacGenerator {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// A generator keyed with fresh random bytes. MACs are stable only as
    /// long as the durable map remembers them.
    pub fn random() -> Self {
        Self::new(rand::random::<[u8; 32]>().to_vec())
    }
}

impl MacGenerator for Sha256MacGenerator {
    fn generate(&self, config_key: &str) -> Option<MacAddress> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(config_key.as_bytes());
        let digest = hasher.finalize();

        let mut octets = [0u8; 6];
        octets.copy_from_slice(digest.get(..6)?);
        let mac = MacAddress::from_octets(locally_administered_unicast(octets));
        is_usable(&mac).then_some(mac)
    }
}

/// Owns the durable `config key -> MAC` map and the generator.
pub struct MacAddressRandomizer {
    generator: Box<dyn MacGenerator>,
    durable: BTreeMap<String, MacAddress>,
}

impl MacAddressRandomizer {
    pub fn new(generator: Box<dyn MacGenerator>) -> Self {
        Self {
            generator,
            durable: BTreeMap::new(),
        }
    }

    /// The MAC for `config_key`: remembered if known, freshly generated and
    /// remembered otherwise. Never the placeholder.
    pub fn assign(&mut self, config_key: &str) -> MacAddress {
        if let Some(mac) = self.durable.get(config_key) {
            return mac.clone();
        }

        let generated = (0..GENERATOR_ATTEMPTS).find_map(|attempt| {
            let mac = self.generator.generate(config_key).filter(is_usable);
            if mac.is_none() {
                debug!(config_key, attempt, "MAC generator returned nothing usable");
            }
            mac
        });
        let mac = generated.unwrap_or_else(|| {
            warn!(config_key, "MAC generator failed, using random fallback");
            random_fallback()
        });

        self.durable.insert(config_key.to_owned(), mac.clone());
        mac
    }

    pub fn durable_map(&self) -> &BTreeMap<String, MacAddress> {
        &self.durable
    }

    /// Replace the durable map with what the store read back.
    pub fn load(&mut self, map: BTreeMap<String, MacAddress>) {
        self.durable = map;
    }
}

fn locally_administered_unicast(mut octets: [u8; 6]) -> [u8; 6] {
    octets[0] = (octets[0] & 0xfc) | 0x02;
    octets
}

fn is_usable(mac: &MacAddress) -> bool {
    match mac.octets() {
        Some(o) => !mac.is_placeholder() && o[0] & 0x01 == 0 && o[0] & 0x02 != 0,
        None => false,
    }
}

fn random_fallback() -> MacAddress {
    loop {
        let mac = MacAddress::from_octets(locally_administered_unicast(rand::random()));
        if is_usable(&mac) {
            return mac;
        }
    }
}

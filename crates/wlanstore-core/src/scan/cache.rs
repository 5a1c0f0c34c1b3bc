use std::collections::{BTreeMap, BTreeSet};

use crate::model::{MacAddress, NetworkId, ScanDetail};

/// Bounded cache of sightings for one profile, keyed by BSSID.
///
/// Once the cache holds `max_size` entries, inserting a new BSSID first
/// trims it to the `trim_size` most recent sightings.
#[derive(Debug, Clone)]
pub struct ScanDetailCache {
    network_id: NetworkId,
    max_size: usize,
    trim_size: usize,
    entries: BTreeMap<MacAddress, ScanDetail>,
}

impl ScanDetailCache {
    pub fn new(network_id: NetworkId, max_size: usize, trim_size: usize) -> Self {
        Self {
            network_id,
            max_size,
            trim_size: trim_size.min(max_size),
            entries: BTreeMap::new(),
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    /// Insert a sighting, replacing any earlier one for the same BSSID.
    pub fn put(&mut self, detail: ScanDetail) {
        if !self.entries.contains_key(&detail.bssid) && self.entries.len() >= self.max_size {
            self.trim();
        }
        self.entries.insert(detail.bssid.clone(), detail);
    }

    pub fn get(&self, bssid: &MacAddress) -> Option<&ScanDetail> {
        self.entries.get(bssid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ScanDetail> {
        self.entries.values()
    }

    /// Frequencies seen strictly more recently than `age_ms` before `now_ms`.
    pub fn frequencies_seen_within(&self, now_ms: i64, age_ms: u64) -> impl Iterator<Item = u32> + '_ {
        let age = i64::try_from(age_ms).unwrap_or(i64::MAX);
        self.entries
            .values()
            .filter(move |d| now_ms.saturating_sub(d.seen_millis) < age)
            .map(|d| d.frequency_mhz)
    }

    /// Sightings ordered newest first.
    pub fn most_recent(&self) -> Vec<&ScanDetail> {
        let mut sorted: Vec<&ScanDetail> = self.entries.values().collect();
        sorted.sort_by(|a, b| b.seen_millis.cmp(&a.seen_millis));
        sorted
    }

    fn trim(&mut self) {
        let keep: BTreeSet<MacAddress> = self
            .most_recent()
            .into_iter()
            .take(self.trim_size)
            .map(|d| d.bssid.clone())
            .collect();
        self.entries.retain(|bssid, _| keep.contains(bssid));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sighting(i: u8, seen: i64) -> ScanDetail {
        ScanDetail::new(
            "home",
            MacAddress::from_octets([0xd2, 0x11, 0x19, 0x34, 0xa5, i]),
            "[WPA2-PSK-CCMP][ESS]",
            2412,
            -50,
            seen,
        )
    }

    #[test]
    fn same_bssid_replaces_entry() {
        let mut cache = ScanDetailCache::new(NetworkId::new(0), 192, 128);
        cache.put(sighting(1, 10));
        cache.put(sighting(1, 20));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.values().next().unwrap().seen_millis, 20);
    }

    #[test]
    fn insert_past_max_trims_to_trim_plus_one() {
        let mut cache = ScanDetailCache::new(NetworkId::new(0), 192, 128);
        for i in 0..192u8 {
            cache.put(sighting(i, i64::from(i)));
        }
        assert_eq!(cache.len(), 192);

        cache.put(sighting(200, 1_000));
        assert_eq!(cache.len(), 129);
        // The oldest sightings went first.
        let first = MacAddress::from_octets([0xd2, 0x11, 0x19, 0x34, 0xa5, 0]);
        assert!(cache.get(&first).is_none());
        let newest = MacAddress::from_octets([0xd2, 0x11, 0x19, 0x34, 0xa5, 191]);
        assert!(cache.get(&newest).is_some());
    }

    #[test]
    fn frequency_age_is_exclusive() {
        let mut cache = ScanDetailCache::new(NetworkId::new(0), 192, 128);
        let mut old = sighting(1, 0);
        old.frequency_mhz = 5180;
        cache.put(old);
        cache.put(sighting(2, 50));

        let freqs: Vec<u32> = cache.frequencies_seen_within(100, 100).collect();
        assert_eq!(freqs, vec![2412]);
        let freqs: Vec<u32> = cache.frequencies_seen_within(100, 101).collect();
        assert_eq!(freqs.len(), 2);
    }
}

// ── Scan correlation ──
//
// Per-profile caches of scan sightings, and the rule deciding which
// profile a sighting belongs to.

mod cache;
mod matcher;

pub use cache::ScanDetailCache;
pub use matcher::matches_profile;

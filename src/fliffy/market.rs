//! Simulated trading pool: background sellers list random Fliffys.

use super::catalog::Catalog;
use super::random::{generate_fliffy, pick_index, RandomSource};
use super::state::{Market, TradeListing};

/// Above this size one random listing is evicted before the next is added.
pub const MARKET_CAPACITY: usize = 15;

/// Listings offered when a session starts.
pub const INITIAL_MARKET_LISTINGS: usize = 8;

/// A random listing priced at 1000–3000 seconds of the Fliffy's income.
pub fn simulated_listing(catalog: &Catalog, rng: &mut dyn RandomSource) -> TradeListing {
    let fliffy = generate_fliffy(catalog, rng, None);
    let listing_id = rng.next_id();
    let price = (fliffy.income * (1000.0 + rng.next_f64() * 2000.0)).floor();
    TradeListing {
        listing_id,
        fliffy,
        price,
    }
}

/// Fresh pool for a new session.
pub fn seed_market(catalog: &Catalog, rng: &mut dyn RandomSource) -> Market {
    let listings = (0..INITIAL_MARKET_LISTINGS)
        .map(|_| simulated_listing(catalog, rng))
        .collect();
    Market { listings }
}

/// One simulator step. The pool never grows past `MARKET_CAPACITY + 1`.
pub fn market_tick(market: &mut Market, catalog: &Catalog, rng: &mut dyn RandomSource) {
    if market.listings.len() > MARKET_CAPACITY {
        let idx = pick_index(rng, market.listings.len());
        let evicted = market.listings.remove(idx);
        log::debug!("market evicted listing {}", evicted.listing_id);
    }
    market.listings.push(simulated_listing(catalog, rng));
}

//! End-to-end opportunity searches against in-memory collaborators.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sitescout_core::{
    BrandRoster, CandidateProperty, Coordinates, GeoBounds, ListingSite, OpportunitySignal,
    PropertySource, PropertyType, ScrapedListing, SignalStrength, SignalType,
};
use sitescout_ranking::{
    Clock, Collaborators, CompetitorStore, DemographicsService, EligibilityFilters,
    EnrichmentSettings, ListingStore, ManualClock, MarketCaches, OpportunitySearch, PoiService,
    PopulationEstimate, PropertySearch, RankingError, RankingSettings, RetailAnchor,
    ScoringToggles, SearchResults, SourceError, StorePoint,
};

#[derive(Clone, Copy)]
enum Outage {
    None,
    MissingKey,
    Down,
}

fn outage_error(service: &str, outage: Outage) -> Option<SourceError> {
    match outage {
        Outage::None => None,
        Outage::MissingKey => Some(SourceError::MissingCredential(
            "SITESCOUT_PROPERTY_SEARCH_API_KEY".to_string(),
        )),
        Outage::Down => Some(SourceError::Request {
            service: service.to_string(),
            reason: "503 Service Unavailable".to_string(),
        }),
    }
}

struct Government {
    records: Vec<CandidateProperty>,
    outage: Outage,
    calls: AtomicU32,
}

#[async_trait]
impl PropertySearch for Government {
    async fn search(
        &self,
        _bounds: &GeoBounds,
        property_types: &[PropertyType],
        limit: usize,
    ) -> Result<Vec<CandidateProperty>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = outage_error("property_search", self.outage) {
            return Err(e);
        }
        Ok(self
            .records
            .iter()
            .filter(|r| property_types.contains(&r.property_type))
            .take(limit)
            .cloned()
            .collect())
    }
}

struct Listings {
    rows: Vec<ScrapedListing>,
    outage: Outage,
}

#[async_trait]
impl ListingStore for Listings {
    async fn query_active(
        &self,
        _bounds: &GeoBounds,
        _property_types: &[PropertyType],
    ) -> Result<Vec<ScrapedListing>, SourceError> {
        if let Some(e) = outage_error("listing_store", self.outage) {
            return Err(e);
        }
        Ok(self.rows.clone())
    }
}

struct Market {
    stores: Vec<StorePoint>,
    population: PopulationEstimate,
    anchors: Vec<RetailAnchor>,
    outage: Outage,
    demographic_calls: AtomicU32,
    poi_calls: AtomicU32,
}

#[async_trait]
impl CompetitorStore for Market {
    async fn query(
        &self,
        brands: &[String],
        _bounds: &GeoBounds,
    ) -> Result<Vec<StorePoint>, SourceError> {
        if let Some(e) = outage_error("competitor_store", self.outage) {
            return Err(e);
        }
        Ok(self
            .stores
            .iter()
            .filter(|s| brands.contains(&s.brand))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DemographicsService for Market {
    async fn fetch(
        &self,
        _center: Coordinates,
        _radii_miles: &[f64],
    ) -> Result<PopulationEstimate, SourceError> {
        self.demographic_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = outage_error("demographics", self.outage) {
            return Err(e);
        }
        Ok(self.population)
    }
}

#[async_trait]
impl PoiService for Market {
    async fn fetch(
        &self,
        _center: Coordinates,
        _radius_meters: u32,
        _categories: &[String],
    ) -> Result<Vec<RetailAnchor>, SourceError> {
        self.poi_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = outage_error("poi", self.outage) {
            return Err(e);
        }
        Ok(self.anchors.clone())
    }
}

struct World {
    government: Arc<Government>,
    market: Arc<Market>,
    search: OpportunitySearch,
}

fn government_record(
    id: &str,
    point: Option<(f64, f64)>,
    property_type: PropertyType,
) -> CandidateProperty {
    CandidateProperty {
        id: id.to_string(),
        address: format!("{id} County Rd"),
        coordinates: point.map(|(lat, lng)| Coordinates::new(lat, lng)),
        property_type,
        source: PropertySource::GovernmentRecord,
        building_sqft: None,
        lot_acres: None,
        land_use: None,
        signals: Vec::new(),
    }
}

fn vacant_land(id: &str, lat: f64, lng: f64, acres: f64) -> CandidateProperty {
    CandidateProperty {
        lot_acres: Some(acres),
        land_use: Some("Vacant commercial".to_string()),
        signals: vec![OpportunitySignal::new(
            SignalType::VacantLand,
            "No improvements on record",
            SignalStrength::Medium,
        )],
        ..government_record(id, Some((lat, lng)), PropertyType::Land)
    }
}

fn crexi_listing(id: &str, lat: f64, lng: f64) -> ScrapedListing {
    ScrapedListing {
        id: id.to_string(),
        site: ListingSite::Crexi,
        address: "1 Market Sq".to_string(),
        latitude: Some(lat),
        longitude: Some(lng),
        property_type: "Retail".to_string(),
        building_sqft: Some(3_000.0),
        lot_acres: None,
        description: Some("End cap with drive-thru potential".to_string()),
        asking_price: Some(850_000.0),
        listing_url: None,
        last_seen_at: Utc.with_ymd_and_hms(2025, 5, 20, 0, 0, 0).unwrap(),
    }
}

fn viewport() -> GeoBounds {
    GeoBounds::new(39.95, 40.05, -95.05, -94.95).unwrap()
}

fn world(
    records: Vec<CandidateProperty>,
    listings: Vec<ScrapedListing>,
    government_outage: Outage,
    listing_outage: Outage,
    market_outage: Outage,
) -> World {
    let government = Arc::new(Government {
        records,
        outage: government_outage,
        calls: AtomicU32::new(0),
    });
    let market = Arc::new(Market {
        stores: vec![
            StorePoint {
                lat: 40.08,
                lng: -95.0,
                brand: "Dutch Bros".to_string(),
            },
            StorePoint {
                lat: 40.004,
                lng: -95.0,
                brand: "Scooter's Coffee".to_string(),
            },
        ],
        population: PopulationEstimate {
            pop_1mi: 15_000,
            pop_3mi: 30_000,
        },
        anchors: vec![RetailAnchor {
            name: "Hy-Vee".to_string(),
            lat: 40.002,
            lng: -95.0,
        }],
        outage: market_outage,
        demographic_calls: AtomicU32::new(0),
        poi_calls: AtomicU32::new(0),
    });
    let collaborators = Collaborators {
        property_search: Arc::clone(&government) as Arc<dyn PropertySearch>,
        listings: Arc::new(Listings {
            rows: listings,
            outage: listing_outage,
        }),
        competitors: Arc::clone(&market) as Arc<dyn CompetitorStore>,
        demographics: Arc::clone(&market) as Arc<dyn DemographicsService>,
        poi: Arc::clone(&market) as Arc<dyn PoiService>,
    };
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
    ));
    let caches = Arc::new(MarketCaches::new(
        Duration::hours(24),
        Duration::hours(1),
        clock,
    ));
    let settings = RankingSettings {
        property_search_limit: 200,
        enrichment: EnrichmentSettings {
            brands: BrandRoster {
                flagship: "Dutch Bros".to_string(),
                family: vec!["Scooter's Coffee".to_string()],
            },
            cache_precision: 1,
            competitor_buffer_miles: 10.0,
            family_buffer_miles: 5.0,
            retail_anchor_radius_meters: 2_414,
            retail_anchor_categories: vec!["supermarket".to_string()],
        },
    };
    World {
        government,
        market,
        search: OpportunitySearch::new(collaborators, caches, settings),
    }
}

fn healthy(records: Vec<CandidateProperty>, listings: Vec<ScrapedListing>) -> World {
    world(records, listings, Outage::None, Outage::None, Outage::None)
}

async fn run(world: &World, limit: usize) -> Result<SearchResults, RankingError> {
    world
        .search
        .search_opportunities(
            &viewport(),
            &EligibilityFilters::default(),
            &ScoringToggles::default(),
            limit,
        )
        .await
}

#[tokio::test]
async fn government_duplicate_of_a_listing_is_dropped() {
    let w = healthy(
        vec![vacant_land("parcel-7", 40.0003, -95.0002, 1.0)],
        vec![crexi_listing("L1", 40.0, -95.0)],
    );

    let results = run(&w, 10).await.unwrap();

    let ids: Vec<&str> = results
        .ranked_opportunities
        .iter()
        .map(|o| o.property.id.as_str())
        .collect();
    assert_eq!(ids, vec!["crexi:L1"]);
}

#[tokio::test]
async fn results_are_ranked_by_score_and_limited() {
    let records = vec![
        vacant_land("far-big", 40.04, -95.04, 1.9),
        vacant_land("near-ideal", 40.001, -95.0, 1.0),
        vacant_land("mid", 40.02, -95.02, 1.5),
    ];
    let w = healthy(records, vec![crexi_listing("L9", 40.003, -95.0)]);

    let results = run(&w, 3).await.unwrap();
    let ranked = &results.ranked_opportunities;

    assert_eq!(ranked.len(), 3);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(
        ranked.iter().map(|o| o.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    for opportunity in ranked {
        assert!(
            !opportunity.priority_signals.is_empty(),
            "{} has no signals",
            opportunity.property.id
        );
    }
    assert_eq!(ranked[0].property.id, "crexi:L9");
}

#[tokio::test]
async fn market_context_is_reported_on_each_opportunity() {
    let w = healthy(vec![vacant_land("p1", 40.0, -95.0, 1.0)], Vec::new());

    let results = run(&w, 10).await.unwrap();
    let top = &results.ranked_opportunities[0];

    assert_eq!(results.competitor_store_count, 1);
    assert_eq!(results.family_brand_store_count, 1);
    assert_eq!(results.retail_anchor_count, 1);
    assert_eq!(
        results.viewport_population,
        Some(PopulationEstimate {
            pop_1mi: 15_000,
            pop_3mi: 30_000
        })
    );
    assert_eq!(top.nearest_family_brand.as_deref(), Some("Scooter's Coffee"));
    assert_eq!(top.nearest_retail_anchor.as_deref(), Some("Hy-Vee"));
    let competitor = top.nearest_competitor_miles.unwrap();
    assert!((competitor - 5.5).abs() < 0.1, "got {competitor}");
    // 40 population + 35 anchor + 20 gap + 25 land + 15 size + 10 family
    assert_eq!(top.score, 145);
}

#[tokio::test]
async fn repeated_search_is_idempotent_and_cached() {
    let w = healthy(
        vec![
            vacant_land("a", 40.01, -95.0, 1.0),
            vacant_land("b", 40.02, -95.01, 1.6),
        ],
        vec![crexi_listing("L1", 39.99, -94.99)],
    );

    let first = run(&w, 10).await.unwrap();
    let second = run(&w, 10).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(w.market.demographic_calls.load(Ordering::SeqCst), 1);
    assert_eq!(w.market.poi_calls.load(Ordering::SeqCst), 1);
    assert_eq!(w.government.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_search_credential_is_a_configuration_error() {
    let w = world(
        vec![vacant_land("a", 40.0, -95.0, 1.0)],
        Vec::new(),
        Outage::MissingKey,
        Outage::None,
        Outage::None,
    );
    let err = run(&w, 10).await.unwrap_err();
    assert!(matches!(err, RankingError::Configuration(_)), "got {err}");
}

#[tokio::test]
async fn government_search_failure_fails_the_request() {
    let w = world(
        Vec::new(),
        vec![crexi_listing("L1", 40.0, -95.0)],
        Outage::Down,
        Outage::None,
        Outage::None,
    );
    let err = run(&w, 10).await.unwrap_err();
    assert!(matches!(err, RankingError::Collector(_)), "got {err}");
    assert!(err.to_string().contains("property search failed"));
}

#[tokio::test]
async fn listing_store_failure_keeps_government_results() {
    let w = world(
        vec![vacant_land("a", 40.0, -95.0, 1.0)],
        vec![crexi_listing("L1", 40.01, -95.0)],
        Outage::None,
        Outage::Down,
        Outage::None,
    );
    let results = run(&w, 10).await.unwrap();
    assert_eq!(results.ranked_opportunities.len(), 1);
    assert_eq!(results.ranked_opportunities[0].property.id, "a");
}

#[tokio::test]
async fn enrichment_outage_degrades_to_absent_fields() {
    let w = world(
        vec![vacant_land("a", 40.0, -95.0, 1.0)],
        Vec::new(),
        Outage::None,
        Outage::None,
        Outage::Down,
    );

    let results = run(&w, 10).await.unwrap();
    let only = &results.ranked_opportunities[0];

    assert_eq!(results.competitor_store_count, 0);
    assert_eq!(results.family_brand_store_count, 0);
    assert_eq!(results.retail_anchor_count, 0);
    assert!(results.viewport_population.is_none());
    assert!(only.nearest_competitor_miles.is_none());
    assert!(only.nearest_retail_anchor.is_none());
    assert!(only.population_1mi.is_none());
    assert_eq!(only.score, 40, "availability and size fit still score");
}

#[tokio::test]
async fn survivors_are_eligible_types_with_coordinates() {
    let mut strip_center = government_record("strip", Some((40.0, -95.01)), PropertyType::Retail);
    strip_center.building_sqft = Some(12_000.0);
    strip_center.land_use = Some("strip center".to_string());
    strip_center.signals.push(OpportunitySignal::new(
        SignalType::VacantProperty,
        "Utility shutoff",
        SignalStrength::High,
    ));
    let mut occupied = government_record("occupied", Some((40.0, -95.02)), PropertyType::Office);
    occupied.building_sqft = Some(3_000.0);
    let mut boutique = government_record("boutique", Some((40.0, -95.03)), PropertyType::Retail);
    boutique.building_sqft = Some(3_200.0);
    boutique.land_use = Some("Closed boutique".to_string());
    let unlocated = CandidateProperty {
        coordinates: None,
        ..vacant_land("unlocated", 0.0, 0.0, 1.0)
    };
    let warehouse = government_record("warehouse", Some((40.0, -95.04)), PropertyType::Industrial);

    let w = healthy(
        vec![strip_center, occupied, boutique, unlocated, warehouse],
        Vec::new(),
    );
    let results = run(&w, 10).await.unwrap();

    let ids: Vec<&str> = results
        .ranked_opportunities
        .iter()
        .map(|o| o.property.id.as_str())
        .collect();
    assert_eq!(ids, vec!["boutique"]);
}

#[tokio::test]
async fn listings_outside_eligible_types_are_dropped() {
    let mut mixed = crexi_listing("MX", 40.01, -95.0);
    mixed.property_type = "Mixed Use - Retail/Office".to_string();
    let mut flex = crexi_listing("FX", 40.02, -95.0);
    flex.property_type = "Industrial Flex".to_string();
    let mut pad = crexi_listing("LOT", 40.03, -95.0);
    pad.property_type = "Land".to_string();
    pad.building_sqft = None;
    pad.lot_acres = Some(1.1);

    let w = healthy(Vec::new(), vec![mixed, flex, crexi_listing("RT", 40.0, -95.0), pad]);
    let results = run(&w, 10).await.unwrap();

    let mut ids: Vec<&str> = results
        .ranked_opportunities
        .iter()
        .map(|o| o.property.id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["crexi:LOT", "crexi:RT"]);
    for opportunity in &results.ranked_opportunities {
        assert!(matches!(
            opportunity.property.property_type,
            PropertyType::Land | PropertyType::Retail | PropertyType::Office
        ));
    }
}

#[tokio::test]
async fn disabled_factors_skip_their_lookups() {
    let w = healthy(vec![vacant_land("a", 40.0, -95.0, 1.0)], Vec::new());
    let toggles = ScoringToggles {
        population: false,
        retail_anchors: false,
        competitor_gap: false,
        family_brands: false,
    };

    let results = w
        .search
        .search_opportunities(&viewport(), &EligibilityFilters::default(), &toggles, 10)
        .await
        .unwrap();

    assert_eq!(w.market.demographic_calls.load(Ordering::SeqCst), 0);
    assert_eq!(w.market.poi_calls.load(Ordering::SeqCst), 0);
    assert!(results.viewport_population.is_none());
    assert_eq!(results.ranked_opportunities[0].score, 40);
}

#[tokio::test]
async fn results_serialize_with_flattened_property_fields() {
    let w = healthy(Vec::new(), vec![crexi_listing("L1", 40.0, -95.0)]);
    let results = run(&w, 10).await.unwrap();

    let json = serde_json::to_value(&results).unwrap();
    let first = &json["ranked_opportunities"][0];
    assert_eq!(first["id"], "crexi:L1");
    assert_eq!(first["rank"], 1);
    assert_eq!(first["source"]["kind"], "listing_site");
    assert!(first["priority_signals"].is_array());
}

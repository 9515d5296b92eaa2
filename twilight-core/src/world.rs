//! Game world state: locations, the girl roster, and the player ledger.
//!
//! Everything here is built once at startup from static definitions. The
//! only values that change afterwards are each girl's opinion and current
//! location, the player's acquaintance set and focus, the day counter, and
//! the pending-date marker.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Locations
// ============================================================================

/// A place the player can stand in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Lowercase key, also the display name.
    pub key: String,
    pub description: String,
    /// Short flavour lines, drawn at random for observation options.
    pub observations: Vec<String>,
    /// Exit label -> destination key.
    pub exits: BTreeMap<String, String>,
}

impl Location {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            observations: Vec::new(),
            exits: BTreeMap::new(),
        }
    }

    pub fn with_observations(mut self, observations: &[&str]) -> Self {
        self.observations = observations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_exits(mut self, exits: &[(&str, &str)]) -> Self {
        self.exits = exits
            .iter()
            .map(|(label, dest)| (label.to_string(), dest.to_string()))
            .collect();
        self
    }
}

// ============================================================================
// Girls
// ============================================================================

/// How hard a girl is to win over. Static flavour data, not consulted by
/// choice resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prude {
    Easy,
    Med,
    Hard,
}

/// A girl NPC. Opinion is the sole mutable gameplay variable; the rest is
/// static configuration from the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Girl {
    /// Lowercase key and display name.
    pub name: String,
    pub opinion: i32,
    pub love: i32,
    pub prude: Prude,
    /// Preferred date location key.
    pub affinity: String,
    /// Where she is first encountered.
    pub meet_at: String,
    /// Locations she can turn up at after a day transition.
    pub see_at: Vec<String>,
    /// Where she currently is.
    pub at: String,
    /// Dialogue tree assigned by the script's `girls` section, if any.
    pub dialogue_tree: Option<String>,
}

impl Girl {
    pub fn new(
        name: impl Into<String>,
        love: i32,
        prude: Prude,
        affinity: impl Into<String>,
        meet_at: impl Into<String>,
        see_at: &[&str],
    ) -> Self {
        let meet_at = meet_at.into();
        Self {
            name: name.into(),
            opinion: 0,
            love,
            prude,
            affinity: affinity.into(),
            meet_at: meet_at.clone(),
            see_at: see_at.iter().map(|s| s.to_string()).collect(),
            at: meet_at,
            dialogue_tree: None,
        }
    }
}

// ============================================================================
// Player
// ============================================================================

/// The player character's relationship ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    known_girls: BTreeSet<String>,
    focus: Option<String>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            known_girls: BTreeSet::new(),
            focus: None,
        }
    }

    pub fn knows(&self, girl: &str) -> bool {
        self.known_girls.contains(girl)
    }

    /// Mark a girl as acquainted. Returns false when she was already known;
    /// the set only ever grows.
    pub fn make_acquaintance(&mut self, girl: &str) -> bool {
        self.known_girls.insert(girl.to_string())
    }

    pub fn known_girls(&self) -> impl Iterator<Item = &str> {
        self.known_girls.iter().map(String::as_str)
    }

    pub fn restore_known(&mut self, girls: impl IntoIterator<Item = String>) {
        self.known_girls.extend(girls);
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn set_focus(&mut self, girl: Option<String>) {
        self.focus = girl;
    }
}

// ============================================================================
// World
// ============================================================================

/// A scheduled date waiting to happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDate {
    pub girl: String,
    pub location: String,
}

/// The location graph, girl roster and day clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    locations: BTreeMap<String, Location>,
    pub girls: BTreeMap<String, Girl>,
    current: String,
    pub day: u32,
    pending_date: Option<PendingDate>,
}

impl World {
    /// Build the standard world: full location graph and girl roster,
    /// starting in the residential district on day 0.
    pub fn standard() -> Self {
        let locations: BTreeMap<String, Location> = standard_locations()
            .into_iter()
            .map(|loc| (loc.key.clone(), loc))
            .collect();
        let girls: BTreeMap<String, Girl> = standard_girls()
            .into_iter()
            .map(|girl| (girl.name.clone(), girl))
            .collect();

        Self {
            locations,
            girls,
            current: "residential district".to_string(),
            day: 0,
            pending_date: None,
        }
    }

    pub fn current_location(&self) -> &Location {
        &self.locations[&self.current]
    }

    pub fn location(&self, key: &str) -> Option<&Location> {
        self.locations.get(key)
    }

    /// Move the player. An unknown key stays put (the UI is the only input
    /// source; a stale exit is a desync, not an error). Returns arrival
    /// messages.
    pub fn travel(&mut self, key: &str) -> Vec<String> {
        if !self.locations.contains_key(key) {
            tracing::debug!(key, "travel to unknown location ignored");
            return vec![format!("You stay at the {}.", self.current)];
        }
        self.current = key.to_string();
        let location = self.current_location();

        let mut messages = vec![location.description.clone()];
        let here: Vec<&str> = self.girls_here().iter().map(|g| g.name.as_str()).collect();
        if !here.is_empty() {
            messages.push(format!("You see {}.", here.join(", ")));
        }
        messages
    }

    /// Girls currently at the player's location.
    pub fn girls_here(&self) -> Vec<&Girl> {
        self.girls
            .values()
            .filter(|girl| girl.at == self.current)
            .collect()
    }

    /// Advance the day clock and reposition each girl somewhere on her
    /// see-at list. Suppressed while a date is pending: the day cannot roll
    /// over mid-date.
    pub fn advance_day(&mut self, rng: &mut impl Rng) -> Option<String> {
        if self.pending_date.is_some() {
            return None;
        }
        self.day += 1;
        for girl in self.girls.values_mut() {
            if let Some(spot) = girl.see_at.choose(rng) {
                girl.at = spot.clone();
            }
        }
        Some(format!("Day {} begins.", self.day))
    }

    /// Schedule a date. Unknown girl or location keys are ignored (desync).
    pub fn make_date(&mut self, location: &str, girl: &str) {
        if !self.girls.contains_key(girl) || !self.locations.contains_key(location) {
            tracing::debug!(girl, location, "date with unknown girl or location ignored");
            return;
        }
        tracing::info!(girl, location, "date scheduled");
        self.pending_date = Some(PendingDate {
            girl: girl.to_string(),
            location: location.to_string(),
        });
    }

    pub fn pending_date(&self) -> Option<&PendingDate> {
        self.pending_date.as_ref()
    }

    /// Resolve the pending date: move everyone involved to the venue.
    pub fn resolve_date(&mut self) {
        if let Some(date) = self.pending_date.take() {
            self.current = date.location.clone();
            if let Some(girl) = self.girls.get_mut(&date.girl) {
                girl.at = date.location;
            }
        }
    }

    /// Force the player's position, used when restoring a saved session.
    pub fn restore_location(&mut self, key: &str) {
        if self.locations.contains_key(key) {
            self.current = key.to_string();
        }
    }
}

// ============================================================================
// Static definitions
// ============================================================================

/// The fixed location graph.
pub fn standard_locations() -> Vec<Location> {
    vec![
        Location::new("residential district", "Quiet streets, small yards.")
            .with_observations(&[
                "A sprinkler ticks across a lawn.",
                "Somebody's wind chimes won't quit.",
            ])
            .with_exits(&[("city", "city"), ("walking path", "walking path")]),
        Location::new("city", "The city centre hums along.")
            .with_observations(&[
                "Pigeons argue over a dropped pretzel.",
                "A busker plays the same four bars.",
            ])
            .with_exits(&[
                ("residential district", "residential district"),
                ("shopping district", "shopping district"),
                ("night life district", "night life district"),
                ("theatre district", "theatre district"),
                ("work", "work"),
                ("school", "school"),
            ]),
        Location::new("shopping district", "Storefronts and window shoppers.")
            .with_observations(&[
                "A mannequin has lost an arm.",
                "Two clerks race to flip their signs to OPEN.",
            ])
            .with_exits(&[("city", "city"), ("store", "store"), ("gym", "gym")]),
        Location::new("night life district", "Neon starting to warm up.")
            .with_observations(&[
                "A bouncer checks his watch.",
                "Someone rehearses an apology into a phone.",
            ])
            .with_exits(&[("city", "city"), ("bar", "bar"), ("club", "club")]),
        Location::new("historic district", "Old brick and older plaques.")
            .with_observations(&[
                "A tour guide has lost her tour.",
                "The fountain's coins outnumber its wishes.",
            ])
            .with_exits(&[("city", "city"), ("walking path", "walking path")]),
        Location::new("bar", "Low light, sticky tables.")
            .with_observations(&[
                "The jukebox only takes exact change.",
                "A dartboard with no darts in reach.",
            ])
            .with_exits(&[("night life district", "night life district")]),
        Location::new("club", "Bass you can feel in your teeth.")
            .with_observations(&[
                "The smoke machine coughs politely.",
                "Somebody claims the DJ owes them a favour.",
            ])
            .with_exits(&[("night life district", "night life district")]),
        Location::new("restaurant", "White tablecloths, small portions.")
            .with_observations(&[
                "A waiter folds napkins into swans.",
                "The specials board is all crossed out.",
            ])
            .with_exits(&[("city", "city")]),
        Location::new("store", "Fluorescent aisles, squeaky carts.")
            .with_observations(&[
                "Aisle five smells like cinnamon.",
                "A cart with one rebellious wheel.",
            ])
            .with_exits(&[("shopping district", "shopping district")]),
        Location::new("school", "Lockers and linoleum.")
            .with_observations(&[
                "A bell rings for nobody.",
                "The trophy case leans heavily on 1987.",
            ])
            .with_exits(&[("city", "city"), ("walking path", "walking path")]),
        Location::new("work", "Cubicles under humming lights.")
            .with_observations(&[
                "The printer blinks an error nobody reads.",
                "Cake in the break room, reason unknown.",
            ])
            .with_exits(&[("city", "city")]),
        Location::new("gym", "Chalk dust and clanking plates.")
            .with_observations(&[
                "Someone curls in the squat rack.",
                "A motivational poster peels at one corner.",
            ])
            .with_exits(&[("shopping district", "shopping district")]),
        Location::new("river", "Slow water, willow shade.")
            .with_observations(&[
                "A heron pretends not to watch you.",
                "Paper boat, half sunk, still proud.",
            ])
            .with_exits(&[("walking path", "walking path")]),
        Location::new("walking path", "Gravel crunch and low hedges.")
            .with_observations(&[
                "A jogger laps you without gloating. Much.",
                "Chalk arrows point both ways.",
            ])
            .with_exits(&[
                ("residential district", "residential district"),
                ("historic district", "historic district"),
                ("school", "school"),
                ("river", "river"),
                ("hiking trails", "hiking trails"),
            ]),
        Location::new("hiking trails", "Switchbacks into the pines.")
            .with_observations(&[
                "A trail marker argues with the map.",
                "Somewhere uphill, a very happy dog.",
            ])
            .with_exits(&[("walking path", "walking path")]),
        Location::new("theatre district", "Marquees and matinee crowds.")
            .with_observations(&[
                "An usher sweeps confetti into a neat pile.",
                "The Monday matinee is sold out, says a hand-taped sign.",
            ])
            .with_exits(&[("city", "city")]),
    ]
}

/// The fixed girl roster.
pub fn standard_girls() -> Vec<Girl> {
    vec![
        Girl::new("tammy", 15, Prude::Easy, "club", "bar", &[
            "bar",
            "night life district",
            "historic district",
        ]),
        Girl::new("liz", 10, Prude::Easy, "restaurant", "work", &[
            "work",
            "city",
            "shopping district",
        ]),
        Girl::new("jasmine", 5, Prude::Hard, "club", "school", &[
            "school",
            "walking path",
            "historic district",
        ]),
        Girl::new("claire", 10, Prude::Med, "club", "shopping district", &[
            "shopping district",
            "store",
            "historic district",
        ]),
        Girl::new("rebecca", 5, Prude::Med, "club", "store", &[
            "shopping district",
            "store",
            "city",
        ]),
        Girl::new("brittany", 5, Prude::Easy, "club", "night life district", &[
            "night life district",
            "bar",
            "city",
        ]),
        Girl::new("kerry", 15, Prude::Hard, "club", "hiking trails", &[
            "walking path",
            "hiking trails",
            "historic district",
        ]),
        Girl::new("ricky", 15, Prude::Med, "club", "theatre district", &[
            "theatre district",
            "school",
            "city",
        ]),
        Girl::new("donika", 10, Prude::Hard, "club", "gym", &[
            "gym",
            "work",
            "historic district",
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_world_wiring() {
        let world = World::standard();
        assert_eq!(world.current_location().key, "residential district");
        assert_eq!(world.girls.len(), 9);

        // Every exit and every girl position must reference a real location.
        for location in standard_locations() {
            for dest in location.exits.values() {
                assert!(world.location(dest).is_some(), "dangling exit to {dest}");
            }
        }
        for girl in world.girls.values() {
            assert!(world.location(&girl.meet_at).is_some());
            for spot in &girl.see_at {
                assert!(world.location(spot).is_some());
            }
        }
    }

    #[test]
    fn test_girls_start_at_meet_location() {
        let world = World::standard();
        assert_eq!(world.girls["tammy"].at, "bar");
        assert_eq!(world.girls["donika"].at, "gym");
    }

    #[test]
    fn test_travel_unknown_key_stays_put() {
        let mut world = World::standard();
        world.travel("moon base");
        assert_eq!(world.current_location().key, "residential district");
    }

    #[test]
    fn test_travel_reports_girls_present() {
        let mut world = World::standard();
        let messages = world.travel("bar");
        assert!(messages.iter().any(|m| m.contains("tammy")));
    }

    #[test]
    fn test_advance_day_repositions_within_see_at() {
        let mut world = World::standard();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            world.advance_day(&mut rng);
            for girl in world.girls.values() {
                assert!(girl.see_at.contains(&girl.at), "{} strayed to {}", girl.name, girl.at);
            }
        }
        assert_eq!(world.day, 20);
    }

    #[test]
    fn test_pending_date_suppresses_day_advance() {
        let mut world = World::standard();
        let mut rng = StdRng::seed_from_u64(7);

        world.make_date("club", "tammy");
        assert!(world.advance_day(&mut rng).is_none());
        assert_eq!(world.day, 0);

        world.resolve_date();
        assert!(world.advance_day(&mut rng).is_some());
        assert_eq!(world.day, 1);
    }

    #[test]
    fn test_resolve_date_moves_both_to_venue() {
        let mut world = World::standard();
        world.make_date("club", "tammy");
        world.resolve_date();
        assert_eq!(world.current_location().key, "club");
        assert_eq!(world.girls["tammy"].at, "club");
        assert!(world.pending_date().is_none());
    }

    #[test]
    fn test_make_date_unknown_girl_ignored() {
        let mut world = World::standard();
        world.make_date("club", "nobody");
        assert!(world.pending_date().is_none());
    }

    #[test]
    fn test_acquaintance_is_monotonic() {
        let mut player = Player::new("Protagonist");
        assert!(player.make_acquaintance("tammy"));
        assert!(!player.make_acquaintance("tammy"));
        assert!(player.knows("tammy"));
        assert!(!player.knows("liz"));
    }
}

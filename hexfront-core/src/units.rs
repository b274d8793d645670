//! Unit templates, live unit instances and the two-army roster

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::Hex;

/// One of the two armies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A = 0,
    B = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Unique per-game unit identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static combat stats shared by every instance of a unit type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTemplate {
    pub template_id: String,
    pub name: String,
    pub max_hp: u32,
    pub melee_attack: u32,
    pub ranged_attack: u32,
    /// At least 1
    pub attack_range: u32,
    /// Carried for display; damage resolution does not apply it
    pub defense: u32,
    pub speed: u32,
    pub cost: u32,
}

impl UnitTemplate {
    #[allow(clippy::too_many_arguments)]
    fn new(
        template_id: &str,
        name: &str,
        max_hp: u32,
        melee_attack: u32,
        ranged_attack: u32,
        attack_range: u32,
        defense: u32,
        speed: u32,
        cost: u32,
    ) -> Self {
        Self {
            template_id: template_id.to_string(),
            name: name.to_string(),
            max_hp,
            melee_attack,
            ranged_attack,
            attack_range: attack_range.max(1),
            defense,
            speed,
            cost,
        }
    }

    /// Minimal stand-in for a template id the catalog doesn't know
    pub fn placeholder(template_id: &str) -> Self {
        Self::new(template_id, template_id, 1, 1, 0, 1, 0, 1, 0)
    }
}

/// Template lookup, loaded once per game
#[derive(Clone, Debug, Default)]
pub struct UnitCatalog {
    templates: FxHashMap<String, Arc<UnitTemplate>>,
}

impl UnitCatalog {
    pub fn new(templates: impl IntoIterator<Item = UnitTemplate>) -> Self {
        let templates = templates
            .into_iter()
            .map(|mut t| {
                t.attack_range = t.attack_range.max(1);
                (t.template_id.clone(), Arc::new(t))
            })
            .collect();
        Self { templates }
    }

    /// Built-in unit types
    pub fn standard() -> Self {
        Self::new([
            UnitTemplate::new("infantry", "Infantry", 30, 8, 0, 1, 3, 3, 10),
            UnitTemplate::new("spearmen", "Spearmen", 35, 9, 0, 1, 4, 2, 12),
            UnitTemplate::new("archers", "Archers", 20, 3, 7, 3, 1, 3, 14),
            UnitTemplate::new("crossbowmen", "Crossbowmen", 22, 4, 9, 2, 2, 2, 16),
            UnitTemplate::new("light_cavalry", "Light Cavalry", 25, 7, 0, 1, 2, 5, 18),
            UnitTemplate::new("heavy_cavalry", "Heavy Cavalry", 40, 12, 0, 1, 5, 4, 25),
            UnitTemplate::new("catapult", "Catapult", 15, 0, 12, 4, 0, 1, 30),
        ])
    }

    pub fn get(&self, template_id: &str) -> Option<&Arc<UnitTemplate>> {
        self.templates.get(template_id)
    }

    /// Look up a template, synthesizing a placeholder for unknown ids
    pub fn resolve(&mut self, template_id: &str) -> Arc<UnitTemplate> {
        if let Some(template) = self.templates.get(template_id) {
            return Arc::clone(template);
        }
        tracing::warn!("Unknown unit template {:?}, using placeholder stats", template_id);
        let template = Arc::new(UnitTemplate::placeholder(template_id));
        self.templates
            .insert(template_id.to_string(), Arc::clone(&template));
        template
    }

    /// Templates sorted by id
    pub fn templates(&self) -> Vec<&UnitTemplate> {
        let mut all: Vec<&UnitTemplate> = self.templates.values().map(|t| t.as_ref()).collect();
        all.sort_by(|a, b| a.template_id.cmp(&b.template_id));
        all
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// A unit in play. `position == None` means not yet deployed.
#[derive(Clone, Debug)]
pub struct UnitInstance {
    pub id: UnitId,
    pub owner: Side,
    pub position: Option<Hex>,
    pub current_hp: u32,
    template: Arc<UnitTemplate>,
}

impl UnitInstance {
    pub fn template(&self) -> &UnitTemplate {
        &self.template
    }

    pub fn template_id(&self) -> &str {
        &self.template().template_id
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Alive and standing on the board
    pub fn is_active(&self) -> bool {
        self.is_alive() && self.position.is_some()
    }

    pub fn damage_taken(&self) -> u32 {
        self.template().max_hp.saturating_sub(self.current_hp)
    }
}

/// Both armies' unit instances, in purchase order
#[derive(Clone, Debug, Default)]
pub struct UnitRoster {
    catalog: UnitCatalog,
    units: Vec<UnitInstance>,
    next_id: u32,
}

impl UnitRoster {
    pub fn new(catalog: UnitCatalog) -> Self {
        Self {
            catalog,
            units: Vec::new(),
            next_id: 1,
        }
    }

    /// Build a roster from two army lists of template ids
    pub fn with_armies(catalog: UnitCatalog, army_a: &[String], army_b: &[String]) -> Self {
        let mut roster = Self::new(catalog);
        for id in army_a {
            roster.add(id, Side::A);
        }
        for id in army_b {
            roster.add(id, Side::B);
        }
        roster
    }

    /// Add an undeployed unit at full health
    pub fn add(&mut self, template_id: &str, owner: Side) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        let template = self.catalog.resolve(template_id);
        self.units.push(UnitInstance {
            id,
            owner,
            position: None,
            current_hp: template.max_hp,
            template,
        });
        id
    }

    /// Insert a unit with a fixed id and state, as read from a snapshot
    pub fn restore(
        &mut self,
        id: UnitId,
        template_id: &str,
        owner: Side,
        position: Option<Hex>,
        current_hp: u32,
    ) {
        let template = self.catalog.resolve(template_id);
        self.next_id = self.next_id.max(id.0 + 1);
        self.units.push(UnitInstance {
            id,
            owner,
            position,
            current_hp: current_hp.min(template.max_hp),
            template,
        });
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitInstance> {
        self.units.iter().find(|u| u.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitInstance> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn all(&self) -> &[UnitInstance] {
        &self.units
    }

    /// A side's units in roster order, including destroyed ones
    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &UnitInstance> + '_ {
        self.units.iter().filter(move |u| u.owner == side)
    }

    /// A side's units that are alive and on the board
    pub fn active_units(&self, side: Side) -> impl Iterator<Item = &UnitInstance> + '_ {
        self.units_of(side).filter(|u| u.is_active())
    }

    pub fn living_count(&self, side: Side) -> usize {
        self.units_of(side).filter(|u| u.is_alive()).count()
    }

    /// The living, deployed unit standing on `hex`
    pub fn unit_at(&self, hex: Hex) -> Option<&UnitInstance> {
        self.units
            .iter()
            .find(|u| u.is_alive() && u.position == Some(hex))
    }

    /// Tiles held by living units, optionally excluding one unit
    pub fn occupied_tiles(&self, except: Option<UnitId>) -> rustc_hash::FxHashSet<Hex> {
        self.units
            .iter()
            .filter(|u| u.is_alive() && Some(u.id) != except)
            .filter_map(|u| u.position)
            .collect()
    }

    /// Damage `side` has inflicted on the opposing army
    pub fn damage_dealt_by(&self, side: Side) -> u32 {
        self.units_of(side.opponent())
            .map(UnitInstance::damage_taken)
            .sum()
    }
}

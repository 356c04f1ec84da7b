use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::entity::{Player, Villager};
use crate::model::geometry::{Direction, Point, Rect, WorldBounds};

pub const HOUSE_SIZE: i32 = 80;
pub const TREE_WIDTH: i32 = 40;
pub const TREE_HEIGHT: i32 = 60;

#[derive(Debug, Clone)]
pub struct House {
    pub label: String,
    pub body: Rect,
}

impl House {
    pub fn new(label: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            label: label.into(),
            body: Rect::new(x, y, HOUSE_SIZE, HOUSE_SIZE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    pub body: Rect,
}

impl Tree {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            body: Rect::new(x, y, TREE_WIDTH, TREE_HEIGHT),
        }
    }
}

/// Starting arrangement of the village.
#[derive(Debug, Clone)]
pub struct VillageLayout {
    pub bounds: WorldBounds,
    pub player_start: Point,
    pub houses: Vec<House>,
    pub trees: Vec<Tree>,
    pub villagers: Vec<VillagerSeed>,
}

#[derive(Debug, Clone)]
pub struct VillagerSeed {
    pub name: String,
    pub backstory: String,
    pub position: Point,
}

impl VillagerSeed {
    fn new(name: &str, position: Point, backstory: &str) -> Self {
        Self {
            name: name.into(),
            backstory: backstory.into(),
            position,
        }
    }

    pub fn spawn(&self, rng: &mut impl Rng) -> Villager {
        let heading = *Direction::ALL.choose(rng).unwrap_or(&Direction::Down);
        Villager::new(&self.name, &self.backstory, self.position, heading)
    }
}

impl Default for VillageLayout {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            player_start: Point::new(100, 100),
            houses: vec![
                House::new("House 1", 200, 200),
                House::new("House 2", 400, 300),
                House::new("House 3", 600, 150),
            ],
            trees: vec![
                Tree::new(300, 100),
                Tree::new(500, 200),
                Tree::new(150, 300),
                Tree::new(700, 400),
                Tree::new(800, 100),
            ],
            villagers: vec![
                VillagerSeed::new(
                    "Alice",
                    Point::new(250, 100),
                    "You are Alice, a friendly baker who loves making bread and chatting about recipes. You're always cheerful and helpful.",
                ),
                VillagerSeed::new(
                    "Bob",
                    Point::new(450, 200),
                    "You are Bob, a grumpy old blacksmith who's seen it all. You don't like being bothered but have a good heart deep down.",
                ),
                VillagerSeed::new(
                    "Carol",
                    Point::new(350, 400),
                    "You are Carol, a curious young scholar who loves learning about everything. You ask lots of questions and share interesting facts.",
                ),
                VillagerSeed::new(
                    "Dave",
                    Point::new(150, 500),
                    "You are Dave, a laid-back farmer who takes life easy. You speak slowly and enjoy talking about the weather and crops.",
                ),
            ],
        }
    }
}

impl VillageLayout {
    /// Open field with no obstacles and no villagers.
    pub fn empty() -> Self {
        Self {
            houses: Vec::new(),
            trees: Vec::new(),
            villagers: Vec::new(),
            ..Self::default()
        }
    }

    pub fn obstacles(&self) -> Vec<Rect> {
        self.houses
            .iter()
            .map(|h| h.body)
            .chain(self.trees.iter().map(|t| t.body))
            .collect()
    }

    pub fn player(&self) -> Player {
        Player::new(self.player_start)
    }
}

use crate::model::geometry::{Direction, Point, Rect, WorldBounds};
use crate::model::memory::MemoryLog;

pub const ENTITY_SIZE: i32 = 32;
pub const PROBE_DISTANCE: i32 = 40;

/* =========================
   Player
   ========================= */

/// Keys held during one frame. Only one direction is applied per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    /// Left, then right, then up, then down.
    pub fn direction(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Rect,
    pub speed: i32,
    pub facing: Direction,
}

impl Player {
    pub fn new(position: Point) -> Self {
        Self {
            body: Rect::at(position, ENTITY_SIZE, ENTITY_SIZE),
            speed: 4,
            facing: Direction::Down,
        }
    }

    pub fn position(&self) -> Point {
        self.body.origin()
    }

    pub fn update(&mut self, input: MoveInput, bounds: WorldBounds) {
        if let Some(direction) = input.direction() {
            let step = direction.offset(self.speed);
            self.body.x += step.x;
            self.body.y += step.y;
            self.facing = direction;
        }
        self.body = self.body.clamp_to_world(bounds);
    }

    pub fn front_position(&self) -> Point {
        let offset = self.facing.offset(PROBE_DISTANCE);
        Point::new(self.body.x + offset.x, self.body.y + offset.y)
    }

    /// Box in front of the player used to pick talk and attack targets.
    pub fn probe_box(&self) -> Rect {
        Rect::at(self.front_position(), ENTITY_SIZE, ENTITY_SIZE)
    }
}

/* =========================
   Villager
   ========================= */

/// Wander heading. `Stop` is only reachable through the periodic re-roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Move(Direction),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    GoTo { destination: String, target: Point },
}

impl Task {
    pub fn target(&self) -> Point {
        match self {
            Task::GoTo { target, .. } => *target,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Villager {
    pub name: String,
    pub backstory: String,

    pub body: Rect,
    pub speed: i32,

    pub hp: i32,
    pub max_hp: i32,

    pub following: bool,
    pub fleeing: bool,
    /// Raised together with `fleeing` and never cleared; nothing reads it yet.
    pub seeking_help: bool,
    pub current_task: Option<Task>,

    pub heading: Heading,
    pub move_timer: u32,

    pub memory: MemoryLog,
}

impl Villager {
    pub fn new(
        name: impl Into<String>,
        backstory: impl Into<String>,
        position: Point,
        initial_heading: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            backstory: backstory.into(),
            body: Rect::at(position, ENTITY_SIZE, ENTITY_SIZE),
            speed: 1,
            hp: 10,
            max_hp: 10,
            following: false,
            fleeing: false,
            seeking_help: false,
            current_task: None,
            heading: Heading::Move(initial_heading),
            move_timer: 0,
            memory: MemoryLog::default(),
        }
    }

    pub fn position(&self) -> Point {
        self.body.origin()
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn remember(&mut self, text: impl Into<String>) {
        self.memory.record(text);
    }

    pub fn take_damage(&mut self) {
        if self.is_defeated() {
            return;
        }
        self.hp -= 1;
        self.remember("Was attacked by the player!");
        if self.is_defeated() {
            self.remember("Was defeated!");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_priority_is_left_right_up_down() {
        let all = MoveInput {
            left: true,
            right: true,
            up: true,
            down: true,
        };
        assert_eq!(all.direction(), Some(Direction::Left));
        let no_left = MoveInput { left: false, ..all };
        assert_eq!(no_left.direction(), Some(Direction::Right));
        let only_vertical = MoveInput {
            up: true,
            down: true,
            ..MoveInput::default()
        };
        assert_eq!(only_vertical.direction(), Some(Direction::Up));
        assert_eq!(MoveInput::default().direction(), None);
    }

    #[test]
    fn player_moves_faces_and_clamps() {
        let bounds = WorldBounds::default();
        let mut player = Player::new(Point::new(2, 100));
        let left = MoveInput {
            left: true,
            ..MoveInput::default()
        };
        player.update(left, bounds);
        assert_eq!(player.position(), Point::new(0, 100));
        assert_eq!(player.facing, Direction::Left);
        assert_eq!(player.front_position(), Point::new(-40, 100));
    }

    #[test]
    fn idle_player_keeps_facing() {
        let mut player = Player::new(Point::new(100, 100));
        player.update(MoveInput::default(), WorldBounds::default());
        assert_eq!(player.facing, Direction::Down);
        assert_eq!(player.probe_box(), Rect::new(100, 140, 32, 32));
    }

    #[test]
    fn damage_stops_at_zero_and_records_defeat_once() {
        let mut v = Villager::new("Alice", "", Point::new(0, 0), Direction::Up);
        v.hp = 1;
        v.take_damage();
        v.take_damage();
        assert_eq!(v.hp, 0);
        assert!(v.is_defeated());
        assert_eq!(v.memory.count_matching("Was defeated!"), 1);
        assert_eq!(v.memory.count_matching("Was attacked by the player!"), 1);
    }
}

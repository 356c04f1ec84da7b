use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::model::entity::{Heading, Villager};
use crate::model::geometry::{Direction, Point, Rect, WorldBounds};

pub const FLEE_HP_THRESHOLD: i32 = 4;
pub const WANDER_REROLL_TICKS: u32 = 120;
pub const FOLLOW_STOP_DISTANCE: f32 = 50.0;
pub const FLEE_SAFE_DISTANCE: f32 = 200.0;
pub const ARRIVAL_DISTANCE: f32 = 20.0;

pub const FLEE_MEMORY: &str = "Started fleeing due to low health!";
pub const ARRIVAL_MEMORY: &str = "Arrived at destination";

const WANDER_CHOICES: [Heading; 5] = [
    Heading::Move(Direction::Up),
    Heading::Move(Direction::Down),
    Heading::Move(Direction::Left),
    Heading::Move(Direction::Right),
    Heading::Stop,
];

/// Which policy drives a villager this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    Wander,
    Follow,
    Flee,
    DirectedTask,
    Defeated,
}

impl BehaviorState {
    pub fn label(self) -> &'static str {
        match self {
            BehaviorState::Wander => "wandering",
            BehaviorState::Follow => "following",
            BehaviorState::Flee => "fleeing",
            BehaviorState::DirectedTask => "on a task",
            BehaviorState::Defeated => "defeated",
        }
    }
}

/// Everything a villager may look at while deciding how to move.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub player: Point,
    pub obstacles: &'a [Rect],
    pub bounds: WorldBounds,
}

/// Priority order: defeated, flee, follow, task, wander.
/// Pure; the low-health flee trigger is applied by [`select_state`].
pub fn classify(villager: &Villager) -> BehaviorState {
    if villager.is_defeated() {
        BehaviorState::Defeated
    } else if villager.fleeing || villager.hp <= FLEE_HP_THRESHOLD {
        BehaviorState::Flee
    } else if villager.following {
        BehaviorState::Follow
    } else if villager.current_task.is_some() {
        BehaviorState::DirectedTask
    } else {
        BehaviorState::Wander
    }
}

/// Runs the transition rules, raising the flee flags on the first low-health tick.
pub fn select_state(villager: &mut Villager) -> BehaviorState {
    if villager.is_defeated() {
        return BehaviorState::Defeated;
    }

    if villager.hp <= FLEE_HP_THRESHOLD && !villager.fleeing {
        villager.fleeing = true;
        villager.seeking_help = true;
        villager.remember(FLEE_MEMORY);
        info!(villager = %villager.name, hp = villager.hp, "started fleeing");
    }

    classify(villager)
}

/// Advances one villager by one tick and reports the state that drove it.
pub fn tick<R: Rng + ?Sized>(
    villager: &mut Villager,
    surroundings: &Surroundings<'_>,
    rng: &mut R,
) -> BehaviorState {
    if villager.is_defeated() {
        return BehaviorState::Defeated;
    }

    villager.move_timer += 1;

    let state = select_state(villager);
    match state {
        BehaviorState::Flee => flee(villager, surroundings),
        BehaviorState::Follow => follow(villager, surroundings),
        BehaviorState::DirectedTask => execute_task(villager, surroundings),
        BehaviorState::Wander => wander(villager, surroundings, rng),
        BehaviorState::Defeated => {}
    }
    state
}

/* =========================
   Policies
   ========================= */

fn wander<R: Rng + ?Sized>(villager: &mut Villager, surroundings: &Surroundings<'_>, rng: &mut R) {
    if villager.move_timer > WANDER_REROLL_TICKS {
        villager.move_timer = 0;
        villager.heading = *WANDER_CHOICES.choose(rng).unwrap_or(&Heading::Stop);
        debug!(villager = %villager.name, heading = ?villager.heading, "wander heading re-rolled");
    }

    let Heading::Move(direction) = villager.heading else {
        return;
    };

    let step = direction.offset(villager.speed);
    let candidate = translate(villager.body, step);

    if candidate.overlaps_any(surroundings.obstacles) || !candidate.within(surroundings.bounds) {
        let direction = *Direction::ALL.choose(rng).unwrap_or(&Direction::Down);
        villager.heading = Heading::Move(direction);
        return;
    }

    villager.body = candidate;
}

fn follow(villager: &mut Villager, surroundings: &Surroundings<'_>) {
    let here = villager.position();
    if here.distance_to(surroundings.player) <= FOLLOW_STOP_DISTANCE {
        return;
    }

    let step = dominant_step(here, surroundings.player, villager.speed);
    attempt_step(villager, step, surroundings);
}

fn flee(villager: &mut Villager, surroundings: &Surroundings<'_>) {
    let here = villager.position();
    if here.distance_to(surroundings.player) >= FLEE_SAFE_DISTANCE {
        villager.fleeing = false;
        info!(villager = %villager.name, "escaped; no longer fleeing");
        return;
    }

    let toward = dominant_step(here, surroundings.player, villager.speed * 2);
    attempt_step(villager, Point::new(-toward.x, -toward.y), surroundings);
}

fn execute_task(villager: &mut Villager, surroundings: &Surroundings<'_>) {
    let Some(task) = villager.current_task.as_ref() else {
        return;
    };
    let target = task.target();
    let here = villager.position();

    if here.distance_to(target) < ARRIVAL_DISTANCE {
        villager.current_task = None;
        villager.remember(ARRIVAL_MEMORY);
        info!(villager = %villager.name, x = here.x, y = here.y, "arrived at destination");
        return;
    }

    let step = dominant_step(here, target, villager.speed * 2);
    attempt_step(villager, step, surroundings);
}

/* =========================
   Motion helpers
   ========================= */

/// Single-axis step of `amount` toward `to`. Ties on `|dx| == |dy|` go vertical.
pub fn dominant_step(from: Point, to: Point, amount: i32) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() > dy.abs() {
        Point::new(if dx > 0 { amount } else { -amount }, 0)
    } else {
        Point::new(0, if dy > 0 { amount } else { -amount })
    }
}

fn translate(body: Rect, step: Point) -> Rect {
    Rect {
        x: body.x + step.x,
        y: body.y + step.y,
        ..body
    }
}

/// Step, clamp to the world, and revert if the result hits an obstacle.
fn attempt_step(villager: &mut Villager, step: Point, surroundings: &Surroundings<'_>) -> bool {
    let candidate = translate(villager.body, step).clamp_to_world(surroundings.bounds);
    if candidate.overlaps_any(surroundings.obstacles) {
        return false;
    }
    villager.body = candidate;
    true
}

//! Offline rounds: a [`Mover`] walks from a start word toward a target word
//! through choice sets, with the same move validation and scoring the web
//! game applies to a remote model.

use crate::error::Result;
use crate::word_graph::{Choice, WordGraph};
use log::{debug, warn};
use rand::RngCore;
use rand::seq::IndexedRandom;
use std::time::{Duration, Instant};

/// Length of a round; also the best possible score.
pub const ROUND_SECONDS: u64 = 120;

/// Picks the next word from a choice set. The proposal need not be valid:
/// [`resolve_choice`] decides what is actually played.
pub trait Mover {
    fn name(&self) -> &str;

    fn choose(
        &mut self,
        current: &str,
        target: &str,
        choices: &[Choice],
        path: &[String],
    ) -> Option<String>;
}

/// Takes the target when offered, otherwise the choice with the smallest
/// known distance to it. Falls back to the first choice.
#[derive(Debug, Default)]
pub struct OracleMover;

impl Mover for OracleMover {
    fn name(&self) -> &str {
        "oracle"
    }

    fn choose(
        &mut self,
        _current: &str,
        target: &str,
        choices: &[Choice],
        _path: &[String],
    ) -> Option<String> {
        // the target's own row never lists itself, so check by name first
        if let Some(hit) = choices.iter().find(|c| c.word == target) {
            return Some(hit.word.clone());
        }
        choices
            .iter()
            .filter(|c| c.distance_to_target >= 0)
            .min_by_key(|c| c.distance_to_target)
            .or_else(|| choices.first())
            .map(|c| c.word.clone())
    }
}

/// Uniform over the offered choices.
pub struct RandomMover<R> {
    rng: R,
}

impl<R: RngCore> RandomMover<R> {
    pub fn new(rng: R) -> Self {
        RandomMover { rng }
    }
}

impl<R: RngCore> Mover for RandomMover<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(
        &mut self,
        _current: &str,
        _target: &str,
        choices: &[Choice],
        _path: &[String],
    ) -> Option<String> {
        choices.choose(&mut self.rng).map(|c| c.word.clone())
    }
}

/// The word actually played and whether the mover's proposal was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub word: String,
    pub valid: bool,
}

/// Match `proposed` case-insensitively against `choices`. A missing or
/// unknown proposal plays the first choice instead.
pub fn resolve_choice(choices: &[Choice], proposed: Option<&str>) -> Option<Move> {
    let first = choices.first()?;
    let hit = proposed.and_then(|p| {
        let p = p.trim().to_lowercase();
        choices.iter().find(|c| c.word.to_lowercase() == p)
    });
    Some(match hit {
        Some(c) => Move {
            word: c.word.clone(),
            valid: true,
        },
        None => Move {
            word: first.word.clone(),
            valid: false,
        },
    })
}

/// Score for a finished round: remaining whole seconds if the target was
/// reached, zero otherwise.
pub fn round_score(reached: bool, elapsed: Duration) -> u64 {
    if reached {
        ROUND_SECONDS.saturating_sub(elapsed.as_secs())
    } else {
        0
    }
}

#[derive(Debug, Clone)]
pub struct RoundLimits {
    pub max_steps: usize,
    pub time_limit: Duration,
}

impl Default for RoundLimits {
    fn default() -> Self {
        RoundLimits {
            max_steps: 50,
            time_limit: Duration::from_secs(ROUND_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub start: String,
    pub target: String,
    /// Words visited, start included.
    pub path: Vec<String>,
    pub reached: bool,
    pub invalid_moves: usize,
    /// Hop distance from start to target when the round began.
    pub start_distance: i32,
    pub elapsed: Duration,
}

impl RoundOutcome {
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn score(&self) -> u64 {
        round_score(self.reached, self.elapsed)
    }
}

/// Play one round. A round whose start equals its target is not finished
/// until the target is chosen again.
pub fn play_round<R, M>(
    graph: &WordGraph<R>,
    mover: &mut M,
    start: &str,
    target: &str,
    limits: &RoundLimits,
) -> Result<RoundOutcome>
where
    R: RngCore,
    M: Mover + ?Sized,
{
    let started = Instant::now();
    let mut path = vec![start.to_string()];
    let mut invalid_moves = 0;
    let mut reached = false;
    let start_distance = graph.distance(start, target);

    for _ in 0..limits.max_steps {
        if started.elapsed() >= limits.time_limit {
            break;
        }
        let current = path[path.len() - 1].clone();
        let set = graph.choices_for(&current, target)?;

        let proposal = mover.choose(&current, target, &set.choices, &path);
        let Some(mv) = resolve_choice(&set.choices, proposal.as_deref()) else {
            break;
        };
        if !mv.valid {
            invalid_moves += 1;
            warn!(
                "{} proposed {:?}, not among the choices; playing '{}'",
                mover.name(),
                proposal,
                mv.word
            );
        }
        debug!("{current} -> {}", mv.word);

        let done = mv.word == target;
        path.push(mv.word);
        if done {
            reached = true;
            break;
        }
    }

    Ok(RoundOutcome {
        start: start.to_string(),
        target: target.to_string(),
        path,
        reached,
        invalid_moves,
        start_distance,
        elapsed: started.elapsed(),
    })
}

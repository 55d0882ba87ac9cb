//! Turn scheduling and round resolution.
//!
//! A round gives every combatant that is alive at the start of the round one
//! attack, fastest first. Ties keep roster order with players ahead of
//! monsters. Combatants defeated before their turn comes up lose that turn;
//! hits already resolved in the round stand.
//!
//! Both sides use the same targeting rule: hit the living enemy with the
//! lowest current health, breaking ties by roster order.

use rand::Rng;

use crate::combatant::{any_alive, Combatant, Monster, Player};
use crate::damage::compute_damage;
use crate::events::{AttackAction, CombatantRef, RoundOutcome, RoundReport, Side};

/// A scheduled turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Turn {
    who: CombatantRef,
    speed: u32,
}

/// Build the turn order for a round from the living combatants.
///
/// Players are listed before monsters and the sort is stable, so equal
/// speeds resolve in that order.
#[must_use]
pub fn turn_order(players: &[Player], monsters: &[Monster]) -> Vec<CombatantRef> {
    let mut turns: Vec<Turn> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alive())
        .map(|(i, p)| Turn {
            who: CombatantRef::player(i),
            speed: p.stats.speed,
        })
        .chain(
            monsters
                .iter()
                .enumerate()
                .filter(|(_, m)| m.is_alive())
                .map(|(i, m)| Turn {
                    who: CombatantRef::monster(i),
                    speed: m.stats.speed,
                }),
        )
        .collect();

    // sort_by is stable
    turns.sort_by(|a, b| b.speed.cmp(&a.speed));
    turns.into_iter().map(|t| t.who).collect()
}

/// Index of the living combatant with the lowest current health.
///
/// Ties go to the earliest roster position. Returns `None` if the roster has
/// no living members.
pub fn lowest_health_target<C: Combatant>(roster: &[C]) -> Option<usize> {
    roster
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .min_by_key(|&(i, c)| (c.health(), i))
        .map(|(i, _)| i)
}

/// Evaluate the fight state from both rosters.
#[must_use]
pub fn evaluate(players: &[Player], monsters: &[Monster]) -> RoundOutcome {
    if !any_alive(players) {
        RoundOutcome::PlayersLost
    } else if !any_alive(monsters) {
        RoundOutcome::PlayersWon
    } else {
        RoundOutcome::Ongoing
    }
}

/// Resolve one attack and record it.
fn strike<A: Combatant, T: Combatant, R: Rng + ?Sized>(
    attacker: &A,
    attacker_ref: CombatantRef,
    target: &mut T,
    target_ref: CombatantRef,
    rng: &mut R,
) -> AttackAction {
    let damage = compute_damage(attacker.stats().attack, target.stats().defense, rng);
    target.apply_damage(damage);
    AttackAction {
        attacker: attacker_ref,
        target: target_ref,
        damage,
        target_health: target.health(),
        defeated: !target.is_alive(),
    }
}

/// Run one combat round.
///
/// Every combatant alive at the start of the round gets one turn in
/// [`turn_order`]. The round stops early when an attacker finds no living
/// target: a player with nothing to hit means the wave is won, a monster
/// with nothing to hit means the party is wiped.
pub fn run_round<R: Rng + ?Sized>(
    players: &mut [Player],
    monsters: &mut [Monster],
    round: u32,
    rng: &mut R,
) -> RoundReport {
    debug_assert!(!players.is_empty(), "round started with an empty party");
    debug_assert!(!monsters.is_empty(), "round started with an empty wave");

    let order = turn_order(players, monsters);
    let mut actions = Vec::with_capacity(order.len());

    for who in order {
        match who.side {
            Side::Player => {
                let attacker = &players[who.index];
                if !attacker.is_alive() {
                    continue;
                }
                let Some(t) = lowest_health_target(monsters) else {
                    return finish(round, actions, RoundOutcome::PlayersWon);
                };
                let action = strike(attacker, who, &mut monsters[t], CombatantRef::monster(t), rng);
                actions.push(action);
            }
            Side::Monster => {
                let attacker = &monsters[who.index];
                if !attacker.is_alive() {
                    continue;
                }
                let Some(t) = lowest_health_target(players) else {
                    return finish(round, actions, RoundOutcome::PlayersLost);
                };
                let action = strike(attacker, who, &mut players[t], CombatantRef::player(t), rng);
                actions.push(action);
            }
        }
    }

    finish(round, actions, evaluate(players, monsters))
}

fn finish(round: u32, actions: Vec<AttackAction>, outcome: RoundOutcome) -> RoundReport {
    tracing::debug!(
        round,
        attacks = actions.len(),
        outcome = ?outcome,
        "Round resolved"
    );
    RoundReport {
        round,
        actions,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{count_alive, CombatStats, MonsterKind};
    use crate::roles::Role;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn player(health: u32, attack: u32, defense: u32, speed: u32) -> Player {
        Player::with_stats(
            Role::Knight,
            "P",
            CombatStats::new(health, attack, defense, speed),
        )
    }

    fn monster(health: u32, attack: u32, defense: u32, speed: u32) -> Monster {
        Monster::new(
            "M",
            MonsterKind::Goblin,
            CombatStats::new(health, attack, defense, speed),
        )
    }

    #[test]
    fn test_turn_order_by_speed() {
        let players = vec![player(10, 1, 1, 3), player(10, 1, 1, 8)];
        let monsters = vec![monster(10, 1, 1, 5)];

        let order = turn_order(&players, &monsters);
        assert_eq!(
            order,
            vec![
                CombatantRef::player(1),
                CombatantRef::monster(0),
                CombatantRef::player(0),
            ]
        );
    }

    #[test]
    fn test_speed_ties_keep_roster_order() {
        let players = vec![player(10, 1, 1, 5), player(10, 1, 1, 5)];
        let monsters = vec![monster(10, 1, 1, 5), monster(10, 1, 1, 5)];

        let order = turn_order(&players, &monsters);
        assert_eq!(
            order,
            vec![
                CombatantRef::player(0),
                CombatantRef::player(1),
                CombatantRef::monster(0),
                CombatantRef::monster(1),
            ]
        );
    }

    #[test]
    fn test_dead_combatants_are_not_scheduled() {
        let mut players = vec![player(10, 1, 1, 5), player(10, 1, 1, 5)];
        players[0].apply_damage(10);
        let monsters = vec![monster(10, 1, 1, 5)];

        let order = turn_order(&players, &monsters);
        assert_eq!(order.len(), 2);
        assert!(!order.contains(&CombatantRef::player(0)));
    }

    #[test]
    fn test_lowest_health_target_breaks_ties_by_order() {
        let mut roster = vec![monster(30, 1, 1, 1), monster(20, 1, 1, 1), monster(20, 1, 1, 1)];
        assert_eq!(lowest_health_target(&roster), Some(1));

        roster[1].apply_damage(20);
        assert_eq!(lowest_health_target(&roster), Some(2));

        roster[0].apply_damage(30);
        roster[2].apply_damage(30);
        assert_eq!(lowest_health_target(&roster), None);
    }

    #[test]
    fn test_players_target_weakest_monster() {
        let mut players = vec![player(100, 5, 50, 9)];
        let mut monsters = vec![monster(50, 1, 0, 1), monster(20, 1, 0, 1)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 1, &mut rng);
        assert_eq!(report.actions[0].target, CombatantRef::monster(1));
        assert!(monsters[1].health() < 20);
        assert_eq!(monsters[0].health(), 50);
    }

    #[test]
    fn test_monsters_target_weakest_living_player() {
        let mut players = vec![
            player(10, 1, 0, 1),
            player(50, 1, 0, 1),
            player(30, 1, 0, 1),
            player(30, 1, 0, 1),
        ];
        players[0].apply_damage(10);
        let mut monsters = vec![monster(500, 5, 100, 10)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 1, &mut rng);
        let hit = report.actions[0];
        assert_eq!(hit.attacker, CombatantRef::monster(0));
        assert_eq!(hit.target, CombatantRef::player(2));
        assert!(report
            .actions
            .iter()
            .all(|a| a.target != CombatantRef::player(0)));
        assert!(players[2].health() < 30);
        assert_eq!(players[1].health(), 50);
        assert_eq!(players[3].health(), 30);
        assert_eq!(report.outcome, RoundOutcome::Ongoing);
    }

    #[test]
    fn test_combatant_killed_before_its_turn_does_not_act() {
        let mut players = vec![player(100, 100, 0, 10)];
        let mut monsters = vec![monster(5, 50, 0, 1)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 1, &mut rng);
        assert_eq!(report.actions.len(), 1);
        assert!(report.actions[0].defeated);
        assert_eq!(report.outcome, RoundOutcome::PlayersWon);
        assert_eq!(players[0].health(), 100);
    }

    #[test]
    fn test_player_with_no_target_short_circuits_win() {
        let mut players = vec![player(100, 100, 0, 10), player(100, 100, 0, 9)];
        let mut monsters = vec![monster(5, 1, 0, 1)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 1, &mut rng);
        // Second player finds nothing left and ends the round.
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.outcome, RoundOutcome::PlayersWon);
    }

    #[test]
    fn test_monster_with_no_target_short_circuits_loss() {
        let mut players = vec![player(1, 1, 0, 1)];
        let mut monsters = vec![monster(500, 50, 100, 10), monster(500, 50, 100, 9)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 1, &mut rng);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.outcome, RoundOutcome::PlayersLost);
        assert_eq!(players[0].health(), 0);
    }

    #[test]
    fn test_ongoing_when_both_sides_survive() {
        let mut players = vec![player(200, 3, 0, 5)];
        let mut monsters = vec![monster(200, 3, 0, 5)];
        let mut rng = create_test_rng();

        let report = run_round(&mut players, &mut monsters, 4, &mut rng);
        assert_eq!(report.round, 4);
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.outcome, RoundOutcome::Ongoing);
    }

    #[test]
    fn test_evaluate_wiped_party_loses_even_if_wave_is_wiped() {
        let mut players = vec![player(1, 1, 1, 1)];
        let mut monsters = vec![monster(1, 1, 1, 1)];
        players[0].apply_damage(1);
        monsters[0].apply_damage(1);
        assert_eq!(evaluate(&players, &monsters), RoundOutcome::PlayersLost);
    }

    proptest! {
        #[test]
        fn prop_living_counts_never_increase(
            seed in any::<u64>(),
            party in prop::collection::vec((1u32..200, 1u32..40, 0u32..20, 1u32..10), 1..5),
            wave in prop::collection::vec((1u32..200, 1u32..40, 0u32..20, 1u32..10), 1..7),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut players: Vec<Player> =
                party.iter().map(|&(h, a, d, s)| player(h, a, d, s)).collect();
            let mut monsters: Vec<Monster> =
                wave.iter().map(|&(h, a, d, s)| monster(h, a, d, s)).collect();

            let mut alive = (count_alive(&players), count_alive(&monsters));
            for round in 1..=50 {
                let report = run_round(&mut players, &mut monsters, round, &mut rng);
                let now = (count_alive(&players), count_alive(&monsters));
                prop_assert!(now.0 <= alive.0);
                prop_assert!(now.1 <= alive.1);
                alive = now;
                if report.outcome.is_decisive() {
                    break;
                }
            }
        }
    }
}

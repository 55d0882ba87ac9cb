//! End-to-end tests for wave_core.
//!
//! These drive waves and sessions through the public API, the same way the
//! headless runner does.

// =============================================================================
// Wave Tests
// =============================================================================

mod waves {
    use wave_core::combatant::CombatStats;
    use wave_core::orchestrator::run_wave;
    use wave_core::wave::{expected_wave_size, generate_wave};
    use wave_test_utils::fixtures::{tank_party, test_rng};

    /// Two strong players clear the opening wave quickly
    #[test]
    fn test_tanks_clear_wave_one_in_bounded_rounds() {
        let mut rng = test_rng();
        let mut party = tank_party(2);

        let result = run_wave(&mut party, 1, &mut rng).unwrap();

        assert!(result.players_won);
        assert!(result.rounds >= 1 && result.rounds <= 5, "rounds = {}", result.rounds);
        assert_eq!(result.survivors, 2);
    }

    /// Wave 1 is always the same pair of goblins
    #[test]
    fn test_wave_one_roster() {
        let wave = generate_wave(1, &mut test_rng()).unwrap();
        assert_eq!(wave.len(), 2);
        assert!(wave
            .monsters
            .iter()
            .all(|m| m.stats == CombatStats::new(40, 6, 2, 5)));
    }

    /// Roster size follows the scaling rule
    #[test]
    fn test_wave_sizes() {
        let mut rng = test_rng();
        for (index, expected) in [(2, 3), (3, 5), (4, 5), (5, 5), (6, 6), (9, 6), (10, 5)] {
            let wave = generate_wave(index, &mut rng).unwrap();
            assert_eq!(wave.len(), expected, "wave {index}");
            assert_eq!(expected_wave_size(index), expected);
        }
    }
}

// =============================================================================
// Economy Tests
// =============================================================================

mod economy {
    use wave_core::economy::{GameVariant, UpgradeKind};
    use wave_core::error::UpgradeRejection;
    use wave_core::materials::{Inventory, MaterialKind};
    use wave_core::orchestrator::distribute_drops;
    use wave_test_utils::fixtures::{session, stocked, tank, tank_party};

    /// Two wood buys exactly one weapon
    #[test]
    fn test_two_wood_one_weapon() {
        let mut s = session(vec![stocked(tank("a"), 2, 0, 0), tank("b")], 1);

        let applied = s.apply_upgrade(0, UpgradeKind::Weapon).unwrap().unwrap();
        assert_eq!(applied.after.attack, applied.before.attack + 2);

        let second = s.apply_upgrade(0, UpgradeKind::Weapon).unwrap();
        assert!(matches!(
            second,
            Err(UpgradeRejection::InsufficientMaterials {
                kind: MaterialKind::Wood,
                ..
            })
        ));
        assert_eq!(s.players()[0].inventory, Inventory::default());
    }

    /// 7 wood over 3 survivors: 2 each, 1 discarded
    #[test]
    fn test_seven_over_three() {
        let mut party = tank_party(3);
        let (share, discarded) = distribute_drops(&mut party, &Inventory::new(7, 0, 0));
        assert_eq!(share.get(MaterialKind::Wood), 2);
        assert_eq!(discarded.get(MaterialKind::Wood), 1);
    }

    /// Only survivors collect drops, and they collect exactly the share
    #[test]
    fn test_drops_reach_survivors_only() {
        let mut s = session(tank_party(3), 77);
        for _ in 0..4 {
            let before: Vec<Inventory> = s.players().iter().map(|p| p.inventory).collect();
            let Ok(result) = s.run_next_wave(&mut wave_core::events::NullObserver) else {
                break;
            };
            for (player, old) in s.players().iter().zip(&before) {
                let mut expected = *old;
                if result.players_won && player.stats.is_alive() {
                    expected.add_all(&result.share_per_player);
                }
                assert_eq!(player.inventory, expected);
            }
            let handed_out = result.share_per_player.total() * result.survivors as u32;
            if result.players_won {
                assert_eq!(
                    handed_out + result.discarded.total(),
                    result.material_drops.total()
                );
            }
            if s.is_over() {
                break;
            }
        }
    }

    /// Blocks exist only in the builder variant
    #[test]
    fn test_builder_variant_session() {
        let party = vec![stocked(tank("a"), 4, 0, 0), tank("b")];
        let mut s = wave_core::session::Session::new(party, 1, GameVariant::Builder).unwrap();
        s.apply_upgrade(0, UpgradeKind::BuildingBlock)
            .unwrap()
            .unwrap();
        assert_eq!(s.players()[0].placed_blocks, 1);
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session {
    use wave_core::events::{NullObserver, RecordingObserver};
    use wave_core::error::GameError;
    use wave_test_utils::fixtures::{demo_party, session, tank_party};

    /// History is contiguous and the session stops on the first loss
    #[test]
    fn test_demo_party_runs_until_loss() {
        let mut s = session(demo_party(), 2024);
        for _ in 0..40 {
            if s.is_over() {
                break;
            }
            s.run_next_wave(&mut NullObserver).unwrap();
        }

        let history = s.history().to_vec();
        for (i, result) in history.iter().enumerate() {
            assert_eq!(result.wave_index as usize, i + 1);
        }
        if s.is_over() {
            let (last, earlier) = history.split_last().unwrap();
            assert!(!last.players_won);
            assert!(earlier.iter().all(|r| r.players_won));
            assert!(matches!(
                s.run_next_wave(&mut NullObserver),
                Err(GameError::SessionOver(_))
            ));
        }
        assert_eq!(s.waves_cleared() as usize, history.iter().filter(|r| r.players_won).count());
    }

    /// Monster health never goes back up within a wave
    #[test]
    fn test_snapshots_are_monotonic() {
        let mut s = session(tank_party(2), 5);
        let mut observer = RecordingObserver::default();
        s.run_next_wave(&mut observer).unwrap();
        s.run_next_wave(&mut observer).unwrap();

        for pair in observer.rounds.windows(2) {
            let (prev, next) = (&pair[0].1, &pair[1].1);
            if prev.monsters.len() != next.monsters.len() {
                continue; // wave boundary
            }
            for (a, b) in prev.monsters.iter().zip(&next.monsters) {
                if a.name == b.name {
                    assert!(b.health <= a.health);
                }
            }
        }
        assert_eq!(observer.waves_started, vec![1, 2]);
        assert_eq!(observer.results.len(), 2);
    }
}

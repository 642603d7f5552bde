use limbus_clash::clash::{compute_clash, enumerate_states, Combatant, StateIndex, TransitionMatrix};
use proptest::prelude::*;

fn combatant() -> impl Strategy<Value = Combatant> {
    (0u32..20, 1u32..5, 1u32..6, -40i32..=40, 35u32..50, 0u32..3).prop_map(
        |(base, coins, coin_power, sanity, offense, paralyze)| {
            Combatant::new(
                f64::from(base),
                coins,
                f64::from(coin_power),
                f64::from(sanity),
                f64::from(offense),
                0.0,
                paralyze,
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rates_are_probabilities(p1 in combatant(), p2 in combatant()) {
        let result = compute_clash(&p1, &p2).expect("positive coin power always resolves");
        prop_assert!((0.0..=1.0 + 1e-9).contains(&result.win_rate));
        prop_assert!((result.win_rate + result.lose_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn transient_rows_are_stochastic(p1 in combatant(), p2 in combatant()) {
        let index = StateIndex::new(enumerate_states(&p1, &p2));
        let matrix = TransitionMatrix::build(&index, &p1, &p2).expect("matrix should build");
        for values in matrix.rows().iter().take(index.len() - 2) {
            let sum: f64 = values.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn swapping_sides_swaps_rates(p1 in combatant(), p2 in combatant()) {
        let forward = compute_clash(&p1, &p2).expect("should solve");
        let backward = compute_clash(&p2, &p1).expect("should solve");
        prop_assert!((forward.win_rate - backward.lose_rate).abs() < 1e-9);
    }

    #[test]
    fn more_base_power_never_hurts(p1 in combatant(), p2 in combatant(), boost in 1u32..6) {
        let mut stronger = p1;
        stronger.base_power += f64::from(boost);
        let base = compute_clash(&p1, &p2).expect("should solve");
        let boosted = compute_clash(&stronger, &p2).expect("should solve");
        prop_assert!(boosted.win_rate + 1e-9 >= base.win_rate);
    }
}

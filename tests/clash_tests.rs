use limbus_clash::clash::{
    compute_clash, enumerate_states, ClashError, Combatant, State, StateIndex, TransitionMatrix,
    LOSE, WIN,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn skill(base_power: f64, num_coins: u32, coin_power: f64) -> Combatant {
    Combatant::new(base_power, num_coins, coin_power, 0.0, 40.0, 0.0, 0)
}

#[test]
fn default_matchup_produces_complementary_rates() {
    let sinner = Combatant::new(6.0, 3, 4.0, 40.0, 40.0, 0.0, 0);
    let enemy = Combatant::new(13.0, 3, 2.0, 0.0, 40.0, 0.0, 0);
    let result = compute_clash(&sinner, &enemy).expect("default matchup should solve");

    assert!((0.0..=1.0).contains(&result.win_rate));
    approx_eq(result.win_rate + result.lose_rate, 1.0, 1e-9);
    assert_eq!(result.states.first(), Some(&State::new(3, 3, 0, 0)));
    assert_eq!(&result.states[result.state_count() - 2..], &[WIN, LOSE]);
}

#[test]
fn transient_rows_sum_to_one() {
    let p1 = Combatant::new(6.0, 3, 4.0, 25.0, 43.0, 1.0, 2);
    let p2 = Combatant::new(10.0, 2, 3.0, -10.0, 40.0, 0.0, 1);
    let index = StateIndex::new(enumerate_states(&p1, &p2));
    let matrix = TransitionMatrix::build(&index, &p1, &p2).expect("matrix should build");

    for (row, values) in matrix.rows().iter().take(index.len() - 2).enumerate() {
        let sum: f64 = values.iter().sum();
        approx_eq(sum, 1.0, 1e-9);
        assert!(values.iter().all(|&p| p >= 0.0), "negative entry in row {row}");
    }
}

#[test]
fn identical_combatants_split_evenly() {
    for coins in 1..=4 {
        let side = skill(8.0, coins, 3.0);
        let result = compute_clash(&side, &side).expect("mirror match should solve");
        approx_eq(result.win_rate, 0.5, 1e-9);
    }
}

#[test]
fn win_rate_grows_with_base_power() {
    let enemy = skill(10.0, 3, 3.0);
    let mut previous = 0.0;
    for base in 0..=20 {
        let result = compute_clash(&skill(f64::from(base), 3, 3.0), &enemy)
            .expect("clash should solve");
        assert!(
            result.win_rate + 1e-12 >= previous,
            "win rate dropped at base {base}: {} < {previous}",
            result.win_rate
        );
        previous = result.win_rate;
    }
}

#[test]
fn higher_coin_power_wins_single_coin_clash() {
    let result = compute_clash(&skill(5.0, 1, 3.0), &skill(5.0, 1, 2.0)).expect("should solve");
    assert!(result.win_rate > 0.5);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let p1 = Combatant::new(6.0, 4, 4.0, 30.0, 46.0, 2.0, 3);
    let p2 = Combatant::new(13.0, 3, 2.0, -5.0, 40.0, 0.0, 1);
    let first = compute_clash(&p1, &p2).expect("should solve");
    let second = compute_clash(&p1, &p2).expect("should solve");
    assert_eq!(first.win_rate.to_bits(), second.win_rate.to_bits());
    assert_eq!(first, second);
}

#[test]
fn paralysis_lowers_the_paralyzed_side_win_rate() {
    let enemy = skill(8.0, 3, 3.0);
    let healthy = compute_clash(&skill(8.0, 3, 3.0), &enemy).expect("should solve");
    let mut paralyzed_side = skill(8.0, 3, 3.0);
    paralyzed_side.paralyze_count = 2;
    let paralyzed = compute_clash(&paralyzed_side, &enemy).expect("should solve");

    assert!(paralyzed.win_rate < healthy.win_rate);
    assert!(paralyzed.state_count() > healthy.state_count());

    let mut enemy_paralyzed = enemy;
    enemy_paralyzed.paralyze_count = 2;
    let favoured = compute_clash(&skill(8.0, 3, 3.0), &enemy_paralyzed).expect("should solve");
    assert!(favoured.win_rate > healthy.win_rate);
}

#[test]
fn overwhelming_power_is_a_certain_win() {
    let result = compute_clash(&skill(50.0, 2, 1.0), &skill(1.0, 2, 1.0)).expect("should solve");
    approx_eq(result.win_rate, 1.0, 1e-12);
    approx_eq(result.lose_rate, 0.0, 1e-12);
}

#[test]
fn flat_equal_powers_never_resolve() {
    let flat = skill(7.0, 2, 0.0);
    assert!(matches!(
        compute_clash(&flat, &flat),
        Err(ClashError::SingularMatrix { .. })
    ));
}

#[test]
fn fundamental_matrix_times_r_is_absorption() {
    let p1 = skill(6.0, 2, 4.0);
    let p2 = skill(9.0, 2, 2.0);
    let result = compute_clash(&p1, &p2).expect("should solve");
    for (row, absorbed) in result.absorption.iter().enumerate() {
        let expected: f64 = result.fundamental_matrix[row]
            .iter()
            .zip(&result.r)
            .map(|(n, r)| n * r[0])
            .sum();
        approx_eq(absorbed[0], expected, 1e-12);
        approx_eq(absorbed[0] + absorbed[1], 1.0, 1e-9);
    }
}

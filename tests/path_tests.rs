use galton::path::{step, Bean, BeanPath, DrawSource, RngDraws, ScriptedDraws};
use galton::Lattice;
use proptest::prelude::*;
use rstest::rstest;

/// Walks a fresh bean to the bins and returns its bucket.
fn land(pins: usize, bias: u8, draws: &mut impl DrawSource) -> usize {
    BeanPath::new(pins, pins).finish(bias, draws).bin()
}

#[rstest]
#[case::fair_all_right(5, vec![6, 6, 6, 6], 4)]
#[case::fair_all_left(5, vec![5, 5, 5, 5], 0)]
#[case::always_left(10, vec![1, 7, 10, 3], 0)]
#[case::fair_alternating(5, vec![6, 1, 6, 1], 2)]
#[case::right_then_left(5, vec![9, 9, 2, 2], 2)]
fn five_wide_descent(#[case] bias: u8, #[case] draws: Vec<u8>, #[case] bin: usize) {
    let mut d = ScriptedDraws::new(draws);
    assert_eq!(land(5, bias, &mut d), bin);
    assert_eq!(d.consumed(), 4);
}

#[test]
fn cached_rows_consume_no_draws() {
    let mut d = ScriptedDraws::new([3, 8, 1, 9]);
    let mut path = BeanPath::new(5, 5);
    let first = path.row(2, 5, &mut d);
    let used = d.consumed();
    let again = path.row(2, 5, &mut d);
    assert_eq!(first, again);
    assert_eq!(d.consumed(), used);
    assert_eq!(path.row(1, 5, &mut d), path.get(1).unwrap());
    assert_eq!(d.consumed(), used);
}

#[test]
fn launch_row_is_free() {
    let mut d = ScriptedDraws::new([1]);
    let mut path = BeanPath::new(5, 5);
    assert_eq!(path.row(0, 5, &mut d), Bean::launch(5, 5));
    assert_eq!(d.consumed(), 0);
}

#[test]
fn bias_only_reads_the_current_row() {
    // a bias change mid-drop applies to rows not yet computed
    let mut d = ScriptedDraws::new([4, 4, 4, 4]);
    let mut path = BeanPath::new(5, 5);
    let b1 = path.row(1, 5, &mut d);
    assert_eq!(b1.column, 2);
    let b2 = path.row(2, 3, &mut d);
    // row 4 leans right once 4 > 3
    assert_eq!(b2.column, 3);
}

#[test]
fn one_step_per_call() {
    let mut d = ScriptedDraws::new([2, 2]);
    let b = step(Bean::launch(7, 7), 7, 5, &mut d);
    assert_eq!(b, Bean { column: 3, row: 6 });
    assert_eq!(d.consumed(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn beans_stay_inside_the_lattice(pins in 1usize..40, bias in 1u8..=10, seed in any::<u64>()) {
        let mut draws = RngDraws::seeded(seed);
        let mut path = BeanPath::new(pins, pins);
        path.finish(bias, &mut draws);

        let start = Bean::launch(pins, pins).column;
        for (i, bean) in path.history().iter().enumerate() {
            prop_assert!(bean.column >= 1 && bean.column <= pins as i32);
            prop_assert!((bean.column - start).abs() <= i as i32);
            prop_assert_eq!(bean.row, (pins - i) as i32);
            prop_assert!(bean.index(pins, pins) < pins * pins);
        }
        prop_assert!(path.history().last().unwrap().has_landed());
    }

    #[test]
    fn beans_only_touch_visible_pins(half in 0usize..20, bias in 1u8..=10, seed in any::<u64>()) {
        let pins = 2 * half + 1;
        let lattice = Lattice::with_dimensions(pins, pins, 70.0, 10.0);
        let mut draws = RngDraws::seeded(seed);
        let mut path = BeanPath::new(pins, pins);
        path.finish(bias, &mut draws);

        for (line, bean) in path.history().iter().enumerate() {
            let (row, col) = lattice.coords(bean.index(pins, pins));
            prop_assert_eq!(row, line);
            if line + 1 < pins {
                prop_assert!(lattice.is_visible(row, col), "line {} col {}", line, col);
            }
        }
    }

    #[test]
    fn replayed_draws_replay_the_path(draws in proptest::collection::vec(1u8..=10, 6)) {
        let mut a = ScriptedDraws::new(draws.clone());
        let mut b = ScriptedDraws::new(draws);
        let mut pa = BeanPath::new(7, 7);
        let mut pb = BeanPath::new(7, 7);
        pa.finish(5, &mut a);
        for row in 0..7 {
            pb.row(row, 5, &mut b);
        }
        prop_assert_eq!(pa.history(), pb.history());
    }
}

use galton::config::MachineConfig;
use galton::lattice::Lattice;
use proptest::prelude::*;
use rstest::rstest;

fn square(pins: usize) -> Lattice {
    Lattice::with_dimensions(pins, pins, 70.0, 10.0)
}

#[rstest]
#[case(1, vec![0])]
#[case(3, vec![1, 2, 0])]
#[case(5, vec![1, 2, 3, 4, 0])]
#[case(7, vec![1, 2, 3, 4, 5, 6, 0])]
fn visible_pins_per_row(#[case] pins: usize, #[case] expected: Vec<usize>) {
    let l = square(pins);
    let counts: Vec<usize> = (0..pins).map(|r| l.visible_in_row(r)).collect();
    assert_eq!(counts, expected);
}

#[test]
fn default_machine_is_five_wide() {
    let l = Lattice::new(&MachineConfig::default());
    assert_eq!((l.width(), l.height()), (5, 5));
    assert_eq!(l.middle_column(), 2);
    assert_eq!(l.bin_row(), 4);
    assert_eq!(l.visible_pins().count(), 10);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn triangle_grows_one_pin_per_row(pins in 1usize..48) {
        let l = square(pins);
        prop_assert_eq!(l.pins().len(), pins * pins);
        for row in 0..pins - 1 {
            prop_assert_eq!(l.visible_in_row(row), row + 1);
        }
        prop_assert_eq!(l.visible_in_row(pins - 1), 0);
    }

    #[test]
    fn visible_runs_are_contiguous_around_the_middle(pins in 2usize..48) {
        let l = square(pins);
        for row in 0..pins - 1 {
            let mut cols = l.visible_columns(row);
            cols.sort_unstable();
            prop_assert!(cols.contains(&l.middle_column()));
            for w in cols.windows(2) {
                prop_assert_eq!(w[1], w[0] + 1);
            }
        }
    }

    #[test]
    fn flat_index_matches_row_major(
        (pins, row, col) in (1usize..32).prop_flat_map(|p| (Just(p), 0..p, 0..p))
    ) {
        let l = square(pins);
        let i = l.index(row, col);
        prop_assert_eq!(i, row * pins + col);
        prop_assert_eq!(l.coords(i), (row, col));
        let pin = l.pin(i).unwrap();
        prop_assert_eq!(pin.y, 15.0 + 70.0 * row as f32 + 70.0);
    }
}

//! Structural invariants of layouts and meshers.

use proptest::prelude::*;
use ql_methods::finite_differences::meshers::{ConcentratingPoint, Fdm1dMesher, FdmMesher, FdmMesherComposite};
use ql_methods::finite_differences::utilities::FdmLinearOpLayout;
use ql_methods::finite_differences::meshers::ExponentialJump1dMesher;
use std::collections::HashSet;
use std::sync::Arc;

fn check_mesher(m: &Fdm1dMesher) -> Result<(), TestCaseError> {
    let x = m.locations();
    for i in 0..x.len() - 1 {
        prop_assert!(x[i + 1] > x[i], "locations not increasing at {}: {:?}", i, &x[i..i + 2]);
        let (dp, dm) = (m.dplus(i), m.dminus(i + 1));
        prop_assert!(dp.is_some() && dp == dm);
    }
    prop_assert_eq!(m.dminus(0), None);
    prop_assert_eq!(m.dplus(x.len() - 1), None);
    Ok(())
}

proptest! {
    #[test]
    fn layout_index_is_a_bijection(dim in prop::collection::vec(1usize..6, 1..4)) {
        let layout = FdmLinearOpLayout::new(dim).unwrap();
        let mut seen = HashSet::new();
        for (n, iter) in layout.iter().enumerate() {
            prop_assert_eq!(iter.index(), n);
            prop_assert_eq!(layout.index(iter.coordinates()), n);
            prop_assert_eq!(layout.coordinates(n), iter.coordinates().to_vec());
            prop_assert!(seen.insert(n));
        }
        prop_assert_eq!(seen.len(), layout.size());
    }

    #[test]
    fn neighbourhood_stays_on_the_grid(
        dim in prop::collection::vec(2usize..6, 1..4),
        offset in -3isize..4,
    ) {
        let layout = FdmLinearOpLayout::new(dim).unwrap();
        for iter in layout.iter() {
            for d in 0..layout.dimensions() {
                prop_assert!(layout.neighbourhood(&iter, d, offset) < layout.size());
            }
        }
    }

    #[test]
    fn uniform_and_concentrating_meshers_are_monotone(
        start in -5.0f64..5.0,
        width in 0.1f64..10.0,
        size in 2usize..80,
        c in 0.0f64..1.0,
        density in 0.01f64..1.0,
        on_grid in any::<bool>(),
    ) {
        let end = start + width;
        check_mesher(&Fdm1dMesher::uniform(start, end, size).unwrap())?;
        let mut cp = ConcentratingPoint::new(start + c * width, density);
        if on_grid {
            cp = cp.on_grid();
        }
        check_mesher(&Fdm1dMesher::concentrating(start, end, size, Some(cp)).unwrap())?;
    }

    #[test]
    fn jump_mesher_is_monotone(
        size in 2usize..60,
        beta in 1.0f64..500.0,
        lambda in 0.5f64..20.0,
        eta in 0.5f64..20.0,
    ) {
        check_mesher(&ExponentialJump1dMesher::build(size, beta, lambda, eta).unwrap())?;
    }

    #[test]
    fn composite_locations_follow_the_layout(nx in 2usize..8, ny in 2usize..8) {
        let mesher = FdmMesherComposite::new(vec![
            Arc::new(Fdm1dMesher::uniform(0.0, 1.0, nx).unwrap()),
            Arc::new(Fdm1dMesher::uniform(-1.0, 1.0, ny).unwrap()),
        ])
        .unwrap();
        let ys = mesher.locations(1);
        for iter in mesher.layout().iter() {
            let j = iter.coordinates()[1];
            prop_assert!((ys[iter.index()] - (-1.0 + 2.0 * j as f64 / (ny - 1) as f64)).abs() < 1e-12);
        }
    }
}

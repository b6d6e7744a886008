//! Property-based tests for the sampling and aggregation laws.
//!
//! # Test Coverage
//!
//! - Sampler determinism for arbitrary seeds
//! - Draws only overwrite free positions and come from the post-burn-in pool
//! - Mask-select law
//! - Stacked shape is `(n,) + S`

use ndarray::{Array1, Array2, Array3};
use proptest::prelude::*;

use postsim_core::aggregate::{FieldStacker, ResultAggregator, SimulationDraw};
use postsim_core::sampling::ChainSampler;
use postsim_core::types::{mask_select, Chain, InnovationMask, ParameterLayout};

fn test_chain(walkers: usize, iterations: usize, params: usize) -> Chain {
    Chain::new(Array3::from_shape_fn(
        (walkers, iterations, params),
        |(w, i, p)| ((w * 7919 + i * 104_729 + p * 13) % 1_000_003) as f64 * 1e-3,
    ))
}

fn mask_cell() -> impl Strategy<Value = f64> {
    prop_oneof![Just(f64::NAN), -10.0f64..10.0]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_sampler_deterministic(seed in any::<u64>(), tune in 0usize..20) {
        let chain = test_chain(3, 20 + tune, 2);
        let layout = ParameterLayout::new(Array1::from_elem(3, -1.0), vec![0, 2]).unwrap();
        let sampler = ChainSampler::from_parts(&chain, tune, &layout).unwrap();

        let a = sampler.sample(seed);
        let b = sampler.sample(seed);
        prop_assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_draw_overwrites_only_free_positions(seed in any::<u64>()) {
        let chain = test_chain(4, 100, 3);
        let layout = ParameterLayout::new(Array1::from_elem(4, 1.0), vec![1, 2, 3]).unwrap();
        let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();

        let draw = sampler.draw(seed);
        prop_assert_eq!(draw.parameters[0], 1.0);
        prop_assert!(draw.pool_row < sampler.pool_size());

        let walker = draw.pool_row / 50;
        let iteration = 50 + draw.pool_row % 50;
        for p in 0..3 {
            prop_assert_eq!(draw.parameters[p + 1], chain.view()[[walker, iteration, p]]);
        }
    }

    #[test]
    fn test_mask_select_law(
        cells in prop::collection::vec((mask_cell(), -10.0f64..10.0), 1..40)
    ) {
        let n = cells.len();
        let mask = Array2::from_shape_fn((n, 1), |(k, _)| cells[k].0);
        let computed = Array2::from_shape_fn((n, 1), |(k, _)| cells[k].1);

        let selected = InnovationMask::new(mask).select(computed.view()).unwrap();
        for (k, &(m, c)) in cells.iter().enumerate() {
            let expected = if m.is_nan() { c } else { m };
            prop_assert_eq!(selected[[k, 0]], expected);
            prop_assert_eq!(mask_select(m, c), expected);
        }
    }

    #[test]
    fn test_stack_shape_law(n in 1usize..12, periods in 0usize..8, vars in 1usize..4) {
        let draws: Vec<SimulationDraw> = (0..n)
            .map(|i| SimulationDraw {
                observables: Array2::from_elem((periods, vars), i as f64),
                states: Array2::from_elem((periods, vars + 1), i as f64),
                shocks: Array2::from_elem((periods, vars), i as f64),
                residuals: Array2::from_elem((periods, vars), i as f64),
            })
            .collect();

        let stacked = ResultAggregator::stack(draws).unwrap();
        prop_assert_eq!(stacked.observables.dim(), (n, periods, vars));
        prop_assert_eq!(stacked.states.dim(), (n, periods, vars + 1));
        prop_assert_eq!(stacked.draw_indices, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_field_stacker_preserves_values(values in prop::collection::vec(-1e6f64..1e6, 1..30)) {
        let mut stacker = FieldStacker::<ndarray::Ix1>::new("values");
        for (i, &v) in values.iter().enumerate() {
            stacker.push(i, Array1::from_elem(2, v).view()).unwrap();
        }
        let stacked = stacker.finish().unwrap();
        for (i, &v) in values.iter().enumerate() {
            prop_assert_eq!(stacked[[i, 0]], v);
            prop_assert_eq!(stacked[[i, 1]], v);
        }
    }
}

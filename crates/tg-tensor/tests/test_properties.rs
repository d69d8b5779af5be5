//! Property tests: permutation and reversal round trips, sum conservation,
//! nearest-point idempotence and multilinear exactness on affine data.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use tg_tensor::{GriddedTensor, IndexSpec, RearrangeOptions};

/// Tensor of the given shape with increasing grids and arbitrary values.
fn tensor_with(sizes: &[usize], values: &[f64]) -> GriddedTensor {
    let mut t = GriddedTensor::new(sizes).unwrap();
    let grids: Vec<Vec<f64>> = sizes
        .iter()
        .enumerate()
        .map(|(a, &n)| (0..n).map(|j| j as f64 * (a as f64 + 0.5) - 1.0).collect())
        .collect();
    t.set_grid(&grids).unwrap();
    for (d, v) in t.data_mut().iter_mut().zip(values.iter().cycle()) {
        *d = *v;
    }
    t
}

fn shape_and_values() -> impl Strategy<Value = (Vec<usize>, Vec<f64>)> {
    prop::collection::vec(1usize..5, 1..5).prop_flat_map(|sizes| {
        let total: usize = sizes.iter().product();
        (
            Just(sizes),
            prop::collection::vec(-100.0f64..100.0, total..=total),
        )
    })
}

/// Affine function with one coefficient per axis.
fn affine(coef: &[f64], x: &[f64]) -> f64 {
    coef.iter().zip(x).map(|(c, x)| c * x).sum::<f64>() + 0.75
}

fn fill_affine(t: &mut GriddedTensor, coef: &[f64]) {
    let mut ix = vec![0; t.rank()];
    let mut x = vec![0.0; t.rank()];
    for k in 0..t.total_size() {
        t.unpack_index(k, &mut ix);
        for a in 0..t.rank() {
            x[a] = t.get_grid(a, ix[a]).unwrap();
        }
        t.data_mut()[k] = affine(coef, &x);
    }
}

proptest! {
    #[test]
    fn permutation_round_trip((sizes, values) in shape_and_values(), seed in any::<u64>()) {
        let t = tensor_with(&sizes, &values);
        let rank = sizes.len();
        // a rotation by `shift` and its inverse
        let shift = (seed as usize) % rank;
        let forward: Vec<IndexSpec> = (0..rank).map(|i| IndexSpec::index((i + shift) % rank)).collect();
        let backward: Vec<IndexSpec> = (0..rank).map(|i| IndexSpec::index((i + rank - shift) % rank)).collect();
        let p = t.rearrange_and_copy(&forward, RearrangeOptions::default()).unwrap();
        let back = p.rearrange_and_copy(&backward, RearrangeOptions::default()).unwrap();
        prop_assert_eq!(back.sizes(), t.sizes());
        prop_assert_eq!(back.data(), t.data());
        prop_assert_eq!(back.grid_packed(), t.grid_packed());
    }

    #[test]
    fn double_reversal((sizes, values) in shape_and_values(), axis in 0usize..4) {
        let t = tensor_with(&sizes, &values);
        let axis = axis % sizes.len();
        let specs: Vec<IndexSpec> = (0..sizes.len())
            .map(|a| if a == axis { IndexSpec::reverse(a) } else { IndexSpec::index(a) })
            .collect();
        let once = t.rearrange_and_copy(&specs, RearrangeOptions::default()).unwrap();
        let twice = once.rearrange_and_copy(&specs, RearrangeOptions::default()).unwrap();
        prop_assert_eq!(twice.data(), t.data());
        prop_assert_eq!(twice.grid_packed(), t.grid_packed());
    }

    #[test]
    fn sum_conserves_total((sizes, values) in shape_and_values(), axis in 0usize..4) {
        prop_assume!(sizes.len() >= 2);
        let t = tensor_with(&sizes, &values);
        let axis = axis % sizes.len();
        let specs: Vec<IndexSpec> = (0..sizes.len())
            .map(|a| if a == axis { IndexSpec::sum(a) } else { IndexSpec::index(a) })
            .collect();
        let s = t.rearrange_and_copy(&specs, RearrangeOptions::default()).unwrap();
        prop_assert_eq!(s.rank(), sizes.len() - 1);
        let scale = t.data().iter().map(|v| v.abs()).sum::<f64>().max(1.0);
        prop_assert!((s.total_sum() - t.total_sum()).abs() <= 1e-12 * scale);
    }

    #[test]
    fn nearest_point_at_grid_nodes((sizes, values) in shape_and_values(), pick in any::<u64>()) {
        let t = tensor_with(&sizes, &values);
        let k = (pick as usize) % t.total_size();
        let mut ix = vec![0; t.rank()];
        t.unpack_index(k, &mut ix);
        let point: Vec<f64> = ix.iter().enumerate().map(|(a, &j)| t.get_grid(a, j).unwrap()).collect();
        prop_assert_eq!(t.get_val(&point).unwrap(), t.get(&ix).unwrap());
        prop_assert_eq!(t.lookup_grid_vec(&point).unwrap(), ix);
    }

    #[test]
    fn boundary_lookup(n in 1usize..8, beyond in 0.0f64..1e6) {
        let t = tensor_with(&[n], &[0.0]);
        let g = t.grid_axis(0).unwrap();
        prop_assert_eq!(t.lookup_grid(0, g[0] - beyond).unwrap(), 0);
        prop_assert_eq!(t.lookup_grid(0, g[n - 1] + beyond).unwrap(), n - 1);
    }

    #[test]
    fn multilinear_reproduces_affine(
        rank in 1usize..4,
        coef in prop::collection::vec(-5.0f64..5.0, 3),
        frac in prop::collection::vec(0.0f64..1.0, 3),
    ) {
        let sizes = vec![3; rank];
        let mut t = tensor_with(&sizes, &[0.0]);
        fill_affine(&mut t, &coef[..rank]);
        let point: Vec<f64> = (0..rank)
            .map(|a| {
                let g = t.grid_axis(a).unwrap();
                g[0] + frac[a] * (g[2] - g[0])
            })
            .collect();
        let v = t.interp_linear(&point).unwrap();
        prop_assert!((v - affine(&coef[..rank], &point)).abs() < 1e-9);
    }
}

#[test]
fn affine_exact_in_each_rank() {
    let coef = [1.5, -2.0, 0.25];
    for rank in 1..=3 {
        let mut t = tensor_with(&vec![4; rank], &[0.0]);
        fill_affine(&mut t, &coef[..rank]);
        let point = vec![0.3; rank];
        let expected = affine(&coef[..rank], &point);
        assert_abs_diff_eq!(t.interp_linear(&point).unwrap(), expected, epsilon = 1e-12);
        let direct = match rank {
            1 => t.interp_linear_1d(0.3).unwrap(),
            2 => t.interp_linear_2d(0.3, 0.3).unwrap(),
            _ => t.interp_linear_3d(0.3, 0.3, 0.3).unwrap(),
        };
        assert_abs_diff_eq!(direct, expected, epsilon = 1e-12);
    }
}

//! End-to-end scenarios for `GriddedTensor`: nearest-point access,
//! multilinear interpolation, reductions and resizing.

use approx::assert_abs_diff_eq;
use tg_core::errors::Error;
use tg_tensor::{GriddedTensor, IndexSpec, InterpType, RearrangeOptions, Table3D, UniformGrid};

/// 3×3 tensor on x = y = [0, 1, 2] with v(i, j) = i + j.
fn diagonal_sum() -> GriddedTensor {
    let mut t = GriddedTensor::new(&[3, 3]).unwrap();
    t.set_grid(&[vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            t.set(&[i, j], (i + j) as f64).unwrap();
        }
    }
    t
}

// ───────────────────────── interpolation and lookup ─────────────────────────

#[test]
fn bilinear_midpoint() {
    let t = diagonal_sum();
    assert_abs_diff_eq!(t.interp_linear(&[0.5, 0.5]).unwrap(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(t.interp_linear_2d(0.5, 0.5).unwrap(), 1.0, epsilon = 1e-14);
}

#[test]
fn nearest_grid_point_value() {
    let t = diagonal_sum();
    assert_eq!(t.get_val(&[1.4, 0.6]).unwrap(), 2.0);
    assert_eq!(t.get(&[1, 1]).unwrap(), 2.0);
}

#[test]
fn lookup_beyond_the_grid_clamps() {
    let t = diagonal_sum();
    for axis in 0..2 {
        assert_eq!(t.lookup_grid(axis, -1.0e9).unwrap(), 0);
        assert_eq!(t.lookup_grid(axis, 1.0e9).unwrap(), 2);
    }
}

// ───────────────────────── reductions ─────────────────────────

#[test]
fn sum_of_a_single_spike() {
    let mut t = GriddedTensor::new(&[3, 4, 2]).unwrap();
    t.set(&[2, 1, 1], 5.0).unwrap();
    let s = t
        .rearrange_and_copy(
            &[IndexSpec::index(0), IndexSpec::sum(1), IndexSpec::index(2)],
            RearrangeOptions::default(),
        )
        .unwrap();
    assert_eq!(s.rank(), 2);
    assert_eq!(s.sizes(), &[3, 2]);
    assert_eq!(s.total_sum(), 5.0);
    assert_eq!(s.get(&[2, 1]).unwrap(), 5.0);
}

#[test]
fn summing_to_a_table_matches_rearrangement() {
    let mut t = GriddedTensor::from_uniform(&[
        UniformGrid::linear(0.0, 1.0, 3).unwrap(),
        UniformGrid::linear(0.0, 1.0, 4).unwrap(),
        UniformGrid::linear(0.0, 1.0, 5).unwrap(),
    ])
    .unwrap();
    for (k, v) in t.data_mut().iter_mut().enumerate() {
        *v = (k % 7) as f64;
    }
    let s = t
        .rearrange_and_copy(
            &[IndexSpec::index(0), IndexSpec::sum(1), IndexSpec::index(2)],
            RearrangeOptions::default(),
        )
        .unwrap();
    let mut tab = Table3D::new();
    t.convert_table3d_sum(0, 2, &mut tab, "x", "z", "sum").unwrap();
    for i in 0..3 {
        for k in 0..5 {
            assert_eq!(tab.get(i, k, "sum").unwrap(), s.get(&[i, k]).unwrap());
        }
    }
}

// ───────────────────────── resizing ─────────────────────────

#[test]
fn failed_resize_leaves_tensor_intact() {
    let mut t = diagonal_sum();
    let err = t.resize(&[4, 0]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    assert_eq!(t.sizes(), &[3, 3]);
    assert!(t.is_grid_set());
    assert_eq!(t.grid_packed().len(), 6);
    assert!(t.is_valid().is_ok());
    assert_abs_diff_eq!(t.interp_linear(&[0.5, 0.5]).unwrap(), 1.0, epsilon = 1e-14);
}

#[test]
fn construction_rejects_zero_sizes() {
    assert!(matches!(
        GriddedTensor::new(&[2, 0, 3]),
        Err(Error::InvalidArgument(_))
    ));
}

// ───────────────────────── resampling workflow ─────────────────────────

#[test]
fn resample_then_project() {
    // f(x, y) = x² + y on a coarse grid, resampled linearly onto a finer x grid
    let xs: Vec<f64> = (0..6).map(|i| i as f64 * 0.2).collect();
    let ys = vec![0.0, 1.0];
    let mut t = GriddedTensor::new(&[xs.len(), ys.len()]).unwrap();
    t.set_grid(&[xs.clone(), ys.clone()]).unwrap();
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            t.set(&[i, j], x * x + y).unwrap();
        }
    }
    let fine = t
        .rearrange_and_copy(
            &[IndexSpec::grid(0, 0.0, 1.0, 0.1), IndexSpec::index(1)],
            RearrangeOptions::default(),
        )
        .unwrap();
    assert_eq!(fine.sizes(), &[11, 2]);
    // odd points sit halfway between coarse nodes: chord of x² overshoots by h²/4
    assert_abs_diff_eq!(fine.get(&[3, 1]).unwrap(), 0.09 + 0.01 + 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fine.get(&[4, 0]).unwrap(), 0.16, epsilon = 1e-12);

    let mut tab = Table3D::new();
    fine.copy_table3d_align_setxy(0, 1, &[0, 0], &mut tab, "x", "y", "f")
        .unwrap();
    assert_eq!(tab.size(), (11, 2));
    assert_abs_diff_eq!(tab.grid_x(5).unwrap(), 0.5, epsilon = 1e-12);
}

#[test]
fn spline_interpolation_of_smooth_data() {
    let xs: Vec<f64> = (0..9).map(|i| i as f64 * 0.25).collect();
    let mut t = GriddedTensor::new(&[xs.len()]).unwrap();
    t.set_grid(&[xs.clone()]).unwrap();
    for (i, x) in xs.iter().enumerate() {
        t.set(&[i], x.sin()).unwrap();
    }
    t.set_interp_type(InterpType::Cubic);
    let cubic = t.interpolate(&[1.1]).unwrap();
    let linear = t.interp_linear_1d(1.1).unwrap();
    assert!((cubic - 1.1f64.sin()).abs() < 1e-3);
    assert!((cubic - 1.1f64.sin()).abs() < (linear - 1.1f64.sin()).abs());
}

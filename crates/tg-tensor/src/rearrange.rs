//! Building a new gridded tensor from a list of [`IndexSpec`] entries.
//!
//! Every source axis is covered by exactly one entry. Output axes appear in
//! the order of the entries that produce them. Each output cell is a sum over
//! the Cartesian product of the reduced extents (one factor per `Sum`, one
//! per `Trace`, in entry order); each term reads the source directly, or via
//! multilinear interpolation over the `Interp`/`Grid` axes when there are
//! any.

use tracing::{debug, info, trace, warn};

use tg_core::{
    errors::{Error, Result},
    Real,
};

use crate::{grid::UniformGrid, index_spec::IndexSpec, interp::InterpScratch, GriddedTensor};

/// Settings for [`GriddedTensor::rearrange_and_copy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RearrangeOptions {
    /// `0` silent, `1` summary, `2` per-axis mapping, `3` every summation
    /// step. Emitted through `tracing`.
    pub verbose: u8,
    /// Return errors (`true`) or an empty rank-0 tensor (`false`) when the
    /// specification is inconsistent.
    pub err_on_fail: bool,
}

impl Default for RearrangeOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            err_on_fail: true,
        }
    }
}

/// Where the index of one source axis comes from.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Output axis `out`, read as `begin + i` or `begin - i`.
    Output {
        out: usize,
        begin: usize,
        reversed: bool,
    },
    /// Summation loop variable.
    Loop(usize),
    Fixed(usize),
    /// Interpolated at a constant coordinate.
    Value(Real),
    /// Interpolated at the coordinates of a synthetic output axis.
    Resampled { out: usize, grid: UniformGrid },
}

#[derive(Debug)]
struct Plan {
    sources: Vec<Source>,
    out_sizes: Vec<usize>,
    out_grids: Option<Vec<Vec<Real>>>,
    loop_extents: Vec<usize>,
    /// Interpolated source axes, ascending.
    interp_axes: Vec<usize>,
}

/// Row-major multi-index of `offset` over `extents`.
fn unpack(extents: &[usize], mut offset: usize, index: &mut [usize]) {
    for k in (0..extents.len()).rev() {
        index[k] = offset % extents[k];
        offset /= extents[k];
    }
}

impl GriddedTensor {
    /// Build a new tensor by keeping, reversing, slicing, summing, tracing,
    /// fixing, interpolating or resampling each source axis as `specs` says.
    ///
    /// The source is never modified. When the source grid is set the output
    /// gets the matching grid (kept axes carry their coordinates, resampled
    /// axes their new ones); otherwise its grid is left unset.
    ///
    /// ```
    /// # use tg_tensor::{GriddedTensor, IndexSpec, RearrangeOptions};
    /// let mut t = GriddedTensor::new(&[2, 3]).unwrap();
    /// t.data_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let s = t
    ///     .rearrange_and_copy(&[IndexSpec::sum(0), IndexSpec::reverse(1)], RearrangeOptions::default())
    ///     .unwrap();
    /// assert_eq!(s.data(), &[9.0, 7.0, 5.0]);
    /// ```
    ///
    /// # Errors
    /// With `err_on_fail` set, `InvalidArgument` for uncovered, repeated or
    /// out-of-range axes and bounds, `Precondition` when `Interp`/`Grid`
    /// entries meet a tensor without a grid. Without it, any failure yields
    /// `Ok` with a rank-0 tensor.
    pub fn rearrange_and_copy(
        &self,
        specs: &[IndexSpec],
        opts: RearrangeOptions,
    ) -> Result<GriddedTensor> {
        match self.plan(specs, opts).and_then(|plan| self.execute(&plan, opts)) {
            Ok(t) => Ok(t),
            Err(e) if !opts.err_on_fail => {
                warn!(error = %e, "rearrangement failed; returning an empty tensor");
                Ok(GriddedTensor::default())
            }
            Err(e) => Err(e),
        }
    }

    fn plan(&self, specs: &[IndexSpec], opts: RearrangeOptions) -> Result<Plan> {
        const OP: &str = "rearrange_and_copy";
        let rank = self.rank();
        tg_core::ensure_arg!(rank > 0, "source tensor has rank 0 in {OP}()");

        let mut owner: Vec<Option<usize>> = vec![None; rank];
        for (k, spec) in specs.iter().enumerate() {
            let (a, b) = spec.source_axes();
            for axis in std::iter::once(a).chain(b) {
                tg_core::ensure_arg!(
                    axis < rank,
                    "entry {k} ({spec}) names axis {axis} of a rank {rank} tensor in {OP}()"
                );
                if let Some(prev) = owner[axis] {
                    return Err(Error::InvalidArgument(format!(
                        "axis {axis} covered by entries {prev} and {k} in {OP}()"
                    )));
                }
                owner[axis] = Some(k);
            }
        }
        if let Some(axis) = owner.iter().position(Option::is_none) {
            return Err(Error::InvalidArgument(format!(
                "axis {axis} not covered by any entry in {OP}()"
            )));
        }

        let needs_grid = specs
            .iter()
            .any(|s| matches!(s, IndexSpec::Interp { .. } | IndexSpec::Grid { .. }));
        if needs_grid {
            self.require_grid(OP)?;
        }

        let mut sources = vec![Source::Fixed(0); rank];
        let mut out_sizes = Vec::new();
        let mut out_grids = Vec::new();
        let mut loop_extents = Vec::new();
        for spec in specs {
            let out = out_sizes.len();
            match *spec {
                IndexSpec::Index(a) => {
                    sources[a] = Source::Output {
                        out,
                        begin: 0,
                        reversed: false,
                    };
                    out_sizes.push(self.size(a));
                    if self.is_grid_set() {
                        out_grids.push(self.copy_grid(a)?);
                    }
                }
                IndexSpec::Reverse(a) => {
                    let n = self.size(a);
                    sources[a] = Source::Output {
                        out,
                        begin: n - 1,
                        reversed: true,
                    };
                    out_sizes.push(n);
                    if self.is_grid_set() {
                        out_grids.push(self.grid_axis(a)?.iter().rev().copied().collect());
                    }
                }
                IndexSpec::Range { axis, begin, end } => {
                    let n = self.size(axis);
                    if begin >= n || end >= n {
                        return Err(Error::InvalidArgument(format!(
                            "range {begin}..={end} exceeds size {n} of axis {axis} in {OP}()"
                        )));
                    }
                    let reversed = begin > end;
                    sources[axis] = Source::Output {
                        out,
                        begin,
                        reversed,
                    };
                    out_sizes.push(begin.abs_diff(end) + 1);
                    if self.is_grid_set() {
                        let g = self.grid_axis(axis)?;
                        out_grids.push(if reversed {
                            g[end..=begin].iter().rev().copied().collect()
                        } else {
                            g[begin..=end].to_vec()
                        });
                    }
                }
                IndexSpec::Trace(a, b) => {
                    tg_core::ensure_arg!(a != b, "trace over axis {a} with itself in {OP}()");
                    sources[a] = Source::Loop(loop_extents.len());
                    sources[b] = Source::Loop(loop_extents.len());
                    loop_extents.push(self.size(a).min(self.size(b)));
                }
                IndexSpec::Sum(a) => {
                    sources[a] = Source::Loop(loop_extents.len());
                    loop_extents.push(self.size(a));
                }
                IndexSpec::Fixed { axis, index } => {
                    let n = self.size(axis);
                    if index >= n {
                        return Err(Error::IndexOutOfRange { index, size: n });
                    }
                    sources[axis] = Source::Fixed(index);
                }
                IndexSpec::Interp { axis, value } => {
                    sources[axis] = Source::Value(value);
                }
                IndexSpec::Grid {
                    axis,
                    begin,
                    end,
                    width,
                    log,
                } => {
                    let grid = UniformGrid::from_width(begin, end, width, log)?;
                    sources[axis] = Source::Resampled { out, grid };
                    out_sizes.push(grid.npoints());
                    out_grids.push(grid.values());
                }
            }
        }
        tg_core::ensure_arg!(
            !out_sizes.is_empty(),
            "every axis is reduced, leaving a rank 0 result in {OP}()"
        );

        let interp_axes: Vec<usize> = sources
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Source::Value(_) | Source::Resampled { .. }))
            .map(|(a, _)| a)
            .collect();

        if opts.verbose > 0 {
            info!(
                source_sizes = ?self.sizes(),
                output_sizes = ?out_sizes,
                sums = loop_extents.len(),
                interpolated = interp_axes.len(),
                "rearranging tensor"
            );
        }
        if opts.verbose > 1 {
            for (axis, src) in sources.iter().enumerate() {
                debug!(axis, source = ?src, "source axis mapping");
            }
        }

        Ok(Plan {
            sources,
            out_grids: self.is_grid_set().then_some(out_grids),
            out_sizes,
            loop_extents,
            interp_axes,
        })
    }

    fn execute(&self, plan: &Plan, opts: RearrangeOptions) -> Result<GriddedTensor> {
        let mut out = GriddedTensor::new(&plan.out_sizes)?;
        if let Some(grids) = &plan.out_grids {
            out.set_grid(grids)?;
        }
        out.set_interp_type(self.interp_type());

        let n_loops: usize = plan.loop_extents.iter().product();
        let mut ix_new = vec![0; out.rank()];
        let mut ix_loop = vec![0; plan.loop_extents.len()];
        let mut ix_old = vec![0; self.rank()];
        let mut values = Vec::with_capacity(plan.interp_axes.len());
        let mut scratch = InterpScratch::new();

        for k in 0..out.total_size() {
            out.unpack_index(k, &mut ix_new);
            values.clear();
            values.extend(plan.sources.iter().filter_map(|s| match *s {
                Source::Value(x) => Some(x),
                Source::Resampled { out, grid } => Some(grid.value(ix_new[out])),
                _ => None,
            }));
            let mut sum = 0.0;
            for l in 0..n_loops {
                unpack(&plan.loop_extents, l, &mut ix_loop);
                for (axis, src) in plan.sources.iter().enumerate() {
                    ix_old[axis] = match *src {
                        Source::Output {
                            out,
                            begin,
                            reversed: false,
                        } => begin + ix_new[out],
                        Source::Output {
                            out,
                            begin,
                            reversed: true,
                        } => begin - ix_new[out],
                        Source::Loop(j) => ix_loop[j],
                        Source::Fixed(i) => i,
                        Source::Value(_) | Source::Resampled { .. } => 0,
                    };
                }
                let term = if plan.interp_axes.is_empty() {
                    self.data()[self.tensor().pack_unchecked(&ix_old)]
                } else {
                    self.partial_unchecked(
                        &plan.interp_axes,
                        &ix_old,
                        &values,
                        &mut scratch,
                        "rearrange_and_copy",
                    )?
                };
                if opts.verbose > 2 {
                    trace!(cell = k, step = l, index = ?ix_old, term, "summation step");
                }
                sum += term;
            }
            out.data_mut()[k] = sum;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn opts() -> RearrangeOptions {
        RearrangeOptions::default()
    }

    /// 2×3×4 tensor with v = 100 i + 10 j + k on grids x = i, y = 2 j, z = k/2.
    fn sample() -> GriddedTensor {
        let mut t = GriddedTensor::new(&[2, 3, 4]).unwrap();
        t.set_grid(&[vec![0.0, 1.0], vec![0.0, 2.0, 4.0], vec![0.0, 0.5, 1.0, 1.5]])
            .unwrap();
        let mut ix = [0; 3];
        for n in 0..t.total_size() {
            t.unpack_index(n, &mut ix);
            t.data_mut()[n] = (100 * ix[0] + 10 * ix[1] + ix[2]) as f64;
        }
        t
    }

    #[test]
    fn permutation_carries_grid() {
        let t = sample();
        let p = t
            .rearrange_and_copy(
                &[IndexSpec::index(2), IndexSpec::index(0), IndexSpec::index(1)],
                opts(),
            )
            .unwrap();
        assert_eq!(p.sizes(), &[4, 2, 3]);
        assert_eq!(p.get(&[3, 1, 2]).unwrap(), 123.0);
        assert_eq!(p.grid_axis(0).unwrap(), &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(p.grid_axis(2).unwrap(), &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn range_and_reverse() {
        let t = sample();
        let r = t
            .rearrange_and_copy(
                &[IndexSpec::fixed(0, 1), IndexSpec::reverse(1), IndexSpec::range(2, 3, 1)],
                opts(),
            )
            .unwrap();
        assert_eq!(r.sizes(), &[3, 3]);
        assert_eq!(r.get(&[0, 0]).unwrap(), 123.0);
        assert_eq!(r.get(&[2, 2]).unwrap(), 101.0);
        assert_eq!(r.grid_axis(0).unwrap(), &[4.0, 2.0, 0.0]);
        assert_eq!(r.grid_axis(1).unwrap(), &[1.5, 1.0, 0.5]);
    }

    #[test]
    fn sum_and_trace() {
        let t = sample();
        let s = t
            .rearrange_and_copy(&[IndexSpec::sum(1), IndexSpec::index(0), IndexSpec::sum(2)], opts())
            .unwrap();
        assert_eq!(s.sizes(), &[2]);
        // Σ_j Σ_k (100 i + 10 j + k) = 1200 i + 120 + 18
        assert_eq!(s.data(), &[138.0, 1338.0]);

        let tr = t
            .rearrange_and_copy(&[IndexSpec::trace(1, 2), IndexSpec::index(0)], opts())
            .unwrap();
        // Σ_{j<3} (100 i + 11 j) = 300 i + 33
        assert_eq!(tr.data(), &[33.0, 333.0]);
    }

    #[test]
    fn interpolated_and_resampled_axes() {
        let t = sample();
        let r = t
            .rearrange_and_copy(
                &[IndexSpec::interp(0, 0.25), IndexSpec::grid(2, 0.25, 1.0, 0.25), IndexSpec::sum(1)],
                opts(),
            )
            .unwrap();
        assert_eq!(r.sizes(), &[4]);
        assert_eq!(r.grid_axis(0).unwrap().len(), 4);
        // Σ_j (100·0.25 + 10 j + 2 z) at z = 0.25·(m+1)
        for m in 0..4 {
            let z = 0.25 * (m + 1) as f64;
            assert_abs_diff_eq!(r.get(&[m]).unwrap(), 75.0 + 30.0 + 6.0 * z, epsilon = 1e-12);
        }
    }

    #[test]
    fn log_resampling() {
        let t = sample();
        let r = t
            .rearrange_and_copy(
                &[IndexSpec::fixed(0, 0), IndexSpec::fixed(1, 0), IndexSpec::grid_log(2, 0.25, 1.0, 2.0)],
                opts(),
            )
            .unwrap();
        assert_eq!(r.sizes(), &[3]);
        for (m, z) in [0.25, 0.5, 1.0].iter().enumerate() {
            assert_abs_diff_eq!(r.get(&[m]).unwrap(), 2.0 * z, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_specs() {
        let t = sample();
        let cases: Vec<Vec<IndexSpec>> = vec![
            vec![IndexSpec::index(0), IndexSpec::index(1)],
            vec![IndexSpec::index(0), IndexSpec::index(1), IndexSpec::index(1)],
            vec![IndexSpec::index(0), IndexSpec::index(1), IndexSpec::index(3)],
            vec![IndexSpec::index(0), IndexSpec::index(1), IndexSpec::range(2, 1, 4)],
            vec![IndexSpec::sum(0), IndexSpec::trace(1, 2)],
            vec![IndexSpec::index(0), IndexSpec::trace(1, 1), IndexSpec::sum(2)],
        ];
        for specs in cases {
            assert!(
                matches!(t.rearrange_and_copy(&specs, opts()), Err(Error::InvalidArgument(_))),
                "{specs:?}"
            );
            let soft = RearrangeOptions {
                err_on_fail: false,
                ..opts()
            };
            assert_eq!(t.rearrange_and_copy(&specs, soft).unwrap().rank(), 0);
        }
        assert!(matches!(
            t.rearrange_and_copy(
                &[IndexSpec::fixed(0, 2), IndexSpec::index(1), IndexSpec::index(2)],
                opts()
            ),
            Err(Error::IndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn interpolation_needs_grid() {
        let t = GriddedTensor::new(&[2, 2]).unwrap();
        assert!(matches!(
            t.rearrange_and_copy(&[IndexSpec::interp(0, 0.5), IndexSpec::index(1)], opts()),
            Err(Error::Precondition(_))
        ));
        let s = t
            .rearrange_and_copy(&[IndexSpec::sum(0), IndexSpec::index(1)], opts())
            .unwrap();
        assert!(!s.is_grid_set());
    }

    #[test]
    fn soft_failure_without_grid() {
        let t = GriddedTensor::new(&[2, 2]).unwrap();
        let soft = RearrangeOptions {
            err_on_fail: false,
            ..opts()
        };
        let s = t
            .rearrange_and_copy(&[IndexSpec::interp(0, 0.5), IndexSpec::index(1)], soft)
            .unwrap();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.total_size(), 0);
        assert_eq!(s.get(&[]), Err(Error::IndexOutOfRange { index: 0, size: 0 }));
        assert!(s.get_val(&[]).is_err());
    }

    #[test]
    fn oversized_resampling_fails_softly() {
        let t = sample();
        let specs = [
            IndexSpec::grid(0, 0.0, 1.0, 1e-300),
            IndexSpec::index(1),
            IndexSpec::index(2),
        ];
        assert!(matches!(
            t.rearrange_and_copy(&specs, opts()),
            Err(Error::InvalidArgument(_))
        ));
        let soft = RearrangeOptions {
            err_on_fail: false,
            ..opts()
        };
        assert_eq!(t.rearrange_and_copy(&specs, soft).unwrap().rank(), 0);
    }

    #[test]
    fn verbose_levels_run() {
        let t = sample();
        let loud = RearrangeOptions {
            verbose: 3,
            err_on_fail: true,
        };
        let s = t
            .rearrange_and_copy(&[IndexSpec::sum(0), IndexSpec::sum(1), IndexSpec::index(2)], loud)
            .unwrap();
        assert_abs_diff_eq!(s.total_sum(), t.total_sum(), epsilon = 1e-9);
    }
}

//! Linear solver with regularization and fallbacks
//!
//! Restrained DOFs are partitioned out, the free block is regularized by a
//! small multiple of its largest diagonal and solved with the skyline
//! Cholesky after RCM reordering. If that fails a dense LU is tried; if that
//! fails too the displacement is zero and the status says so.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::assembly::GlobalSystem;
use crate::elements::{Node, Support};
use crate::math::{self, sparse, SparseCholeskySolver, SparseMatrixBuilder};

/// Cooperative cancellation flag shared between a caller and running analyses
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a load case's displacement was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Sparse Cholesky succeeded (or there was nothing to solve)
    Solved,
    /// Sparse path failed, dense LU succeeded
    DenseFallback,
    /// Both paths failed; displacement is zero
    Failed,
    /// Cancelled before completion; displacement is zero
    Cancelled,
}

impl SolveStatus {
    /// True when the displacement is a placeholder rather than a solution
    pub fn is_degraded(&self) -> bool {
        matches!(self, SolveStatus::Failed | SolveStatus::Cancelled)
    }
}

/// Displacement vector and solve status
#[derive(Debug, Clone)]
pub struct Solution {
    pub displacements: DVector<f64>,
    pub status: SolveStatus,
}

impl Solution {
    fn zero(n_dofs: usize, status: SolveStatus) -> Self {
        Self {
            displacements: DVector::zeros(n_dofs),
            status,
        }
    }
}

/// Mask of restrained DOFs; supports on nodes outside the system are ignored
pub fn restrained_dofs(n_dofs: usize, supports: &BTreeMap<usize, Support>) -> Vec<bool> {
    let mut restrained = vec![false; n_dofs];
    for (&node, support) in supports {
        let base = Node::base_dof(node);
        if base + 6 > n_dofs {
            warn!("Support on node {} is outside the system; ignored", node);
            continue;
        }
        for (d, &fixed) in support.as_array().iter().enumerate() {
            restrained[base + d] = fixed;
        }
    }
    restrained
}

/// Solve `K d = F` for one load case
pub fn solve(
    system: &GlobalSystem,
    supports: &BTreeMap<usize, Support>,
    options: &AnalysisOptions,
    cancel: &CancellationToken,
) -> Solution {
    let n_dofs = system.dof_count();

    if system.forces.iter().all(|f| *f == 0.0) {
        debug!("Force vector is zero; displacement is zero");
        return Solution::zero(n_dofs, SolveStatus::Solved);
    }
    if cancel.is_cancelled() {
        return Solution::zero(n_dofs, SolveStatus::Cancelled);
    }

    let restrained = restrained_dofs(n_dofs, supports);
    let free: Vec<usize> = (0..n_dofs).filter(|&d| !restrained[d]).collect();
    if free.is_empty() {
        return Solution::zero(n_dofs, SolveStatus::Solved);
    }
    let mut free_index = vec![usize::MAX; n_dofs];
    for (k, &d) in free.iter().enumerate() {
        free_index[d] = k;
    }

    let n_free = free.len();
    let mut builder = SparseMatrixBuilder::new(n_free);
    let mut max_diag: f64 = 0.0;
    for (row, col, &value) in system.stiffness.triplet_iter() {
        let (r, c) = (free_index[row], free_index[col]);
        if r == usize::MAX || c == usize::MAX {
            continue;
        }
        if r == c {
            max_diag = max_diag.max(value.abs());
        }
        builder.add(r, c, value);
    }

    let regularization = options.regularization_factor * max_diag;
    for k in 0..n_free {
        builder.add(k, k, regularization);
    }
    let k_free = builder.to_csr();
    let f_free = DVector::from_fn(n_free, |k, _| system.forces[free[k]]);

    if f_free.iter().all(|f| *f == 0.0) {
        return Solution::zero(n_dofs, SolveStatus::Solved);
    }

    debug!(
        "Solving {} free DOFs ({} restrained), regularization {:.3e}",
        n_free,
        n_dofs - n_free,
        regularization
    );

    let (d_free, status) = match solve_sparse(&k_free, &f_free) {
        Ok(d) => (d, SolveStatus::Solved),
        Err(reason) => {
            warn!("Sparse solve failed ({}); trying dense fallback", reason);
            match solve_dense(&k_free, &f_free, options, cancel) {
                Ok(d) => (d, SolveStatus::DenseFallback),
                Err(status) => {
                    warn!("Dense fallback unavailable: {:?}; returning zero displacement", status);
                    return Solution::zero(n_dofs, status);
                }
            }
        }
    };

    let mut displacements = DVector::zeros(n_dofs);
    for (k, &d) in free.iter().enumerate() {
        displacements[d] = d_free[k];
    }
    Solution {
        displacements,
        status,
    }
}

/// RCM reordering followed by skyline Cholesky
fn solve_sparse(
    k: &nalgebra_sparse::CsrMatrix<f64>,
    f: &DVector<f64>,
) -> Result<DVector<f64>, &'static str> {
    let perm = math::reverse_cuthill_mckee(k);
    let permuted = sparse::permute_symmetric(k, &perm);

    let mut cholesky = SparseCholeskySolver::new(&permuted);
    debug!("Skyline profile: {} entries", cholesky.profile_size());
    cholesky.factorize()?;

    let f_perm = DVector::from_fn(f.len(), |i, _| f[perm[i]]);
    let d_perm = cholesky.solve(&f_perm);

    let mut d = DVector::zeros(f.len());
    for (new_idx, &old_idx) in perm.iter().enumerate() {
        d[old_idx] = d_perm[new_idx];
    }
    if d.iter().all(|v| v.is_finite()) {
        Ok(d)
    } else {
        Err("non-finite displacement")
    }
}

/// Dense LU on the same regularized matrix
fn solve_dense(
    k: &nalgebra_sparse::CsrMatrix<f64>,
    f: &DVector<f64>,
    options: &AnalysisOptions,
    cancel: &CancellationToken,
) -> Result<DVector<f64>, SolveStatus> {
    if f.len() > options.dense_fallback_max_dofs {
        warn!(
            "{} DOFs exceeds the dense fallback limit of {}",
            f.len(),
            options.dense_fallback_max_dofs
        );
        return Err(SolveStatus::Failed);
    }
    if cancel.is_cancelled() {
        return Err(SolveStatus::Cancelled);
    }

    let dense = nalgebra_sparse::convert::serial::convert_csr_dense(k);
    if cancel.is_cancelled() {
        return Err(SolveStatus::Cancelled);
    }

    let solution = math::solve_linear_system(dense, f);
    if cancel.is_cancelled() {
        return Err(SolveStatus::Cancelled);
    }

    match solution {
        Some(d) if d.iter().all(|v| v.is_finite()) => Ok(d),
        _ => Err(SolveStatus::Failed),
    }
}

//! Sparse matrix utilities for the global system
//!
//! Building stiffness matrices are overwhelmingly sparse: each node couples only
//! to the nodes of the elements framing into it. Triplets are collected in COO
//! form, summed into CSR, reordered with reverse Cuthill-McKee and factorized
//! with a skyline Cholesky.

use nalgebra::{DVector, SMatrix};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::collections::VecDeque;

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Estimate: 6 DOFs per node, ~10 connections per node
        let estimated_nnz = size * 60;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() > 1e-15 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a small dense element matrix through its global DOF map
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        dofs: &[usize; N],
        k_elem: &SMatrix<f64, N, N>,
    ) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw (possibly duplicated) triplets
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Convert to CSR format, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Get estimated non-zero count
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Sparse Cholesky solver for symmetric positive definite matrices
///
/// Skyline storage: each row keeps the entries from its first non-zero up to
/// the diagonal. Only the lower triangle of the input is read.
pub struct SparseCholeskySolver {
    size: usize,
    skyline: Vec<Vec<f64>>,
    // Distance from the diagonal to the first non-zero of each row
    heights: Vec<usize>,
}

impl SparseCholeskySolver {
    /// Create solver from CSR matrix
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let idx = col - (row - heights[row]);
                skyline[row][idx] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
        }
    }

    /// Number of stored entries in the profile
    pub fn profile_size(&self) -> usize {
        self.skyline.iter().map(|r| r.len()).sum()
    }

    /// Factorize the matrix in place (L * L^T)
    pub fn factorize(&mut self) -> Result<(), &'static str> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;

                let start = start_i.max(start_j);
                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                if diag_j.abs() < 1e-15 {
                    return Err("Zero pivot in Cholesky factorization");
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let diag = self.skyline[i][hi] - sum;
            if !diag.is_finite() || diag <= 0.0 {
                return Err("Matrix not positive definite");
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve L * L^T * x = b with the factorized matrix
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

/// Sparse matrix-vector multiplication
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let mut sum = 0.0;
        for idx in row_offsets[row]..row_offsets[row + 1] {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

/// Bandwidth reduction using Reverse Cuthill-McKee algorithm
///
/// Returns a permutation vector: `perm[new_index] = old_index`
pub fn reverse_cuthill_mckee(csr: &CsrMatrix<f64>) -> Vec<usize> {
    let n = csr.nrows();
    if n == 0 {
        return vec![];
    }

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (row, col, &val) in csr.triplet_iter() {
        if val.abs() > 1e-15 && row != col {
            adj[row].push(col);
        }
    }

    let degrees: Vec<usize> = adj.iter().map(|v| v.len()).collect();

    // Sort adjacencies by degree (index breaks ties so the order is reproducible)
    for neighbors in &mut adj {
        neighbors.sort_by_key(|&i| (degrees[i], i));
    }

    // Component seeds are taken in (degree, index) order
    let mut seeds: Vec<usize> = (0..n).collect();
    seeds.sort_by_key(|&i| (degrees[i], i));
    let mut next_seed = 0;

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    while result.len() < n {
        while next_seed < n && visited[seeds[next_seed]] {
            next_seed += 1;
        }
        let start = seeds[next_seed];
        queue.push_back(start);
        visited[start] = true;

        while let Some(node) = queue.pop_front() {
            result.push(node);

            for &neighbor in &adj[node] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    result.reverse();
    result
}

/// Create inverse permutation
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (new_idx, &old_idx) in perm.iter().enumerate() {
        inv[old_idx] = new_idx;
    }
    inv
}

/// Symmetrically permute a square CSR matrix: `B[inv[r], inv[c]] = A[r, c]`
pub fn permute_symmetric(csr: &CsrMatrix<f64>, perm: &[usize]) -> CsrMatrix<f64> {
    let inv = inverse_permutation(perm);
    let mut coo = CooMatrix::new(csr.nrows(), csr.ncols());
    for (row, col, &val) in csr.triplet_iter() {
        coo.push(inv[row], inv[col], val);
    }
    CsrMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix2;

    fn tridiagonal(n: usize) -> CsrMatrix<f64> {
        let mut builder = SparseMatrixBuilder::new(n);
        for i in 0..n {
            builder.add(i, i, 4.0);
            if i + 1 < n {
                builder.add(i, i + 1, -1.0);
                builder.add(i + 1, i, -1.0);
            }
        }
        builder.to_csr()
    }

    #[test]
    fn test_builder_sums_duplicates() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add_element_matrix(&[0, 1], &Matrix2::new(1.0, -1.0, -1.0, 1.0));
        builder.add_element_matrix(&[0, 1], &Matrix2::new(1.0, -1.0, -1.0, 1.0));
        builder.add(1, 1, 0.0);

        assert_eq!(builder.nnz(), 8);
        let csr = builder.to_csr();
        let dense = nalgebra_sparse::convert::serial::convert_csr_dense(&csr);
        assert!((dense[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((dense[(0, 1)] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_skyline_cholesky_solve() {
        let csr = tridiagonal(5);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut solver = SparseCholeskySolver::new(&csr);
        solver.factorize().unwrap();
        let x = solver.solve(&b);

        let error = (sparse_matvec(&csr, &x) - &b).norm();
        assert!(error < 1e-10, "Error: {}", error);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(0, 1, 2.0);
        builder.add(1, 0, 2.0);
        builder.add(1, 1, 1.0);

        let mut solver = SparseCholeskySolver::new(&builder.to_csr());
        assert!(solver.factorize().is_err());
    }

    #[test]
    fn test_rcm_is_permutation() {
        let csr = tridiagonal(6);
        let mut perm = reverse_cuthill_mckee(&csr);
        perm.sort_unstable();
        assert_eq!(perm, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_permuted_solve_matches() {
        let csr = tridiagonal(6);
        let b = DVector::from_fn(6, |i, _| i as f64 + 1.0);
        let perm = vec![5, 3, 1, 0, 2, 4];

        let permuted = permute_symmetric(&csr, &perm);
        let b_perm = DVector::from_fn(6, |k, _| b[perm[k]]);
        let mut solver = SparseCholeskySolver::new(&permuted);
        solver.factorize().unwrap();
        let x_perm = solver.solve(&b_perm);

        let mut x = DVector::zeros(6);
        for (k, &old) in perm.iter().enumerate() {
            x[old] = x_perm[k];
        }
        assert!((sparse_matvec(&csr, &x) - b).norm() < 1e-10);
    }
}

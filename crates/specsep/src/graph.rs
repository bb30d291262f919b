//! Row-compressed sparse similarity graphs.
//!
//! A [`CsrGraph`] stores, for every point `i`, the indices of its neighbors
//! and a non-negative weight per link. Stored entries are exactly the
//! non-zero entries of the equivalent dense matrix: zeros are dropped on
//! construction, and column indices within a row are kept in ascending
//! order.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SpecsepError};

/// Sparse square-or-rectangular weight matrix in CSR layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    n_rows: usize,
    n_cols: usize,
    /// Row `i` occupies `indices[indptr[i]..indptr[i + 1]]`
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

fn check_weight(row: usize, col: usize, weight: f32) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(SpecsepError::invalid(
            "rec",
            format!("weight at ({row}, {col}) must be finite and non-negative, got {weight}"),
        ));
    }
    Ok(())
}

impl CsrGraph {
    /// Graph with `n_rows x n_cols` shape and no links.
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from a dense weight matrix, keeping its non-zero entries.
    pub fn from_dense(dense: ArrayView2<f32>) -> Result<Self> {
        let (n_rows, n_cols) = dense.dim();
        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for (i, row) in dense.rows().into_iter().enumerate() {
            for (j, &w) in row.iter().enumerate() {
                check_weight(i, j, w)?;
                if w != 0.0 {
                    indices.push(j);
                    data.push(w);
                }
            }
            indptr.push(indices.len());
        }

        Ok(Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    /// Build from `(row, col, weight)` triplets.
    ///
    /// Duplicate coordinates are summed; entries that end up zero are
    /// dropped.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f32)>,
    ) -> Result<Self> {
        let mut rows: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n_rows];
        for (i, j, w) in triplets {
            if i >= n_rows || j >= n_cols {
                return Err(SpecsepError::invalid(
                    "rec",
                    format!("entry ({i}, {j}) outside {n_rows}x{n_cols} graph"),
                ));
            }
            check_weight(i, j, w)?;
            rows[i].push((j, w));
        }
        Ok(Self::from_rows(n_cols, rows))
    }

    /// Assemble from per-row `(col, weight)` lists that are already validated.
    pub(crate) fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f32)>>) -> Self {
        let n_rows = rows.len();
        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for mut row in rows {
            row.sort_by_key(|&(j, _)| j);
            let mut iter = row.into_iter().peekable();
            while let Some((j, mut w)) = iter.next() {
                while let Some(&(next_j, next_w)) = iter.peek() {
                    if next_j != j {
                        break;
                    }
                    w += next_w;
                    iter.next();
                }
                if w != 0.0 {
                    indices.push(j);
                    data.push(w);
                }
            }
            indptr.push(indices.len());
        }

        Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Whether the graph has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Number of stored links.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Neighbor indices of point `i`, ascending.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.indices[self.indptr[i]..self.indptr[i + 1]]
    }

    /// Link weights of point `i`, aligned with [`neighbors`](Self::neighbors).
    pub fn weights(&self, i: usize) -> &[f32] {
        &self.data[self.indptr[i]..self.indptr[i + 1]]
    }

    /// Weight of the link `i -> j`, zero when absent.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.neighbors(i)
            .binary_search(&j)
            .map(|k| self.weights(i)[k])
            .unwrap_or(0.0)
    }

    /// Largest weight in row `i`, if the row has links.
    pub fn row_max(&self, i: usize) -> Option<f32> {
        self.weights(i).iter().copied().reduce(f32::max)
    }

    /// Replace every stored weight with `f(weight)`, dropping results that are zero.
    pub fn map_weights(&self, f: impl Fn(f32) -> f32) -> Self {
        let rows = (0..self.n_rows)
            .map(|i| {
                self.neighbors(i)
                    .iter()
                    .zip(self.weights(i))
                    .map(|(&j, &w)| (j, f(w)))
                    .collect()
            })
            .collect();
        Self::from_rows(self.n_cols, rows)
    }

    /// Transposed graph.
    pub fn transpose(&self) -> Self {
        let mut rows: Vec<Vec<(usize, f32)>> = vec![Vec::new(); self.n_cols];
        for i in 0..self.n_rows {
            for (&j, &w) in self.neighbors(i).iter().zip(self.weights(i)) {
                rows[j].push((i, w));
            }
        }
        Self::from_rows(self.n_rows, rows)
    }

    /// Element-wise minimum with `other`; links missing from either side vanish.
    pub fn minimum(&self, other: &CsrGraph) -> Result<Self> {
        if self.shape() != other.shape() {
            return Err(SpecsepError::invalid(
                "rec",
                format!("shape mismatch {:?} vs {:?}", self.shape(), other.shape()),
            ));
        }
        let rows = (0..self.n_rows)
            .map(|i| {
                self.neighbors(i)
                    .iter()
                    .zip(self.weights(i))
                    .filter_map(|(&j, &w)| {
                        let o = other.get(i, j);
                        (o != 0.0).then_some((j, w.min(o)))
                    })
                    .collect()
            })
            .collect();
        Ok(Self::from_rows(self.n_cols, rows))
    }

    /// Expand to a dense matrix.
    pub fn to_dense(&self) -> Array2<f32> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for i in 0..self.n_rows {
            for (&j, &w) in self.neighbors(i).iter().zip(self.weights(i)) {
                dense[[i, j]] = w;
            }
        }
        dense
    }
}

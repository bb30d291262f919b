//! One-dimensional median filtering along an array axis.
//!
//! Boundaries use symmetric reflection (`d c b a | a b c d | d c b a`),
//! repeated as often as needed when the window is longer than the axis.
//! The window at index `i` covers `i - size/2 ..= i - size/2 + size - 1`
//! and the filter output is the element of rank `size / 2` in the sorted
//! window, so even sizes select the upper of the two middle values.

use ndarray::{Array, ArrayView, ArrayViewMut1, Axis, Dimension, Zip};

use crate::error::{Result, SpecsepError};

/// Map an index from the reflected extension back into `0..n`.
fn reflect_index(idx: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = idx.rem_euclid(period) as usize;
    if m < n { m } else { 2 * n - 1 - m }
}

/// Median-filter a single lane into `dst`.
fn filter_lane(src: &[f32], dst: ArrayViewMut1<f32>, size: usize, window: &mut Vec<f32>) {
    let n = src.len();
    let half = (size / 2) as isize;

    for (i, out) in dst.into_iter().enumerate() {
        window.clear();
        let start = i as isize - half;
        window.extend((0..size as isize).map(|k| src[reflect_index(start + k, n)]));
        let (_, median, _) = window.select_nth_unstable_by(size / 2, f32::total_cmp);
        *out = *median;
    }
}

/// Median-filter `input` along `axis` with a window of `size` samples.
///
/// Every lane along `axis` is filtered independently; the output has the
/// same shape as the input.
pub fn median_filter<D: Dimension>(
    input: ArrayView<f32, D>,
    axis: Axis,
    size: usize,
) -> Result<Array<f32, D>> {
    if size == 0 {
        return Err(SpecsepError::invalid("size", "median window must be at least 1"));
    }
    if axis.index() >= input.ndim() {
        return Err(SpecsepError::invalid(
            "axis",
            format!("axis {} out of range for {}-d input", axis.index(), input.ndim()),
        ));
    }

    let mut output = Array::zeros(input.raw_dim());
    if size == 1 || input.is_empty() {
        output.assign(&input);
        return Ok(output);
    }

    let mut window = Vec::with_capacity(size);
    Zip::from(output.lanes_mut(axis))
        .and(input.lanes(axis))
        .for_each(|dst, src| filter_lane(&src.to_vec(), dst, size, &mut window));

    Ok(output)
}

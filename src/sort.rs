//! Construction of the implicit kd-tree layout.
//!
//! [`kd_sort`] places the median of each range at its middle index using a
//! Floyd-Rivest selection, recursing into the halves on alternating axes.
//! The permutation itself then encodes a balanced tree; no nodes are
//! materialized.

/// Range width above which selection narrows the search window by sampling
/// before partitioning.
const SAMPLING_THRESHOLD: usize = 600;

/// Recursively kd-sort `ids` and `coords` over the inclusive range
/// `[left, right]`, starting on `axis` (0 = longitude, 1 = latitude).
///
/// Ranges of fewer than `node_size` elements are left unsorted; they become
/// leaves during search.
pub(crate) fn kd_sort(
    ids: &mut [usize],
    coords: &mut [f64],
    node_size: usize,
    left: usize,
    right: usize,
    axis: usize,
) {
    if right - left < node_size {
        return;
    }
    let m = (left + right) >> 1;

    // partition both arrays around the middle index so that the halves lie
    // either west/east or south/north of it (taking turns per level)
    select(ids, coords, m, left, right, axis);

    if m > left {
        kd_sort(ids, coords, node_size, left, m - 1, 1 - axis);
    }
    kd_sort(ids, coords, node_size, m + 1, right, 1 - axis);
}

/// Floyd-Rivest selection: rearrange `ids` and `coords` in lockstep so that
/// the element at `k` is the one a full sort of `[left, right]` by the
/// `axis` coordinate would put there, with everything in `[left, k)` no
/// larger and everything in `(k, right]` no smaller.
pub(crate) fn select(
    ids: &mut [usize],
    coords: &mut [f64],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > SAMPLING_THRESHOLD {
            // narrow to a sampled window around the expected position of the
            // k-th element before partitioning the window exactly
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = n.ln();
            let s = 0.5 * (2.0 * z / 3.0).exp();
            let sign = if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * (z * s * (n - s) / n).sqrt() * sign;
            let kf = k as f64;
            let new_left = (kf - m * s / n + sd).floor().max(left as f64) as usize;
            let new_right = (kf + (n - m) * s / n + sd).floor().min(right as f64) as usize;
            select(ids, coords, k, new_left, new_right, axis);
        }

        let t = coords[2 * k + axis];
        let mut i = left;
        let mut j = right;

        swap_item(ids, coords, left, k);
        if coords[2 * right + axis] > t {
            swap_item(ids, coords, left, right);
        }

        while i < j {
            swap_item(ids, coords, i, j);
            i += 1;
            j -= 1;
            while coords[2 * i + axis] < t {
                i += 1;
            }
            while coords[2 * j + axis] > t {
                j -= 1;
            }
        }

        if coords[2 * left + axis] == t {
            swap_item(ids, coords, left, j);
        } else {
            j += 1;
            swap_item(ids, coords, j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            if j == 0 {
                break;
            }
            right = j - 1;
        }
    }
}

fn swap_item(ids: &mut [usize], coords: &mut [f64], i: usize, j: usize) {
    ids.swap(i, j);
    coords.swap(2 * i, 2 * j);
    coords.swap(2 * i + 1, 2 * j + 1);
}

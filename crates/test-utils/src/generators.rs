//! Synthetic sample generators.
//!
//! These generators create predictable, verifiable sample fields as
//! `(lat, long, value)` tuples laid out on a regular lattice, so tests can
//! reason about exactly which samples fall in which cell.

/// Lattice of sample positions over `(lat_min, lat_max, long_min, long_max)`.
///
/// One sample sits at the centre of each of the `rows x cols` lattice
/// cells, so no sample lies on a lattice edge. Rows are returned south to
/// north, each row west to east.
///
/// # Example
///
/// ```
/// use test_utils::sample_lattice;
///
/// let points = sample_lattice((0.0, 2.0, 0.0, 2.0), 2, 2);
/// assert_eq!(points, vec![(0.5, 0.5), (0.5, 1.5), (1.5, 0.5), (1.5, 1.5)]);
/// ```
pub fn sample_lattice(
    region: (f64, f64, f64, f64),
    rows: usize,
    cols: usize,
) -> Vec<(f64, f64)> {
    let (lat_min, lat_max, long_min, long_max) = region;
    let dlat = (lat_max - lat_min) / rows.max(1) as f64;
    let dlong = (long_max - long_min) / cols.max(1) as f64;

    let mut points = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            points.push((
                lat_min + (row as f64 + 0.5) * dlat,
                long_min + (col as f64 + 0.5) * dlong,
            ));
        }
    }
    points
}

/// Constant field.
pub fn create_constant_field(
    region: (f64, f64, f64, f64),
    n: usize,
    value: f64,
) -> Vec<(f64, f64, f64)> {
    sample_lattice(region, n, n)
        .into_iter()
        .map(|(lat, long)| (lat, long, value))
        .collect()
}

/// Field equal to 1.0 west of `split_long` and 0.0 east of it.
///
/// A cell straddling `split_long` is heterogeneous; cells on either side
/// are homogeneous.
pub fn create_step_field(
    region: (f64, f64, f64, f64),
    n: usize,
    split_long: f64,
) -> Vec<(f64, f64, f64)> {
    sample_lattice(region, n, n)
        .into_iter()
        .map(|(lat, long)| (lat, long, if long < split_long { 1.0 } else { 0.0 }))
        .collect()
}

/// Deterministic pseudo-random field in [0, 1).
///
/// Uses a simple linear congruential generator so results are stable
/// across platforms without pulling in a random number crate.
pub fn create_noise_field(
    region: (f64, f64, f64, f64),
    n: usize,
    seed: u32,
) -> Vec<(f64, f64, f64)> {
    let mut state = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
    sample_lattice(region, n, n)
        .into_iter()
        .map(|(lat, long)| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let value = ((state >> 8) % 10_000) as f64 / 10_000.0;
            (lat, long, value)
        })
        .collect()
}

/// Field with NaN at every `nan_every`-th sample and 1.0 elsewhere.
pub fn create_field_with_nans(
    region: (f64, f64, f64, f64),
    n: usize,
    nan_every: usize,
) -> Vec<(f64, f64, f64)> {
    sample_lattice(region, n, n)
        .into_iter()
        .enumerate()
        .map(|(i, (lat, long))| {
            let value = if nan_every > 0 && i % nan_every == 0 {
                f64::NAN
            } else {
                1.0
            };
            (lat, long, value)
        })
        .collect()
}

//! Column width resolution for tables.

use folio_style::Dimension;
use folio_types::EPSILON;

/// Resolves column widths from the table's `column-widths` and measured natural widths.
pub struct TableSolver<'a> {
    columns: &'a [Dimension],
    min_width: f32,
}

impl<'a> TableSolver<'a> {
    pub fn new(columns: &'a [Dimension], min_width: f32) -> Self {
        Self { columns, min_width }
    }

    /// Widths summing to exactly `available`, one per entry of `naturals`.
    ///
    /// Explicit `pt`/`%` columns target their declared width; all others target their
    /// natural width and absorb any slack first.
    pub fn resolve_widths(&self, available: f32, naturals: &[f32]) -> Vec<f32> {
        let mut targets = Vec::with_capacity(naturals.len());
        let mut auto = Vec::with_capacity(naturals.len());
        for (i, natural) in naturals.iter().enumerate() {
            match self.columns.get(i).and_then(|d| d.resolve(available)) {
                Some(width) => {
                    targets.push(width.max(0.0));
                    auto.push(false);
                }
                None => {
                    targets.push(*natural);
                    auto.push(true);
                }
            }
        }
        distribute(&targets, &auto, available, self.min_width)
    }
}

/// Fits `targets` into `available`.
///
/// Every column starts at `max(target, min)`. Slack is handed to the `auto` columns in
/// proportion to their width (to every column when none is auto). Overflow is taken from the
/// width above `min`, auto columns first. Only when `available` cannot hold `min` per column
/// are the columns made uniformly narrower. The last column takes the rounding remainder.
pub fn distribute(targets: &[f32], auto: &[bool], available: f32, min: f32) -> Vec<f32> {
    let n = targets.len();
    if n == 0 {
        return Vec::new();
    }
    let available = available.max(0.0);
    if available <= n as f32 * min + EPSILON {
        return vec![available / n as f32; n];
    }

    let mut widths: Vec<f32> = targets.iter().map(|t| t.max(min)).collect();
    let auto_columns: Vec<usize> = (0..n).filter(|&i| auto.get(i).copied().unwrap_or(true)).collect();
    let fixed_columns: Vec<usize> = (0..n).filter(|i| !auto_columns.contains(i)).collect();
    let sum: f32 = widths.iter().sum();

    if sum < available {
        let growing = if auto_columns.is_empty() {
            (0..n).collect()
        } else {
            auto_columns
        };
        grow(&mut widths, &growing, available - sum);
    } else if sum > available {
        let mut overflow = sum - available;
        for set in [auto_columns, fixed_columns] {
            if overflow <= 0.0 {
                break;
            }
            overflow = shrink(&mut widths, &set, overflow, min);
        }
    }

    let others: f32 = widths[..n - 1].iter().sum();
    widths[n - 1] = available - others;
    widths
}

fn grow(widths: &mut [f32], columns: &[usize], extra: f32) {
    let total: f32 = columns.iter().map(|&i| widths[i]).sum();
    for &i in columns {
        let share = if total > 0.0 {
            widths[i] / total
        } else {
            1.0 / columns.len() as f32
        };
        widths[i] += extra * share;
    }
}

/// Removes up to `overflow` from the width above `min`, returning what is left over.
fn shrink(widths: &mut [f32], columns: &[usize], overflow: f32, min: f32) -> f32 {
    let slack: f32 = columns.iter().map(|&i| widths[i] - min).sum();
    if slack <= 0.0 {
        return overflow;
    }
    if slack <= overflow {
        for &i in columns {
            widths[i] = min;
        }
        return overflow - slack;
    }
    for &i in columns {
        widths[i] -= overflow * (widths[i] - min) / slack;
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to(widths: &[f32], total: f32) {
        let sum: f32 = widths.iter().sum();
        assert!((sum - total).abs() < 1e-3, "{:?} sums to {}", widths, sum);
    }

    #[test]
    fn shrinks_only_the_excess_above_the_minimum() {
        let widths = distribute(&[80.0, 200.0, 40.0], &[true; 3], 250.0, 50.0);
        assert_sums_to(&widths, 250.0);
        assert!(widths.iter().all(|w| *w >= 50.0 - 1e-3), "{:?}", widths);
        assert!((widths[2] - 50.0).abs() < 1e-3);
        assert!(widths[1] > widths[0]);
    }

    #[test]
    fn grows_proportionally() {
        let widths = distribute(&[50.0, 100.0], &[true, true], 300.0, 10.0);
        assert_sums_to(&widths, 300.0);
        assert!((widths[0] - 100.0).abs() < 1e-3);
        assert!((widths[1] - 200.0).abs() < 1e-3);
    }

    #[test]
    fn explicit_columns_keep_their_width_when_they_fit() {
        let solver_columns = [Dimension::Pt(100.0), Dimension::Auto, Dimension::Percent(10.0)];
        let solver = TableSolver::new(&solver_columns, 20.0);
        let widths = solver.resolve_widths(400.0, &[30.0, 500.0, 5.0]);
        assert_sums_to(&widths, 400.0);
        assert!((widths[0] - 100.0).abs() < 1e-3);
        assert!((widths[2] - 40.0).abs() < 1e-3);
        assert!((widths[1] - 260.0).abs() < 1e-3);
    }

    #[test]
    fn too_narrow_for_the_minimum_is_uniform() {
        let widths = distribute(&[10.0, 300.0, 10.0], &[true; 3], 90.0, 50.0);
        assert_eq!(widths, vec![30.0, 30.0, 30.0]);
    }

    #[test]
    fn fixed_columns_shrink_after_auto_columns() {
        let widths = distribute(&[200.0, 100.0], &[false, true], 200.0, 40.0);
        assert_sums_to(&widths, 200.0);
        assert!((widths[1] - 40.0).abs() < 1e-3);
        assert!((widths[0] - 160.0).abs() < 1e-3);
    }
}

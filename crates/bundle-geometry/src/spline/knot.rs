//! Knot vector utilities for B-spline evaluation and interpolation.

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`. Parameters
/// beyond either end of the domain map to the first or last non-empty span,
/// so evaluating that span's polynomial continues the spline outside.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    // Binary search
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns `degree + 1` values N_{span-degree,degree}(t) through
/// N_{span,degree}(t).
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Knot vector for interpolating `x.len()` strictly increasing abscissae
/// with a spline of `degree`.
///
/// Both ends are clamped with `degree + 1` copies of the boundary abscissa.
/// Interior knots sit on the data points for odd degrees (not-a-knot) and
/// halfway between data points for even degrees. The result has
/// `x.len() + degree + 1` entries; `x.len()` must exceed `degree`.
pub fn interpolation_knots(x: &[f64], degree: usize) -> Vec<f64> {
    let m = x.len();
    debug_assert!(m > degree, "need more points than the degree");

    let interior = m - degree - 1;
    let mut knots = Vec::with_capacity(m + degree + 1);
    knots.extend(std::iter::repeat(x[0]).take(degree + 1));

    if degree % 2 == 1 {
        let offset = (degree + 1) / 2;
        knots.extend_from_slice(&x[offset..offset + interior]);
    } else {
        let offset = degree / 2;
        knots.extend((offset..offset + interior).map(|j| 0.5 * (x[j] + x[j + 1])));
    }

    knots.extend(std::iter::repeat(x[m - 1]).take(degree + 1));
    knots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_uniform() {
        // Degree 2, 5 control points, uniform knot vector
        let knots = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let n = 4;
        let degree = 2;

        assert_eq!(find_span(degree, &knots, n, 0.0), 2);
        assert_eq!(find_span(degree, &knots, n, 0.5), 2);
        assert_eq!(find_span(degree, &knots, n, 1.0), 3);
        assert_eq!(find_span(degree, &knots, n, 2.5), 4);
        assert_eq!(find_span(degree, &knots, n, 3.0), 4);
        // outside the domain
        assert_eq!(find_span(degree, &knots, n, -4.0), 2);
        assert_eq!(find_span(degree, &knots, n, 9.0), 4);
    }

    #[test]
    fn test_basis_functions_partition_of_unity() {
        let knots = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let degree = 2;
        let n = 4;

        for &t in &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0] {
            let span = find_span(degree, &knots, n, t);
            let basis = basis_functions(degree, &knots, span, t);
            let sum: f64 = basis.iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "Partition of unity failed at t={}: sum={}",
                t,
                sum
            );
        }
    }

    #[test]
    fn test_interpolation_knots_cubic() {
        let x = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0];
        let knots = interpolation_knots(&x, 3);
        assert_eq!(knots.len(), x.len() + 4);
        assert_eq!(
            knots,
            vec![0.0, 0.0, 0.0, 0.0, 20.0, 30.0, 50.0, 50.0, 50.0, 50.0]
        );
    }

    #[test]
    fn test_interpolation_knots_quadratic() {
        let x = [0.0, 10.0, 20.0, 40.0];
        let knots = interpolation_knots(&x, 2);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 15.0, 40.0, 40.0, 40.0]);
    }

    #[test]
    fn test_interpolation_knots_linear() {
        let x = [0.0, 5.0, 7.0];
        let knots = interpolation_knots(&x, 1);
        assert_eq!(knots, vec![0.0, 0.0, 5.0, 7.0, 7.0]);
    }
}

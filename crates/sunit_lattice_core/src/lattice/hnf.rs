//! Hermite normal form of integer row lattices
//!
//! Ideals are stored as Z-modules in Hermite normal form so that two
//! generating sets of the same module compare equal structurally.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

/// Row-style Hermite normal form of the Z-span of `rows`
///
/// The result is upper echelon: each row's leading entry (pivot) is
/// positive, lies strictly right of the previous row's pivot, and every
/// entry above a pivot lies in `[0, pivot)`. Zero rows are dropped, so the
/// number of returned rows is the rank of the input.
pub fn hermite_normal_form(rows: &[Vec<BigInt>], width: usize) -> Vec<Vec<BigInt>> {
    let mut a: Vec<Vec<BigInt>> = rows.to_vec();
    let mut r = 0usize;

    for col in 0..width {
        if r == a.len() {
            break;
        }

        // Euclid on the column: repeatedly divide by the smallest entry
        loop {
            let pivot = (r..a.len())
                .filter(|&i| !a[i][col].is_zero())
                .min_by_key(|&i| a[i][col].abs());
            let Some(pivot) = pivot else { break };
            a.swap(r, pivot);

            let mut cleared = true;
            for i in r + 1..a.len() {
                if a[i][col].is_zero() {
                    continue;
                }
                let q = a[i][col].div_floor(&a[r][col]);
                subtract_multiple(&mut a, i, r, &q);
                if !a[i][col].is_zero() {
                    cleared = false;
                }
            }
            if cleared {
                break;
            }
        }

        if a[r][col].is_zero() {
            continue;
        }
        if a[r][col].is_negative() {
            for x in a[r].iter_mut() {
                *x = -&*x;
            }
        }
        for i in 0..r {
            let q = a[i][col].div_floor(&a[r][col]);
            if !q.is_zero() {
                subtract_multiple(&mut a, i, r, &q);
            }
        }
        r += 1;
    }

    a.truncate(r);
    a
}

/// a[target] -= q * a[source]
fn subtract_multiple(a: &mut [Vec<BigInt>], target: usize, source: usize, q: &BigInt) {
    let src = a[source].clone();
    for (x, s) in a[target].iter_mut().zip(src.iter()) {
        *x -= q * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[i64]]) -> Vec<Vec<BigInt>> {
        data.iter()
            .map(|r| r.iter().map(|&x| BigInt::from(x)).collect())
            .collect()
    }

    #[test]
    fn test_hnf_of_generators() {
        // 2Z + (1 + i)Z + 2iZ in coordinates (1, i)
        let h = hermite_normal_form(&rows(&[&[2, 0], &[1, 1], &[0, 2]]), 2);
        assert_eq!(h, rows(&[&[1, 1], &[0, 2]]));
    }

    #[test]
    fn test_hnf_is_canonical() {
        let a = hermite_normal_form(&rows(&[&[4, 6], &[2, 9]]), 2);
        let b = hermite_normal_form(&rows(&[&[2, 9], &[6, 15]]), 2);
        assert_eq!(a, b);
        assert_eq!(a, rows(&[&[2, 9], &[0, 12]]));
    }

    #[test]
    fn test_hnf_drops_dependent_rows() {
        let h = hermite_normal_form(&rows(&[&[1, 2, 3], &[2, 4, 6], &[0, 0, 5]]), 3);
        assert_eq!(h, rows(&[&[1, 2, 3], &[0, 0, 5]]));
    }

    #[test]
    fn test_hnf_negative_pivot() {
        let h = hermite_normal_form(&rows(&[&[-3, 1]]), 2);
        assert_eq!(h, rows(&[&[3, -1]]));
    }
}

//! Center-weighted distribution of leftover space

/// Bucket indices ordered from the center outwards.
///
/// Odd counts start at the median and alternate low, high. Even counts
/// start at the lower of the two middle buckets, then the upper, and keep
/// alternating outwards.
fn center_out(buckets: usize) -> impl Iterator<Item = usize> {
    let mid = buckets / 2;
    let even = buckets % 2 == 0;
    (0..buckets).map(move |step| {
        let ring = (step + 1) / 2;
        if even {
            // mid-1, mid, mid-2, mid+1, ...
            if step % 2 == 0 {
                mid - 1 - step / 2
            } else {
                mid + step / 2
            }
        } else if step == 0 {
            mid
        } else if step % 2 == 1 {
            mid - ring
        } else {
            mid + ring
        }
    })
}

/// Distribute `extra` units over `buckets` buckets, favouring the middle.
///
/// Every bucket receives `extra / buckets`; the remainder goes one unit at
/// a time to buckets in center-out order, so an uneven split concentrates in
/// the middle. For an even bucket count ties favour the lower index.
///
/// ```rust
/// use trellis_layout::distribute_middle;
///
/// assert_eq!(distribute_middle(5, 2), vec![0, 1, 1, 0, 0]);
/// assert_eq!(distribute_middle(4, 3), vec![1, 1, 1, 0]);
/// assert_eq!(distribute_middle(3, 7), vec![2, 3, 2]);
/// ```
pub fn distribute_middle(buckets: usize, extra: u32) -> Vec<u32> {
    if buckets == 0 {
        return Vec::new();
    }

    let count = buckets as u32;
    let mut result = vec![extra / count; buckets];
    for index in center_out(buckets).take((extra % count) as usize) {
        result[index] += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_distributions() {
        assert_eq!(distribute_middle(5, 2), vec![0, 1, 1, 0, 0]);
        assert_eq!(distribute_middle(4, 3), vec![1, 1, 1, 0]);
        assert_eq!(distribute_middle(5, 4), vec![1, 1, 1, 1, 0]);
        assert_eq!(distribute_middle(4, 1), vec![0, 1, 0, 0]);
        assert_eq!(distribute_middle(1, 9), vec![9]);
        assert_eq!(distribute_middle(2, 1), vec![1, 0]);
    }

    #[test]
    fn test_zero_extra() {
        assert_eq!(distribute_middle(3, 0), vec![0, 0, 0]);
    }

    #[test]
    fn test_no_buckets() {
        assert!(distribute_middle(0, 5).is_empty());
    }

    #[test]
    fn test_center_out_visits_every_bucket_once() {
        for buckets in 1..12 {
            let mut seen: Vec<usize> = center_out(buckets).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..buckets).collect::<Vec<_>>());
        }
    }

    /// Distance of a bucket from the center, doubled to stay integral
    fn distance_from_center(index: usize, buckets: usize) -> usize {
        (2 * index + 1).abs_diff(buckets)
    }

    proptest! {
        #[test]
        fn length_and_sum_hold(buckets in 1usize..64, extra in 0u32..10_000) {
            let result = distribute_middle(buckets, extra);
            prop_assert_eq!(result.len(), buckets);
            prop_assert_eq!(result.iter().sum::<u32>(), extra);
        }

        #[test]
        fn never_spreads_more_than_one(buckets in 1usize..64, extra in 0u32..10_000) {
            let result = distribute_middle(buckets, extra);
            let max = result.iter().max().copied().unwrap_or(0);
            let min = result.iter().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn outer_buckets_never_exceed_inner(buckets in 1usize..64, extra in 0u32..200) {
            let result = distribute_middle(buckets, extra);
            for a in 0..buckets {
                for b in 0..buckets {
                    if distance_from_center(a, buckets) > distance_from_center(b, buckets) {
                        prop_assert!(result[a] <= result[b]);
                    }
                }
            }
        }
    }
}

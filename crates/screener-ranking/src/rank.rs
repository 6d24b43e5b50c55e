//! 경쟁 순위 (competition ranking).
//!
//! 같은 값은 같은 순위를 공유하고, 다음 값의 순위는 공유된 개수만큼 건너뜁니다.
//!
//! | 값 (오름차순) | `Min` | `Max` |
//! |---------------|-------|-------|
//! | 5             | 1     | 2     |
//! | 5             | 1     | 2     |
//! | 7             | 3     | 3     |

use rust_decimal::Decimal;

/// 정렬 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// 작은 값이 1위
    Ascending,
    /// 큰 값이 1위
    Descending,
}

/// 동순위 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieMethod {
    /// 동순위 그룹의 가장 앞 순위
    Min,
    /// 동순위 그룹의 가장 뒤 순위
    Max,
}

/// 입력 순서 그대로 각 값의 순위(1부터)를 반환합니다.
///
/// ```
/// use rust_decimal_macros::dec;
/// use screener_ranking::{competition_rank, SortOrder, TieMethod};
///
/// let ranks = competition_rank(&[dec!(5), dec!(5), dec!(7)], SortOrder::Ascending, TieMethod::Min);
/// assert_eq!(ranks, vec![1, 1, 3]);
/// ```
pub fn competition_rank(values: &[Decimal], order: SortOrder, ties: TieMethod) -> Vec<u32> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| {
        let cmp = values[a].cmp(&values[b]);
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });

    let mut ranks = vec![0u32; values.len()];
    let mut start = 0;
    while start < indices.len() {
        let mut end = start + 1;
        while end < indices.len() && values[indices[end]] == values[indices[start]] {
            end += 1;
        }

        let rank = match ties {
            TieMethod::Min => start + 1,
            TieMethod::Max => end,
        } as u32;
        for &index in &indices[start..end] {
            ranks[index] = rank;
        }

        start = end;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ascending_min_ties() {
        let ranks = competition_rank(&[dec!(5), dec!(5), dec!(7)], SortOrder::Ascending, TieMethod::Min);
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn test_descending_min_ties() {
        let values = [dec!(0.30), dec!(0.45), dec!(0.30), dec!(0.25)];
        let ranks = competition_rank(&values, SortOrder::Descending, TieMethod::Min);
        assert_eq!(ranks, vec![2, 1, 2, 4]);
    }

    #[test]
    fn test_max_ties() {
        let values = [dec!(10), dec!(10), dec!(5)];
        assert_eq!(
            competition_rank(&values, SortOrder::Descending, TieMethod::Max),
            vec![2, 2, 3]
        );
        assert_eq!(
            competition_rank(&values, SortOrder::Ascending, TieMethod::Max),
            vec![3, 3, 1]
        );
    }

    #[test]
    fn test_scale_does_not_split_ties() {
        // 1.0과 1.00은 같은 값
        let ranks = competition_rank(&[dec!(1.0), dec!(1.00), dec!(2)], SortOrder::Ascending, TieMethod::Min);
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(competition_rank(&[], SortOrder::Ascending, TieMethod::Min).is_empty());
    }
}

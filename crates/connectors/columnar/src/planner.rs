//! Split planning: partition the format library's split list into ordered
//! groups, one per parallel worker.

use floe_common::{Error, Result};
use tracing::debug;

use crate::format::{SplitGroup, TableSplit};

/// Assigns splits to at most `desired_groups` groups by contiguous blocks, in
/// original order.
///
/// Concatenating the returned groups reproduces the input exactly: no split
/// is lost, duplicated or reordered. An empty input yields zero groups; a
/// trailing block that would come up empty is not emitted.
pub fn plan_groups(splits: Vec<TableSplit>, desired_groups: usize) -> Result<Vec<SplitGroup>> {
    if desired_groups == 0 {
        return Err(Error::config("desired group count must be at least 1"));
    }
    if splits.is_empty() {
        return Ok(Vec::new());
    }

    let actual = desired_groups.min(splits.len());
    let group_size = splits.len().div_ceil(actual);
    debug!(
        splits = splits.len(),
        desired_groups, group_size, "planning split groups"
    );

    let mut groups = Vec::with_capacity(actual);
    let mut remaining = splits.into_iter();
    for index in 0..actual {
        let block: Vec<TableSplit> = remaining.by_ref().take(group_size).collect();
        if block.is_empty() {
            break;
        }
        groups.push(SplitGroup {
            index,
            splits: block,
        });
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splits(n: usize) -> Vec<TableSplit> {
        (0..n)
            .map(|i| TableSplit::new(i, format!("mem://part-{i}")))
            .collect()
    }

    fn flatten(groups: &[SplitGroup]) -> Vec<usize> {
        groups
            .iter()
            .flat_map(|g| g.splits.iter().map(|s| s.ordinal))
            .collect()
    }

    #[test]
    fn groups_reconstruct_the_input() {
        for len in 0..17 {
            for desired in 1..9 {
                let groups = plan_groups(splits(len), desired).unwrap();
                assert_eq!(
                    flatten(&groups),
                    (0..len).collect::<Vec<_>>(),
                    "len={len} desired={desired}"
                );
                assert!(groups.len() <= desired);
                for (i, g) in groups.iter().enumerate() {
                    assert_eq!(g.index, i);
                    assert!(!g.splits.is_empty(), "len={len} desired={desired}");
                }
            }
        }
    }

    #[test]
    fn empty_input_yields_zero_groups() {
        for desired in [1, 4, 100] {
            assert!(plan_groups(Vec::new(), desired).unwrap().is_empty());
        }
    }

    #[test]
    fn fewer_splits_than_groups_yields_singletons() {
        let groups = plan_groups(splits(3), 8).unwrap();
        assert_eq!(groups.len(), 3);
        for g in &groups {
            assert_eq!(g.splits.len(), 1);
        }
    }

    #[test]
    fn contiguous_blocks_in_order() {
        let groups = plan_groups(splits(5), 2).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(flatten(&groups[..1]), vec![0, 1, 2]);
        assert_eq!(flatten(&groups[1..]), vec![3, 4]);
    }

    #[test]
    fn zero_desired_groups_is_rejected() {
        assert!(plan_groups(splits(3), 0).is_err());
    }
}

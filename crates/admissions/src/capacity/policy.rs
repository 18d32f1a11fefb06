use std::collections::BTreeMap;

use crate::catalog::ProgramId;

/// Limit applied to certification types missing from the table.
pub const DEFAULT_PROGRAM_LIMIT: u32 = 30;

/// Maps a program's certification type to its default seat limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLimitPolicy {
    limits: BTreeMap<String, u32>,
    fallback: u32,
}

impl CapacityLimitPolicy {
    /// certificate=100, diploma=75, degree=50, anything else 30.
    pub fn standard() -> Self {
        let limits = [("certificate", 100), ("diploma", 75), ("degree", 50)]
            .into_iter()
            .map(|(kind, limit)| (kind.to_string(), limit))
            .collect();

        Self {
            limits,
            fallback: DEFAULT_PROGRAM_LIMIT,
        }
    }

    /// Case-insensitive and whitespace-insensitive lookup.
    pub fn limit_for(&self, certification_type: &str) -> u32 {
        self.limits
            .get(&certification_type.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for CapacityLimitPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits `total` across programs in proportion to `weights` using the
/// largest-remainder method. Leftover seats go to the largest remainders,
/// lower program ids first on ties. The shares always sum to `total`.
pub fn apportion(total: u32, weights: &[(ProgramId, u32)]) -> Vec<(ProgramId, u32)> {
    if weights.is_empty() {
        return Vec::new();
    }

    // Zero weights would make a program unreachable by any total.
    let weight_sum: u64 = weights.iter().map(|(_, w)| u64::from((*w).max(1))).sum();
    let total = u64::from(total);

    let mut shares: Vec<(ProgramId, u64, u64)> = weights
        .iter()
        .map(|(id, weight)| {
            let exact = total * u64::from((*weight).max(1));
            (*id, exact / weight_sum, exact % weight_sum)
        })
        .collect();

    let assigned: u64 = shares.iter().map(|(_, share, _)| share).sum();
    let mut leftover = total - assigned;

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        shares[b]
            .2
            .cmp(&shares[a].2)
            .then_with(|| shares[a].0.cmp(&shares[b].0))
    });

    for index in order {
        if leftover == 0 {
            break;
        }
        shares[index].1 += 1;
        leftover -= 1;
    }

    shares
        .into_iter()
        .map(|(id, share, _)| (id, u32::try_from(share).unwrap_or(u32::MAX)))
        .collect()
}

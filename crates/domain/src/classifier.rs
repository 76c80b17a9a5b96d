//! Pool type classification from raw pool metadata.
//!
//! Label and numeric code are alternatives; either may be populated. Rules
//! are evaluated top to bottom and the first hit wins, so a pool reporting
//! both `STABLE` and `V3` signals is stable.

use crate::entities::PoolMeta;
use crate::enums::PoolType;

/// Hook type code of concentrated-liquidity pools.
pub const HOOK_TYPE_V3: i64 = 3;
/// Hook type code of stable pools.
pub const HOOK_TYPE_STABLE: i64 = 4;

/// A single decision-table row.
#[derive(Debug, Clone, Copy)]
struct Rule {
    label: &'static str,
    code: i64,
    pool_type: PoolType,
}

const RULES: [Rule; 2] = [
    Rule {
        label: "STABLE",
        code: HOOK_TYPE_STABLE,
        pool_type: PoolType::Stable,
    },
    Rule {
        label: "V3",
        code: HOOK_TYPE_V3,
        pool_type: PoolType::Clmm,
    },
];

/// Classifies a pool. Missing or unrecognized metadata yields [`PoolType::Amm`].
#[must_use]
pub fn classify(meta: Option<&PoolMeta>) -> PoolType {
    let Some(meta) = meta else {
        return PoolType::Amm;
    };

    RULES
        .iter()
        .find(|rule| {
            meta.hook_type_label.as_deref() == Some(rule.label) || meta.hook_type == Some(rule.code)
        })
        .map_or(PoolType::Amm, |rule| rule.pool_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(code: Option<i64>, label: Option<&str>) -> PoolMeta {
        PoolMeta {
            hook_type: code,
            hook_type_label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_by_label() {
        assert_eq!(classify(Some(&meta(None, Some("STABLE")))), PoolType::Stable);
        assert_eq!(classify(Some(&meta(None, Some("V3")))), PoolType::Clmm);
        assert_eq!(classify(Some(&meta(None, Some("V2")))), PoolType::Amm);
    }

    #[test]
    fn test_classify_by_code() {
        assert_eq!(classify(Some(&meta(Some(4), None))), PoolType::Stable);
        assert_eq!(classify(Some(&meta(Some(3), None))), PoolType::Clmm);
        assert_eq!(classify(Some(&meta(Some(1), None))), PoolType::Amm);
    }

    #[test]
    fn test_stable_takes_priority_over_clmm() {
        assert_eq!(classify(Some(&meta(Some(4), Some("V3")))), PoolType::Stable);
        assert_eq!(classify(Some(&meta(Some(3), Some("STABLE")))), PoolType::Stable);
    }

    #[test]
    fn test_missing_metadata_defaults_to_amm() {
        assert_eq!(classify(None), PoolType::Amm);
        assert_eq!(classify(Some(&PoolMeta::default())), PoolType::Amm);
    }

    #[test]
    fn test_label_match_is_exact() {
        assert_eq!(classify(Some(&meta(None, Some("stable")))), PoolType::Amm);
    }
}

//! Kind-priority ordering of the factor sources a session needs

use factor_core::{FactorSource, FactorSourceKind};
use indexmap::IndexMap;

/// Factor sources grouped by kind, in signing order.
///
/// Kinds appear in priority order; within a kind, least recently used
/// factor sources come first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactorSourcesOfKinds {
    groups: IndexMap<FactorSourceKind, Vec<FactorSource>>,
}

impl FactorSourcesOfKinds {
    /// Sort `factor_sources` by signing priority and group them by kind.
    ///
    /// The sort is stable, so sources that tie on kind and last-used time
    /// keep the order they were given in.
    pub fn new(mut factor_sources: Vec<FactorSource>) -> Self {
        factor_sources.sort_by(FactorSource::signing_priority);

        let mut groups: IndexMap<FactorSourceKind, Vec<FactorSource>> = IndexMap::new();
        for factor_source in factor_sources {
            groups
                .entry(factor_source.kind())
                .or_default()
                .push(factor_source);
        }
        Self { groups }
    }

    /// Kinds present, in signing order
    pub fn kinds(&self) -> impl Iterator<Item = FactorSourceKind> + '_ {
        self.groups.keys().copied()
    }

    /// Factor sources of `kind`, in signing order
    pub fn of_kind(&self, kind: FactorSourceKind) -> &[FactorSource] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every kind with its factor sources
    pub fn groups(&self) -> impl Iterator<Item = (FactorSourceKind, &[FactorSource])> {
        self.groups
            .iter()
            .map(|(kind, sources)| (*kind, sources.as_slice()))
    }

    /// All factor sources, flattened in signing order
    pub fn iter(&self) -> impl Iterator<Item = &FactorSource> {
        self.groups.values().flatten()
    }

    /// Number of factor sources
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Whether no factor source is needed
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use factor_core::FactorSourceId;

    fn source(kind: FactorSourceKind, byte: u8, secs: i64) -> FactorSource {
        FactorSource::new(
            FactorSourceId::new(kind, [byte; 32]),
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
    }

    #[test]
    fn test_groups_follow_kind_priority() {
        let grouped = FactorSourcesOfKinds::new(vec![
            source(FactorSourceKind::Device, 1, 10),
            source(FactorSourceKind::SecurityQuestions, 2, 10),
            source(FactorSourceKind::Ledger, 3, 10),
            source(FactorSourceKind::Device, 4, 5),
        ]);

        let kinds: Vec<_> = grouped.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                FactorSourceKind::Ledger,
                FactorSourceKind::SecurityQuestions,
                FactorSourceKind::Device
            ]
        );
        assert_eq!(grouped.len(), 4);
        assert!(grouped.of_kind(FactorSourceKind::Arculus).is_empty());

        let sizes: Vec<_> = grouped
            .groups()
            .map(|(kind, sources)| (kind, sources.len()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                (FactorSourceKind::Ledger, 1),
                (FactorSourceKind::SecurityQuestions, 1),
                (FactorSourceKind::Device, 2),
            ]
        );
        let (_, devices) = grouped.groups().last().unwrap();
        assert_eq!(devices[0].id(), FactorSourceId::new(FactorSourceKind::Device, [4; 32]));
    }

    #[test]
    fn test_least_recently_used_first_within_kind() {
        let recent = source(FactorSourceKind::Device, 1, 100);
        let stale = source(FactorSourceKind::Device, 2, 1);
        let grouped = FactorSourcesOfKinds::new(vec![recent.clone(), stale.clone()]);
        assert_eq!(grouped.of_kind(FactorSourceKind::Device), &[stale, recent]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = source(FactorSourceKind::Yubikey, 9, 50);
        let second = source(FactorSourceKind::Yubikey, 1, 50);
        let grouped = FactorSourcesOfKinds::new(vec![first.clone(), second.clone()]);
        let flattened: Vec<_> = grouped.iter().cloned().collect();
        assert_eq!(flattened, vec![first, second]);
    }
}

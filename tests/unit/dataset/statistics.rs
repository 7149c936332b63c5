//! Tests for ranked counters and source id assignment

#[cfg(test)]
mod tests {
    use pixelset::dataset::statistics::{CountEntry, DatasetStatistics, RankedCounter, SourceIds};

    fn entry(name: &str, count: usize) -> CountEntry {
        CountEntry {
            name: name.to_string(),
            count,
        }
    }

    // Tests ranking by count with ties in first-seen order
    #[test]
    fn test_ranked_orders_by_count_then_first_seen() {
        let mut counter = RankedCounter::new();
        for key in ["water", "grass", "stone", "grass", "stone", "lava"] {
            counter.increment(key);
        }

        assert_eq!(
            counter.ranked(),
            vec![
                entry("grass", 2),
                entry("stone", 2),
                entry("water", 1),
                entry("lava", 1)
            ]
        );
        assert_eq!(counter.count("grass"), 2);
        assert_eq!(counter.count("sand"), 0);
        assert_eq!(counter.len(), 4);
    }

    // Tests that recording updates both distributions
    #[test]
    fn test_statistics_record() {
        let mut statistics = DatasetStatistics::default();
        assert!(statistics.labels.is_empty());

        statistics.record("grass", "https://a.org/x");
        statistics.record("undefined", "https://a.org/x");

        assert_eq!(statistics.labels.len(), 2);
        assert_eq!(statistics.sources.ranked(), vec![entry("https://a.org/x", 2)]);
    }

    // Tests one-based ids in order of first use
    #[test]
    fn test_source_ids_are_stable() {
        let mut ids = SourceIds::new();
        assert!(ids.is_empty());

        assert_eq!(ids.assign("https://b.org"), 1);
        assert_eq!(ids.assign("https://a.org"), 2);
        assert_eq!(ids.assign("https://b.org"), 1);

        assert_eq!(ids.len(), 2);
        assert_eq!(ids.url(2), Some("https://a.org"));
        assert_eq!(ids.url(0), None);
        assert_eq!(ids.url(3), None);

        let map = ids.to_map();
        assert_eq!(map.get(&1).map(String::as_str), Some("https://b.org"));
        assert_eq!(map.len(), 2);
    }
}

//! Tests for the label preset

#[cfg(test)]
mod tests {
    use pixelset::annotation::labels::{Label, LabelPreset};
    use std::fs;

    fn preset() -> LabelPreset {
        LabelPreset::new(vec![
            Label::new("water", [0, 0, 255]),
            Label::new("grass", [0, 255, 0]),
            Label::new("gravel", [128, 128, 128]),
        ])
    }

    // Tests that presets are kept sorted by name
    #[test]
    fn test_new_sorts_by_name() {
        assert_eq!(preset().names(), vec!["grass", "gravel", "water"]);
    }

    // Tests replacement of same-named labels and the returned sorted index
    #[test]
    fn test_add_replaces_and_returns_index() {
        let mut labels = preset();

        assert_eq!(labels.add(Label::new("ground", [1, 2, 3])), 2);
        assert_eq!(labels.labels().len(), 4);

        assert_eq!(labels.add(Label::new("water", [9, 9, 9])), 3);
        assert_eq!(labels.labels().len(), 4);
        assert_eq!(labels.get("water").map(|l| l.color), Some([9, 9, 9]));
        assert!(labels.get("lava").is_none());
    }

    // Tests ranking by shared prefix length, then by name
    #[test]
    fn test_autocomplete_ranks_by_shared_prefix() {
        let labels = preset();

        assert_eq!(labels.autocomplete("gra"), vec!["grass", "gravel"]);
        assert_eq!(labels.autocomplete("grav"), vec!["gravel", "grass"]);
        assert_eq!(labels.autocomplete("w"), vec!["water"]);
        assert!(labels.autocomplete("x").is_empty());
        assert!(labels.autocomplete("").is_empty());
    }

    // Tests save and load through the JSON file
    #[test]
    fn test_save_and_load_round_trip() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temporary directory should be available");
        };
        let path = dir.path().join("data").join("labels.json");

        let mut labels = preset();
        assert!(labels.save(&path).is_ok());

        let loaded = LabelPreset::load(&path);
        assert_eq!(loaded, labels);

        let text = fs::read_to_string(&path).unwrap_or_default();
        assert!(text.find("grass") < text.find("water"));
    }

    // Tests missing and malformed presets load as empty
    #[test]
    fn test_load_missing_or_malformed_is_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temporary directory should be available");
        };
        let missing = dir.path().join("labels.json");
        assert!(LabelPreset::load(&missing).labels().is_empty());

        assert!(fs::write(&missing, "{ not json").is_ok());
        assert!(LabelPreset::load(&missing).labels().is_empty());
        assert!(LabelPreset::read(&missing).is_err());
    }
}

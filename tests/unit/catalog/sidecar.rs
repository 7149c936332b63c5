//! Tests for per-source sidecar persistence

#[cfg(test)]
mod tests {
    use crate::support::{CACHE_ROOT, source_with, square_tiling};
    use pixelset::catalog::Catalog;
    use pixelset::catalog::sidecar::{SourceSidecar, load_sidecars, save_sidecar, sidecar_path};
    use pixelset::spatial::LatticePos;
    use std::fs;

    const URL: &str = "https://example.org/art/tiles";

    fn catalog() -> Catalog {
        Catalog::from_sources(
            CACHE_ROOT,
            vec![source_with(
                URL,
                vec![("a.png", vec![square_tiling(16)]), ("b.png", vec![square_tiling(16)])],
            )],
        )
    }

    // Tests that edited tilings and matte colors survive save and load
    #[test]
    fn test_save_then_load_restores_annotations() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temporary directory should be available");
        };
        let sources_dir = dir.path().join("sources");

        let mut edited = catalog();
        if let Some(image) = edited
            .sources_mut()
            .first_mut()
            .and_then(|s| s.images.get_mut(1))
        {
            image.matte = vec![[255, 0, 255]];
            let mut tiling = square_tiling(8);
            tiling.annotations.assign_label(LatticePos::new(1, 0), "grass", false);
            image.tilings.push(tiling);
        }

        let saved = edited
            .sources()
            .first()
            .map(|source| save_sidecar(&sources_dir, source));
        assert!(matches!(saved, Some(Ok(ref path)) if path.ends_with("tiles.json")));

        let mut restored = catalog();
        load_sidecars(&mut restored, &sources_dir);
        assert_eq!(restored, edited);
    }

    // Tests that images without matte colors omit the alpha field
    #[test]
    fn test_from_source_omits_empty_alpha() {
        let source = source_with(URL, vec![("a.png", vec![square_tiling(16)])]);
        let sidecar = SourceSidecar::from_source(&source);

        assert_eq!(sidecar.url, URL);
        assert_eq!(sidecar.images.len(), 1);

        let Ok(json) = serde_json::to_value(&sidecar) else {
            unreachable!("sidecar should serialize");
        };
        let image = json.get("images").and_then(|images| images.get(0));
        assert_eq!(
            image.and_then(|i| i.get("filename")),
            Some(&serde_json::json!("a.png"))
        );
        assert!(image.is_some_and(|i| i.get("alpha").is_none()));
    }

    // Tests malformed and unrelated sidecars leave defaults in place
    #[test]
    fn test_malformed_sidecar_keeps_defaults() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temporary directory should be available");
        };
        let sources_dir = dir.path().to_path_buf();
        let mut loaded = catalog();

        let path = loaded
            .sources()
            .first()
            .map(|source| sidecar_path(&sources_dir, source));
        let Some(path) = path else {
            unreachable!("catalog has a source");
        };
        assert!(fs::write(&path, "[1, 2").is_ok());

        load_sidecars(&mut loaded, &sources_dir);
        assert_eq!(loaded, catalog());
        assert!(SourceSidecar::read(&path).is_err());

        let unknown_image = r#"{"url": "x", "images": [{"filename": "zzz.png", "tilings": []}]}"#;
        assert!(fs::write(&path, unknown_image).is_ok());
        load_sidecars(&mut loaded, &sources_dir);
        assert_eq!(loaded, catalog());
    }
}

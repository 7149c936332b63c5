//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use pixelset::DatasetError;
    use pixelset::io::error::{file_system, invalid_parameter};
    use std::error::Error;

    // Tests error source chaining works correctly
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = file_system("/tmp/test.png", "read", io_error);

        assert!(error.source().is_some());
        assert!(invalid_parameter("patch_size_x", &0, &"must be at least 1").source().is_none());
    }

    // Tests invalid parameter formatting
    #[test]
    fn test_invalid_parameter_message() {
        let error = invalid_parameter("offset_x", &-3, &"must not be negative");
        let message = error.to_string();

        assert!(message.contains("offset_x"));
        assert!(message.contains("-3"));
        assert!(message.contains("must not be negative"));
    }

    // Tests file system errors name the operation and path
    #[test]
    fn test_file_system_message() {
        let io_error = std::io::Error::other("disk full");
        let message = file_system("/out/tiles.csv", "write", io_error).to_string();

        assert!(message.contains("write"));
        assert!(message.contains("/out/tiles.csv"));
        assert!(message.contains("disk full"));
    }

    // Tests malformed JSON errors keep the parser error
    #[test]
    fn test_serialization_error() {
        let Err(source) = serde_json::from_str::<Vec<u32>>("[1,") else {
            unreachable!("truncated JSON should not parse");
        };
        let error = DatasetError::Serialization {
            path: "data/labels.json".into(),
            source,
        };

        assert!(error.to_string().contains("data/labels.json"));
        assert!(error.source().is_some());
        assert!(!error.is_recoverable());
    }

    // Tests only decode failures are recoverable
    #[test]
    fn test_only_image_load_is_recoverable() {
        let load = DatasetError::ImageLoad {
            path: "a.png".into(),
            source: image::ImageError::IoError(std::io::Error::other("truncated")),
        };
        assert!(load.is_recoverable());
        assert!(load.to_string().contains("a.png"));

        assert!(!invalid_parameter("patch_size", &0, &"must be at least 1").is_recoverable());
    }
}

/// Helper utils regarding XML import/export
pub mod xml_utils;

/// Helpers shared by tests
#[cfg(test)]
pub mod test_utils {
    use std::path::PathBuf;

    /// Directory holding the test fixtures of this crate
    pub fn get_test_data_path() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }
}

use thiserror::Error;

/// Why a guest source could not be loaded.
///
/// Every variant is terminal for the refresh that produced it; retrying is
/// left to the caller.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("No guest snapshots found in {0}")]
    NoSnapshot(String),

    #[error("Source is not a guest table: {0}")]
    Unparsable(String),
}

impl LoadError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path)
        } else {
            LoadError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = LoadError::io(
            "guests.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, LoadError::NotFound(ref p) if p == "guests.csv"));
        assert_eq!(err.to_string(), "Source not found: guests.csv");
    }

    #[test]
    fn test_io_other_kind_keeps_source() {
        let err = LoadError::io(
            "guests.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to read guests.csv: denied");
    }
}

use cluster_types::{Error, IndexName};

/// Runs the character-class checks from §4.2 and wraps the failure as a coordinator-facing
/// [`Error`]. The existence and alias-collision checks that bracket this call in §4.6 step 1
/// are the coordinator's responsibility, since they require reading cluster state that this
/// pure predicate has no access to.
pub fn validate_name(candidate: &str) -> Result<IndexName, Error> {
    IndexName::parse(candidate).map_err(|reason| Error::InvalidIndexName {
        index_uid: candidate.to_owned(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        assert!(validate_name("logs-2024").is_ok());
    }

    #[test]
    fn rejects_uppercase_with_the_right_error() {
        let err = validate_name("LOGS").unwrap_err();
        assert!(matches!(err, Error::InvalidIndexName { .. }));
        assert_eq!(err.to_string(), "LOGS is not a valid index uid: must be lowercase");
    }
}

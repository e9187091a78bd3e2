use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanKind {
    /// A full bucket credited to the picker.
    Pick,
    /// A supervisor voiding a previously scanned bucket.
    Void,
    Unknown(String),
}

impl ScanKind {
    pub fn as_str(&self) -> &str {
        match self {
            ScanKind::Pick => "pick",
            ScanKind::Void => "void",
            ScanKind::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for ScanKind {
    fn from(value: &str) -> Self {
        match value {
            "pick" => ScanKind::Pick,
            "void" => ScanKind::Void,
            other => ScanKind::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_kinds() {
        assert_eq!(ScanKind::from(ScanKind::Pick.as_str()), ScanKind::Pick);
        assert_eq!(ScanKind::from(ScanKind::Void.as_str()), ScanKind::Void);
    }

    #[test]
    fn preserves_unknown_kinds() {
        let kind = ScanKind::from("recount");
        assert_eq!(kind, ScanKind::Unknown("recount".to_string()));
        assert_eq!(kind.as_str(), "recount");
    }
}

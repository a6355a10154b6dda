use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Stable key of a catalogue entry, e.g. `PENDING` or `SENT_TO_LAW_FIRM`.
///
/// The engine treats ids as opaque strings; whether an id is valid is decided
/// by the catalogue it is resolved against, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StatusId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StatusId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StatusId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for StatusId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StatusId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One entry of the status catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: StatusId,

    /// Presentation hint (a hex color in the default catalogue), opaque to the engine
    pub color_token: String,

    /// Human readable description shown next to the status
    pub description: String,
}

impl StatusDefinition {
    pub fn new(id: impl Into<String>, color_token: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: StatusId::new(id),
            color_token: color_token.into(),
            description: description.into(),
        }
    }
}

/// High-level metric groups over statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    /// Statuses representing active work
    Pipeline,
    /// Statuses representing successful outcomes
    Conversion,
    /// Statuses representing loss or anomaly
    Risk,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Pipeline, Bucket::Conversion, Bucket::Risk];
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Pipeline => write!(f, "PIPELINE"),
            Bucket::Conversion => write!(f, "CONVERSION"),
            Bucket::Risk => write!(f, "RISK"),
        }
    }
}

impl FromStr for Bucket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PIPELINE" => Ok(Bucket::Pipeline),
            "CONVERSION" => Ok(Bucket::Conversion),
            "RISK" => Ok(Bucket::Risk),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_display_and_parse_agree() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.to_string().parse::<Bucket>(), Ok(bucket));
        }
        assert!("pipeline".parse::<Bucket>().is_err());
    }

    #[test]
    fn test_bucket_serializes_uppercase() {
        let json = serde_json::to_string(&Bucket::Conversion).unwrap();
        assert_eq!(json, "\"CONVERSION\"");
    }

    #[test]
    fn test_status_id_is_transparent_in_json() {
        let id = StatusId::new("CALL_BACK");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CALL_BACK\"");
        assert_eq!(id, "CALL_BACK");
    }
}

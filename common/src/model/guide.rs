use serde::{Deserialize, Serialize};
use std::fmt;

/// The artifact handed out to users who pass verification.
///
/// Reference and kind travel together: a guide is either not configured at all,
/// a Telegram file identifier, or a link. There is no way to hold one half of
/// the pair without the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Guide {
    /// Nothing configured yet (or the stored record could not be read).
    #[default]
    Unset,
    /// A document already uploaded to Telegram, re-sent by its `file_id`.
    File { file_id: String },
    /// An `http://` or `https://` link sent to the user as text.
    Url { link: String },
}

impl Guide {
    pub fn is_set(&self) -> bool {
        !matches!(self, Guide::Unset)
    }
}

/// Discriminator persisted next to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    #[serde(rename = "file_id")]
    FileId,
    #[serde(rename = "url")]
    Url,
}

/// On-disk shape of the guide configuration file.
///
/// `{"guide_reference": string|null, "reference_type": "file_id"|"url"|null}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideConfigFile {
    #[serde(default)]
    pub guide_reference: Option<String>,
    #[serde(default)]
    pub reference_type: Option<ReferenceType>,
}

/// Raised when a stored record carries only one half of the reference pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InconsistentGuideRecord {
    pub has_reference: bool,
    pub has_type: bool,
}

impl fmt::Display for InconsistentGuideRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guide record is half set (reference present: {}, type present: {})",
            self.has_reference, self.has_type
        )
    }
}

impl std::error::Error for InconsistentGuideRecord {}

impl From<&Guide> for GuideConfigFile {
    fn from(guide: &Guide) -> Self {
        match guide {
            Guide::Unset => GuideConfigFile {
                guide_reference: None,
                reference_type: None,
            },
            Guide::File { file_id } => GuideConfigFile {
                guide_reference: Some(file_id.clone()),
                reference_type: Some(ReferenceType::FileId),
            },
            Guide::Url { link } => GuideConfigFile {
                guide_reference: Some(link.clone()),
                reference_type: Some(ReferenceType::Url),
            },
        }
    }
}

impl TryFrom<GuideConfigFile> for Guide {
    type Error = InconsistentGuideRecord;

    /// A blank reference means no guide, whatever the stored type says.
    fn try_from(record: GuideConfigFile) -> Result<Self, Self::Error> {
        if record
            .guide_reference
            .as_deref()
            .is_some_and(|r| r.trim().is_empty())
        {
            return Ok(Guide::Unset);
        }
        match (record.guide_reference, record.reference_type) {
            (None, None) => Ok(Guide::Unset),
            (Some(file_id), Some(ReferenceType::FileId)) => Ok(Guide::File { file_id }),
            (Some(link), Some(ReferenceType::Url)) => Ok(Guide::Url { link }),
            (reference, kind) => Err(InconsistentGuideRecord {
                has_reference: reference.is_some(),
                has_type: kind.is_some(),
            }),
        }
    }
}

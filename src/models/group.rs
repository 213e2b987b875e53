use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    #[serde(rename = "Group_Title")]
    pub group_title: String,
    #[serde(rename = "SourceName")]
    pub source_name: Option<String>,
    #[serde(rename = "ActivityName")]
    pub activity_name: Option<String>,
    #[serde(rename = "NFRCode")]
    pub nfr_code: Option<String>,
    pub updated_at: Option<String>,
}

/// Write shape for insert and update. Blank optionals are `None` and
/// serialize as JSON `null`, never as an empty string.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupPayload {
    #[serde(rename = "Group_Title")]
    pub group_title: String,
    #[serde(rename = "SourceName")]
    pub source_name: Option<String>,
    #[serde(rename = "ActivityName")]
    pub activity_name: Option<String>,
    #[serde(rename = "NFRCode")]
    pub nfr_code: Option<String>,
    pub updated_at: String,
}

impl GroupPayload {
    pub fn into_group(self, id: i64) -> Group {
        Group {
            id,
            group_title: self.group_title,
            source_name: self.source_name,
            activity_name: self.activity_name,
            nfr_code: self.nfr_code,
            updated_at: Some(self.updated_at),
        }
    }
}

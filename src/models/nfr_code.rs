use serde::{Deserialize, Serialize};

// Read-only lookup. Groups reference `nfr_code` by value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NfrCode {
    pub id: i64,
    #[serde(rename = "NFRCode")]
    pub nfr_code: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

impl NfrCode {
    pub fn label(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => {
                format!("{} - {}", self.nfr_code, description)
            }
            _ => self.nfr_code.clone(),
        }
    }
}

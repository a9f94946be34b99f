use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Twilio,
    AwsSns,
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Twilio => "twilio",
            ProviderKind::AwsSns => "aws-sns",
            ProviderKind::Custom => "custom",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "twilio" => Some(ProviderKind::Twilio),
            "aws-sns" => Some(ProviderKind::AwsSns),
            "custom" => Some(ProviderKind::Custom),
            _ => None,
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The models the chat offers.
///
/// The set is fixed: the model selector only ever presents these identifiers,
/// and anything else is rejected when parsed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// DeepSeek R1 Zero on the free tier.
    #[default]
    #[serde(rename = "deepseek/deepseek-r1-zero:free")]
    DeepSeekR1ZeroFree,

    /// Google PaLM 2 chat.
    #[serde(rename = "google/palm-2-chat-bison")]
    Palm2ChatBison,
}

impl KnownModel {
    /// Every selectable model, in selector order.
    pub const ALL: [KnownModel; 2] = [KnownModel::DeepSeekR1ZeroFree, KnownModel::Palm2ChatBison];

    /// The identifier sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::DeepSeekR1ZeroFree => "deepseek/deepseek-r1-zero:free",
            KnownModel::Palm2ChatBison => "google/palm-2-chat-bison",
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        KnownModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| {
                Error::validation(
                    format!(
                        "unknown model {s:?}; choose one of: {}",
                        KnownModel::ALL.map(|m| m.as_str()).join(", ")
                    ),
                    Some("model".to_string()),
                )
            })
    }
}

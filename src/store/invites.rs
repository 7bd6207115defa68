/*!
 * Invite Codes
 * Short team invitation codes, parsed case-insensitively
 */

use crate::core::errors::InviteError;
use crate::core::limits::{INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH};
use crate::core::types::{TeamId, UserId};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// Eight characters from an alphabet without `0 O 1 I`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    pub fn parse(raw: &str) -> Result<Self, InviteError> {
        let code = raw.trim().to_ascii_uppercase();
        let len = code.chars().count();
        if len != INVITE_CODE_LENGTH {
            return Err(InviteError::InvalidLength {
                expected: INVITE_CODE_LENGTH,
                actual: len,
            });
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !c.is_ascii() || !INVITE_CODE_ALPHABET.contains(&(*c as u8)))
        {
            return Err(InviteError::InvalidCharacter(bad));
        }
        Ok(Self(code))
    }

    /// Random code drawn from a v4 uuid
    pub fn generate() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let code = bytes
            .iter()
            .take(INVITE_CODE_LENGTH)
            .map(|b| INVITE_CODE_ALPHABET[*b as usize % INVITE_CODE_ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InviteCode {
    type Err = InviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InviteCode {
    type Error = InviteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}

/// A pending invitation to join a team
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub code: InviteCode,
    pub team_id: TeamId,
    pub created_by: UserId,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub created_at: SystemTime,
}

impl Invite {
    pub fn new(team_id: impl Into<TeamId>, created_by: impl Into<UserId>) -> Self {
        Self {
            code: InviteCode::generate(),
            team_id: team_id.into(),
            created_by: created_by.into(),
            created_at: SystemTime::now(),
        }
    }
}

//! Permission levels and their wire codes.
//!
//! Passbolt encodes ACL levels as integers. Requests carry them as the
//! literal strings `"-1"`, `"1"`, `"7"` and `"15"`; nothing else is accepted.

use crate::passbolt::error::{Result, ShareError};
use crate::passbolt::types::{permission_types, AroKind};
use std::fmt;
use std::str::FromStr;

/// Semantic permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    /// No access / delete marker (-1).
    NoAccess,
    /// Read (1).
    Read,
    /// Update (7).
    Update,
    /// Owner (15).
    Owner,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 4] = [
        PermissionLevel::NoAccess,
        PermissionLevel::Read,
        PermissionLevel::Update,
        PermissionLevel::Owner,
    ];

    /// Decode a requested level code. The string must match exactly.
    pub fn decode(code: &str) -> Result<Self> {
        match code {
            "-1" => Ok(Self::NoAccess),
            "1" => Ok(Self::Read),
            "7" => Ok(Self::Update),
            "15" => Ok(Self::Owner),
            other => Err(ShareError::InvalidLevel {
                code: other.to_string(),
            }),
        }
    }

    /// Wire code for this level.
    pub fn encode(self) -> i32 {
        match self {
            Self::NoAccess => permission_types::NO_ACCESS,
            Self::Read => permission_types::READ,
            Self::Update => permission_types::UPDATE,
            Self::Owner => permission_types::OWNER,
        }
    }

    /// Validate a wire code read back from the server.
    pub fn from_code(code: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.encode() == code)
            .ok_or_else(|| ShareError::InvalidLevel {
                code: code.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NoAccess => "no-access",
            Self::Read => "read",
            Self::Update => "update",
            Self::Owner => "owner",
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for AroKind {
    type Err = ShareError;

    /// Subject kinds as written in manifests and on the command line.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("user") {
            Ok(AroKind::User)
        } else if s.eq_ignore_ascii_case("group") {
            Ok(AroKind::Group)
        } else {
            Err(ShareError::InvalidSubjectKind(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passbolt::error::ErrorClass;

    #[test]
    fn test_round_trip_all_levels() {
        for level in PermissionLevel::ALL {
            let code = level.encode().to_string();
            assert_eq!(PermissionLevel::decode(&code).unwrap(), level);
            assert_eq!(PermissionLevel::from_code(level.encode()).unwrap(), level);
            assert_eq!(level.to_string(), code);
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(PermissionLevel::decode("-1").unwrap(), PermissionLevel::NoAccess);
        assert_eq!(PermissionLevel::decode("1").unwrap(), PermissionLevel::Read);
        assert_eq!(PermissionLevel::decode("7").unwrap(), PermissionLevel::Update);
        assert_eq!(PermissionLevel::decode("15").unwrap(), PermissionLevel::Owner);
    }

    #[test]
    fn test_rejects_everything_else() {
        for bad in ["", "0", "2", "3", "07", " 7", "7 ", "+1", "read", "15.0", "-0"] {
            let err = PermissionLevel::decode(bad).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Validation, "input {:?}", bad);
            match err {
                ShareError::InvalidLevel { code } => assert_eq!(code, bad),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_from_code_rejects_unknown_wire_value() {
        assert!(PermissionLevel::from_code(3).is_err());
        assert!(PermissionLevel::from_code(0).is_err());
    }

    #[test]
    fn test_parse_via_from_str() {
        let level: PermissionLevel = "15".parse().unwrap();
        assert_eq!(level, PermissionLevel::Owner);
        assert_eq!(level.name(), "owner");
    }

    #[test]
    fn test_aro_kind_from_str() {
        assert_eq!("Group".parse::<AroKind>().unwrap(), AroKind::Group);
        assert_eq!("user".parse::<AroKind>().unwrap(), AroKind::User);
        let err = "Role".parse::<AroKind>().unwrap_err();
        assert_eq!(err.class(), ErrorClass::Validation);
    }
}

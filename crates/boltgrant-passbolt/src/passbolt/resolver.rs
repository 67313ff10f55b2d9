//! Name → identifier resolution over freshly fetched collections.
//!
//! Names are not unique on a Passbolt server. Resolution scans in the order
//! the server returned the collection and takes the **first** exact match;
//! duplicates are logged, never rejected.

use crate::passbolt::error::{Result, ShareError};
use crate::passbolt::types::{AroKind, Folder, Group, User};
use log::warn;

/// An entity addressable by a human-readable key.
pub trait Named {
    /// Label used in log lines.
    const KIND: &'static str;

    /// The lookup key, if the server returned one.
    fn lookup_key(&self) -> Option<&str>;

    /// The server-assigned identifier.
    fn identifier(&self) -> &str;
}

impl Named for Folder {
    const KIND: &'static str = "folder";

    fn lookup_key(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

impl Named for Group {
    const KIND: &'static str = "group";

    fn lookup_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

impl Named for User {
    const KIND: &'static str = "user";

    fn lookup_key(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

/// First element whose key equals `name` exactly.
pub fn first_match<'a, T, I>(items: I, name: &str) -> Option<&'a T>
where
    T: Named + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if name.is_empty() {
        return None;
    }
    let mut matches = items
        .into_iter()
        .filter(|item| item.lookup_key() == Some(name));
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            "{} {} entries named {:?}; using the first ({})",
            extra + 1,
            T::KIND,
            name,
            first.identifier()
        );
    }
    Some(first)
}

/// Folders eligible for name-based sharing.
pub fn shareable_folders(folders: &[Folder]) -> impl Iterator<Item = &Folder> {
    folders.iter().filter(|f| !f.is_personal())
}

/// Resolve a folder name to the first non-personal folder carrying it.
pub fn resolve_folder<'a>(folders: &'a [Folder], name: &str) -> Result<&'a Folder> {
    first_match(shareable_folders(folders), name).ok_or_else(|| ShareError::FolderNotFound {
        name: name.to_string(),
    })
}

/// Resolve a group name to its identifier.
pub fn resolve_group<'a>(groups: &'a [Group], name: &str) -> Result<&'a str> {
    first_match(groups, name)
        .map(Named::identifier)
        .ok_or_else(|| ShareError::SubjectNotFound {
            kind: AroKind::Group,
            name: name.to_string(),
        })
}

/// Resolve a username to its identifier.
pub fn resolve_user<'a>(users: &'a [User], username: &str) -> Result<&'a str> {
    first_match(users, username)
        .map(Named::identifier)
        .ok_or_else(|| ShareError::SubjectNotFound {
            kind: AroKind::User,
            name: username.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passbolt::error::ErrorClass;

    fn folder(id: &str, name: &str, personal: Option<bool>) -> Folder {
        Folder {
            id: id.into(),
            name: Some(name.into()),
            created: None,
            modified: None,
            folder_parent_id: None,
            personal,
            permissions: None,
        }
    }

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: id.into(),
            name: name.into(),
            deleted: false,
        }
    }

    fn user(id: &str, username: Option<&str>) -> User {
        User {
            id: id.into(),
            username: username.map(String::from),
            role_id: None,
            active: true,
            deleted: false,
        }
    }

    #[test]
    fn test_resolve_folder_skips_personal() {
        let folders = vec![
            folder("F0", "Finance", Some(true)),
            folder("F1", "Finance", Some(false)),
        ];
        assert_eq!(resolve_folder(&folders, "Finance").unwrap().id, "F1");
    }

    #[test]
    fn test_resolve_folder_missing_flag_is_shared() {
        let folders = vec![folder("F1", "Finance", None)];
        assert_eq!(resolve_folder(&folders, "Finance").unwrap().id, "F1");
    }

    #[test]
    fn test_resolve_folder_only_personal_is_not_found() {
        let folders = vec![folder("F0", "Finance", Some(true))];
        let err = resolve_folder(&folders, "Finance").unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert!(matches!(err, ShareError::FolderNotFound { ref name } if name == "Finance"));
    }

    #[test]
    fn test_resolve_folder_requires_exact_name() {
        let folders = vec![
            folder("F1", "Finance Archive", Some(false)),
            folder("F2", "finance", Some(false)),
        ];
        assert!(resolve_folder(&folders, "Finance").is_err());
    }

    #[test]
    fn test_duplicates_resolve_to_first_in_fetch_order() {
        let groups = vec![group("G2", "Ops"), group("G1", "Ops")];
        assert_eq!(resolve_group(&groups, "Ops").unwrap(), "G2");

        let folders = vec![
            folder("F9", "Finance", Some(false)),
            folder("F1", "Finance", Some(false)),
        ];
        assert_eq!(resolve_folder(&folders, "Finance").unwrap().id, "F9");
    }

    #[test]
    fn test_resolve_user_by_username() {
        let users = vec![
            user("U0", None),
            user("U1", Some("ada@example.com")),
            user("U2", Some("bob@example.com")),
        ];
        assert_eq!(resolve_user(&users, "bob@example.com").unwrap(), "U2");
        let err = resolve_user(&users, "ada").unwrap_err();
        assert!(matches!(
            err,
            ShareError::SubjectNotFound {
                kind: AroKind::User,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_name_never_matches() {
        let users = vec![user("U0", Some(""))];
        assert!(resolve_user(&users, "").is_err());
        let groups: Vec<Group> = Vec::new();
        assert!(resolve_group(&groups, "Ops").is_err());
    }
}

//! What the current viewer may do with a table.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A cell that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    /// Contact email.
    Email,
    /// Company name.
    Company,
    /// Member role.
    Role,
    /// Row status, gated by `can_change_status`.
    Status,
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditableField::Email => "email",
            EditableField::Company => "company",
            EditableField::Role => "role",
            EditableField::Status => "status",
        };
        f.write_str(name)
    }
}

/// Per-viewer permissions.
///
/// The default is a read-only viewer: every flag is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerCapabilities {
    /// May edit the email cell.
    pub can_edit_email: bool,
    /// May edit the company cell.
    pub can_edit_company: bool,
    /// May change a member's role.
    pub can_edit_role: bool,
    /// May change a row's status.
    pub can_change_status: bool,
    /// May export rows to a workbook.
    pub can_export: bool,
    /// May show and hide columns.
    pub can_manage_columns: bool,
}

impl ViewerCapabilities {
    /// A read-only viewer.
    pub fn read_only() -> Self {
        Self::default()
    }

    /// A viewer allowed to do everything.
    pub fn admin() -> Self {
        Self {
            can_edit_email: true,
            can_edit_company: true,
            can_edit_role: true,
            can_change_status: true,
            can_export: true,
            can_manage_columns: true,
        }
    }

    /// Returns `true` if the viewer may edit `field`.
    pub fn can_edit(&self, field: EditableField) -> bool {
        match field {
            EditableField::Email => self.can_edit_email,
            EditableField::Company => self.can_edit_company,
            EditableField::Role => self.can_edit_role,
            EditableField::Status => self.can_change_status,
        }
    }

    /// Returns `true` if any edit permission is granted.
    pub fn can_edit_any(&self) -> bool {
        self.can_edit_email || self.can_edit_company || self.can_edit_role || self.can_change_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_read_only() {
        let caps = ViewerCapabilities::default();
        assert_eq!(caps, ViewerCapabilities::read_only());
        assert!(!caps.can_edit_any());
        assert!(!caps.can_export);
    }

    #[test]
    fn test_partial_json() {
        let caps: ViewerCapabilities = serde_json::from_str(r#"{"can_export": true}"#).unwrap();
        assert!(caps.can_export);
        assert!(!caps.can_manage_columns);
        assert!(ViewerCapabilities::admin().can_edit_any());
    }

    #[test]
    fn test_can_edit_follows_flags() {
        let caps: ViewerCapabilities =
            serde_json::from_str(r#"{"can_change_status": true}"#).unwrap();
        assert!(caps.can_edit(EditableField::Status));
        assert!(!caps.can_edit(EditableField::Email));
        assert!(!caps.can_edit(EditableField::Company));
        assert!(!caps.can_edit(EditableField::Role));
        assert_eq!(EditableField::Status.to_string(), "status");
    }
}

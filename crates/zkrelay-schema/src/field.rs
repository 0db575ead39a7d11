/// JSON shape of a databag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain string.
    Text,
    /// A list of strings.
    TextList,
    /// A string holding a comma-separated endpoint list.
    EndpointList,
}

/// Whether a field must be present and whether `null` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Present and non-null.
    Required,
    /// Present, `null` allowed.
    RequiredNullable,
    /// May be absent or `null`.
    Optional,
}

impl Presence {
    pub fn is_required(self) -> bool {
        !matches!(self, Presence::Optional)
    }

    pub fn is_nullable(self) -> bool {
        !matches!(self, Presence::Required)
    }
}

/// Declaration of one databag field.
///
/// The JSON Schema document for each side is generated from these, so they
/// are the single description of what an `app` section may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key used on the wire (hyphenated).
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub title: &'static str,
    pub description: &'static str,
    /// Example value as JSON text.
    pub example: &'static str,
}

/// Field whose wire name matches `key` once underscores become hyphens.
///
/// Used to hint at the intended key when a databag spells one with its
/// internal name (`secret_user` for `secret-user`).
pub(crate) fn hyphenated_match<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    if !key.contains('_') {
        return None;
    }
    let hyphenated = key.replace('_', "-");
    fields.iter().find(|spec| spec.wire_name == hyphenated)
}

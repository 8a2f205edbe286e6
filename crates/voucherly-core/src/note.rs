// ── Packed voucher notes ──
//
// The controller gives each voucher a single free-text slot. We pack the
// operator's note together with provenance tags into it:
//
//     text||;;||source||;;||auth_type||;;||auth_domain
//
// Notes written by older releases carry plain text without any separator;
// those decode as text only.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::CoreError;

pub const NOTE_SEPARATOR: &str = "||;;||";

/// Channel a voucher was created through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteSource {
    Web,
    Kiosk,
    Api,
    Quickprint,
}

/// How the creating user authenticated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthType {
    Local,
    Oidc,
}

/// Decoded voucher note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherNote {
    text: Option<String>,
    source: Option<NoteSource>,
    auth_type: Option<AuthType>,
    auth_domain: Option<String>,
}

impl VoucherNote {
    /// Build a note for a new voucher.
    ///
    /// Fails if `text` contains the separator, which would corrupt the
    /// packed form. The domain is stored lowercased.
    pub fn new(
        text: Option<&str>,
        source: Option<NoteSource>,
        auth_type: Option<AuthType>,
        auth_domain: Option<&str>,
    ) -> Result<Self, CoreError> {
        if text.is_some_and(|t| t.contains(NOTE_SEPARATOR)) {
            return Err(CoreError::validation(format!(
                "note must not contain the sequence {NOTE_SEPARATOR:?}"
            )));
        }
        if auth_domain.is_some_and(|d| d.contains('|')) {
            return Err(CoreError::validation("auth domain must not contain '|'"));
        }

        Ok(Self {
            text: non_empty(text),
            source,
            auth_type,
            auth_domain: non_empty(auth_domain).map(|d| d.to_lowercase()),
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn source(&self) -> Option<NoteSource> {
        self.source
    }

    pub fn auth_type(&self) -> Option<AuthType> {
        self.auth_type
    }

    pub fn auth_domain(&self) -> Option<&str> {
        self.auth_domain.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The packed wire form.
    pub fn encode(&self) -> String {
        [
            self.text.as_deref().unwrap_or_default(),
            self.source.as_ref().map_or("", AsRef::as_ref),
            self.auth_type.as_ref().map_or("", AsRef::as_ref),
            self.auth_domain.as_deref().unwrap_or_default(),
        ]
        .join(NOTE_SEPARATOR)
    }
}

/// Pack a note in one step.
pub fn encode(
    text: Option<&str>,
    source: Option<NoteSource>,
    auth_type: Option<AuthType>,
    auth_domain: Option<&str>,
) -> Result<String, CoreError> {
    VoucherNote::new(text, source, auth_type, auth_domain).map(|n| n.encode())
}

/// Unpack a note. Never fails: anything that is not the packed form is
/// treated as plain text, and unknown tags decode as absent.
pub fn decode(raw: Option<&str>) -> VoucherNote {
    let Some(raw) = raw else {
        return VoucherNote::default();
    };

    if let Some((text, source, auth_type, auth_domain)) = split_packed(raw) {
        return VoucherNote {
            text: non_empty(Some(text)),
            source: source.parse().ok(),
            auth_type: auth_type.parse().ok(),
            auth_domain: non_empty(Some(auth_domain)),
        };
    }

    VoucherNote {
        text: non_empty(Some(raw)),
        ..VoucherNote::default()
    }
}

/// Split at the first three separators. The three tag fields never
/// contain `|`; if one does, the string is not a packed note.
fn split_packed(raw: &str) -> Option<(&str, &str, &str, &str)> {
    let (text, rest) = raw.split_once(NOTE_SEPARATOR)?;
    let (source, rest) = rest.split_once(NOTE_SEPARATOR)?;
    let (auth_type, auth_domain) = rest.split_once(NOTE_SEPARATOR)?;

    if [source, auth_type, auth_domain].iter().any(|f| f.contains('|')) {
        return None;
    }
    Some((text, source, auth_type, auth_domain))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn packed_note_round_trips() {
        let cases = [
            (Some("Room 12"), Some(NoteSource::Web), Some(AuthType::Oidc), Some("example.com")),
            (None, Some(NoteSource::Quickprint), Some(AuthType::Local), None),
            (Some("a|b"), None, None, None),
            (Some("café ☕"), Some(NoteSource::Kiosk), None, None),
        ];

        for (text, source, auth_type, domain) in cases {
            let packed = encode(text, source, auth_type, domain).unwrap();
            let note = decode(Some(&packed));
            assert_eq!(note.text(), text);
            assert_eq!(note.source(), source);
            assert_eq!(note.auth_type(), auth_type);
            assert_eq!(note.auth_domain(), domain);
        }
    }

    #[test]
    fn wire_form_matches_existing_notes() {
        let packed = encode(Some("Lobby"), Some(NoteSource::Api), Some(AuthType::Local), None)
            .unwrap();
        assert_eq!(packed, "Lobby||;;||api||;;||local||;;||");
    }

    #[test]
    fn plain_legacy_note_is_text_only() {
        let note = decode(Some("Conference guest"));
        assert_eq!(note.text(), Some("Conference guest"));
        assert_eq!(note.source(), None);
        assert_eq!(note.auth_type(), None);
        assert_eq!(note.auth_domain(), None);
    }

    #[test]
    fn absent_and_empty_notes_decode_empty() {
        assert!(decode(None).is_empty());
        assert!(decode(Some("")).is_empty());
        assert!(decode(Some("||;;||||;;||||;;||")).is_empty());
    }

    #[test]
    fn unknown_tags_decode_as_absent() {
        let note = decode(Some("x||;;||fax||;;||ldap||;;||corp.example"));
        assert_eq!(note.text(), Some("x"));
        assert_eq!(note.source(), None);
        assert_eq!(note.auth_type(), None);
        assert_eq!(note.auth_domain(), Some("corp.example"));
    }

    #[test]
    fn separator_in_text_is_rejected() {
        let err = VoucherNote::new(Some("evil||;;||web"), None, None, None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn domain_is_lowercased() {
        let note = VoucherNote::new(None, None, Some(AuthType::Oidc), Some("Example.COM")).unwrap();
        assert_eq!(note.auth_domain(), Some("example.com"));
    }
}

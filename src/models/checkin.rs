use serde_json::{json, Value};

/// What the check-in scanner hands us. Attendee QR codes encode
/// `asistente:<id>:<email>`; staff can also type a bare id or an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinPayload {
    AttendeeId(u64),
    Email(String),
}

impl CheckinPayload {
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim();

        // QR format: keep only the email part.
        let value = match value.strip_prefix("asistente:") {
            Some(rest) => rest.split(':').nth(1).unwrap_or(rest).trim(),
            None => value,
        };

        if value.is_empty() {
            return None;
        }
        if let Ok(id) = value.parse::<u64>() {
            return Some(CheckinPayload::AttendeeId(id));
        }
        if looks_like_email(value) {
            return Some(CheckinPayload::Email(value.to_string()));
        }
        None
    }

    /// Body for `POST /api/registrar-asistencia/`.
    pub fn to_json(&self) -> Value {
        match self {
            CheckinPayload::AttendeeId(id) => json!({ "attendee_id": id }),
            CheckinPayload::Email(email) => json!({ "email": email }),
        }
    }
}

pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_email_from_qr_payload() {
        assert_eq!(
            CheckinPayload::parse("asistente:42:ana@example.com"),
            Some(CheckinPayload::Email("ana@example.com".to_string()))
        );
    }

    #[test]
    fn bare_number_is_an_attendee_id() {
        assert_eq!(
            CheckinPayload::parse(" 42 "),
            Some(CheckinPayload::AttendeeId(42))
        );
    }

    #[test]
    fn plain_email_passes_through() {
        assert_eq!(
            CheckinPayload::parse("ana@example.com"),
            Some(CheckinPayload::Email("ana@example.com".to_string()))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(CheckinPayload::parse("no-es-nada"), None);
        assert_eq!(CheckinPayload::parse(""), None);
    }
}

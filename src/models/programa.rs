use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),

    #[error("unknown room `{0}`")]
    UnknownRoom(String),

    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("activity interval must end after it starts ({start}–{end})")]
    InvalidInterval { start: TimeOfDay, end: TimeOfDay },

    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

/// Wall-clock time of day, minute precision. The program is a single-day
/// window, so there is no date component anywhere in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Accepts `HH:MM` and the API's `HH:MM:SS` serialization; the seconds
    /// part is ignored.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let bad = || ParseError::InvalidTime(input.to_string());

        let mut parts = input.trim().split(':');
        let hour: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let minute: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        if hour > 23 || minute > 59 {
            return Err(bad());
        }
        Ok(Self { hour, minute })
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    pub fn plus_minutes(self, minutes: u16) -> Self {
        let total = self.minutes() + minutes;
        Self {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The venue's fixed set of rooms: the main hall plus four breakout rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    AuditorioPrincipal,
    Aula1,
    Aula2,
    Aula3,
    Aula4,
}

impl Room {
    pub const ALL: [Room; 5] = [
        Room::AuditorioPrincipal,
        Room::Aula1,
        Room::Aula2,
        Room::Aula3,
        Room::Aula4,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Room::AuditorioPrincipal => "Auditorio Principal",
            Room::Aula1 => "Aula 1",
            Room::Aula2 => "Aula 2",
            Room::Aula3 => "Aula 3",
            Room::Aula4 => "Aula 4",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let name = input.trim();
        Room::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseError::UnknownRoom(input.to_string()))
    }
}

/// Track category. Only used for the card color and the program filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Logistica,
    Transporte,
    Infraestructura,
    Tecnologia,
    Academico,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Logistica,
        Category::Transporte,
        Category::Infraestructura,
        Category::Tecnologia,
        Category::Academico,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Logistica => "LOGÍSTICA",
            Category::Transporte => "TRANSPORTE",
            Category::Infraestructura => "INFRAESTRUCTURA",
            Category::Tecnologia => "TECNOLOGÍA",
            Category::Academico => "ACADÉMICO",
        }
    }

    /// CSS-friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Logistica => "logistica",
            Category::Transporte => "transporte",
            Category::Infraestructura => "infraestructura",
            Category::Tecnologia => "tecnologia",
            Category::Academico => "academico",
        }
    }

    /// The API is inconsistent about accents, so both spellings are accepted.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let name = input.trim().to_uppercase();
        match name.as_str() {
            "LOGÍSTICA" | "LOGISTICA" => Ok(Category::Logistica),
            "TRANSPORTE" => Ok(Category::Transporte),
            "INFRAESTRUCTURA" => Ok(Category::Infraestructura),
            "TECNOLOGÍA" | "TECNOLOGIA" => Ok(Category::Tecnologia),
            "ACADÉMICO" | "ACADEMICO" => Ok(Category::Academico),
            _ => Err(ParseError::UnknownCategory(input.to_string())),
        }
    }
}

/// One program record as the API serves it. Everything is optional on the
/// wire; `Activity::from_wire` decides what is actually required.
#[derive(Debug, Deserialize)]
pub struct ProgramaItemWire {
    pub titulo: Option<String>,
    pub disertante: Option<DisertanteRef>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub sala: Option<String>,
    pub categoria: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisertanteRef {
    pub nombre: Option<String>,
}

/// A validated scheduled session. `start < end` holds for every value built
/// through [`Activity::new`] or [`Activity::from_wire`].
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub room: Room,
    pub title: String,
    pub speaker_name: Option<String>,
    pub description: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub category: Category,
}

impl Activity {
    pub fn new(
        room: Room,
        title: impl Into<String>,
        speaker_name: Option<String>,
        description: impl Into<String>,
        start: TimeOfDay,
        end: TimeOfDay,
        category: Category,
    ) -> Result<Self, ParseError> {
        if end <= start {
            return Err(ParseError::InvalidInterval { start, end });
        }
        Ok(Self {
            room,
            title: title.into(),
            speaker_name,
            description: description.into(),
            start,
            end,
            category,
        })
    }

    pub fn from_wire(wire: ProgramaItemWire) -> Result<Self, ParseError> {
        let title = wire
            .titulo
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ParseError::MissingField("titulo"))?;

        let start = wire
            .hora_inicio
            .as_deref()
            .ok_or(ParseError::MissingField("hora_inicio"))
            .and_then(TimeOfDay::parse)?;
        let end = wire
            .hora_fin
            .as_deref()
            .ok_or(ParseError::MissingField("hora_fin"))
            .and_then(TimeOfDay::parse)?;

        let room = wire
            .sala
            .as_deref()
            .ok_or(ParseError::MissingField("sala"))
            .and_then(Room::parse)?;
        let category = wire
            .categoria
            .as_deref()
            .ok_or(ParseError::MissingField("categoria"))
            .and_then(Category::parse)?;

        let speaker_name = wire
            .disertante
            .and_then(|d| d.nombre)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let description = wire
            .descripcion
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        Activity::new(room, title, speaker_name, description, start, end, category)
    }
}

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(RecordStatus {
    Active => "active",
    Resolved => "resolved",
    Chronic => "chronic",
});

str_enum!(RecordSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

impl AppointmentStatus {
    /// Still ahead of the patient (shown under "upcoming").
    pub fn is_upcoming(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Confirmed)
    }
}

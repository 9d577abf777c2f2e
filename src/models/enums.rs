use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

/// Professional role attached to an account. The legacy page scripts used
/// at least four spellings per role ("sage-femme", "Midwife", "Sage-femme",
/// "midwife"); `from_str` accepts those aliases so old exports stay loadable,
/// while `as_str` always writes the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Midwife,
    Doctor,
    Nurse,
    Clerk,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Midwife => "midwife",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Clerk => "clerk",
        }
    }

    /// Roles allowed to view clinical pages (everything but user management).
    pub fn is_clinical(&self) -> bool {
        matches!(self, Role::Admin | Role::Midwife | Role::Doctor | Role::Nurse)
    }
}

impl std::str::FromStr for Role {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "midwife" | "sage-femme" | "sage femme" => Ok(Role::Midwife),
            "doctor" | "médecin" | "medecin" => Ok(Role::Doctor),
            "nurse" | "infirmier" | "infirmière" | "infirmiere" => Ok(Role::Nurse),
            "clerk" | "user" | "utilisateur" => Ok(Role::Clerk),
            _ => Err(DatabaseError::InvalidEnum {
                field: "Role".into(),
                value: s.into(),
            }),
        }
    }
}

str_enum!(Eligibility {
    Eligible => "eligible",
    NotEligible => "not_eligible",
    Pending => "pending",
});

str_enum!(AppointmentType {
    PrenatalVisit => "prenatal_visit",
    PostnatalVisit => "postnatal_visit",
    InitialConsultation => "initial_consultation",
    Telehealth => "telehealth",
    HomeVisit => "home_visit",
    Other => "other",
});

str_enum!(AttendanceStatus {
    Pending => "pending",
    Attended => "attended",
    Missed => "missed",
    Cancelled => "cancelled",
});

str_enum!(DeliveryMode {
    SpontaneousVaginal => "spontaneous_vaginal",
    AssistedVaginal => "assisted_vaginal",
    Vbac => "vbac",
    PlannedCSection => "planned_c_section",
    EmergencyCSection => "emergency_c_section",
});

str_enum!(BreastfeedingStatus {
    Exclusive => "exclusive",
    Mixed => "mixed",
    Stopped => "stopped",
    NotStarted => "not_started",
});

str_enum!(PsychologicalState {
    Good => "good",
    Fair => "fair",
    NeedsMonitoring => "needs_monitoring",
});

/// The static report menu: which table an export reads from.
str_enum!(Dataset {
    Patients => "patients",
    PrenatalRecords => "prenatal_records",
    Appointments => "appointments",
    BirthRecords => "birth_records",
    PostpartumRecords => "postpartum_records",
    Vaccinations => "vaccinations",
    Users => "users",
});

impl Dataset {
    /// Every dataset, in menu order.
    pub fn all() -> &'static [Dataset] {
        &[
            Dataset::Patients,
            Dataset::PrenatalRecords,
            Dataset::Appointments,
            Dataset::BirthRecords,
            Dataset::PostpartumRecords,
            Dataset::Vaccinations,
            Dataset::Users,
        ]
    }

    /// Human title used in PDF headers.
    pub fn title(&self) -> &'static str {
        match self {
            Dataset::Patients => "Patient Demographics",
            Dataset::PrenatalRecords => "Prenatal Care Records",
            Dataset::Appointments => "Appointments",
            Dataset::BirthRecords => "Birth Records",
            Dataset::PostpartumRecords => "Postpartum Records",
            Dataset::Vaccinations => "Vaccinations",
            Dataset::Users => "Staff Accounts",
        }
    }
}

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

str_enum!(VisitStatus {
    Waiting => "waiting",
    Called => "called",
    InConsult => "in_consult",
    Prescribed => "prescribed",
    SentToPharmacy => "sent_to_pharmacy",
    Dispensed => "dispensed",
});

str_enum!(PrescriptionStatus {
    Pending => "pending",
    Dispensed => "dispensed",
});

str_enum!(ClinicStructure {
    FullWorkflow => "full_workflow",
    NoPharmacy => "no_pharmacy",
    OneMan => "one_man",
});

str_enum!(TaxType {
    None => "none",
    Gst => "gst",
    Vat => "vat",
});

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn visit_status_round_trip() {
        for (variant, s) in [
            (VisitStatus::Waiting, "waiting"),
            (VisitStatus::Called, "called"),
            (VisitStatus::InConsult, "in_consult"),
            (VisitStatus::Prescribed, "prescribed"),
            (VisitStatus::SentToPharmacy, "sent_to_pharmacy"),
            (VisitStatus::Dispensed, "dispensed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(VisitStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn clinic_structure_round_trip() {
        for (variant, s) in [
            (ClinicStructure::FullWorkflow, "full_workflow"),
            (ClinicStructure::NoPharmacy, "no_pharmacy"),
            (ClinicStructure::OneMan, "one_man"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ClinicStructure::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn prescription_status_round_trip() {
        for (variant, s) in [
            (PrescriptionStatus::Pending, "pending"),
            (PrescriptionStatus::Dispensed, "dispensed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PrescriptionStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(VisitStatus::from_str("invalid").is_err());
        assert!(ClinicStructure::from_str("unknown").is_err());
        assert!(TaxType::from_str("").is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&VisitStatus::SentToPharmacy).unwrap();
        assert_eq!(json, "\"sent_to_pharmacy\"");
        let json = serde_json::to_string(&ClinicStructure::OneMan).unwrap();
        assert_eq!(json, "\"one_man\"");
    }
}

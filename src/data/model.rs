use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

/// Ticket class. Ordered First < Second < Third, like the `Pclass` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub const ALL: [PassengerClass; 3] = [
        PassengerClass::First,
        PassengerClass::Second,
        PassengerClass::Third,
    ];

    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(PassengerClass::First),
            2 => Some(PassengerClass::Second),
            3 => Some(PassengerClass::Third),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PassengerClass::First => 1,
            PassengerClass::Second => 2,
            PassengerClass::Third => 3,
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Some(Sex::Female),
            "male" | "m" => Some(Sex::Male),
            _ => None,
        }
    }

    /// Raw column spelling, as found in the source file.
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Port {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Port {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Port::Cherbourg),
            "Q" => Some(Port::Queenstown),
            "S" => Some(Port::Southampton),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Port::Cherbourg => "C",
            Port::Queenstown => "Q",
            Port::Southampton => "S",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Grouping key for the port column: missing ports are bucketed under
/// `Unknown`, which sorts after every known port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PortBucket {
    Known(Port),
    Unknown,
}

impl From<Option<Port>> for PortBucket {
    fn from(port: Option<Port>) -> Self {
        port.map_or(PortBucket::Unknown, PortBucket::Known)
    }
}

impl fmt::Display for PortBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortBucket::Known(p) => write!(f, "{p}"),
            PortBucket::Unknown => f.write_str("Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Passenger – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    pub id: i64,
    pub class: PassengerClass,
    pub sex: Sex,
    pub age: Option<f64>,
    pub fare: Option<f64>,
    pub port: Option<Port>,
    pub survived: bool,
}

impl Passenger {
    pub fn port_bucket(&self) -> PortBucket {
        self.port.into()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Closed numeric interval of observed (non-missing) values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Bounds { min: v, max: v }),
            Some(b) => Some(Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
    }
}

/// The immutable passenger table with observed value sets pre-computed.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub passengers: Vec<Passenger>,
    pub classes: BTreeSet<PassengerClass>,
    pub sexes: BTreeSet<Sex>,
    /// Observed non-missing ports.
    pub ports: BTreeSet<Port>,
    pub age_bounds: Option<Bounds>,
    pub fare_bounds: Option<Bounds>,
}

impl Dataset {
    pub fn from_passengers(passengers: Vec<Passenger>) -> Self {
        let classes = passengers.iter().map(|p| p.class).collect();
        let sexes = passengers.iter().map(|p| p.sex).collect();
        let ports = passengers.iter().filter_map(|p| p.port).collect();
        let age_bounds = Bounds::of(passengers.iter().filter_map(|p| p.age));
        let fare_bounds = Bounds::of(passengers.iter().filter_map(|p| p.fare));

        Dataset {
            passengers,
            classes,
            sexes,
            ports,
            age_bounds,
            fare_bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    /// Number of rows whose identifier was already used by an earlier row.
    pub fn duplicate_ids(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.passengers.len());
        self.passengers.iter().filter(|p| !seen.insert(p.id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(id: i64, port: Option<Port>, age: Option<f64>) -> Passenger {
        Passenger {
            id,
            class: PassengerClass::Third,
            sex: Sex::Male,
            age,
            fare: Some(7.25),
            port,
            survived: false,
        }
    }

    #[test]
    fn unknown_port_bucket_sorts_last() {
        let mut buckets = vec![
            PortBucket::Unknown,
            PortBucket::Known(Port::Southampton),
            PortBucket::Known(Port::Cherbourg),
        ];
        buckets.sort();
        assert_eq!(
            buckets,
            vec![
                PortBucket::Known(Port::Cherbourg),
                PortBucket::Known(Port::Southampton),
                PortBucket::Unknown,
            ]
        );
        assert_eq!(PortBucket::from(None).to_string(), "Unknown");
    }

    #[test]
    fn observed_values_skip_missing() {
        let ds = Dataset::from_passengers(vec![
            passenger(1, Some(Port::Southampton), Some(22.0)),
            passenger(2, None, None),
            passenger(3, Some(Port::Queenstown), Some(0.42)),
        ]);
        assert_eq!(
            ds.ports.iter().copied().collect::<Vec<_>>(),
            vec![Port::Queenstown, Port::Southampton]
        );
        assert_eq!(ds.age_bounds, Some(Bounds { min: 0.42, max: 22.0 }));
        assert_eq!(ds.duplicate_ids(), 0);
    }

    #[test]
    fn duplicate_ids_are_counted_not_rejected() {
        let ds = Dataset::from_passengers(vec![
            passenger(7, None, None),
            passenger(7, None, None),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.duplicate_ids(), 1);
    }

    #[test]
    fn categorical_parsing() {
        assert_eq!(Sex::parse("Female"), Some(Sex::Female));
        assert_eq!(Sex::parse("M"), Some(Sex::Male));
        assert_eq!(Sex::parse("other"), None);
        assert_eq!(Port::parse("s"), Some(Port::Southampton));
        assert_eq!(Port::parse("X"), None);
        assert_eq!(PassengerClass::from_number(2), Some(PassengerClass::Second));
        assert_eq!(PassengerClass::from_number(4), None);
    }
}

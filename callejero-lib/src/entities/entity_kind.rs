use crate::layout::{Layout, layouts};
use strum::{Display, EnumString, IntoStaticStr};

/// The entity kinds shipped in a street directory archive.
///
/// The string form of each variant is the file name prefix used in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr)]
pub enum EntityKind {
    #[strum(serialize = "SECC")]
    SectionCodes,

    #[strum(serialize = "PSEU")]
    PseudoStreets,

    #[strum(serialize = "VIAS")]
    Streets,

    #[strum(serialize = "TRAM")]
    AddressTracts,

    #[strum(serialize = "UP")]
    PopulationUnits,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::SectionCodes,
        Self::PseudoStreets,
        Self::Streets,
        Self::AddressTracts,
        Self::PopulationUnits,
    ];

    #[must_use]
    pub fn prefix(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub const fn layout(self) -> &'static Layout {
        match self {
            Self::SectionCodes => &layouts::SECC,
            Self::PseudoStreets => &layouts::PSEU,
            Self::Streets => &layouts::VIAS,
            Self::AddressTracts => &layouts::TRAM,
            Self::PopulationUnits => &layouts::UP,
        }
    }

    /// Whether the serving snapshot depends on this entity.
    ///
    /// A build aborts when a required entity has no source file.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Streets | Self::AddressTracts)
    }

    /// Name of the persisted table file for this entity, e.g. `VIAS.table`.
    #[must_use]
    pub fn table_file_name(self) -> String {
        format!("{}.table", self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_layout_name() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.prefix(), kind.layout().name());
            assert_eq!(kind.to_string(), kind.prefix());
        }
    }

    #[test]
    fn test_parse_from_prefix() {
        assert_eq!("TRAM".parse::<EntityKind>().unwrap(), EntityKind::AddressTracts);
        assert_eq!("UP".parse::<EntityKind>().unwrap(), EntityKind::PopulationUnits);
        assert!("tram".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_required_entities() {
        let required: Vec<_> = EntityKind::ALL.into_iter().filter(|k| k.is_required()).collect();
        assert_eq!(required, vec![EntityKind::Streets, EntityKind::AddressTracts]);
    }

    #[test]
    fn test_table_file_name() {
        assert_eq!(EntityKind::Streets.table_file_name(), "VIAS.table");
    }
}

use compact_str::CompactString;
use core::fmt::Display;
use serde::Serialize;

/// A query result that can be rendered as a row of named cells.
pub trait Record: Serialize {
    /// Column names paired with display text, in output order.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

fn cell<T: Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// A postal code locality: which population entity a postal code belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Locality {
    pub cpos: Option<i32>,
    pub cpro: Option<i8>,
    pub cmun: Option<i16>,
    pub nentsic: Option<CompactString>,
}

impl Record for Locality {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cpos", cell(self.cpos.as_ref())),
            ("cpro", cell(self.cpro.as_ref())),
            ("cmun", cell(self.cmun.as_ref())),
            ("nentsic", cell(self.nentsic.as_ref())),
        ]
    }
}

/// A locality narrowed to one population unit variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitLocality {
    pub cpos: Option<i32>,
    pub cpro: Option<i8>,
    pub cmun: Option<i16>,
    pub cun_var: Option<i32>,
    pub nentsic: Option<CompactString>,
}

impl Record for UnitLocality {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cpos", cell(self.cpos.as_ref())),
            ("cpro", cell(self.cpro.as_ref())),
            ("cmun", cell(self.cmun.as_ref())),
            ("cun_var", cell(self.cun_var.as_ref())),
            ("nentsic", cell(self.nentsic.as_ref())),
        ]
    }
}

/// A population unit of a province, keyed by its core code.
///
/// Field order gives the listing order: municipality, then unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PopulationUnit {
    pub cmun: Option<i16>,
    pub cun: Option<i32>,
    pub nentsic: Option<CompactString>,
}

impl Record for PopulationUnit {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cmun", cell(self.cmun.as_ref())),
            ("cun", cell(self.cun.as_ref())),
            ("nentsic", cell(self.nentsic.as_ref())),
        ]
    }
}

/// A street found by partial name, with its type and name in title case.
///
/// `cun` is only present for searches scoped to a population unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StreetMatch {
    pub cpos: Option<i32>,
    pub cpro: Option<i8>,
    pub cmun: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cun: Option<i32>,
    pub cvia: Option<i32>,
    pub nentsic: Option<CompactString>,
    pub tvia: Option<String>,
    pub nvia: Option<String>,
}

impl Record for StreetMatch {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("cpos", cell(self.cpos.as_ref())),
            ("cpro", cell(self.cpro.as_ref())),
            ("cmun", cell(self.cmun.as_ref())),
        ];
        if let Some(cun) = self.cun {
            fields.push(("cun", cun.to_string()));
        }
        fields.extend([
            ("cvia", cell(self.cvia.as_ref())),
            ("nentsic", cell(self.nentsic.as_ref())),
            ("tvia", cell(self.tvia.as_ref())),
            ("nvia", cell(self.nvia.as_ref())),
        ]);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locality_fields_and_json() {
        let locality = Locality {
            cpos: Some(28001),
            cpro: Some(28),
            cmun: Some(79),
            nentsic: Some("MADRID".into()),
        };

        let names: Vec<_> = locality.fields().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["cpos", "cpro", "cmun", "nentsic"]);

        let json = serde_json::to_value(&locality).unwrap();
        assert_eq!(json["cpos"], 28001);
        assert_eq!(json["nentsic"], "MADRID");
    }

    #[test]
    fn test_null_cells_are_blank() {
        let unit = PopulationUnit {
            cmun: Some(79),
            cun: None,
            nentsic: None,
        };
        assert_eq!(unit.fields()[1], ("cun", String::new()));
        assert!(serde_json::to_value(&unit).unwrap()["cun"].is_null());
    }

    #[test]
    fn test_street_match_cun_only_when_scoped() {
        let mut street = StreetMatch {
            cpos: Some(28001),
            cpro: Some(28),
            cmun: Some(79),
            cun: None,
            cvia: Some(5),
            nentsic: Some("MADRID".into()),
            tvia: Some("Calle".to_string()),
            nvia: Some("Mayor".to_string()),
        };
        assert!(serde_json::to_value(&street).unwrap().get("cun").is_none());
        assert_eq!(street.fields().len(), 7);

        street.cun = Some(1);
        assert_eq!(serde_json::to_value(&street).unwrap()["cun"], 1);
        assert_eq!(street.fields()[3], ("cun", "1".to_string()));
    }

    #[test]
    fn test_population_units_order_by_municipality_then_unit() {
        let unit = |cmun, cun, name: &str| PopulationUnit {
            cmun: Some(cmun),
            cun: Some(cun),
            nentsic: Some(name.into()),
        };
        let mut units = vec![unit(2, 1, "A"), unit(1, 7, "Z"), unit(1, 3, "M")];
        units.sort();
        assert_eq!(units, vec![unit(1, 3, "M"), unit(1, 7, "Z"), unit(2, 1, "A")]);
    }
}

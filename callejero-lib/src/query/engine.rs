use super::postal_code::PostalCodeQuery;
use super::records::{Locality, PopulationUnit, StreetMatch, UnitLocality};
use super::title_case::title_case;
use super::QueryOutcome;
use crate::reference::{self, PROVINCE_COUNT, Province, REGION_COUNT, REGIONS, Region};
use crate::snapshot::{Snapshot, TractRow};
use std::collections::BTreeSet;

const LOG_TARGET: &str = "     query";

/// Shortest partial street name worth searching for.
pub const MIN_STREET_NAME_CHARS: usize = 3;

/// Where a street search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreetScope<'a> {
    /// An exact five digit postal code.
    PostalCode(&'a str),

    /// A population unit, identified by its core code within a municipality.
    PopulationUnit { cpro: i64, cmun: i64, cun: i64 },
}

/// Answers address lookups against one loaded snapshot.
///
/// The engine holds no state of its own; it can be created per request.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'s> {
    snapshot: &'s Snapshot,
}

impl<'s> QueryEngine<'s> {
    #[must_use]
    pub const fn new(snapshot: &'s Snapshot) -> Self {
        Self { snapshot }
    }

    /// Localities served by a postal code, or by every code sharing a 3 or 4 digit prefix.
    #[must_use]
    pub fn lookup_by_postal_code(&self, code: &str) -> QueryOutcome<Locality> {
        let (low, high) = match PostalCodeQuery::parse(code) {
            Ok(query) => query.bounds(),
            Err(outcome) => return outcome,
        };

        log::debug!(target: LOG_TARGET, "Looking up postal codes {low:05}..={high:05}");
        collect(self.snapshot.tracts_in_postal_range(low, high).map(locality))
    }

    /// Localities of a municipality.
    #[must_use]
    pub fn lookup_by_province_municipality(&self, cpro: i64, cmun: i64) -> QueryOutcome<Locality> {
        let (cpro, cmun) = match (province_code(cpro), municipality_code(cmun)) {
            (Ok(cpro), Ok(cmun)) => (cpro, cmun),
            (Err(outcome), _) | (_, Err(outcome)) => return outcome,
        };

        collect(self.snapshot.tracts_in_municipality(cpro, cmun).map(locality))
    }

    /// Localities of one population unit variant within a municipality.
    #[must_use]
    pub fn lookup_by_population_unit(&self, cpro: i64, cmun: i64, cun_var: i64) -> QueryOutcome<UnitLocality> {
        let (cpro, cmun, cun_var) = match (province_code(cpro), municipality_code(cmun), unit_code(cun_var)) {
            (Ok(cpro), Ok(cmun), Ok(cun_var)) => (cpro, cmun, cun_var),
            (Err(outcome), _, _) | (_, Err(outcome), _) | (_, _, Err(outcome)) => return outcome,
        };

        collect(
            self.snapshot
                .tracts_in_municipality(cpro, cmun)
                .filter(|tract| tract.cun_var == Some(cun_var))
                .map(|tract| UnitLocality {
                    cpos: tract.cpos,
                    cpro: tract.cpro,
                    cmun: tract.cmun,
                    cun_var: tract.cun_var,
                    nentsic: tract.nentsic.clone(),
                }),
        )
    }

    /// Distinct population units of a province, ordered by municipality and unit.
    #[must_use]
    pub fn list_population_units(&self, cpro: i64) -> QueryOutcome<PopulationUnit> {
        let cpro = match province_code(cpro) {
            Ok(cpro) => cpro,
            Err(outcome) => return outcome,
        };

        collect(self.snapshot.tracts_in_province(cpro).map(|tract| PopulationUnit {
            cmun: tract.cmun,
            cun: tract.cun_core(),
            nentsic: tract.nentsic.clone(),
        }))
    }

    /// Streets within `scope` whose name contains `partial_name`, ignoring case.
    #[must_use]
    pub fn search_streets(&self, scope: StreetScope<'_>, partial_name: &str) -> QueryOutcome<StreetMatch> {
        let tracts: Box<dyn Iterator<Item = &'s TractRow> + 's> = match scope {
            StreetScope::PostalCode(code) => match PostalCodeQuery::parse_exact(code) {
                Ok(cpos) => Box::new(self.snapshot.tracts_in_postal_range(cpos, cpos)),
                Err(outcome) => return outcome,
            },
            StreetScope::PopulationUnit { cpro, cmun, cun } => {
                match (province_code(cpro), municipality_code(cmun), unit_code(cun)) {
                    (Ok(cpro), Ok(cmun), Ok(cun)) => Box::new(
                        self.snapshot
                            .tracts_in_municipality(cpro, cmun)
                            .filter(move |tract| tract.cun_core() == Some(cun)),
                    ),
                    (Err(outcome), _, _) | (_, Err(outcome), _) | (_, _, Err(outcome)) => return outcome,
                }
            }
        };

        let name = partial_name.trim();
        if name.chars().count() < MIN_STREET_NAME_CHARS {
            return QueryOutcome::NoContent;
        }

        let needle = name.to_uppercase();
        let unit_scoped = matches!(scope, StreetScope::PopulationUnit { .. });
        log::debug!(target: LOG_TARGET, "Searching streets matching '{needle}' in {scope:?}");

        let mut matches = BTreeSet::new();
        for tract in tracts {
            for street in self.snapshot.streets_for(tract) {
                if !street.nvia.as_ref().is_some_and(|nvia| nvia.to_uppercase().contains(needle.as_str())) {
                    continue;
                }

                let _ = matches.insert(StreetMatch {
                    cpos: tract.cpos,
                    cpro: tract.cpro,
                    cmun: tract.cmun,
                    cun: if unit_scoped { tract.cun_core() } else { None },
                    cvia: tract.cvia_var,
                    nentsic: tract.nentsic.clone(),
                    tvia: street.tvia.as_deref().map(title_case),
                    nvia: street.nvia.as_deref().map(title_case),
                });
            }
        }

        QueryOutcome::from_records(matches)
    }
}

/// All regions, in code order.
#[must_use]
pub fn list_regions() -> QueryOutcome<Region> {
    QueryOutcome::from_records(REGIONS.iter().copied())
}

/// All provinces, or only those of `region` when given.
#[must_use]
pub fn list_provinces(region: Option<i64>) -> QueryOutcome<Province> {
    let Some(region) = region else {
        return QueryOutcome::from_records(reference::PROVINCES.iter().copied());
    };

    match u8::try_from(region) {
        Ok(code) if (1..=REGION_COUNT).contains(&usize::from(code)) => {
            QueryOutcome::from_records(reference::provinces_in_region(code).copied())
        }
        _ => QueryOutcome::invalid(format!("region {region} is outside 1..={REGION_COUNT}")),
    }
}

fn collect<T: Ord>(records: impl Iterator<Item = T>) -> QueryOutcome<T> {
    QueryOutcome::from_records(records.collect::<BTreeSet<_>>())
}

fn locality(tract: &TractRow) -> Locality {
    Locality {
        cpos: tract.cpos,
        cpro: tract.cpro,
        cmun: tract.cmun,
        nentsic: tract.nentsic.clone(),
    }
}

fn province_code<T>(cpro: i64) -> Result<i8, QueryOutcome<T>> {
    match i8::try_from(cpro) {
        Ok(code) if code >= 1 && usize::from(code.unsigned_abs()) <= PROVINCE_COUNT => Ok(code),
        _ => Err(QueryOutcome::invalid(format!("province {cpro} is outside 1..={PROVINCE_COUNT}"))),
    }
}

fn municipality_code<T>(cmun: i64) -> Result<i16, QueryOutcome<T>> {
    match i16::try_from(cmun) {
        Ok(code) if code >= 1 => Ok(code),
        _ => Err(QueryOutcome::invalid(format!("municipality {cmun} is not a valid code"))),
    }
}

fn unit_code<T>(cun: i64) -> Result<i32, QueryOutcome<T>> {
    match i32::try_from(cun) {
        Ok(code) if code >= 0 => Ok(code),
        _ => Err(QueryOutcome::invalid(format!("population unit {cun} is not a valid code"))),
    }
}

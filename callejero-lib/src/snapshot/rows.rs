use crate::Result;
use crate::entities::DecodedRow;
use crate::layout::{Layout, layouts};
use compact_str::CompactString;
use ohno::app_err;

/// Join key shared by streets and address tracts: (province, municipality, street code).
pub type StreetKey = (i8, i16, i32);

/// Resolves a column of `layout` by name.
fn column(layout: &Layout, name: &str) -> Result<usize> {
    layout
        .field_index(name)
        .ok_or_else(|| app_err!("the {} layout has no '{name}' column", layout.name()))
}

/// A street name record (`VIAS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRow {
    pub cpro: Option<i8>,
    pub cmun: Option<i16>,
    pub cvia_var: Option<i32>,
    pub tvia: Option<CompactString>,
    pub nvia: Option<CompactString>,
}

impl StreetRow {
    /// Returns a converter from generic rows of the `VIAS` layout.
    pub fn decoder() -> Result<impl Fn(&DecodedRow) -> Self> {
        let layout = &layouts::VIAS;
        let (cpro, cmun, cvia_var, tvia, nvia) = (
            column(layout, "cpro")?,
            column(layout, "cmun")?,
            column(layout, "cvia_var")?,
            column(layout, "tvia")?,
            column(layout, "nvia")?,
        );

        Ok(move |row: &DecodedRow| Self {
            cpro: row.get(cpro).as_int(),
            cmun: row.get(cmun).as_int(),
            cvia_var: row.get(cvia_var).as_int(),
            tvia: row.get(tvia).as_compact_str().cloned(),
            nvia: row.get(nvia).as_compact_str().cloned(),
        })
    }

    /// The join key, or `None` when any component is null. Null keys never join.
    #[must_use]
    pub fn key(&self) -> Option<StreetKey> {
        Some((self.cpro?, self.cmun?, self.cvia_var?))
    }
}

/// An address tract record (`TRAM`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TractRow {
    pub cpro: Option<i8>,
    pub cmun: Option<i16>,
    pub cpos: Option<i32>,
    pub cun_var: Option<i32>,
    pub nentsic: Option<CompactString>,
    pub cvia_var: Option<i32>,
    pub nviac: Option<CompactString>,
}

impl TractRow {
    /// Returns a converter from generic rows of the `TRAM` layout.
    pub fn decoder() -> Result<impl Fn(&DecodedRow) -> Self> {
        let layout = &layouts::TRAM;
        let (cpro, cmun, cpos, cun_var, nentsic, cvia_var, nviac) = (
            column(layout, "cpro")?,
            column(layout, "cmun")?,
            column(layout, "cpos")?,
            column(layout, "cun_var")?,
            column(layout, "nentsic")?,
            column(layout, "cvia_var")?,
            column(layout, "nviac")?,
        );

        Ok(move |row: &DecodedRow| Self {
            cpro: row.get(cpro).as_int(),
            cmun: row.get(cmun).as_int(),
            cpos: row.get(cpos).as_int(),
            cun_var: row.get(cun_var).as_int(),
            nentsic: row.get(nentsic).as_compact_str().cloned(),
            cvia_var: row.get(cvia_var).as_int(),
            nviac: row.get(nviac).as_compact_str().cloned(),
        })
    }

    /// The population unit "core" key: the unit variant with its last three digits dropped.
    #[must_use]
    pub const fn cun_core(&self) -> Option<i32> {
        match self.cun_var {
            Some(cun) => Some(cun / 1000),
            None => None,
        }
    }

    #[must_use]
    pub fn street_key(&self) -> Option<StreetKey> {
        Some((self.cpro?, self.cmun?, self.cvia_var?))
    }
}

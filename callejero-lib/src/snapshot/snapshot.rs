use super::{Manifest, StreetKey, StreetRow, TableFile, TractRow};
use crate::entities::{DecodedRow, EntityKind};
use crate::{HashMap, Result, hash_map_with_capacity};
use ohno::IntoAppError;
use std::path::Path;
use std::time::Instant;

/// Log target for snapshot loading
const LOG_TARGET: &str = "  snapshot";

/// An immutable, fully indexed view of the street and address tract tables.
///
/// A snapshot never changes after construction. Replacing it means building a new one.
#[derive(Debug)]
pub struct Snapshot {
    manifest: Manifest,
    streets: Vec<StreetRow>,
    tracts: Vec<TractRow>,
    streets_by_key: HashMap<StreetKey, Vec<usize>>,

    /// Indices of tracts that have a postal code, sorted by postal code.
    tracts_by_postal_code: Vec<usize>,

    tracts_by_municipality: HashMap<(i8, i16), Vec<usize>>,
}

impl Snapshot {
    /// Loads a published snapshot directory.
    pub fn open(dir: &Path) -> Result<Self> {
        let start = Instant::now();
        let manifest = Manifest::read(dir)?;

        let streets = read_rows(dir, EntityKind::Streets, StreetRow::decoder()?)?;
        let tracts = read_rows(dir, EntityKind::AddressTracts, TractRow::decoder()?)?;

        let snapshot = Self::from_rows(manifest, streets, tracts);
        log::debug!(
            target: LOG_TARGET,
            "Loaded snapshot '{}' ({} streets, {} tracts) in {:.3}s",
            snapshot.version(),
            snapshot.streets.len(),
            snapshot.tracts.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(snapshot)
    }

    #[must_use]
    pub fn from_rows(manifest: Manifest, streets: Vec<StreetRow>, tracts: Vec<TractRow>) -> Self {
        let mut streets_by_key: HashMap<StreetKey, Vec<usize>> = hash_map_with_capacity(streets.len());
        for (i, street) in streets.iter().enumerate() {
            if let Some(key) = street.key() {
                streets_by_key.entry(key).or_default().push(i);
            }
        }

        let mut tracts_by_postal_code: Vec<usize> = (0..tracts.len()).filter(|&i| tracts[i].cpos.is_some()).collect();
        tracts_by_postal_code.sort_by_key(|&i| tracts[i].cpos);

        let mut tracts_by_municipality: HashMap<(i8, i16), Vec<usize>> = HashMap::default();
        for (i, tract) in tracts.iter().enumerate() {
            if let (Some(cpro), Some(cmun)) = (tract.cpro, tract.cmun) {
                tracts_by_municipality.entry((cpro, cmun)).or_default().push(i);
            }
        }

        Self {
            manifest,
            streets,
            tracts,
            streets_by_key,
            tracts_by_postal_code,
            tracts_by_municipality,
        }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    #[must_use]
    pub fn streets(&self) -> &[StreetRow] {
        &self.streets
    }

    #[must_use]
    pub fn tracts(&self) -> &[TractRow] {
        &self.tracts
    }

    /// Tracts whose postal code lies in `[low, high]`.
    pub fn tracts_in_postal_range(&self, low: i32, high: i32) -> impl Iterator<Item = &TractRow> {
        let cpos = |i: &usize| self.tracts[*i].cpos.unwrap_or(i32::MIN);
        let from = self.tracts_by_postal_code.partition_point(|i| cpos(i) < low);
        let to = self.tracts_by_postal_code.partition_point(|i| cpos(i) <= high);
        self.tracts_by_postal_code[from..to.max(from)].iter().map(|&i| &self.tracts[i])
    }

    pub fn tracts_in_municipality(&self, cpro: i8, cmun: i16) -> impl Iterator<Item = &TractRow> {
        self.tracts_by_municipality
            .get(&(cpro, cmun))
            .into_iter()
            .flatten()
            .map(|&i| &self.tracts[i])
    }

    pub fn tracts_in_province(&self, cpro: i8) -> impl Iterator<Item = &TractRow> {
        self.tracts.iter().filter(move |tract| tract.cpro == Some(cpro))
    }

    /// Streets sharing the join key of `tract`. Yields nothing when the tract key has a null.
    pub fn streets_for(&self, tract: &TractRow) -> impl Iterator<Item = &StreetRow> {
        tract
            .street_key()
            .and_then(|key| self.streets_by_key.get(&key))
            .into_iter()
            .flatten()
            .map(|&i| &self.streets[i])
    }
}

fn read_rows<T>(dir: &Path, kind: EntityKind, decode: impl Fn(&DecodedRow) -> T) -> Result<Vec<T>> {
    let path = dir.join(kind.table_file_name());
    let table = TableFile::open(&path)?;
    table
        .check_layout(kind.layout())
        .into_app_err_with(|| format!("unexpected schema in '{}'", path.display()))?;

    let mut rows = Vec::with_capacity(table.len());
    for row in table.rows() {
        rows.push(decode(&row?));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use compact_str::CompactString;
    use std::collections::BTreeMap;

    fn manifest() -> Manifest {
        Manifest {
            version: "test".into(),
            source: None,
            created_at: Utc::now(),
            tables: BTreeMap::new(),
        }
    }

    fn tract(cpos: Option<i32>, cpro: i8, cmun: i16, cvia: Option<i32>) -> TractRow {
        TractRow {
            cpro: Some(cpro),
            cmun: Some(cmun),
            cpos,
            cun_var: Some(1_000_000),
            nentsic: Some(CompactString::from("X")),
            cvia_var: cvia,
            nviac: None,
        }
    }

    fn street(cpro: i8, cmun: i16, cvia: i32, name: &str) -> StreetRow {
        StreetRow {
            cpro: Some(cpro),
            cmun: Some(cmun),
            cvia_var: Some(cvia),
            tvia: Some(CompactString::from("CALLE")),
            nvia: Some(CompactString::from(name)),
        }
    }

    #[test]
    fn test_postal_range_is_inclusive() {
        let tracts = vec![
            tract(Some(28100), 28, 1, None),
            tract(Some(28000), 28, 79, None),
            tract(None, 28, 79, None),
            tract(Some(28099), 28, 79, None),
            tract(Some(27999), 27, 1, None),
        ];
        let snapshot = Snapshot::from_rows(manifest(), Vec::new(), tracts);

        let mut codes: Vec<_> = snapshot.tracts_in_postal_range(28000, 28099).filter_map(|t| t.cpos).collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![28000, 28099]);

        assert_eq!(snapshot.tracts_in_postal_range(30000, 39999).count(), 0);
        assert_eq!(snapshot.tracts_in_postal_range(28100, 28100).count(), 1);
    }

    #[test]
    fn test_municipality_and_province() {
        let tracts = vec![tract(Some(1), 28, 79, None), tract(Some(2), 28, 1, None), tract(Some(3), 8, 19, None)];
        let snapshot = Snapshot::from_rows(manifest(), Vec::new(), tracts);

        assert_eq!(snapshot.tracts_in_municipality(28, 79).count(), 1);
        assert_eq!(snapshot.tracts_in_municipality(28, 2).count(), 0);
        assert_eq!(snapshot.tracts_in_province(28).count(), 2);
    }

    #[test]
    fn test_street_join() {
        let streets = vec![street(28, 79, 5, "MAYOR"), street(28, 79, 6, "PAZ"), street(8, 79, 5, "OTRA")];
        let tracts = vec![tract(Some(28001), 28, 79, Some(5)), tract(Some(28001), 28, 79, None)];
        let snapshot = Snapshot::from_rows(manifest(), streets, tracts);

        let joined: Vec<_> = snapshot.streets_for(&snapshot.tracts()[0]).collect();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].nvia.as_deref(), Some("MAYOR"));

        assert_eq!(snapshot.streets_for(&snapshot.tracts()[1]).count(), 0);
    }

    #[test]
    fn test_from_parsed_tables() {
        let mut vias = vec![b' '; 107];
        vias[..5].copy_from_slice(b"28079");
        vias[47..52].copy_from_slice(b"00005");
        vias[57..62].copy_from_slice(b"MAYOR");

        let mut tram = vec![b' '; 190];
        tram[..5].copy_from_slice(b"28079");
        tram[42..47].copy_from_slice(b"28001");
        tram[160..165].copy_from_slice(b"00005");

        let streets = crate::entities::parse_reader(EntityKind::Streets, vias.as_slice(), None).unwrap();
        let tracts = crate::entities::parse_reader(EntityKind::AddressTracts, tram.as_slice(), None).unwrap();
        let snapshot = Snapshot::from_rows(
            manifest(),
            streets.table.rows().iter().map(StreetRow::decoder().unwrap()).collect(),
            tracts.table.rows().iter().map(TractRow::decoder().unwrap()).collect(),
        );

        let tract = &snapshot.tracts()[0];
        assert_eq!(tract.cpos, Some(28001));
        let joined: Vec<_> = snapshot.streets_for(tract).collect();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].nvia.as_deref(), Some("MAYOR"));
    }
}

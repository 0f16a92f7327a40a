use crate::query::Record;
use serde::Serialize;

/// An autonomous community or city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    #[serde(rename = "CCOM")]
    pub ccom: &'static str,
    #[serde(rename = "AUTO")]
    pub auto: &'static str,
}

/// A province and the region it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Province {
    #[serde(rename = "CODPRO")]
    pub codpro: &'static str,
    #[serde(rename = "PRO")]
    pub pro: &'static str,
    #[serde(rename = "CCOM")]
    pub ccom: &'static str,
    #[serde(rename = "AUTO")]
    pub auto: &'static str,
}

impl Province {
    #[must_use]
    pub fn region_code(&self) -> u8 {
        self.ccom.parse().unwrap_or_default()
    }
}

impl Record for Region {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("CCOM", self.ccom.to_string()), ("AUTO", self.auto.to_string())]
    }
}

impl Record for Province {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CODPRO", self.codpro.to_string()),
            ("PRO", self.pro.to_string()),
            ("CCOM", self.ccom.to_string()),
            ("AUTO", self.auto.to_string()),
        ]
    }
}

const fn region(ccom: &'static str, auto: &'static str) -> Region {
    Region { ccom, auto }
}

const REGION_TABLE: [Region; 19] = [
    region("01", "ANDALUCÍA"),
    region("02", "ARAGÓN"),
    region("03", "ASTURIAS"),
    region("04", "ILLES BALEARS"),
    region("05", "CANARIAS"),
    region("06", "CANTABRIA"),
    region("07", "CASTILLA Y LEÓN"),
    region("08", "CASTILLA-LA MANCHA"),
    region("09", "CATALUÑA"),
    region("10", "COMUNITAT VALENCIANA"),
    region("11", "EXTREMADURA"),
    region("12", "GALICIA"),
    region("13", "MADRID"),
    region("14", "MURCIA"),
    region("15", "NAVARRA"),
    region("16", "PAÍS VASCO"),
    region("17", "LA RIOJA"),
    region("18", "CEUTA"),
    region("19", "MELILLA"),
];

/// `region` is the 1-based region code.
const fn province(codpro: &'static str, pro: &'static str, region: usize) -> Province {
    let region = &REGION_TABLE[region - 1];
    Province {
        codpro,
        pro,
        ccom: region.ccom,
        auto: region.auto,
    }
}

/// The 19 regions, ordered by code.
pub static REGIONS: [Region; 19] = REGION_TABLE;

/// The 52 provinces, ordered by code.
pub static PROVINCES: [Province; 52] = [
    province("01", "ARABA/ÁLAVA", 16),
    province("02", "ALBACETE", 8),
    province("03", "ALICANTE/ALACANT", 10),
    province("04", "ALMERÍA", 1),
    province("05", "ÁVILA", 7),
    province("06", "BADAJOZ", 11),
    province("07", "ILLES BALEARS", 4),
    province("08", "BARCELONA", 9),
    province("09", "BURGOS", 7),
    province("10", "CÁCERES", 11),
    province("11", "CÁDIZ", 1),
    province("12", "CASTELLÓN/CASTELLÓ", 10),
    province("13", "CIUDAD REAL", 8),
    province("14", "CÓRDOBA", 1),
    province("15", "A CORUÑA", 12),
    province("16", "CUENCA", 8),
    province("17", "GIRONA", 9),
    province("18", "GRANADA", 1),
    province("19", "GUADALAJARA", 8),
    province("20", "GIPUZKOA", 16),
    province("21", "HUELVA", 1),
    province("22", "HUESCA", 2),
    province("23", "JAÉN", 1),
    province("24", "LEÓN", 7),
    province("25", "LLEIDA", 9),
    province("26", "LA RIOJA", 17),
    province("27", "LUGO", 12),
    province("28", "MADRID", 13),
    province("29", "MÁLAGA", 1),
    province("30", "MURCIA", 14),
    province("31", "NAVARRA", 15),
    province("32", "OURENSE", 12),
    province("33", "ASTURIAS", 3),
    province("34", "PALENCIA", 7),
    province("35", "LAS PALMAS", 5),
    province("36", "PONTEVEDRA", 12),
    province("37", "SALAMANCA", 7),
    province("38", "SANTA CRUZ DE TENERIFE", 5),
    province("39", "CANTABRIA", 6),
    province("40", "SEGOVIA", 7),
    province("41", "SEVILLA", 1),
    province("42", "SORIA", 7),
    province("43", "TARRAGONA", 9),
    province("44", "TERUEL", 2),
    province("45", "TOLEDO", 8),
    province("46", "VALENCIA/VALÈNCIA", 10),
    province("47", "VALLADOLID", 7),
    province("48", "BIZKAIA", 16),
    province("49", "ZAMORA", 7),
    province("50", "ZARAGOZA", 2),
    province("51", "CEUTA", 18),
    province("52", "MELILLA", 19),
];

//! Record layouts of the INE street directory files.
//!
//! Only the columns used downstream are declared; the remaining characters of each record
//! are skipped. Several layouts reuse the same leading positions (`cpro`, `cmun`) because
//! every file starts with the province and municipality codes.

use super::{FieldSpec, Layout};

/// Width of the code at the start of every section (`SECC`) record.
pub const SECTION_CODE_WIDTH: usize = 10;

/// Census sections: a single code per line.
pub static SECC: Layout = Layout::new("SECC", &[FieldSpec::string("section_code", 0, SECTION_CODE_WIDTH)]);

/// Pseudo-streets (147 characters per record).
pub static PSEU: Layout = Layout::new(
    "PSEU",
    &[
        FieldSpec::int8("cpro", 0, 2),
        FieldSpec::int16("cmun", 2, 5),
        FieldSpec::int32("acpsvia", 5, 10),
        FieldSpec::string("anpsvia", 10, 60),
        FieldSpec::string("tipoinf", 60, 61),
        FieldSpec::string("cdev", 61, 63),
        FieldSpec::int32("fvar", 63, 71),
        FieldSpec::string("cvar", 71, 72),
        FieldSpec::int32("ncpsvia", 72, 77),
        FieldSpec::string("nnpsvia", 77, 127),
        FieldSpec::string("vector", 127, 147),
    ],
);

/// Streets (152 characters per record). The variation block carries the current code.
pub static VIAS: Layout = Layout::new(
    "VIAS",
    &[
        FieldSpec::int8("cpro", 0, 2),
        FieldSpec::int16("cmun", 2, 5),
        FieldSpec::int32("cvia_var", 47, 52),
        FieldSpec::string("tvia", 52, 57),
        FieldSpec::string("nvia", 57, 107),
    ],
);

/// Address tracts (273 characters per record).
pub static TRAM: Layout = Layout::new(
    "TRAM",
    &[
        FieldSpec::int8("cpro", 0, 2),
        FieldSpec::int16("cmun", 2, 5),
        FieldSpec::int32("cpos", 42, 47),
        FieldSpec::int32("cun_var", 78, 85),
        FieldSpec::string("nentsic", 110, 135),
        FieldSpec::int32("cvia_var", 160, 165),
        FieldSpec::string("nviac", 165, 190),
    ],
);

/// Population units (604 characters per record).
pub static UP: Layout = Layout::new(
    "UP",
    &[
        FieldSpec::int8("cpro", 0, 2),
        FieldSpec::int16("cmun", 2, 5),
        FieldSpec::int32("cun", 5, 12),
        FieldSpec::string("tipoinf", 12, 13),
        FieldSpec::string("cdev", 13, 15),
        FieldSpec::int32("fvar", 15, 23),
        FieldSpec::string("cvar", 23, 24),
        FieldSpec::string("nmun", 24, 94),
        FieldSpec::string("nmun50", 94, 144),
        FieldSpec::string("nmun_c", 144, 169),
        FieldSpec::string("nentco", 169, 239),
        FieldSpec::string("nentco50", 239, 289),
        FieldSpec::string("nentcoc", 289, 314),
        FieldSpec::string("nentsi", 314, 384),
        FieldSpec::string("nentsi50", 384, 434),
        FieldSpec::string("nentsic", 434, 459),
        FieldSpec::string("nnucle", 459, 529),
        FieldSpec::string("nnucle50", 529, 579),
        FieldSpec::string("nnuclec", 579, 604),
    ],
);

pub static ALL: [&Layout; 5] = [&SECC, &PSEU, &VIAS, &TRAM, &UP];

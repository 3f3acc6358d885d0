//! Common test utilities for jlcparts-mcp integration tests.
//!
//! Provides `TestEnv`: a small jlcparts-shaped catalogue written to a temp
//! file, opened read-only and wired into a `PartsService`.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use jlcparts_mcp::db::{create_catalogue_schema, Catalogue};
use jlcparts_mcp::services::PartsService;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Number of rows in the fixture `components` table.
pub const PART_COUNT: u64 = 11;

/// A complete test environment with the service wired up.
pub struct TestEnv {
    pub dir: TempDir,
    pub path: PathBuf,
    pub catalogue: Arc<Catalogue>,
    pub parts: Arc<PartsService>,
}

impl TestEnv {
    /// Creates the fixture catalogue and opens it.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("cache.sqlite3");
        write_fixture(&path);

        let catalogue = Arc::new(Catalogue::open(&path).expect("Failed to open fixture catalogue"));
        let parts = Arc::new(PartsService::new(Arc::clone(&catalogue)));

        Self {
            dir,
            path,
            catalogue,
            parts,
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the fixture catalogue to `path`.
///
/// Stock ties (C1015/C1017) exercise the lcsc tie-break, C123456 has every
/// optional column NULL, and C200000 carries a literal `%` and a malformed
/// price cell.
pub fn write_fixture(path: &std::path::Path) {
    let conn = Connection::open(path).expect("Failed to create fixture file");
    create_catalogue_schema(&conn).expect("Failed to create schema");
    conn.execute_batch(
        r#"
        INSERT INTO categories VALUES (1, 'Resistors', 'Chip Resistor - Surface Mount');
        INSERT INTO categories VALUES (2, 'Filters', 'Ferrite Beads');
        INSERT INTO categories VALUES (3, 'Capacitors', 'Multilayer Ceramic Capacitors MLCC - SMD/SMT');

        INSERT INTO manufacturers VALUES (1, 'UNI-ROYAL(Uniroyal Elec)');
        INSERT INTO manufacturers VALUES (2, 'Murata Electronics');
        INSERT INTO manufacturers VALUES (3, 'Samsung Electro-Mechanics');
        INSERT INTO manufacturers VALUES (4, 'YAGEO');

        INSERT INTO components
            (lcsc, category_id, mfr, package, manufacturer_id, basic, preferred,
             description, datasheet, stock, price, extra)
        VALUES
            (25804, 1, '0603WAF1002T5E', '0603', 1, 1, 0,
             '10kΩ ±1% 100mW 0603 Thick Film Resistors',
             'https://datasheet.lcsc.com/C25804.pdf', 5000000,
             '[{"qFrom":1,"qTo":9,"price":0.0012},{"qFrom":10,"qTo":null,"price":0.0008}]',
             '{"attributes":{"Resistance":"10kΩ","Tolerance":"±1%","Power(Watts)":"100mW"},
               "images":[{"900x900":"https://img.example/900.jpg",
                          "96x96":"https://img.example/96.jpg",
                          "224x224":"https://img.example/224.jpg"}]}'),
            (25744, 1, '0402WGF1002TCE', '0402', 1, 1, 0,
             '10kΩ ±1% 62.5mW 0402 Thick Film Resistors',
             'https://datasheet.lcsc.com/C25744.pdf', 3000000,
             '[{"qFrom":1,"qTo":null,"price":0.0005}]', NULL),
            (21190, 1, '0603WAF1001T5E', '0603', 1, 1, 0,
             '1kΩ ±1% 100mW 0603 Thick Film Resistors', NULL, 4000000,
             '[{"qFrom":1,"qTo":null,"price":0.001}]', NULL),
            (14663, 1, 'RC0603FR-0710KL', '0603', 4, 0, 0,
             '10kΩ ±1% 100mW Thick Film Resistors', NULL, 250000,
             '[{"qFrom":1,"qTo":null,"price":0.002}]', NULL),
            (1015, 2, 'BLM18PG221SN1D', '0603', 2, 1, 1,
             'Ferrite bead 220Ω 0603', NULL, 800000,
             '[{"qFrom":1,"qTo":null,"price":0.005}]', NULL),
            (1017, 2, 'BLM18KG601SN1D', '0603', 2, 1, 0,
             'Ferrite bead 600Ω 0603', NULL, 800000,
             '[{"qFrom":1,"qTo":null,"price":0.006}]', NULL),
            (76992, 2, 'GZ2012D601TF', '0805', 2, 0, 0,
             'Ferrite bead 600Ω 0805', NULL, 50,
             '[{"qFrom":1,"qTo":null,"price":0.01}]', NULL),
            (1591, 3, 'CL10B104KB8NNNC', '0603', 3, 1, 0,
             '100nF 50V X7R 0603 Multilayer Ceramic Capacitors', NULL, 9000000,
             '[{"qFrom":1,"qTo":null,"price":0.0015}]', NULL),
            (99999, 3, 'CL10A106MQ8NNNC', '0603', 3, 0, 0,
             '10uF 6.3V X5R 0603 Multilayer Ceramic Capacitors', NULL, 0,
             '[{"qFrom":1,"qTo":null,"price":0.004}]', NULL),
            (123456, NULL, 'MYSTERY-1', NULL, NULL, 0, 0,
             NULL, NULL, 10, NULL, NULL),
            (200000, 3, 'CL05X', '0402', 3, 0, 0,
             '100% tested capacitor', NULL, 5, 'not json', NULL);
        "#,
    )
    .expect("Failed to insert fixture rows");
}

/// LCSC numbers of a search page, in order.
pub fn lcsc_numbers(parts: &[jlcparts_mcp::format::PartEntry]) -> Vec<String> {
    parts.iter().map(|p| p.lcsc.clone()).collect()
}

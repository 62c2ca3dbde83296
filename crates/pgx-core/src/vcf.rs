//! VCF (Variant Call Format) Record Extraction
//!
//! Reads VCF-style text and keeps only rows annotated with a supported
//! pharmacogene. Structure checks are limited to the column count.

use crate::{Gene, PgxError, Result, UNKNOWN};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Minimum number of tab-separated fields (CHROM through INFO)
pub const MIN_COLUMNS: usize = 8;

/// INFO key naming the gene
pub const GENE_KEY: &str = "GENE";
/// INFO key naming the star allele
pub const STAR_KEY: &str = "STAR";
/// INFO key carrying the rsID
pub const RS_KEY: &str = "RS";

/// One detected variant in a supported gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRecord {
    primary_gene: Gene,
    star_allele: Option<String>,
    rsid: String,
    chromosome: String,
    position: String,
    raw_info: String,
}

impl VariantRecord {
    /// Build a record, normalizing empty alleles to absent and
    /// empty or `.` rsIDs to `Unknown`
    pub fn new(
        primary_gene: Gene,
        star_allele: Option<&str>,
        rsid: Option<&str>,
        chromosome: &str,
        position: &str,
        raw_info: &str,
    ) -> Self {
        let star_allele = star_allele
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let rsid = match rsid {
            Some(id) if !id.is_empty() && id != "." => id.to_string(),
            _ => UNKNOWN.to_string(),
        };

        VariantRecord {
            primary_gene,
            star_allele,
            rsid,
            chromosome: chromosome.to_string(),
            position: position.to_string(),
            raw_info: raw_info.to_string(),
        }
    }

    pub fn primary_gene(&self) -> Gene {
        self.primary_gene
    }

    pub fn star_allele(&self) -> Option<&str> {
        self.star_allele.as_deref()
    }

    pub fn rsid(&self) -> &str {
        &self.rsid
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    /// Original INFO string, kept for audit
    pub fn raw_info(&self) -> &str {
        &self.raw_info
    }
}

/// A single INFO token value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    /// `KEY=VALUE`
    Value(String),
    /// Bare flag (`KEY`)
    Flag,
}

impl InfoValue {
    /// Text value, or `None` for flags
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::Value(v) => Some(v),
            InfoValue::Flag => None,
        }
    }
}

/// Parse the INFO column into a key map. Later keys override earlier ones.
pub fn parse_info(info: &str) -> HashMap<&str, InfoValue> {
    let mut fields = HashMap::new();
    for token in info.split(';') {
        match token.split_once('=') {
            Some((key, value)) => {
                fields.insert(key, InfoValue::Value(value.to_string()));
            }
            None => {
                fields.insert(token, InfoValue::Flag);
            }
        }
    }
    fields
}

/// Counters collected during one extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// Non-header, non-blank lines seen
    pub data_lines: usize,
    /// Rows with fewer than `MIN_COLUMNS` fields
    pub short_rows: usize,
    /// Rows without a supported `GENE` annotation
    pub off_target_rows: usize,
    /// Records emitted
    pub records: usize,
}

/// Extracts pharmacogene records from VCF-style input
#[derive(Debug, Clone, Copy, Default)]
pub struct VcfExtractor;

impl VcfExtractor {
    pub fn new() -> Self {
        VcfExtractor
    }

    /// Extract records from a file on disk
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Vec<VariantRecord>> {
        self.extract_with_summary(path).map(|(records, _)| records)
    }

    /// Extract records from a file on disk, also returning pass counters
    pub fn extract_with_summary<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(Vec<VariantRecord>, ExtractionSummary)> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PgxError::FileNotFound { path: path.to_path_buf() });
        }

        let file = File::open(path)?;
        let (records, summary) = if is_gzip(path) {
            self.read_gzip(file)?
        } else {
            self.read_records(file)?
        };

        debug!(
            path = %path.display(),
            data_lines = summary.data_lines,
            short_rows = summary.short_rows,
            off_target_rows = summary.off_target_rows,
            records = summary.records,
            "extracted pharmacogene records"
        );

        Ok((records, summary))
    }

    /// Extract records from any reader (plain text)
    pub fn extract_from_reader<R: Read>(&self, reader: R) -> Result<Vec<VariantRecord>> {
        self.read_records(reader).map(|(records, _)| records)
    }

    #[cfg(feature = "gzip")]
    fn read_gzip(&self, file: File) -> Result<(Vec<VariantRecord>, ExtractionSummary)> {
        self.read_records(flate2::read::MultiGzDecoder::new(file))
    }

    #[cfg(not(feature = "gzip"))]
    fn read_gzip(&self, _file: File) -> Result<(Vec<VariantRecord>, ExtractionSummary)> {
        Err(PgxError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "compressed VCF input requires the 'gzip' feature",
        )))
    }

    fn read_records<R: Read>(&self, reader: R) -> Result<(Vec<VariantRecord>, ExtractionSummary)> {
        let reader = BufReader::new(reader);
        let mut records = Vec::new();
        let mut summary = ExtractionSummary::default();

        for line in reader.lines() {
            let line = line?;
            // Header detection looks at the raw line; an indented '#' row is data
            if line.starts_with('#') {
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            summary.data_lines += 1;

            let columns: Vec<&str> = trimmed.split('\t').collect();
            if columns.len() < MIN_COLUMNS {
                summary.short_rows += 1;
                continue;
            }

            match parse_data_row(&columns) {
                Some(record) => records.push(record),
                None => summary.off_target_rows += 1,
            }
        }

        summary.records = records.len();
        Ok((records, summary))
    }
}

/// Build a record from a split data row (at least `MIN_COLUMNS` fields)
fn parse_data_row(columns: &[&str]) -> Option<VariantRecord> {
    let info = columns[7];
    let fields = parse_info(info);

    let gene: Gene = fields.get(GENE_KEY)?.as_str()?.parse().ok()?;
    let star = fields.get(STAR_KEY).and_then(InfoValue::as_str);

    // RS annotation wins; fall back to the ID column
    let rsid = fields
        .get(RS_KEY)
        .and_then(InfoValue::as_str)
        .filter(|rs| !rs.is_empty())
        .or(Some(columns[2]));

    Some(VariantRecord::new(gene, star, rsid, columns[0], columns[1], info))
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

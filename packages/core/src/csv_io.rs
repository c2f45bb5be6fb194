//! CSV Import/Export
//!
//! Converts between map/staff records and CSV text. Columns are matched by
//! header name, not position, and every row is validated while parsing so a
//! bad file is rejected before anything is written.
//!
//! Line numbers in errors are 1-based CSV lines (the header is line 1).
//!
//! # Examples
//!
//! ```rust
//! use wayfinder_core::csv_io::{nodes_to_csv, parse_nodes};
//!
//! let text = "nodeID,xcoord,ycoord,floor,building,nodeType,longName,shortName\n\
//!             CCONF001L1,2255,849,L1,45 Francis,CONF,Anesthesia Conf Floor L1,Conf C001L1\n";
//! let nodes = parse_nodes(text).unwrap();
//! assert_eq!(nodes[0].x, 2255.0);
//! assert_eq!(parse_nodes(&nodes_to_csv(&nodes).unwrap()).unwrap(), nodes);
//! ```

use crate::models::{Edge, Employee, NewEdge, Node, ValidationError};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Node CSV columns, in export order
pub const NODE_HEADERS: [&str; 8] = [
    "nodeID",
    "xcoord",
    "ycoord",
    "floor",
    "building",
    "nodeType",
    "longName",
    "shortName",
];

/// Columns required to import edges (an `edgeID` column is ignored)
pub const EDGE_IMPORT_HEADERS: [&str; 2] = ["startNodeID", "endNodeID"];

/// Edge CSV columns, in export order
pub const EDGE_HEADERS: [&str; 3] = ["edgeID", "startNodeID", "endNodeID"];

/// Employee CSV columns, in export order
pub const EMPLOYEE_HEADERS: [&str; 5] = ["employeeID", "firstName", "lastName", "email", "position"];

/// CSV parse and write failures
#[derive(Error, Debug)]
pub enum CsvImportError {
    #[error("CSV payload is empty")]
    Empty,

    #[error("Missing CSV column: {0}")]
    MissingColumn(String),

    #[error("Line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("Line {line}: {source}")]
    Validation {
        line: u64,
        #[source]
        source: ValidationError,
    },

    #[error("Failed to write CSV: {0}")]
    Write(String),
}

impl CsvImportError {
    fn invalid_record(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        Self::invalid_record(line, err.to_string())
    }

    /// CSV line the error refers to, if any
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::InvalidRecord { line, .. } | Self::Validation { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Deserialize every row, paired with its CSV line number
fn parse_records<T: DeserializeOwned>(
    text: &str,
    required: &[&str],
) -> Result<Vec<(u64, T)>, CsvImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: StringRecord = reader.headers().map_err(CsvImportError::from_csv)?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvImportError::Empty);
    }
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(CsvImportError::MissingColumn(missing.to_string()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(CsvImportError::from_csv)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let item: T = record
            .deserialize(Some(&headers))
            .map_err(|e| CsvImportError::invalid_record(line, e.to_string()))?;
        records.push((line, item));
    }

    Ok(records)
}

fn duplicate(line: u64, field: &str, id: &str) -> CsvImportError {
    CsvImportError::Validation {
        line,
        source: ValidationError::invalid_value(field, format!("duplicate id '{}'", id)),
    }
}

/// Parse and validate node rows
pub fn parse_nodes(text: &str) -> Result<Vec<Node>, CsvImportError> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for (line, node) in parse_records::<Node>(text, &NODE_HEADERS)? {
        node.validate()
            .map_err(|source| CsvImportError::Validation { line, source })?;
        if !seen.insert(node.node_id.clone()) {
            return Err(duplicate(line, "nodeID", &node.node_id));
        }
        nodes.push(node);
    }

    Ok(nodes)
}

/// Parse edge rows; ids are derived from the endpoints
pub fn parse_edges(text: &str) -> Result<Vec<Edge>, CsvImportError> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for (line, new_edge) in parse_records::<NewEdge>(text, &EDGE_IMPORT_HEADERS)? {
        let edge = new_edge
            .into_edge()
            .map_err(|source| CsvImportError::Validation { line, source })?;
        if !seen.insert(edge.edge_id.clone()) {
            return Err(duplicate(line, "edgeID", &edge.edge_id));
        }
        edges.push(edge);
    }

    Ok(edges)
}

/// Parse and validate employee rows
pub fn parse_employees(text: &str) -> Result<Vec<Employee>, CsvImportError> {
    let mut seen = HashSet::new();
    let mut employees = Vec::new();

    for (line, employee) in parse_records::<Employee>(text, &EMPLOYEE_HEADERS)? {
        employee
            .validate()
            .map_err(|source| CsvImportError::Validation { line, source })?;
        if !seen.insert(employee.employee_id.clone()) {
            return Err(duplicate(line, "employeeID", &employee.employee_id));
        }
        employees.push(employee);
    }

    Ok(employees)
}

/// Header row followed by one row per record; fields must be declared in
/// the same order as `headers`
fn write_records<T: Serialize>(headers: &[&str], records: &[T]) -> Result<String, CsvImportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(headers)
        .map_err(|e| CsvImportError::Write(e.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| CsvImportError::Write(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvImportError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvImportError::Write(e.to_string()))
}

pub fn nodes_to_csv(nodes: &[Node]) -> Result<String, CsvImportError> {
    write_records(&NODE_HEADERS, nodes)
}

pub fn edges_to_csv(edges: &[Edge]) -> Result<String, CsvImportError> {
    write_records(&EDGE_HEADERS, edges)
}

pub fn employees_to_csv(employees: &[Employee]) -> Result<String, CsvImportError> {
    write_records(&EMPLOYEE_HEADERS, employees)
}

//! Pure dataset checks over parsed string rows.
//!
//! Every check takes rows as produced by [`popsynth_core::parse_rows`] and
//! returns a [`CheckResult`]; malformed input becomes a failed check, never
//! a panic or an error.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use popsynth_core::{AgentRecord, Bounds, PlaceRecord, Row};

use crate::model::Violation;

/// Check categories reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    FilePresent,
    PlaceIds,
    Count,
    EntryCount,
    PlaceProperties,
    AgentProperties,
    AggregateCounts,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::FilePresent => "file_present",
            CheckKind::PlaceIds => "place_ids",
            CheckKind::Count => "count",
            CheckKind::EntryCount => "entry_count",
            CheckKind::PlaceProperties => "place_properties",
            CheckKind::AgentProperties => "agent_properties",
            CheckKind::AggregateCounts => "aggregate_counts",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    /// Dataset file the check ran on (`agents`, `houses`, ...); empty when
    /// the check is called directly.
    #[serde(default)]
    pub subject: String,
    pub passed: bool,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl CheckResult {
    fn from_violations(check: CheckKind, ok_detail: String, violations: Vec<Violation>) -> Self {
        let passed = violations.is_empty();
        let detail = match violations.first() {
            None => ok_detail,
            Some(first) if violations.len() == 1 => first.describe(),
            Some(first) => format!(
                "{} violations; first: {}",
                violations.len(),
                first.describe()
            ),
        };
        Self {
            check,
            subject: String::new(),
            passed,
            detail,
            violations,
        }
    }

    pub(crate) fn failed(check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            check,
            subject: String::new(),
            passed: false,
            detail: detail.into(),
            violations: Vec::new(),
        }
    }

    pub(crate) fn passed(check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            check,
            subject: String::new(),
            passed: true,
            detail: detail.into(),
            violations: Vec::new(),
        }
    }

    /// Attach the file label and prefix every violation path with it.
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        for violation in &mut self.violations {
            violation.path = format!("{subject}.{}", violation.path);
        }
        self
    }

    /// 1-based rows named by violations, deduplicated and sorted.
    pub fn offending_rows(&self) -> Vec<u64> {
        self.violations
            .iter()
            .filter_map(|violation| violation.row_index)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// IDs must be exactly `{1, ..., rows.len()}`: no zero, no gaps, no
/// duplicates.
pub fn check_place_ids(rows: &[Row]) -> CheckResult {
    let total = rows.len() as i64;
    let mut seen = HashSet::new();
    let mut violations = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let raw = row.first().map(String::as_str).unwrap_or_default();
        match raw.parse::<i64>() {
            Err(_) => violations.push(Violation::row(
                "unparseable_id",
                "id",
                idx,
                "id is not an integer",
                raw,
            )),
            Ok(id) if id < 1 || id > total => violations.push(Violation::row(
                "id_out_of_range",
                "id",
                idx,
                format!("id {id} outside 1..={total}"),
                raw,
            )),
            Ok(id) => {
                if !seen.insert(id) {
                    violations.push(Violation::row(
                        "duplicate_id",
                        "id",
                        idx,
                        format!("duplicate ID {id}"),
                        raw,
                    ));
                }
            }
        }
    }

    let missing = (1..=total).filter(|id| !seen.contains(id)).collect::<Vec<_>>();
    if !missing.is_empty() {
        let shown = missing
            .iter()
            .take(10)
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        violations.push(Violation::dataset(
            "missing_ids",
            "id",
            format!("{} id(s) missing from 1..={total}", missing.len()),
            Some(shown),
        ));
    }

    CheckResult::from_violations(
        CheckKind::PlaceIds,
        format!("ids form 1..={total}"),
        violations,
    )
}

/// Row count must equal `expected`.
pub fn check_count(rows: &[Row], expected: usize) -> CheckResult {
    let found = rows.len();
    let violations = if found == expected {
        Vec::new()
    } else {
        vec![Violation::dataset(
            "count_mismatch",
            "rows",
            format!("expected {expected} records, found {found}"),
            None,
        )]
    };
    CheckResult::from_violations(CheckKind::Count, format!("{found} records"), violations)
}

/// Every row must have exactly `expected` fields.
pub fn check_entry_count(rows: &[Row], expected: usize) -> CheckResult {
    let violations = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.len() != expected)
        .map(|(idx, row)| {
            Violation::row(
                "entry_count_mismatch",
                "fields",
                idx,
                format!("expected {expected} fields, found {}", row.len()),
                &row.join(" "),
            )
        })
        .collect();
    CheckResult::from_violations(
        CheckKind::EntryCount,
        format!("all rows have {expected} fields"),
        violations,
    )
}

/// Every place must parse and lie within the bounds, boundary-inclusive.
pub fn check_place_properties(rows: &[Row], x_bounds: &Bounds, y_bounds: &Bounds) -> CheckResult {
    let mut violations = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let place = match PlaceRecord::from_fields(row) {
            Ok(place) => place,
            Err(err) => {
                violations.push(Violation::row(
                    "malformed_row",
                    "row",
                    idx,
                    err.to_string(),
                    &row.join(" "),
                ));
                continue;
            }
        };
        if !x_bounds.contains(place.x) {
            violations.push(Violation::row(
                "coordinate_out_of_bounds",
                "x",
                idx,
                format!("coordinate outside bounds: x {} not in {x_bounds}", place.x),
                &row[1],
            ));
        }
        if !y_bounds.contains(place.y) {
            violations.push(Violation::row(
                "coordinate_out_of_bounds",
                "y",
                idx,
                format!("coordinate outside bounds: y {} not in {y_bounds}", place.y),
                &row[2],
            ));
        }
    }

    CheckResult::from_violations(
        CheckKind::PlaceProperties,
        format!("all coordinates within x {x_bounds}, y {y_bounds}"),
        violations,
    )
}

/// Per-agent semantic and referential checks.
///
/// For every agent: the household exists and its coordinates equal the
/// agent's; school and workplace IDs agree with the flags in both directions
/// and resolve to existing places; flags and infection status are 0 or 1;
/// age is non-negative.
pub fn check_agent_properties(
    agent_rows: &[Row],
    house_rows: &[Row],
    school_rows: &[Row],
    work_rows: &[Row],
) -> CheckResult {
    let houses = index_places(house_rows);
    let schools = index_places(school_rows);
    let workplaces = index_places(work_rows);
    let mut violations = Vec::new();

    for (idx, row) in agent_rows.iter().enumerate() {
        let agent = match AgentRecord::from_fields(row) {
            Ok(agent) => agent,
            Err(err) => {
                violations.push(Violation::row(
                    "malformed_row",
                    "row",
                    idx,
                    err.to_string(),
                    &row.join(" "),
                ));
                continue;
            }
        };

        match houses.get(&agent.household_id) {
            None => violations.push(Violation::row(
                "unknown_household",
                "household_id",
                idx,
                format!("household_id {} does not resolve to a house", agent.household_id),
                &row[5],
            )),
            Some(&(x, y)) if agent.x != x || agent.y != y => violations.push(Violation::row(
                "coordinates_mismatch",
                "x,y",
                idx,
                format!(
                    "agent at ({}, {}) but household {} is at ({x}, {y})",
                    agent.x, agent.y, agent.household_id
                ),
                &format!("{} {}", row[3], row[4]),
            )),
            Some(_) => {}
        }

        check_affiliation(
            &Affiliation {
                flag_field: "is_student",
                id_field: "school_id",
                place: "school",
                flag: agent.is_student,
                id: agent.school_id,
            },
            &schools,
            idx,
            &mut violations,
        );
        check_affiliation(
            &Affiliation {
                flag_field: "is_worker",
                id_field: "workplace_id",
                place: "workplace",
                flag: agent.is_worker,
                id: agent.workplace_id,
            },
            &workplaces,
            idx,
            &mut violations,
        );

        if !matches!(agent.infection_status, 0 | 1) {
            violations.push(Violation::row(
                "invalid_infection_status",
                "infection_status",
                idx,
                format!("infection_status {} not in {{0, 1}}", agent.infection_status),
                &row[8],
            ));
        }
        if agent.age < 0 {
            violations.push(Violation::row(
                "negative_age",
                "age",
                idx,
                format!("age {} is negative", agent.age),
                &row[2],
            ));
        }
    }

    CheckResult::from_violations(
        CheckKind::AgentProperties,
        format!("{} agents consistent with their places", agent_rows.len()),
        violations,
    )
}

struct Affiliation {
    flag_field: &'static str,
    id_field: &'static str,
    place: &'static str,
    flag: i64,
    id: i64,
}

fn check_affiliation(
    affiliation: &Affiliation,
    places: &HashMap<i64, (f64, f64)>,
    idx: usize,
    violations: &mut Vec<Violation>,
) {
    let Affiliation {
        flag_field,
        id_field,
        place,
        flag,
        id,
    } = *affiliation;

    match flag {
        0 if id != 0 => violations.push(Violation::row(
            "orphan_affiliation",
            id_field,
            idx,
            format!("{id_field} set but {flag_field} false"),
            &id.to_string(),
        )),
        1 if id == 0 => violations.push(Violation::row(
            "missing_affiliation",
            id_field,
            idx,
            format!("{flag_field} true but {id_field} is 0"),
            &id.to_string(),
        )),
        0 | 1 => {}
        other => violations.push(Violation::row(
            "invalid_flag",
            flag_field,
            idx,
            format!("{flag_field} {other} not in {{0, 1}}"),
            &other.to_string(),
        )),
    }

    if id != 0 && !places.contains_key(&id) {
        violations.push(Violation::row(
            "unknown_place",
            id_field,
            idx,
            format!("{id_field} {id} does not resolve to a {place}"),
            &id.to_string(),
        ));
    }
}

fn index_places(rows: &[Row]) -> HashMap<i64, (f64, f64)> {
    rows.iter()
        .filter_map(|row| PlaceRecord::from_fields(row).ok())
        .map(|place| (place.id, (place.x, place.y)))
        .collect()
}

/// Sums of `infection_status`, `is_student`, and `is_worker` must match.
pub fn check_aggregate_counts(
    agent_rows: &[Row],
    expected_infected: u64,
    expected_students: u64,
    expected_workers: u64,
) -> CheckResult {
    let mut violations = Vec::new();
    // i128 holds any sum of i64 values from a row count that fits in memory.
    let (mut infected, mut students, mut workers) = (0_i128, 0_i128, 0_i128);

    for (idx, row) in agent_rows.iter().enumerate() {
        match AgentRecord::from_fields(row) {
            Ok(agent) => {
                infected += i128::from(agent.infection_status);
                students += i128::from(agent.is_student);
                workers += i128::from(agent.is_worker);
            }
            Err(err) => violations.push(Violation::row(
                "malformed_row",
                "row",
                idx,
                err.to_string(),
                &row.join(" "),
            )),
        }
    }

    for (field, found, expected) in [
        ("infection_status", infected, expected_infected),
        ("is_student", students, expected_students),
        ("is_worker", workers, expected_workers),
    ] {
        if found != i128::from(expected) {
            violations.push(Violation::dataset(
                "aggregate_mismatch",
                field,
                format!("sum of {field} is {found}, expected {expected}"),
                None,
            ));
        }
    }

    CheckResult::from_violations(
        CheckKind::AggregateCounts,
        format!("infected {infected}, students {students}, workers {workers}"),
        violations,
    )
}

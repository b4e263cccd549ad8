use serde::Deserialize;

use esg_report_core::records::{EmployeeRecord, Sex};

use super::file;

/// One row of an employee roster export. Headers are matched by name; the
/// camelCase spellings common in spreadsheet exports are accepted too.
#[derive(Debug, Deserialize)]
struct EmployeeRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "gender")]
    sex: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default, alias = "hireDate")]
    hire_date: Option<String>,
    #[serde(default, alias = "exitDate")]
    exit_date: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl EmployeeRow {
    fn into_record(self, line: usize) -> EmployeeRecord {
        let age = self.age.as_deref().and_then(|a| match a.parse::<u32>() {
            Ok(age) => Some(age),
            Err(_) => {
                tracing::warn!(line, age = a, "ignoring unparseable age");
                None
            }
        });
        EmployeeRecord {
            name: self.name.unwrap_or_default(),
            sex: Sex::from(self.sex),
            age,
            position: self.position,
            hire_date: self.hire_date.as_deref().map(Into::into),
            exit_date: self.exit_date.as_deref().map(Into::into),
            country: self.country,
        }
    }
}

/// Read employee records from a CSV file with a header row. Date cells are
/// passed through untouched for the core's date normaliser.
pub fn read_employees(path: &str) -> Result<Vec<EmployeeRecord>, Box<dyn std::error::Error>> {
    let canonical = file::resolve_path(path)?;
    let contents = file::read_text(&canonical)?;
    let employees = parse_employees(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    tracing::debug!(path = %canonical.display(), rows = employees.len(), "read employee CSV");
    Ok(employees)
}

fn parse_employees(contents: &str) -> Result<Vec<EmployeeRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let mut employees = Vec::new();
    for (i, row) in rdr.deserialize::<EmployeeRow>().enumerate() {
        employees.push(row?.into_record(i + 2));
    }
    Ok(employees)
}

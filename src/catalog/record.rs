/// Header of the score column appended to every shard.
pub const SCORE_HEADER: &str = "our score";

/// Canonical column positions of a registry export row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Proponent,
    ProjectType,
    AfoluActivities,
    Methodology,
    Status,
    Country,
    EstimatedEmissions,
    Region,
    RegistrationDate,
    CreditingPeriodStart,
    CreditingPeriodEnd,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Id,
        Column::Name,
        Column::Proponent,
        Column::ProjectType,
        Column::AfoluActivities,
        Column::Methodology,
        Column::Status,
        Column::Country,
        Column::EstimatedEmissions,
        Column::Region,
        Column::RegistrationDate,
        Column::CreditingPeriodStart,
        Column::CreditingPeriodEnd,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Header name used by the registry export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Proponent => "Proponent",
            Column::ProjectType => "Project Type",
            Column::AfoluActivities => "AFOLU Activities",
            Column::Methodology => "Methodology",
            Column::Status => "Status",
            Column::Country => "Country/Area",
            Column::EstimatedEmissions => "Estimated Annual Emission Reductions",
            Column::Region => "Region",
            Column::RegistrationDate => "Project Registration Date",
            Column::CreditingPeriodStart => "Crediting Period Start Date",
            Column::CreditingPeriodEnd => "Crediting Period End Date",
        }
    }
}

/// One raw row of the registry export.
///
/// The row is kept as read so it can be written back unchanged; columns past
/// the end of a short row read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectRecord {
    fields: Vec<String>,
}

impl ProjectRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: Column) -> &str {
        self.fields
            .get(column.index())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Builder-style setter, padding short rows with empty fields
    pub fn with(mut self, column: Column, value: &str) -> Self {
        let index = column.index();
        if self.fields.len() <= index {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value.to_string();
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Identifier of this row, if the first field is a plain run of digits.
    pub fn id(&self) -> Option<u64> {
        parse_identifier(self.get(Column::Id))
    }
}

/// Parse a project identifier. Only unsigned decimal digits are accepted: no
/// sign, no whitespace, no separators.
pub fn parse_identifier(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// A catalog entry: the raw record plus its computed score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProject {
    pub id: u64,
    pub record: ProjectRecord,
    pub score: f64,
}

impl ScoredProject {
    /// The original fields followed by the score, as written to a shard.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = self.record.fields().to_vec();
        row.push(self.score.to_string());
        row
    }
}

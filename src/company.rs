use serde::{Deserialize, Serialize};

/// Names of the source columns, in file order, as mapped onto [`Company`].
pub const COMPANY_FIELDS: [&str; 2] = ["companyName", "companyNumber"];

/// Order in which the CSV output emits the company fields.
///
/// Number first, unlike the source file and the JSON output.
pub const CSV_OUTPUT_FIELDS: [&str; 2] = ["companyNumber", "companyName"];

/// A company as listed in the source file.
///
/// Both fields are kept verbatim as read, the company number included: it is
/// an identifier, and leading zeros are significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_name: String,
    pub company_number: String,
}

impl Company {
    pub fn new(company_name: impl Into<String>, company_number: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            company_number: company_number.into(),
        }
    }
}

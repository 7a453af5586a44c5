pub mod department;
pub mod employee;
pub mod report;
pub mod time_record;

pub(crate) const INVALID_DATETIME_MSG: &str =
    "Invalid date format. Use ISO format (YYYY-MM-DDTHH:MM:SS)";
pub(crate) const INVALID_DATE_MSG: &str = "Invalid date format. Use ISO format (YYYY-MM-DD)";

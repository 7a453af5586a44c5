use crate::api::department::{CreateDepartment, DepartmentListResponse};
use crate::api::employee::{
    CreateEmployee, EmployeeListResponse, EmployeeTimeRecordsResponse, OpenRecordEmployeesResponse,
    UpdateEmployee,
};
use crate::api::time_record::{
    CheckOutRequest, CreateTimeRecord, TimeRecordListResponse, TimeRecordResponse, UpdateTimeRecord,
};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::time_record::TimeRecord;
use crate::report::{GroupBy, ReportKind, SummaryRow};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Tracking API",
        version = "1.0.0",
        description = r#"
## Employee Time Tracking

Backend for recording working hours and reporting on them.

### Key Features
- **Employee Management**
  - Create, update, list and deactivate employees (soft delete)
- **Department Management**
  - List and create departments
- **Time Records**
  - Check-in / check-out with the one-open-record-per-employee rule
- **Reports**
  - Summary totals grouped by employee, department or date
  - Daily report and CSV export (summary / detailed)

### Response Format
- JSON-based RESTful responses
- Pagination envelope `{items, total, pages, page}` on list endpoints
- Errors as `{"error": message}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::department::list_departments,
        crate::api::department::create_department,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_time_records,
        crate::api::employee::employees_with_open_records,

        crate::api::time_record::list_time_records,
        crate::api::time_record::get_time_record,
        crate::api::time_record::check_in,
        crate::api::time_record::check_out,
        crate::api::time_record::update_time_record,

        crate::api::report::summary_report,
        crate::api::report::daily_report,
        crate::api::report::export_csv
    ),
    components(
        schemas(
            Department,
            CreateDepartment,
            DepartmentListResponse,
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeListResponse,
            EmployeeTimeRecordsResponse,
            OpenRecordEmployeesResponse,
            TimeRecord,
            TimeRecordResponse,
            CreateTimeRecord,
            UpdateTimeRecord,
            CheckOutRequest,
            TimeRecordListResponse,
            GroupBy,
            ReportKind,
            SummaryRow
        )
    ),
    tags(
        (name = "Department", description = "Department management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "TimeRecord", description = "Check-in / check-out and record APIs"),
        (name = "Report", description = "Aggregation and export APIs"),
    )
)]
pub struct ApiDoc;

use crate::api::attendance::{CheckRequest, FingerRequest, GeoPointDto};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::location::CreateLocation;
use crate::api::report::{DailyQuery, FixLateQuery, RangeQuery};
use crate::attendance::TodayStatus;
use crate::attendance::policy::DayState;
use crate::attendance::report::{DailySummary, RangeSummary};
use crate::model::attendance::{AttendanceRecord, EventStatus, EventType};
use crate::model::employee::Employee;
use crate::model::location::Location;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Management System API",
        version = "1.0.0",
        description = r#"
## Attendance Management System (ATMS)

This API powers an attendance backend for GPS- and fingerprint-based employee
check-in/out tracking.

### 🔹 Key Features
- **Check Events**
  - GPS check-in/out with late/early/overtime status derivation
  - Fingerprint-terminal check-in/out resolved through the enrollment cache
- **Warning Sweeps**
  - Scheduled midday/evening/past-day scans for missing check-outs
  - End-of-day automatic check-out for employees who forgot to check out
- **Reporting**
  - Daily, weekly, monthly and yearly attendance rollups
  - Historical late-status maintenance
- **Directories**
  - Employee and geofence location management

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_event,
        crate::api::attendance::finger_event,
        crate::api::attendance::today_status,
        crate::api::attendance::delete_record,
        crate::api::attendance::trigger_sweep,

        crate::api::report::daily,
        crate::api::report::range,
        crate::api::report::fix_late,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::location::create_location,
        crate::api::location::list_locations,
        crate::api::location::get_location,
        crate::api::location::update_location
    ),
    components(
        schemas(
            AttendanceRecord,
            EventType,
            EventStatus,
            DayState,
            TodayStatus,
            CheckRequest,
            FingerRequest,
            GeoPointDto,
            DailyQuery,
            RangeQuery,
            FixLateQuery,
            DailySummary,
            RangeSummary,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Employee,
            CreateLocation,
            Location
        )
    ),
    tags(
        (name = "Attendance", description = "Check events, today status and warning sweeps"),
        (name = "Report", description = "Attendance rollups and maintenance"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Location", description = "Geofence location APIs"),
    )
)]
pub struct ApiDoc;

//! Concrete RPC handler functions.
//!
//! Each function extracts its parameters, calls the roster under the caller's
//! id, and returns a `ResFrame`. `dispatch::route` is the only caller; keep
//! this module free of direct DB access.

use calendify_core::types::UserId;
use calendify_core::CalendifyError;
use calendify_protocol::frames::ResFrame;
use calendify_roster::{NewEmployee, NewSchedule, NewShift, NewStore};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::app::AppState;

/// Event pushed to the owner's WS connections after every successful create.
pub const ROSTER_CHANGED: &str = "roster.changed";

#[derive(Debug, Default, Deserialize)]
struct IdParams {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFilter {
    store_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRef {
    schedule_id: Option<String>,
}

// ---------------------------------------------------------------------------
// stores
// ---------------------------------------------------------------------------

/// Handler for `stores.getAll`. Returns the caller's stores.
pub async fn handle_stores_get_all(req_id: &str, app: &AppState, owner: &UserId) -> ResFrame {
    match app.roster.list_stores(owner) {
        Ok(stores) => ResFrame::ok(req_id, stores),
        Err(e) => fail(req_id, "stores.getAll", e),
    }
}

/// Handler for `stores.getById`.
///
/// Params: `{ "id": string }`. Returns the store with its employees.
pub async fn handle_stores_get_by_id(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let id = match required_id(params) {
        Ok(id) => id,
        Err(e) => return fail(req_id, "stores.getById", e),
    };
    match app.roster.store_detail(owner, &id) {
        Ok(detail) => ResFrame::ok(req_id, detail),
        Err(e) => fail(req_id, "stores.getById", e),
    }
}

/// Handler for `stores.create`.
///
/// Params: `{ "storeNumber": number, "name": string, "location": string }`
pub async fn handle_stores_create(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let input: NewStore = match parse(params) {
        Ok(p) => p,
        Err(e) => return fail(req_id, "stores.create", e),
    };
    match app.roster.create_store(owner, input) {
        Ok(store) => {
            notify_created(app, owner, "store", &store.id);
            ResFrame::ok(req_id, store)
        }
        Err(e) => fail(req_id, "stores.create", e),
    }
}

// ---------------------------------------------------------------------------
// employees
// ---------------------------------------------------------------------------

/// Handler for `employees.getAll`.
///
/// Params: `{ "storeId"?: string }`. Without a store, every employee the
/// caller owns.
pub async fn handle_employees_get_all(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let filter: StoreFilter = match parse(params) {
        Ok(p) => p,
        Err(e) => return fail(req_id, "employees.getAll", e),
    };
    match app.roster.list_employees(owner, filter.store_id.as_deref()) {
        Ok(employees) => ResFrame::ok(req_id, employees),
        Err(e) => fail(req_id, "employees.getAll", e),
    }
}

/// Handler for `employees.create`.
///
/// Params: `{ "employeeNumber": number, "name": string, "storeId": string }`
pub async fn handle_employees_create(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let input: NewEmployee = match parse(params) {
        Ok(p) => p,
        Err(e) => return fail(req_id, "employees.create", e),
    };
    match app.roster.create_employee(owner, input) {
        Ok(employee) => {
            notify_created(app, owner, "employee", &employee.id);
            ResFrame::ok(req_id, employee)
        }
        Err(e) => fail(req_id, "employees.create", e),
    }
}

// ---------------------------------------------------------------------------
// schedules
// ---------------------------------------------------------------------------

/// Handler for `schedules.getAll`. Each entry carries its store and a long
/// display date.
pub async fn handle_schedules_get_all(req_id: &str, app: &AppState, owner: &UserId) -> ResFrame {
    match app.roster.list_schedules(owner) {
        Ok(schedules) => ResFrame::ok(req_id, schedules),
        Err(e) => fail(req_id, "schedules.getAll", e),
    }
}

/// Handler for `schedules.getById`.
///
/// Params: `{ "id": string }`. Returns the resolved week: dates, headings and
/// the employee × day shift grid.
pub async fn handle_schedules_get_by_id(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let id = match required_id(params) {
        Ok(id) => id,
        Err(e) => return fail(req_id, "schedules.getById", e),
    };
    match app.roster.schedule_detail(owner, &id) {
        Ok(detail) => ResFrame::ok(req_id, detail),
        Err(e) => fail(req_id, "schedules.getById", e),
    }
}

/// Handler for `schedules.create`.
///
/// Params: `{ "endOfWeekDate": "YYYY-MM-DD", "storeId": string }`
pub async fn handle_schedules_create(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let input: NewSchedule = match parse(params) {
        Ok(p) => p,
        Err(e) => return fail(req_id, "schedules.create", e),
    };
    match app.roster.create_schedule(owner, input) {
        Ok(schedule) => {
            notify_created(app, owner, "schedule", &schedule.id);
            ResFrame::ok(req_id, schedule)
        }
        Err(e) => fail(req_id, "schedules.create", e),
    }
}

// ---------------------------------------------------------------------------
// shifts
// ---------------------------------------------------------------------------

/// Handler for `shifts.getAllBySchedule`.
///
/// Params: `{ "scheduleId": string }`. `NOT_FOUND` if the schedule is not
/// the caller's.
pub async fn handle_shifts_get_all_by_schedule(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let schedule_id = match parse::<ScheduleRef>(params).and_then(|p| {
        p.schedule_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CalendifyError::InvalidParams("Schedule is required".to_string()))
    }) {
        Ok(id) => id,
        Err(e) => return fail(req_id, "shifts.getAllBySchedule", e),
    };

    let shifts = app
        .roster
        .get_schedule(owner, &schedule_id)
        .and_then(|_| app.roster.list_shifts(owner, &schedule_id));
    match shifts {
        Ok(shifts) => ResFrame::ok(req_id, shifts),
        Err(e) => fail(req_id, "shifts.getAllBySchedule", e),
    }
}

/// Handler for `shifts.create`.
///
/// Params: `{ "employeeId", "scheduleId", "dayOfWeek": 0-6, "startTime",
/// "endTime", "notes"? }`. `CONFLICT` if the employee already has a shift
/// that day.
pub async fn handle_shifts_create(
    params: Option<&Value>,
    req_id: &str,
    app: &AppState,
    owner: &UserId,
) -> ResFrame {
    let input: NewShift = match parse(params) {
        Ok(p) => p,
        Err(e) => return fail(req_id, "shifts.create", e),
    };
    match app.roster.create_shift(owner, input) {
        Ok(shift) => {
            notify_created(app, owner, "shift", &shift.id);
            ResFrame::ok(req_id, shift)
        }
        Err(e) => fail(req_id, "shifts.create", e),
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Absent or `null` params mean "all defaults".
fn parse<T: DeserializeOwned + Default>(params: Option<&Value>) -> Result<T, CalendifyError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| CalendifyError::InvalidParams(format!("invalid params: {e}"))),
    }
}

fn required_id(params: Option<&Value>) -> Result<String, CalendifyError> {
    parse::<IdParams>(params)?
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CalendifyError::InvalidParams("missing 'id' field".to_string()))
}

fn fail(req_id: &str, method: &str, e: impl Into<CalendifyError>) -> ResFrame {
    let e: CalendifyError = e.into();
    match e {
        CalendifyError::Database(_) | CalendifyError::Serialization(_) => {
            warn!(method, error = %e, "rpc failed");
        }
        _ => debug!(method, code = e.code(), error = %e, "rpc rejected"),
    }
    ResFrame::from_error(req_id, &e)
}

fn notify_created(app: &AppState, owner: &UserId, entity: &str, id: &str) {
    app.notify_owner(owner, ROSTER_CHANGED, json!({ "entity": entity, "id": id }));
}

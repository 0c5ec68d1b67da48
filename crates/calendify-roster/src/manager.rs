use std::sync::Mutex;

use calendify_core::model::{DayOfWeek, Employee, Schedule, Shift, Store};
use calendify_core::types::{new_record_id, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, instrument};

use crate::db::init_db;
use crate::error::{Result, RosterError};
use crate::types::{
    NewEmployee, NewSchedule, NewShift, NewStore, ScheduleDetail, ScheduleSummary, StoreDetail,
};

/// Owner-scoped repository for the whole roster.
///
/// Wraps a single SQLite connection in a `Mutex`; the gateway gives each
/// subsystem its own connection to the same database file.
pub struct RosterManager {
    db: Mutex<Connection>,
}

impl RosterManager {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    // ── stores ───────────────────────────────────────────────────────────────

    #[instrument(skip(self), fields(owner = %owner))]
    pub fn list_stores(&self, owner: &UserId) -> Result<Vec<Store>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, store_number, name, location, owner_id, created_at
             FROM stores WHERE owner_id = ?1
             ORDER BY created_at, id",
        )?;
        let rows = stmt
            .query_map(params![owner.as_str()], row_to_store)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    pub fn get_store(&self, owner: &UserId, id: &str) -> Result<Store> {
        let db = self.db.lock().unwrap();
        find_store(&db, owner, id)?.ok_or_else(|| RosterError::not_found("Store", id))
    }

    /// A store with its employees, in creation order.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn store_detail(&self, owner: &UserId, id: &str) -> Result<StoreDetail> {
        let db = self.db.lock().unwrap();
        let store = find_store(&db, owner, id)?.ok_or_else(|| RosterError::not_found("Store", id))?;
        let employees = query_employees(&db, owner, Some(&store.id))?;
        Ok(StoreDetail { store, employees })
    }

    #[instrument(skip(self, input), fields(owner = %owner))]
    pub fn create_store(&self, owner: &UserId, input: NewStore) -> Result<Store> {
        let input = input.validate()?;
        let store = Store {
            id: new_record_id(),
            store_number: input.store_number,
            name: input.name,
            location: input.location,
            owner_id: owner.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO stores (id, store_number, name, location, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                store.id,
                store.store_number,
                store.name,
                store.location,
                store.owner_id,
                store.created_at,
            ],
        )?;
        info!(store_id = %store.id, store_number = store.store_number, "store created");
        Ok(store)
    }

    // ── employees ────────────────────────────────────────────────────────────

    /// Employees of one store, or of every store when `store_id` is `None`.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn list_employees(&self, owner: &UserId, store_id: Option<&str>) -> Result<Vec<Employee>> {
        let db = self.db.lock().unwrap();
        query_employees(&db, owner, store_id)
    }

    #[instrument(skip(self, input), fields(owner = %owner))]
    pub fn create_employee(&self, owner: &UserId, input: NewEmployee) -> Result<Employee> {
        let input = input.validate()?;
        let db = self.db.lock().unwrap();
        if find_store(&db, owner, &input.store_id)?.is_none() {
            return Err(RosterError::not_found("Store", input.store_id));
        }

        let employee = Employee {
            id: new_record_id(),
            employee_number: input.employee_number,
            name: input.name,
            store_id: input.store_id,
            owner_id: owner.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        db.execute(
            "INSERT INTO employees (id, employee_number, name, store_id, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                employee.id,
                employee.employee_number,
                employee.name,
                employee.store_id,
                employee.owner_id,
                employee.created_at,
            ],
        )?;
        info!(employee_id = %employee.id, store_id = %employee.store_id, "employee created");
        Ok(employee)
    }

    // ── schedules ────────────────────────────────────────────────────────────

    /// Every schedule the caller owns, each with its store.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn list_schedules(&self, owner: &UserId) -> Result<Vec<ScheduleSummary>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT sc.id, sc.end_of_week_date, sc.store_id, sc.owner_id, sc.created_at,
                    st.id, st.store_number, st.name, st.location, st.owner_id, st.created_at
             FROM schedules sc
             JOIN stores st ON st.id = sc.store_id AND st.owner_id = sc.owner_id
             WHERE sc.owner_id = ?1
             ORDER BY sc.created_at, sc.id",
        )?;
        let rows = stmt
            .query_map(params![owner.as_str()], |row| {
                let schedule = row_to_schedule(row)?;
                let store = Store {
                    id: row.get(5)?,
                    store_number: row.get(6)?,
                    name: row.get(7)?,
                    location: row.get(8)?,
                    owner_id: row.get(9)?,
                    created_at: row.get(10)?,
                };
                Ok(ScheduleSummary::new(schedule, store))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    pub fn get_schedule(&self, owner: &UserId, id: &str) -> Result<Schedule> {
        let db = self.db.lock().unwrap();
        find_schedule(&db, owner, id)?.ok_or_else(|| RosterError::not_found("Schedule", id))
    }

    /// The schedule with its store, employees, week dates and shift grid.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn schedule_detail(&self, owner: &UserId, id: &str) -> Result<ScheduleDetail> {
        let (schedule, store, employees, shifts) = {
            let db = self.db.lock().unwrap();
            let schedule = find_schedule(&db, owner, id)?
                .ok_or_else(|| RosterError::not_found("Schedule", id))?;
            let store = find_store(&db, owner, &schedule.store_id)?
                .ok_or_else(|| RosterError::not_found("Store", schedule.store_id.clone()))?;
            let employees = query_employees(&db, owner, Some(&store.id))?;
            let shifts = query_shifts(&db, owner, &schedule.id)?;
            (schedule, store, employees, shifts)
        };
        Ok(ScheduleDetail::build(schedule, store, employees, shifts))
    }

    #[instrument(skip(self, input), fields(owner = %owner))]
    pub fn create_schedule(&self, owner: &UserId, input: NewSchedule) -> Result<Schedule> {
        let input = input.validate()?;
        let db = self.db.lock().unwrap();
        if find_store(&db, owner, &input.store_id)?.is_none() {
            return Err(RosterError::not_found("Store", input.store_id));
        }

        let schedule = Schedule {
            id: new_record_id(),
            end_of_week_date: input.end_of_week_date,
            store_id: input.store_id,
            owner_id: owner.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        db.execute(
            "INSERT INTO schedules (id, end_of_week_date, store_id, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                schedule.id,
                schedule.end_of_week_date,
                schedule.store_id,
                schedule.owner_id,
                schedule.created_at,
            ],
        )?;
        info!(
            schedule_id = %schedule.id,
            end_of_week = %schedule.end_of_week_date,
            "schedule created"
        );
        Ok(schedule)
    }

    // ── shifts ───────────────────────────────────────────────────────────────

    #[instrument(skip(self), fields(owner = %owner))]
    pub fn list_shifts(&self, owner: &UserId, schedule_id: &str) -> Result<Vec<Shift>> {
        let db = self.db.lock().unwrap();
        query_shifts(&db, owner, schedule_id)
    }

    /// Add a shift. The employee must work at the schedule's store and may
    /// hold at most one shift per day of the schedule.
    #[instrument(skip(self, input), fields(owner = %owner))]
    pub fn create_shift(&self, owner: &UserId, input: NewShift) -> Result<Shift> {
        let input = input.validate()?;
        let db = self.db.lock().unwrap();

        let schedule = find_schedule(&db, owner, &input.schedule_id)?
            .ok_or_else(|| RosterError::not_found("Schedule", input.schedule_id.clone()))?;
        let employee = find_employee(&db, owner, &input.employee_id)?
            .ok_or_else(|| RosterError::not_found("Employee", input.employee_id.clone()))?;
        if employee.store_id != schedule.store_id {
            return Err(RosterError::Validation(format!(
                "Employee {} does not work at the schedule's store",
                employee.id
            )));
        }

        let shift = Shift {
            id: new_record_id(),
            employee_id: employee.id,
            schedule_id: schedule.id,
            day_of_week: input.day_of_week,
            start_time: input.start_time,
            end_time: input.end_time,
            notes: input.notes,
            owner_id: owner.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        db.execute(
            "INSERT INTO shifts
                (id, employee_id, schedule_id, day_of_week, start_time, end_time,
                 notes, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                shift.id,
                shift.employee_id,
                shift.schedule_id,
                u8::from(shift.day_of_week),
                shift.start_time,
                shift.end_time,
                shift.notes,
                shift.owner_id,
                shift.created_at,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                RosterError::Conflict(format!(
                    "employee {} already has a shift on day {} of this schedule",
                    shift.employee_id, shift.day_of_week
                ))
            } else {
                RosterError::Database(e)
            }
        })?;
        info!(
            shift_id = %shift.id,
            schedule_id = %shift.schedule_id,
            day = %shift.day_of_week,
            "shift created"
        );
        Ok(shift)
    }
}

// ── row helpers ──────────────────────────────────────────────────────────────

fn find_store(conn: &Connection, owner: &UserId, id: &str) -> Result<Option<Store>> {
    let store = conn
        .query_row(
            "SELECT id, store_number, name, location, owner_id, created_at
             FROM stores WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_str()],
            row_to_store,
        )
        .optional()?;
    Ok(store)
}

fn find_employee(conn: &Connection, owner: &UserId, id: &str) -> Result<Option<Employee>> {
    let employee = conn
        .query_row(
            "SELECT id, employee_number, name, store_id, owner_id, created_at
             FROM employees WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_str()],
            row_to_employee,
        )
        .optional()?;
    Ok(employee)
}

fn find_schedule(conn: &Connection, owner: &UserId, id: &str) -> Result<Option<Schedule>> {
    let schedule = conn
        .query_row(
            "SELECT id, end_of_week_date, store_id, owner_id, created_at
             FROM schedules WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_str()],
            row_to_schedule,
        )
        .optional()?;
    Ok(schedule)
}

fn query_employees(
    conn: &Connection,
    owner: &UserId,
    store_id: Option<&str>,
) -> Result<Vec<Employee>> {
    // NULL store_id matches every store.
    let mut stmt = conn.prepare(
        "SELECT id, employee_number, name, store_id, owner_id, created_at
         FROM employees
         WHERE owner_id = ?1 AND (?2 IS NULL OR store_id = ?2)
         ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map(params![owner.as_str(), store_id], row_to_employee)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_shifts(conn: &Connection, owner: &UserId, schedule_id: &str) -> Result<Vec<Shift>> {
    let mut stmt = conn.prepare(
        "SELECT id, employee_id, schedule_id, day_of_week, start_time, end_time,
                notes, owner_id, created_at
         FROM shifts
         WHERE owner_id = ?1 AND schedule_id = ?2
         ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map(params![owner.as_str(), schedule_id], row_to_shift)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn row_to_store(row: &rusqlite::Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        store_number: row.get(1)?,
        name: row.get(2)?,
        location: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_employee(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        employee_number: row.get(1)?,
        name: row.get(2)?,
        store_id: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get(0)?,
        end_of_week_date: row.get(1)?,
        store_id: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_shift(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shift> {
    let raw_day: u8 = row.get(3)?;
    let day_of_week = DayOfWeek::try_from(raw_day).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Integer, e.into())
    })?;
    Ok(Shift {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        schedule_id: row.get(2)?,
        day_of_week,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        notes: row.get(6)?,
        owner_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

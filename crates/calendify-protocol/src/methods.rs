// RPC method names. Router-style `<entity>.<verb>` naming.

pub const PING: &str = "ping";

// stores
pub const STORES_GET_ALL: &str = "stores.getAll";
pub const STORES_GET_BY_ID: &str = "stores.getById";
pub const STORES_CREATE: &str = "stores.create";

// employees
pub const EMPLOYEES_GET_ALL: &str = "employees.getAll";
pub const EMPLOYEES_CREATE: &str = "employees.create";

// schedules
pub const SCHEDULES_GET_ALL: &str = "schedules.getAll";
pub const SCHEDULES_GET_BY_ID: &str = "schedules.getById";
pub const SCHEDULES_CREATE: &str = "schedules.create";

// shifts
pub const SHIFTS_GET_ALL_BY_SCHEDULE: &str = "shifts.getAllBySchedule";
pub const SHIFTS_CREATE: &str = "shifts.create";

// users
pub const USERS_ME: &str = "users.me";

// handshake (WebSocket only)
pub const CONNECT: &str = "connect";

/// Methods callable after authentication, on either transport.
pub const ALL: &[&str] = &[
    PING,
    STORES_GET_ALL,
    STORES_GET_BY_ID,
    STORES_CREATE,
    EMPLOYEES_GET_ALL,
    EMPLOYEES_CREATE,
    SCHEDULES_GET_ALL,
    SCHEDULES_GET_BY_ID,
    SCHEDULES_CREATE,
    SHIFTS_GET_ALL_BY_SCHEDULE,
    SHIFTS_CREATE,
    USERS_ME,
];

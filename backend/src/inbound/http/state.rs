//! Port handles shared by every HTTP handler through `web::Data`.

use std::ops::Deref;
use std::sync::Arc;

use crate::domain::ports::{
    AttendanceCommand, AttendanceQuery, ClassRosterCommand, ClassRosterQuery, TokenVerifier,
    UsersQuery,
};

/// Driving ports the handlers call into, plus the bearer token verifier.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub classes: Arc<dyn ClassRosterCommand>,
    pub classes_query: Arc<dyn ClassRosterQuery>,
    pub attendance: Arc<dyn AttendanceCommand>,
    pub attendance_query: Arc<dyn AttendanceQuery>,
    pub users: Arc<dyn UsersQuery>,
    pub tokens: Arc<dyn TokenVerifier>,
}

/// Application data registered once per server; derefs to its ports.
///
/// ```no_run
/// use actix_web::web;
/// use rollcall::inbound::http::state::{HttpState, HttpStatePorts};
/// # fn ports() -> HttpStatePorts { unimplemented!() }
///
/// let data = web::Data::new(HttpState::new(ports()));
/// ```
#[derive(Clone)]
pub struct HttpState {
    ports: HttpStatePorts,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        Self { ports }
    }
}

impl Deref for HttpState {
    type Target = HttpStatePorts;

    fn deref(&self) -> &Self::Target {
        &self.ports
    }
}

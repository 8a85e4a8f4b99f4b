use crate::dto::HealthRes;

/// Liveness check answered by the REST server's `/healthz`.
///
/// The panel has no external dependencies to check, so a running process is a healthy one.
#[derive(Clone, Debug, Default)]
pub struct HealthService;

impl HealthService {
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
        }
    }
}

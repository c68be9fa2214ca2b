use automata_kernel::service::ServiceMarker;

#[automata_derive::service("health")]
pub struct HealthService {
    pub ready: bool,
}

fn main() {
    assert_eq!(<HealthService as ServiceMarker>::SERVICE_NAME, "health");
    let _ = HealthService { ready: true };
}
